use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{date_column, format_date, format_timestamp, now, query_error, relations, timestamp_column};
use crate::domain::asset::{Asset, CreateAssetInput, UpdateAssetInput};
use crate::domain::error::TradebookError;
use crate::domain::money;

/// Maps `id, name, description, currency, value_cents, date, created_at`.
pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        currency: row.get(3)?,
        value: money::from_cents(row.get(4)?),
        date: date_column(row, 5)?,
        created_at: timestamp_column(row, 6)?,
    })
}

pub(super) fn create(conn: &Connection, input: &CreateAssetInput) -> Result<Asset, TradebookError> {
    input.validate()?;
    let cents = money::to_cents(input.value)?;

    let created_at = now();
    conn.execute(
        "INSERT INTO assets (name, description, currency, value_cents, date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.name,
            input.description,
            input.currency,
            cents,
            format_date(input.date),
            format_timestamp(created_at),
        ],
    )
    .map_err(query_error)?;

    let asset = Asset {
        id: conn.last_insert_rowid(),
        name: input.name.clone(),
        description: input.description.clone(),
        currency: input.currency.clone(),
        value: money::from_cents(cents),
        date: input.date,
        created_at,
    };
    log::info!("created asset {} ({} {})", asset.id, asset.value, asset.currency);
    Ok(asset)
}

pub(super) fn find(conn: &Connection, id: i64) -> Result<Option<Asset>, TradebookError> {
    conn.query_row(
        "SELECT id, name, description, currency, value_cents, date, created_at
         FROM assets WHERE id = ?1",
        [id],
        from_row,
    )
    .optional()
    .map_err(query_error)
}

pub(super) fn list(conn: &Connection) -> Result<Vec<Asset>, TradebookError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, description, currency, value_cents, date, created_at
             FROM assets ORDER BY id",
        )
        .map_err(query_error)?;

    let rows = stmt.query_map([], from_row).map_err(query_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(query_error)
}

pub(super) fn update(
    conn: &Connection,
    input: &UpdateAssetInput,
) -> Result<Option<Asset>, TradebookError> {
    if !input.has_changes() {
        return Ok(None);
    }
    input.validate()?;

    let Some(existing) = find(conn, input.id)? else {
        return Ok(None);
    };
    let asset = input.apply(existing);

    conn.execute(
        "UPDATE assets
         SET name = ?1, description = ?2, currency = ?3, value_cents = ?4, date = ?5
         WHERE id = ?6",
        params![
            asset.name,
            asset.description,
            asset.currency,
            money::to_cents(asset.value)?,
            format_date(asset.date),
            asset.id,
        ],
    )
    .map_err(query_error)?;

    log::info!("updated asset {}", asset.id);
    Ok(Some(asset))
}

pub(super) fn delete(conn: &Connection, id: i64) -> Result<bool, TradebookError> {
    let unlinked = relations::remove_asset_associations(conn, id)?;
    let deleted = conn
        .execute("DELETE FROM assets WHERE id = ?1", [id])
        .map_err(query_error)?
        > 0;

    if deleted {
        log::info!("deleted asset {id}, unlinked from {unlinked} trade(s)");
    }
    Ok(deleted)
}
