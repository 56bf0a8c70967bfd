use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{date_column, format_date, format_timestamp, now, query_error, relations, timestamp_column};
use crate::domain::error::TradebookError;
use crate::domain::trade::{CreateTradeInput, Trade, TradeWithAssets, UpdateTradeInput};
use crate::domain::validation::{validate_assets_exist, validate_program_exists};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Trade> {
    Ok(Trade {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        start_date: date_column(row, 4)?,
        end_date: date_column(row, 5)?,
        program_id: row.get(6)?,
        created_at: timestamp_column(row, 7)?,
    })
}

pub(super) fn create(conn: &Connection, input: &CreateTradeInput) -> Result<Trade, TradebookError> {
    input.validate()?;
    validate_program_exists(conn, input.program_id)?;
    if let Some(asset_ids) = &input.asset_ids {
        validate_assets_exist(conn, asset_ids)?;
    }

    let created_at = now();
    conn.execute(
        "INSERT INTO trades (name, description, status, start_date, end_date, program_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            input.name,
            input.description,
            input.status,
            format_date(input.start_date),
            format_date(input.end_date),
            input.program_id,
            format_timestamp(created_at),
        ],
    )
    .map_err(query_error)?;

    let trade = Trade {
        id: conn.last_insert_rowid(),
        name: input.name.clone(),
        description: input.description.clone(),
        status: input.status.clone(),
        start_date: input.start_date,
        end_date: input.end_date,
        program_id: input.program_id,
        created_at,
    };
    relations::sync_trade_assets(conn, trade.id, input.asset_ids.as_deref())?;

    log::info!(
        "created trade {} in program {} with {} asset(s)",
        trade.id,
        trade.program_id,
        input.asset_ids.as_ref().map_or(0, Vec::len)
    );
    Ok(trade)
}

pub(super) fn find(conn: &Connection, id: i64) -> Result<Option<Trade>, TradebookError> {
    conn.query_row(
        "SELECT id, name, description, status, start_date, end_date, program_id, created_at
         FROM trades WHERE id = ?1",
        [id],
        from_row,
    )
    .optional()
    .map_err(query_error)
}

pub(super) fn find_with_assets(
    conn: &Connection,
    id: i64,
) -> Result<Option<TradeWithAssets>, TradebookError> {
    let Some(trade) = find(conn, id)? else {
        return Ok(None);
    };
    let assets = relations::assets_for_trade(conn, id)?;
    Ok(Some(TradeWithAssets { trade, assets }))
}

pub(super) fn list(conn: &Connection) -> Result<Vec<Trade>, TradebookError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, description, status, start_date, end_date, program_id, created_at
             FROM trades ORDER BY id",
        )
        .map_err(query_error)?;

    let rows = stmt.query_map([], from_row).map_err(query_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(query_error)
}

pub(super) fn ids_for_program(conn: &Connection, program_id: i64) -> Result<Vec<i64>, TradebookError> {
    let mut stmt = conn
        .prepare("SELECT id FROM trades WHERE program_id = ?1 ORDER BY id")
        .map_err(query_error)?;

    let rows = stmt
        .query_map([program_id], |row| row.get(0))
        .map_err(query_error)?;
    rows.collect::<rusqlite::Result<Vec<i64>>>()
        .map_err(query_error)
}

pub(super) fn update(
    conn: &Connection,
    input: &UpdateTradeInput,
) -> Result<Option<Trade>, TradebookError> {
    if !input.has_changes() {
        return Ok(None);
    }
    input.validate()?;

    let Some(existing) = find(conn, input.id)? else {
        return Ok(None);
    };
    let trade = input.apply(existing)?;

    if let Some(program_id) = input.program_id {
        validate_program_exists(conn, program_id)?;
    }
    if let Some(asset_ids) = &input.asset_ids {
        validate_assets_exist(conn, asset_ids)?;
    }

    if input.has_row_changes() {
        conn.execute(
            "UPDATE trades
             SET name = ?1, description = ?2, status = ?3, start_date = ?4, end_date = ?5,
                 program_id = ?6
             WHERE id = ?7",
            params![
                trade.name,
                trade.description,
                trade.status,
                format_date(trade.start_date),
                format_date(trade.end_date),
                trade.program_id,
                trade.id,
            ],
        )
        .map_err(query_error)?;
    }
    relations::sync_trade_assets(conn, trade.id, input.asset_ids.as_deref())?;

    log::info!("updated trade {}", trade.id);
    Ok(Some(trade))
}

pub(super) fn delete(conn: &Connection, id: i64) -> Result<bool, TradebookError> {
    relations::remove_trade_associations(conn, id)?;
    let deleted = delete_row(conn, id)?;
    if deleted {
        log::info!("deleted trade {id}");
    }
    Ok(deleted)
}

/// Deletes the trade row only; associations must already be gone.
pub(super) fn delete_row(conn: &Connection, id: i64) -> Result<bool, TradebookError> {
    let removed = conn
        .execute("DELETE FROM trades WHERE id = ?1", [id])
        .map_err(query_error)?;
    Ok(removed > 0)
}
