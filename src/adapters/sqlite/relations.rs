//! Trade↔asset association lifecycle.
//!
//! Association rows are never updated in place: a trade's set is replaced
//! wholesale, and rows are removed explicitly before the trade, asset or
//! program they hang off is deleted. None of these functions delete assets.

use rusqlite::{Connection, params};

use super::{assets, query_error, trades};
use crate::domain::asset::Asset;
use crate::domain::error::TradebookError;

/// Replaces every association of `trade_id` with `asset_ids`. An empty slice
/// leaves the trade with no associations. A repeated id fails with
/// [`TradebookError::Conflict`].
pub(crate) fn set_trade_assets(
    conn: &Connection,
    trade_id: i64,
    asset_ids: &[i64],
) -> Result<(), TradebookError> {
    let removed = remove_trade_associations(conn, trade_id)?;

    let mut stmt = conn
        .prepare("INSERT INTO trade_assets (trade_id, asset_id) VALUES (?1, ?2)")
        .map_err(query_error)?;
    for asset_id in asset_ids {
        stmt.execute(params![trade_id, asset_id])
            .map_err(|e| match query_error(e) {
                TradebookError::Conflict { reason } => TradebookError::Conflict {
                    reason: format!("cannot associate trade {trade_id} with asset {asset_id}: {reason}"),
                },
                other => other,
            })?;
    }

    log::debug!(
        "trade {trade_id}: replaced {removed} association(s) with {}",
        asset_ids.len()
    );
    Ok(())
}

/// `None` keeps the current associations; `Some` replaces them.
pub(crate) fn sync_trade_assets(
    conn: &Connection,
    trade_id: i64,
    asset_ids: Option<&[i64]>,
) -> Result<(), TradebookError> {
    match asset_ids {
        Some(ids) => set_trade_assets(conn, trade_id, ids),
        None => Ok(()),
    }
}

pub(crate) fn remove_asset_associations(
    conn: &Connection,
    asset_id: i64,
) -> Result<usize, TradebookError> {
    conn.execute("DELETE FROM trade_assets WHERE asset_id = ?1", [asset_id])
        .map_err(query_error)
}

pub(crate) fn remove_trade_associations(
    conn: &Connection,
    trade_id: i64,
) -> Result<usize, TradebookError> {
    conn.execute("DELETE FROM trade_assets WHERE trade_id = ?1", [trade_id])
        .map_err(query_error)
}

/// Deletes every trade of the program together with its associations.
/// Returns the number of trades removed. Must run in the same transaction as
/// the program delete.
pub(crate) fn cascade_delete_program_trades(
    conn: &Connection,
    program_id: i64,
) -> Result<usize, TradebookError> {
    let trade_ids = trades::ids_for_program(conn, program_id)?;
    for trade_id in &trade_ids {
        remove_trade_associations(conn, *trade_id)?;
        trades::delete_row(conn, *trade_id)?;
    }
    if !trade_ids.is_empty() {
        log::debug!(
            "program {program_id}: cascaded delete to trades {:?}",
            trade_ids
        );
    }
    Ok(trade_ids.len())
}

pub(crate) fn assets_for_trade(
    conn: &Connection,
    trade_id: i64,
) -> Result<Vec<Asset>, TradebookError> {
    let mut stmt = conn
        .prepare(
            "SELECT a.id, a.name, a.description, a.currency, a.value_cents, a.date, a.created_at
             FROM trade_assets ta
             JOIN assets a ON a.id = ta.asset_id
             WHERE ta.trade_id = ?1
             ORDER BY a.id",
        )
        .map_err(query_error)?;

    let rows = stmt
        .query_map([trade_id], assets::from_row)
        .map_err(query_error)?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(query_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::tests::{count, date, store};
    use crate::domain::asset::CreateAssetInput;
    use crate::domain::program::CreateProgramInput;
    use crate::domain::trade::CreateTradeInput;
    use crate::ports::store_port::StorePort;
    use rust_decimal::Decimal;

    struct Fixture {
        store: crate::adapters::sqlite::SqliteStore,
        program_id: i64,
        asset_ids: Vec<i64>,
    }

    fn fixture() -> Fixture {
        let store = store();
        let program_id = store
            .create_program(&CreateProgramInput {
                name: "P".into(),
                description: String::new(),
                status: "active".into(),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 12, 31),
            })
            .unwrap()
            .id;
        let asset_ids = (1..=3)
            .map(|i| {
                store
                    .create_asset(&CreateAssetInput {
                        name: format!("A{i}"),
                        description: String::new(),
                        currency: "USD".into(),
                        value: Decimal::new(100 * i, 0),
                        date: date(2024, 1, 1),
                    })
                    .unwrap()
                    .id
            })
            .collect();
        Fixture {
            store,
            program_id,
            asset_ids,
        }
    }

    fn trade(f: &Fixture, asset_ids: Option<Vec<i64>>) -> i64 {
        f.store
            .create_trade(&CreateTradeInput {
                name: "T".into(),
                description: String::new(),
                status: "open".into(),
                start_date: date(2024, 2, 1),
                end_date: date(2024, 2, 28),
                program_id: f.program_id,
                asset_ids,
            })
            .unwrap()
            .id
    }

    fn linked(f: &Fixture, trade_id: i64) -> Vec<i64> {
        let conn = f.store.connection().unwrap();
        assets_for_trade(&conn, trade_id)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect()
    }

    #[test]
    fn set_replaces_whole_association_set() {
        let f = fixture();
        let trade_id = trade(&f, Some(f.asset_ids[..2].to_vec()));

        let conn = f.store.connection().unwrap();
        set_trade_assets(&conn, trade_id, &[f.asset_ids[2]]).unwrap();
        drop(conn);

        assert_eq!(linked(&f, trade_id), vec![f.asset_ids[2]]);
    }

    #[test]
    fn empty_set_clears_and_absent_set_keeps() {
        let f = fixture();
        let kept = trade(&f, Some(f.asset_ids.clone()));
        let cleared = trade(&f, Some(f.asset_ids.clone()));

        let conn = f.store.connection().unwrap();
        sync_trade_assets(&conn, kept, None).unwrap();
        sync_trade_assets(&conn, cleared, Some(&[])).unwrap();
        drop(conn);

        assert_eq!(linked(&f, kept), f.asset_ids);
        assert!(linked(&f, cleared).is_empty());
    }

    #[test]
    fn duplicate_asset_id_is_a_conflict() {
        let f = fixture();
        let trade_id = trade(&f, None);

        let conn = f.store.connection().unwrap();
        let err = set_trade_assets(&conn, trade_id, &[f.asset_ids[0], f.asset_ids[0]]).unwrap_err();
        assert!(matches!(err, TradebookError::Conflict { .. }), "{err}");
    }

    #[test]
    fn removing_asset_associations_touches_only_that_asset() {
        let f = fixture();
        let t1 = trade(&f, Some(f.asset_ids.clone()));
        let t2 = trade(&f, Some(vec![f.asset_ids[0]]));

        let conn = f.store.connection().unwrap();
        assert_eq!(remove_asset_associations(&conn, f.asset_ids[0]).unwrap(), 2);
        drop(conn);

        assert_eq!(linked(&f, t1), f.asset_ids[1..].to_vec());
        assert!(linked(&f, t2).is_empty());
        assert_eq!(count(&f.store, "assets"), 3);
        assert_eq!(count(&f.store, "trades"), 2);
    }

    #[test]
    fn cascade_removes_trades_and_rows_but_not_assets() {
        let f = fixture();
        trade(&f, Some(f.asset_ids.clone()));
        trade(&f, Some(vec![f.asset_ids[1]]));

        let conn = f.store.connection().unwrap();
        assert_eq!(cascade_delete_program_trades(&conn, f.program_id).unwrap(), 2);
        drop(conn);

        assert_eq!(count(&f.store, "trades"), 0);
        assert_eq!(count(&f.store, "trade_assets"), 0);
        assert_eq!(count(&f.store, "assets"), 3);
        assert_eq!(count(&f.store, "programs"), 1);
    }

    #[test]
    fn trade_without_associations_resolves_to_empty_list() {
        let f = fixture();
        let trade_id = trade(&f, None);
        assert!(linked(&f, trade_id).is_empty());
    }
}
