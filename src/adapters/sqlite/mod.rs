//! SQLite entity store.
//!
//! Owns the schema and the connection pool. Each write operation runs in one
//! `BEGIN IMMEDIATE` transaction; a failed step drops the transaction, which
//! rolls back every row touched by the call.

mod assets;
mod programs;
pub(crate) mod relations;
mod trades;

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, Row, Transaction, TransactionBehavior, params_from_iter};

use crate::domain::asset::{Asset, CreateAssetInput, UpdateAssetInput};
use crate::domain::error::TradebookError;
use crate::domain::program::{CreateProgramInput, Program, UpdateProgramInput};
use crate::domain::status::DeleteOutcome;
use crate::domain::trade::{CreateTradeInput, Trade, TradeWithAssets, UpdateTradeInput};
use crate::ports::config_port::ConfigPort;
use crate::ports::reference_port::ReferencePort;
use crate::ports::store_port::StorePort;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS programs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS assets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        currency TEXT NOT NULL,
        value_cents INTEGER NOT NULL,
        date TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS trades (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        status TEXT NOT NULL,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        program_id INTEGER NOT NULL REFERENCES programs(id),
        created_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS trade_assets (
        trade_id INTEGER NOT NULL REFERENCES trades(id),
        asset_id INTEGER NOT NULL REFERENCES assets(id),
        PRIMARY KEY (trade_id, asset_id)
    );
    CREATE INDEX IF NOT EXISTS idx_trades_program_id ON trades(program_id);
    CREATE INDEX IF NOT EXISTS idx_trade_assets_asset_id ON trade_assets(asset_id);";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradebookError> {
        let db_path = config.require_string("sqlite", "path")?;

        let pool_size = config.get_int("sqlite", "pool_size", 4);
        if pool_size < 1 {
            return Err(TradebookError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: "pool_size must be at least 1".into(),
            });
        }

        log::debug!("opening sqlite store at {db_path} (pool size {pool_size})");
        let pool = Pool::builder()
            .max_size(pool_size as u32)
            .build(with_foreign_keys(SqliteConnectionManager::file(&db_path)))
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    /// A private in-memory database. The pool holds a single connection that
    /// is never recycled, so data lives as long as the store.
    pub fn in_memory() -> Result<Self, TradebookError> {
        let pool = Pool::builder()
            .max_size(1)
            .max_lifetime(None)
            .idle_timeout(None)
            .build(with_foreign_keys(SqliteConnectionManager::memory()))
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), TradebookError> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA).map_err(query_error)?;
        Ok(())
    }

    fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>, TradebookError> {
        self.pool.get().map_err(pool_error)
    }

    fn read<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, TradebookError>,
    ) -> Result<T, TradebookError> {
        let conn = self.connection()?;
        op(&conn)
    }

    fn write<T>(
        &self,
        operation: &str,
        op: impl FnOnce(&Transaction<'_>) -> Result<T, TradebookError>,
    ) -> Result<T, TradebookError> {
        let mut conn = self.connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(query_error)?;

        match op(&tx) {
            Ok(value) => {
                tx.commit().map_err(query_error)?;
                Ok(value)
            }
            Err(err) => {
                if err.is_validation() {
                    log::debug!("{operation} rejected: {err}");
                } else {
                    log::warn!("{operation} rolled back: {err}");
                }
                Err(err)
            }
        }
    }
}

fn with_foreign_keys(manager: SqliteConnectionManager) -> SqliteConnectionManager {
    manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
}

impl StorePort for SqliteStore {
    fn create_program(&self, input: &CreateProgramInput) -> Result<Program, TradebookError> {
        self.write("create program", |tx| programs::create(tx, input))
    }

    fn list_programs(&self) -> Result<Vec<Program>, TradebookError> {
        self.read(programs::list)
    }

    fn get_program(&self, id: i64) -> Result<Option<Program>, TradebookError> {
        self.read(|conn| programs::find(conn, id))
    }

    fn update_program(
        &self,
        input: &UpdateProgramInput,
    ) -> Result<Option<Program>, TradebookError> {
        self.write("update program", |tx| programs::update(tx, input))
    }

    fn delete_program(&self, id: i64) -> Result<DeleteOutcome, TradebookError> {
        let success = self.write("delete program", |tx| programs::delete(tx, id))?;
        Ok(DeleteOutcome { success })
    }

    fn create_asset(&self, input: &CreateAssetInput) -> Result<Asset, TradebookError> {
        self.write("create asset", |tx| assets::create(tx, input))
    }

    fn list_assets(&self) -> Result<Vec<Asset>, TradebookError> {
        self.read(assets::list)
    }

    fn get_asset(&self, id: i64) -> Result<Option<Asset>, TradebookError> {
        self.read(|conn| assets::find(conn, id))
    }

    fn update_asset(&self, input: &UpdateAssetInput) -> Result<Option<Asset>, TradebookError> {
        self.write("update asset", |tx| assets::update(tx, input))
    }

    fn delete_asset(&self, id: i64) -> Result<DeleteOutcome, TradebookError> {
        let success = self.write("delete asset", |tx| assets::delete(tx, id))?;
        Ok(DeleteOutcome { success })
    }

    fn create_trade(&self, input: &CreateTradeInput) -> Result<Trade, TradebookError> {
        self.write("create trade", |tx| trades::create(tx, input))
    }

    fn list_trades(&self) -> Result<Vec<Trade>, TradebookError> {
        self.read(trades::list)
    }

    fn get_trade(&self, id: i64) -> Result<Option<TradeWithAssets>, TradebookError> {
        self.read(|conn| trades::find_with_assets(conn, id))
    }

    fn update_trade(&self, input: &UpdateTradeInput) -> Result<Option<Trade>, TradebookError> {
        self.write("update trade", |tx| trades::update(tx, input))
    }

    fn delete_trade(&self, id: i64) -> Result<DeleteOutcome, TradebookError> {
        let success = self.write("delete trade", |tx| trades::delete(tx, id))?;
        Ok(DeleteOutcome { success })
    }
}

impl ReferencePort for Connection {
    fn program_exists(&self, program_id: i64) -> Result<bool, TradebookError> {
        self.query_row(
            "SELECT EXISTS(SELECT 1 FROM programs WHERE id = ?1)",
            [program_id],
            |row| row.get(0),
        )
        .map_err(query_error)
    }

    fn existing_asset_ids(&self, asset_ids: &[i64]) -> Result<HashSet<i64>, TradebookError> {
        if asset_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let placeholders = vec!["?"; asset_ids.len()].join(", ");
        let query = format!("SELECT id FROM assets WHERE id IN ({placeholders})");

        let mut stmt = self.prepare(&query).map_err(query_error)?;
        let rows = stmt
            .query_map(params_from_iter(asset_ids.iter()), |row| row.get(0))
            .map_err(query_error)?;

        rows.collect::<rusqlite::Result<HashSet<i64>>>()
            .map_err(query_error)
    }
}

/// Constraint violations become [`TradebookError::Conflict`]; everything else
/// is a query failure.
fn query_error(e: rusqlite::Error) -> TradebookError {
    if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        TradebookError::Conflict {
            reason: e.to_string(),
        }
    } else {
        TradebookError::DatabaseQuery {
            reason: e.to_string(),
        }
    }
}

fn pool_error(e: r2d2::Error) -> TradebookError {
    TradebookError::Database {
        reason: e.to_string(),
    }
}

/// Creation timestamp at the precision that survives storage.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let text: String = row.get(idx)?;
    NaiveDate::parse_from_str(&text, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    struct PathConfig(Option<String>, i64);

    impl ConfigPort for PathConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            match (section, key) {
                ("sqlite", "path") => self.0.clone(),
                _ => None,
            }
        }
        fn get_int(&self, _section: &str, _key: &str, _default: i64) -> i64 {
            self.1
        }
    }

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize_schema().unwrap();
        store
    }

    pub(crate) fn count(store: &SqliteStore, table: &str) -> i64 {
        let conn = store.connection().unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn from_config_missing_path() {
        match SqliteStore::from_config(&PathConfig(None, 4)) {
            Err(TradebookError::ConfigMissing { section, key }) => {
                assert_eq!(section, "sqlite");
                assert_eq!(key, "path");
            }
            Err(other) => panic!("expected ConfigMissing, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn from_config_rejects_zero_pool_size() {
        let config = PathConfig(Some("unused.db".into()), 0);
        assert!(matches!(
            SqliteStore::from_config(&config),
            Err(TradebookError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn file_store_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tradebook.db");
        let config = PathConfig(Some(path.display().to_string()), 2);

        let first = SqliteStore::from_config(&config).unwrap();
        first.initialize_schema().unwrap();
        let created = first
            .create_program(&CreateProgramInput {
                name: "Persisted".into(),
                description: String::new(),
                status: "active".into(),
                start_date: date(2024, 1, 1),
                end_date: date(2024, 6, 30),
            })
            .unwrap();
        drop(first);

        let second = SqliteStore::from_config(&config).unwrap();
        assert_eq!(second.get_program(created.id).unwrap(), Some(created));
    }

    #[test]
    fn schema_initialization_is_idempotent() {
        let store = store();
        store.initialize_schema().unwrap();
        assert_eq!(count(&store, "trade_assets"), 0);
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let store = store();
        let conn = store.connection().unwrap();
        let err = conn
            .execute("INSERT INTO trade_assets (trade_id, asset_id) VALUES (1, 1)", [])
            .unwrap_err();
        assert!(matches!(query_error(err), TradebookError::Conflict { .. }));
    }

    #[test]
    fn existing_asset_ids_with_empty_input() {
        let store = store();
        let conn = store.connection().unwrap();
        assert!(conn.existing_asset_ids(&[]).unwrap().is_empty());
        assert!(!conn.program_exists(1).unwrap());
    }
}
