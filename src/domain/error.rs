//! Domain error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Top-level error type for tradebook.
#[derive(Debug, thiserror::Error)]
pub enum TradebookError {
    #[error("start date {start} must be before end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid asset value {value}: {reason}")]
    InvalidValue { value: Decimal, reason: String },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{entity} not found: {}", join_ids(.ids))]
    NotFound { entity: String, ids: Vec<i64> },

    #[error("conflict: {reason}")]
    Conflict { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TradebookError {
    pub fn not_found(entity: &str, id: i64) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            ids: vec![id],
        }
    }

    /// Stable label for the error class, used by the transport layer.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRange { .. } => "InvalidRange",
            Self::InvalidValue { .. } => "InvalidValue",
            Self::InvalidInput { .. } => "InvalidInput",
            Self::NotFound { .. } => "NotFound",
            Self::Conflict { .. } => "Conflict",
            Self::Database { .. } | Self::DatabaseQuery { .. } => "Database",
            Self::ConfigParse { .. } | Self::ConfigMissing { .. } | Self::ConfigInvalid { .. } => {
                "Config"
            }
            Self::Io(_) => "Io",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. } | Self::InvalidValue { .. } | Self::InvalidInput { .. }
        )
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<&TradebookError> for std::process::ExitCode {
    fn from(err: &TradebookError) -> Self {
        let code: u8 = match err {
            TradebookError::Io(_) => 1,
            TradebookError::ConfigParse { .. }
            | TradebookError::ConfigMissing { .. }
            | TradebookError::ConfigInvalid { .. } => 2,
            TradebookError::Database { .. } | TradebookError::DatabaseQuery { .. } => 3,
            TradebookError::InvalidRange { .. }
            | TradebookError::InvalidValue { .. }
            | TradebookError::InvalidInput { .. } => 4,
            TradebookError::NotFound { .. } | TradebookError::Conflict { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
