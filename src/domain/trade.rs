//! Trades: belong to one program and associate with any number of assets.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::asset::Asset;
use crate::domain::error::TradebookError;
use crate::domain::validation::{require_non_empty, validate_date_range};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub program_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A trade together with every asset it is associated with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeWithAssets {
    #[serde(flatten)]
    pub trade: Trade,
    pub assets: Vec<Asset>,
}

impl TradeWithAssets {
    pub fn asset_ids(&self) -> Vec<i64> {
        self.assets.iter().map(|a| a.id).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTradeInput {
    pub name: String,
    pub description: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub program_id: i64,
    #[serde(default)]
    pub asset_ids: Option<Vec<i64>>,
}

impl CreateTradeInput {
    pub fn validate(&self) -> Result<(), TradebookError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("status", &self.status)?;
        validate_date_range(self.start_date, self.end_date)
    }
}

/// Partial update. `asset_ids: None` keeps the current associations,
/// `Some(vec![])` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTradeInput {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub program_id: Option<i64>,
    #[serde(default)]
    pub asset_ids: Option<Vec<i64>>,
}

impl UpdateTradeInput {
    /// True when any column of the trade row itself is supplied.
    pub fn has_row_changes(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.status.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.program_id.is_some()
    }

    pub fn has_changes(&self) -> bool {
        self.has_row_changes() || self.asset_ids.is_some()
    }

    pub fn validate(&self) -> Result<(), TradebookError> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(status) = &self.status {
            require_non_empty("status", status)?;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            validate_date_range(start, end)?;
        }
        Ok(())
    }

    pub fn apply(&self, existing: Trade) -> Result<Trade, TradebookError> {
        let merged = Trade {
            name: self.name.clone().unwrap_or(existing.name),
            description: self.description.clone().unwrap_or(existing.description),
            status: self.status.clone().unwrap_or(existing.status),
            start_date: self.start_date.unwrap_or(existing.start_date),
            end_date: self.end_date.unwrap_or(existing.end_date),
            program_id: self.program_id.unwrap_or(existing.program_id),
            ..existing
        };
        validate_date_range(merged.start_date, merged.end_date)?;
        Ok(merged)
    }
}
