//! Assets: monetary holdings that trades refer to.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::error::TradebookError;
use crate::domain::money;
use crate::domain::validation::{require_non_empty, validate_positive};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssetInput {
    pub name: String,
    pub description: String,
    pub currency: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub date: NaiveDate,
}

impl CreateAssetInput {
    pub fn validate(&self) -> Result<(), TradebookError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("currency", &self.currency)?;
        validate_positive(self.value)
    }
}

/// Partial update: `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssetInput {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub currency: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub value: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

impl UpdateAssetInput {
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.currency.is_some()
            || self.value.is_some()
            || self.date.is_some()
    }

    pub fn validate(&self) -> Result<(), TradebookError> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(currency) = &self.currency {
            require_non_empty("currency", currency)?;
        }
        if let Some(value) = self.value {
            validate_positive(value)?;
        }
        Ok(())
    }

    pub fn apply(&self, existing: Asset) -> Asset {
        Asset {
            name: self.name.clone().unwrap_or(existing.name),
            description: self.description.clone().unwrap_or(existing.description),
            currency: self.currency.clone().unwrap_or(existing.currency),
            value: self.value.map(money::normalize).unwrap_or(existing.value),
            date: self.date.unwrap_or(existing.date),
            ..existing
        }
    }
}
