//! Validation layer.
//!
//! Every check here runs before a mutation is applied. Value checks are pure;
//! existence checks only read through a [`ReferencePort`].

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::error::TradebookError;
use crate::domain::money;
use crate::ports::reference_port::ReferencePort;

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), TradebookError> {
    if start >= end {
        return Err(TradebookError::InvalidRange { start, end });
    }
    Ok(())
}

/// Checks the value as it will be stored: rounded to cents and within the
/// storable magnitude.
pub fn validate_positive(value: Decimal) -> Result<(), TradebookError> {
    if money::normalize(value) <= Decimal::ZERO {
        return Err(TradebookError::InvalidValue {
            value,
            reason: "asset value must be positive".to_string(),
        });
    }
    money::to_cents(value)?;
    Ok(())
}

pub fn require_non_empty(field: &str, value: &str) -> Result<(), TradebookError> {
    if value.is_empty() {
        return Err(TradebookError::InvalidInput {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

pub fn validate_program_exists(
    refs: &dyn ReferencePort,
    program_id: i64,
) -> Result<(), TradebookError> {
    if !refs.program_exists(program_id)? {
        return Err(TradebookError::not_found("program", program_id));
    }
    Ok(())
}

pub fn validate_assets_exist(
    refs: &dyn ReferencePort,
    asset_ids: &[i64],
) -> Result<(), TradebookError> {
    if asset_ids.is_empty() {
        return Ok(());
    }

    let existing = refs.existing_asset_ids(asset_ids)?;
    let mut missing: Vec<i64> = Vec::new();
    for id in asset_ids {
        if !existing.contains(id) && !missing.contains(id) {
            missing.push(*id);
        }
    }

    if !missing.is_empty() {
        return Err(TradebookError::NotFound {
            entity: "asset".to_string(),
            ids: missing,
        });
    }
    Ok(())
}
