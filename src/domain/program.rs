//! Programs: the parent entity of trades.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::TradebookError;
use crate::domain::validation::{require_non_empty, validate_date_range};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProgramInput {
    pub name: String,
    pub description: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl CreateProgramInput {
    pub fn validate(&self) -> Result<(), TradebookError> {
        require_non_empty("name", &self.name)?;
        require_non_empty("status", &self.status)?;
        validate_date_range(self.start_date, self.end_date)
    }
}

/// Partial update: `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProgramInput {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl UpdateProgramInput {
    pub fn has_changes(&self) -> bool {
        self.name.is_some()
            || self.description.is_some()
            || self.status.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
    }

    /// Checks that need no stored state.
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

    /// Merged view of `existing` with the supplied fields applied. The date
    /// range of the result is checked again.
    pub fn apply(&self, existing: Program) -> Result<Program, TradebookError> {
        let merged = Program {
            name: self.name.clone().unwrap_or(existing.name),
            description: self.description.clone().unwrap_or(existing.description),
            status: self.status.clone().unwrap_or(existing.status),
            start_date: self.start_date.unwrap_or(existing.start_date),
            end_date: self.end_date.unwrap_or(existing.end_date),
            ..existing
        };
        validate_date_range(merged.start_date, merged.end_date)?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn stored() -> Program {
        Program {
            id: 3,
            name: "Growth".into(),
            description: "Growth program".into(),
            status: "active".into(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 12, 31),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_update_has_no_changes() {
        let input = UpdateProgramInput {
            id: 3,
            ..Default::default()
        };
        assert!(!input.has_changes());
    }

    #[test]
    fn apply_changes_only_supplied_fields() {
        let existing = stored();
        let input = UpdateProgramInput {
            id: 3,
            status: Some("closed".into()),
            ..Default::default()
        };
        let merged = input.apply(existing.clone()).unwrap();
        assert_eq!(merged.status, "closed");
        assert_eq!(merged.name, existing.name);
        assert_eq!(merged.created_at, existing.created_at);
    }

    #[test]
    fn apply_rejects_start_moved_past_stored_end() {
        let input = UpdateProgramInput {
            id: 3,
            start_date: Some(date(2025, 1, 1)),
            ..Default::default()
        };
        assert!(matches!(
            input.apply(stored()),
            Err(TradebookError::InvalidRange { .. })
        ));
    }

    #[test]
    fn create_requires_name_and_status() {
        let input = CreateProgramInput {
            name: String::new(),
            description: String::new(),
            status: "active".into(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 2, 1),
        };
        assert!(matches!(
            input.validate(),
            Err(TradebookError::InvalidInput { .. })
        ));
    }
}
