//! Read-only existence lookups used by the validation layer.

use std::collections::HashSet;

use crate::domain::error::TradebookError;

pub trait ReferencePort {
    fn program_exists(&self, program_id: i64) -> Result<bool, TradebookError>;

    /// The subset of `asset_ids` that name existing assets.
    fn existing_asset_ids(&self, asset_ids: &[i64]) -> Result<HashSet<i64>, TradebookError>;
}
