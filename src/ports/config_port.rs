//! Configuration access port trait.

use crate::domain::error::TradebookError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Required string value; blank values count as missing.
    fn require_string(&self, section: &str, key: &str) -> Result<String, TradebookError> {
        match self.get_string(section, key) {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(TradebookError::ConfigMissing {
                section: section.to_string(),
                key: key.to_string(),
            }),
        }
    }
}
