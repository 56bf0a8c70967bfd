//! Core domain types and logic.

pub mod asset;
pub mod error;
pub mod money;
pub mod program;
pub mod status;
pub mod trade;
pub mod validation;
