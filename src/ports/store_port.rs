//! Entity operations port.
//!
//! Every method is one unit of work: implementations validate first and
//! apply all mutations of a call atomically, or none of them.

use crate::domain::asset::{Asset, CreateAssetInput, UpdateAssetInput};
use crate::domain::error::TradebookError;
use crate::domain::program::{CreateProgramInput, Program, UpdateProgramInput};
use crate::domain::status::DeleteOutcome;
use crate::domain::trade::{CreateTradeInput, Trade, TradeWithAssets, UpdateTradeInput};

pub trait StorePort {
    fn create_program(&self, input: &CreateProgramInput) -> Result<Program, TradebookError>;
    fn list_programs(&self) -> Result<Vec<Program>, TradebookError>;
    fn get_program(&self, id: i64) -> Result<Option<Program>, TradebookError>;
    /// `Ok(None)` when the program is missing or no field was supplied.
    fn update_program(
        &self,
        input: &UpdateProgramInput,
    ) -> Result<Option<Program>, TradebookError>;
    /// Deletes the program, its trades and their asset associations.
    fn delete_program(&self, id: i64) -> Result<DeleteOutcome, TradebookError>;

    fn create_asset(&self, input: &CreateAssetInput) -> Result<Asset, TradebookError>;
    fn list_assets(&self) -> Result<Vec<Asset>, TradebookError>;
    fn get_asset(&self, id: i64) -> Result<Option<Asset>, TradebookError>;
    fn update_asset(&self, input: &UpdateAssetInput) -> Result<Option<Asset>, TradebookError>;
    /// Deletes the asset and its associations; trades are kept.
    fn delete_asset(&self, id: i64) -> Result<DeleteOutcome, TradebookError>;

    fn create_trade(&self, input: &CreateTradeInput) -> Result<Trade, TradebookError>;
    fn list_trades(&self) -> Result<Vec<Trade>, TradebookError>;
    fn get_trade(&self, id: i64) -> Result<Option<TradeWithAssets>, TradebookError>;
    fn update_trade(&self, input: &UpdateTradeInput) -> Result<Option<Trade>, TradebookError>;
    fn delete_trade(&self, id: i64) -> Result<DeleteOutcome, TradebookError>;
}
