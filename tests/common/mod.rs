#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;
use tradebook::adapters::sqlite::SqliteStore;
use tradebook::domain::asset::CreateAssetInput;
use tradebook::domain::program::CreateProgramInput;
use tradebook::domain::trade::CreateTradeInput;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

pub fn fresh_store() -> SqliteStore {
    let store = SqliteStore::in_memory().unwrap();
    store.initialize_schema().unwrap();
    store
}

pub fn program_input(name: &str) -> CreateProgramInput {
    CreateProgramInput {
        name: name.to_string(),
        description: format!("{name} program"),
        status: "active".to_string(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
    }
}

pub fn asset_input(name: &str, value: &str, currency: &str) -> CreateAssetInput {
    CreateAssetInput {
        name: name.to_string(),
        description: format!("{name} holding"),
        currency: currency.to_string(),
        value: dec(value),
        date: date(2024, 1, 15),
    }
}

pub fn trade_input(name: &str, program_id: i64, asset_ids: Option<Vec<i64>>) -> CreateTradeInput {
    CreateTradeInput {
        name: name.to_string(),
        description: format!("{name} trade"),
        status: "pending".to_string(),
        start_date: date(2024, 2, 1),
        end_date: date(2024, 2, 28),
        program_id,
        asset_ids,
    }
}
