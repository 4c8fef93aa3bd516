use std::fs;
use std::path::Path;

use cirqle_agent::HistoryTurn;
use cirqle_core::{ApplicationError, PurchaseRecord};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A records file is either a bare JSON array or `{"records": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordsFile {
    List(Vec<PurchaseRecord>),
    Wrapped { records: Vec<PurchaseRecord> },
}

pub fn load_records(path: &Path) -> Result<Vec<PurchaseRecord>, ApplicationError> {
    let file: RecordsFile = read_json(path, "records")?;
    Ok(match file {
        RecordsFile::List(records) | RecordsFile::Wrapped { records } => records,
    })
}

pub fn load_history(path: &Path) -> Result<Vec<HistoryTurn>, ApplicationError> {
    read_json(path, "history")
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, ApplicationError> {
    let display = path.display();
    let raw = fs::read_to_string(path).map_err(|error| {
        ApplicationError::Input(format!("could not read {what} file `{display}`: {error}"))
    })?;

    serde_json::from_str(&raw).map_err(|error| {
        ApplicationError::Input(format!("could not parse {what} file `{display}`: {error}"))
    })
}
