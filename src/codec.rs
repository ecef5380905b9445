//! Backup documents: the whole deck as pretty-printed JSON.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::{CardError, Result};
use crate::model::AppState;

pub fn export_json(state: &AppState) -> Result<String> {
    serde_json::to_string_pretty(state).map_err(CardError::Encode)
}

/// `cards_backup_2024-05-01.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("cards_backup_{}.json", date.format("%Y-%m-%d"))
}

fn has_collection(doc: &Value, key: &str) -> bool {
    doc.get(key).is_some_and(|v| !v.is_null())
}

/// Parses and validates a backup without touching any live state.
///
/// The returned deck has its active tab reset to the first tab (a default
/// tab is added if the document carries none).
pub fn parse_import(text: &str) -> Result<AppState> {
    let doc: Value = serde_json::from_str(text).map_err(CardError::Parse)?;
    if !doc.is_object() {
        return Err(CardError::InvalidFormat("expected a JSON object".into()));
    }
    for key in ["tabs", "cards"] {
        if !has_collection(&doc, key) {
            return Err(CardError::InvalidFormat(format!("missing `{key}`")));
        }
    }
    let mut state: AppState =
        serde_json::from_value(doc).map_err(|e| CardError::InvalidFormat(e.to_string()))?;
    state.active_tab_id.clear();
    state.repair();
    Ok(state)
}
