use crate::models::{is_valid_amount, Expense};
use serde_json::Value;
use std::{collections::HashSet, path::Path};
use tokio::fs;
use tracing::{error, warn};

pub const EMPTY_COLLECTION: &str = "[]";

/// Raw storage text; a missing or blank file reads as the empty collection.
pub async fn load_snapshot(path: &Path) -> String {
    match fs::read_to_string(path).await {
        Ok(text) if text.trim().is_empty() => EMPTY_COLLECTION.to_string(),
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => EMPTY_COLLECTION.to_string(),
        Err(err) => {
            error!("failed to read data file: {err}");
            EMPTY_COLLECTION.to_string()
        }
    }
}

pub async fn load_collection(path: &Path) -> Vec<Expense> {
    decode_collection(&load_snapshot(path).await)
}

/// Decodes stored text into a collection of well-formed records.
///
/// Elements that fail to decode, carry a blank description or an amount
/// outside `0 < amount <= MAX_AMOUNT` are dropped, as are records repeating
/// an earlier identifier.
pub fn decode_collection(text: &str) -> Vec<Expense> {
    let items = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            error!("data file does not hold an array (found {})", kind_of(&other));
            return Vec::new();
        }
        Err(err) => {
            error!("failed to parse data file: {err}");
            return Vec::new();
        }
    };

    let mut seen = HashSet::with_capacity(items.len());
    let mut expenses = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let expense = match serde_json::from_value::<Expense>(item) {
            Ok(expense) => expense,
            Err(err) => {
                warn!(index, "dropping malformed expense: {err}");
                continue;
            }
        };
        if expense.description.trim().is_empty() {
            warn!(index, id = %expense.id, "dropping expense with empty description");
            continue;
        }
        if !is_valid_amount(expense.amount) {
            warn!(index, id = %expense.id, amount = %expense.amount, "dropping expense with out-of-range amount");
            continue;
        }
        if !seen.insert(expense.id.clone()) {
            warn!(index, id = %expense.id, "dropping expense with duplicate id");
            continue;
        }
        expenses.push(expense);
    }
    expenses
}

/// Overwrites the storage file with `bytes` as-is.
pub async fn write_snapshot(path: &Path, bytes: &[u8]) -> Result<(), std::io::Error> {
    fs::write(path, bytes).await
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn missing_file_reads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_eq!(load_snapshot(&path).await, "[]");
        assert!(load_collection(&path).await.is_empty());
    }

    #[tokio::test]
    async fn blank_file_reads_as_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.json");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(load_snapshot(&path).await, "[]");
    }

    #[tokio::test]
    async fn write_then_load_returns_same_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let body = r#"[{"id":"1","description":"Lunch","amount":4.5,"category":"Food","date":"2024-01-01"},
                       {"id":"2","description":"Bus","amount":10,"category":"Transport","date":"2024-03-01"}]"#;

        write_snapshot(&path, body.as_bytes()).await.unwrap();
        assert_eq!(load_snapshot(&path).await, body);

        let expenses = load_collection(&path).await;
        assert_eq!(expenses.len(), 2);
        assert_eq!(expenses[0].id, "1");
        assert_eq!(expenses[0].amount, Decimal::new(450, 2));
        assert_eq!(expenses[1].category, Category::Transport);
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("data.json");
        assert!(write_snapshot(&path, b"[]").await.is_err());
    }

    #[test]
    fn decode_drops_malformed_and_duplicate_records() {
        let text = r#"[
            {"id":"a","description":"Lunch","amount":4.5,"category":"Food","date":"2024-01-01"},
            {"id":"b","description":"","amount":3,"category":"Food","date":"2024-01-01"},
            {"id":"c","description":"Refund","amount":-3,"category":"Other","date":"2024-01-01"},
            {"id":"d","description":"No date","amount":3,"category":"Other"},
            {"id":"e","description":"Bad date","amount":3,"category":"Other","date":"yesterday"},
            {"id":"a","description":"Again","amount":1,"category":"Food","date":"2024-01-02"},
            "junk",
            {"id":"f","description":"Cinema","amount":12,"category":"Entertainment","date":"2024-02-10"}
        ]"#;

        let ids: Vec<_> = decode_collection(text).into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a", "f"]);
    }

    #[test]
    fn decode_drops_out_of_range_amounts() {
        let text = r#"[
            {"id":"huge","description":"Yacht","amount":50000000000000000000000000000,"category":"Shopping","date":"2024-01-01"},
            {"id":"huge-2","description":"Yacht","amount":50000000000000000000000000000,"category":"Shopping","date":"2024-01-02"},
            {"id":"over","description":"Island","amount":1000000000.01,"category":"Other","date":"2024-01-03"},
            {"id":"max","description":"House","amount":1000000000,"category":"Other","date":"2024-01-04"}
        ]"#;

        let expenses = decode_collection(text);
        let ids: Vec<_> = expenses.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["max"]);
        assert_eq!(crate::views::summary(&expenses).display, "$1000000000.00");
    }

    #[test]
    fn decode_non_array_yields_empty() {
        assert!(decode_collection(r#"{"days":{}}"#).is_empty());
        assert!(decode_collection("not json").is_empty());
    }
}
