//! Tabular report results.
//!
//! Rows come back from the store as [`Record`]s (ordered column → value maps)
//! and are gathered into a [`Table`] with a column list and row-major values.

use std::io::Write;

use rusqlite::types::ValueRef;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::Result;

/// One result row, keyed by column name in select order
pub type Record = Map<String, Value>;

/// Convert a raw SQLite value into a JSON value
#[must_use]
pub fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}

/// A materialized query result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// A table with no columns and no rows
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from records.
    ///
    /// Columns are taken from record keys in first-seen order. A record
    /// missing a column gets `null` in that cell. No records means no columns.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|column| record.remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Column names
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row-major cell values
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    /// A single cell
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Rows as records again
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        self.rows.iter().map(|row| {
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect::<Record>()
        })
    }

    /// Deserialize every row into a typed model
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.records()
            .map(|record| serde_json::from_value(Value::Object(record)).map_err(Into::into))
            .collect()
    }

    /// Render as a JSON array of objects
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(self.records().map(Value::Object).collect())
    }

    /// Write as CSV with a header row. Nulls become empty cells.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(csv_cell))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn csv_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => Record::new(),
        }
    }

    #[test]
    fn test_empty_records_give_empty_table() {
        let table = Table::from_records(Vec::new());
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        assert_eq!(table, Table::empty());
    }

    #[test]
    fn test_columns_keep_select_order() {
        let table = Table::from_records(vec![
            record(json!({"status": "open", "count": 3, "percentage": 75.0})),
            record(json!({"status": "resolved", "count": 1, "percentage": 25.0})),
        ]);
        assert_eq!(table.columns(), ["status", "count", "percentage"]);
        assert_eq!(table.get(1, "status"), Some(&json!("resolved")));
        assert_eq!(table.column("count"), Some(vec![&json!(3), &json!(1)]));
        assert!(table.column("missing").is_none());
    }

    #[test]
    fn test_ragged_records_fill_nulls() {
        let table = Table::from_records(vec![record(json!({"a": 1})), record(json!({"b": 2}))]);
        assert_eq!(table.columns(), ["a", "b"]);
        assert_eq!(table.rows()[0], vec![json!(1), Value::Null]);
        assert_eq!(table.rows()[1], vec![Value::Null, json!(2)]);
    }

    #[test]
    fn test_write_csv() {
        let table = Table::from_records(vec![
            record(json!({"agent_name": "Sam", "avg_response_time": 1.5})),
            record(json!({"agent_name": "Lee, J", "avg_response_time": null})),
        ]);
        let mut out = Vec::new();
        table.write_csv(&mut out).expect("csv should render");
        let text = String::from_utf8(out).expect("csv is utf-8");
        assert_eq!(text, "agent_name,avg_response_time\nSam,1.5\n\"Lee, J\",\n");
    }

    #[test]
    fn test_sql_values_map_to_json() {
        assert_eq!(sql_to_json(ValueRef::Null), Value::Null);
        assert_eq!(sql_to_json(ValueRef::Integer(7)), json!(7));
        assert_eq!(sql_to_json(ValueRef::Real(f64::NAN)), Value::Null);
        assert_eq!(sql_to_json(ValueRef::Text(b"hi")), json!("hi"));
        assert_eq!(sql_to_json(ValueRef::Blob(&[1, 2])), json!([1, 2]));
    }
}
