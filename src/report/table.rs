//! Tabular building blocks shared by every report and every writer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Long free-text columns are cut to this many characters in reports.
pub const MAX_TEXT_CHARS: usize = 200;

/// A single formatted cell. Writers emit `Number` as a numeric cell and
/// everything else as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    /// Empty text, the rendering of a null column.
    pub fn empty() -> Self {
        CellValue::Text(String::new())
    }

    pub fn date(date: Option<NaiveDate>) -> Self {
        date.map(|date| CellValue::Text(date.format(DATE_FORMAT).to_string()))
            .unwrap_or_else(Self::empty)
    }

    pub fn datetime(datetime: Option<NaiveDateTime>) -> Self {
        datetime
            .map(|datetime| CellValue::Text(datetime.format(DATETIME_FORMAT).to_string()))
            .unwrap_or_else(Self::empty)
    }

    /// Text cell cut to [`MAX_TEXT_CHARS`] with a trailing `...`.
    pub fn truncated(text: Option<&str>) -> Self {
        let Some(text) = text else {
            return Self::empty();
        };
        if text.chars().count() <= MAX_TEXT_CHARS {
            return CellValue::Text(text.to_string());
        }
        let mut cut: String = text.chars().take(MAX_TEXT_CHARS - 3).collect();
        cut.push_str("...");
        CellValue::Text(cut)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{number:.0}")
            }
            CellValue::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map(CellValue::Text).unwrap_or_else(Self::empty)
    }
}

impl From<Option<&String>> for CellValue {
    fn from(value: Option<&String>) -> Self {
        value.cloned().into()
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<Option<i64>> for CellValue {
    fn from(value: Option<i64>) -> Self {
        value.map(Into::into).unwrap_or_else(Self::empty)
    }
}

impl From<Option<i32>> for CellValue {
    fn from(value: Option<i32>) -> Self {
        value.map(Into::into).unwrap_or_else(Self::empty)
    }
}

/// A named table: ordered column labels plus rows of the same width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or cutting it to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::empty());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as column-label to value mappings.
    pub fn records(&self) -> Vec<BTreeMap<&str, &CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(String::as_str)
                    .zip(row.iter())
                    .collect()
            })
            .collect()
    }
}
