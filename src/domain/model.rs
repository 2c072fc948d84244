use crate::utils::error::{EtlError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived column names, kept in the source dataset's naming.
pub const NOTIFICATION_DATETIME: &str = "BILDIRIM_DATETIME";
pub const INTERVENTION_DATETIME: &str = "MUDAHALE_DATETIME";
pub const DURATION_MINUTES: &str = "MUDAHALE_SURE_DK";
pub const YEAR: &str = "YIL";
pub const ISO_WEEK: &str = "HAFTA";
pub const YEAR_WEEK: &str = "HAFTA_YIL";
pub const WEEKDAY: &str = "GUN_ADI";

/// One table value. Source values load as `Text` or `Null`; the typed
/// variants only appear in derived or parsed columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "null"),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Rows of cells under an ordered list of column identifiers.
///
/// Every transform consumes a table and returns a new one: rows can only be
/// dropped and columns can only be appended.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(EtlError::format(format!("duplicate column '{}'", name)));
            }
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(EtlError::format(format!(
                    "row {} has {} values but there are {} columns",
                    i,
                    row.len(),
                    columns.len()
                )));
            }
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| EtlError::format(format!("missing required column '{}'", name)))
    }

    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Appends a derived column. One cell per row is required.
    pub fn with_column(mut self, name: &str, cells: Vec<Cell>) -> Result<Self> {
        if self.columns.iter().any(|c| c == name) {
            return Err(EtlError::format(format!("column '{}' already exists", name)));
        }
        if cells.len() != self.rows.len() {
            return Err(EtlError::format(format!(
                "column '{}' has {} cells for {} rows",
                name,
                cells.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
        Ok(self)
    }

    /// Rewrites every cell of one column; `f` receives the row index.
    pub fn map_column<F>(mut self, name: &str, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, Cell) -> Result<Cell>,
    {
        let idx = self.column_index(name)?;
        for (i, row) in self.rows.iter_mut().enumerate() {
            let cell = std::mem::replace(&mut row[idx], Cell::Null);
            row[idx] = f(i, cell)?;
        }
        Ok(self)
    }

    pub fn retain_rows<F>(mut self, mut keep: F) -> Self
    where
        F: FnMut(&[Cell]) -> bool,
    {
        self.rows.retain(|row| keep(row));
        self
    }
}
