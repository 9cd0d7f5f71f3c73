//! Spreadsheet access
//!
//! [`WorkbookSource`] is the seam between the loader and the file format;
//! [`CalamineWorkbook`] reads xlsx/xls/xlsb/ods files.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use chrono::NaiveDateTime;

use super::error::StagingError;

/// A single cell as read from the workbook
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Spreadsheet error value such as `#N/A`
    Error(String),
}

impl Cell {
    /// Whether the cell counts as an absent value
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty | Cell::Error(_) => true,
            Cell::Float(f) => f.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => f.write_str("<empty>"),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => write!(f, "{}", v),
            Cell::Text(v) => write!(f, "{:?}", v),
            Cell::Bool(v) => write!(f, "{}", v),
            Cell::DateTime(v) => write!(f, "{}", v),
            Cell::Error(v) => write!(f, "#{}", v),
        }
    }
}

/// A sheet: the first row is the header, the rest are data rows
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub trait WorkbookSource {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    fn read_sheet(&mut self, name: &str) -> Result<Sheet, StagingError>;
}

pub struct CalamineWorkbook {
    path: PathBuf,
    workbook: Sheets<BufReader<File>>,
}

impl CalamineWorkbook {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StagingError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StagingError::WorkbookNotFound(path.to_path_buf()));
        }

        let workbook = open_workbook_auto(path).map_err(|e| StagingError::Workbook {
            file: path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }
}

impl WorkbookSource for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet, StagingError> {
        let range = self
            .workbook
            .worksheet_range(name)
            .map_err(|e| StagingError::Workbook {
                file: self.path.display().to_string(),
                message: format!("sheet '{}': {}", name, e),
            })?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|header| header.iter().map(header_text).collect())
            .unwrap_or_default();
        let rows = rows
            .map(|row| row.iter().map(convert_cell).collect())
            .collect();

        Ok(Sheet::new(name, headers, rows))
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::Int(v) => Cell::Int(*v),
        Data::Float(v) => Cell::Float(*v),
        Data::String(v) => Cell::Text(v.clone()),
        Data::Bool(v) => Cell::Bool(*v),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(v) => Cell::DateTime(v),
            None => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(v) | Data::DurationIso(v) => Cell::Text(v.clone()),
        Data::Error(e) => Cell::Error(format!("{:?}", e)),
    }
}
