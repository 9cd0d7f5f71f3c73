//! Date range for fact table ingestion

use chrono::NaiveDate;
use serde::Serialize;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {field} format: {value}. Expected format: YYYY-MM-DD")]
    InvalidFormat { field: &'static str, value: String },

    #[error("start_date ({start}) must be before or equal to end_date ({end})")]
    RangeInverted { start: String, end: String },
}

/// A validated, inclusive `start_date..=end_date` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::RangeInverted {
                start: start.format(DATE_FORMAT).to_string(),
                end: end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start = parse_date("start_date", start)?;
        let end = parse_date("end_date", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Text substituted for `{start_date}`
    pub fn start_date(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// Text substituted for `{end_date}`
    pub fn end_date(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start_date(), self.end_date())
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidFormat {
            field,
            value: value.to_string(),
        }
    })
}
