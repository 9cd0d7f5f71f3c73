//! Cell to column-type coercion
//!
//! Missing cells become the column's missing value (a typed NULL unless
//! the column declares a default). Present values that cannot be read as
//! the column type are rejected.

use chrono::{NaiveDate, NaiveDateTime};

use super::schema::Column;
use super::workbook::Cell;
use crate::sql::{SqlType, SqlValue};

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Why a present cell could not be converted
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionFailure {
    pub value: String,
    pub expected: SqlType,
}

pub fn coerce(cell: &Cell, column: &Column) -> Result<SqlValue, CoercionFailure> {
    if cell.is_missing() {
        return Ok(column.missing_value());
    }

    let converted = match column.sql_type {
        SqlType::Integer => to_integer(cell).map(SqlValue::Int),
        SqlType::Decimal => to_decimal(cell).map(SqlValue::Decimal),
        SqlType::Text => Some(SqlValue::Text(to_text(cell))),
        SqlType::Boolean => to_boolean(cell).map(SqlValue::Bool),
        SqlType::Date => to_date(cell).map(SqlValue::Date),
    };

    converted.ok_or_else(|| CoercionFailure {
        value: cell.to_string(),
        expected: column.sql_type,
    })
}

fn to_integer(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Int(v) => Some(*v),
        Cell::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(*v as i64),
        Cell::Text(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

fn to_decimal(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Int(v) => Some(*v as f64),
        Cell::Float(v) if v.is_finite() => Some(*v),
        Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn to_text(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => s.clone(),
        Cell::Int(v) => v.to_string(),
        // Numeric IDs and postal codes often arrive as floats
        Cell::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", *v as i64),
        Cell::Float(v) => v.to_string(),
        Cell::Bool(true) => "True".to_string(),
        Cell::Bool(false) => "False".to_string(),
        Cell::DateTime(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
        Cell::Empty | Cell::Error(_) => String::new(),
    }
}

fn to_boolean(cell: &Cell) -> Option<bool> {
    match cell {
        Cell::Bool(v) => Some(*v),
        Cell::Int(v) => Some(*v != 0),
        Cell::Float(v) => Some(*v != 0.0),
        Cell::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_date(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(v) => Some(*v),
        Cell::Text(s) => parse_date_text(s.trim()),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::schema::StagingTable;

    fn column(table: StagingTable, name: &str) -> Column {
        *table.columns().iter().find(|c| c.name == name).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_missing_cells_become_typed_null() {
        let region = column(StagingTable::Customers, "Region");
        assert_eq!(coerce(&Cell::Empty, &region), Ok(SqlValue::Null(SqlType::Text)));
        assert_eq!(
            coerce(&Cell::Float(f64::NAN), &region),
            Ok(SqlValue::Null(SqlType::Text))
        );

        let reports_to = column(StagingTable::Employees, "ReportsTo");
        assert_eq!(
            coerce(&Cell::Error("NA".into()), &reports_to),
            Ok(SqlValue::Null(SqlType::Integer))
        );
    }

    #[test]
    fn test_missing_never_becomes_placeholder_text() {
        let fax = column(StagingTable::Suppliers, "Fax");
        let value = coerce(&Cell::Empty, &fax).unwrap();
        assert!(value.is_null());
        assert_ne!(value, SqlValue::Text("nan".into()));
        assert_ne!(value, SqlValue::Text("None".into()));
    }

    #[test]
    fn test_missing_discontinued_defaults_false() {
        let discontinued = column(StagingTable::Products, "Discontinued");
        assert_eq!(coerce(&Cell::Empty, &discontinued), Ok(SqlValue::Bool(false)));
        assert_eq!(coerce(&Cell::Int(1), &discontinued), Ok(SqlValue::Bool(true)));
        assert_eq!(
            coerce(&Cell::Text("FALSE".into()), &discontinued),
            Ok(SqlValue::Bool(false))
        );
    }

    #[test]
    fn test_integer_coercion() {
        let id = column(StagingTable::Categories, "CategoryID");
        assert_eq!(coerce(&Cell::Int(7), &id), Ok(SqlValue::Int(7)));
        assert_eq!(coerce(&Cell::Float(7.0), &id), Ok(SqlValue::Int(7)));
        assert_eq!(coerce(&Cell::Text(" 12 ".into()), &id), Ok(SqlValue::Int(12)));
        assert!(coerce(&Cell::Float(7.5), &id).is_err());
        assert!(coerce(&Cell::Text("seven".into()), &id).is_err());
        assert_eq!(coerce(&Cell::Text("1e3".into()), &id), Ok(SqlValue::Int(1000)));
    }

    #[test]
    fn test_out_of_range_integer_rejected() {
        let id = column(StagingTable::Orders, "OrderID");
        let failure = coerce(&Cell::Text("1e30".into()), &id).unwrap_err();
        assert_eq!(failure.expected, SqlType::Integer);
        assert!(coerce(&Cell::Float(-1e30), &id).is_err());
    }

    #[test]
    fn test_decimal_coercion() {
        let price = column(StagingTable::OrderDetails, "UnitPrice");
        assert_eq!(coerce(&Cell::Float(14.4), &price), Ok(SqlValue::Decimal(14.4)));
        assert_eq!(coerce(&Cell::Int(10), &price), Ok(SqlValue::Decimal(10.0)));
        assert_eq!(
            coerce(&Cell::Text("0.15".into()), &price),
            Ok(SqlValue::Decimal(0.15))
        );

        let failure = coerce(&Cell::Text("cheap".into()), &price).unwrap_err();
        assert_eq!(failure.expected, SqlType::Decimal);
        assert_eq!(failure.value, "\"cheap\"");
    }

    #[test]
    fn test_text_coercion() {
        let postal = column(StagingTable::Customers, "PostalCode");
        assert_eq!(
            coerce(&Cell::Float(12209.0), &postal),
            Ok(SqlValue::Text("12209".into()))
        );
        assert_eq!(
            coerce(&Cell::Int(5021), &postal),
            Ok(SqlValue::Text("5021".into()))
        );
        assert_eq!(
            coerce(&Cell::Text("WA1 1DP".into()), &postal),
            Ok(SqlValue::Text("WA1 1DP".into()))
        );
    }

    #[test]
    fn test_date_coercion() {
        let order_date = column(StagingTable::Orders, "OrderDate");
        assert_eq!(
            coerce(&Cell::DateTime(date(1996, 7, 4)), &order_date),
            Ok(SqlValue::Date(date(1996, 7, 4)))
        );
        assert_eq!(
            coerce(&Cell::Text("1996-07-04".into()), &order_date),
            Ok(SqlValue::Date(date(1996, 7, 4)))
        );
        assert_eq!(
            coerce(&Cell::Text("07/04/1996".into()), &order_date),
            Ok(SqlValue::Date(date(1996, 7, 4)))
        );
        assert!(coerce(&Cell::Int(35250), &order_date).is_err());
        assert!(coerce(&Cell::Text("July 4th".into()), &order_date).is_err());
    }
}
