#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use dimensional_pipeline::config::Dimension;
use dimensional_pipeline::sql::{Connector, DbError, SqlConnection, SqlValue};
use dimensional_pipeline::staging::{Cell, Sheet, StagingError, WorkbookSource};
use tempfile::TempDir;

pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

#[derive(Default)]
pub struct DbState {
    pub tables: BTreeMap<String, Vec<Vec<SqlValue>>>,
    /// Table contents at `BEGIN TRANSACTION`
    snapshot: Option<BTreeMap<String, Vec<Vec<SqlValue>>>>,
    /// Every batch and statement seen, in order
    pub statements: Vec<String>,
    pub fail_on: Option<String>,
    pub refuse_connections: bool,
    pub opened: usize,
    pub closed: usize,
}

impl DbState {
    pub fn rows(&self, table: &str) -> &[Vec<SqlValue>] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn executed(&self, needle: &str) -> bool {
        self.statements.iter().any(|s| s.contains(needle))
    }

    fn check_failure(&self, sql: &str) -> Result<(), DbError> {
        match &self.fail_on {
            Some(needle) if sql.contains(needle.as_str()) => {
                Err(DbError::Query(format!("Invalid object name '{}'", needle)))
            }
            _ => Ok(()),
        }
    }
}

/// In-memory stand-in for SQL Server that understands the statements the
/// staging loader issues and records everything else
#[derive(Clone, Default)]
pub struct FakeDatabase {
    state: Arc<Mutex<DbState>>,
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(needle: &str) -> Self {
        let db = Self::default();
        db.state().fail_on = Some(needle.to_string());
        db
    }

    pub fn refusing() -> Self {
        let db = Self::default();
        db.state().refuse_connections = true;
        db
    }

    pub fn state(&self) -> MutexGuard<'_, DbState> {
        self.state.lock().unwrap()
    }

    pub fn connector(&self) -> Arc<dyn Connector> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl Connector for FakeDatabase {
    async fn connect(&self) -> Result<Box<dyn SqlConnection>, DbError> {
        let mut state = self.state();
        if state.refuse_connections {
            return Err(DbError::Connection("Login failed for user 'sa'".to_string()));
        }
        state.opened += 1;
        Ok(Box::new(FakeConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeConnection {
    state: Arc<Mutex<DbState>>,
}

fn table_after<'a>(sql: &'a str, prefix: &str) -> Option<&'a str> {
    sql.strip_prefix(prefix)
        .map(|rest| rest.split_whitespace().next().unwrap_or(""))
}

#[async_trait]
impl SqlConnection for FakeConnection {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());
        state.check_failure(sql)?;

        let sql = sql.trim();
        if let Some(table) = table_after(sql, "TRUNCATE TABLE ") {
            state.tables.insert(table.to_string(), Vec::new());
        } else if sql == "BEGIN TRANSACTION" {
            state.snapshot = Some(state.tables.clone());
        } else if sql == "COMMIT TRANSACTION" {
            state.snapshot = None;
        } else if sql.contains("ROLLBACK TRANSACTION") {
            if let Some(snapshot) = state.snapshot.take() {
                state.tables = snapshot;
            }
        }
        Ok(())
    }

    async fn execute_params(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());
        state.check_failure(sql)?;

        let table = table_after(sql, "INSERT INTO ")
            .ok_or_else(|| DbError::Query(format!("Unsupported statement: {}", sql)))?;
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(params.to_vec());
        Ok(1)
    }

    async fn query_count(&mut self, sql: &str) -> Result<i64, DbError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());
        state.check_failure(sql)?;

        let table = table_after(sql, "SELECT COUNT(*) FROM ")
            .ok_or_else(|| DbError::Query(format!("Unsupported query: {}", sql)))?;
        Ok(state.rows(table).len() as i64)
    }

    async fn close(self: Box<Self>) -> Result<(), DbError> {
        self.state.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Workbook held in memory, sheets kept in insertion order
#[derive(Default)]
pub struct MemoryWorkbook {
    sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        let headers = headers.iter().map(|h| h.to_string()).collect();
        self.sheets.push(Sheet::new(name, headers, rows));
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet, StagingError> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| StagingError::Workbook {
                file: "memory".to_string(),
                message: format!("no sheet named '{}'", name),
            })
    }
}

pub fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

pub fn categories_sheet(workbook: MemoryWorkbook) -> MemoryWorkbook {
    workbook.with_sheet(
        "Categories",
        &["CategoryID", "CategoryName", "Description"],
        vec![
            vec![Cell::Int(1), text("Beverages"), text("Soft drinks, coffees, teas")],
            vec![Cell::Int(2), text("Condiments"), Cell::Empty],
        ],
    )
}

pub fn order_details_sheet(workbook: MemoryWorkbook) -> MemoryWorkbook {
    workbook.with_sheet(
        "Order Details",
        &["OrderID", "ProductID", "UnitPrice", "Quantity", "Discount"],
        vec![
            vec![Cell::Int(10248), Cell::Int(11), Cell::Float(14.0), Cell::Int(12), Cell::Float(0.0)],
            vec![Cell::Int(10248), Cell::Int(42), Cell::Float(9.8), Cell::Int(10), Cell::Float(0.0)],
            vec![Cell::Int(10249), Cell::Int(14), Cell::Float(18.6), Cell::Int(9), Cell::Float(0.15)],
        ],
    )
}

/// Write one script per warehouse update; each mentions its target table
pub fn write_queries(dir: &Path) {
    for dimension in Dimension::ALL {
        let script = "USE {database_name};\nGO\n\
                      MERGE {schema_name}.{dim_table_name} AS target\n\
                      USING {schema_name}.{staging_table_name} AS source\n\
                      ON 1 = 0\n\
                      WHEN NOT MATCHED THEN INSERT DEFAULT VALUES;\n";
        fs::write(dir.join(dimension.script_file()), script).expect("Failed to write script");
    }

    fs::write(
        dir.join("update_fact.sql"),
        "USE {database_name};\nGO\n\
         DELETE FROM {schema_name}.{fact_table_name}\n\
         WHERE OrderDate BETWEEN '{start_date}' AND '{end_date}';\n",
    )
    .expect("Failed to write script");

    fs::write(
        dir.join("update_fact_error.sql"),
        "USE {database_name};\nGO\n\
         INSERT INTO {schema_name}.{fact_error_table_name}\n\
         SELECT * FROM staging WHERE OrderDate BETWEEN '{start_date}' AND '{end_date}';\n",
    )
    .expect("Failed to write script");
}

pub fn write_config(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("sql_server_config.cfg");
    fs::write(&path, content).expect("Failed to write config");
    path
}
