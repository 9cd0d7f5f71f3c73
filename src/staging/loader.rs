//! Staging loader
//!
//! Full refresh of every staging table from a workbook: each mapped sheet
//! truncates its table, inserts all of its rows inside one transaction and
//! reports the resulting row count.

use serde::Serialize;
use tracing::{info, instrument, warn};

use super::coerce::coerce;
use super::error::StagingError;
use super::schema::StagingTable;
use super::workbook::{Cell, Sheet, WorkbookSource};
use crate::sql::{Connector, SqlConnection, SqlValue};

const BEGIN: &str = "BEGIN TRANSACTION";
const COMMIT: &str = "COMMIT TRANSACTION";
const ROLLBACK: &str = "IF @@TRANCOUNT > 0 ROLLBACK TRANSACTION";

/// One loaded sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetLoad {
    pub sheet: String,
    pub table: String,
    pub rows_inserted: usize,
    pub row_count: i64,
}

/// Result of a staging load
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub loaded: Vec<SheetLoad>,
    pub skipped: Vec<String>,
    /// Row count of every staging table after the load
    pub summary: Vec<(String, i64)>,
}

impl LoadReport {
    pub fn loaded_tables(&self) -> Vec<&str> {
        self.loaded.iter().map(|l| l.table.as_str()).collect()
    }

    pub fn summary_count(&self, table: &str) -> Option<i64> {
        self.summary
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, count)| *count)
    }
}

pub struct StagingLoader {
    schema: String,
}

impl Default for StagingLoader {
    fn default() -> Self {
        Self::new("dbo")
    }
}

impl StagingLoader {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
        }
    }

    /// Load every mapped sheet. On error the open transaction is rolled
    /// back; the connection is closed on every path.
    #[instrument(skip_all, fields(schema = %self.schema))]
    pub async fn load(
        &self,
        workbook: &mut dyn WorkbookSource,
        connector: &dyn Connector,
    ) -> Result<LoadReport, StagingError> {
        let mut conn = connector.connect().await?;

        let result = self.load_sheets(workbook, conn.as_mut()).await;

        if result.is_err() {
            if let Err(e) = conn.execute_batch(ROLLBACK).await {
                warn!("Rollback failed: {}", e);
            }
        }
        if let Err(e) = conn.close().await {
            warn!("Failed to close connection: {}", e);
        }

        result
    }

    async fn load_sheets(
        &self,
        workbook: &mut dyn WorkbookSource,
        conn: &mut dyn SqlConnection,
    ) -> Result<LoadReport, StagingError> {
        let mut report = LoadReport::default();
        let sheet_names = workbook.sheet_names();
        info!("Available sheets in workbook: {}", sheet_names.join(", "));

        for sheet_name in sheet_names {
            let Some(table) = StagingTable::for_sheet(&sheet_name) else {
                warn!("Skipping sheet '{}' (not in mapping)", sheet_name);
                report.skipped.push(sheet_name);
                continue;
            };

            info!("Loading {} -> {}", sheet_name, table);
            let sheet = workbook.read_sheet(&sheet_name)?;
            let rows = self.coerce_rows(&sheet, table)?;

            conn.execute_batch(&table.truncate_sql(&self.schema)).await?;

            conn.execute_batch(BEGIN).await?;
            let insert = table.insert_sql(&self.schema);
            for row in &rows {
                conn.execute_params(&insert, row).await?;
            }
            conn.execute_batch(COMMIT).await?;

            let row_count = conn.query_count(&table.count_sql(&self.schema)).await?;
            info!("Loaded {} rows into {}", row_count, table);

            report.loaded.push(SheetLoad {
                sheet: sheet_name,
                table: table.table_name().to_string(),
                rows_inserted: rows.len(),
                row_count,
            });
        }

        info!("All data loaded successfully");
        report.summary = self.summarize(conn).await;
        Ok(report)
    }

    /// Convert every row before touching the table so a bad cell never
    /// leaves a half-loaded sheet behind
    fn coerce_rows(&self, sheet: &Sheet, table: StagingTable) -> Result<Vec<Vec<SqlValue>>, StagingError> {
        let columns = table.columns();
        let positions = columns
            .iter()
            .map(|column| {
                sheet
                    .column_index(column.name)
                    .ok_or_else(|| StagingError::MissingColumn {
                        sheet: sheet.name.clone(),
                        column: column.name.to_string(),
                    })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let mut rows = Vec::with_capacity(sheet.len());
        for (row_idx, cells) in sheet.rows.iter().enumerate() {
            let mut values = Vec::with_capacity(columns.len());
            for (column, &idx) in columns.iter().zip(&positions) {
                let cell = cells.get(idx).unwrap_or(&Cell::Empty);
                let value = coerce(cell, column).map_err(|failure| StagingError::Coercion {
                    sheet: sheet.name.clone(),
                    // 1-based, counting the header row
                    row: row_idx + 2,
                    column: column.name.to_string(),
                    value: failure.value,
                    expected: failure.expected,
                })?;
                values.push(value);
            }
            rows.push(values);
        }

        Ok(rows)
    }

    async fn summarize(&self, conn: &mut dyn SqlConnection) -> Vec<(String, i64)> {
        let mut summary = Vec::with_capacity(StagingTable::ALL.len());
        for table in StagingTable::ALL {
            let count = match conn.query_count(&table.count_sql(&self.schema)).await {
                Ok(count) => count,
                Err(e) => {
                    warn!("Could not count {}: {}", table, e);
                    0
                }
            };
            info!("  {}: {} rows", table, count);
            summary.push((table.table_name().to_string(), count));
        }
        summary
    }
}
