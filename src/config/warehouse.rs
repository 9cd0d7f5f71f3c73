//! Warehouse naming
//!
//! Names of the target database, schema, dimension and fact tables, and the
//! staging table each dimension is built from.

use serde::{Deserialize, Serialize};

/// The eight dimensions, in the order the flow refreshes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Categories,
    Customers,
    Employees,
    Products,
    Region,
    Shippers,
    Suppliers,
    Territories,
}

impl Dimension {
    pub const ALL: [Dimension; 8] = [
        Dimension::Categories,
        Dimension::Customers,
        Dimension::Employees,
        Dimension::Products,
        Dimension::Region,
        Dimension::Shippers,
        Dimension::Suppliers,
        Dimension::Territories,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            Dimension::Categories => "DimCategories",
            Dimension::Customers => "DimCustomers",
            Dimension::Employees => "DimEmployees",
            Dimension::Products => "DimProducts",
            Dimension::Region => "DimRegion",
            Dimension::Shippers => "DimShippers",
            Dimension::Suppliers => "DimSuppliers",
            Dimension::Territories => "DimTerritories",
        }
    }

    pub fn staging_table(&self) -> &'static str {
        match self {
            Dimension::Categories => "stg_Categories_raw",
            Dimension::Customers => "stg_Customers_raw",
            Dimension::Employees => "stg_Employees_raw",
            Dimension::Products => "stg_Products_raw",
            Dimension::Region => "stg_Region_raw",
            Dimension::Shippers => "stg_Shippers_raw",
            Dimension::Suppliers => "stg_Suppliers_raw",
            Dimension::Territories => "stg_Territories_raw",
        }
    }

    /// `DimCategories` -> `update_dim_categories.sql`
    pub fn script_file(&self) -> String {
        let name = self.table_name().trim_start_matches("Dim").to_lowercase();
        format!("update_dim_{}.sql", name)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseNames {
    pub database: String,
    pub schema: String,
    pub fact_orders: String,
    pub fact_orders_error: String,
}

impl Default for WarehouseNames {
    fn default() -> Self {
        Self {
            database: "ORDER_DDS".to_string(),
            schema: "dbo".to_string(),
            fact_orders: "FactOrders".to_string(),
            fact_orders_error: "FactOrders_Error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_file_names() {
        assert_eq!(
            Dimension::Categories.script_file(),
            "update_dim_categories.sql"
        );
        assert_eq!(Dimension::Region.script_file(), "update_dim_region.sql");
        assert_eq!(
            Dimension::Territories.script_file(),
            "update_dim_territories.sql"
        );
    }

    #[test]
    fn test_staging_tables_are_distinct() {
        let mut tables: Vec<_> = Dimension::ALL.iter().map(|d| d.staging_table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), 8);
    }
}
