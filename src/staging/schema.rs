//! Staging tables, their columns, and the sheet names that feed them

use crate::sql::{SqlType, SqlValue};

use crate::sql::SqlType::{Date, Decimal, Integer, Text};

/// A staging table column
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    /// Inserted instead of NULL when the cell is missing
    pub default: Option<bool>,
}

impl Column {
    const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            default: None,
        }
    }

    const fn flag_with_default(name: &'static str, default: bool) -> Self {
        Self {
            name,
            sql_type: SqlType::Boolean,
            default: Some(default),
        }
    }

    pub fn missing_value(&self) -> SqlValue {
        match self.default {
            Some(flag) => SqlValue::Bool(flag),
            None => SqlValue::Null(self.sql_type),
        }
    }
}

const CATEGORIES: &[Column] = &[
    Column::new("CategoryID", Integer),
    Column::new("CategoryName", Text),
    Column::new("Description", Text),
];

const CUSTOMERS: &[Column] = &[
    Column::new("CustomerID", Text),
    Column::new("CompanyName", Text),
    Column::new("ContactName", Text),
    Column::new("ContactTitle", Text),
    Column::new("Address", Text),
    Column::new("City", Text),
    Column::new("Region", Text),
    Column::new("PostalCode", Text),
    Column::new("Country", Text),
    Column::new("Phone", Text),
    Column::new("Fax", Text),
];

const EMPLOYEES: &[Column] = &[
    Column::new("EmployeeID", Integer),
    Column::new("LastName", Text),
    Column::new("FirstName", Text),
    Column::new("Title", Text),
    Column::new("TitleOfCourtesy", Text),
    Column::new("BirthDate", Date),
    Column::new("HireDate", Date),
    Column::new("Address", Text),
    Column::new("City", Text),
    Column::new("Region", Text),
    Column::new("PostalCode", Text),
    Column::new("Country", Text),
    Column::new("HomePhone", Text),
    Column::new("Extension", Text),
    Column::new("Notes", Text),
    Column::new("ReportsTo", Integer),
    Column::new("PhotoPath", Text),
];

const ORDER_DETAILS: &[Column] = &[
    Column::new("OrderID", Integer),
    Column::new("ProductID", Integer),
    Column::new("UnitPrice", Decimal),
    Column::new("Quantity", Integer),
    Column::new("Discount", Decimal),
];

const ORDERS: &[Column] = &[
    Column::new("OrderID", Integer),
    Column::new("CustomerID", Text),
    Column::new("EmployeeID", Integer),
    Column::new("OrderDate", Date),
    Column::new("RequiredDate", Date),
    Column::new("ShippedDate", Date),
    Column::new("ShipVia", Integer),
    Column::new("Freight", Decimal),
    Column::new("TerritoryID", Text),
];

const PRODUCTS: &[Column] = &[
    Column::new("ProductID", Integer),
    Column::new("ProductName", Text),
    Column::new("SupplierID", Integer),
    Column::new("CategoryID", Integer),
    Column::new("QuantityPerUnit", Text),
    Column::new("UnitPrice", Decimal),
    Column::new("UnitsInStock", Integer),
    Column::new("UnitsOnOrder", Integer),
    Column::new("ReorderLevel", Integer),
    Column::flag_with_default("Discontinued", false),
];

const REGION: &[Column] = &[
    Column::new("RegionID", Integer),
    Column::new("RegionDescription", Text),
];

const SHIPPERS: &[Column] = &[
    Column::new("ShipperID", Integer),
    Column::new("CompanyName", Text),
    Column::new("Phone", Text),
];

const SUPPLIERS: &[Column] = &[
    Column::new("SupplierID", Integer),
    Column::new("CompanyName", Text),
    Column::new("ContactName", Text),
    Column::new("ContactTitle", Text),
    Column::new("Address", Text),
    Column::new("City", Text),
    Column::new("Region", Text),
    Column::new("PostalCode", Text),
    Column::new("Country", Text),
    Column::new("Phone", Text),
    Column::new("Fax", Text),
    Column::new("HomePage", Text),
];

const TERRITORIES: &[Column] = &[
    Column::new("TerritoryID", Text),
    Column::new("TerritoryDescription", Text),
    Column::new("RegionID", Integer),
];

/// The ten source entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StagingTable {
    Categories,
    Customers,
    Employees,
    OrderDetails,
    Orders,
    Products,
    Region,
    Shippers,
    Suppliers,
    Territories,
}

/// Sheet name -> staging table. Matching is case-sensitive.
const SHEET_ALIASES: [(&str, StagingTable); 11] = [
    ("Categories", StagingTable::Categories),
    ("Customers", StagingTable::Customers),
    ("Employees", StagingTable::Employees),
    ("Order Details", StagingTable::OrderDetails),
    ("OrderDetails", StagingTable::OrderDetails),
    ("Orders", StagingTable::Orders),
    ("Products", StagingTable::Products),
    ("Region", StagingTable::Region),
    ("Shippers", StagingTable::Shippers),
    ("Suppliers", StagingTable::Suppliers),
    ("Territories", StagingTable::Territories),
];

impl StagingTable {
    /// Summary order used after a load
    pub const ALL: [StagingTable; 10] = [
        StagingTable::Categories,
        StagingTable::Customers,
        StagingTable::Employees,
        StagingTable::Products,
        StagingTable::Region,
        StagingTable::Shippers,
        StagingTable::Suppliers,
        StagingTable::Territories,
        StagingTable::Orders,
        StagingTable::OrderDetails,
    ];

    pub fn for_sheet(sheet_name: &str) -> Option<StagingTable> {
        SHEET_ALIASES
            .iter()
            .find(|(alias, _)| *alias == sheet_name)
            .map(|(_, table)| *table)
    }

    pub fn table_name(&self) -> &'static str {
        match self {
            StagingTable::Categories => "stg_Categories_raw",
            StagingTable::Customers => "stg_Customers_raw",
            StagingTable::Employees => "stg_Employees_raw",
            StagingTable::OrderDetails => "stg_OrderDetails_raw",
            StagingTable::Orders => "stg_Orders_raw",
            StagingTable::Products => "stg_Products_raw",
            StagingTable::Region => "stg_Region_raw",
            StagingTable::Shippers => "stg_Shippers_raw",
            StagingTable::Suppliers => "stg_Suppliers_raw",
            StagingTable::Territories => "stg_Territories_raw",
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            StagingTable::Categories => CATEGORIES,
            StagingTable::Customers => CUSTOMERS,
            StagingTable::Employees => EMPLOYEES,
            StagingTable::OrderDetails => ORDER_DETAILS,
            StagingTable::Orders => ORDERS,
            StagingTable::Products => PRODUCTS,
            StagingTable::Region => REGION,
            StagingTable::Shippers => SHIPPERS,
            StagingTable::Suppliers => SUPPLIERS,
            StagingTable::Territories => TERRITORIES,
        }
    }

    pub fn qualified_name(&self, schema: &str) -> String {
        format!("{}.{}", schema, self.table_name())
    }

    pub fn truncate_sql(&self, schema: &str) -> String {
        format!("TRUNCATE TABLE {}", self.qualified_name(schema))
    }

    pub fn count_sql(&self, schema: &str) -> String {
        format!("SELECT COUNT(*) FROM {}", self.qualified_name(schema))
    }

    /// `INSERT INTO dbo.t (A, B) VALUES (@P1, @P2)`
    pub fn insert_sql(&self, schema: &str) -> String {
        let columns = self.columns();
        let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
        let params: Vec<String> = (1..=columns.len()).map(|i| format!("@P{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.qualified_name(schema),
            names.join(", "),
            params.join(", ")
        )
    }
}

impl std::fmt::Display for StagingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_order_details_spellings() {
        assert_eq!(
            StagingTable::for_sheet("Order Details"),
            Some(StagingTable::OrderDetails)
        );
        assert_eq!(
            StagingTable::for_sheet("OrderDetails"),
            Some(StagingTable::OrderDetails)
        );
    }

    #[test]
    fn test_alias_matching_is_case_sensitive() {
        assert_eq!(StagingTable::for_sheet("categories"), None);
        assert_eq!(StagingTable::for_sheet("Unknown"), None);
        assert_eq!(
            StagingTable::for_sheet("Categories"),
            Some(StagingTable::Categories)
        );
    }

    #[test]
    fn test_every_table_has_an_alias() {
        for table in StagingTable::ALL {
            assert!(SHEET_ALIASES.iter().any(|(_, t)| *t == table));
        }
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            StagingTable::Shippers.insert_sql("dbo"),
            "INSERT INTO dbo.stg_Shippers_raw (ShipperID, CompanyName, Phone) VALUES (@P1, @P2, @P3)"
        );
    }

    #[test]
    fn test_discontinued_defaults_to_false() {
        let discontinued = StagingTable::Products
            .columns()
            .iter()
            .find(|c| c.name == "Discontinued")
            .unwrap();
        assert_eq!(discontinued.missing_value(), SqlValue::Bool(false));

        let reports_to = StagingTable::Employees
            .columns()
            .iter()
            .find(|c| c.name == "ReportsTo")
            .unwrap();
        assert_eq!(reports_to.missing_value(), SqlValue::Null(SqlType::Integer));
    }
}
