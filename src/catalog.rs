//! System catalog for table and column metadata.
//!
//! The catalog is self-hosted: its metadata lives in ordinary heap tables
//! that go through the same page and file machinery as user tables.
//!
//! ## Catalog Tables
//!
//! | Table Name | Columns                                  | Description          |
//! |------------|------------------------------------------|----------------------|
//! | `_tables`  | `table_name`                             | One row per table    |
//! | `_columns` | `table_name`, `column_name`, `data_type` | One row per column   |
//!
//! Both tables are registered in themselves when the catalog is first
//! created, and neither can be dropped.

mod core;
pub mod schema;

pub use self::core::Catalog;
pub use schema::{COLUMNS, TABLES, is_schema_table};
