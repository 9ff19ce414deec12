// ============================================================================
// rowstore Library
// ============================================================================

pub mod backend;
pub mod connection;
pub mod core;
pub mod facade;
pub mod record;
pub mod result;
pub mod sql;

// Re-export main types for convenience
pub use backend::{Backend, Connection, MemoryBackend, Table, TableColumn};
pub use connection::{ConnectionConfig, Session};
pub use core::{DataType, DbError, Result, Value};
pub use facade::{BulkLoadPolicy, DatabaseManager, SaveMode};
pub use record::{Column, Record};
pub use result::QueryResult;
pub use sql::{BulkLoad, Parameter, Statement};

// ============================================================================
// High-level usage
// ============================================================================
//
// A record type declares its table, column spellings and key set once, as
// plain data; the manager turns populated instances into parameterized
// statements and runs them transactionally:
//
// ```
// use std::sync::Arc;
// use rowstore::{
//     Column, ConnectionConfig, DataType, DatabaseManager, MemoryBackend,
//     Record, SaveMode, TableColumn, Value,
// };
//
// struct CrewMember {
//     columns: Vec<Column>,
// }
//
// impl CrewMember {
//     fn new() -> Self {
//         Self {
//             columns: vec![
//                 Column::new(DataType::Integer, 0),
//                 Column::new(DataType::Text, 1).with_max_length(100),
//             ],
//         }
//     }
// }
//
// impl Record for CrewMember {
//     fn table_name(&self) -> &str {
//         "crewmember"
//     }
//     fn key_ordinals(&self) -> &[usize] {
//         &[0]
//     }
//     fn case_sensitive_column_names(&self) -> &[&str] {
//         &["CrewMemberID", "CrewMemberName"]
//     }
//     fn columns(&self) -> &[Column] {
//         &self.columns
//     }
//     fn columns_mut(&mut self) -> &mut [Column] {
//         &mut self.columns
//     }
// }
//
// # fn main() -> rowstore::Result<()> {
// let backend = MemoryBackend::new();
// backend.create_table(
//     "crewmember",
//     vec![
//         TableColumn::new("CrewMemberID", DataType::Integer),
//         TableColumn::new("CrewMemberName", DataType::Text),
//     ],
// )?;
//
// let manager = DatabaseManager::new(Arc::new(backend), ConnectionConfig::default());
// let mut member = CrewMember::new();
// member.set_value(0, Value::Integer(1))?;
// member.set_value(1, Value::from("Ripley"))?;
// manager.save_one(&member, SaveMode::Insert)?;
// assert!(manager.exists_by_first_key_value(&member)?);
// # Ok(())
// # }
// ```
