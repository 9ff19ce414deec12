//! The driver boundary.
//!
//! The wire protocol to the relational backend is an external collaborator;
//! the engine only requires the capabilities below. Drivers are free to
//! execute `Statement::sql` with its bound parameters, or to interpret the
//! statement shapes the builder generates; the reference in-memory driver
//! does the latter.

pub mod memory;
pub mod table;

use crate::core::Result;
use crate::result::QueryResult;
use crate::sql::{BulkLoad, Statement};

pub use memory::MemoryBackend;
pub use table::{Table, TableColumn};

/// Connection factory for a concrete driver.
pub trait Backend: Send + Sync {
    fn connect(&self) -> Result<Box<dyn Connection>>;
}

/// One open driver connection.
///
/// Transactions are connection-scoped: at most one is active at a time,
/// `begin` opens it, `commit`/`rollback` close it. Statement execution
/// outside a transaction applies immediately.
pub trait Connection: Send {
    /// Execute a statement that returns no rows; reports rows affected.
    fn execute(&mut self, statement: &Statement) -> Result<u64>;

    /// Execute a statement and read all produced rows.
    fn query(&mut self, statement: &Statement) -> Result<QueryResult>;

    /// Server-side bulk row transfer with case-sensitive column mapping.
    fn bulk_load(&mut self, load: &BulkLoad) -> Result<()>;

    fn begin(&mut self) -> Result<()>;

    fn commit(&mut self) -> Result<()>;

    fn rollback(&mut self) -> Result<()>;

    /// Read-only introspection probe reporting server properties.
    fn server_info(&mut self) -> Result<Vec<(String, String)>>;

    fn close(&mut self) -> Result<()>;
}
