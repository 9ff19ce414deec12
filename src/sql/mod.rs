pub mod builder;
pub mod statement;

pub use statement::{BulkLoad, Parameter, Statement, DEFAULT_STATEMENT_TIMEOUT};
