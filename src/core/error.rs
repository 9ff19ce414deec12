use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("No database connection: {0}")]
    NoConnection(String),

    #[error("Failed to {operation} in table '{table}': {source}")]
    Statement {
        table: String,
        operation: String,
        #[source]
        source: Box<DbError>,
    },

    #[error("Bulk load into table '{table}' failed: {message}")]
    BulkLoad { table: String, message: String },

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Ordinal {ordinal} not found in record for table '{table}'")]
    OrdinalNotFound { table: String, ordinal: usize },

    #[error("Record for table '{0}' declares no key columns")]
    MissingKeys(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
