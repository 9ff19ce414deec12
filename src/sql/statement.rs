use std::time::Duration;

use crate::core::{DataType, Value};

/// Execution timeout applied to every statement unless configuration
/// overrides it.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(300);

/// A named value bound to a statement.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub data_type: DataType,
    pub value: Value,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: DataType, value: Value) -> Self {
        Self {
            name: name.into(),
            data_type,
            value,
        }
    }
}

/// One executable parameterized statement.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Parameter>,
    pub timeout: Duration,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    pub fn with_params(mut self, params: Vec<Parameter>) -> Self {
        self.params = params;
        self
    }

    /// Look up a bound parameter by name, case-insensitively.
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// An in-memory tabular buffer for a server-side bulk row transfer.
///
/// Column names keep their declared casing; bulk loading maps columns
/// case-sensitively.
#[derive(Debug, Clone)]
pub struct BulkLoad {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}
