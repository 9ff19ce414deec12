use serde::{Deserialize, Serialize};

use crate::core::{DataType, DbError, Result, Row, Value};

/// Declared column of a backend table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableColumn {
    pub name: String,
    pub data_type: DataType,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        if !self.data_type.is_compatible(value) {
            return Err(DbError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                self.name,
                self.data_type,
                value.type_name()
            )));
        }
        Ok(())
    }
}

/// One stored table: declared schema plus typed rows.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<TableColumn>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<TableColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    /// Position of a column, matched case-insensitively as generated SQL
    /// identifiers are.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Position of a column matched by exact spelling; bulk loading maps
    /// columns case-sensitively.
    pub fn find_column_exact(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(DbError::ExecutionError(format!(
                "Row width {} does not match table '{}' width {}",
                row.len(),
                self.name,
                self.columns.len()
            )));
        }
        for (column, value) in self.columns.iter().zip(row) {
            column.validate(value)?;
        }
        Ok(())
    }

    pub fn push_row(&mut self, row: Row) -> Result<()> {
        self.validate_row(&row)?;
        self.rows.push(row);
        Ok(())
    }
}
