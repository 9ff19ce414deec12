use lazy_static::lazy_static;
use regex::Regex;

use super::Column;
use crate::core::{temporal, DataType, DbError, Result, Value};
use crate::sql::Parameter;

lazy_static! {
    static ref PARAM_ILLEGAL: Regex = Regex::new(r"[!?@#$%\-]").unwrap();
}

/// Derive a parameter identifier from a column name by replacing characters
/// that are illegal in parameter names.
pub fn parameter_name(column_name: &str) -> String {
    PARAM_ILLEGAL.replace_all(column_name, "_").into_owned()
}

/// Contract implemented by every persistable record type.
///
/// A record is a fixed ordered collection of [`Column`]s plus static
/// metadata: backing table name, declared column spellings, and the
/// key-column set. Implementors provide the five required accessors; the
/// rest of the surface is derived and identical for every type.
///
/// The engine only ever borrows records: it reads metadata and values, it
/// never mutates them.
pub trait Record {
    /// Backing table identifier; constant per type.
    fn table_name(&self) -> &str;

    /// Ordinals of the columns forming the key predicate. Must be non-empty
    /// and every ordinal must exist in the column list.
    fn key_ordinals(&self) -> &[usize];

    /// Declared column spellings by ordinal. Bulk loading maps columns
    /// case-sensitively, so the declared casing must match the backend's.
    fn case_sensitive_column_names(&self) -> &[&str];

    fn columns(&self) -> &[Column];

    fn columns_mut(&mut self) -> &mut [Column];

    /// Column identifiers for generated SQL, in ordinal order. Generated
    /// identifiers are case-insensitive, so these are the lowercased
    /// spellings.
    fn column_names(&self) -> Vec<String> {
        self.case_sensitive_column_names()
            .iter()
            .map(|name| name.to_lowercase())
            .collect()
    }

    /// Key-column names, in key-ordinal order.
    fn keys(&self) -> Vec<String> {
        let names = self.column_names();
        self.key_ordinals()
            .iter()
            .map(|&ordinal| names[ordinal].clone())
            .collect()
    }

    /// All column names excluding keys, in ordinal order.
    fn column_names_no_key(&self) -> Vec<String> {
        let keys = self.key_ordinals();
        self.case_sensitive_column_names()
            .iter()
            .enumerate()
            .filter(|(ordinal, _)| !keys.contains(ordinal))
            .map(|(_, name)| name.to_lowercase())
            .collect()
    }

    fn parameter_names(&self) -> Vec<String> {
        self.column_names()
            .iter()
            .map(|name| parameter_name(name))
            .collect()
    }

    fn parameter_names_no_key(&self) -> Vec<String> {
        self.column_names_no_key()
            .iter()
            .map(|name| parameter_name(name))
            .collect()
    }

    fn key_parameter_names(&self) -> Vec<String> {
        self.keys()
            .iter()
            .map(|name| parameter_name(name))
            .collect()
    }

    /// One bound parameter per column, in ordinal order.
    ///
    /// Values in bounded-datetime columns are clamped into the backend's
    /// representable range and truncated to whole seconds before binding.
    fn parameter_list(&self) -> Result<Vec<Parameter>> {
        let names = self.column_names();
        let mut parameters = Vec::with_capacity(self.columns().len());
        for column in self.columns() {
            let name = names.get(column.ordinal()).cloned().ok_or_else(|| {
                DbError::OrdinalNotFound {
                    table: self.table_name().to_string(),
                    ordinal: column.ordinal(),
                }
            })?;
            let value = match (column.data_type(), column.value()) {
                (DataType::DateTime | DataType::DateTime2, Value::Null) => Value::Null,
                (DataType::DateTime, Value::Timestamp(ts)) => {
                    Value::Timestamp(temporal::normalize_datetime(*ts))
                }
                (DataType::DateTime2, Value::Timestamp(ts)) => Value::Timestamp(*ts),
                (DataType::DateTime | DataType::DateTime2, other) => {
                    return Err(DbError::TypeMismatch(format!(
                        "Column '{}' declared {} but holds {}",
                        name,
                        column.data_type(),
                        other.type_name()
                    )));
                }
                (_, other) => other.clone(),
            };
            parameters.push(Parameter::new(
                parameter_name(&name),
                column.data_type().clone(),
                value,
            ));
        }
        Ok(parameters)
    }

    /// Literal SQL rendering of every column value, in ordinal order.
    ///
    /// Only for contexts that build standalone literal SQL text; statement
    /// execution always binds parameters instead.
    fn literal_values(&self) -> Vec<String> {
        self.columns()
            .iter()
            .map(|column| match (column.data_type(), column.value()) {
                (_, Value::Null) => "NULL".to_string(),
                (DataType::DateTime, Value::Timestamp(ts)) => {
                    format!("'{}'", temporal::format_datetime(*ts))
                }
                (DataType::DateTime2, Value::Timestamp(ts)) => {
                    format!("'{}'", temporal::format_datetime2(*ts))
                }
                (DataType::Text | DataType::Boolean, value) => {
                    format!("'{}'", value.to_string().replace('\'', "''"))
                }
                (_, value) => value.to_string(),
            })
            .collect()
    }

    /// Raw ordered column values, as bulk loading consumes them.
    fn values(&self) -> Vec<Value> {
        self.columns()
            .iter()
            .map(|column| column.value().clone())
            .collect()
    }

    /// Stored value for an ordinal. An unknown ordinal is a configuration
    /// bug and reported as an error, never a silent default.
    fn value(&self, ordinal: usize) -> Result<&Value> {
        self.columns()
            .iter()
            .find(|column| column.ordinal() == ordinal)
            .map(|column| column.value())
            .ok_or_else(|| DbError::OrdinalNotFound {
                table: self.table_name().to_string(),
                ordinal,
            })
    }

    /// Store a value for an ordinal, truncating oversized text to the
    /// column's declared bound.
    fn set_value(&mut self, ordinal: usize, value: Value) -> Result<()> {
        let table = self.table_name().to_string();
        let column = self
            .columns_mut()
            .iter_mut()
            .find(|column| column.ordinal() == ordinal)
            .ok_or(DbError::OrdinalNotFound { table, ordinal })?;
        column.assign(value);
        Ok(())
    }
}
