use crate::core::{Row, Value};

/// Rows read back from a query, with their column names.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name, case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let result = QueryResult::new(
            vec!["DeviceID".into(), "DeviceName".into()],
            vec![vec![Value::Integer(1), Value::from("probe")]],
        );
        assert_eq!(result.value(0, "deviceid"), Some(&Value::Integer(1)));
        assert_eq!(result.value(0, "DEVICENAME"), Some(&Value::from("probe")));
        assert_eq!(result.value(0, "missing"), None);
        assert_eq!(result.value(1, "deviceid"), None);
    }
}
