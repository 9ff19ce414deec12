//! Statement construction from record metadata.
//!
//! Every template is deterministic: identifiers come only from record
//! metadata, never from unsanitized caller input, and all values are bound
//! as parameters.

use super::{Parameter, Statement};
use crate::core::{DataType, DbError, Result, Value};
use crate::record::{parameter_name, Record};

/// `INSERT INTO <table> ( [c1], ... ) VALUES ( @p1, ... )`
pub fn insert(record: &dyn Record) -> Result<Statement> {
    let columns: Vec<String> = record
        .column_names()
        .iter()
        .map(|name| format!("[{}]", name))
        .collect();
    let params: Vec<String> = record
        .parameter_names()
        .iter()
        .map(|name| format!("@{}", name))
        .collect();
    let sql = format!(
        "INSERT INTO {} ( {} ) VALUES ( {} )",
        record.table_name(),
        columns.join(", "),
        params.join(", ")
    );
    Ok(Statement::new(sql).with_params(record.parameter_list()?))
}

/// `UPDATE <table> SET [c]=@p, ... WHERE [k]=@kp AND ...`
pub fn update(record: &dyn Record) -> Result<Statement> {
    let assignments: Vec<String> = record
        .column_names_no_key()
        .iter()
        .zip(record.parameter_names_no_key())
        .map(|(column, param)| format!("[{}] = @{}", column, param))
        .collect();
    let sql = format!(
        "UPDATE {} SET {} WHERE {}",
        record.table_name(),
        assignments.join(", "),
        key_predicate(record)?
    );
    Ok(Statement::new(sql).with_params(record.parameter_list()?))
}

/// `DELETE FROM <table> WHERE [k]=@kp AND ...`
pub fn delete(record: &dyn Record) -> Result<Statement> {
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        record.table_name(),
        key_predicate(record)?
    );
    Ok(Statement::new(sql).with_params(record.parameter_list()?))
}

/// `SELECT * FROM <table> WHERE [k]=@kp AND ...`, a point lookup; only the
/// first row produced is read back.
pub fn select_by_key(record: &dyn Record) -> Result<Statement> {
    let sql = format!(
        "SELECT * FROM {} WHERE {}",
        record.table_name(),
        key_predicate(record)?
    );
    Ok(Statement::new(sql).with_params(record.parameter_list()?))
}

/// `SELECT <column> FROM <table> WHERE [<w>] = @<w>`, a multi-row lookup by a
/// single ad-hoc predicate. The predicate carries an explicit type tag since
/// no record metadata is available for an ad-hoc table/column pair.
pub fn select_values(
    table: &str,
    column: &str,
    where_column: &str,
    where_type: DataType,
    where_value: Value,
) -> Statement {
    let param = parameter_name(where_column);
    let sql = format!(
        "SELECT {} FROM {} WHERE [{}] = @{}",
        column, table, where_column, param
    );
    Statement::new(sql).with_params(vec![Parameter::new(param, where_type, where_value)])
}

/// `DELETE FROM <table>`, a logical truncate, so it participates in the same
/// transaction as other statements.
pub fn empty_table(table: &str) -> Statement {
    Statement::new(format!("DELETE FROM {}", table))
}

fn key_predicate(record: &dyn Record) -> Result<String> {
    let keys = record.keys();
    if keys.is_empty() {
        return Err(DbError::MissingKeys(record.table_name().to_string()));
    }
    let predicate: Vec<String> = keys
        .iter()
        .zip(record.key_parameter_names())
        .map(|(key, param)| format!("[{}] = @{}", key, param))
        .collect();
    Ok(predicate.join(" AND "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Column;

    struct Pair {
        columns: Vec<Column>,
    }

    impl Pair {
        fn new() -> Self {
            Self {
                columns: vec![
                    Column::new(DataType::Integer, 0),
                    Column::new(DataType::Text, 1),
                ],
            }
        }
    }

    impl Record for Pair {
        fn table_name(&self) -> &str {
            "pair"
        }

        fn key_ordinals(&self) -> &[usize] {
            &[0]
        }

        fn case_sensitive_column_names(&self) -> &[&str] {
            &["PairID", "PairName"]
        }

        fn columns(&self) -> &[Column] {
            &self.columns
        }

        fn columns_mut(&mut self) -> &mut [Column] {
            &mut self.columns
        }
    }

    #[test]
    fn test_insert_statement() {
        let statement = insert(&Pair::new()).unwrap();
        assert_eq!(
            statement.sql,
            "INSERT INTO pair ( [pairid], [pairname] ) VALUES ( @pairid, @pairname )"
        );
        assert_eq!(statement.params.len(), 2);
    }

    #[test]
    fn test_update_statement() {
        let statement = update(&Pair::new()).unwrap();
        assert_eq!(
            statement.sql,
            "UPDATE pair SET [pairname] = @pairname WHERE [pairid] = @pairid"
        );
    }

    #[test]
    fn test_delete_statement() {
        let statement = delete(&Pair::new()).unwrap();
        assert_eq!(statement.sql, "DELETE FROM pair WHERE [pairid] = @pairid");
    }

    #[test]
    fn test_select_by_key_statement() {
        let statement = select_by_key(&Pair::new()).unwrap();
        assert_eq!(statement.sql, "SELECT * FROM pair WHERE [pairid] = @pairid");
    }

    #[test]
    fn test_select_values_statement() {
        let statement = select_values(
            "pair",
            "pairname",
            "pair-kind",
            DataType::Text,
            Value::from("a"),
        );
        assert_eq!(
            statement.sql,
            "SELECT pairname FROM pair WHERE [pair-kind] = @pair_kind"
        );
        assert_eq!(statement.params[0].name, "pair_kind");
    }

    #[test]
    fn test_empty_table_statement() {
        assert_eq!(empty_table("pair").sql, "DELETE FROM pair");
    }

    struct Keyless {
        columns: Vec<Column>,
    }

    impl Record for Keyless {
        fn table_name(&self) -> &str {
            "keyless"
        }

        fn key_ordinals(&self) -> &[usize] {
            &[]
        }

        fn case_sensitive_column_names(&self) -> &[&str] {
            &["Only"]
        }

        fn columns(&self) -> &[Column] {
            &self.columns
        }

        fn columns_mut(&mut self) -> &mut [Column] {
            &mut self.columns
        }
    }

    #[test]
    fn test_keyless_record_is_rejected() {
        let keyless = Keyless {
            columns: vec![Column::new(DataType::Text, 0)],
        };
        assert!(matches!(update(&keyless), Err(DbError::MissingKeys(_))));
        assert!(matches!(delete(&keyless), Err(DbError::MissingKeys(_))));
    }
}
