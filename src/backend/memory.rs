//! Reference in-memory driver.
//!
//! Tables live in a shared map behind a mutex; connections interpret the
//! statement shapes the builder generates instead of going through a full
//! SQL front end. Transactions are snapshot-based: `begin` clones the table
//! map, `rollback` restores it, `commit` discards the snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::debug;

use super::table::{Table, TableColumn};
use super::{Backend, Connection};
use crate::core::{DbError, Result, Row, Value};
use crate::result::QueryResult;
use crate::sql::{BulkLoad, Statement};

type TableMap = HashMap<String, Table>;

/// In-memory backend, cloneable and shared across connections.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<Mutex<TableMap>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table up front; statements against unknown tables fail.
    pub fn create_table(&self, name: &str, columns: Vec<TableColumn>) -> Result<()> {
        let mut tables = self.tables.lock()?;
        let key = name.to_lowercase();
        if tables.contains_key(&key) {
            return Err(DbError::TableExists(name.to_string()));
        }
        tables.insert(key, Table::new(name, columns));
        Ok(())
    }

    pub fn row_count(&self, name: &str) -> Result<usize> {
        let tables = self.tables.lock()?;
        tables
            .get(&name.to_lowercase())
            .map(|table| table.rows().len())
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }

    pub fn table_rows(&self, name: &str) -> Result<Vec<Row>> {
        let tables = self.tables.lock()?;
        tables
            .get(&name.to_lowercase())
            .map(|table| table.rows().to_vec())
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))
    }
}

impl Backend for MemoryBackend {
    fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(MemoryConnection {
            tables: Arc::clone(&self.tables),
            undo: None,
            open: true,
        }))
    }
}

struct MemoryConnection {
    tables: Arc<Mutex<TableMap>>,
    undo: Option<TableMap>,
    open: bool,
}

impl MemoryConnection {
    fn ensure_open(&self) -> Result<()> {
        if !self.open {
            return Err(DbError::ExecutionError("Connection is closed".into()));
        }
        Ok(())
    }
}

impl Connection for MemoryConnection {
    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.ensure_open()?;
        let command = parse(&statement.sql)?;
        debug!("memory driver executing: {}", statement.sql);
        let mut tables = self.tables.lock()?;
        match command {
            Command::Insert {
                table,
                columns,
                params,
            } => {
                let table = table_mut(&mut tables, &table)?;
                let mut row = vec![Value::Null; table.columns().len()];
                for (column, param) in columns.iter().zip(&params) {
                    let index = table.find_column(column).ok_or_else(|| {
                        DbError::ColumnNotFound(column.clone(), table.name().to_string())
                    })?;
                    row[index] = bind(statement, param)?;
                }
                table.push_row(row)?;
                Ok(1)
            }
            Command::Update {
                table,
                assignments,
                predicate,
            } => {
                let table = table_mut(&mut tables, &table)?;
                let assignments = resolve(table, &assignments, statement)?;
                let predicate = resolve(table, &predicate, statement)?;
                let mut affected = 0;
                for row in table.rows_mut() {
                    if predicate.iter().all(|(index, value)| &row[*index] == value) {
                        for (index, value) in &assignments {
                            row[*index] = value.clone();
                        }
                        affected += 1;
                    }
                }
                Ok(affected)
            }
            Command::Delete { table, predicate } => {
                let table = table_mut(&mut tables, &table)?;
                let predicate = resolve(table, &predicate, statement)?;
                let before = table.rows().len();
                table
                    .rows_mut()
                    .retain(|row| !predicate.iter().all(|(index, value)| &row[*index] == value));
                Ok((before - table.rows().len()) as u64)
            }
            Command::DeleteAll { table } => {
                let table = table_mut(&mut tables, &table)?;
                let removed = table.rows().len() as u64;
                table.rows_mut().clear();
                Ok(removed)
            }
            Command::Select { .. } => Err(DbError::ExecutionError(
                "Statement does not report a row count".into(),
            )),
        }
    }

    fn query(&mut self, statement: &Statement) -> Result<QueryResult> {
        self.ensure_open()?;
        let command = parse(&statement.sql)?;
        let tables = self.tables.lock()?;
        let Command::Select {
            table,
            projection,
            predicate,
        } = command
        else {
            return Err(DbError::ExecutionError(
                "Statement produces no result set".into(),
            ));
        };
        let table = tables
            .get(&table.to_lowercase())
            .ok_or_else(|| DbError::TableNotFound(table))?;
        let predicate = resolve(table, &predicate, statement)?;
        let matched: Vec<Row> = table
            .rows()
            .iter()
            .filter(|row| predicate.iter().all(|(index, value)| &row[*index] == value))
            .cloned()
            .collect();
        match projection {
            Projection::All => Ok(QueryResult::new(table.column_names(), matched)),
            Projection::Column(name) => {
                let index = table
                    .find_column(&name)
                    .ok_or_else(|| DbError::ColumnNotFound(name, table.name().to_string()))?;
                Ok(QueryResult::new(
                    vec![table.columns()[index].name.clone()],
                    matched.into_iter().map(|row| vec![row[index].clone()]).collect(),
                ))
            }
        }
    }

    fn bulk_load(&mut self, load: &BulkLoad) -> Result<()> {
        self.ensure_open()?;
        let mut tables = self.tables.lock()?;
        let table = tables
            .get_mut(&load.table.to_lowercase())
            .ok_or_else(|| DbError::TableNotFound(load.table.clone()))?;
        // Bulk column mapping is case-sensitive, unlike statement identifiers.
        let mapping: Vec<usize> = load
            .columns
            .iter()
            .map(|column| {
                table.find_column_exact(column).ok_or_else(|| {
                    DbError::ColumnNotFound(column.clone(), table.name().to_string())
                })
            })
            .collect::<Result<_>>()?;
        // Stage and validate everything first; a bulk load applies atomically.
        let mut staged = Vec::with_capacity(load.rows.len());
        for values in &load.rows {
            let mut row = vec![Value::Null; table.columns().len()];
            for (position, index) in mapping.iter().enumerate() {
                if let Some(value) = values.get(position) {
                    row[*index] = value.clone();
                }
            }
            table.validate_row(&row)?;
            staged.push(row);
        }
        table.rows_mut().extend(staged);
        Ok(())
    }

    fn begin(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.undo.is_some() {
            return Err(DbError::ExecutionError("Transaction already active".into()));
        }
        self.undo = Some(self.tables.lock()?.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.undo.take().is_none() {
            return Err(DbError::ExecutionError("No active transaction".into()));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.ensure_open()?;
        if let Some(undo) = self.undo.take() {
            *self.tables.lock()? = undo;
        }
        Ok(())
    }

    fn server_info(&mut self) -> Result<Vec<(String, String)>> {
        self.ensure_open()?;
        let tables = self.tables.lock()?;
        Ok(vec![
            ("Engine".to_string(), "rowstore-memory".to_string()),
            ("Version".to_string(), env!("CARGO_PKG_VERSION").to_string()),
            ("Tables".to_string(), tables.len().to_string()),
        ])
    }

    fn close(&mut self) -> Result<()> {
        if !self.open {
            return Ok(());
        }
        self.rollback()?;
        self.open = false;
        Ok(())
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

// ---------------------------------------------------------------------------
// Statement interpretation
// ---------------------------------------------------------------------------

enum Command {
    Insert {
        table: String,
        columns: Vec<String>,
        params: Vec<String>,
    },
    Update {
        table: String,
        assignments: Vec<(String, String)>,
        predicate: Vec<(String, String)>,
    },
    Delete {
        table: String,
        predicate: Vec<(String, String)>,
    },
    DeleteAll {
        table: String,
    },
    Select {
        table: String,
        projection: Projection,
        predicate: Vec<(String, String)>,
    },
}

enum Projection {
    All,
    Column(String),
}

fn parse(sql: &str) -> Result<Command> {
    if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
        let open = rest
            .find('(')
            .ok_or_else(|| malformed(sql))?;
        let table = rest[..open].trim().to_string();
        let values_at = rest.find(") VALUES (").ok_or_else(|| malformed(sql))?;
        let close = rest.rfind(')').ok_or_else(|| malformed(sql))?;
        let columns = split_list(&rest[open + 1..values_at], unbracket);
        let params = split_list(&rest[values_at + ") VALUES (".len()..close], unparam);
        if columns.len() != params.len() {
            return Err(malformed(sql));
        }
        return Ok(Command::Insert {
            table,
            columns,
            params,
        });
    }
    if let Some(rest) = sql.strip_prefix("UPDATE ") {
        let (table, tail) = rest.split_once(" SET ").ok_or_else(|| malformed(sql))?;
        let (set_part, where_part) = tail.split_once(" WHERE ").ok_or_else(|| malformed(sql))?;
        let assignments = parse_pairs(set_part, ", ", sql)?;
        let predicate = parse_pairs(where_part, " AND ", sql)?;
        return Ok(Command::Update {
            table: table.trim().to_string(),
            assignments,
            predicate,
        });
    }
    if let Some(rest) = sql.strip_prefix("DELETE FROM ") {
        return Ok(match rest.split_once(" WHERE ") {
            Some((table, where_part)) => Command::Delete {
                table: table.trim().to_string(),
                predicate: parse_pairs(where_part, " AND ", sql)?,
            },
            None => Command::DeleteAll {
                table: rest.trim().to_string(),
            },
        });
    }
    if let Some(rest) = sql.strip_prefix("SELECT ") {
        let (projection, tail) = rest.split_once(" FROM ").ok_or_else(|| malformed(sql))?;
        let (table, where_part) = tail.split_once(" WHERE ").ok_or_else(|| malformed(sql))?;
        let projection = match projection.trim() {
            "*" => Projection::All,
            column => Projection::Column(unbracket(column)),
        };
        return Ok(Command::Select {
            table: table.trim().to_string(),
            projection,
            predicate: parse_pairs(where_part, " AND ", sql)?,
        });
    }
    Err(malformed(sql))
}

fn malformed(sql: &str) -> DbError {
    DbError::ParseError(format!("Unsupported statement: {}", sql))
}

fn split_list(segment: &str, normalize: fn(&str) -> String) -> Vec<String> {
    segment
        .split(',')
        .map(|item| normalize(item.trim()))
        .collect()
}

fn parse_pairs(segment: &str, separator: &str, sql: &str) -> Result<Vec<(String, String)>> {
    segment
        .split(separator)
        .map(|pair| {
            let (lhs, rhs) = pair.split_once('=').ok_or_else(|| malformed(sql))?;
            Ok((unbracket(lhs.trim()), unparam(rhs.trim())))
        })
        .collect()
}

fn unbracket(identifier: &str) -> String {
    identifier
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_string()
}

fn unparam(identifier: &str) -> String {
    identifier.trim().trim_start_matches('@').to_string()
}

fn table_mut<'t>(tables: &'t mut TableMap, name: &str) -> Result<&'t mut Table> {
    tables
        .get_mut(&name.to_lowercase())
        .ok_or_else(|| DbError::TableNotFound(name.to_string()))
}

fn bind(statement: &Statement, name: &str) -> Result<Value> {
    statement
        .param(name)
        .map(|parameter| parameter.value.clone())
        .ok_or_else(|| DbError::ExecutionError(format!("Unbound parameter '@{}'", name)))
}

fn resolve(
    table: &Table,
    pairs: &[(String, String)],
    statement: &Statement,
) -> Result<Vec<(usize, Value)>> {
    pairs
        .iter()
        .map(|(column, param)| {
            let index = table.find_column(column).ok_or_else(|| {
                DbError::ColumnNotFound(column.clone(), table.name().to_string())
            })?;
            let value = bind(statement, param)?;
            // Bound values must convert to the column's declared type.
            table.columns()[index].validate(&value)?;
            Ok((index, value))
        })
        .collect()
}
