use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info};

use crate::backend::Backend;
use crate::connection::{ConnectionConfig, Session};
use crate::core::{DataType, DbError, Result, Value};
use crate::record::Record;
use crate::sql::{builder, BulkLoad, Statement};

/// Whether a save inserts a new row or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Insert,
    Update,
}

/// What to do when a bulk load fails inside a repopulation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkLoadPolicy {
    /// Log the failure and keep the surrounding transaction alive. The
    /// affected table is left empty after its truncate while the other
    /// tables still commit. A degraded mode, not silent data loss.
    #[default]
    Suppress,
    /// Propagate the failure and abort the surrounding transaction.
    FailFast,
}

/// The persistence engine.
///
/// Owns connection creation and transaction lifecycle for the four
/// operation families: point save, point delete, whole-table truncate and
/// bulk repopulation, plus the lookup helpers. Holds no per-call state
/// beyond the immutable configuration and an informational initialization
/// flag, so one instance is safe to share across threads.
///
/// Every transactional operation comes in two forms. The plain form opens
/// its own connection, owns a transaction for the whole call and commits
/// or rolls back itself. The `*_in` form executes against a caller-owned
/// [`Session`] and never begins, commits or rolls back; the caller keeps
/// full control of the transaction it opened.
pub struct DatabaseManager {
    backend: Arc<dyn Backend>,
    config: ConnectionConfig,
    bulk_load_policy: BulkLoadPolicy,
    initialized: AtomicBool,
}

impl DatabaseManager {
    pub fn new(backend: Arc<dyn Backend>, config: ConnectionConfig) -> Self {
        Self {
            backend,
            config,
            bulk_load_policy: BulkLoadPolicy::default(),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn with_bulk_load_policy(mut self, policy: BulkLoadPolicy) -> Self {
        self.bulk_load_policy = policy;
        self
    }

    /// One-shot startup probe: reads the driver's server properties and
    /// marks the engine initialized. Failures are logged, never raised;
    /// an unconfigured instance skips the probe entirely.
    pub fn initialize_basic_data(&self) {
        if !self.config.is_configured() {
            debug!("no database configured, skipping initialization");
            return;
        }
        debug!("initializing database connection to {}", self.config.to_url());
        let probe = self
            .session()
            .and_then(|mut session| session.server_info());
        match probe {
            Ok(properties) => {
                for (name, value) in properties {
                    debug!("{}: {}", name, value);
                }
                self.initialized.store(true, Ordering::Relaxed);
                info!("getting server info succeeded");
            }
            Err(err) => {
                error!("failed to get server info: {}", err);
            }
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Relaxed)
    }

    /// Open a session for caller-owned transactions.
    pub fn session(&self) -> Result<Session> {
        let conn = self.backend.connect().map_err(|err| {
            error!("failed to create connection: {}", err);
            DbError::NoConnection(err.to_string())
        })?;
        Ok(Session::new(conn))
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Save a batch of records inside one owned transaction. Partial
    /// failure anywhere in the batch rolls back the entire batch. Returns
    /// total rows affected; an empty batch is a silent no-op.
    pub fn save(&self, records: &[&dyn Record], mode: SaveMode) -> Result<u64> {
        let Some(first) = records.first() else {
            return Ok(0);
        };
        debug!(
            "saving {} data, number of items: {}",
            first.table_name(),
            records.len()
        );
        self.transact(first.table_name(), |session| {
            self.save_in(session, records, mode)
        })
    }

    /// Single-record save inside its own transaction.
    pub fn save_one(&self, record: &dyn Record, mode: SaveMode) -> Result<u64> {
        self.save(&[record], mode)
    }

    /// Save records against a caller-owned session; no transaction
    /// management happens here.
    pub fn save_in(
        &self,
        session: &mut Session,
        records: &[&dyn Record],
        mode: SaveMode,
    ) -> Result<u64> {
        let mut affected = 0;
        for record in records {
            affected += self.save_record(session, *record, mode)?;
        }
        Ok(affected)
    }

    fn save_record(
        &self,
        session: &mut Session,
        record: &dyn Record,
        mode: SaveMode,
    ) -> Result<u64> {
        let (statement, operation) = match mode {
            SaveMode::Insert => (builder::insert(record)?, "insert"),
            SaveMode::Update => (builder::update(record)?, "update"),
        };
        self.run(session, statement, record.table_name(), operation)
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    /// Delete a batch of records inside one owned transaction, same
    /// atomicity discipline as [`save`](Self::save).
    pub fn delete(&self, records: &[&dyn Record]) -> Result<u64> {
        let Some(first) = records.first() else {
            return Ok(0);
        };
        debug!(
            "removing {} data, number of items: {}",
            first.table_name(),
            records.len()
        );
        self.transact(first.table_name(), |session| self.delete_in(session, records))
    }

    pub fn delete_one(&self, record: &dyn Record) -> Result<u64> {
        self.delete(&[record])
    }

    pub fn delete_in(&self, session: &mut Session, records: &[&dyn Record]) -> Result<u64> {
        let mut affected = 0;
        for record in records {
            let statement = builder::delete(*record)?;
            affected += self.run(session, statement, record.table_name(), "delete")?;
        }
        Ok(affected)
    }

    // -----------------------------------------------------------------------
    // Truncate / repopulate
    // -----------------------------------------------------------------------

    /// Empty every listed table inside one owned transaction. The truncate
    /// is logical (row deletion), so it composes with other statements in
    /// the same transaction.
    pub fn truncate(&self, tables: &[&str]) -> Result<()> {
        if tables.is_empty() {
            return Ok(());
        }
        debug!("removing data from tables: {}", tables.join(", "));
        self.transact(&tables.join(", "), |session| {
            self.truncate_in(session, tables)?;
            Ok(0)
        })
        .map(|_| ())
    }

    pub fn truncate_in(&self, session: &mut Session, tables: &[&str]) -> Result<()> {
        for table in tables {
            self.run(session, builder::empty_table(table), table, "truncate")?;
        }
        Ok(())
    }

    /// Truncate every listed table, then bulk-insert each table's subset of
    /// `items`, all inside one owned transaction. Membership is decided by
    /// each record's declared table name. Bulk failures follow the
    /// configured [`BulkLoadPolicy`]; everything else is all-or-nothing.
    pub fn repopulate_tables(&self, items: &[&dyn Record], tables: &[&str]) -> Result<()> {
        if tables.is_empty() {
            return Ok(());
        }
        self.transact(&tables.join(", "), |session| {
            self.repopulate_tables_in(session, items, tables)?;
            Ok(0)
        })
        .map(|_| debug!("completed repopulation of all tables"))
    }

    pub fn repopulate_tables_in(
        &self,
        session: &mut Session,
        items: &[&dyn Record],
        tables: &[&str],
    ) -> Result<()> {
        self.truncate_in(session, tables)?;
        debug!("done emptying {} tables", tables.len());
        for table in tables {
            let subset: Vec<&dyn Record> = items
                .iter()
                .copied()
                .filter(|record| record.table_name().eq_ignore_ascii_case(table))
                .collect();
            self.bulk_insert(session, &subset)?;
        }
        Ok(())
    }

    /// Bulk-load one table's records through the driver's bulk primitive.
    fn bulk_insert(&self, session: &mut Session, records: &[&dyn Record]) -> Result<()> {
        let Some(first) = records.first() else {
            return Ok(());
        };
        let load = BulkLoad {
            table: first.table_name().to_string(),
            columns: first
                .case_sensitive_column_names()
                .iter()
                .map(|name| name.to_string())
                .collect(),
            rows: records.iter().map(|record| record.values()).collect(),
        };
        debug!("bulk loading {} rows into {}", load.rows.len(), load.table);
        match session.bulk_load(&load) {
            Ok(()) => Ok(()),
            Err(err) => {
                error!(
                    "error occurred while executing bulk copy to table {}: {}",
                    load.table, err
                );
                match self.bulk_load_policy {
                    BulkLoadPolicy::Suppress => Ok(()),
                    BulkLoadPolicy::FailFast => Err(DbError::BulkLoad {
                        table: load.table,
                        message: err.to_string(),
                    }),
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Existence proxy: true when the point lookup returns a non-null value
    /// for the record's first declared key column. A row that stored null
    /// in its own key column would misreport, hence the explicit name.
    pub fn exists_by_first_key_value(&self, record: &dyn Record) -> Result<bool> {
        let keys = record.keys();
        let first_key = keys
            .first()
            .ok_or_else(|| DbError::MissingKeys(record.table_name().to_string()))?;
        Ok(!self.get_value(record, first_key)?.is_null())
    }

    /// Point lookup by the record's key predicate; the named column's value
    /// from the first matching row, or `Null` when no row matches.
    pub fn get_value(&self, record: &dyn Record, column: &str) -> Result<Value> {
        let statement = self.prepare(builder::select_by_key(record)?);
        let mut session = self.session()?;
        let result = session.query(&statement).map_err(|err| {
            error!(
                "failed to select item in database table {}: {}",
                record.table_name(),
                err
            );
            DbError::Statement {
                table: record.table_name().to_string(),
                operation: "select".to_string(),
                source: Box::new(err),
            }
        })?;
        if result.is_empty() {
            debug!("no row matched: {}", statement.sql);
            return Ok(Value::Null);
        }
        result
            .value(0, column)
            .cloned()
            .ok_or_else(|| {
                DbError::ColumnNotFound(column.to_string(), record.table_name().to_string())
            })
    }

    /// Multi-row lookup: every value of `column` from rows where
    /// `where_column` equals `where_value`. The predicate carries an
    /// explicit type tag since no record metadata is available for an
    /// ad-hoc table/column pair.
    pub fn get_values(
        &self,
        table: &str,
        column: &str,
        where_column: &str,
        where_type: DataType,
        where_value: Value,
    ) -> Result<Vec<Value>> {
        let statement = self.prepare(builder::select_values(
            table,
            column,
            where_column,
            where_type,
            where_value,
        ));
        let mut session = self.session()?;
        let result = session.query(&statement).map_err(|err| {
            error!("failed to select items in database table {}: {}", table, err);
            DbError::Statement {
                table: table.to_string(),
                operation: "select".to_string(),
                source: Box::new(err),
            }
        })?;
        let index = result
            .column_index(column)
            .ok_or_else(|| DbError::ColumnNotFound(column.to_string(), table.to_string()))?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(index))
            .cloned()
            .collect())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Run `work` inside an owned transaction: open a connection, begin,
    /// execute, commit; on any failure (the work or the commit itself) roll
    /// back and re-raise the original error.
    fn transact<F>(&self, context: &str, work: F) -> Result<u64>
    where
        F: FnOnce(&mut Session) -> Result<u64>,
    {
        let mut session = self.session()?;
        session.begin()?;
        let outcome = work(&mut session).and_then(|affected| {
            session.commit()?;
            Ok(affected)
        });
        match outcome {
            Ok(affected) => Ok(affected),
            Err(err) => {
                if let Err(rollback_err) = session.rollback() {
                    error!("rollback failed for {}: {}", context, rollback_err);
                }
                Err(err)
            }
        }
    }

    fn prepare(&self, mut statement: Statement) -> Statement {
        statement.timeout = self.config.statement_timeout;
        statement
    }

    fn run(
        &self,
        session: &mut Session,
        statement: Statement,
        table: &str,
        operation: &str,
    ) -> Result<u64> {
        let statement = self.prepare(statement);
        match session.execute(&statement) {
            Ok(affected) => {
                debug!("executed SQL query: {}", statement.sql);
                debug!("rows affected in database: {}", affected);
                Ok(affected)
            }
            Err(err) => {
                error!("failed to {} item in database: {}", operation, err);
                Err(DbError::Statement {
                    table: table.to_string(),
                    operation: operation.to_string(),
                    source: Box::new(err),
                })
            }
        }
    }
}
