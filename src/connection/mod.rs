pub mod config;

pub use config::ConnectionConfig;

use log::debug;

use crate::backend::Connection;
use crate::core::{DbError, Result};
use crate::result::QueryResult;
use crate::sql::{BulkLoad, Statement};

/// An open database session: one driver connection plus explicit
/// transaction state.
///
/// A `Session` doubles as the explicit transaction handle. Callers that
/// want several engine operations inside one transaction open a session,
/// `begin`, pass it to the engine's `*_in` operations, and decide the
/// commit or rollback themselves; the engine never finishes a transaction
/// it did not start.
pub struct Session {
    conn: Box<dyn Connection>,
    state: SessionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    InTransaction,
    Closed,
}

impl Session {
    pub(crate) fn new(conn: Box<dyn Connection>) -> Self {
        Self {
            conn,
            state: SessionState::Active,
        }
    }

    pub fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.ensure_open()?;
        self.conn.execute(statement)
    }

    pub fn query(&mut self, statement: &Statement) -> Result<QueryResult> {
        self.ensure_open()?;
        self.conn.query(statement)
    }

    pub fn bulk_load(&mut self, load: &BulkLoad) -> Result<()> {
        self.ensure_open()?;
        self.conn.bulk_load(load)
    }

    /// Begin a transaction on this session.
    pub fn begin(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.state == SessionState::InTransaction {
            return Err(DbError::ExecutionError("Transaction already active".into()));
        }
        self.conn.begin()?;
        self.state = SessionState::InTransaction;
        Ok(())
    }

    /// Commit the current transaction.
    pub fn commit(&mut self) -> Result<()> {
        if self.state != SessionState::InTransaction {
            return Err(DbError::ExecutionError("No active transaction".into()));
        }
        self.conn.commit()?;
        self.state = SessionState::Active;
        Ok(())
    }

    /// Roll back the current transaction. A no-op outside a transaction.
    pub fn rollback(&mut self) -> Result<()> {
        if self.state != SessionState::InTransaction {
            return Ok(());
        }
        self.conn.rollback()?;
        self.state = SessionState::Active;
        Ok(())
    }

    pub fn is_in_transaction(&self) -> bool {
        self.state == SessionState::InTransaction
    }

    pub fn is_active(&self) -> bool {
        self.state != SessionState::Closed
    }

    pub fn server_info(&mut self) -> Result<Vec<(String, String)>> {
        self.ensure_open()?;
        self.conn.server_info()
    }

    /// Close the session, rolling back any open transaction.
    pub fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        if self.state == SessionState::InTransaction {
            debug!("closing session with open transaction, rolling back");
            self.rollback()?;
        }
        self.conn.close()?;
        self.state = SessionState::Closed;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(DbError::ExecutionError("Session is closed".into()));
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Backend, MemoryBackend};

    fn session() -> Session {
        let backend = MemoryBackend::new();
        Session::new(backend.connect().unwrap())
    }

    #[test]
    fn test_transaction_lifecycle() {
        let mut session = session();
        assert!(!session.is_in_transaction());

        session.begin().unwrap();
        assert!(session.is_in_transaction());

        session.commit().unwrap();
        assert!(!session.is_in_transaction());
    }

    #[test]
    fn test_double_begin_rejected() {
        let mut session = session();
        session.begin().unwrap();
        assert!(session.begin().is_err());
    }

    #[test]
    fn test_commit_requires_transaction() {
        let mut session = session();
        assert!(session.commit().is_err());
        // Rollback without a transaction is a no-op.
        assert!(session.rollback().is_ok());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut session = session();
        session.close().unwrap();
        session.close().unwrap();
        assert!(!session.is_active());
        assert!(session.begin().is_err());
    }
}
