//! SQLite-backed [`RecordStore`] for the composite writer.

use rusqlite::types::Value;
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

use super::repository::insert_columns;
use super::DatabaseError;
use crate::composite::RecordStore;

/// Wraps a connection and holds at most one open transaction.
///
/// Transactions start `IMMEDIATE` so the write lock is taken before the
/// root insert. Dropping the store with a transaction still open rolls it
/// back.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
    tx: Option<Transaction<'c>>,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn, tx: None }
    }

    fn active(&self) -> Result<&Transaction<'c>, DatabaseError> {
        self.tx.as_ref().ok_or(DatabaseError::NoTransaction)
    }
}

impl RecordStore for SqliteStore<'_> {
    fn begin(&mut self) -> Result<(), DatabaseError> {
        if self.tx.is_some() {
            return Err(DatabaseError::ConstraintViolation(
                "transaction already in progress".into(),
            ));
        }
        self.tx = Some(Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?);
        Ok(())
    }

    fn insert(&mut self, table: &'static str, columns: &[(&'static str, Value)]) -> Result<i64, DatabaseError> {
        insert_columns(self.active()?, table, columns)
    }

    fn exists(&mut self, table: &'static str, id: i64) -> Result<bool, DatabaseError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1 AND deleted_at IS NULL)");
        let found = self.active()?.query_row(&sql, params![id], |row| row.get::<_, bool>(0))?;
        Ok(found)
    }

    fn commit(&mut self) -> Result<(), DatabaseError> {
        let tx = self.tx.take().ok_or(DatabaseError::NoTransaction)?;
        tx.commit()?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), DatabaseError> {
        match self.tx.take() {
            Some(tx) => tx.rollback().map_err(DatabaseError::from),
            None => Ok(()),
        }
    }
}
