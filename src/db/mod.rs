pub mod repository;
pub mod sqlite;
pub mod store;

pub use repository::*;
pub use sqlite::*;

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("No transaction in progress")]
    NoTransaction,

    #[error("Database file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),
}

impl DatabaseError {
    /// True when SQLite rejected a write because of a UNIQUE index.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }

    /// True when SQLite rejected a write whose foreign key names a missing row.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        )
    }
}

/// Storage form of a timestamp. Matches what rusqlite's chrono support
/// writes and parses, and sorts lexically in time order for UTC values.
pub fn timestamp_value(at: &DateTime<Utc>) -> Value {
    Value::Text(at.format("%F %T%.f%:z").to_string())
}

/// Conversion of a model field into the value stored in its column.
pub trait ToColumn {
    fn to_column(&self) -> Value;
}

impl ToColumn for String {
    fn to_column(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ToColumn for i64 {
    fn to_column(&self) -> Value {
        Value::Integer(*self)
    }
}

impl ToColumn for f64 {
    fn to_column(&self) -> Value {
        Value::Real(*self)
    }
}

impl ToColumn for bool {
    fn to_column(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl ToColumn for DateTime<Utc> {
    fn to_column(&self) -> Value {
        timestamp_value(self)
    }
}

impl<T: ToColumn> ToColumn for Option<T> {
    fn to_column(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToColumn::to_column)
    }
}
