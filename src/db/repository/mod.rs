//! Repository layer: entity-scoped database operations.
//!
//! Generic helpers cover insert / fetch / update / soft delete for any
//! [`Entity`]. Entity sub-modules hold the queries that need joins or a
//! specific ordering.

mod appointment;
mod catalog;
mod diagnosis;
mod prescription;
mod stats;
mod triage;
mod user;
mod visit;

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Params, Row};

use super::{timestamp_value, DatabaseError};
use crate::composite::Record;

/// A record that can be read back from a `SELECT *` row.
pub trait Entity: Record + Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

// Re-export all public items from sub-modules
pub use appointment::*;
pub use catalog::*;
pub use diagnosis::*;
pub use prescription::*;
pub use stats::*;
pub use triage::*;
pub use user::*;
pub use visit::*;

/// Insert one row and return its generated id.
pub fn insert_columns(
    conn: &Connection,
    table: &str,
    columns: &[(&'static str, Value)],
) -> Result<i64, DatabaseError> {
    let names = columns.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("INSERT INTO {table} ({names}) VALUES ({placeholders})");
    conn.execute(&sql, params_from_iter(columns.iter().map(|(_, value)| value)))?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_record<R: Record>(conn: &Connection, record: &mut R) -> Result<(), DatabaseError> {
    let id = insert_columns(conn, R::TABLE, &record.columns())?;
    record.assign_id(id);
    Ok(())
}

pub fn get_record<R: Entity>(conn: &Connection, id: i64) -> Result<Option<R>, DatabaseError> {
    let sql = format!("SELECT * FROM {} WHERE id = ?1 AND deleted_at IS NULL", R::TABLE);
    conn.query_row(&sql, params![id], R::from_row)
        .optional()
        .map_err(DatabaseError::from)
}

/// Like [`get_record`], with absence reported as `NotFound`.
pub fn require_record<R: Entity>(conn: &Connection, id: i64) -> Result<R, DatabaseError> {
    get_record(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: R::ENTITY.into(),
        id: id.to_string(),
    })
}

/// Live rows of `R` matching `clause`, which may end in an ORDER BY.
pub fn select_where<R: Entity, P: Params>(
    conn: &Connection,
    clause: &str,
    params: P,
) -> Result<Vec<R>, DatabaseError> {
    let sql = format!("SELECT * FROM {} WHERE deleted_at IS NULL AND {clause}", R::TABLE);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, R::from_row)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn select_one_where<R: Entity, P: Params>(
    conn: &Connection,
    clause: &str,
    params: P,
) -> Result<Option<R>, DatabaseError> {
    let sql = format!("SELECT * FROM {} WHERE deleted_at IS NULL AND {clause} LIMIT 1", R::TABLE);
    conn.query_row(&sql, params, R::from_row)
        .optional()
        .map_err(DatabaseError::from)
}

/// Rows of `R` owned by a patient, oldest first.
pub fn list_for_user<R: Entity>(conn: &Connection, user_id: i64) -> Result<Vec<R>, DatabaseError> {
    select_where(conn, "user_id = ?1 ORDER BY created_at, id", params![user_id])
}

/// Overwrite every column except `created_at` on a live row.
pub fn update_record<R: Record>(conn: &Connection, record: &R) -> Result<(), DatabaseError> {
    let columns: Vec<_> = record
        .columns()
        .into_iter()
        .filter(|(name, _)| *name != "created_at")
        .collect();
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("{name} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id = ?{} AND deleted_at IS NULL",
        R::TABLE,
        columns.len() + 1
    );
    let values = columns
        .into_iter()
        .map(|(_, value)| value)
        .chain(std::iter::once(Value::Integer(record.id())));
    let changed = conn.execute(&sql, params_from_iter(values))?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: R::ENTITY.into(),
            id: record.id().to_string(),
        });
    }
    Ok(())
}

/// Mark a row deleted. Deleted rows vanish from every read.
pub fn soft_delete<R: Record>(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let sql = format!(
        "UPDATE {} SET deleted_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        R::TABLE
    );
    let changed = conn.execute(&sql, params![timestamp_value(&Utc::now()), id])?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: R::ENTITY.into(),
            id: id.to_string(),
        });
    }
    Ok(())
}
