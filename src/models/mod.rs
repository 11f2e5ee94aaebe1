/// Implements `Record` and `Entity` for a model with a `meta: RecordMeta`
/// field, mapping each listed column to a struct field.
macro_rules! record {
    ($ty:ident in $table:literal as $entity:literal { $($col:literal => $field:ident),+ $(,)? }) => {
        impl $crate::composite::Record for $ty {
            const TABLE: &'static str = $table;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> i64 {
                self.meta.id
            }

            fn assign_id(&mut self, id: i64) {
                self.meta.id = id;
            }

            fn columns(&self) -> $crate::composite::Columns {
                let mut columns = self.meta.columns();
                $(columns.push(($col, $crate::db::ToColumn::to_column(&self.$field)));)+
                columns
            }
        }

        impl $crate::db::Entity for $ty {
            fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
                Ok(Self {
                    meta: $crate::models::RecordMeta::from_row(row)?,
                    $($field: row.get($col)?),+
                })
            }
        }
    };
}

pub mod appointment;
pub mod diagnosis;
pub mod enums;
pub mod medical_history;
pub mod medication;
pub mod prescription;
pub mod triage;
pub mod user;
pub mod visit;

pub use appointment::*;
pub use diagnosis::*;
pub use enums::*;
pub use medical_history::*;
pub use medication::*;
pub use prescription::*;
pub use triage::*;
pub use user::*;
pub use visit::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::composite::Columns;
use crate::db::ToColumn;

/// Identity and bookkeeping columns shared by every table.
///
/// Serialized flat into each entity, so responses carry `id`,
/// `created_at` and `updated_at` next to the entity's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    #[serde(default)]
    pub id: i64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl RecordMeta {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn columns(&self) -> Columns {
        vec![
            ("created_at", self.created_at.to_column()),
            ("updated_at", self.updated_at.to_column()),
        ]
    }
}

impl Default for RecordMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Foreign keys arrive as `0` from clients that mean "none".
pub(crate) fn positive_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.filter(|id| *id > 0))
}
