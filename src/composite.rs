//! Composite-record writer.
//!
//! Persists a root record and its dependent children as one unit. The root is
//! inserted first; its generated id is copied into every child before the
//! child is written; the group commits together or is rolled back.
//!
//! The writer only sees the store through [`RecordStore`], so the SQLite
//! implementation (`db::store::SqliteStore`) and test doubles are
//! interchangeable.

use rusqlite::types::Value;
use thiserror::Error;

use crate::db::DatabaseError;

/// Column name / value pairs written for one record.
pub type Columns = Vec<(&'static str, Value)>;

/// A row-backed entity the writer can insert.
pub trait Record {
    /// Table the record lives in.
    const TABLE: &'static str;
    /// Human-readable entity name used in errors ("Visit", "Prescription").
    const ENTITY: &'static str;

    fn id(&self) -> i64;
    fn assign_id(&mut self, id: i64);
    /// Every persisted column except `id`.
    fn columns(&self) -> Columns;
}

/// A record that references a root record through a foreign key.
pub trait ChildRecord: Record {
    fn attach_to(&mut self, parent_id: i64);
}

/// Transactional store surface used by the writer.
///
/// One transaction is open at a time. `insert` returns the generated
/// surrogate id of the new row.
pub trait RecordStore {
    fn begin(&mut self) -> Result<(), DatabaseError>;
    fn insert(&mut self, table: &'static str, columns: &[(&'static str, Value)]) -> Result<i64, DatabaseError>;
    fn exists(&mut self, table: &'static str, id: i64) -> Result<bool, DatabaseError>;
    fn commit(&mut self) -> Result<(), DatabaseError>;
    fn rollback(&mut self) -> Result<(), DatabaseError>;
}

#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },

    #[error("Store failure: {0}")]
    Store(#[from] DatabaseError),
}

/// What to do when a root reference points at nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingRootPolicy {
    /// Insert the fallback root and attach the children to it.
    Synthesize,
    /// Fail the whole write with [`CompositeError::MissingReference`].
    Reject,
}

/// The root side of a composite write.
#[derive(Debug, Clone)]
pub enum RootInput<R> {
    /// Always insert a new root.
    New(R),
    /// Reuse root `id`; fail with a reference error if it does not exist.
    Existing(i64),
    /// Reuse root `id` when it exists, otherwise insert `fallback`.
    /// `id <= 0` counts as absent.
    ExistingOr { id: i64, fallback: R },
}

impl<R: Record> RootInput<R> {
    /// Reference to an optional root id, resolved according to `policy`.
    /// Under `Reject` an omitted id is a validation error, not a lookup of id 0.
    pub fn reference(id: Option<i64>, fallback: R, policy: MissingRootPolicy) -> Result<Self, CompositeError> {
        match (policy, id) {
            (MissingRootPolicy::Synthesize, id) => Ok(RootInput::ExistingOr {
                id: id.unwrap_or(0),
                fallback,
            }),
            (MissingRootPolicy::Reject, Some(id)) => Ok(RootInput::Existing(id)),
            (MissingRootPolicy::Reject, None) => Err(CompositeError::Validation(format!(
                "{}_id is required",
                R::ENTITY.to_lowercase()
            ))),
        }
    }
}

/// The root as it ended up after a write.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistedRoot<R> {
    Created(R),
    Reused(i64),
}

impl<R: Record> PersistedRoot<R> {
    pub fn id(&self) -> i64 {
        match self {
            PersistedRoot::Created(root) => root.id(),
            PersistedRoot::Reused(id) => *id,
        }
    }

    pub fn created(&self) -> Option<&R> {
        match self {
            PersistedRoot::Created(root) => Some(root),
            PersistedRoot::Reused(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Composite<R, C> {
    pub root: PersistedRoot<R>,
    pub children: Vec<C>,
}

// ═══════════════════════════════════════════
// Write scope
// ═══════════════════════════════════════════

/// Operations available inside an open transaction.
pub struct WriteScope<'w, S: RecordStore> {
    store: &'w mut S,
}

impl<S: RecordStore> WriteScope<'_, S> {
    pub fn insert_root<R: Record>(&mut self, mut root: R) -> Result<R, CompositeError> {
        let id = self.store.insert(R::TABLE, &root.columns())?;
        root.assign_id(id);
        Ok(root)
    }

    pub fn resolve_root<R: Record>(&mut self, input: RootInput<R>) -> Result<PersistedRoot<R>, CompositeError> {
        match input {
            RootInput::New(root) => Ok(PersistedRoot::Created(self.insert_root(root)?)),
            RootInput::Existing(id) => {
                self.require::<R>(id)?;
                Ok(PersistedRoot::Reused(id))
            }
            RootInput::ExistingOr { id, fallback } => {
                if id > 0 && self.store.exists(R::TABLE, id)? {
                    return Ok(PersistedRoot::Reused(id));
                }
                tracing::debug!(entity = R::ENTITY, requested = id, "Synthesizing missing root");
                Ok(PersistedRoot::Created(self.insert_root(fallback)?))
            }
        }
    }

    /// Fail with a reference error unless row `id` of `R` exists.
    pub fn require<R: Record>(&mut self, id: i64) -> Result<(), CompositeError> {
        if id > 0 && self.store.exists(R::TABLE, id)? {
            Ok(())
        } else {
            Err(CompositeError::MissingReference { entity: R::ENTITY, id })
        }
    }

    pub fn insert_child<C: ChildRecord>(&mut self, parent_id: i64, mut child: C) -> Result<C, CompositeError> {
        child.attach_to(parent_id);
        let id = self.store.insert(C::TABLE, &child.columns())?;
        child.assign_id(id);
        Ok(child)
    }

    /// Insert children in input order, stopping at the first failure.
    pub fn insert_children<C: ChildRecord>(&mut self, parent_id: i64, children: Vec<C>) -> Result<Vec<C>, CompositeError> {
        children
            .into_iter()
            .map(|child| self.insert_child(parent_id, child))
            .collect()
    }
}

// ═══════════════════════════════════════════
// Writer
// ═══════════════════════════════════════════

pub struct CompositeWriter<'s, S: RecordStore> {
    store: &'s mut S,
}

impl<'s, S: RecordStore> CompositeWriter<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Write one root and its children atomically.
    pub fn write<R: Record, C: ChildRecord>(
        &mut self,
        root: RootInput<R>,
        children: Vec<C>,
    ) -> Result<Composite<R, C>, CompositeError> {
        self.run(|scope| {
            let root = scope.resolve_root(root)?;
            let children = scope.insert_children(root.id(), children)?;
            Ok(Composite { root, children })
        })
    }

    /// Run `work` inside one transaction: commit on `Ok`, roll back on `Err`.
    ///
    /// A failed rollback is logged; the caller still receives the error that
    /// caused it.
    pub fn run<T, F>(&mut self, work: F) -> Result<T, CompositeError>
    where
        F: FnOnce(&mut WriteScope<'_, S>) -> Result<T, CompositeError>,
    {
        self.store.begin()?;

        let outcome = {
            let mut scope = WriteScope { store: &mut *self.store };
            work(&mut scope)
        };

        match outcome {
            Ok(value) => match self.store.commit() {
                Ok(()) => Ok(value),
                Err(commit_err) => {
                    if let Err(rollback_err) = self.store.rollback() {
                        tracing::warn!(error = %rollback_err, "Rollback after failed commit also failed");
                    }
                    Err(commit_err.into())
                }
            },
            Err(err) => {
                tracing::debug!(error = %err, "Composite write failed, rolling back");
                if let Err(rollback_err) = self.store.rollback() {
                    tracing::warn!(error = %rollback_err, "Rollback failed after composite write error");
                }
                Err(err)
            }
        }
    }
}
