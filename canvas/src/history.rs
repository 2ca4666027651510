//! History log and redo buffer.
//!
//! DESIGN
//! ======
//! `History` is pure bookkeeping: two stacks of [`ChangeRecord`]s. It never
//! touches the surface. The engine pops a record here and applies its inverse
//! (undo) or forward operation (redo) itself, so applying a record can never
//! append a spurious entry or clear the redo buffer.
//!
//! - `push` is the only way a fresh local edit enters, and it clears redo.
//! - `undo` moves the newest log entry to the redo buffer unchanged.
//! - `redo` moves it back without clearing the rest of the redo buffer.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use serde::{Deserialize, Serialize};

use crate::doc::PropertyBag;
use crate::identity::Identity;

/// What a change did to its primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Remove,
    Modify,
}

impl ChangeKind {
    /// Parse a change kind name as the host spells it.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(Self::Create),
            "remove" => Some(Self::Remove),
            "modify" => Some(Self::Modify),
            _ => None,
        }
    }
}

/// A record that does not carry the snapshots its kind needs.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("{0:?} record requires a prior snapshot")]
    MissingPrior(ChangeKind),
    #[error("{0:?} record requires a posterior snapshot")]
    MissingPosterior(ChangeKind),
    #[error("{0:?} record must not carry a prior snapshot")]
    UnexpectedPrior(ChangeKind),
    #[error("{0:?} record must not carry a posterior snapshot")]
    UnexpectedPosterior(ChangeKind),
}

/// What applying a record (or a remote message) does to one identity.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// Bring the primitive back from a snapshot, rebinding its identity.
    Place(PropertyBag),
    /// Take the primitive off the surface.
    Remove,
    /// Replace the primitive's properties with a snapshot.
    Overwrite(PropertyBag),
}

/// One reversible local edit.
///
/// Fields are private so every record satisfies the snapshot rules checked by
/// [`ChangeRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRecord {
    kind: ChangeKind,
    identity: Identity,
    prior: Option<PropertyBag>,
    posterior: Option<PropertyBag>,
}

impl ChangeRecord {
    /// Build a record, checking that the snapshots match the kind.
    ///
    /// # Errors
    ///
    /// Create takes only a posterior, Remove only a prior, Modify both.
    pub fn new(
        kind: ChangeKind,
        identity: Identity,
        prior: Option<PropertyBag>,
        posterior: Option<PropertyBag>,
    ) -> Result<Self, HistoryError> {
        match kind {
            ChangeKind::Create if prior.is_some() => return Err(HistoryError::UnexpectedPrior(kind)),
            ChangeKind::Remove if posterior.is_some() => return Err(HistoryError::UnexpectedPosterior(kind)),
            ChangeKind::Remove | ChangeKind::Modify if prior.is_none() => {
                return Err(HistoryError::MissingPrior(kind));
            }
            ChangeKind::Create | ChangeKind::Modify if posterior.is_none() => {
                return Err(HistoryError::MissingPosterior(kind));
            }
            _ => {}
        }
        Ok(Self { kind, identity, prior, posterior })
    }

    #[must_use]
    pub fn create(identity: Identity, posterior: PropertyBag) -> Self {
        Self { kind: ChangeKind::Create, identity, prior: None, posterior: Some(posterior) }
    }

    #[must_use]
    pub fn remove(identity: Identity, prior: PropertyBag) -> Self {
        Self { kind: ChangeKind::Remove, identity, prior: Some(prior), posterior: None }
    }

    #[must_use]
    pub fn modify(identity: Identity, prior: PropertyBag, posterior: PropertyBag) -> Self {
        Self { kind: ChangeKind::Modify, identity, prior: Some(prior), posterior: Some(posterior) }
    }

    #[must_use]
    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Property bag before the change (Remove, Modify).
    #[must_use]
    pub fn prior(&self) -> Option<&PropertyBag> {
        self.prior.as_ref()
    }

    /// Property bag after the change (Create, Modify).
    #[must_use]
    pub fn posterior(&self) -> Option<&PropertyBag> {
        self.posterior.as_ref()
    }

    /// The snapshot that describes this change to peers: the posterior, or the
    /// prior for removals.
    #[must_use]
    pub fn snapshot(&self) -> Option<&PropertyBag> {
        match self.kind {
            ChangeKind::Remove => self.prior.as_ref(),
            ChangeKind::Create | ChangeKind::Modify => self.posterior.as_ref(),
        }
    }

    /// The operation that reverses this change.
    #[must_use]
    pub fn inverse(&self) -> Option<SurfaceOp> {
        match self.kind {
            ChangeKind::Create => Some(SurfaceOp::Remove),
            ChangeKind::Remove => self.prior.clone().map(SurfaceOp::Place),
            ChangeKind::Modify => self.prior.clone().map(SurfaceOp::Overwrite),
        }
    }

    /// The operation that reapplies this change.
    #[must_use]
    pub fn forward(&self) -> Option<SurfaceOp> {
        match self.kind {
            ChangeKind::Create => self.posterior.clone().map(SurfaceOp::Place),
            ChangeKind::Remove => Some(SurfaceOp::Remove),
            ChangeKind::Modify => self.posterior.clone().map(SurfaceOp::Overwrite),
        }
    }
}

/// Undo stack and redo stack.
#[derive(Debug, Clone, Default)]
pub struct History {
    log: Vec<ChangeRecord>,
    redo: Vec<ChangeRecord>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh local edit and discard the redo branch.
    pub fn push(&mut self, record: ChangeRecord) {
        self.log.push(record);
        self.redo.clear();
    }

    /// Move the newest log entry to the redo buffer and return it.
    pub fn undo(&mut self) -> Option<&ChangeRecord> {
        let record = self.log.pop()?;
        self.redo.push(record);
        self.redo.last()
    }

    /// Move the newest redo entry back onto the log and return it.
    pub fn redo(&mut self) -> Option<&ChangeRecord> {
        let record = self.redo.pop()?;
        self.log.push(record);
        self.log.last()
    }

    /// Empty both stacks.
    pub fn clear(&mut self) {
        self.log.clear();
        self.redo.clear();
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.log.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.log.len()
    }

    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// The log, oldest first.
    #[must_use]
    pub fn records(&self) -> &[ChangeRecord] {
        &self.log
    }

    /// The redo buffer, oldest first; the next redo is the last entry.
    #[must_use]
    pub fn redo_records(&self) -> &[ChangeRecord] {
        &self.redo
    }
}
