//! Differ - Per-update record of which fields changed
//!
//! One [`ChangeTracker`] lives for a single `on_update` call. It collects the
//! fields whose diff predicate fired and decides whether the vendor API must
//! be called at all.

use crate::field::{FieldName, FieldScope};

/// Fields flagged as changed during one update pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    changed: Vec<FieldName>,
    local_only: Vec<FieldName>,
    should_update: bool,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a changed field
    ///
    /// Only remote fields require a call to the vendor API.
    pub fn record(&mut self, field: &FieldName, scope: FieldScope) {
        match scope {
            FieldScope::Remote => {
                self.changed.push(field.clone());
                self.should_update = true;
            }
            FieldScope::Local => self.local_only.push(field.clone()),
        }
    }

    pub fn should_update(&self) -> bool {
        self.should_update
    }

    /// Changed remote fields, in registration order
    pub fn changed_fields(&self) -> &[FieldName] {
        &self.changed
    }

    /// Changed provider-side fields, in registration order
    pub fn local_changes(&self) -> &[FieldName] {
        &self.local_only
    }

    pub fn is_changed(&self, name: &str) -> bool {
        self.changed
            .iter()
            .chain(&self.local_only)
            .any(|f| f.as_str() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.local_only.is_empty()
    }
}

/// Result of `on_update`: a sparse payload plus what changed
#[derive(Debug, Clone)]
pub struct UpdateOutcome<P> {
    pub payload: P,
    pub changes: ChangeTracker,
}

impl<P> UpdateOutcome<P> {
    /// Whether any remote field changed and the API must be called
    pub fn should_update(&self) -> bool {
        self.changes.should_update()
    }
}
