use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::new_id;

/// Most recent snapshots kept in the revision history.
pub const MAX_SNAPSHOTS: usize = 5;

/// Revision capacity given to freshly created invoices.
pub const DEFAULT_TOTAL_REVISIONS: u32 = 3;

/// Whether a revision operation changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Applied,
    Unchanged,
}

impl Outcome {
    pub fn applied(self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Timestamped copy of the used-revision count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionSnapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub used_revisions: u32,
}

/// Revision capacity, usage and a capped audit trail of snapshots.
///
/// Invariants, re-established by [`Revisions::normalize`] after any raw
/// deserialization:
/// - `total >= 1`
/// - `used <= total`
/// - at most [`MAX_SNAPSHOTS`] snapshots, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revisions {
    #[serde(default = "default_total")]
    total_revisions: u32,
    #[serde(default)]
    used_revisions: u32,
    #[serde(default)]
    revision_snapshots: Vec<RevisionSnapshot>,
}

fn default_total() -> u32 {
    DEFAULT_TOTAL_REVISIONS
}

impl Default for Revisions {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_REVISIONS)
    }
}

impl Revisions {
    pub fn new(total: u32) -> Self {
        Self::from_parts(total, 0, Vec::new())
    }

    /// Build from raw parts, clamping into a valid state.
    pub fn from_parts(total: u32, used: u32, snapshots: Vec<RevisionSnapshot>) -> Self {
        let mut revisions = Self {
            total_revisions: total,
            used_revisions: used,
            revision_snapshots: snapshots,
        };
        revisions.normalize();
        revisions
    }

    pub fn total(&self) -> u32 {
        self.total_revisions
    }

    pub fn used(&self) -> u32 {
        self.used_revisions
    }

    pub fn snapshots(&self) -> &[RevisionSnapshot] {
        &self.revision_snapshots
    }

    pub fn remaining(&self) -> u32 {
        self.total_revisions.saturating_sub(self.used_revisions)
    }

    /// Consume one revision. No-op when the capacity is exhausted.
    pub fn use_revision(&mut self) -> Outcome {
        if self.used_revisions >= self.total_revisions {
            return Outcome::Unchanged;
        }
        self.used_revisions += 1;
        Outcome::Applied
    }

    /// Add one revision slot.
    pub fn add_slot(&mut self) -> Outcome {
        self.total_revisions = self.total_revisions.saturating_add(1);
        Outcome::Applied
    }

    /// Remove one revision slot, never going below a single slot. Usage is
    /// clamped down to the new capacity.
    pub fn remove_slot(&mut self) -> Outcome {
        if self.total_revisions <= 1 {
            return Outcome::Unchanged;
        }
        self.total_revisions -= 1;
        self.used_revisions = self.used_revisions.min(self.total_revisions);
        Outcome::Applied
    }

    /// Record the current usage at `at`, evicting the oldest snapshot past
    /// [`MAX_SNAPSHOTS`].
    pub fn snapshot(&mut self, at: DateTime<Utc>) -> Outcome {
        self.revision_snapshots.insert(
            0,
            RevisionSnapshot {
                id: new_id(),
                timestamp: at,
                used_revisions: self.used_revisions,
            },
        );
        self.revision_snapshots.truncate(MAX_SNAPSHOTS);
        Outcome::Applied
    }

    pub fn normalize(&mut self) {
        self.total_revisions = self.total_revisions.max(1);
        self.used_revisions = self.used_revisions.min(self.total_revisions);
        self.revision_snapshots.truncate(MAX_SNAPSHOTS);
    }
}
