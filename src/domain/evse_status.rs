//! EVSE status vocabulary and the status diff used for synchronization

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::identifiers::{EvseId, OperatorId};
use crate::support::errors::ArgumentError;

/// Dynamic status of a single EVSE as understood by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvseStatus {
    Available,
    Reserved,
    Occupied,
    OutOfService,
    EvseNotFound,
    Unknown,
}

impl EvseStatus {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Reserved => "Reserved",
            Self::Occupied => "Occupied",
            Self::OutOfService => "OutOfService",
            Self::EvseNotFound => "EvseNotFound",
            Self::Unknown => "Unknown",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "Available" => Some(Self::Available),
            "Reserved" => Some(Self::Reserved),
            "Occupied" => Some(Self::Occupied),
            "OutOfService" => Some(Self::OutOfService),
            "EvseNotFound" => Some(Self::EvseNotFound),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for EvseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// How the hub applies a pushed batch to its stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    FullLoad,
    Update,
    Insert,
    Delete,
}

impl ActionType {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Self::FullLoad => "fullLoad",
            Self::Update => "update",
            Self::Insert => "insert",
            Self::Delete => "delete",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "fullLoad" => Some(Self::FullLoad),
            "update" => Some(Self::Update),
            "insert" => Some(Self::Insert),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

/// The unit of status synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvseStatusRecord {
    pub evse_id: EvseId,
    pub status: EvseStatus,
}

impl EvseStatusRecord {
    pub fn new(evse_id: EvseId, status: EvseStatus) -> Self {
        Self { evse_id, status }
    }
}

/// A batch of status records for one operator, as pushed to the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorEvseStatus {
    pub operator_id: OperatorId,
    pub operator_name: Option<String>,
    pub records: Vec<EvseStatusRecord>,
}

/// Point-in-time status of a set of EVSEs.
pub type StatusSnapshot = BTreeMap<EvseId, EvseStatus>;

/// Delta between two status snapshots of one operator.
///
/// The three collections must be disjoint; [`StatusDiff::validate`] checks it.
/// Ordered collections keep the records of every pushed batch in a stable
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDiff {
    pub operator_id: OperatorId,
    pub operator_name: Option<String>,
    pub added: BTreeMap<EvseId, EvseStatus>,
    pub changed: BTreeMap<EvseId, EvseStatus>,
    pub removed: BTreeSet<EvseId>,
}

impl StatusDiff {
    pub fn new(operator_id: OperatorId) -> Self {
        Self {
            operator_id,
            operator_name: None,
            added: BTreeMap::new(),
            changed: BTreeMap::new(),
            removed: BTreeSet::new(),
        }
    }

    pub fn with_operator_name(mut self, name: impl Into<String>) -> Self {
        self.operator_name = Some(name.into());
        self
    }

    pub fn added(mut self, evse_id: EvseId, status: EvseStatus) -> Self {
        self.added.insert(evse_id, status);
        self
    }

    pub fn changed(mut self, evse_id: EvseId, status: EvseStatus) -> Self {
        self.changed.insert(evse_id, status);
        self
    }

    pub fn removed(mut self, evse_id: EvseId) -> Self {
        self.removed.insert(evse_id);
        self
    }

    /// Compute the diff between an old and a new snapshot.
    ///
    /// EVSEs only in `new` are added, EVSEs in both with a different status
    /// are changed, EVSEs only in `old` are removed.
    pub fn from_snapshots(
        operator_id: OperatorId,
        old: &StatusSnapshot,
        new: &StatusSnapshot,
    ) -> Self {
        let mut diff = Self::new(operator_id);

        for (evse_id, status) in new {
            match old.get(evse_id) {
                None => {
                    diff.added.insert(evse_id.clone(), *status);
                }
                Some(previous) if previous != status => {
                    diff.changed.insert(evse_id.clone(), *status);
                }
                Some(_) => {}
            }
        }

        diff.removed = old
            .keys()
            .filter(|evse_id| !new.contains_key(*evse_id))
            .cloned()
            .collect();

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }

    /// Total number of EVSEs touched by this diff.
    pub fn len(&self) -> usize {
        self.added.len() + self.changed.len() + self.removed.len()
    }

    /// Check that no EVSE appears in more than one collection.
    pub fn validate(&self) -> Result<(), ArgumentError> {
        if let Some(evse_id) = self
            .added
            .keys()
            .find(|id| self.changed.contains_key(*id) || self.removed.contains(*id))
        {
            return Err(ArgumentError::OverlappingDiff(evse_id.to_string()));
        }
        if let Some(evse_id) = self.changed.keys().find(|id| self.removed.contains(*id)) {
            return Err(ArgumentError::OverlappingDiff(evse_id.to_string()));
        }
        Ok(())
    }
}
