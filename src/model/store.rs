use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::contract::ContractRecord;
use super::host::ContractId;

/// Field a partition is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Keep insertion order
    #[default]
    Default,
    Expiration,
    Acceptance,
    Difficulty,
    Reward,
    Type,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Default,
        SortKey::Expiration,
        SortKey::Acceptance,
        SortKey::Difficulty,
        SortKey::Reward,
        SortKey::Type,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortKey::Default => "default",
            SortKey::Expiration => "expiration",
            SortKey::Acceptance => "acceptance",
            SortKey::Difficulty => "difficulty",
            SortKey::Reward => "reward",
            SortKey::Type => "type",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                format!(
                    "unknown sort key '{}' (expected: default, expiration, acceptance, difficulty, reward, type)",
                    s
                )
            })
    }
}

/// Direction of the primary comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn is_ascending(self) -> bool {
        self == SortOrder::Ascending
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Game scene the list is being presented in. Each keeps its own sort and
/// show/hide settings; the partitions themselves are shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationContext {
    #[default]
    Flight,
    Editor,
    SpaceCenter,
    TrackingStation,
}

impl PresentationContext {
    pub fn name(self) -> &'static str {
        match self {
            PresentationContext::Flight => "flight",
            PresentationContext::Editor => "editor",
            PresentationContext::SpaceCenter => "space_center",
            PresentationContext::TrackingStation => "tracking_station",
        }
    }
}

impl FromStr for PresentationContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flight" => Ok(PresentationContext::Flight),
            "editor" => Ok(PresentationContext::Editor),
            "space_center" => Ok(PresentationContext::SpaceCenter),
            "tracking_station" => Ok(PresentationContext::TrackingStation),
            _ => Err(format!(
                "unknown context '{}' (expected: flight, editor, space_center, tracking_station)",
                s
            )),
        }
    }
}

/// Which partition a context is currently showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionKind {
    #[default]
    Primary,
    Hidden,
}

impl PartitionKind {
    pub fn other(self) -> Self {
        match self {
            PartitionKind::Primary => PartitionKind::Hidden,
            PartitionKind::Hidden => PartitionKind::Primary,
        }
    }
}

/// Sort and show/hide settings for one presentation context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextSettings {
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default)]
    pub order: SortOrder,
    #[serde(default)]
    pub view: PartitionKind,
}

/// An ordered collection of records, unique by contract id
#[derive(Debug, Clone, Default)]
pub struct Partition {
    records: IndexMap<ContractId, ContractRecord>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &ContractId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &ContractId) -> Option<&ContractRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &ContractId) -> Option<&mut ContractRecord> {
        self.records.get_mut(id)
    }

    /// Append a record. Returns false (and drops the record) if the id is
    /// already present.
    pub fn push(&mut self, record: ContractRecord) -> bool {
        if self.records.contains_key(record.id()) {
            return false;
        }
        self.records.insert(record.id().clone(), record);
        true
    }

    /// Remove a record, keeping the order of the rest
    pub fn remove(&mut self, id: &ContractId) -> Option<ContractRecord> {
        self.records.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContractRecord> {
        self.records.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ContractRecord> {
        self.records.values_mut()
    }

    pub fn ids(&self) -> Vec<ContractId> {
        self.records.keys().cloned().collect()
    }

    /// Move the records out in order, leaving the partition empty
    pub fn take(&mut self) -> Vec<ContractRecord> {
        self.records.drain(..).map(|(_, r)| r).collect()
    }

    /// Replace the contents with `records` in the given order. Later
    /// duplicates of an id are dropped.
    pub fn replace(&mut self, records: Vec<ContractRecord>) {
        self.records.clear();
        for record in records {
            self.push(record);
        }
    }
}

/// The two partitions plus the per-context settings that govern them.
///
/// The same contract id never appears in both partitions; all mutation
/// that could break that goes through `ops::visibility` and
/// `ops::session`.
#[derive(Debug, Clone, Default)]
pub struct ContractStore {
    pub primary: Partition,
    pub hidden: Partition,
    pub contexts: BTreeMap<PresentationContext, ContextSettings>,
}

impl ContractStore {
    pub fn partition(&self, kind: PartitionKind) -> &Partition {
        match kind {
            PartitionKind::Primary => &self.primary,
            PartitionKind::Hidden => &self.hidden,
        }
    }

    pub fn partition_mut(&mut self, kind: PartitionKind) -> &mut Partition {
        match kind {
            PartitionKind::Primary => &mut self.primary,
            PartitionKind::Hidden => &mut self.hidden,
        }
    }

    /// Settings for a context, defaulted if never set
    pub fn settings(&self, context: PresentationContext) -> ContextSettings {
        self.contexts.get(&context).copied().unwrap_or_default()
    }

    pub fn settings_mut(&mut self, context: PresentationContext) -> &mut ContextSettings {
        self.contexts.entry(context).or_default()
    }

    /// Which partition holds `id`, if any
    pub fn locate(&self, id: &ContractId) -> Option<PartitionKind> {
        if self.primary.contains(id) {
            Some(PartitionKind::Primary)
        } else if self.hidden.contains(id) {
            Some(PartitionKind::Hidden)
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.hidden.is_empty()
    }

    /// Drop every record from both partitions. Settings are kept.
    pub fn clear(&mut self) {
        self.primary.clear();
        self.hidden.clear();
    }
}
