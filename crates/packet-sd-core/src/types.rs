//! Shared types used across packet-sd crates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::labels::{ADDRESS_LABEL, PROVIDER};

/// Label name → label value. Ordered so rendered output is stable.
pub type LabelSet = BTreeMap<String, String>;

/// A set of targets sharing one label set, identified by `source`.
///
/// A group with no targets and no labels is a tombstone: it tells the
/// consumer that everything previously published under `source` is gone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetGroup {
    /// Stable key of the originating device, `packet/<device-id>`.
    pub source: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<LabelSet>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: LabelSet,
}

impl TargetGroup {
    /// A group with a single target at `address` and the given labels.
    ///
    /// The address label is inserted into `labels` as well.
    pub fn new(source: impl Into<String>, address: impl Into<String>, mut labels: LabelSet) -> Self {
        let address = address.into();
        labels.insert(ADDRESS_LABEL.to_string(), address.clone());
        Self {
            source: source.into(),
            targets: vec![LabelSet::from([(ADDRESS_LABEL.to_string(), address)])],
            labels,
        }
    }

    /// An empty group signalling removal of `source`.
    pub fn tombstone(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.targets.is_empty() && self.labels.is_empty()
    }

    /// Target addresses of this group, in target order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.targets
            .iter()
            .filter_map(|t| t.get(ADDRESS_LABEL).map(String::as_str))
    }
}

/// Build the target group source for a device id.
pub fn source_for(device_id: &str) -> String {
    format!("{PROVIDER}/{device_id}")
}
