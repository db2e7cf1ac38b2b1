//! Snapshot differ: detects devices that vanished between cycles.

use std::collections::BTreeSet;

use packet_sd_core::TargetGroup;
use tracing::debug;

/// Output of one reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Live groups in input order, followed by one tombstone per vanished source.
    pub groups: Vec<TargetGroup>,
    /// Exactly the sources of the live groups.
    pub snapshot: BTreeSet<String>,
}

/// Reconcile the live groups of this cycle against the previous snapshot.
///
/// Sources in `previous` but not in `live` get a tombstone. They are not
/// carried into the new snapshot, so each removal is announced once.
pub fn reconcile(previous: &BTreeSet<String>, live: Vec<TargetGroup>) -> Reconciled {
    let snapshot: BTreeSet<String> = live.iter().map(|tg| tg.source.clone()).collect();
    let mut groups = live;

    for source in previous.difference(&snapshot) {
        debug!(%source, "device deleted");
        groups.push(TargetGroup::tombstone(source.clone()));
    }

    Reconciled { groups, snapshot }
}

/// The sources published as live by the most recent successful cycle.
///
/// Owned by a single discoverer; never shared between cycles running at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    sources: BTreeSet<String>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile `live` against this snapshot and replace it with the result.
    pub fn apply(&mut self, live: Vec<TargetGroup>) -> Vec<TargetGroup> {
        let Reconciled { groups, snapshot } = reconcile(&self.sources, live);
        self.sources = snapshot;
        groups
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packet_sd_core::LabelSet;

    fn live(id: &str) -> TargetGroup {
        TargetGroup::new(format!("packet/{id}"), "10.0.0.1:9100", LabelSet::new())
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| format!("packet/{id}")).collect()
    }

    fn tombstones(groups: &[TargetGroup]) -> Vec<&str> {
        groups
            .iter()
            .filter(|tg| tg.is_tombstone())
            .map(|tg| tg.source.as_str())
            .collect()
    }

    #[test]
    fn first_cycle_has_no_tombstones() {
        let out = reconcile(&BTreeSet::new(), vec![live("a"), live("b")]);
        assert_eq!(out.groups.len(), 2);
        assert!(tombstones(&out.groups).is_empty());
        assert_eq!(out.snapshot, set(&["a", "b"]));
    }

    #[test]
    fn drained_inventory_tombstones_everything() {
        let out = reconcile(&set(&["a", "b", "c"]), vec![]);
        assert_eq!(out.groups.len(), 3);
        assert_eq!(tombstones(&out.groups), vec!["packet/a", "packet/b", "packet/c"]);
        assert!(out.snapshot.is_empty());
    }

    #[test]
    fn live_groups_come_before_tombstones() {
        let out = reconcile(&set(&["a", "gone"]), vec![live("a"), live("new")]);
        let sources: Vec<_> = out.groups.iter().map(|tg| tg.source.as_str()).collect();
        assert_eq!(sources, vec!["packet/a", "packet/new", "packet/gone"]);
        assert!(out.groups[2].is_tombstone());
        assert_eq!(out.snapshot, set(&["a", "new"]));
    }

    #[test]
    fn no_placeholder_groups() {
        let out = reconcile(&BTreeSet::new(), vec![live("a")]);
        assert!(out.groups.iter().all(|tg| !tg.source.is_empty()));
    }

    #[test]
    fn tombstone_is_emitted_once() {
        let mut snapshot = Snapshot::new();
        snapshot.apply(vec![live("a"), live("b")]);

        let second = snapshot.apply(vec![live("a")]);
        assert_eq!(tombstones(&second), vec!["packet/b"]);

        let third = snapshot.apply(vec![live("a")]);
        assert!(tombstones(&third).is_empty());
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn every_removal_tombstoned_exactly_once_over_many_cycles() {
        let cycles: Vec<Vec<&str>> = vec![
            vec!["a", "b", "c"],
            vec!["b", "c", "d"],
            vec![],
            vec!["a"],
            vec!["a", "e"],
            vec!["e"],
        ];

        let mut snapshot = Snapshot::new();
        let mut previous: BTreeSet<String> = BTreeSet::new();
        for ids in cycles {
            let groups = snapshot.apply(ids.iter().map(|id| live(id)).collect());
            let current = set(&ids);

            let mut expected: Vec<String> = previous.difference(&current).cloned().collect();
            expected.sort();
            let mut got: Vec<String> = tombstones(&groups).into_iter().map(String::from).collect();
            got.sort();
            assert_eq!(got, expected);

            assert_eq!(groups.len() - got.len(), ids.len());
            assert_eq!(snapshot.sources, current);
            previous = current;
        }
    }

    #[test]
    fn reappearing_source_is_live_again() {
        let mut snapshot = Snapshot::new();
        snapshot.apply(vec![live("a")]);
        snapshot.apply(vec![]);
        let groups = snapshot.apply(vec![live("a")]);
        assert_eq!(groups.len(), 1);
        assert!(!groups[0].is_tombstone());
        assert!(snapshot.sources.contains("packet/a"));
    }
}
