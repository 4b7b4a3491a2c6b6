use std::collections::BTreeSet;

/// Presence value exported for every active label combination
pub const PRESENCE: f64 = 1.0;

/// Label tuple identifying one exported series
///
/// `fixed_version` is only populated when the snapshot was built with the
/// fixed-version label enabled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotKey {
    pub target: String,
    pub vulnerability_id: String,
    pub package_name: String,
    pub installed_version: String,
    pub severity: String,
    pub fixed_version: Option<String>,
}

impl SnapshotKey {
    pub fn new(
        target: &str,
        vulnerability_id: &str,
        package_name: &str,
        installed_version: &str,
        severity: &str,
    ) -> Self {
        Self {
            target: target.to_string(),
            vulnerability_id: vulnerability_id.to_string(),
            package_name: package_name.to_string(),
            installed_version: installed_version.to_string(),
            severity: severity.to_string(),
            fixed_version: None,
        }
    }

    pub fn with_fixed_version(mut self, fixed_version: &str) -> Self {
        self.fixed_version = Some(fixed_version.to_string());
        self
    }
}

/// The complete exported set of findings-as-gauges
///
/// Every entry maps to the presence value [`PRESENCE`]. A snapshot is
/// immutable once built; the publisher replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    entries: BTreeSet<SnapshotKey>,
    includes_fixed_version: bool,
}

impl Snapshot {
    pub fn empty(includes_fixed_version: bool) -> Self {
        Self {
            entries: BTreeSet::new(),
            includes_fixed_version,
        }
    }

    pub(crate) fn from_entries(entries: BTreeSet<SnapshotKey>, includes_fixed_version: bool) -> Self {
        Self {
            entries,
            includes_fixed_version,
        }
    }

    pub fn get(&self, key: &SnapshotKey) -> Option<f64> {
        self.entries.contains(key).then_some(PRESENCE)
    }

    pub fn contains(&self, key: &SnapshotKey) -> bool {
        self.entries.contains(key)
    }

    /// Entries in label order
    pub fn entries(&self) -> impl Iterator<Item = &SnapshotKey> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn includes_fixed_version(&self) -> bool {
        self.includes_fixed_version
    }
}
