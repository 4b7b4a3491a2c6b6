use crate::vulnerability_collection::domain::{ScanResult, Snapshot, SnapshotKey};
use std::collections::BTreeSet;

/// SnapshotBuilder service aggregating scan results into a fresh Snapshot
///
/// The builder never looks at a previous snapshot: anything not present in
/// `results` is absent from the output.
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    /// Builds one entry per distinct label tuple found in `results`
    ///
    /// # Arguments
    /// * `results` - Scan results accumulated over one cycle
    /// * `include_fixed_version` - Whether `fixed_version` is part of the label tuple
    pub fn build(results: &[ScanResult], include_fixed_version: bool) -> Snapshot {
        let entries: BTreeSet<SnapshotKey> = results
            .iter()
            .flat_map(|result| result.findings())
            .map(|finding| {
                let key = SnapshotKey::new(
                    finding.target(),
                    finding.vulnerability_id(),
                    finding.package_name(),
                    finding.installed_version(),
                    finding.severity(),
                );
                if include_fixed_version {
                    key.with_fixed_version(finding.fixed_version().unwrap_or_default())
                } else {
                    key
                }
            })
            .collect();

        Snapshot::from_entries(entries, include_fixed_version)
    }
}
