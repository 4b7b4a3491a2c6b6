use crate::vulnerability_collection::domain::snapshot::PRESENCE;
use crate::vulnerability_collection::domain::Snapshot;
use std::fmt::Write;

/// Content type of the Prometheus text exposition format
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Fully qualified gauge name (`trivy` namespace, `vulnerabilities` metric)
pub const METRIC_NAME: &str = "trivy_vulnerabilities";

const METRIC_HELP: &str = "Vulnerabilities detected by trivy";

/// Renders a snapshot as one gauge family
///
/// Series are emitted in snapshot order, which is sorted by label tuple, so
/// repeated scrapes of the same snapshot produce identical output.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::with_capacity(128 + snapshot.len() * 160);
    let _ = writeln!(out, "# HELP {} {}", METRIC_NAME, METRIC_HELP);
    let _ = writeln!(out, "# TYPE {} gauge", METRIC_NAME);

    for key in snapshot.entries() {
        let mut labels = vec![
            ("target", key.target.as_str()),
            ("vulnerabilityId", key.vulnerability_id.as_str()),
            ("packageName", key.package_name.as_str()),
            ("installedVersion", key.installed_version.as_str()),
            ("severity", key.severity.as_str()),
        ];
        if let Some(fixed) = &key.fixed_version {
            labels.push(("fixedVersion", fixed.as_str()));
        }

        out.push_str(METRIC_NAME);
        out.push('{');
        for (i, (name, val)) in labels.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}=\"{}\"", name, escape_label_value(val));
        }
        let _ = writeln!(out, "}} {}", PRESENCE);
    }

    out
}

fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}
