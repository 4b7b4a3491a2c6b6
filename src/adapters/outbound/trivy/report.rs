use crate::vulnerability_collection::domain::{Finding, ScanResult};
use serde::Deserialize;

/// Trivy JSON report
///
/// Older Trivy releases print a bare array of targets; current releases wrap
/// it in an object with a `Results` field.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TrivyReport {
    Legacy(Vec<TrivyTarget>),
    Current {
        #[serde(rename = "Results", default)]
        results: Option<Vec<TrivyTarget>>,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrivyTarget {
    #[serde(rename = "Target")]
    target: String,
    #[serde(rename = "Vulnerabilities", default)]
    vulnerabilities: Option<Vec<TrivyVulnerability>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrivyVulnerability {
    #[serde(rename = "VulnerabilityID")]
    vulnerability_id: String,
    #[serde(rename = "PkgName")]
    pkg_name: String,
    #[serde(rename = "InstalledVersion", default)]
    installed_version: String,
    #[serde(rename = "FixedVersion", default)]
    fixed_version: Option<String>,
    #[serde(rename = "Severity", default)]
    severity: String,
}

impl TrivyReport {
    pub(crate) fn parse(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Converts the report into domain scan results, one per target
    pub(crate) fn into_scan_results(self) -> Vec<ScanResult> {
        let targets = match self {
            TrivyReport::Legacy(targets) => targets,
            TrivyReport::Current { results } => results.unwrap_or_default(),
        };

        targets.into_iter().map(TrivyTarget::into_scan_result).collect()
    }
}

impl TrivyTarget {
    fn into_scan_result(self) -> ScanResult {
        let target = target_label(&self.target);
        let findings = self
            .vulnerabilities
            .unwrap_or_default()
            .into_iter()
            .map(|v| {
                Finding::new(
                    target.clone(),
                    v.vulnerability_id,
                    v.pkg_name,
                    v.installed_version,
                    v.fixed_version,
                    v.severity,
                )
            })
            .collect();

        ScanResult::new(target, findings)
    }
}

/// Trivy appends the detected OS to image targets, e.g.
/// `nginx:1.19 (debian 10.4)`; only the first token identifies the image.
fn target_label(target: &str) -> String {
    target
        .split_whitespace()
        .next()
        .unwrap_or(target)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"[{"Target": "k8s.gcr.io/kube-addon-manager:v9.0.2 (debian 9.8)",
"Vulnerabilities":[{
"VulnerabilityID":"CVE-2011-3374",
"PkgName":"apt",
"InstalledVersion":"1.4.9",
"FixedVersion":"",
"Title":"",
"Description":"",
"Severity":"LOW",
"References":null
}]}]"#;

    const CURRENT: &str = r#"{
  "SchemaVersion": 2,
  "ArtifactName": "python:3.4-alpine",
  "Results": [
    {
      "Target": "python:3.4-alpine (alpine 3.9.2)",
      "Class": "os-pkgs",
      "Vulnerabilities": [
        {
          "VulnerabilityID": "CVE-2019-14697",
          "PkgName": "musl",
          "InstalledVersion": "1.1.20-r4",
          "FixedVersion": "1.1.20-r5",
          "Severity": "CRITICAL"
        },
        {
          "VulnerabilityID": "CVE-2019-1549",
          "PkgName": "openssl",
          "InstalledVersion": "1.1.1a-r1",
          "FixedVersion": "1.1.1d-r0",
          "Severity": "MEDIUM"
        }
      ]
    },
    {
      "Target": "usr/local/lib/python3.4/site-packages/requirements.txt",
      "Class": "lang-pkgs",
      "Vulnerabilities": null
    }
  ]
}"#;

    #[test]
    fn test_parse_legacy_array() {
        let results = TrivyReport::parse(LEGACY.as_bytes())
            .unwrap()
            .into_scan_results();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].target(), "k8s.gcr.io/kube-addon-manager:v9.0.2");

        let finding = &results[0].findings()[0];
        assert_eq!(finding.vulnerability_id(), "CVE-2011-3374");
        assert_eq!(finding.package_name(), "apt");
        assert_eq!(finding.installed_version(), "1.4.9");
        assert_eq!(finding.fixed_version(), None);
        assert_eq!(finding.severity(), "LOW");
    }

    #[test]
    fn test_parse_current_report() {
        let results = TrivyReport::parse(CURRENT.as_bytes())
            .unwrap()
            .into_scan_results();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].target(), "python:3.4-alpine");
        assert_eq!(results[0].findings().len(), 2);
        assert_eq!(results[0].findings()[0].fixed_version(), Some("1.1.20-r5"));
        assert_eq!(results[0].findings()[1].target(), "python:3.4-alpine");

        // Null vulnerability lists yield a target with no findings
        assert!(results[1].findings().is_empty());
    }

    #[test]
    fn test_parse_report_without_results() {
        let results = TrivyReport::parse(br#"{"SchemaVersion": 2, "ArtifactName": "scratch"}"#)
            .unwrap()
            .into_scan_results();
        assert!(results.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(TrivyReport::parse(b"FATAL error in image scan").is_err());
    }

    #[test]
    fn test_target_label() {
        assert_eq!(target_label("nginx:1.19 (debian 10.4)"), "nginx:1.19");
        assert_eq!(target_label("nginx:1.19"), "nginx:1.19");
        assert_eq!(target_label(""), "");
    }
}
