/// Finding value object representing one vulnerability instance
///
/// A finding is attributed to a package/version inside a scan target.
/// Severity is kept as the scanner reported it (e.g. `HIGH`, `UNKNOWN`);
/// it is a label, not something this crate ranks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Finding {
    target: String,
    vulnerability_id: String,
    package_name: String,
    installed_version: String,
    fixed_version: Option<String>,
    severity: String,
}

impl Finding {
    pub fn new(
        target: String,
        vulnerability_id: String,
        package_name: String,
        installed_version: String,
        fixed_version: Option<String>,
        severity: String,
    ) -> Self {
        Self {
            target,
            vulnerability_id,
            package_name,
            installed_version,
            fixed_version: fixed_version.filter(|v| !v.is_empty()),
            severity,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn vulnerability_id(&self) -> &str {
        &self.vulnerability_id
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn installed_version(&self) -> &str {
        &self.installed_version
    }

    pub fn fixed_version(&self) -> Option<&str> {
        self.fixed_version.as_deref()
    }

    pub fn severity(&self) -> &str {
        &self.severity
    }
}

/// Scanner output for one target of an image
///
/// A single image may decompose into several targets (OS packages,
/// language-specific lockfiles, ...), each with its own findings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    target: String,
    findings: Vec<Finding>,
}

impl ScanResult {
    pub fn new(target: String, findings: Vec<Finding>) -> Self {
        Self { target, findings }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}
