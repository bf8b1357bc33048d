//! Violation and wire types for the remote validation service.

use serde::{Deserialize, Serialize};

/// Severity of a policy violation, as reported by the validation service.
///
/// The variant order drives the canonical ordering used by the criteria
/// serializer and the report summary (most severe first, unspecified last).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    /// Violations with no or unrecognized severity normalize to this.
    #[default]
    #[serde(other)]
    Unspecified,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Unspecified => "UNSPECIFIED",
        }
    }

    /// Severities that may appear as failure-criteria keys.
    /// UNSPECIFIED is never a valid threshold key.
    pub fn threshold_key(key: &str) -> Option<Severity> {
        match key {
            "CRITICAL" => Some(Severity::Critical),
            "HIGH" => Some(Severity::High),
            "MEDIUM" => Some(Severity::Medium),
            "LOW" => Some(Severity::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Details of the violated policy constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance_standards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Linkage back to the security posture the policy belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostureDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posture_deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posture_deployment_target_resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_set: Option<String>,
}

/// Details of the non-compliant asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

/// One policy non-compliance finding tied to one asset and one policy.
///
/// Produced once per completed scan operation and immutable thereafter.
/// The descriptive fields are opaque passthrough data from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub policy_id: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violated_policy: Option<PolicyDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violated_posture: Option<PostureDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violated_asset: Option<AssetDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
}

/// Operation-level error reported by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub message: String,
}

/// Validation report carried in a completed operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IacValidationReport {
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

/// Payload of a completed operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    #[serde(default)]
    pub iac_validation_report: Option<IacValidationReport>,
}

/// Remote long-running-operation handle.
///
/// Each poll returns a fresh snapshot; terminal when `done` is true.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<OperationError>,
    #[serde(default)]
    pub response: Option<OperationResponse>,
}

/// Per-severity violation counts for report output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unspecified: usize,
}

impl ScanSummary {
    pub fn from_violations(violations: &[Violation]) -> Self {
        let counts = crate::criteria::count_by_severity(violations);
        let get = |s: Severity| counts.get(&s).copied().unwrap_or(0);
        Self {
            critical: get(Severity::Critical),
            high: get(Severity::High),
            medium: get(Severity::Medium),
            low: get(Severity::Low),
            unspecified: get(Severity::Unspecified),
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.unspecified
    }
}

/// Final classification of a gate run. Always exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanVerdict {
    Passed,
    Failed,
    Error,
}

impl ScanVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanVerdict::Passed => "passed",
            ScanVerdict::Failed => "failed",
            ScanVerdict::Error => "error",
        }
    }
}

impl std::fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The findings document handed to the reporters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub version: String,
    pub scanned_at: String,
    /// Path of the plan file the scan was run against.
    pub target: String,
    pub verdict: ScanVerdict,
    pub summary: ScanSummary,
    pub violations: Vec<Violation>,
}

impl ScanReport {
    pub fn new(target: &str, verdict: ScanVerdict, violations: Vec<Violation>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            scanned_at: chrono::Utc::now().to_rfc3339(),
            target: target.to_string(),
            verdict,
            summary: ScanSummary::from_violations(&violations),
            violations,
        }
    }
}
