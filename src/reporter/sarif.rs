use crate::reporter::Reporter;
use crate::scan::types::{ScanReport, Severity, Violation};
use serde::Serialize;

pub struct SarifReporter;

impl SarifReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SarifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for SarifReporter {
    fn report(&self, report: &ScanReport) -> String {
        let sarif = SarifReport::from_scan_report(report);
        serde_json::to_string_pretty(&sarif)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize SARIF: {}"}}"#, e))
    }
}

#[derive(Debug, Serialize)]
pub struct SarifReport {
    #[serde(rename = "$schema")]
    pub schema: String,
    pub version: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRule {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_description: Option<SarifMessage>,
    pub properties: SarifRuleProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifRuleProperties {
    #[serde(rename = "security-severity")]
    pub security_severity: String,
    pub severity: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResult {
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
    pub properties: SarifResultProperties,
}

#[derive(Debug, Serialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLocation {
    pub logical_locations: Vec<SarifLogicalLocation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifLogicalLocation {
    pub fully_qualified_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SarifResultProperties {
    pub asset_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    pub severity: String,
}

impl SarifReport {
    pub fn from_scan_report(report: &ScanReport) -> Self {
        let mut rules: Vec<SarifRule> = Vec::new();
        let mut seen_rule_ids: std::collections::HashSet<String> = std::collections::HashSet::new();

        for violation in &report.violations {
            if seen_rule_ids.insert(violation.policy_id.clone()) {
                rules.push(SarifRule {
                    id: violation.policy_id.clone(),
                    full_description: violation
                        .violated_policy
                        .as_ref()
                        .and_then(|p| p.description.clone())
                        .map(|text| SarifMessage { text }),
                    properties: SarifRuleProperties {
                        security_severity: Self::severity_to_score(&violation.severity),
                        severity: violation.severity.as_str().to_string(),
                        tags: Self::violation_tags(violation),
                    },
                });
            }
        }

        let results: Vec<SarifResult> = report
            .violations
            .iter()
            .map(|v| SarifResult {
                rule_id: v.policy_id.clone(),
                level: Self::severity_to_level(&v.severity),
                message: SarifMessage {
                    text: Self::result_message(v),
                },
                locations: vec![SarifLocation {
                    logical_locations: vec![SarifLogicalLocation {
                        fully_qualified_name: v.asset_id.clone(),
                    }],
                }],
                properties: SarifResultProperties {
                    asset_id: v.asset_id.clone(),
                    asset_type: v
                        .violated_asset
                        .as_ref()
                        .and_then(|a| a.asset_type.clone()),
                    severity: v.severity.as_str().to_string(),
                },
            })
            .collect();

        SarifReport {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json".to_string(),
            version: "2.1.0".to_string(),
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "iac-gate".to_string(),
                        version: report.version.clone(),
                        information_uri: "https://github.com/iac-gate/iac-gate".to_string(),
                        rules,
                    },
                },
                results,
            }],
        }
    }

    fn result_message(violation: &Violation) -> String {
        let mut text = format!(
            "Asset {} violates policy {}",
            violation.asset_id, violation.policy_id
        );
        if let Some(description) = violation
            .violated_policy
            .as_ref()
            .and_then(|p| p.description.as_ref())
        {
            text.push_str(&format!("\n\n{}", description));
        }
        if let Some(next_steps) = &violation.next_steps {
            text.push_str(&format!("\n\nNext steps: {}", next_steps));
        }
        text
    }

    fn severity_to_level(severity: &Severity) -> String {
        match severity {
            Severity::Critical | Severity::High => "error".to_string(),
            Severity::Medium => "warning".to_string(),
            Severity::Low => "note".to_string(),
            Severity::Unspecified => "none".to_string(),
        }
    }

    fn severity_to_score(severity: &Severity) -> String {
        match severity {
            Severity::Critical => "9.0".to_string(),
            Severity::High => "7.0".to_string(),
            Severity::Medium => "5.0".to_string(),
            Severity::Low => "3.0".to_string(),
            Severity::Unspecified => "0.0".to_string(),
        }
    }

    fn violation_tags(violation: &Violation) -> Vec<String> {
        let mut tags = vec!["security".to_string()];
        if let Some(policy) = &violation.violated_policy {
            for standard in &policy.compliance_standards {
                tags.push(standard.clone());
            }
        }
        tags
    }
}
