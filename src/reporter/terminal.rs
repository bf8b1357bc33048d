use crate::reporter::Reporter;
use crate::scan::types::{ScanReport, ScanVerdict, Severity, Violation};
use colored::Colorize;

pub struct TerminalReporter {
    verbose: bool,
}

impl TerminalReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn severity_label(&self, severity: &Severity) -> colored::ColoredString {
        let label = format!("[{}]", severity);
        match severity {
            Severity::Critical => label.red().bold(),
            Severity::High => label.yellow().bold(),
            Severity::Medium => label.cyan(),
            Severity::Low => label.white(),
            Severity::Unspecified => label.dimmed(),
        }
    }

    fn verdict_label(&self, verdict: &ScanVerdict) -> colored::ColoredString {
        match verdict {
            ScanVerdict::Passed => "passed".green().bold(),
            ScanVerdict::Failed => "failed".red().bold(),
            ScanVerdict::Error => "error".yellow().bold(),
        }
    }

    fn format_violation(&self, violation: &Violation) -> String {
        let mut output = format!(
            "{} {} on {}\n",
            self.severity_label(&violation.severity),
            violation.policy_id,
            violation.asset_id
        );

        if let Some(description) = violation
            .violated_policy
            .as_ref()
            .and_then(|p| p.description.as_ref())
        {
            output.push_str(&format!("    {} {}\n", "why:".dimmed(), description));
        }
        if let Some(next_steps) = &violation.next_steps {
            output.push_str(&format!("    {} {}\n", "fix:".dimmed(), next_steps.green()));
        }
        if self.verbose {
            if let Some(asset_type) = violation
                .violated_asset
                .as_ref()
                .and_then(|a| a.asset_type.as_ref())
            {
                output.push_str(&format!("    {} {}\n", "asset type:".dimmed(), asset_type));
            }
            if let Some(standards) = violation
                .violated_policy
                .as_ref()
                .filter(|p| !p.compliance_standards.is_empty())
                .map(|p| p.compliance_standards.join(", "))
            {
                output.push_str(&format!("    {} {}\n", "standards:".dimmed(), standards));
            }
        }
        output
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &ScanReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Scanned {} at {}\n\n",
            report.target.bold(),
            report.scanned_at
        ));

        for violation in &report.violations {
            output.push_str(&self.format_violation(violation));
            output.push('\n');
        }

        let summary = &report.summary;
        output.push_str(&format!(
            "{} {} critical, {} high, {} medium, {} low, {} unspecified ({} total)\n",
            "Summary:".bold(),
            summary.critical,
            summary.high,
            summary.medium,
            summary.low,
            summary.unspecified,
            summary.total()
        ));
        output.push_str(&format!(
            "Result: {}\n",
            self.verdict_label(&report.verdict)
        ));

        output
    }
}
