//! Gate run orchestration: config, scan, evaluation, report, exit code.

use crate::cli::{Cli, OutputFormat};
use crate::config::RunConfig;
use crate::criteria::{self, FailureCriteria};
use crate::error::ScanError;
use crate::reporter::{
    json::JsonReporter, sarif::SarifReporter, terminal::TerminalReporter, Reporter,
};
use crate::scan::types::{ScanReport, ScanVerdict, Violation};
use crate::scan::{BearerToken, ReqwestTransport, ScanClient};
use std::fs;
use std::process::ExitCode;
use tracing::{debug, info};

/// Classify a completed scan.
///
/// `failed` iff the criteria are satisfied and violations are not
/// configured to be ignored.
pub fn decide_verdict(
    criteria: &FailureCriteria,
    violations: &[Violation],
    ignore_violations: bool,
) -> ScanVerdict {
    if criteria::is_satisfied(criteria, violations) && !ignore_violations {
        ScanVerdict::Failed
    } else {
        ScanVerdict::Passed
    }
}

/// Render a report in the configured format.
pub fn format_report(config: &RunConfig, report: &ScanReport) -> String {
    match config.format {
        OutputFormat::Terminal => TerminalReporter::new(config.verbose).report(report),
        OutputFormat::Json => JsonReporter::new().report(report),
        OutputFormat::Sarif => SarifReporter::new().report(report),
    }
}

/// Run the whole gate. Exit codes: 0 passed (or silenced error),
/// 1 failed, 2 error or invalid configuration.
pub async fn run_gate(cli: &Cli) -> ExitCode {
    let config = match RunConfig::from_cli(cli) {
        Ok(config) => config,
        // Validation errors are never silenced: a misconfigured run is
        // not a safe no-op. The classification line is still emitted.
        Err(e) => {
            eprintln!("{e}");
            println!("iac scan result: {}", ScanVerdict::Error);
            return ExitCode::from(2);
        }
    };

    let plan = match fs::read(&config.plan_file) {
        Ok(plan) => plan,
        Err(e) => {
            let err = ScanError::internal(format!(
                "failed to read plan file {}: {e}",
                config.plan_file.display()
            ));
            return finish_error(&config, &err);
        }
    };

    info!(
        plan = %config.plan_file.display(),
        organization = %config.organization_id,
        timeout_ms = config.scan_timeout.as_millis() as u64,
        "starting IaC scan"
    );

    let client = ScanClient::new(
        ReqwestTransport::new(),
        BearerToken::new(config.access_token.clone()),
        &config.base_url,
        &config.organization_id,
        config.scan_timeout,
    );

    match client.scan(&plan).await {
        Ok(violations) => finish_scan(&config, violations),
        Err(e) => finish_error(&config, &e),
    }
}

fn finish_scan(config: &RunConfig, violations: Vec<Violation>) -> ExitCode {
    let verdict = decide_verdict(&config.criteria, &violations, config.ignore_violations);
    debug!(
        violations = violations.len(),
        verdict = %verdict,
        "failure criteria evaluated"
    );

    let report = ScanReport::new(&config.plan_file.display().to_string(), verdict, violations);
    let rendered = format_report(config, &report);

    if let Some(ref output_path) = config.output {
        match fs::write(output_path, &rendered) {
            Ok(()) => println!("Report written to {}", output_path.display()),
            Err(e) => {
                eprintln!("Failed to write report to {}: {e}", output_path.display());
                return ExitCode::from(2);
            }
        }
    } else {
        println!("{rendered}");
    }

    println!("iac scan result: {verdict}");
    match verdict {
        ScanVerdict::Failed => ExitCode::from(1),
        _ => ExitCode::SUCCESS,
    }
}

fn finish_error(config: &RunConfig, err: &ScanError) -> ExitCode {
    eprintln!("{}", err.message);
    println!("iac scan result: {}", ScanVerdict::Error);
    if config.fail_silently {
        info!(status = err.status_code, "scan error suppressed by fail_silently");
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}
