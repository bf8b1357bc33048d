//! Validated run configuration.
//!
//! Built once from the CLI at the start of a run and read-only
//! afterward. Validation failures here always fail the run;
//! `--fail-silently` never suppresses them.

use crate::cli::{Cli, OutputFormat};
use crate::criteria::FailureCriteria;
use crate::error::ValidationError;
use std::path::PathBuf;
use std::time::Duration;

/// Scan timeout bounds in milliseconds.
pub const MIN_SCAN_TIMEOUT_MS: u64 = 60_000;
pub const MAX_SCAN_TIMEOUT_MS: u64 = 900_000;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub plan_file: PathBuf,
    pub organization_id: String,
    pub access_token: String,
    pub base_url: String,
    pub scan_timeout: Duration,
    pub criteria: FailureCriteria,
    pub ignore_violations: bool,
    pub fail_silently: bool,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub verbose: bool,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ValidationError> {
        if !(MIN_SCAN_TIMEOUT_MS..=MAX_SCAN_TIMEOUT_MS).contains(&cli.scan_timeout) {
            return Err(ValidationError::Timeout {
                value: cli.scan_timeout,
                min: MIN_SCAN_TIMEOUT_MS,
                max: MAX_SCAN_TIMEOUT_MS,
            });
        }

        let criteria = FailureCriteria::parse_or_default(cli.failure_criteria.as_deref())?;

        Ok(Self {
            plan_file: cli.plan_file.clone(),
            organization_id: cli.organization_id.clone(),
            access_token: cli.access_token.clone(),
            base_url: cli.base_url.trim_end_matches('/').to_string(),
            scan_timeout: Duration::from_millis(cli.scan_timeout),
            criteria,
            ignore_violations: cli.ignore_violations,
            fail_silently: cli.fail_silently,
            format: cli.format,
            output: cli.output.clone(),
            verbose: cli.verbose,
        })
    }
}
