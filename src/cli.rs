use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Sarif,
}

#[derive(Parser, Debug)]
#[command(
    name = "iac-gate",
    version,
    about = "CI gate that validates IaC plans against a remote security-validation service",
    long_about = "iac-gate submits a Terraform plan file to a remote security-validation \
                  service, waits for the scan to complete, and fails the build when the \
                  reported policy violations satisfy the configured failure criteria."
)]
pub struct Cli {
    /// Terraform plan file in JSON form
    #[arg(long, value_name = "PATH")]
    pub plan_file: PathBuf,

    /// Organization to run the validation under
    #[arg(long, value_name = "ID")]
    pub organization_id: String,

    /// OAuth2 access token for the validation service (CI-injected)
    #[arg(long, env = "IAC_GATE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Base URL of the validation service
    #[arg(
        long,
        value_name = "URL",
        default_value = "https://securityposture.googleapis.com/v1"
    )]
    pub base_url: String,

    /// Scan timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 60_000)]
    pub scan_timeout: u64,

    /// Failure criteria expression, e.g. "Critical:1, High:2, Operator:OR"
    #[arg(long, value_name = "EXPR")]
    pub failure_criteria: Option<String>,

    /// Report violations but never fail the build on them
    #[arg(long)]
    pub ignore_violations: bool,

    /// Do not fail the build when the scan itself errors
    #[arg(long)]
    pub fail_silently: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Terminal)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
