//! iac-gate: CI gate for IaC security validation.
//!
//! Submits a Terraform plan to a remote security-validation service,
//! polls the resulting long-running operation to completion, evaluates
//! the returned policy violations against configurable failure criteria,
//! and renders findings reports.

pub mod cli;
pub mod config;
pub mod criteria;
pub mod error;
pub mod handlers;
pub mod reporter;
pub mod scan;

#[cfg(test)]
pub mod test_utils;

pub use cli::{Cli, OutputFormat};
pub use config::RunConfig;
pub use criteria::{count_by_severity, is_satisfied, AggregationOperator, FailureCriteria};
pub use error::{CriteriaError, ScanError, ValidationError};
pub use reporter::{
    json::JsonReporter, sarif::SarifReporter, terminal::TerminalReporter, Reporter,
};
pub use scan::{
    BearerToken, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, ScanClient,
    ScanReport, ScanVerdict, Severity, TokenProvider, Violation, MAX_PLAN_BYTES,
};
