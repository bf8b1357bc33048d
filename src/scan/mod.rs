//! Scan client and wire types for the remote validation service.

pub mod client;
pub mod transport;
pub mod types;

pub use client::{ScanClient, MAX_PLAN_BYTES};
pub use transport::{
    BearerToken, HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TokenProvider,
};
pub use types::{Operation, ScanReport, ScanSummary, ScanVerdict, Severity, Violation};
