//! Long-running-operation client for the validation service.
//!
//! One scan is submit + poll, strictly sequential, under a single
//! wall-clock deadline fixed at construction. Both phases retry
//! retryable HTTP statuses with exponential backoff; the poll phase
//! additionally re-fetches a not-yet-done operation on the same
//! schedule. A fresh client (and fresh attempt counters) is constructed
//! per scan invocation.

use crate::error::ScanError;
use crate::scan::transport::{HttpRequest, HttpResponse, HttpTransport, Method, TokenProvider};
use crate::scan::types::{Operation, Violation};
use base64::Engine as _;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Maximum accepted size of the base64-encoded plan payload.
pub const MAX_PLAN_BYTES: usize = 1_048_576;

/// HTTP statuses worth retrying.
const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

fn is_retryable(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Client for one scan invocation against the validation service.
pub struct ScanClient<T, P> {
    transport: T,
    tokens: P,
    base_url: String,
    organization_id: String,
    deadline: Instant,
}

impl<T: HttpTransport, P: TokenProvider> ScanClient<T, P> {
    /// The deadline is `now + scan_timeout`, fixed here; both retry loops
    /// stop once the current time passes it.
    pub fn new(
        transport: T,
        tokens: P,
        base_url: impl Into<String>,
        organization_id: impl Into<String>,
        scan_timeout: Duration,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            tokens,
            base_url,
            organization_id: organization_id.into(),
            deadline: Instant::now() + scan_timeout,
        }
    }

    /// Submit the plan, poll the operation to completion, and return the
    /// normalized violations.
    ///
    /// Every failure converges here into a single wrapped error, keeping
    /// the innermost status code.
    pub async fn scan(&self, plan: &[u8]) -> Result<Vec<Violation>, ScanError> {
        self.scan_inner(plan).await.map_err(|e| {
            ScanError::new(
                e.status_code,
                format!("Failed to scan file due to following error: {}", e.message),
            )
        })
    }

    async fn scan_inner(&self, plan: &[u8]) -> Result<Vec<Violation>, ScanError> {
        let operation_name = self.submit(plan).await?;
        let operation = self.poll(&operation_name).await?;
        validate_result(operation)
    }

    /// Submit phase: create the remote operation and return its name.
    async fn submit(&self, plan: &[u8]) -> Result<String, ScanError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(plan);
        // Local precondition, never sent to the service.
        if encoded.len() > MAX_PLAN_BYTES {
            return Err(ScanError::new(
                400,
                format!("plan file size exceeds the maximum supported size of {MAX_PLAN_BYTES} bytes"),
            ));
        }

        let url = format!(
            "{}/organizations/{}/locations/global/reports:createIaCValidationReport",
            self.base_url, self.organization_id
        );
        let body = serde_json::json!({
            "parent": self.organization_id,
            "iac": { "tf_plan": encoded },
        });

        let mut attempt: u32 = 0;
        loop {
            let response = self.send(Method::Post, &url, Some(body.clone())).await?;
            if is_success(response.status) {
                let operation = parse_operation(&response.body)?;
                if operation.name.is_empty() {
                    return Err(ScanError::internal(
                        "operation name missing from create response",
                    ));
                }
                debug!(operation = %operation.name, "scan operation created");
                return Ok(operation.name);
            }
            if is_retryable(response.status) {
                debug!(status = response.status, attempt, "retrying scan submission");
                self.backoff(&mut attempt).await?;
                continue;
            }
            return Err(ScanError::new(
                response.status,
                format!(
                    "scan request failed with status {}: {}",
                    response.status, response.body
                ),
            ));
        }
    }

    /// Poll phase: fetch the operation until `done`. The attempt counter
    /// starts from zero here (the phases share only the deadline) and is
    /// not reset between not-done responses.
    async fn poll(&self, operation_name: &str) -> Result<Operation, ScanError> {
        let url = format!("{}/{}", self.base_url, operation_name);

        let mut attempt: u32 = 0;
        loop {
            let response = self.send(Method::Get, &url, None).await?;
            if is_success(response.status) {
                let operation = parse_operation(&response.body)?;
                if operation.done {
                    debug!(operation = %operation.name, "scan operation completed");
                    return Ok(operation);
                }
                debug!(attempt, "scan operation not done yet");
                self.backoff(&mut attempt).await?;
                continue;
            }
            if is_retryable(response.status) {
                debug!(status = response.status, attempt, "retrying operation fetch");
                self.backoff(&mut attempt).await?;
                continue;
            }
            return Err(ScanError::new(
                response.status,
                format!(
                    "operation fetch failed with status {}: {}",
                    response.status, response.body
                ),
            ));
        }
    }

    /// Gate on the deadline, sleep `2^attempt` seconds, bump the counter,
    /// then gate again so no attempt is issued once the deadline has
    /// passed. In-flight calls are never interrupted.
    async fn backoff(&self, attempt: &mut u32) -> Result<(), ScanError> {
        if Instant::now() >= self.deadline {
            return Err(ScanError::timeout());
        }
        let delay = Duration::from_secs(1u64 << (*attempt).min(63));
        sleep(delay).await;
        *attempt += 1;
        if Instant::now() >= self.deadline {
            return Err(ScanError::timeout());
        }
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse, ScanError> {
        let token = self.tokens.access_token().await?;
        self.transport
            .request(HttpRequest {
                method,
                url: url.to_string(),
                headers: vec![("Authorization".to_string(), format!("Bearer {token}"))],
                body,
            })
            .await
    }
}

fn parse_operation(body: &str) -> Result<Operation, ScanError> {
    serde_json::from_str(body)
        .map_err(|e| ScanError::internal(format!("failed to decode operation response: {e}")))
}

/// Validate a `done` operation and extract its violations.
///
/// The only transformation applied to violation records is severity
/// normalization to UNSPECIFIED, which the deserializer already did.
fn validate_result(operation: Operation) -> Result<Vec<Violation>, ScanError> {
    if let Some(error) = operation.error {
        let status = if error.code == 0 { 500 } else { error.code };
        return Err(ScanError::new(status, error.message));
    }

    // A done operation with no response violates the server contract but
    // has been observed in the wild.
    let response = operation
        .response
        .ok_or_else(|| ScanError::internal("Polling Validation Service Endpoint Timed Out"))?;
    let report = response
        .iac_validation_report
        .ok_or_else(|| ScanError::internal("invalid validationReport"))?;

    for violation in &report.violations {
        let mut blank = Vec::new();
        if violation.asset_id.trim().is_empty() {
            blank.push("assetId");
        }
        if violation.policy_id.trim().is_empty() {
            blank.push("policyId");
        }
        if !blank.is_empty() {
            return Err(ScanError::internal(format!(
                "violation with blank field(s): {}",
                blank.join(", ")
            )));
        }
    }

    Ok(report.violations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::types::Severity;
    use crate::test_utils::fixtures::{token, MockTransport};

    const TIMEOUT: Duration = Duration::from_millis(60_000);

    fn client(transport: MockTransport) -> ScanClient<MockTransport, crate::scan::transport::BearerToken> {
        ScanClient::new(
            transport,
            token(),
            "https://validation.example/v1",
            "1234567890",
            TIMEOUT,
        )
    }

    fn created_operation() -> String {
        r#"{"name": "operations/op-1", "done": false}"#.to_string()
    }

    fn done_operation(violations_json: &str) -> String {
        format!(
            r#"{{"name": "operations/op-1", "done": true,
                 "response": {{"iacValidationReport": {{"violations": {violations_json}}}}}}}"#
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_happy_path() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(200, &done_operation(r#"[{"assetId":"a1","policyId":"p1","severity":"HIGH"}]"#));

        let violations = client(transport.clone()).scan(b"{}").await.unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].severity, Severity::High);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Post);
        assert!(requests[0].url.ends_with(
            "/organizations/1234567890/locations/global/reports:createIaCValidationReport"
        ));
        assert_eq!(requests[1].method, Method::Get);
        assert!(requests[1].url.ends_with("/operations/op-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_body_shape() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(200, &done_operation("[]"));

        client(transport.clone()).scan(b"plan-bytes").await.unwrap();

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["parent"], "1234567890");
        let encoded = body["iac"]["tf_plan"].as_str().unwrap().to_string();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(decoded, b"plan-bytes");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_sends_bearer_token() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(200, &done_operation("[]"));

        client(transport.clone()).scan(b"{}").await.unwrap();

        for request in transport.requests() {
            let auth = request
                .headers
                .iter()
                .find(|(name, _)| name == "Authorization")
                .map(|(_, value)| value.clone())
                .unwrap();
            assert_eq!(auth, "Bearer test-token");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_retries_on_429_then_succeeds() {
        let transport = MockTransport::new();
        transport.push(429, "rate limited");
        transport.push(200, &created_operation());
        transport.push(200, &done_operation("[]"));

        let violations = client(transport.clone()).scan(b"{}").await.unwrap();
        assert!(violations.is_empty());

        // Exactly two submit POSTs, then one poll GET.
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[2].method, Method::Get);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_refetches_until_done() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(200, r#"{"name": "operations/op-1", "done": false}"#);
        transport.push(200, &done_operation("[]"));

        client(transport.clone()).scan(b"{}").await.unwrap();

        let gets: Vec<_> = transport
            .requests()
            .into_iter()
            .filter(|r| r.method == Method::Get)
            .collect();
        assert_eq!(gets.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_non_retryable_fails_immediately() {
        let transport = MockTransport::new();
        transport.push(403, "permission denied on organization");

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert_eq!(err.status_code, 403);
        assert!(err.message.starts_with("Failed to scan file due to following error: "));
        assert!(err.message.contains("permission denied on organization"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_plan_rejected_locally() {
        let transport = MockTransport::new();
        let plan = vec![b'x'; MAX_PLAN_BYTES];

        let err = client(transport.clone()).scan(&plan).await.unwrap_err();
        assert_eq!(err.status_code, 400);
        assert!(err.message.contains("maximum supported size"));
        // Never sent to the remote service.
        assert!(transport.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded_during_submit() {
        let transport = MockTransport::new().with_fallback(429, "rate limited");

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert_eq!(err.status_code, 500);
        assert_eq!(
            err.message,
            "Failed to scan file due to following error: Operation timed out"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_request_issued_after_deadline() {
        let transport = MockTransport::new().with_fallback(429, "rate limited");

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert!(err.message.contains("Operation timed out"));

        // Backoff sleeps run 1+2+4+8+16+32s, so the 6th sleep crosses the
        // 60s deadline; the attempt that would land at 63s is never sent.
        assert_eq!(transport.requests().len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded_during_poll() {
        let transport = MockTransport::new()
            .with_fallback(200, r#"{"name": "operations/op-1", "done": false}"#);
        transport.push(200, &created_operation());

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert_eq!(err.status_code, 500);
        assert!(err.message.contains("Operation timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_error_propagates_code_and_message() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(
            200,
            r#"{"name": "operations/op-1", "done": true,
                "error": {"code": 403, "message": "organization not onboarded"}}"#,
        );

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert_eq!(err.status_code, 403);
        assert!(err.message.contains("organization not onboarded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_without_response_is_internal_error() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(200, r#"{"name": "operations/op-1", "done": true}"#);

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert_eq!(err.status_code, 500);
        assert!(err.message.contains("Polling Validation Service Endpoint Timed Out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_without_report_is_invalid() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(200, r#"{"name": "operations/op-1", "done": true, "response": {}}"#);

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert_eq!(err.status_code, 500);
        assert!(err.message.contains("invalid validationReport"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_asset_id_rejected() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(
            200,
            &done_operation(r#"[{"assetId": "", "policyId": "p1", "severity": "HIGH"}]"#),
        );

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert_eq!(err.status_code, 500);
        assert!(err.message.contains("assetId"));
        assert!(!err.message.contains("policyId"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_both_fields_named() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(200, &done_operation(r#"[{"severity": "LOW"}]"#));

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert!(err.message.contains("assetId, policyId"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_severity_normalized_to_unspecified() {
        let transport = MockTransport::new();
        transport.push(200, &created_operation());
        transport.push(200, &done_operation(r#"[{"assetId": "a1", "policyId": "p1"}]"#));

        let violations = client(transport.clone()).scan(b"{}").await.unwrap();
        assert_eq!(violations[0].severity, Severity::Unspecified);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_operation_body() {
        let transport = MockTransport::new();
        transport.push(200, "not json");

        let err = client(transport.clone()).scan(b"{}").await.unwrap_err();
        assert_eq!(err.status_code, 500);
        assert!(err.message.contains("failed to decode operation response"));
    }

    #[test]
    fn test_retryable_statuses() {
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(is_retryable(status), "{status} should be retryable");
        }
        for status in [400, 401, 403, 404, 501] {
            assert!(!is_retryable(status), "{status} should not be retryable");
        }
    }
}
