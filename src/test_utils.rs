#[cfg(test)]
pub mod fixtures {
    use crate::error::ScanError;
    use crate::scan::transport::{
        BearerToken, HttpRequest, HttpResponse, HttpTransport,
    };
    use crate::scan::types::{ScanReport, ScanVerdict, Severity, Violation};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    pub fn violation(asset_id: &str, policy_id: &str, severity: Severity) -> Violation {
        Violation {
            asset_id: asset_id.to_string(),
            policy_id: policy_id.to_string(),
            severity,
            violated_policy: None,
            violated_posture: None,
            violated_asset: None,
            next_steps: None,
        }
    }

    pub fn report(verdict: ScanVerdict, violations: Vec<Violation>) -> ScanReport {
        let mut report = ScanReport::new("./plan.json", verdict, violations);
        report.version = "0.1.0".to_string();
        report.scanned_at = "2026-08-27T12:00:00+00:00".to_string();
        report
    }

    pub fn token() -> BearerToken {
        BearerToken::new("test-token")
    }

    #[derive(Default)]
    struct MockState {
        responses: VecDeque<HttpResponse>,
        fallback: Option<HttpResponse>,
        requests: Vec<HttpRequest>,
    }

    /// Scripted transport: returns queued responses in order, then the
    /// fallback (if any), and records every request it sees.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        state: Arc<Mutex<MockState>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, status: u16, body: &str) {
            self.state
                .lock()
                .unwrap()
                .responses
                .push_back(HttpResponse {
                    status,
                    body: body.to_string(),
                });
        }

        pub fn with_fallback(self, status: u16, body: &str) -> Self {
            self.state.lock().unwrap().fallback = Some(HttpResponse {
                status,
                body: body.to_string(),
            });
            self
        }

        pub fn requests(&self) -> Vec<HttpRequest> {
            self.state.lock().unwrap().requests.clone()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn request(&self, request: HttpRequest) -> Result<HttpResponse, ScanError> {
            let mut state = self.state.lock().unwrap();
            state.requests.push(request);
            if let Some(response) = state.responses.pop_front() {
                return Ok(response);
            }
            match &state.fallback {
                Some(response) => Ok(response.clone()),
                None => Err(ScanError::internal("mock transport exhausted")),
            }
        }
    }
}
