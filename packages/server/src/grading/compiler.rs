//! Client for the external code-execution service.
//!
//! The service is a black box: it takes code plus test cases and returns a
//! per-case pass/fail with the actual output. Anything short of a well-formed
//! result set (transport error, timeout, non-2xx status, a body missing
//! `results`, or a result count that disagrees with the test-case count) is
//! a [`CompilerError`], and the caller must not treat the attempt as graded.

use std::time::Duration;

use async_trait::async_trait;
use common::compiler::{CompilerRequest, CompilerResponse, TestCasePayload, TestResult};
use thiserror::Error;

use crate::config::CompilerConfig;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("compiler service unreachable: {0}")]
    Unreachable(String),
    #[error("compiler service returned HTTP {0}")]
    Status(u16),
    #[error("compiler service response is malformed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait CompilerService: Send + Sync {
    /// Run `code` against the test cases, returning one result per case in
    /// order. `submission_id` is an opaque correlation id.
    async fn run(
        &self,
        code: &str,
        test_cases: &[TestCasePayload],
        submission_id: &str,
    ) -> Result<Vec<TestResult>, CompilerError>;
}

pub struct HttpCompiler {
    client: reqwest::Client,
    submit_url: String,
}

impl HttpCompiler {
    pub fn new(config: &CompilerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            submit_url: format!("{}/submit-python", config.url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl CompilerService for HttpCompiler {
    async fn run(
        &self,
        code: &str,
        test_cases: &[TestCasePayload],
        submission_id: &str,
    ) -> Result<Vec<TestResult>, CompilerError> {
        let request = CompilerRequest {
            code: code.to_string(),
            test_cases: test_cases.to_vec(),
            submission_id: submission_id.to_string(),
        };

        let response = self
            .client
            .post(&self.submit_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompilerError::Unreachable("request timed out".into())
                } else {
                    CompilerError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompilerError::Status(status.as_u16()));
        }

        let body: CompilerResponse = response
            .json()
            .await
            .map_err(|e| CompilerError::Malformed(e.to_string()))?;

        let results = body
            .results
            .ok_or_else(|| CompilerError::Malformed("missing results field".into()))?;

        if results.len() != test_cases.len() {
            return Err(CompilerError::Malformed(format!(
                "expected {} results, got {}",
                test_cases.len(),
                results.len()
            )));
        }

        Ok(results)
    }
}
