//! Wire types for the external code-execution service, plus result
//! classification.
//!
//! The service runs submitted code against a question's test cases and
//! reports, per case, whether the output matched and what the program
//! actually printed. Field names follow the service's JSON contract.

use serde::{Deserialize, Serialize};

use crate::SubmissionStatus;

/// Output markers that identify an interpreter error in a test run.
///
/// Any of these appearing anywhere in a test case's actual output marks the
/// whole attempt as a syntax error, regardless of other results.
pub const INTERPRETER_ERROR_MARKERS: &[&str] =
    &["SyntaxError", "NameError", "TypeError", "IndentationError"];

/// A test case as sent to the execution service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestCasePayload {
    /// Input fed to the program on stdin.
    pub input: String,
    /// Output the program must produce to pass.
    #[serde(rename = "expectedOutput")]
    pub expected_output: String,
}

/// Request body for a grading run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompilerRequest {
    /// Source code to execute.
    pub code: String,
    /// Ordered test cases to run the code against.
    #[serde(rename = "testCases")]
    pub test_cases: Vec<TestCasePayload>,
    /// Opaque correlation id echoed back in service logs.
    #[serde(rename = "submissionid")]
    pub submission_id: String,
}

/// Per-test-case outcome reported by the execution service.
#[derive(Clone, Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TestResult {
    /// Whether the program's output matched the expected output.
    pub passed: bool,
    /// What the program actually printed (stdout, or the error text).
    #[serde(rename = "actualOutput", default)]
    pub actual_output: Option<String>,
}

/// Response body from the execution service.
///
/// A response without `results` signals a service-side failure and must not
/// be treated as a graded attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompilerResponse {
    #[serde(default)]
    pub results: Option<Vec<TestResult>>,
}

/// Number of passed test cases in a result set.
pub fn passed_count(results: &[TestResult]) -> usize {
    results.iter().filter(|r| r.passed).count()
}

/// Whether any test run printed an interpreter-error marker.
pub fn has_interpreter_error(results: &[TestResult]) -> bool {
    results.iter().any(|r| {
        let output = r.actual_output.as_deref().unwrap_or("");
        INTERPRETER_ERROR_MARKERS
            .iter()
            .any(|marker| output.contains(marker))
    })
}

/// Classify a graded attempt from its per-case results.
///
/// An interpreter error takes precedence over every other outcome; otherwise
/// the attempt is accepted exactly when all `total` cases passed.
pub fn classify(results: &[TestResult], total: usize) -> SubmissionStatus {
    if has_interpreter_error(results) {
        SubmissionStatus::SyntaxError
    } else if passed_count(results) == total {
        SubmissionStatus::Accepted
    } else {
        SubmissionStatus::WrongSubmission
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(passed: bool, output: &str) -> TestResult {
        TestResult {
            passed,
            actual_output: Some(output.to_string()),
        }
    }

    #[test]
    fn test_classify_all_passed() {
        let results = vec![result(true, "42"), result(true, "7")];
        assert_eq!(classify(&results, 2), SubmissionStatus::Accepted);
    }

    #[test]
    fn test_classify_partial_pass() {
        let results = vec![result(true, "42"), result(false, "41")];
        assert_eq!(classify(&results, 2), SubmissionStatus::WrongSubmission);
    }

    #[test]
    fn test_syntax_error_takes_precedence() {
        // Even with every case marked passed, an error marker wins.
        let results = vec![
            result(true, "42"),
            result(true, "NameError: name 'x' is not defined"),
        ];
        assert_eq!(classify(&results, 2), SubmissionStatus::SyntaxError);
    }

    #[test]
    fn test_marker_matches_as_substring() {
        let results = vec![result(
            false,
            "Traceback (most recent call last):\n  File \"<stdin>\", line 1\nIndentationError: unexpected indent",
        )];
        assert!(has_interpreter_error(&results));
    }

    #[test]
    fn test_missing_output_is_not_an_error() {
        let results = vec![TestResult {
            passed: false,
            actual_output: None,
        }];
        assert!(!has_interpreter_error(&results));
        assert_eq!(classify(&results, 1), SubmissionStatus::WrongSubmission);
    }

    #[test]
    fn test_response_without_results_deserializes() {
        let response: CompilerResponse = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
        assert!(response.results.is_none());
    }

    #[test]
    fn test_request_wire_casing() {
        let request = CompilerRequest {
            code: "print(1)".into(),
            test_cases: vec![TestCasePayload {
                input: "".into(),
                expected_output: "1".into(),
            }],
            submission_id: "17".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("testCases").is_some());
        assert!(json.get("submissionid").is_some());
        assert!(json["testCases"][0].get("expectedOutput").is_some());
    }
}
