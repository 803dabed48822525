//! Responses from a worker's HTTP endpoints.

use serde::{Deserialize, Serialize};

/// Status carried by the synthetic no-session failure.
pub const TIMEOUT_FAILURE_STATUS: u16 = 504;

/// Body carried by the synthetic no-session failure.
pub const TIMEOUT_FAILURE_BODY: &str = "Test failed due to timeout.";

/// What a worker endpoint answered: an HTTP status and the raw body.
///
/// The hub passes responses through verbatim; the body is never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub status: u16,
    pub body: String,
}

impl WorkerResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The synthetic failure returned when a command reaches a proxy with no
    /// active lease. Distinguishable from a transport error: callers see a
    /// well-formed response with a timeout label instead of an `Err`.
    pub fn timeout_failure() -> Self {
        Self::new(TIMEOUT_FAILURE_STATUS, TIMEOUT_FAILURE_BODY)
    }

    /// True if this is the synthetic no-session failure.
    pub fn is_timeout_failure(&self) -> bool {
        self.status == TIMEOUT_FAILURE_STATUS && self.body == TIMEOUT_FAILURE_BODY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_2xx_only() {
        assert!(WorkerResponse::new(200, "").is_success());
        assert!(WorkerResponse::new(204, "").is_success());
        assert!(!WorkerResponse::new(302, "").is_success());
        assert!(!WorkerResponse::new(404, "").is_success());
        assert!(!WorkerResponse::new(500, "").is_success());
    }

    #[test]
    fn timeout_failure_is_labeled_and_unsuccessful() {
        let failure = WorkerResponse::timeout_failure();
        assert!(failure.is_timeout_failure());
        assert!(!failure.is_success());
        assert_eq!(failure.body, TIMEOUT_FAILURE_BODY);
    }

    #[test]
    fn ordinary_responses_are_not_timeout_failures() {
        assert!(!WorkerResponse::new(504, "upstream timeout").is_timeout_failure());
        assert!(!WorkerResponse::new(200, TIMEOUT_FAILURE_BODY).is_timeout_failure());
    }
}
