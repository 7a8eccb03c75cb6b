//! Retrying uploader - per-file attempt loop with linear backoff

use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::client::{TransportError, UploadOperation};

/// Bounded retry policy. The wait before attempt k+1 is `base_delay * k`,
/// linear in the number of attempts already made.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn backoff(&self, attempts_made: u32) -> Duration {
        self.base_delay * attempts_made
    }
}

/// Terminal outcome for one file. Exactly one is produced per target and it
/// is never revisited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { status: u16, sha1: Option<String> },
    Failed { reason: String, status: Option<u16> },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Uploaded { .. })
    }
}

/// Upload one file through the bound operation, retrying transient failures.
///
/// Retryable: HTTP 429, HTTP >= 500 (as a response or embedded in a
/// transport error), timeouts, and connection errors. Any other 4xx and any
/// error without an embedded status are terminal on the first occurrence.
pub async fn upload_with_retry(
    operation: &UploadOperation<'_>,
    path: &Path,
    policy: &RetryPolicy,
) -> UploadOutcome {
    let mut last_err = String::from("unknown error");
    let mut last_status = None;

    for attempt in 1..=policy.max_attempts {
        match operation.invoke(path).await {
            Ok(response) => {
                let code = response.status;

                if (200..300).contains(&code) {
                    return UploadOutcome::Uploaded {
                        status: code,
                        sha1: response.sha1,
                    };
                }

                if code == 429 || code >= 500 {
                    last_err = format!("HTTP {}", code);
                    last_status = Some(code);
                } else {
                    // 4xx (not 429): client error, retrying cannot help
                    return UploadOutcome::Failed {
                        reason: format!("HTTP {}", code),
                        status: Some(code),
                    };
                }
            }
            Err(TransportError::Timeout) => {
                last_err = "timeout".to_string();
                last_status = None;
            }
            Err(TransportError::Connection(msg)) => {
                last_err = format!("connection error: {}", msg);
                last_status = None;
            }
            Err(TransportError::UpstreamStatus { status, via }) => {
                // Status arrived wrapped in a transport error; same policy
                // as a bare status
                if status == 429 || status >= 500 {
                    last_err = format!("HTTP {} (via {})", status, via);
                    last_status = Some(status);
                } else {
                    return UploadOutcome::Failed {
                        reason: format!("HTTP {}", status),
                        status: Some(status),
                    };
                }
            }
            Err(TransportError::Unknown(msg)) => {
                // No recognizable status at all: do not retry
                return UploadOutcome::Failed {
                    reason: msg,
                    status: None,
                };
            }
        }

        if attempt < policy.max_attempts {
            let wait = policy.backoff(attempt);
            warn!(
                "Attempt {}/{}: {}, retrying in {:.0}s...",
                attempt,
                policy.max_attempts,
                last_err,
                wait.as_secs_f64()
            );
            tokio::time::sleep(wait).await;
        }
    }

    UploadOutcome::Failed {
        reason: format!("{} after {} attempts", last_err, policy.max_attempts),
        status: last_status,
    }
}
