//! Run orchestrator - sequential upload loop with pacing

use std::time::Duration;

use crate::client::UploadOperation;
use crate::collector::{CollectionResult, UploadTarget};
use crate::uploader::{upload_with_retry, RetryPolicy, UploadOutcome};

/// Final counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub uploaded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn total_seen(&self) -> usize {
        self.uploaded + self.failed + self.skipped
    }
}

/// Upload every collected target in order, strictly sequentially.
///
/// The pacing delay is slept between files (never after the last one)
/// regardless of the previous file's outcome; the appliance may throttle on
/// submission rate. Outcomes are handed to `on_outcome` as they finalize,
/// with the 1-based position of the file; only counters are retained.
pub async fn run<F>(
    collection: &CollectionResult,
    operation: &UploadOperation<'_>,
    policy: &RetryPolicy,
    pacing: Duration,
    mut on_outcome: F,
) -> RunSummary
where
    F: FnMut(usize, &UploadTarget, &UploadOutcome),
{
    let mut summary = RunSummary {
        skipped: collection.excluded,
        ..Default::default()
    };

    let total = collection.targets.len();

    for (idx, target) in collection.targets.iter().enumerate() {
        let outcome = upload_with_retry(operation, &target.path, policy).await;

        if outcome.is_success() {
            summary.uploaded += 1;
        } else {
            summary.failed += 1;
        }

        on_outcome(idx + 1, target, &outcome);

        if idx + 1 < total {
            tokio::time::sleep(pacing).await;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_total() {
        let summary = RunSummary {
            uploaded: 2,
            failed: 1,
            skipped: 3,
        };
        assert_eq!(summary.total_seen(), 6);
        assert_eq!(RunSummary::default().total_seen(), 0);
    }
}
