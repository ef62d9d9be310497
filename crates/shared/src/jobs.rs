//! Progress and result messages exchanged between a job's worker thread and
//! the UI event loop.
//!
//! The worker never touches UI state directly: it sends [`JobUpdate`]s over an
//! mpsc channel and the UI applies them from its own update loop.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// One message from a running job.
#[derive(Debug, Clone)]
pub enum JobUpdate {
    /// Progress bar + status label update. `percent` is 0..=100 and
    /// non-decreasing within one job.
    Progress { percent: u8, label: String },
    /// Terminal message; sent exactly once per job, after the final
    /// progress update.
    Finished(JobOutcome),
}

/// Terminal result of a job. Failures flow through the same display path as
/// successes; only the text differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success(String),
    Failure(String),
}

impl JobOutcome {
    pub fn display_text(&self) -> &str {
        match self {
            JobOutcome::Success(text) | JobOutcome::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::Failure(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("a job is already running")]
    Busy,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Progress reporter handed to pipelines.
///
/// Reported percentages are clamped to the high-water mark so the stream the
/// UI observes is monotonically non-decreasing even if a pipeline reports out
/// of order. Clones share the same high-water mark.
#[derive(Clone)]
pub struct ProgressSender {
    tx: Sender<JobUpdate>,
    high_water: Arc<AtomicU8>,
}

impl ProgressSender {
    pub fn new(tx: Sender<JobUpdate>) -> Self {
        Self {
            tx,
            high_water: Arc::new(AtomicU8::new(0)),
        }
    }

    /// Report a progress milestone. A send to a dropped receiver is ignored:
    /// the job keeps running even if the UI went away.
    pub fn report(&self, percent: u8, label: impl Into<String>) {
        let percent = percent.min(100);
        let previous = self.high_water.fetch_max(percent, Ordering::Relaxed);
        let shown = previous.max(percent);
        let label = label.into();
        tracing::debug!(percent = shown, %label, "job progress");
        let _ = self.tx.send(JobUpdate::Progress {
            percent: shown,
            label,
        });
    }

    /// Highest percentage reported so far.
    pub fn high_water(&self) -> u8 {
        self.high_water.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn collect_percents(rx: &std::sync::mpsc::Receiver<JobUpdate>) -> Vec<u8> {
        rx.try_iter()
            .filter_map(|u| match u {
                JobUpdate::Progress { percent, .. } => Some(percent),
                JobUpdate::Finished(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (tx, rx) = channel();
        let progress = ProgressSender::new(tx);
        progress.report(10, "start");
        progress.report(50, "middle");
        progress.report(30, "out of order");
        progress.report(100, "done");

        assert_eq!(collect_percents(&rx), vec![10, 50, 50, 100]);
    }

    #[test]
    fn test_progress_caps_at_100() {
        let (tx, rx) = channel();
        let progress = ProgressSender::new(tx);
        progress.report(250, "over");
        assert_eq!(collect_percents(&rx), vec![100]);
        assert_eq!(progress.high_water(), 100);
    }

    #[test]
    fn test_clones_share_high_water() {
        let (tx, rx) = channel();
        let progress = ProgressSender::new(tx);
        let clone = progress.clone();
        progress.report(60, "a");
        clone.report(20, "b");
        assert_eq!(collect_percents(&rx), vec![60, 60]);
    }

    #[test]
    fn test_report_survives_dropped_receiver() {
        let (tx, rx) = channel();
        let progress = ProgressSender::new(tx);
        drop(rx);
        progress.report(10, "nobody listening");
    }

    #[test]
    fn test_outcome_display_text() {
        assert_eq!(
            JobOutcome::Success("ok".into()).display_text(),
            "ok"
        );
        let failure = JobOutcome::Failure("An error occurred: boom".into());
        assert!(failure.is_failure());
        assert_eq!(failure.display_text(), "An error occurred: boom");
    }
}
