//! The job runner: one short-lived worker thread per action, progress and
//! the final result marshaled back to the UI thread over a channel.
//!
//! The UI never blocks on a job; it drains [`JobRunner::poll`] from its own
//! event loop and re-enables its controls when `is_running()` flips false.

use anyhow::Result;
use shared::jobs::{JobOutcome, JobUpdate, ProgressSender, RunnerError};
use std::future::Future;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use uuid::Uuid;

#[derive(Default)]
pub struct JobRunner {
    active: Option<Receiver<JobUpdate>>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Start a job on a fresh worker thread.
    ///
    /// Refuses while another job is in flight: the UI disables its controls
    /// during a run, and this is the backstop for anything that bypasses
    /// them. Exactly one `Finished` is delivered per job on every exit path,
    /// and the progress stream is forced to 100 before it.
    pub fn spawn<F, Fut>(&mut self, label: &str, job: F) -> Result<(), RunnerError>
    where
        F: FnOnce(ProgressSender) -> Fut + Send + 'static,
        Fut: Future<Output = Result<String>>,
    {
        if self.active.is_some() {
            return Err(RunnerError::Busy);
        }

        let job_id = Uuid::new_v4();
        let (tx, rx) = channel::<JobUpdate>();
        let progress = ProgressSender::new(tx.clone());
        let label = label.to_string();

        thread::Builder::new()
            .name(format!("job-{}", label))
            .spawn(move || {
                let span = tracing::info_span!("job", %job_id, %label);
                let _guard = span.enter();
                tracing::info!("job started");

                let outcome = match tokio::runtime::Runtime::new() {
                    Ok(rt) => match rt.block_on(job(progress.clone())) {
                        Ok(text) => {
                            progress.report(100, "Done");
                            tracing::info!("job completed");
                            JobOutcome::Success(text)
                        }
                        Err(e) => {
                            tracing::warn!("job failed: {:#}", e);
                            progress.report(100, "An error occurred");
                            JobOutcome::Failure(format!("An error occurred: {:#}", e))
                        }
                    },
                    Err(e) => {
                        progress.report(100, "An error occurred");
                        JobOutcome::Failure(format!(
                            "An error occurred: failed to start async runtime: {}",
                            e
                        ))
                    }
                };

                // Receiver may be gone if the UI shut down; nothing to do then.
                let _ = tx.send(JobUpdate::Finished(outcome));
            })?;

        self.active = Some(rx);
        Ok(())
    }

    /// Drain pending updates without blocking; called from the UI loop.
    ///
    /// A `Finished` — or a worker that died without delivering one —
    /// releases the job slot, so the controls always come back.
    pub fn poll(&mut self) -> Vec<JobUpdate> {
        let Some(rx) = &self.active else {
            return Vec::new();
        };

        let mut updates = Vec::new();
        let mut release = false;
        loop {
            match rx.try_recv() {
                Ok(update) => {
                    let finished = matches!(update, JobUpdate::Finished(_));
                    updates.push(update);
                    if finished {
                        release = true;
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    updates.push(JobUpdate::Finished(JobOutcome::Failure(
                        "An error occurred: the job ended unexpectedly".to_string(),
                    )));
                    release = true;
                    break;
                }
            }
        }

        if release {
            self.active = None;
        }
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::time::{Duration, Instant};

    /// Poll the runner like a UI loop would until the job reports Finished.
    fn drain_until_finished(runner: &mut JobRunner) -> (Vec<u8>, JobOutcome) {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut percents = Vec::new();
        loop {
            for update in runner.poll() {
                match update {
                    JobUpdate::Progress { percent, .. } => percents.push(percent),
                    JobUpdate::Finished(outcome) => return (percents, outcome),
                }
            }
            assert!(Instant::now() < deadline, "job did not finish in time");
            thread::sleep(Duration::from_millis(10));
        }
    }

    fn assert_monotonic_to_100(percents: &[u8]) {
        assert!(
            percents.windows(2).all(|w| w[0] <= w[1]),
            "progress went backwards: {:?}",
            percents
        );
        assert_eq!(percents.last().copied(), Some(100));
    }

    #[test]
    fn test_successful_job_reports_progress_and_result() {
        let mut runner = JobRunner::new();
        runner
            .spawn("ok-job", |progress| async move {
                progress.report(10, "starting");
                progress.report(60, "working");
                Ok("the result".to_string())
            })
            .unwrap();
        assert!(runner.is_running());

        let (percents, outcome) = drain_until_finished(&mut runner);
        assert_monotonic_to_100(&percents);
        assert_eq!(outcome, JobOutcome::Success("the result".to_string()));
        assert!(!runner.is_running());
    }

    #[test]
    fn test_failed_job_forces_100_and_reenables() {
        let mut runner = JobRunner::new();
        runner
            .spawn("bad-job", |progress| async move {
                progress.report(30, "about to break");
                Err(anyhow!("boom"))
            })
            .unwrap();

        let (percents, outcome) = drain_until_finished(&mut runner);
        assert_monotonic_to_100(&percents);
        assert!(outcome.is_failure());
        assert!(outcome.display_text().starts_with("An error occurred:"));
        assert!(outcome.display_text().contains("boom"));
        assert!(!runner.is_running());
    }

    #[test]
    fn test_second_spawn_is_refused_while_running() {
        let mut runner = JobRunner::new();
        runner
            .spawn("slow-job", |_progress| async move {
                tokio::time::sleep(Duration::from_millis(300)).await;
                Ok("done".to_string())
            })
            .unwrap();

        let refused = runner.spawn("eager-job", |_progress| async move {
            Ok("never runs".to_string())
        });
        assert!(matches!(refused, Err(RunnerError::Busy)));

        // The first job still completes normally.
        let (_, outcome) = drain_until_finished(&mut runner);
        assert_eq!(outcome, JobOutcome::Success("done".to_string()));

        // And the slot is free again.
        runner
            .spawn("next-job", |_progress| async move { Ok("ran".to_string()) })
            .unwrap();
        let (_, outcome) = drain_until_finished(&mut runner);
        assert_eq!(outcome, JobOutcome::Success("ran".to_string()));
    }

    #[test]
    fn test_dead_worker_releases_the_slot() {
        let mut runner = JobRunner::new();
        runner
            .spawn("panicking-job", |progress| async move {
                progress.report(20, "doomed");
                if progress.high_water() > 0 {
                    panic!("worker died");
                }
                Ok(String::new())
            })
            .unwrap();

        let (_, outcome) = drain_until_finished(&mut runner);
        assert!(outcome.is_failure());
        assert!(outcome.display_text().contains("ended unexpectedly"));
        assert!(!runner.is_running());
    }

    #[test]
    fn test_empty_results_scenario_end_to_end() {
        // Pipeline-style job: empty adapter results short-circuit to a
        // literal message without a model call.
        let mut runner = JobRunner::new();
        runner
            .spawn("search-job", |progress| async move {
                progress.report(10, "Connecting to Google Drive...");
                let results: Vec<String> = Vec::new();
                if results.is_empty() {
                    progress.report(100, "Done");
                    return Ok(crate::drive_search::NO_RESULTS_MESSAGE.to_string());
                }
                Ok("unreachable".to_string())
            })
            .unwrap();

        let (percents, outcome) = drain_until_finished(&mut runner);
        assert_monotonic_to_100(&percents);
        assert_eq!(
            outcome.display_text(),
            crate::drive_search::NO_RESULTS_MESSAGE
        );
    }
}
