//! Application state: input, progress display, result pane, and the job
//! slot. All mutation happens on the UI thread; worker threads only talk
//! back through the runner's channel.

use pipelines::{AssistantContext, JobRunner};
use providers::oauth_helper::GoogleOAuthFlow;
use services::auth::GoogleAuth;
use shared::jobs::{JobUpdate, RunnerError};
use shared::settings::AssistantSettings;

pub struct AppState {
    pub settings: AssistantSettings,
    pub input_text: String,
    pub progress_percent: u8,
    pub status_text: String,
    pub result_text: String,
    /// Input-validation hint shown next to the progress bar.
    pub notice: Option<String>,
    pub google_connected: bool,
    pub runner: JobRunner,
}

impl AppState {
    pub fn new(settings: AssistantSettings) -> Self {
        let google_connected = GoogleAuth::new(settings.google.clone())
            .map(|auth| auth.is_connected())
            .unwrap_or(false);
        Self {
            settings,
            input_text: String::new(),
            progress_percent: 0,
            status_text: "Idle".to_string(),
            result_text: String::new(),
            notice: None,
            google_connected,
            runner: JobRunner::new(),
        }
    }

    /// Apply pending job updates; called once per frame.
    pub fn poll_jobs(&mut self) {
        for update in self.runner.poll() {
            match update {
                JobUpdate::Progress { percent, label } => {
                    self.progress_percent = percent;
                    self.status_text = label;
                }
                JobUpdate::Finished(outcome) => {
                    self.result_text = outcome.display_text().to_string();
                    // A connect job may have changed this; cheap to recheck.
                    self.google_connected = GoogleAuth::new(self.settings.google.clone())
                        .map(|auth| auth.is_connected())
                        .unwrap_or(false);
                }
            }
        }
    }

    pub fn start_drive_search(&mut self) {
        let Some(query) = self.require_input("Enter a search query first.") else {
            return;
        };
        let settings = self.settings.clone();
        let spawned = self.runner.spawn("drive-search", move |progress| async move {
            let ctx = AssistantContext::connect(settings).await?;
            ctx.run_drive_search(&query, &progress).await
        });
        self.after_spawn(spawned);
    }

    pub fn start_mail_triage(&mut self) {
        let settings = self.settings.clone();
        let spawned = self.runner.spawn("mail-triage", move |progress| async move {
            let ctx = AssistantContext::connect(settings).await?;
            ctx.run_mail_triage(&progress).await
        });
        self.after_spawn(spawned);
    }

    pub fn start_task_capture(&mut self) {
        let Some(content) = self.require_input("Enter text to extract tasks from first.") else {
            return;
        };
        let settings = self.settings.clone();
        let spawned = self.runner.spawn("task-capture", move |progress| async move {
            let ctx = AssistantContext::connect(settings).await?;
            ctx.run_task_capture(&content, &progress).await
        });
        self.after_spawn(spawned);
    }

    pub fn start_report(&mut self) {
        let Some(topic) = self.require_input("Enter a report topic first.") else {
            return;
        };
        let settings = self.settings.clone();
        let spawned = self.runner.spawn("report", move |progress| async move {
            let ctx = AssistantContext::connect(settings).await?;
            ctx.run_report(&topic, &progress).await
        });
        self.after_spawn(spawned);
    }

    pub fn start_connect_google(&mut self) {
        let google = self.settings.google.clone();
        let spawned = self.runner.spawn("connect-google", move |progress| async move {
            progress.report(10, "Waiting for browser authorization...");
            let flow = GoogleOAuthFlow::new(&google)?;
            let creds = flow.authenticate().await?;
            progress.report(80, "Saving credentials...");
            GoogleAuth::new(google)?.store(&creds)?;
            Ok("Google account connected.".to_string())
        });
        self.after_spawn(spawned);
    }

    fn require_input(&mut self, hint: &str) -> Option<String> {
        let trimmed = self.input_text.trim();
        if trimmed.is_empty() {
            self.notice = Some(hint.to_string());
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn after_spawn(&mut self, spawned: Result<(), RunnerError>) {
        match spawned {
            Ok(()) => {
                self.notice = None;
                self.progress_percent = 0;
                self.status_text = "Starting...".to_string();
            }
            Err(RunnerError::Busy) => {
                self.notice = Some("A job is already running.".to_string());
            }
            Err(e) => {
                tracing::error!("could not start job: {}", e);
                self.notice = Some(format!("Could not start job: {}", e));
            }
        }
    }
}
