//! Per-job wiring: resolve the Google token, build the clients and the
//! generation router, run a workflow.
//!
//! Built fresh on each worker thread, like every other per-job resource —
//! nothing here outlives the job.

use anyhow::Result;
use providers::connectivity::HttpProbe;
use providers::router::GenerationRouter;
use services::auth::GoogleAuth;
use services::drive::DriveClient;
use services::gmail::GmailClient;
use services::gtasks::TasksClient;
use shared::jobs::ProgressSender;
use shared::settings::AssistantSettings;

use crate::{drive_search, mail, report, tasks};

pub struct AssistantContext {
    settings: AssistantSettings,
    gate: HttpProbe,
    router: GenerationRouter,
    drive: DriveClient,
    gmail: GmailClient,
    tasks: TasksClient,
}

impl AssistantContext {
    pub async fn connect(settings: AssistantSettings) -> Result<Self> {
        let auth = GoogleAuth::new(settings.google.clone())?;
        let token = auth.access_token().await?;

        Ok(Self {
            gate: HttpProbe::new(settings.probe_url.as_str()),
            router: GenerationRouter::from_settings(&settings.probe_url, &settings.model),
            drive: DriveClient::new(token.clone()),
            gmail: GmailClient::new(token.clone()),
            tasks: TasksClient::new(token),
            settings,
        })
    }

    pub async fn run_drive_search(&self, query: &str, progress: &ProgressSender) -> Result<String> {
        drive_search::search_and_suggest(
            query,
            &self.drive,
            &self.router,
            self.settings.drive_page_size,
            progress,
        )
        .await
    }

    pub async fn run_mail_triage(&self, progress: &ProgressSender) -> Result<String> {
        mail::triage_unread_mail(
            &self.gmail,
            &self.router,
            self.settings.unread_mail_limit,
            progress,
        )
        .await
    }

    pub async fn run_task_capture(&self, content: &str, progress: &ProgressSender) -> Result<String> {
        tasks::capture_tasks(content, &self.tasks, &self.router, progress).await
    }

    pub async fn run_report(&self, topic: &str, progress: &ProgressSender) -> Result<String> {
        report::compose_report(
            topic,
            &self.gate,
            &self.drive,
            &self.router,
            self.settings.drive_page_size,
            progress,
        )
        .await
    }
}
