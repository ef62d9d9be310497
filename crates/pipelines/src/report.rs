//! Topic reports: Drive context plus, when online, a web-research pass.

use anyhow::Result;
use providers::connectivity::Connectivity;
use shared::jobs::ProgressSender;

use crate::adapters::{FileSearch, TextGenerator};
use crate::prompts;

pub async fn compose_report(
    topic: &str,
    gate: &dyn Connectivity,
    drive: &dyn FileSearch,
    ai: &dyn TextGenerator,
    page_size: u32,
    progress: &ProgressSender,
) -> Result<String> {
    progress.report(10, "Starting research...");

    let report = if !gate.is_online().await {
        progress.report(20, "Offline mode: using local data only...");
        let files = drive.search(topic, page_size).await?;
        let files_json = serde_json::to_string_pretty(&files)?;

        progress.report(50, "Generating report...");
        ai.generate(
            &prompts::offline_report_prompt(topic, &files_json),
            prompts::DEFAULT_SYSTEM_PROMPT,
        )
        .await
    } else {
        progress.report(20, "Searching the web...");
        let web_info = ai
            .generate(
                &prompts::web_research_prompt(topic),
                prompts::WEB_RESEARCH_SYSTEM_PROMPT,
            )
            .await;

        progress.report(40, "Collecting Drive context...");
        let files = drive.search(topic, page_size).await?;
        let files_json = serde_json::to_string_pretty(&files)?;

        progress.report(60, "Generating report...");
        ai.generate(
            &prompts::online_report_prompt(topic, &web_info, &files_json),
            prompts::DEFAULT_SYSTEM_PROMPT,
        )
        .await
    };

    progress.report(100, "Done");
    Ok(format!("### Report on \"{}\"\n\n{}", topic, report))
}
