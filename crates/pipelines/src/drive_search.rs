//! Drive search with AI suggestions.

use anyhow::Result;
use shared::jobs::ProgressSender;

use crate::adapters::{FileSearch, TextGenerator};
use crate::prompts;

pub const NO_RESULTS_MESSAGE: &str = "No matching files found. Try a different keyword.";

pub async fn search_and_suggest(
    query: &str,
    drive: &dyn FileSearch,
    ai: &dyn TextGenerator,
    page_size: u32,
    progress: &ProgressSender,
) -> Result<String> {
    progress.report(10, "Connecting to Google Drive...");
    progress.report(30, "Searching files...");
    let files = drive.search(query, page_size).await?;

    // Nothing to suggest about: skip the model call entirely.
    if files.is_empty() {
        progress.report(100, "Done");
        return Ok(NO_RESULTS_MESSAGE.to_string());
    }

    progress.report(60, "Analyzing search results...");
    let files_json = serde_json::to_string_pretty(&files)?;

    progress.report(80, "Generating suggestions...");
    let suggestion = ai
        .generate(
            &prompts::drive_suggestion_prompt(query, &files_json),
            prompts::DEFAULT_SYSTEM_PROMPT,
        )
        .await;

    progress.report(100, "Done");
    Ok(format!(
        "### Search results: {} file(s) found\n\n### Suggestions:\n{}",
        files.len(),
        suggestion
    ))
}
