//! Unread-mail triage: one reply draft per message.

use anyhow::Result;
use shared::jobs::ProgressSender;

use crate::adapters::{MailSource, TextGenerator};
use crate::prompts;

pub const NO_UNREAD_MESSAGE: &str = "No unread mail.";

pub async fn triage_unread_mail(
    mail: &dyn MailSource,
    ai: &dyn TextGenerator,
    limit: u32,
    progress: &ProgressSender,
) -> Result<String> {
    progress.report(10, "Connecting to Gmail...");
    progress.report(30, "Fetching unread mail...");
    let messages = mail.unread(limit).await?;

    if messages.is_empty() {
        progress.report(100, "Done");
        return Ok(NO_UNREAD_MESSAGE.to_string());
    }

    progress.report(50, "Analyzing messages...");
    progress.report(70, "Drafting replies...");
    let mut sections = Vec::with_capacity(messages.len());
    for (index, email) in messages.iter().enumerate() {
        let draft = ai
            .generate(
                &prompts::reply_draft_prompt(&email.sender, &email.subject, &email.body),
                prompts::DEFAULT_SYSTEM_PROMPT,
            )
            .await;
        sections.push(format!(
            "## Mail {}\nFrom: {}\nSubject: {}\n\n### Suggested reply:\n{}\n\n---\n",
            index + 1,
            email.sender,
            email.subject,
            draft
        ));
    }

    progress.report(100, "Done");
    Ok(format!(
        "### Unread mail: {}\n\n{}",
        messages.len(),
        sections.join("\n")
    ))
}
