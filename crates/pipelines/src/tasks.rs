//! Task extraction: the model turns free text into a JSON task array, which
//! is then written to Google Tasks.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Deserialize;
use shared::jobs::ProgressSender;

use crate::adapters::{TaskSink, TextGenerator};
use crate::prompts;
use services::gtasks::NewTask;

pub const EXTRACTION_FAILED_MESSAGE: &str =
    "Couldn't extract tasks from that text. Check the wording and try again.";
pub const NO_TASKS_MESSAGE: &str = "No tasks found. Try different text.";

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedTask {
    pub title: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

pub async fn capture_tasks(
    content: &str,
    sink: &dyn TaskSink,
    ai: &dyn TextGenerator,
    progress: &ProgressSender,
) -> Result<String> {
    progress.report(10, "Analyzing text...");
    progress.report(30, "Extracting tasks...");
    let reply = ai
        .generate(
            &prompts::task_extraction_prompt(content),
            prompts::DEFAULT_SYSTEM_PROMPT,
        )
        .await;

    // A reply the model garbled is a user-facing message, not a fault.
    let extracted = match parse_extracted_tasks(&reply) {
        Some(tasks) => tasks,
        None => {
            progress.report(100, "An error occurred");
            return Ok(EXTRACTION_FAILED_MESSAGE.to_string());
        }
    };

    if extracted.is_empty() {
        progress.report(100, "Done");
        return Ok(NO_TASKS_MESSAGE.to_string());
    }

    progress.report(60, "Connecting to Google Tasks...");
    let new_tasks: Vec<NewTask> = extracted
        .iter()
        .map(|task| NewTask {
            title: task.title.clone(),
            notes: task.notes.clone(),
            due: task.due.as_deref().and_then(normalize_due_date),
        })
        .collect();

    progress.report(80, "Adding tasks...");
    sink.add_tasks(&new_tasks).await?;

    progress.report(100, "Done");
    let mut out = format!("### Added tasks: {}\n\n", extracted.len());
    for (index, task) in extracted.iter().enumerate() {
        out.push_str(&format!(
            "## Task {}: {}\nDetails: {}\nDue: {}\nPriority: {}\n\n",
            index + 1,
            task.title,
            task.notes,
            task.due.as_deref().unwrap_or("not set"),
            task.priority.as_deref().unwrap_or("medium"),
        ));
    }
    Ok(out)
}

/// The model reply may wrap the JSON array in prose; pull the array out and
/// parse it. `None` when no parseable array is present.
fn parse_extracted_tasks(reply: &str) -> Option<Vec<ExtractedTask>> {
    let re = regex::Regex::new(r"(?s)\[\s*\{.*\}\s*\]").unwrap();
    let json_text = re.find(reply).map(|m| m.as_str()).unwrap_or(reply);
    serde_json::from_str(json_text).ok()
}

/// `YYYY-MM-DD` from the model becomes the RFC 3339 midnight timestamp the
/// Tasks API expects; anything else is dropped.
fn normalize_due_date(raw: &str) -> Option<String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| format!("{}T00:00:00.000Z", date.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::mpsc::channel;
    use std::sync::Mutex;

    struct RecordingSink {
        received: Mutex<Vec<NewTask>>,
        fail: bool,
    }

    #[async_trait]
    impl TaskSink for RecordingSink {
        async fn add_tasks(&self, tasks: &[NewTask]) -> Result<Vec<String>> {
            if self.fail {
                return Err(anyhow!("tasks API down"));
            }
            let mut received = self.received.lock().unwrap();
            received.extend(tasks.iter().cloned());
            Ok(tasks.iter().map(|_| "task-id".to_string()).collect())
        }
    }

    struct FixedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str, _system_message: &str) -> String {
            self.0.to_string()
        }
    }

    fn progress() -> ProgressSender {
        let (tx, _rx) = channel();
        ProgressSender::new(tx)
    }

    const TASKS_JSON: &str = r#"Sure! Here are the tasks:
[
  {"title": "Prepare slides", "notes": "for Monday", "due": "2024-12-15", "priority": "high"},
  {"title": "Email Bob", "due": "someday"}
]
Let me know if you need more."#;

    #[test]
    fn test_parse_tolerates_surrounding_prose() {
        let tasks = parse_extracted_tasks(TASKS_JSON).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "Prepare slides");
        assert_eq!(tasks[1].notes, "");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_extracted_tasks("I couldn't find any tasks, sorry!").is_none());
    }

    #[test]
    fn test_normalize_due_date() {
        assert_eq!(
            normalize_due_date("2024-12-15").as_deref(),
            Some("2024-12-15T00:00:00.000Z")
        );
        assert_eq!(normalize_due_date(" 2024-01-02 ").as_deref(), Some("2024-01-02T00:00:00.000Z"));
        assert!(normalize_due_date("next Tuesday").is_none());
        assert!(normalize_due_date("2024/12/15").is_none());
    }

    #[tokio::test]
    async fn test_capture_inserts_normalized_tasks() {
        let sink = RecordingSink {
            received: Mutex::new(vec![]),
            fail: false,
        };
        let ai = FixedGenerator(TASKS_JSON);
        let progress = progress();

        let result = capture_tasks("meeting notes", &sink, &ai, &progress)
            .await
            .unwrap();

        assert!(result.starts_with("### Added tasks: 2"));
        assert!(result.contains("Priority: high"));
        assert!(result.contains("Priority: medium")); // missing priority defaults

        let received = sink.received.lock().unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].due.as_deref(), Some("2024-12-15T00:00:00.000Z"));
        assert!(received[1].due.is_none()); // unparseable date dropped
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_a_message_not_a_fault() {
        let sink = RecordingSink {
            received: Mutex::new(vec![]),
            fail: false,
        };
        let ai = FixedGenerator("no json here");
        let progress = progress();

        let result = capture_tasks("text", &sink, &ai, &progress).await.unwrap();

        assert_eq!(result, EXTRACTION_FAILED_MESSAGE);
        assert!(sink.received.lock().unwrap().is_empty());
        assert_eq!(progress.high_water(), 100);
    }

    #[tokio::test]
    async fn test_empty_array_reports_no_tasks() {
        let sink = RecordingSink {
            received: Mutex::new(vec![]),
            fail: false,
        };
        let ai = FixedGenerator("[]");
        let progress = progress();

        let result = capture_tasks("text", &sink, &ai, &progress).await.unwrap();
        assert_eq!(result, NO_TASKS_MESSAGE);
    }

    #[tokio::test]
    async fn test_sink_fault_propagates() {
        let sink = RecordingSink {
            received: Mutex::new(vec![]),
            fail: true,
        };
        let ai = FixedGenerator(TASKS_JSON);
        let progress = progress();

        let err = capture_tasks("text", &sink, &ai, &progress)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tasks API down"));
    }
}
