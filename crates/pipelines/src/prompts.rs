//! Prompt templates for the four workflows.

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

pub const WEB_RESEARCH_SYSTEM_PROMPT: &str =
    "You are an AI assistant with web search capability. Collect and provide \
     up-to-date information.";

pub fn drive_suggestion_prompt(query: &str, files_json: &str) -> String {
    format!(
        "Here are Google Drive search results for the keyword \"{query}\":\n\n\
         {files_json}\n\n\
         For these files, provide:\n\
         1. The three most relevant files and why\n\
         2. Concrete suggestions for what could be done with them\n\
         3. Related information the search may have missed\n\n\
         Keep the answer concise and specific."
    )
}

pub fn reply_draft_prompt(sender: &str, subject: &str, body: &str) -> String {
    format!(
        "Draft an appropriate reply to the following email:\n\n\
         From: {sender}\n\
         Subject: {subject}\n\
         Body:\n\
         {body}\n\n\
         Keep the reply concise and polite, in a format appropriate for \
         business email."
    )
}

pub fn task_extraction_prompt(content: &str) -> String {
    format!(
        "Extract tasks from the following text. For each task include:\n\
         1. A short task title\n\
         2. A detailed description\n\
         3. An estimated due date (when one can be inferred from the text)\n\
         4. A priority (high/medium/low)\n\n\
         Return JSON, for example:\n\
         [\n\
           {{\n\
             \"title\": \"Prepare for the meeting\",\n\
             \"notes\": \"Create the slides and send them to attendees\",\n\
             \"due\": \"2024-12-15\",\n\
             \"priority\": \"high\"\n\
           }}\n\
         ]\n\n\
         Text:\n\
         {content}"
    )
}

pub fn web_research_prompt(topic: &str) -> String {
    format!(
        "Collect detailed information about \"{topic}\". Focus on:\n\
         1. Recent developments and statistics\n\
         2. Key challenges and opportunities\n\
         3. Expert opinions from the field\n\
         4. Future outlook\n\n\
         This information will be used to write a comprehensive report."
    )
}

pub fn online_report_prompt(topic: &str, web_info: &str, files_json: &str) -> String {
    format!(
        "Here is information about \"{topic}\":\n\n\
         ## Web research:\n\
         {web_info}\n\n\
         ## Related files in Google Drive:\n\
         {files_json}\n\n\
         Using this information, write a comprehensive report of about five \
         pages on \"{topic}\" with the following sections:\n\n\
         1. Executive summary\n\
         2. Background and market overview\n\
         3. Key findings (4-6)\n\
         4. Detailed analysis\n\
         5. Conclusions and strategic recommendations\n\
         6. References\n\n\
         Give each section a heading and keep the content concrete and \
         actionable."
    )
}

pub fn offline_report_prompt(topic: &str, files_json: &str) -> String {
    format!(
        "Here is information about files in Google Drive related to \
         \"{topic}\":\n\n\
         {files_json}\n\n\
         Using this information, write a report of about five pages on \
         \"{topic}\" with the following sections:\n\n\
         1. Overview\n\
         2. Background\n\
         3. Key points (3-5)\n\
         4. Analysis and discussion\n\
         5. Conclusions and recommendations\n\n\
         Note: this report was generated in offline mode and does not include \
         current web information."
    )
}
