use scribe_core::{or_not_specified, ChatTurn, EventRecord};

use crate::format::date_range;

pub const CHAT_PREAMBLE: &str = r#"You are Scribe, an assistant for faculty and staff who document institutional events.

You can help with:
- Drafting and polishing event reports, summaries and highlights
- Suggesting structure, headings and wording for report sections
- Writing quotes, captions and achievement descriptions
- Answering questions about the event currently being reported on

Be concise, accurate and professional. If you do not know something about the event, say so instead of guessing."#;

fn report_context_block(event: &EventRecord) -> String {
    let lines = [
        format!("- Title: {}", or_not_specified(&event.title)),
        format!("- Type: {}", or_not_specified(&event.event_type)),
        format!("- Institute: {}", or_not_specified(&event.institute)),
        format!("- Venue: {}", or_not_specified(&event.venue)),
        format!("- Dates: {}", date_range(event.start_date, event.end_date)),
        format!("- Target Audience: {}", or_not_specified(&event.target_audience)),
        format!("- Participants: {}", event.participant_count),
    ];
    format!("## Report Context\n\n{}", lines.join("\n"))
}

/// `history` must already be chronological (oldest first).
pub fn build_contextual_chat_prompt(
    message: &str,
    history: &[ChatTurn],
    report_context: Option<&EventRecord>,
) -> String {
    let mut parts = Vec::new();
    parts.push(format!("{}\n", CHAT_PREAMBLE));

    if !history.is_empty() {
        let lines = history
            .iter()
            .map(|turn| format!("{}: {}", turn.role.label(), turn.content.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        parts.push(format!("## Conversation So Far\n\n{}\n", lines));
    }

    if let Some(event) = report_context {
        parts.push(format!("{}\n", report_context_block(event)));
    }

    parts.push(format!("## Current Message\n\nUser: {}\n", message.trim()));
    parts.push(
        "Respond as the assistant to the current message. Stay consistent with the \
         conversation so far and use the report context when it is relevant. Reply in \
         plain text or light Markdown."
            .to_string(),
    );
    parts.join("\n")
}
