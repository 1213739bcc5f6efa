use chrono::NaiveDate;
use scribe_core::{or_not_specified, ContentBlock, EventRecord};

use crate::fallback::compute_duration;
use crate::format::{coordinators_line, format_date};

/// Sections the backend is told to produce, in order.
pub const REPORT_SECTIONS: [&str; 8] = [
    "Executive Summary",
    "Event Overview",
    "Objectives",
    "Proceedings & Key Sessions",
    "Highlights & Achievements",
    "Participant Engagement",
    "Outcomes & Impact",
    "Conclusion",
];

/// One line per block, as fed to the backend.
fn flatten_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Text { title, content, .. } => {
            format!("{}: {}", title.trim(), content.trim())
        }
        ContentBlock::Quote {
            title,
            content,
            author,
            ..
        } => match author.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
            Some(author) => format!("Quote ({}): \"{}\" - {}", title.trim(), content.trim(), author),
            None => format!("Quote ({}): \"{}\"", title.trim(), content.trim()),
        },
        ContentBlock::Achievement { title, content, .. } => {
            format!("Achievement: {} - {}", title.trim(), content.trim())
        }
        ContentBlock::Image {
            images,
            layout,
            caption,
            ..
        } => {
            let caption = caption
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(|c| format!(", caption: \"{}\"", c))
                .unwrap_or_default();
            format!(
                "Image: {} image(s) in {} layout{}",
                images.len(),
                layout.as_str(),
                caption
            )
        }
        ContentBlock::Custom {
            kind,
            title,
            content,
            ..
        } => {
            let label = match title.trim() {
                "" => or_not_specified(kind),
                title => title,
            };
            format!("{}: {}", label, or_not_specified(content))
        }
    }
}

fn flatten_blocks(blocks: &[ContentBlock]) -> String {
    if blocks.is_empty() {
        return "No additional content provided.".to_string();
    }
    blocks
        .iter()
        .map(|b| format!("- {}", flatten_block(b)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shared "Event Details" section.
fn event_details(event: &EventRecord, report_date: NaiveDate) -> String {
    let lines = [
        format!("- Title: {}", or_not_specified(&event.title)),
        format!("- Event Type: {}", or_not_specified(&event.event_type)),
        format!("- Organized By: {}", or_not_specified(&event.organized_by)),
        format!("- Institute: {}", or_not_specified(&event.institute)),
        format!("- Venue: {}", or_not_specified(&event.venue)),
        format!("- Start Date: {}", format_date(event.start_date)),
        format!("- End Date: {}", format_date(event.end_date)),
        format!(
            "- Duration: {}",
            compute_duration(event.start_date, event.end_date)
        ),
        format!("- Target Audience: {}", or_not_specified(&event.target_audience)),
        format!("- Number of Participants: {}", event.participant_count),
        format!(
            "- Faculty Coordinators: {}",
            coordinators_line(&event.faculty_coordinators)
        ),
        format!("- Report Date: {}", format_date(report_date)),
    ];
    format!("## Event Details\n\n{}", lines.join("\n"))
}

pub fn build_report_prompt(event: &EventRecord, report_date: NaiveDate) -> String {
    let outline = REPORT_SECTIONS
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n");

    let mut parts = Vec::new();
    parts.push(
        "You are an experienced academic report writer. Write a comprehensive, formal report \
         for the institutional event described below.\n"
            .to_string(),
    );
    parts.push(format!("{}\n", event_details(event, report_date)));
    parts.push(format!(
        "## Event Content\n\n{}\n",
        flatten_blocks(&event.content_blocks)
    ));
    parts.push(format!(
        "## Report Structure\n\nOrganize the report into exactly these sections, in this order:\n\n{}\n\n\
         Do not add any section that is not listed above.\n",
        outline
    ));
    parts.push(
        "## Instructions\n\n\
         - Target length: 800-1200 words.\n\
         - Use a formal, professional tone suitable for institutional records.\n\
         - Use the dates, duration and participant count exactly as given.\n\
         - Write \"Not specified\" details as general statements rather than inventing facts.\n\
         - Format section headings in Markdown."
            .to_string(),
    );
    parts.join("\n")
}

pub fn build_summary_prompt(event: &EventRecord, report_date: NaiveDate) -> String {
    let mut parts = Vec::new();
    parts.push(
        "Write an executive summary of the institutional event described below.\n".to_string(),
    );
    parts.push(format!("{}\n", event_details(event, report_date)));
    parts.push(format!(
        "## Event Content\n\n{}\n",
        flatten_blocks(&event.content_blocks)
    ));
    parts.push(
        "## Instructions\n\n\
         - Write 10-15 sentences in flowing prose, without headings or bullet points.\n\
         - Cover the purpose, key activities, participation and outcomes.\n\
         - Use the dates, duration and participant count exactly as given."
            .to_string(),
    );
    parts.join("\n")
}

pub fn build_recommendations_prompt(event: &EventRecord, report_date: NaiveDate) -> String {
    let mut parts = Vec::new();
    parts.push(
        "Review the institutional event described below and suggest improvements for future \
         editions.\n"
            .to_string(),
    );
    parts.push(format!("{}\n", event_details(event, report_date)));
    parts.push(format!(
        "## Event Content\n\n{}\n",
        flatten_blocks(&event.content_blocks)
    ));
    parts.push(
        "## Instructions\n\n\
         - Provide 3-5 specific, actionable recommendations as a numbered list.\n\
         - Each recommendation should be one or two sentences.\n\
         - Base them on the event's type, audience and scale."
            .to_string(),
    );
    parts.join("\n")
}
