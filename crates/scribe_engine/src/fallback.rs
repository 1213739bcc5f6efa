//! Deterministic report synthesis used when the backend cannot produce one.
//!
//! Nothing here reads the clock or calls out: the same event and the same
//! `today` always yield the same bytes.

use chrono::NaiveDate;
use scribe_core::{or_not_specified, ContentBlock, EventRecord, NOT_SPECIFIED};

use crate::format::{coordinators_line, date_range, format_date};

/// Rendered in the proceedings section when an event has no content blocks.
pub const FILLER_PARAGRAPH: &str = "The event featured a series of well-organized sessions that \
encouraged active participation and a meaningful exchange of ideas. Attendees engaged with the \
resource persons through discussions and hands-on activities, gaining practical insights relevant \
to their academic and professional growth.";

/// Duration label from the calendar-day span between `start` and `end`.
///
/// | span (days) | label       |
/// |-------------|-------------|
/// | 0           | `one-day`   |
/// | 1           | `two-day`   |
/// | 2..=7       | `<n>-day`   |
/// | > 7         | `multi-day` |
pub fn compute_duration(start: NaiveDate, end: NaiveDate) -> String {
    let span = (end - start).num_days().unsigned_abs();
    match span {
        0 => "one-day".to_string(),
        1 => "two-day".to_string(),
        2..=7 => format!("{}-day", span),
        _ => "multi-day".to_string(),
    }
}

fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Text { title, content, .. } => {
            format!("### {}\n\n{}", title.trim(), content.trim())
        }
        ContentBlock::Quote {
            title,
            content,
            author,
            ..
        } => {
            let mut out = format!("### {}\n\n> \"{}\"", title.trim(), content.trim());
            if let Some(author) = author.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
                out.push_str(&format!("\n>\n> - {}", author));
            }
            out
        }
        ContentBlock::Achievement { title, content, .. } => {
            format!("**Achievement: {}**\n\n{}", title.trim(), content.trim())
        }
        ContentBlock::Image {
            images,
            layout,
            caption,
            ..
        } => {
            let noun = if images.len() == 1 { "photograph" } else { "photographs" };
            let mut out = format!(
                "*[{} {} from the event, {} layout]*",
                images.len(),
                noun,
                layout.as_str()
            );
            if let Some(caption) = caption.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                out.push_str(&format!("\n\n*{}*", caption));
            }
            out
        }
        ContentBlock::Custom {
            kind,
            title,
            content,
            ..
        } => {
            let label = present(title).or(present(kind)).unwrap_or(NOT_SPECIFIED);
            format!("**{}:** {}", label, or_not_specified(content))
        }
    }
}

/// Markdown for the proceedings section. Never empty.
pub fn render_content_blocks(blocks: &[ContentBlock]) -> String {
    if blocks.is_empty() {
        return FILLER_PARAGRAPH.to_string();
    }
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Noun used in prose when the event type is blank.
fn event_noun(event: &EventRecord) -> &str {
    match event.event_type.trim() {
        "" => "event",
        kind => kind,
    }
}

fn on_dates(event: &EventRecord) -> String {
    if event.start_date == event.end_date {
        format!("on {}", date_range(event.start_date, event.end_date))
    } else {
        format!("from {}", date_range(event.start_date, event.end_date))
    }
}

/// Trimmed `value`, or `None` when blank. Prose drops blank fields.
fn present(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|v| !v.is_empty())
}

fn introduction(event: &EventRecord, duration: &str) -> String {
    let what = format!(
        "{} {} titled \"{}\"",
        duration,
        event_noun(event),
        event.title.trim()
    );
    let venue = present(&event.venue)
        .map(|v| format!(" at {}", v))
        .unwrap_or_default();
    let opening = match present(&event.institute) {
        Some(institute) => format!("{} organized a {} {}{}.", institute, what, on_dates(event), venue),
        None => format!("A {} was held {}{}.", what, on_dates(event), venue),
    };

    let gathered = format!(
        "the event brought together {} participants.",
        event.participant_count
    );
    let closing = match (present(&event.organized_by), present(&event.target_audience)) {
        (Some(by), Some(audience)) => format!("Organized by {} for {}, {}", by, audience, gathered),
        (Some(by), None) => format!("Organized by {}, {}", by, gathered),
        (None, Some(audience)) => format!("Aimed at {}, {}", audience, gathered),
        (None, None) => format!("The event brought together {} participants.", event.participant_count),
    };

    format!("{} {}", opening, closing)
}

/// Ten-section report built from the record alone.
pub fn build_fallback_report(event: &EventRecord, today: NaiveDate) -> String {
    let title = event.title.trim();
    let duration = compute_duration(event.start_date, event.end_date);
    let institute = or_not_specified(&event.institute);
    let participants = event.participant_count;
    let noun = event_noun(event);

    let mut sections: Vec<String> = Vec::with_capacity(10);

    let mut header = format!("# {}\n\n**Event Report**", title.to_uppercase());
    if let Some(institute) = present(&event.institute) {
        header.push_str(&format!("\n\n{}", institute));
    }
    sections.push(header);

    sections.push(format!("## Introduction\n\n{}", introduction(event, &duration)));

    let rows = [
        ("Event Title", title.to_string()),
        ("Event Type", or_not_specified(&event.event_type).to_string()),
        ("Organized By", or_not_specified(&event.organized_by).to_string()),
        ("Institute", institute.to_string()),
        ("Venue", or_not_specified(&event.venue).to_string()),
        ("Date(s)", date_range(event.start_date, event.end_date)),
        ("Duration", duration.clone()),
        ("Target Audience", or_not_specified(&event.target_audience).to_string()),
        ("Participants", participants.to_string()),
    ];
    let mut table = String::from("## Event Overview\n\n| Field | Details |\n|---|---|");
    for (field, value) in rows {
        table.push_str(&format!("\n| {} | {} |", field, value));
    }
    sections.push(table);

    let coordination = if event.faculty_coordinators.is_empty() {
        format!("Faculty coordinators: {}.", coordinators_line(&[]))
    } else {
        let list = event
            .faculty_coordinators
            .iter()
            .map(|c| match c.designation.trim() {
                "" => format!("- **{}**", or_not_specified(&c.name)),
                designation => format!("- **{}**, {}", or_not_specified(&c.name), designation),
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("The {} was coordinated by:\n\n{}", noun, list)
    };
    sections.push(format!("## Coordination\n\n{}", coordination));

    sections.push(format!(
        "## Proceedings\n\n{}",
        render_content_blocks(&event.content_blocks)
    ));

    sections.push(format!(
        "## Learning Outcomes\n\n\
         - Participants gained a clearer understanding of the themes covered in \"{}\".\n\
         - Sessions connected theoretical concepts with practical applications.\n\
         - Attendees built connections with peers and resource persons.",
        title
    ));

    sections.push(format!(
        "## Participant Engagement\n\n\
         The {} drew {} participants. Attendees took an active part in the sessions, \
         raising questions and contributing to discussions throughout the {} programme.",
        noun, participants, duration
    ));

    sections.push(format!(
        "## Institutional Excellence\n\n\
         The event reflects the commitment of {} to academic excellence and to \
         creating learning opportunities beyond the classroom.",
        present(&event.institute).unwrap_or("the organizing institution")
    ));

    sections.push(format!(
        "## Conclusion\n\n\
         \"{}\" concluded successfully, meeting its objectives and leaving participants \
         with knowledge and experience they can build on. The organizers thank everyone \
         who contributed to making the {} a success.",
        title, noun
    ));

    sections.push(format!(
        "---\n\n*Report generated on {} by the automated report generator.*",
        format_date(today)
    ));

    sections.join("\n\n")
}
