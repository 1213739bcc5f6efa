use scribe_core::{or_not_specified, BlockKind};

/// Prompt for a single content block of `kind`, seeded with free-text `context`.
///
/// Unknown kinds get a generic section-writing template.
pub fn build_block_prompt(kind: &BlockKind, context: &str) -> String {
    let context = or_not_specified(context);
    match kind {
        BlockKind::Text => format!(
            "Write a well-structured paragraph for an event report.\n\n\
             Context: {}\n\n\
             Requirements:\n\
             - 150-300 words\n\
             - Formal, professional tone\n\
             - Plain prose without headings",
            context
        ),
        BlockKind::Quote => format!(
            "Write one memorable, inspiring quote for an event report.\n\n\
             Context: {}\n\n\
             Requirements:\n\
             - A single sentence\n\
             - Attribute it to a plausible speaker, formatted as: \"Quote\" - Name, Designation",
            context
        ),
        BlockKind::Achievement => format!(
            "Describe an achievement for an event report.\n\n\
             Context: {}\n\n\
             Requirements:\n\
             - 100-200 words\n\
             - State who achieved what, and why it matters\n\
             - Celebratory but factual tone",
            context
        ),
        BlockKind::Image => format!(
            "Write a caption for a photograph included in an event report.\n\n\
             Context: {}\n\n\
             Requirements:\n\
             - 50-100 words\n\
             - Describe the moment and its significance to the event",
            context
        ),
        BlockKind::Other(name) => format!(
            "Write content for the \"{}\" section of an event report.\n\n\
             Context: {}\n\n\
             Requirements:\n\
             - Clear, concise and professional\n\
             - Suitable for inclusion in an institutional report",
            or_not_specified(name),
            context
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_guidance_per_kind() {
        assert!(build_block_prompt(&BlockKind::Text, "ctx").contains("150-300 words"));
        assert!(build_block_prompt(&BlockKind::Achievement, "ctx").contains("100-200 words"));
        assert!(build_block_prompt(&BlockKind::Image, "ctx").contains("50-100 words"));
        assert!(build_block_prompt(&BlockKind::Quote, "ctx").contains("\"Quote\" - Name, Designation"));
    }

    #[test]
    fn test_unknown_kind_uses_generic_template() {
        let prompt = build_block_prompt(&BlockKind::from_name("timeline"), "Day 1 talks");
        assert!(prompt.contains("\"timeline\" section"));
        assert!(prompt.contains("Context: Day 1 talks"));
    }

    #[test]
    fn test_blank_context_placeholder() {
        assert!(build_block_prompt(&BlockKind::Text, "  ").contains("Context: Not specified"));
    }
}
