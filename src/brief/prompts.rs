//! Prompt construction for brief generation.

/// System instruction pinned for every generation request. Forbids source-text
/// reproduction and mandates the exact output skeleton the validator checks.
pub const SYSTEM_INSTRUCTION: &str = "\
You write Video Intelligence Briefs: short conceptual analyses of video content.

Hard rules:
- Never reproduce the source transcript verbatim or in close paraphrase.
- Never include timestamps, direct quotes, or speaker labels of any kind.
- Write original analytical prose about the ideas, not the wording.

Your response must follow this exact skeleton, with these exact headings:

Video Intelligence Brief

1. Central Theme
2. Core Argument Flow
3. Key Conceptual Sections
4. Primary Insights
5. Intended Viewer Impact

Fill each numbered section with two to four sentences. Output nothing before
the title heading and nothing after the last section.";

/// Build the user prompt embedding the (possibly truncated) transcript.
pub fn build_user_prompt(transcript: &str, video_title: &str, video_url: &str) -> String {
    let title = if video_title.trim().is_empty() {
        "(untitled)"
    } else {
        video_title.trim()
    };

    format!(
        "Video title: {title}\n\
Video URL: {video_url}\n\
\n\
Source transcript (may be truncated):\n\
{transcript}\n\
\n\
Produce the Video Intelligence Brief now, following the skeleton exactly."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::validate::REQUIRED_HEADINGS;

    #[test]
    fn system_instruction_names_every_required_heading() {
        for heading in REQUIRED_HEADINGS {
            assert!(
                SYSTEM_INSTRUCTION.contains(heading),
                "missing heading {heading}"
            );
        }
    }

    #[test]
    fn user_prompt_embeds_transcript_and_title() {
        let prompt = build_user_prompt("the transcript body", "My Talk", "https://example.com");
        assert!(prompt.contains("the transcript body"));
        assert!(prompt.contains("My Talk"));
        assert!(prompt.contains("https://example.com"));
    }

    #[test]
    fn blank_title_gets_a_placeholder() {
        let prompt = build_user_prompt("text", "  ", "https://example.com");
        assert!(prompt.contains("(untitled)"));
    }
}
