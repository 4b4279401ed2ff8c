//! The Brief Contract: structural and content validity for generated briefs.

use regex::Regex;
use std::sync::OnceLock;

/// Heading substrings every valid brief must contain, in any position.
pub const REQUIRED_HEADINGS: [&str; 6] = [
    "Video Intelligence Brief",
    "1. Central Theme",
    "2. Core Argument Flow",
    "3. Key Conceptual Sections",
    "4. Primary Insights",
    "5. Intended Viewer Impact",
];

/// Timestamp hits only count against a candidate longer than this.
const TIMESTAMP_LENGTH_GATE: usize = 220;

fn quoted_span_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)“.*?”|".*?""#).unwrap())
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{1,2}:\d{2}(:\d{2})?\b").unwrap())
}

fn speaker_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[A-Z][a-zA-Z]+:").unwrap())
}

/// Heuristic for model output that leaked source material instead of
/// summarizing it: quoted spans, timestamps in a long text, or speaker labels.
pub fn looks_like_transcript(text: &str) -> bool {
    let quoted = quoted_span_re().is_match(text);
    let timestampy =
        timestamp_re().is_match(text) && text.chars().count() > TIMESTAMP_LENGTH_GATE;
    let speaker_labelled = speaker_label_re().is_match(text);
    quoted || timestampy || speaker_labelled
}

/// A candidate brief is valid iff every required heading is present and the
/// text does not look like a transcript.
pub fn validate_brief_format(text: &str) -> bool {
    let trimmed = text.trim();
    REQUIRED_HEADINGS.iter().all(|h| trimmed.contains(h)) && !looks_like_transcript(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed_brief() -> String {
        [
            "Video Intelligence Brief",
            "1. Central Theme",
            "The talk examines long-term thinking.",
            "2. Core Argument Flow",
            "It builds from premise to conclusion.",
            "3. Key Conceptual Sections",
            "Framing, evidence, synthesis.",
            "4. Primary Insights",
            "Structure beats detail.",
            "5. Intended Viewer Impact",
            "A clearer mental model.",
        ]
        .join("\n")
    }

    #[test]
    fn accepts_well_formed_brief() {
        assert!(validate_brief_format(&well_formed_brief()));
    }

    #[test]
    fn rejects_missing_heading() {
        let text = well_formed_brief().replace("4. Primary Insights", "4. Something Else");
        assert!(!validate_brief_format(&text));
    }

    #[test]
    fn rejects_quoted_spans() {
        let text = format!("{}\nAs the host said, \"word for word\".", well_formed_brief());
        assert!(!validate_brief_format(&text));
    }

    #[test]
    fn rejects_curly_quoted_spans() {
        let text = format!("{}\nThe speaker noted “exact words”.", well_formed_brief());
        assert!(!validate_brief_format(&text));
    }

    #[test]
    fn rejects_long_text_with_timestamps() {
        let padding = "x".repeat(250);
        let text = format!("at 1:23:45 the speaker continues {padding}");
        assert!(looks_like_transcript(&text));
        assert!(!validate_brief_format(&text));
    }

    #[test]
    fn short_text_with_timestamp_is_not_transcript_like() {
        assert!(!looks_like_transcript("runtime 1:23"));
    }

    #[test]
    fn rejects_speaker_labels() {
        let text = format!("{}\nAlice: welcome back everyone", well_formed_brief());
        assert!(!validate_brief_format(&text));
    }

    #[test]
    fn numbered_headings_are_not_speaker_labels() {
        assert!(!looks_like_transcript("1. Central Theme\nA concept."));
    }
}
