//! Caption artifact cleaning: timed-markup and event-list formats to plain text.

use serde::Deserialize;

use super::CaptionFormat;
use crate::Result;

/// Extract plain text from a raw caption artifact.
pub fn extract_text(format: CaptionFormat, raw: &str) -> Result<String> {
    match format {
        CaptionFormat::Vtt | CaptionFormat::Srt => Ok(clean_timed_markup(raw)),
        CaptionFormat::Json3 => clean_json3(raw),
    }
}

/// Clean a VTT or SRT document into a single line of prose.
///
/// Drops header lines, cue-timing lines, sequence-number lines and blanks,
/// strips inline tags, collapses whitespace, and joins the surviving text
/// fragments in file order. Consecutive duplicate cue lines are dropped -
/// auto-generated captions repeat the same text across rolling cue windows.
fn clean_timed_markup(raw: &str) -> String {
    let mut fragments: Vec<String> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || is_header_line(line) || is_timing_line(line) || is_sequence_line(line)
        {
            continue;
        }

        let text = decode_entities(&strip_inline_tags(line));
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            continue;
        }
        if fragments.last().map(String::as_str) == Some(collapsed.as_str()) {
            continue;
        }
        fragments.push(collapsed);
    }

    fragments.join(" ").trim().to_string()
}

fn is_header_line(line: &str) -> bool {
    line.eq_ignore_ascii_case("webvtt")
        || line.starts_with("Kind:")
        || line.starts_with("Language:")
        || line.starts_with("NOTE")
        || line.starts_with("STYLE")
        || line.starts_with("REGION")
}

fn is_timing_line(line: &str) -> bool {
    line.contains("-->")
}

fn is_sequence_line(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c.is_ascii_digit())
}

/// Remove inline markup spans such as `<00:00:01.240>` and `<c>`/`</c>`.
fn strip_inline_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Decode the handful of HTML entities YouTube caption tracks actually emit.
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[derive(Debug, Deserialize)]
struct Json3Document {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Concatenate the text segments of a structured event-list document in array
/// order.
fn clean_json3(raw: &str) -> Result<String> {
    let document: Json3Document = serde_json::from_str(raw)?;
    let mut out = String::new();
    for event in &document.events {
        for segment in &event.segs {
            out.push_str(&segment.utf8);
        }
    }
    Ok(out.split_whitespace().collect::<Vec<_>>().join(" "))
}
