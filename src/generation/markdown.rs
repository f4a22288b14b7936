//! Light formatting of generated text
//!
//! Model output is shown as text, never parsed as HTML. With markdown on,
//! `**bold**` runs and line breaks are recognised; everything else stays
//! literal.

/// One run of formatted output
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextSpan {
    Plain(String),
    Strong(String),
    LineBreak,
}

/// Split `text` into spans for display
pub fn format_spans(text: &str, markdown: bool) -> Vec<TextSpan> {
    if !markdown {
        return vec![TextSpan::Plain(text.to_string())];
    }

    let mut spans = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            spans.push(TextSpan::LineBreak);
        }
        push_line(&mut spans, line);
    }
    spans
}

fn push_line(spans: &mut Vec<TextSpan>, line: &str) {
    let mut rest = line;
    while let Some(open) = rest.find("**") {
        let after = &rest[open + 2..];
        // Unclosed marker: the remainder is literal
        let Some(len) = after.find("**") else { break };

        if open > 0 {
            spans.push(TextSpan::Plain(rest[..open].to_string()));
        }
        if len > 0 {
            spans.push(TextSpan::Strong(after[..len].to_string()));
        }
        rest = &after[len + 2..];
    }
    if !rest.is_empty() {
        spans.push(TextSpan::Plain(rest.to_string()));
    }
}
