//! Markup for the insight result region. Pure functions, no DOM access.

use crate::error::FailureKind;
use crate::state::{InsightResult, TextTrust};

pub const LOADING_MARKUP: &str =
    r#"<p><i class="fas fa-spinner fa-spin"></i> Analyzing nature's wisdom...</p>"#;

/// Escape text for interpolation into element content or attribute values.
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn interpolate(text: &str, trust: TextTrust) -> String {
    match trust {
        TextTrust::Escaped => escape_text(text),
        TextTrust::TrustedRichText => text.to_string(),
    }
}

/// Markup for `state`. Server text in a success block follows `trust`;
/// server error text is always escaped.
pub fn render_result(state: &InsightResult, trust: TextTrust) -> String {
    match state {
        InsightResult::Idle => String::new(),
        InsightResult::Loading => LOADING_MARKUP.to_string(),
        InsightResult::Success { text } => format!(
            concat!(
                r#"<div class="insight-content">"#,
                r#"<h3><i class="fas fa-leaf"></i> Nature's Solution:</h3>"#,
                "<p>{}</p>",
                "</div>"
            ),
            interpolate(text, trust)
        ),
        InsightResult::Failure { kind, message } => match kind {
            FailureKind::UserInputInvalid => {
                format!(r#"<p class="error">{}</p>"#, escape_text(message))
            }
            FailureKind::ServerRejected => format!(
                r#"<p class="error"><i class="fas fa-exclamation-circle"></i> Error: {}</p>"#,
                escape_text(message)
            ),
            FailureKind::NetworkOrParse => format!(
                r#"<p class="error"><i class="fas fa-exclamation-circle"></i> {}</p>"#,
                escape_text(message)
            ),
        },
    }
}
