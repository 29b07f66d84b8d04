//! Server-side rendering of tutor replies into chat bubbles
//!
//! Reply text is GitHub-flavored markdown; stray `<br>` tags are turned into
//! line breaks first. Link and image targets outside http, https, mailto and
//! relative URLs are dropped. Raw HTML is escaped, or under the HTML prompt
//! variant sanitized with ammonia. Each action becomes a button whose visible
//! text is the label and whose `data-value` is what the page posts back as
//! `chatInput`.

use crate::reply::{Action, TutorReply, FALLBACK_TEXT};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use regex::Regex;
use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

static BR_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("br pattern is valid"));

/// Greeting shown before the first exchange
pub fn welcome() -> TutorReply {
    TutorReply {
        text: "Welcome back! 👋\n\nI am your personal Finance Tutor. Ready to master your finances? Select a level to begin:".to_string(),
        actions: vec![
            Action::new("🌱 Beginner", "set_level_beginner"),
            Action::new("🚀 Intermediate", "set_level_intermediate"),
            Action::new("🧠 Advanced", "set_level_advanced"),
        ],
    }
}

/// Replace `<br>`, `<br/>` and `<br />` (any case) with newlines
pub fn clean_breaks(text: &str) -> Cow<'_, str> {
    BR_TAG.replace_all(text, "\n")
}

const SAFE_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Whether a link or image target may be emitted as-is
fn is_safe_url(url: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme
    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    let Some((scheme, _)) = compact.split_once(':') else {
        return true;
    };
    // A colon after a path, query or fragment start is not a scheme separator
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    SAFE_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str())
}

fn neutralize_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&url) {
        url
    } else {
        CowStr::Borrowed("")
    }
}

/// Render reply markdown to HTML. Raw HTML in the source is escaped unless
/// `allow_raw_html` is set, in which case the output is sanitized instead.
pub fn markdown_to_html(text: &str, allow_raw_html: bool) -> String {
    let cleaned = clean_breaks(text);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    // Line breaks inside a paragraph are kept, as the model uses them for layout
    let events = Parser::new_ext(&cleaned, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) if !allow_raw_html => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: neutralize_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: neutralize_url(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(cleaned.len() * 3 / 2);
    html::push_html(&mut out, events);

    if allow_raw_html {
        ammonia::clean(&out)
    } else {
        out
    }
}

/// Full assistant bubble: formatted text plus action buttons
pub fn assistant_bubble(reply: &TutorReply, allow_raw_html: bool) -> String {
    let text = if reply.text.trim().is_empty() {
        FALLBACK_TEXT
    } else {
        reply.text.as_str()
    };

    let mut out = String::new();
    out.push_str(r#"<div class="message assistant"><div class="bubble"><div class="prose">"#);
    out.push_str(&markdown_to_html(text, allow_raw_html));
    out.push_str("</div>");

    if !reply.actions.is_empty() {
        out.push_str(r#"<div class="actions">"#);
        for action in &reply.actions {
            let label = escape_html(&action.label);
            let value = escape_html(&action.value);
            let _ = write!(
                out,
                r#"<button type="button" class="action" data-value="{value}" data-label="{label}">{label}</button>"#
            );
        }
        out.push_str("</div>");
    }

    out.push_str("</div></div>");
    out
}

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_breaks_variants() {
        assert_eq!(clean_breaks("a<br>b<BR/>c<br />d"), "a\nb\nc\nd");
        assert_eq!(clean_breaks("no tags"), "no tags");
    }

    #[test]
    fn test_markdown_formatting() {
        let html = markdown_to_html("## Budget\n\nUse **bold** and *italic*.\n\n- one\n- two", false);
        assert!(html.contains("<h2>Budget</h2>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn test_gfm_tables() {
        let html = markdown_to_html("| Ratio | Value |\n|---|---|\n| P/E | 15 |", false);
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>P/E</td>"));
    }

    #[test]
    fn test_br_tags_become_line_breaks() {
        let html = markdown_to_html("first<br>second", false);
        assert!(html.contains("first<br />"));
        assert!(!html.contains("&lt;br"));
    }

    #[test]
    fn test_raw_html_escaped_unless_allowed() {
        let escaped = markdown_to_html("hi <script>alert(1)</script>", false);
        assert!(!escaped.contains("<script>"));
        assert!(escaped.contains("&lt;script&gt;"));

        let passed = markdown_to_html("<b>bold</b> text", true);
        assert!(passed.contains("<b>bold</b>"));
    }

    #[test]
    fn test_script_urls_are_dropped_from_links() {
        for source in [
            "[Open calculator](javascript:alert(document.cookie))",
            "[x](JavaScript:alert(1))",
            "[x](<java script:alert(1)>)",
            "[x](data:text/html;base64,PHNjcmlwdD4=)",
            "![chart](vbscript:msgbox)",
        ] {
            let html = markdown_to_html(source, false);
            let lower = html.to_ascii_lowercase();
            assert!(!lower.contains("script:"), "{source} -> {html}");
            assert!(!lower.contains("data:"), "{source} -> {html}");
        }
    }

    #[test]
    fn test_safe_links_are_kept() {
        let html = markdown_to_html(
            "[SEC](https://www.sec.gov) [mail](mailto:help@example.com) [rel](/assets/guide)",
            false,
        );
        assert!(html.contains(r#"href="https://www.sec.gov""#));
        assert!(html.contains(r#"href="mailto:help@example.com""#));
        assert!(html.contains(r#"href="/assets/guide""#));
    }

    #[test]
    fn test_raw_html_is_sanitized_when_allowed() {
        let html = assistant_bubble(&TutorReply::plain("<img src=x onerror=alert(1)>"), true);
        assert!(!html.contains("onerror"));

        let html = markdown_to_html(
            r#"<a href="javascript:alert(1)">go</a> <script>alert(2)</script>"#,
            true,
        );
        assert!(!html.contains("javascript:"));
        assert!(!html.contains("<script"));

        let html = markdown_to_html("[x](javascript:alert(1))", true);
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_bubble_carries_value_separately_from_label() {
        let reply = TutorReply {
            text: "Pick one".to_string(),
            actions: vec![Action::new("Needs vs Wants", "Explain needs vs wants with examples")],
        };
        let html = assistant_bubble(&reply, false);

        assert!(html.contains(r#"data-value="Explain needs vs wants with examples""#));
        assert!(html.contains(">Needs vs Wants</button>"));
        // The value never appears as visible button text
        assert!(!html.contains(">Explain needs vs wants with examples<"));
    }

    #[test]
    fn test_bubble_escapes_action_fields() {
        let reply = TutorReply {
            text: "x".to_string(),
            actions: vec![Action::new("Stocks & \"Bonds\"", "<compare>")],
        };
        let html = assistant_bubble(&reply, true);
        assert!(html.contains(r#"data-value="&lt;compare&gt;""#));
        assert!(html.contains("Stocks &amp; &quot;Bonds&quot;"));
    }

    #[test]
    fn test_empty_text_renders_fallback_without_actions_block() {
        let html = assistant_bubble(&TutorReply::plain(""), false);
        assert!(html.contains(FALLBACK_TEXT));
        assert!(!html.contains("class=\"actions\""));
    }

    #[test]
    fn test_welcome_offers_levels() {
        let html = assistant_bubble(&welcome(), false);
        for value in ["set_level_beginner", "set_level_intermediate", "set_level_advanced"] {
            assert!(html.contains(&format!(r#"data-value="{value}""#)));
        }
    }
}
