//! Mixed-content handling
//!
//! Note content arrives as free text that may carry inline EAD markup,
//! legacy `<p>` tags, or blank-line paragraph breaks. The functions here
//! normalize it into markup that is safe to embed in the element tree:
//!
//! - [`handle_linebreaks`] rebuilds paragraph structure from blank lines
//! - [`sanitize_mixed_content`] appends content to an element, verbatim when
//!   it is well-formed and as escaped text otherwise
//! - [`extract_head_text`] lifts an embedded `<head>` out of note content

use crate::documents::{is_well_formed, well_formedness_errors};
use crate::xml::XmlElement;
use once_cell::sync::Lazy;
use quick_xml::escape::unescape;
use regex::{Captures, Regex};

static AMPERSAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+;|#x[0-9a-fA-F]+;|[A-Za-z_][A-Za-z0-9._-]*;)?").unwrap()
});

static LEADING_PARAGRAPH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<p(\s|/|>)").unwrap());

static EMBEDDED_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<head( [^<>]+)?>([^<>]+)</head>").unwrap());

/// Escape every `&` that does not already start an entity or character reference
pub fn escape_ampersands(text: &str) -> String {
    AMPERSAND
        .replace_all(text, |caps: &Captures| {
            if caps.get(1).is_some() {
                caps[0].to_string()
            } else {
                "&amp;".to_string()
            }
        })
        .into_owned()
}

/// Replace typographic quotes with their ASCII forms
pub fn remove_smart_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

/// Rebuild paragraph markup from blank-line separated text
///
/// Existing `<p>`/`</p>` tags are unwrapped into blank-line blocks first,
/// so the routine is idempotent on its own output. Content whose
/// reconstruction is not well-formed is returned unwrapped instead.
pub fn handle_linebreaks(content: &str) -> String {
    let content = content
        .replace("\n\t", "\n\n")
        .replace("</p>", "\n\n")
        .replace("<p>", "");

    let trimmed = content.trim();
    if trimmed.is_empty() || LEADING_PARAGRAPH.is_match(trimmed) {
        return content;
    }

    let blocks: Vec<&str> = content
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .collect();

    let rebuilt = if blocks.len() > 1 {
        blocks
            .iter()
            .map(|block| format!("<p>{}</p>", escape_ampersands(block.trim())))
            .collect::<String>()
    } else {
        format!("<p>{}</p>", escape_ampersands(trimmed))
    };

    let errors = well_formedness_errors(&rebuilt);
    if errors.is_empty() {
        rebuilt
    } else {
        log::debug!(
            "Keeping content without paragraphs, reconstruction is not well-formed: {}",
            errors[0]
        );
        content
    }
}

/// Append note content to `parent`
///
/// Smart quotes are straightened and `<br>` is made self-closing. With
/// `wrap_in_paragraphs` the content goes through [`handle_linebreaks`].
/// Well-formed results are embedded as markup; anything else becomes an
/// escaped text node, with existing entity and character references decoded
/// first so they are not escaped twice. Blank content appends nothing.
pub fn sanitize_mixed_content(content: &str, parent: &mut XmlElement, wrap_in_paragraphs: bool) {
    if content.trim().is_empty() {
        return;
    }

    let cleaned = remove_smart_quotes(content)
        .replace("<br>", "<br/>")
        .replace("</br>", "");

    let prepared = if wrap_in_paragraphs {
        handle_linebreaks(&cleaned)
    } else {
        escape_ampersands(&cleaned)
    };

    if is_well_formed(&prepared) {
        parent.push_raw(prepared);
    } else {
        log::warn!(
            "Content of <{}> is not well-formed markup, writing it as text",
            parent.name()
        );
        let text = match unescape(&cleaned) {
            Ok(text) => text.into_owned(),
            Err(_) => cleaned.replace("&amp;", "&"),
        };
        parent.push_text(text);
    }
}

/// Split an embedded `<head>` off note content
///
/// Returns the content without the head element and the head text. When
/// the content has no head, it is returned unchanged with `fallback`.
pub fn extract_head_text(content: &str, fallback: &str) -> (String, String) {
    match EMBEDDED_HEAD.captures(content.trim()) {
        Some(caps) => (
            content.replacen(&caps[0], "", 1),
            caps[2].to_string(),
        ),
        None => (content.to_string(), fallback.to_string()),
    }
}
