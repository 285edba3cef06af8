//! # Content Normalizer
//!
//! Turns whatever the report webhook hands back — Markdown, escaped HTML,
//! whole HTML documents — into a clean, renderable fragment the splitter can
//! work on. Total by contract: this module never fails. The worst malformed
//! input downgrades to plain text wrapped in a paragraph.

mod sanitize;

pub use sanitize::sanitize;

use std::sync::OnceLock;

use log::debug;
use pulldown_cmark::{html::push_html, Options, Parser};
use regex::Regex;

use crate::fragment::{find_element_end, next_tag, text_content};

/// Normalize raw content into a sanitized HTML fragment.
///
/// Escaped newline/quote sequences are unescaped first (double-escaped
/// before single, so already-correct newlines are not corrupted). HTML-ish
/// input is cleaned; Markdown-ish input is rendered then cleaned; anything
/// else becomes a single paragraph.
pub fn normalize(raw: &str) -> String {
    let unescaped = unescape(raw);

    let cleaned = if looks_like_html(&unescaped) {
        clean_html(&unescaped)
    } else if looks_like_markdown(&unescaped) {
        clean_html(&markdown_to_html(&unescaped))
    } else {
        plain_text_fallback(&unescaped)
    };

    // Cleaning can eat everything (e.g. input was all disallowed markup).
    // Guaranteed non-failure: fall back to the text that was there.
    if text_content(&cleaned).trim().is_empty() && !text_content(&unescaped).trim().is_empty() {
        debug!("normalize: cleaning left no text, falling back to plain paragraph");
        return plain_text_fallback(&text_content(&unescaped));
    }
    cleaned
}

/// Normalize content the caller guarantees is Markdown (skips detection).
pub fn normalize_markdown(raw: &str) -> String {
    let unescaped = unescape(raw);
    clean_html(&markdown_to_html(&unescaped))
}

/// Un-escape literal `\n` and `\"` sequences. Double-escaped sequences are
/// handled first so a correctly escaped newline is not turned into a stray
/// backslash.
fn unescape(raw: &str) -> String {
    raw.replace("\\\\n", "\n")
        .replace("\\n", "\n")
        .replace("\\\\\"", "\"")
        .replace("\\\"", "\"")
}

fn looks_like_html(s: &str) -> bool {
    static HTML_RE: OnceLock<Regex> = OnceLock::new();
    let re = HTML_RE.get_or_init(|| {
        Regex::new(r"(?i)<(!doctype|html|body|p|h[1-6]|div|ul|ol|table|span|br)\b").unwrap()
    });
    re.is_match(s)
}

fn looks_like_markdown(s: &str) -> bool {
    static MD_RE: OnceLock<Regex> = OnceLock::new();
    let re = MD_RE.get_or_init(|| {
        Regex::new(
            r"(?mx)
            ^\#{1,6}\s            # ATX heading
            | ^\s*[-*+]\s+\S      # bullet list
            | ^\s*\d+\.\s+\S      # ordered list
            | \*\*[^*\n]+\*\*     # bold emphasis
            | ^\s*\|.*\|\s*$      # table row
            | ^```                # fenced code
            ",
        )
        .unwrap()
    });
    re.is_match(s)
}

/// Render Markdown to HTML with GFM tables and strikethrough. Single
/// newlines inside plain paragraphs become hard breaks, matching how the
/// generated reports are written.
fn markdown_to_html(md: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let prepared = single_newline_breaks(md);
    let parser = Parser::new_ext(&prepared, options);
    let mut html = String::with_capacity(prepared.len() * 2);
    push_html(&mut html, parser);
    html
}

/// Append a hard-break marker to plain paragraph lines followed by another
/// plain line, so single newlines render as `<br>`. Structural lines
/// (headings, lists, tables, quotes, fences) are left alone.
fn single_newline_breaks(md: &str) -> String {
    fn is_plain(line: &str) -> bool {
        let t = line.trim_start();
        !t.is_empty()
            && !t.starts_with('#')
            && !t.starts_with("```")
            && !t.starts_with('>')
            && !t.starts_with('|')
            && !t.starts_with("- ")
            && !t.starts_with("* ")
            && !t.starts_with("+ ")
            && !t
                .split_once('.')
                .map(|(n, rest)| {
                    !n.is_empty()
                        && n.chars().all(|c| c.is_ascii_digit())
                        && rest.starts_with(' ')
                })
                .unwrap_or(false)
    }

    let lines: Vec<&str> = md.lines().collect();
    let mut out = String::with_capacity(md.len() + lines.len() * 2);
    let mut in_fence = false;
    for (i, line) in lines.iter().enumerate() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }
        out.push_str(line);
        let next_plain = lines.get(i + 1).map_or(false, |next| is_plain(next));
        if !in_fence && is_plain(line) && next_plain && !line.ends_with("  ") {
            out.push_str("  ");
        }
        if i + 1 < lines.len() {
            out.push('\n');
        }
    }
    out
}

/// Strip document wrappers and sanitize to the block allow-list.
fn clean_html(html: &str) -> String {
    let body = extract_body(html);
    let clean = sanitize(&body);
    collapse_intertag_newlines(&clean)
}

/// If the input carries a `<body>`, keep only its inner HTML; otherwise
/// drop any `<!DOCTYPE>`, `<html>` and `<head>…</head>` remnants.
fn extract_body(html: &str) -> String {
    let mut pos = 0usize;
    while let Some(tag) = next_tag(html, pos) {
        if tag.name == "body" && !tag.closing {
            let (inner, _) = find_element_end(html, &tag);
            return inner.to_string();
        }
        pos = tag.end;
    }

    // No body: remove head elements wholesale, skip html open/close tags.
    let mut out = String::with_capacity(html.len());
    let mut cursor = 0usize;
    let mut scan = 0usize;
    while let Some(tag) = next_tag(html, scan) {
        match tag.name.as_str() {
            "head" if !tag.closing => {
                let (_, end) = find_element_end(html, &tag);
                out.push_str(&html[cursor..tag.start]);
                cursor = end;
                scan = end;
            }
            "html" => {
                out.push_str(&html[cursor..tag.start]);
                cursor = tag.end;
                scan = tag.end;
            }
            _ => scan = tag.end,
        }
    }
    out.push_str(&html[cursor..]);
    out
}

/// Collapse whitespace runs containing a newline between tags, so pretty-
/// printed markup doesn't measure phantom gaps.
fn collapse_intertag_newlines(html: &str) -> String {
    static INTERTAG_RE: OnceLock<Regex> = OnceLock::new();
    let re = INTERTAG_RE.get_or_init(|| Regex::new(r">\s*\n\s*<").unwrap());
    re.replace_all(html, "><").into_owned()
}

/// Last-resort rendering: escape the text and wrap it in one paragraph,
/// newlines becoming line breaks.
fn plain_text_fallback(text: &str) -> String {
    let escaped = text
        .trim()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!("<p>{}</p>", escaped.replace('\n', "<br>"))
}
