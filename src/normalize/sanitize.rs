//! Allow-list HTML cleaning.
//!
//! Report content arrives from an LLM webhook and may carry arbitrary
//! markup. Only a fixed set of block and inline elements survives; every
//! attribute is dropped (which removes background images, inline positioning
//! and event handlers in one stroke). Disallowed wrapper elements are
//! flattened into their children's content so no text is silently lost —
//! except for a short drop-list of elements whose content is not document
//! text at all.

use crate::fragment::{find_element_end, next_tag};

/// Elements kept (tag only, attributes stripped).
const ALLOWED: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "table", "thead", "tbody", "tr",
    "td", "th", "strong", "em", "u", "b", "i", "br", "span", "div",
];

/// Elements removed together with their entire content.
const DROPPED: &[&str] = &["script", "style", "img", "iframe", "object", "noscript", "head"];

fn is_allowed(name: &str) -> bool {
    ALLOWED.contains(&name)
}

fn is_dropped(name: &str) -> bool {
    DROPPED.contains(&name)
}

/// Reduce `html` to the element allow-list, recursively flattening
/// disallowed wrappers into their children. Never fails; unparseable
/// stretches pass through as text.
pub fn sanitize(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    walk(html, &mut out);
    out
}

fn walk(html: &str, out: &mut String) {
    let mut pos = 0usize;
    while let Some(tag) = next_tag(html, pos) {
        out.push_str(&html[pos..tag.start]);

        if tag.closing {
            // Stray closing tag: drop it.
            pos = tag.end;
            continue;
        }

        if tag.self_closing || crate::fragment::is_void(&tag.name) {
            if is_allowed(&tag.name) {
                out.push('<');
                out.push_str(&tag.name);
                out.push('>');
            }
            pos = tag.end;
            continue;
        }

        let (inner, element_end) = find_element_end(html, &tag);
        if is_dropped(&tag.name) {
            // Content is markup plumbing, not document text.
        } else if is_allowed(&tag.name) {
            out.push('<');
            out.push_str(&tag.name);
            out.push('>');
            walk(inner, out);
            out.push_str("</");
            out.push_str(&tag.name);
            out.push('>');
        } else {
            // Flatten the wrapper, keep its children.
            walk(inner, out);
        }
        pos = element_end;
    }
    out.push_str(&html[pos..]);
}
