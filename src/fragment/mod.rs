//! # Content Fragments
//!
//! The block-level model the splitter operates on. A fragment is an opaque
//! string of sanitized HTML; [`parse_fragment`] lifts it into a list of
//! [`Block`]s (paragraphs, headings, lists, tables) that know how to report
//! their visible text and serialize themselves back to HTML.
//!
//! The parser is a tolerant tag tokenizer, not a spec-complete HTML parser.
//! It never fails: tag soup it cannot make sense of degrades into [`Block::Raw`]
//! and flows through the splitter as an atomic unit.

mod parser;

pub(crate) use parser::{find_element_end, is_void, next_tag};

/// A top-level block of document content.
///
/// Paragraph and heading carry their inner HTML; lists and tables are
/// decomposed into their splittable parts (items, rows) because the splitter
/// breaks them at those boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph { html: String },
    Heading { level: u8, html: String },
    List { ordered: bool, items: Vec<String> },
    Table { head: Vec<String>, rows: Vec<String> },
    /// Anything else: treated as atomic, moved whole across page boundaries.
    Raw { html: String },
}

impl Block {
    pub fn paragraph(html: impl Into<String>) -> Self {
        Block::Paragraph { html: html.into() }
    }

    /// Serialize the block back to an HTML fragment.
    pub fn to_html(&self) -> String {
        match self {
            Block::Paragraph { html } => format!("<p>{html}</p>"),
            Block::Heading { level, html } => format!("<h{level}>{html}</h{level}>"),
            Block::List { ordered, items } => {
                let tag = if *ordered { "ol" } else { "ul" };
                let body: String = items.iter().map(|i| format!("<li>{i}</li>")).collect();
                format!("<{tag}>{body}</{tag}>")
            }
            Block::Table { head, rows } => {
                let mut out = String::from("<table>");
                if !head.is_empty() {
                    out.push_str("<thead>");
                    for row in head {
                        out.push_str(row);
                    }
                    out.push_str("</thead>");
                }
                out.push_str("<tbody>");
                for row in rows {
                    out.push_str(row);
                }
                out.push_str("</tbody></table>");
                out
            }
            Block::Raw { html } => html.clone(),
        }
    }

    /// The block's visible text, tags stripped and entities decoded.
    pub fn text_content(&self) -> String {
        text_content(&self.to_html())
    }
}

/// Parse an HTML fragment into top-level blocks.
///
/// Bare text between elements becomes a paragraph. Stray closing tags are
/// skipped. Unknown elements are kept verbatim as [`Block::Raw`].
pub fn parse_fragment(html: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut pos = 0usize;

    while pos < html.len() {
        match next_tag(html, pos) {
            Some(tag) => {
                let text = &html[pos..tag.start];
                if !text.trim().is_empty() {
                    blocks.push(Block::paragraph(text.trim()));
                }
                if tag.closing {
                    pos = tag.end;
                    continue;
                }
                if tag.self_closing || parser::is_void(&tag.name) {
                    blocks.push(Block::Raw {
                        html: html[tag.start..tag.end].to_string(),
                    });
                    pos = tag.end;
                    continue;
                }
                let (inner, element_end) = find_element_end(html, &tag);
                let block = match tag.name.as_str() {
                    "p" => Block::paragraph(inner.trim()),
                    "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => Block::Heading {
                        level: tag.name[1..].parse().unwrap_or(1),
                        html: inner.trim().to_string(),
                    },
                    "ul" | "ol" => Block::List {
                        ordered: tag.name == "ol",
                        items: parse_list_items(inner),
                    },
                    "table" => parse_table(inner),
                    _ => Block::Raw {
                        html: html[tag.start..element_end].to_string(),
                    },
                };
                blocks.push(block);
                pos = element_end;
            }
            None => {
                let text = &html[pos..];
                if !text.trim().is_empty() {
                    blocks.push(Block::paragraph(text.trim()));
                }
                break;
            }
        }
    }

    blocks
}

/// Collect the inner HTML of every top-level `<li>` in a list body.
fn parse_list_items(list_inner: &str) -> Vec<String> {
    collect_elements(list_inner, "li")
        .into_iter()
        .map(|(inner, _)| inner.trim().to_string())
        .collect()
}

/// Decompose a table body into header rows and data rows.
///
/// Rows inside `<thead>` are headers. Without a `<thead>`, a leading row
/// whose cells are all `<th>` is promoted to the header. Rows are kept as
/// complete `<tr>…</tr>` strings since the splitter re-emits them verbatim.
fn parse_table(table_inner: &str) -> Block {
    let mut head: Vec<String> = Vec::new();
    let mut rows: Vec<String> = Vec::new();

    let mut pos = 0usize;
    let mut saw_thead = false;
    while let Some(tag) = next_tag(table_inner, pos) {
        if tag.closing || tag.self_closing || parser::is_void(&tag.name) {
            pos = tag.end;
            continue;
        }
        match tag.name.as_str() {
            "thead" => {
                let (inner, element_end) = find_element_end(table_inner, &tag);
                for (_, whole) in collect_elements(inner, "tr") {
                    head.push(whole);
                }
                saw_thead = true;
                pos = element_end;
            }
            "tbody" | "tfoot" => {
                let (inner, element_end) = find_element_end(table_inner, &tag);
                for (_, whole) in collect_elements(inner, "tr") {
                    rows.push(whole);
                }
                pos = element_end;
            }
            "tr" => {
                let (_, element_end) = find_element_end(table_inner, &tag);
                rows.push(table_inner[tag.start..element_end].to_string());
                pos = element_end;
            }
            _ => {
                let (_, element_end) = find_element_end(table_inner, &tag);
                pos = element_end;
            }
        }
    }

    if !saw_thead && !rows.is_empty() && row_is_all_th(&rows[0]) {
        head.push(rows.remove(0));
    }

    Block::Table { head, rows }
}

fn row_is_all_th(row_html: &str) -> bool {
    let cells = row_cell_tags(row_html);
    !cells.is_empty() && cells.iter().all(|c| c == "th")
}

fn row_cell_tags(row_html: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut pos = 0usize;
    let mut depth = 0i32;
    while let Some(tag) = next_tag(row_html, pos) {
        match tag.name.as_str() {
            "td" | "th" if !tag.self_closing => {
                if tag.closing {
                    depth -= 1;
                } else {
                    if depth == 0 {
                        tags.push(tag.name.clone());
                    }
                    depth += 1;
                }
            }
            _ => {}
        }
        pos = tag.end;
    }
    tags
}

/// The inner HTML of each `<td>`/`<th>` cell of a row.
pub(crate) fn table_cells(row_html: &str) -> Vec<String> {
    let mut cells = Vec::new();
    for name in ["td", "th"] {
        for (inner, _) in collect_elements(row_html, name) {
            cells.push(inner.trim().to_string());
        }
    }
    cells
}

/// Collect every element named `name` at any depth of `html`, with proper
/// same-name nesting. Returns `(inner_html, whole_element)` pairs in
/// document order.
fn collect_elements(html: &str, name: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while let Some(tag) = next_tag(html, pos) {
        if !tag.closing && !tag.self_closing && tag.name == name {
            let (inner, element_end) = find_element_end(html, &tag);
            out.push((
                inner.to_string(),
                html[tag.start..element_end].to_string(),
            ));
            pos = element_end;
        } else {
            pos = tag.end;
        }
    }
    out
}

/// Strip tags and decode common entities, yielding the fragment's visible
/// text. Every tag is replaced by a single space so block boundaries never
/// glue words together; callers compare with [`collapse_ws`].
pub fn text_content(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let bytes = html.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            match html[i..].find('>') {
                Some(off) => {
                    out.push(' ');
                    i += off + 1;
                }
                None => break,
            }
        } else if bytes[i] == b'&' {
            let (decoded, len) = decode_entity(&html[i..]);
            out.push_str(decoded);
            i += len;
        } else {
            let ch = html[i..].chars().next().unwrap_or('\u{FFFD}');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

fn decode_entity(s: &str) -> (&str, usize) {
    const ENTITIES: &[(&str, &str)] = &[
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&apos;", "'"),
        ("&nbsp;", " "),
    ];
    for (entity, text) in ENTITIES {
        if s.starts_with(entity) {
            return (text, entity.len());
        }
    }
    ("&", 1)
}

/// Collapse all whitespace runs to single spaces and trim. The text
/// preservation invariant is stated modulo this normalization.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
