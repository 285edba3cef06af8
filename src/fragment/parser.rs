//! Low-level tag tokenizer shared by the fragment parser and the HTML
//! cleaner. Case-insensitive, quote-aware, comment- and doctype-skipping.
//! Malformed markup never panics; the scanner just moves past it.

/// One scanned tag. `start` is the byte offset of `<`, `end` the offset
/// just past `>`.
#[derive(Debug, Clone)]
pub(crate) struct Tag {
    pub name: String,
    pub closing: bool,
    pub self_closing: bool,
    pub start: usize,
    pub end: usize,
}

/// HTML void elements: never have a closing tag.
pub(crate) fn is_void(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Scan for the next tag at or after `from`. Comments and `<!…>` declarations
/// are skipped entirely; a stray `<` that opens no tag is treated as text.
pub(crate) fn next_tag(s: &str, from: usize) -> Option<Tag> {
    let bytes = s.as_bytes();
    let mut i = from;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        // Comment: skip to the terminator, or to the end if unterminated.
        if s[i..].starts_with("<!--") {
            i = match s[i..].find("-->") {
                Some(off) => i + off + 3,
                None => bytes.len(),
            };
            continue;
        }
        // Doctype / declaration.
        if s[i..].starts_with("<!") {
            i = match s[i..].find('>') {
                Some(off) => i + off + 1,
                None => bytes.len(),
            };
            continue;
        }

        let mut j = i + 1;
        let closing = j < bytes.len() && bytes[j] == b'/';
        if closing {
            j += 1;
        }
        let name_start = j;
        while j < bytes.len() && (bytes[j].is_ascii_alphanumeric()) {
            j += 1;
        }
        if j == name_start {
            // `<` not followed by a tag name: literal text.
            i += 1;
            continue;
        }
        let name = s[name_start..j].to_ascii_lowercase();

        // Advance to the closing `>`, honoring quoted attribute values.
        let mut quote: Option<u8> = None;
        while j < bytes.len() {
            let b = bytes[j];
            match quote {
                Some(q) => {
                    if b == q {
                        quote = None;
                    }
                }
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'>' => break,
                    _ => {}
                },
            }
            j += 1;
        }
        if j >= bytes.len() {
            // Unterminated tag: nothing more to scan.
            return None;
        }
        let self_closing = j > i && bytes[j - 1] == b'/';
        return Some(Tag {
            name,
            closing,
            self_closing,
            start: i,
            end: j + 1,
        });
    }

    None
}

/// Given an opening tag, find the matching close, counting same-name
/// nesting. Returns the inner HTML and the byte offset just past the
/// closing tag. An unclosed element runs to the end of the input.
pub(crate) fn find_element_end<'a>(s: &'a str, open: &Tag) -> (&'a str, usize) {
    if open.self_closing || is_void(&open.name) {
        return ("", open.end);
    }
    let mut depth = 1i32;
    let mut pos = open.end;
    while let Some(tag) = next_tag(s, pos) {
        if tag.name == open.name {
            if tag.closing {
                depth -= 1;
                if depth == 0 {
                    return (&s[open.end..tag.start], tag.end);
                }
            } else if !tag.self_closing && !is_void(&tag.name) {
                depth += 1;
            }
        }
        pos = tag.end;
    }
    (&s[open.end..], s.len())
}
