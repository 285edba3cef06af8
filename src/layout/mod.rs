//! # Page-Aware Block Splitter
//!
//! This is the heart of pageflow and the reason it exists.
//!
//! Content is never laid onto an infinite canvas and sliced afterwards. The
//! splitter walks the fragment's top-level blocks in document order, asks the
//! height probe what each one costs, and flows it into pages with the page
//! boundary as a hard constraint:
//!
//! 1. Open a page with a known capacity and remaining budget
//! 2. Before placing a block, ask: "does this fit?"
//! 3. If it fits: place it, reduce the budget
//! 4. If it doesn't and is atomic (heading, unknown block): flush the page,
//!    place it on a fresh one
//! 5. If it doesn't and is splittable: place the prefix that fits — sentences
//!    for paragraphs, items for lists, rows for tables — and continue on a
//!    new page
//! 6. For tables: every continuation page re-opens the table with the same
//!    `<thead>`, so a header never silently disappears mid-table
//!
//! The splitter is a pure function of `(fragment, geometry, capacity)` for a
//! fixed probe: same inputs, same page array, every time. It owns no state
//! between calls and always returns at least one page.

pub mod page_break;

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::fragment::{parse_fragment, Block};
use crate::measure::{
    lines_for_height, HeightProbe, LINE_HEIGHT_PX, MIN_SPLIT_LINES, PARAGRAPH_SPACING_PX,
};
use crate::model::{Capacity, Page, PageGeometry};
use page_break::{decide_split, SplitDecision};

/// Split a content fragment into pages.
///
/// Total and deterministic: malformed HTML degrades to atomic blocks, empty
/// input yields a single page holding an empty paragraph, and a lone block
/// larger than a whole page gets its own (overflowing) page rather than an
/// error.
pub fn split(
    fragment: &str,
    geometry: &PageGeometry,
    capacity: Capacity,
    probe: &dyn HeightProbe,
) -> Vec<Page> {
    let blocks = parse_fragment(fragment);
    let mut splitter = Splitter::new(geometry, capacity, probe);
    let mut pages = Vec::new();

    for block in &blocks {
        match block {
            Block::Paragraph { html } => splitter.place_paragraph(html, &mut pages),
            Block::List { ordered, items } => splitter.place_list(*ordered, items, &mut pages),
            Block::Table { head, rows } => splitter.place_table(head, rows, &mut pages),
            // Headings and unknown blocks are atomic: never split internally.
            Block::Heading { .. } | Block::Raw { .. } => splitter.place_atomic(block, &mut pages),
        }
    }

    if !splitter.cursor.is_empty() {
        splitter.flush(&mut pages);
    }
    if pages.is_empty() {
        pages.push(Page::new(0, "<p></p>"));
    }

    debug!(
        "split: {} block(s) into {} page(s) at {:?}",
        blocks.len(),
        pages.len(),
        capacity
    );
    pages
}

/// Accumulates the HTML and consumed capacity of the page being filled.
#[derive(Debug, Default)]
struct PageCursor {
    html: String,
    used: f64,
}

impl PageCursor {
    fn push(&mut self, html: &str, cost: f64) {
        self.html.push_str(html);
        self.used += cost;
    }

    fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

struct Splitter<'a> {
    probe: &'a dyn HeightProbe,
    width: f64,
    /// Page budget in capacity units (pixels or lines).
    limit: f64,
    line_units: bool,
    cursor: PageCursor,
}

impl<'a> Splitter<'a> {
    fn new(geometry: &PageGeometry, capacity: Capacity, probe: &'a dyn HeightProbe) -> Self {
        let (limit, line_units) = match capacity {
            Capacity::Pixels(px) => (px, false),
            Capacity::Lines(n) => (n as f64, true),
        };
        Self {
            probe,
            width: geometry.content_width(),
            limit,
            line_units,
            cursor: PageCursor::default(),
        }
    }

    /// Convert a measured pixel height into this splitter's capacity unit.
    /// The unit is fixed at construction; pixels and lines never mix.
    fn cost(&self, height_px: f64) -> f64 {
        if self.line_units {
            lines_for_height(height_px) as f64
        } else {
            height_px
        }
    }

    fn remaining(&self) -> f64 {
        self.limit - self.cursor.used
    }

    fn min_usable(&self) -> f64 {
        if self.line_units {
            MIN_SPLIT_LINES as f64
        } else {
            MIN_SPLIT_LINES as f64 * LINE_HEIGHT_PX
        }
    }

    fn flush(&mut self, pages: &mut Vec<Page>) {
        let html = std::mem::take(&mut self.cursor.html);
        pages.push(Page::new(pages.len(), html));
        self.cursor.used = 0.0;
    }

    /// Place a block that is never split internally. If it doesn't fit the
    /// remainder, it opens a new page — even when it overflows a whole page
    /// by itself (graceful degradation, never an error).
    fn place_atomic(&mut self, block: &Block, pages: &mut Vec<Page>) {
        let cost = self.cost(self.probe.block_height(block, self.width));
        match decide_split(self.remaining(), &[cost], false, 0.0) {
            SplitDecision::Fits => self.cursor.push(&block.to_html(), cost),
            _ => {
                if !self.cursor.is_empty() {
                    self.flush(pages);
                }
                self.cursor.push(&block.to_html(), cost);
            }
        }
    }

    fn place_paragraph(&mut self, html: &str, pages: &mut Vec<Page>) {
        let mut text = html.to_string();
        loop {
            let block = Block::paragraph(text.clone());
            let whole = self.cost(self.probe.block_height(&block, self.width));
            if whole <= self.remaining() {
                self.cursor.push(&block.to_html(), whole);
                return;
            }

            let boundaries = sentence_boundaries(&text);
            // Too little room to be worth splitting into, or nothing to
            // split at: move the paragraph whole.
            if self.remaining() < self.min_usable() || boundaries.len() <= 1 {
                if self.cursor.is_empty() {
                    self.cursor.push(&block.to_html(), whole);
                    self.flush(pages);
                    return;
                }
                self.flush(pages);
                continue;
            }

            // Greedily pack sentences, re-measuring the partial text after
            // each boundary (wrap interactions make per-sentence costs
            // non-additive).
            let mut fit_end = 0usize;
            let mut fit_cost = 0.0;
            for &b in &boundaries {
                let prefix = text[..b].trim_end();
                let cost =
                    self.cost(self.probe.text_height(prefix, self.width) + PARAGRAPH_SPACING_PX);
                if cost <= self.remaining() {
                    fit_end = b;
                    fit_cost = cost;
                } else {
                    break;
                }
            }

            if fit_end == 0 {
                if self.cursor.is_empty() {
                    // Even the first sentence overflows an empty page:
                    // place it alone and carry on.
                    let b = boundaries[0];
                    let head = text[..b].trim_end().to_string();
                    let cost = self
                        .cost(self.probe.text_height(&head, self.width) + PARAGRAPH_SPACING_PX);
                    self.cursor.push(&format!("<p>{head}</p>"), cost);
                    self.flush(pages);
                    text = text[b..].trim_start().to_string();
                    if text.is_empty() {
                        return;
                    }
                    continue;
                }
                self.flush(pages);
                continue;
            }

            let prefix = text[..fit_end].trim_end();
            self.cursor.push(&format!("<p>{prefix}</p>"), fit_cost);
            self.flush(pages);
            text = text[fit_end..].trim_start().to_string();
            if text.is_empty() {
                return;
            }
        }
    }

    fn place_list(&mut self, ordered: bool, items: &[String], pages: &mut Vec<Page>) {
        if items.is_empty() {
            return;
        }
        let costs: Vec<f64> = items
            .iter()
            .map(|item| self.cost(self.probe.list_item_height(item, self.width)))
            .collect();

        let mut idx = 0usize;
        while idx < items.len() {
            match decide_split(self.remaining(), &costs[idx..], true, 0.0) {
                SplitDecision::Fits => {
                    let chunk: f64 = costs[idx..].iter().sum();
                    self.cursor.push(&list_html(ordered, &items[idx..]), chunk);
                    return;
                }
                SplitDecision::OverflowsPartial {
                    items_on_current_page: n,
                } => {
                    let chunk: f64 = costs[idx..idx + n].iter().sum();
                    self.cursor
                        .push(&list_html(ordered, &items[idx..idx + n]), chunk);
                    self.flush(pages);
                    idx += n;
                }
                SplitDecision::OverflowsWhole => {
                    if self.cursor.is_empty() {
                        // A single item taller than the page: own page.
                        self.cursor
                            .push(&list_html(ordered, &items[idx..idx + 1]), costs[idx]);
                        self.flush(pages);
                        idx += 1;
                    } else {
                        self.flush(pages);
                    }
                }
            }
        }
    }

    fn place_table(&mut self, head: &[String], rows: &[String], pages: &mut Vec<Page>) {
        let header_cost: f64 = head
            .iter()
            .map(|row| self.cost(self.probe.table_row_height(row, self.width)))
            .sum();

        if rows.is_empty() {
            if !head.is_empty() {
                let block = Block::Table {
                    head: head.to_vec(),
                    rows: vec![],
                };
                self.place_atomic(&block, pages);
            }
            return;
        }

        let costs: Vec<f64> = rows
            .iter()
            .map(|row| self.cost(self.probe.table_row_height(row, self.width)))
            .collect();

        let mut idx = 0usize;
        while idx < rows.len() {
            // Every chunk pays for the repeated header before its rows.
            let remaining = (self.remaining() - header_cost).max(0.0);
            match decide_split(remaining, &costs[idx..], true, 0.0) {
                SplitDecision::Fits => {
                    let chunk: f64 = header_cost + costs[idx..].iter().sum::<f64>();
                    self.cursor.push(&table_html(head, &rows[idx..]), chunk);
                    return;
                }
                SplitDecision::OverflowsPartial {
                    items_on_current_page: n,
                } => {
                    let chunk: f64 = header_cost + costs[idx..idx + n].iter().sum::<f64>();
                    self.cursor
                        .push(&table_html(head, &rows[idx..idx + n]), chunk);
                    self.flush(pages);
                    idx += n;
                }
                SplitDecision::OverflowsWhole => {
                    if self.cursor.is_empty() {
                        // Header plus one row exceeds a whole page: place the
                        // pair alone and let it overflow.
                        let chunk = header_cost + costs[idx];
                        self.cursor
                            .push(&table_html(head, &rows[idx..idx + 1]), chunk);
                        self.flush(pages);
                        idx += 1;
                    } else {
                        self.flush(pages);
                    }
                }
            }
        }
    }
}

fn list_html(ordered: bool, items: &[String]) -> String {
    Block::List {
        ordered,
        items: items.to_vec(),
    }
    .to_html()
}

fn table_html(head: &[String], rows: &[String]) -> String {
    Block::Table {
        head: head.to_vec(),
        rows: rows.to_vec(),
    }
    .to_html()
}

/// Byte offsets of sentence boundaries in `text`: after each `.`/`!`/`?`
/// run followed by whitespace, plus the end of the text.
fn sentence_boundaries(text: &str) -> Vec<usize> {
    static SENTENCE_RE: OnceLock<Regex> = OnceLock::new();
    let re = SENTENCE_RE.get_or_init(|| Regex::new(r"[.!?]+\s+").unwrap());

    let mut boundaries: Vec<usize> = re.find_iter(text).map(|m| m.end()).collect();
    if boundaries.last().copied() != Some(text.len()) {
        boundaries.push(text.len());
    }
    boundaries
}
