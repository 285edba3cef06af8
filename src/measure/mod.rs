//! # Height Measurement Probe
//!
//! The splitter never guesses how tall content is — it asks a probe. In the
//! browser original this is a cloned node mounted off-screen; here it is the
//! [`HeightProbe`] trait, the one deliberate platform seam in the crate. The
//! bundled [`TextProbe`] reproduces line-wrapping arithmetic deterministically
//! from UAX#14 break opportunities and Unicode column widths; a host with a
//! real layout engine can substitute its own measurements behind the same
//! trait.
//!
//! Probes are pure: identical inputs must return identical heights. The
//! splitter's output (and the test suite) depend on that.

use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_width::UnicodeWidthStr;

use crate::fragment::{self, collapse_ws, Block};

/// Rendered line height of body text, in pixels.
///
/// Single source of truth: the renderer emits this exact value into page
/// CSS, and [`lines_for_height`] converts pixel heights to line units with
/// it. If the two ever diverge, pages silently under- or over-fill — the
/// drift fixture test in `render` pins them together.
pub const LINE_HEIGHT_PX: f64 = 24.0;

/// Average glyph advance of the body font at its rendered size.
pub const CHAR_WIDTH_PX: f64 = 8.0;

/// Vertical spacing charged to each paragraph-level block.
pub const PARAGRAPH_SPACING_PX: f64 = 8.0;

/// Horizontal inset of list item content.
pub const LIST_INDENT_PX: f64 = 32.0;

/// Vertical padding charged per table row.
pub const CELL_PADDING_PX: f64 = 8.0;

/// Below this many line-equivalents of remaining capacity, a paragraph is
/// moved whole instead of being sentence-split.
pub const MIN_SPLIT_LINES: u32 = 3;

/// Convert a pixel height to whole line units, rounding up.
pub fn lines_for_height(height_px: f64) -> u32 {
    (height_px / LINE_HEIGHT_PX).ceil().max(1.0) as u32
}

fn heading_scale(level: u8) -> f64 {
    match level {
        1 => 2.0,
        2 => 1.6,
        3 => 1.3,
        _ => 1.15,
    }
}

/// Measures rendered heights of content at a given content width.
///
/// Only [`text_height`](HeightProbe::text_height) is required; the per-block
/// methods have defaults that compose it with the crate's spacing constants.
/// Test probes typically override the per-kind methods directly to pin exact
/// costs.
pub trait HeightProbe {
    /// Height in pixels of a run of (possibly marked-up) text wrapped at
    /// `width_px`.
    fn text_height(&self, text: &str, width_px: f64) -> f64;

    /// Height of one list item, indented from the content edge.
    fn list_item_height(&self, item_html: &str, width_px: f64) -> f64 {
        self.text_height(item_html, (width_px - LIST_INDENT_PX).max(CHAR_WIDTH_PX))
    }

    /// Height of one table row: the tallest cell, wrapped at its column
    /// width, plus cell padding. Rows are never assumed to cost one line.
    fn table_row_height(&self, row_html: &str, width_px: f64) -> f64 {
        let cells = fragment::table_cells(row_html);
        if cells.is_empty() {
            return LINE_HEIGHT_PX + 2.0 * CELL_PADDING_PX;
        }
        let col_width =
            (width_px / cells.len() as f64 - 2.0 * CELL_PADDING_PX).max(CHAR_WIDTH_PX);
        let tallest = cells
            .iter()
            .map(|cell| self.text_height(cell, col_width))
            .fold(0.0f64, f64::max);
        tallest + 2.0 * CELL_PADDING_PX
    }

    /// Height of a whole top-level block.
    fn block_height(&self, block: &Block, width_px: f64) -> f64 {
        match block {
            Block::Paragraph { html } => self.text_height(html, width_px) + PARAGRAPH_SPACING_PX,
            Block::Heading { level, html } => {
                let scale = heading_scale(*level);
                self.text_height(html, width_px / scale) * scale + PARAGRAPH_SPACING_PX
            }
            Block::List { items, .. } => {
                items
                    .iter()
                    .map(|item| self.list_item_height(item, width_px))
                    .sum::<f64>()
                    + PARAGRAPH_SPACING_PX
            }
            Block::Table { head, rows } => head
                .iter()
                .chain(rows.iter())
                .map(|row| self.table_row_height(row, width_px))
                .sum(),
            Block::Raw { html } => {
                self.text_height(html, width_px).max(LINE_HEIGHT_PX) + PARAGRAPH_SPACING_PX
            }
        }
    }
}

/// The default probe: deterministic text-metrics measurement.
///
/// Tags are stripped, whitespace collapsed, then the text is greedily wrapped
/// at UAX#14 break opportunities using Unicode column counts times the
/// average advance. An unbreakable run longer than the line hard-wraps, as a
/// browser would with `overflow-wrap`.
#[derive(Debug, Clone)]
pub struct TextProbe {
    char_width_px: f64,
}

impl TextProbe {
    pub fn new() -> Self {
        Self {
            char_width_px: CHAR_WIDTH_PX,
        }
    }

    /// Number of wrapped lines `text` occupies at `width_px`.
    pub fn wrapped_lines(&self, text: &str, width_px: f64) -> usize {
        let text = collapse_ws(&fragment::text_content(text));
        if text.is_empty() {
            return 1;
        }
        let max = width_px.max(self.char_width_px);
        let mut lines = 1usize;
        let mut cur = 0.0f64;
        let mut prev = 0usize;
        for (off, opportunity) in linebreaks(&text) {
            let seg = &text[prev..off];
            let seg_w = UnicodeWidthStr::width(seg) as f64 * self.char_width_px;
            if cur > 0.0 && cur + seg_w > max {
                lines += 1;
                cur = 0.0;
            }
            // A segment wider than the line consumes whole lines of its own.
            let full = ((seg_w / max).ceil().max(1.0) - 1.0).max(0.0);
            lines += full as usize;
            cur += seg_w - full * max;
            if opportunity == BreakOpportunity::Mandatory && off < text.len() {
                lines += 1;
                cur = 0.0;
            }
            prev = off;
        }
        lines
    }
}

impl Default for TextProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HeightProbe for TextProbe {
    fn text_height(&self, text: &str, width_px: f64) -> f64 {
        self.wrapped_lines(text, width_px) as f64 * LINE_HEIGHT_PX
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_is_deterministic() {
        let probe = TextProbe::new();
        let text = "The quick brown fox jumps over the lazy dog, twice in a row.";
        let a = probe.text_height(text, 320.0);
        let b = probe.text_height(text, 320.0);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_text_costs_one_line() {
        let probe = TextProbe::new();
        assert_eq!(probe.text_height("", 400.0), LINE_HEIGHT_PX);
        assert_eq!(probe.text_height("<p></p>", 400.0), LINE_HEIGHT_PX);
    }

    #[test]
    fn narrower_width_never_measures_shorter() {
        let probe = TextProbe::new();
        let text = "a reasonably long sentence that wraps a few times at narrow widths";
        let wide = probe.text_height(text, 800.0);
        let narrow = probe.text_height(text, 200.0);
        assert!(narrow >= wide);
    }

    #[test]
    fn single_fitting_line_costs_one_line() {
        let probe = TextProbe::new();
        // 5 columns * 8px = 40px, well under the width.
        assert_eq!(probe.wrapped_lines("hello", 400.0), 1);
    }

    #[test]
    fn long_unbreakable_word_hard_wraps() {
        let probe = TextProbe::new();
        // 40 columns * 8px = 320px at an 80px line: 4 lines.
        let word = "x".repeat(40);
        assert_eq!(probe.wrapped_lines(&word, 80.0), 4);
    }

    #[test]
    fn tags_do_not_add_width() {
        let probe = TextProbe::new();
        let plain = probe.wrapped_lines("bold words here", 400.0);
        let marked = probe.wrapped_lines("<strong>bold</strong> words here", 400.0);
        assert_eq!(plain, marked);
    }

    #[test]
    fn table_row_height_tracks_tallest_cell() {
        let probe = TextProbe::new();
        let short = probe.table_row_height("<tr><td>a</td><td>b</td></tr>", 400.0);
        let tall = probe.table_row_height(
            "<tr><td>a</td><td>a cell with enough text that it wraps onto several lines at this width</td></tr>",
            400.0,
        );
        assert!(tall > short);
    }

    #[test]
    fn line_conversion_rounds_up() {
        assert_eq!(lines_for_height(LINE_HEIGHT_PX), 1);
        assert_eq!(lines_for_height(LINE_HEIGHT_PX + 0.1), 2);
        assert_eq!(lines_for_height(0.0), 1);
    }
}
