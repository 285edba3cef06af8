//! # Page/Slide Renderer
//!
//! Produces the fixed-dimension page containers the host mounts and the
//! external rasterizer captures. The contract toward the exporter is strict:
//! each container carries a stable id (`page-{index}`) and exactly the pixel
//! box of the target format, because the per-page capture is pixel-accurate.
//!
//! Also owns the [`PageRegistry`]: the explicit register/unregister registry
//! of live page content, replacing the original's persistent map of detached
//! DOM nodes. The reflow orchestrator reads its concatenation as the source
//! of truth for re-splitting.

use std::collections::BTreeMap;

use crate::measure::LINE_HEIGHT_PX;
use crate::model::{Page, PageGeometry};

/// Stable container id for the export capture of page `index`.
pub fn page_container_id(index: usize) -> String {
    format!("page-{index}")
}

/// Render one page at its exact pixel box, content inset by the margins.
///
/// The emitted `line-height` comes from [`LINE_HEIGHT_PX`] — the same
/// constant the measurement probe converts with. Emitting it here (rather
/// than duplicating a literal) is what keeps measurement and rendering from
/// drifting apart.
pub fn render_page(page: &Page, geometry: &PageGeometry) -> String {
    let m = &geometry.margin;
    format!(
        "<div class=\"pf-page\" id=\"{id}\" style=\"position:relative;\
width:{w}px;height:{h}px;background:#ffffff;overflow:hidden;\">\
<div class=\"pf-page-content\" contenteditable=\"true\" style=\"position:absolute;\
top:{mt}px;right:{mr}px;bottom:{mb}px;left:{ml}px;\
line-height:{lh}px;overflow-wrap:break-word;\">{content}</div></div>",
        id = page_container_id(page.index),
        w = geometry.width_px,
        h = geometry.height_px,
        mt = m.top,
        mr = m.right,
        mb = m.bottom,
        ml = m.left,
        lh = LINE_HEIGHT_PX,
        content = page.html,
    )
}

/// Render the full page array, in order, ready for export capture.
pub fn render_document(pages: &[Page], geometry: &PageGeometry) -> String {
    pages
        .iter()
        .map(|page| render_page(page, geometry))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The live-content registry: one slot per mounted page, keyed by index.
///
/// Hosts register a page's content on mount, update it on edit, and must
/// unregister on unmount — a slot left behind would feed stale content into
/// the next reflow.
#[derive(Debug, Default)]
pub struct PageRegistry {
    slots: BTreeMap<usize, String>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, index: usize, html: impl Into<String>) {
        self.slots.insert(index, html.into());
    }

    pub fn unregister(&mut self, index: usize) {
        self.slots.remove(&index);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Concatenate the CURRENT content of all registered pages in index
    /// order. This, not the last-saved page array, is what reflow re-splits.
    pub fn combined_html(&self) -> String {
        self.slots.values().cloned().collect()
    }

    /// Replace every slot with a freshly split page array.
    pub fn replace_all(&mut self, pages: &[Page]) {
        self.slots.clear();
        for page in pages {
            self.slots.insert(page.index, page.html.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_matches_export_box_exactly() {
        let geometry = PageGeometry::a4_portrait();
        let html = render_page(&Page::new(3, "<p>x</p>"), &geometry);
        assert!(html.contains("id=\"page-3\""));
        assert!(html.contains("width:1545px"));
        assert!(html.contains("height:2000px"));
    }

    #[test]
    fn emitted_line_height_matches_probe_constant() {
        // Drift between the CSS line-height and the measurement constant is
        // the silent page-fill defect class; pin them together.
        let geometry = PageGeometry::slide_16x9();
        let html = render_page(&Page::new(0, ""), &geometry);
        assert!(html.contains(&format!("line-height:{}px", LINE_HEIGHT_PX)));
    }

    #[test]
    fn registry_concatenates_in_index_order() {
        let mut registry = PageRegistry::new();
        registry.register(1, "<p>second</p>");
        registry.register(0, "<p>first</p>");
        assert_eq!(registry.combined_html(), "<p>first</p><p>second</p>");
    }

    #[test]
    fn unregister_removes_the_slot() {
        let mut registry = PageRegistry::new();
        registry.register(0, "<p>a</p>");
        registry.register(1, "<p>b</p>");
        registry.unregister(0);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.combined_html(), "<p>b</p>");
    }
}
