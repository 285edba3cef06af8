//! The editor view-model: one instance per open document.
//!
//! Owns the page array, the geometry, the probe, and the reflow orchestrator,
//! and exposes the operations a host UI drives: open, edit, poll, margin
//! drags, export, load/save. All state is mutated from a single thread; the
//! orchestrator's apply guard is the only synchronization this model needs.

use std::time::Instant;

use crate::measure::{HeightProbe, TextProbe};
use crate::model::{Capacity, Edges, Page, PageGeometry};
use crate::normalize::normalize;
use crate::reflow::{locate_offset, ReflowOrchestrator};
use crate::render::render_document;
use crate::store::DocumentStore;
use crate::{error::PageflowError, layout::split};

/// Whether pages fill against pixel capacity (document) or whole lines
/// (slides).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Document,
    Slides,
}

impl EditorMode {
    fn capacity(self, geometry: &PageGeometry) -> Capacity {
        match self {
            EditorMode::Document => Capacity::for_document(geometry),
            EditorMode::Slides => Capacity::for_slide(geometry),
        }
    }
}

/// A paginated, editable document.
pub struct Editor {
    pages: Vec<Page>,
    mode: EditorMode,
    probe: Box<dyn HeightProbe>,
    orchestrator: ReflowOrchestrator,
    caret: Option<usize>,
}

impl Editor {
    /// Normalize raw Markdown/HTML content and open it paginated.
    pub fn open(raw: &str, geometry: PageGeometry, mode: EditorMode) -> Self {
        Self::with_probe(raw, geometry, mode, Box::new(TextProbe::new()))
    }

    /// Open with a host-supplied measurement probe.
    pub fn with_probe(
        raw: &str,
        geometry: PageGeometry,
        mode: EditorMode,
        probe: Box<dyn HeightProbe>,
    ) -> Self {
        let capacity = mode.capacity(&geometry);
        let fragment = normalize(raw);
        let pages = split(&fragment, &geometry, capacity, probe.as_ref());
        let mut orchestrator = ReflowOrchestrator::new(geometry, capacity);
        orchestrator.reset(&pages);
        Self {
            pages,
            mode,
            probe,
            orchestrator,
            caret: None,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn geometry(&self) -> &PageGeometry {
        self.orchestrator.geometry()
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    /// The document's current content as one fragment, live edits included.
    pub fn content_html(&self) -> String {
        self.orchestrator.registry().combined_html()
    }

    /// Record a user edit to one page. The reflow itself happens later, on
    /// [`poll`](Self::poll) or [`flush`](Self::flush).
    pub fn on_edit(&mut self, page_index: usize, html: impl Into<String>, now: Instant) {
        self.orchestrator.on_edit(page_index, html, now);
    }

    /// Track the caret as a global character offset, for best-effort
    /// preservation across reflows.
    pub fn set_caret(&mut self, global_offset: usize) {
        self.caret = Some(global_offset);
    }

    /// The caret's `(page_index, offset_in_page)` against the current pages.
    pub fn caret_position(&self) -> Option<(usize, usize)> {
        self.caret.map(|offset| locate_offset(&self.pages, offset))
    }

    /// Run a pending reflow if its debounce window has passed. Returns true
    /// when the page array changed hands.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.orchestrator.poll(now, self.probe.as_ref()) {
            Some(pages) => {
                self.pages = pages;
                true
            }
            None => false,
        }
    }

    /// Force a pending reflow through immediately (e.g. before export).
    pub fn flush(&mut self) -> bool {
        match self.orchestrator.flush(self.probe.as_ref()) {
            Some(pages) => {
                self.pages = pages;
                true
            }
            None => false,
        }
    }

    /// Apply a ruler drag: margins are clamped, capacity recomputed, and the
    /// document reflowed immediately.
    pub fn set_margins(&mut self, margins: Edges) {
        self.pages = self
            .orchestrator
            .on_geometry_change(margins, self.probe.as_ref());
    }

    /// All pages rendered at their exact export boxes, ready for the
    /// external rasterizer.
    pub fn export_html(&self) -> String {
        render_document(&self.pages, self.orchestrator.geometry())
    }

    /// Replace this editor's content from the store. Cancels any pending
    /// reflow of the previous document.
    pub fn load(
        &mut self,
        store: &dyn DocumentStore,
        job_id: &str,
    ) -> Result<(), PageflowError> {
        let document = store.get(job_id)?;
        let fragment = normalize(&document.content);
        let geometry = *self.orchestrator.geometry();
        let capacity = self.mode.capacity(&geometry);
        self.pages = split(&fragment, &geometry, capacity, self.probe.as_ref());
        self.orchestrator.reset(&self.pages);
        self.caret = None;
        Ok(())
    }

    /// Persist the current content (live edits included) under `job_id`.
    pub fn save(
        &self,
        store: &mut dyn DocumentStore,
        job_id: &str,
    ) -> Result<(), PageflowError> {
        store.set(job_id, &self.content_html())
    }
}
