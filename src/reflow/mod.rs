//! # Reflow Orchestrator
//!
//! Re-runs the block splitter when content or geometry changes, and owns
//! everything that makes that safe: the debounce window, the reentrancy
//! guard, and cancellation when the document changes underneath a pending
//! reflow.
//!
//! The original relied on DOM mutation observers; here the trigger is an
//! explicit [`on_edit`](ReflowOrchestrator::on_edit) call from the host —
//! one trigger strategy, debounced, with no parallel on-blur path (running
//! both is how observer feedback loops start). Time is host-driven: callers
//! pass `Instant`s into `on_edit` and `poll`, which keeps the debounce logic
//! cooperative and deterministic under test.
//!
//! The single most safety-critical invariant lives here: while a reflow is
//! rewriting page contents, the host's own mutation notifications for those
//! writes must be suppressed, or the rewrite re-triggers itself forever.
//! Hosts bracket programmatic writes with [`begin_apply`]/[`end_apply`];
//! `on_edit` short-circuits in between.
//!
//! [`begin_apply`]: ReflowOrchestrator::begin_apply
//! [`end_apply`]: ReflowOrchestrator::end_apply

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::fragment::collapse_ws;
use crate::layout::split;
use crate::measure::HeightProbe;
use crate::model::{Capacity, Edges, Page, PageGeometry};
use crate::render::PageRegistry;

/// Default quiet period between the last edit and the reflow it triggers.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Drives re-splitting of live content. One orchestrator per open document;
/// torn down with the editor view.
#[derive(Debug)]
pub struct ReflowOrchestrator {
    registry: PageRegistry,
    geometry: PageGeometry,
    capacity: Capacity,
    debounce: Duration,
    dirty_at: Option<Instant>,
    generation: u64,
    applying: bool,
}

impl ReflowOrchestrator {
    pub fn new(geometry: PageGeometry, capacity: Capacity) -> Self {
        Self {
            registry: PageRegistry::new(),
            geometry,
            capacity,
            debounce: DEFAULT_DEBOUNCE,
            dirty_at: None,
            generation: 0,
            applying: false,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn registry(&self) -> &PageRegistry {
        &self.registry
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// Monotonic document generation. Bumped by [`reset`](Self::reset);
    /// a pending reflow from an earlier generation never fires.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_at.is_some()
    }

    pub fn is_applying(&self) -> bool {
        self.applying
    }

    /// Seed the registry with a freshly loaded document's pages, cancelling
    /// any reflow still pending for the previous document.
    pub fn reset(&mut self, pages: &[Page]) {
        self.generation += 1;
        self.dirty_at = None;
        self.registry.replace_all(pages);
        debug!(
            "reflow: reset to generation {} with {} page(s)",
            self.generation,
            pages.len()
        );
    }

    /// Record an edit to one page's live content. Returns `false` when the
    /// notification was suppressed because it was caused by the orchestrator's
    /// own page rewrite.
    pub fn on_edit(&mut self, page_index: usize, html: impl Into<String>, now: Instant) -> bool {
        if self.applying {
            trace!("reflow: edit on page {page_index} suppressed (rewrite in progress)");
            return false;
        }
        self.registry.register(page_index, html);
        self.dirty_at = Some(now);
        true
    }

    /// Mark the start of a programmatic rewrite of page contents. Host
    /// mutation notifications arriving before [`end_apply`](Self::end_apply)
    /// are dropped.
    pub fn begin_apply(&mut self) {
        self.applying = true;
    }

    pub fn end_apply(&mut self) {
        self.applying = false;
    }

    /// Run the reflow if the debounce window has elapsed since the last edit.
    pub fn poll(&mut self, now: Instant, probe: &dyn HeightProbe) -> Option<Vec<Page>> {
        let dirty_at = self.dirty_at?;
        if now.duration_since(dirty_at) < self.debounce {
            return None;
        }
        Some(self.reflow(probe))
    }

    /// Run a pending reflow immediately, ignoring the debounce window.
    pub fn flush(&mut self, probe: &dyn HeightProbe) -> Option<Vec<Page>> {
        self.dirty_at?;
        Some(self.reflow(probe))
    }

    /// Apply a margin change: clamp, recompute capacity for the active unit,
    /// and reflow immediately — geometry changes are deliberate gestures, not
    /// keystrokes, so they skip the debounce.
    pub fn on_geometry_change(&mut self, margins: Edges, probe: &dyn HeightProbe) -> Vec<Page> {
        self.geometry.set_margins(margins);
        self.capacity = match self.capacity {
            Capacity::Pixels(_) => Capacity::for_document(&self.geometry),
            Capacity::Lines(_) => Capacity::for_slide(&self.geometry),
        };
        self.reflow(probe)
    }

    fn reflow(&mut self, probe: &dyn HeightProbe) -> Vec<Page> {
        self.begin_apply();
        self.dirty_at = None;

        // Source of truth: what the user currently sees, in page order.
        let combined = self.registry.combined_html();
        let pages = split(&combined, &self.geometry, self.capacity, probe);
        let pages = drop_blank_pages(pages);

        self.registry.replace_all(&pages);
        self.end_apply();

        debug!("reflow: re-split into {} page(s)", pages.len());
        pages
    }
}

/// Remove pages whose trimmed text is empty and re-index the survivors
/// contiguously from 0. A fully empty document keeps its single blank page.
fn drop_blank_pages(pages: Vec<Page>) -> Vec<Page> {
    let mut kept: Vec<Page> = pages.into_iter().filter(|p| !p.is_blank()).collect();
    if kept.is_empty() {
        return vec![Page::new(0, "<p></p>")];
    }
    for (i, page) in kept.iter_mut().enumerate() {
        page.index = i;
    }
    kept
}

/// Best-effort caret preservation: map a global character offset (over the
/// whitespace-collapsed text of all pages) to `(page_index, offset_in_page)`.
/// Offsets past the end clamp to the last page's end; this never panics and
/// never loses the edit that moved the caret.
pub fn locate_offset(pages: &[Page], global_offset: usize) -> (usize, usize) {
    let mut remaining = global_offset;
    for page in pages {
        let len = collapse_ws(&page.text_content()).chars().count();
        if remaining <= len {
            return (page.index, remaining);
        }
        remaining -= len;
    }
    match pages.last() {
        Some(last) => {
            let len = collapse_ws(&last.text_content()).chars().count();
            (last.index, len)
        }
        None => (0, 0),
    }
}
