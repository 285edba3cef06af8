//! # Pageflow
//!
//! A page-native pagination and reflow engine for rich-text reports.
//!
//! Browser editors that fake a word processor usually render content onto
//! one long scroll and slice it visually. The slices lie: tables break
//! mid-row with their headers gone, lists shear in half, and exports never
//! match the screen. Pageflow does the opposite: **the page is the
//! fundamental unit.** Content flows *into* fixed-size pages — every fit
//! decision is made against the page boundary, with tables re-opening under
//! a repeated header and paragraphs splitting at sentence boundaries.
//!
//! ## Architecture
//!
//! ```text
//! Raw content (Markdown / escaped HTML)
//!       ↓
//!  [normalize]  — unescape, render Markdown, sanitize to an allow-list
//!       ↓
//!  [fragment]   — lift the fragment into block-level structure
//!       ↓
//!  [layout]     — split blocks into pages, probing [measure] for heights
//!       ↓
//!  [render]     — fixed-pixel page containers for editing and export
//!       ↕
//!  [reflow]     — debounced re-split when the user edits or drags margins
//! ```
//!
//! Measurement is the one platform seam: the splitter asks a
//! [`measure::HeightProbe`] how tall content renders, and the bundled
//! [`measure::TextProbe`] answers deterministically from text metrics. A
//! host embedded in a real layout engine substitutes its own probe.

pub mod editor;
pub mod error;
pub mod fragment;
pub mod layout;
pub mod measure;
pub mod model;
pub mod normalize;
pub mod reflow;
pub mod render;
pub mod store;

pub use editor::{Editor, EditorMode};
pub use error::PageflowError;
pub use measure::{HeightProbe, TextProbe};
pub use model::{Capacity, Edges, Page, PageGeometry};

use layout::split;
use normalize::normalize;

/// Paginate raw content into document pages (A4-style pixel capacity).
///
/// The primary one-shot entry point: normalize, then split with the default
/// text probe. For live editing, use [`Editor`] instead.
pub fn paginate(raw: &str, geometry: &PageGeometry) -> Vec<Page> {
    let probe = TextProbe::new();
    let fragment = normalize(raw);
    split(
        &fragment,
        geometry,
        Capacity::for_document(geometry),
        &probe,
    )
}

/// Paginate raw content into slides (whole-line capacity).
pub fn paginate_slides(raw: &str, geometry: &PageGeometry) -> Vec<Page> {
    let probe = TextProbe::new();
    let fragment = normalize(raw);
    split(&fragment, geometry, Capacity::for_slide(geometry), &probe)
}

/// Paginate content the caller guarantees is Markdown.
pub fn paginate_markdown(raw: &str, geometry: &PageGeometry) -> Vec<Page> {
    let probe = TextProbe::new();
    let fragment = normalize::normalize_markdown(raw);
    split(
        &fragment,
        geometry,
        Capacity::for_document(geometry),
        &probe,
    )
}
