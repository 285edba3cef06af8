//! # Page Model
//!
//! The data types shared across the engine: pages, page geometry, and the
//! capacity unit the splitter fills against. These are designed to be easy
//! to hand to a host UI or serialize straight to JSON — the page array IS
//! the editor's document state.
//!
//! **Page** is the fundamental unit here. A document is never an infinite
//! scroll of content; it is an ordered, contiguous array of fixed-size
//! pages, each holding one HTML fragment.

use serde::{Deserialize, Serialize};

use crate::measure::LINE_HEIGHT_PX;

/// One fixed-size visual page (or slide) holding a contiguous slice of the
/// document's content.
///
/// Invariants maintained by the splitter and the reflow orchestrator:
/// indices are 0-based and contiguous, and no page has empty text content
/// unless it is the sole page of an empty document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Ordinal position, 0-based, no gaps.
    pub index: usize,
    /// Sanitized HTML fragment: one or more block-level elements, never a
    /// document wrapper.
    pub html: String,
}

impl Page {
    pub fn new(index: usize, html: impl Into<String>) -> Self {
        Self {
            index,
            html: html.into(),
        }
    }

    /// The page's visible text, tags stripped.
    pub fn text_content(&self) -> String {
        crate::fragment::text_content(&self.html)
    }

    /// True when the page holds no visible text at all.
    pub fn is_blank(&self) -> bool {
        self.text_content().trim().is_empty()
    }
}

/// Edge values (top, right, bottom, left), used for page margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Minimum usable content extent on each axis. Margin clamping never lets
/// opposing margins close the content area below this.
pub const MIN_CONTENT_PX: f64 = 100.0;

/// The fixed pixel box of a page plus its margins.
///
/// Dimensions match the export formats exactly (the external rasterizer
/// captures each page container by id, so the box must be pixel-accurate).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width_px: f64,
    pub height_px: f64,
    pub margin: Edges,
}

impl PageGeometry {
    /// A4 portrait document page: 1545×2000 px.
    pub fn a4_portrait() -> Self {
        Self {
            width_px: 1545.0,
            height_px: 2000.0,
            margin: Edges::uniform(96.0),
        }
    }

    /// 16:9 slide: 1280×720 px.
    pub fn slide_16x9() -> Self {
        Self {
            width_px: 1280.0,
            height_px: 720.0,
            margin: Edges::symmetric(48.0, 64.0),
        }
    }

    /// Width available to content, margins excluded. Always ≥ [`MIN_CONTENT_PX`]
    /// after clamping.
    pub fn content_width(&self) -> f64 {
        self.width_px - self.margin.horizontal()
    }

    /// Height available to content, margins excluded.
    pub fn content_height(&self) -> f64 {
        self.height_px - self.margin.vertical()
    }

    /// Replace the margins, clamping so opposing margins cannot cross.
    ///
    /// When a requested pair would shrink the content area below
    /// [`MIN_CONTENT_PX`], the far-side margin keeps its old value and the
    /// near side takes whatever room is left. Ruler drags therefore always
    /// land on a geometry the splitter can fill.
    pub fn set_margins(&mut self, requested: Edges) {
        self.margin.left = clamp_axis(requested.left, self.margin.right, self.width_px);
        self.margin.right = clamp_axis(requested.right, self.margin.left, self.width_px);
        self.margin.top = clamp_axis(requested.top, self.margin.bottom, self.height_px);
        self.margin.bottom = clamp_axis(requested.bottom, self.margin.top, self.height_px);
    }
}

fn clamp_axis(near: f64, far: f64, extent: f64) -> f64 {
    let max_near = (extent - far - MIN_CONTENT_PX).max(0.0);
    near.clamp(0.0, max_near)
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4_portrait()
    }
}

/// The unit a page's capacity is expressed in.
///
/// The document editor fills pages against raw pixels; the slide editor
/// against a fixed line count derived from [`LINE_HEIGHT_PX`]. The splitter
/// is parameterized by whichever the caller picks and converts block heights
/// once, up front — units are never mixed mid-split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "camelCase")]
pub enum Capacity {
    /// Raw pixel budget per page.
    Pixels(f64),
    /// Whole-line budget per slide.
    Lines(u32),
}

impl Capacity {
    /// Pixel capacity for a document page: the geometry's content height.
    pub fn for_document(geometry: &PageGeometry) -> Self {
        Capacity::Pixels(geometry.content_height())
    }

    /// Line capacity for a slide: whole lines that fit the content height.
    pub fn for_slide(geometry: &PageGeometry) -> Self {
        Capacity::Lines((geometry.content_height() / LINE_HEIGHT_PX).floor() as u32)
    }
}
