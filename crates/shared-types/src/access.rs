//! Document access capability
//!
//! The analysis core never decodes PDF bytes itself. A decoding backend
//! implements [`DocumentAccess`] and exposes text, metadata, widget and
//! graphics facts. Every accessor is fallible on its own so a detector can
//! substitute its fallback when one fact is missing.
//!
//! Geometry is expressed with a top-left origin and y growing downward.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::text::normalize_for_rules;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The backend cannot supply this fact at all
    #[error("{0} is not supported by this backend")]
    Unsupported(&'static str),

    /// A single fact could not be extracted
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// The document cannot be decoded
    #[error("Decode failed: {0}")]
    Decode(String),
}

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Closed-interval intersection test
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }
}

/// Interactive field kind as reported by the form container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    Text,
    Checkbox,
    Radio,
    ComboBox,
    ListBox,
    PushButton,
    Signature,
    Unknown,
}

/// One interactive widget as enumerated from the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetInfo {
    /// Fully qualified field name (`parent.child`)
    pub name: String,
    pub tooltip: String,
    pub is_required: bool,
    pub kind: WidgetKind,
    pub bounding_box: BoundingBox,
    /// 1-indexed page number
    pub page_index: usize,
    /// Widget carries an action or additional-actions dictionary
    pub actions_present: bool,
}

/// Per-page counts used for graphics density
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGraphics {
    pub image_count: usize,
    pub vector_drawing_ops: usize,
    pub rendered_glyph_count: usize,
}

/// A run of text with its position on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub bbox: BoundingBox,
    pub text: String,
}

/// A straight stroked segment on the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl LineSegment {
    pub fn is_horizontal(&self, tolerance: f64) -> bool {
        (self.y1 - self.y0).abs() < tolerance
    }

    pub fn length(&self) -> f64 {
        (self.x1 - self.x0).hypot(self.y1 - self.y0)
    }
}

/// A cryptographic signature object found in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSignature {
    pub timestamp_present: bool,
}

/// Read-only view of a decoded document.
///
/// Implementations must be deterministic: the same document yields the
/// same facts on every call.
pub trait DocumentAccess {
    /// Short identifier of the backing implementation
    fn backend_name(&self) -> &'static str;

    /// URL or path the document was acquired from
    fn source_locator(&self) -> &str;

    /// Multi-page text in original casing
    fn raw_text(&self) -> Result<String, AccessError>;

    /// Raw text passed through the rule normalizer
    fn normalized_raw_text(&self) -> Result<String, AccessError> {
        self.raw_text().map(|raw| normalize_for_rules(&raw))
    }

    /// Document information entries, keys lowercased
    fn metadata(&self) -> Result<BTreeMap<String, String>, AccessError>;

    /// Failure here means the document could not be decoded at all
    fn page_count(&self) -> Result<usize, AccessError>;

    /// Widgets in document order
    fn widgets(&self) -> Result<Vec<WidgetInfo>, AccessError>;

    fn page_graphics(&self, page: usize) -> Result<PageGraphics, AccessError>;

    fn page_text_blocks(&self, page: usize) -> Result<Vec<TextBlock>, AccessError>;

    fn page_line_segments(&self, page: usize) -> Result<Vec<LineSegment>, AccessError>;

    /// Page carries JavaScript or additional actions
    fn page_has_actions(&self, page: usize) -> Result<bool, AccessError>;

    /// Catalog-level open action, additional actions or named scripts
    fn document_has_actions(&self) -> Result<bool, AccessError>;

    fn embedded_file_count(&self) -> Result<usize, AccessError>;

    /// `None` when the backend has no view of signature objects
    fn digital_signatures(&self) -> Option<Vec<DigitalSignature>> {
        None
    }
}
