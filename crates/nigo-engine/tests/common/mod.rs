//! In-memory document backend for engine tests

#![allow(dead_code)]

use std::collections::BTreeMap;

use shared_types::{
    AccessError, BoundingBox, DigitalSignature, DocumentAccess, LineSegment, PageGraphics,
    TextBlock, WidgetInfo, WidgetKind,
};

const LINE_HEIGHT: f64 = 14.0;
const MARGIN: f64 = 36.0;

/// Fully scripted document; every fact is set up front
#[derive(Debug, Clone)]
pub struct FakeDocument {
    pub source: String,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
    pub pages: usize,
    pub widgets: Vec<WidgetInfo>,
    pub lines: Vec<LineSegment>,
    pub graphics: PageGraphics,
    pub page_actions: bool,
    pub digital: Option<Vec<DigitalSignature>>,
}

impl FakeDocument {
    pub fn new(source: &str, text: &str) -> Self {
        Self {
            source: source.to_string(),
            text: text.to_string(),
            metadata: BTreeMap::new(),
            pages: 1,
            widgets: Vec::new(),
            lines: Vec::new(),
            graphics: PageGraphics::default(),
            page_actions: false,
            digital: None,
        }
    }

    pub fn with_widgets(mut self, widgets: Vec<WidgetInfo>) -> Self {
        self.widgets = widgets;
        self
    }

    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_digital_signatures(mut self, signatures: Vec<DigitalSignature>) -> Self {
        self.digital = Some(signatures);
        self
    }
}

impl DocumentAccess for FakeDocument {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    fn source_locator(&self) -> &str {
        &self.source
    }

    fn raw_text(&self) -> Result<String, AccessError> {
        Ok(self.text.clone())
    }

    fn metadata(&self) -> Result<BTreeMap<String, String>, AccessError> {
        Ok(self.metadata.clone())
    }

    fn page_count(&self) -> Result<usize, AccessError> {
        Ok(self.pages)
    }

    fn widgets(&self) -> Result<Vec<WidgetInfo>, AccessError> {
        Ok(self.widgets.clone())
    }

    fn page_graphics(&self, _page: usize) -> Result<PageGraphics, AccessError> {
        Ok(self.graphics)
    }

    /// All text sits on page 1, one block per line
    fn page_text_blocks(&self, page: usize) -> Result<Vec<TextBlock>, AccessError> {
        if page != 1 {
            return Ok(Vec::new());
        }
        Ok(self
            .text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(i, line)| {
                let y0 = MARGIN + i as f64 * LINE_HEIGHT;
                TextBlock {
                    bbox: BoundingBox::new(MARGIN, y0, MARGIN + 300.0, y0 + 12.0),
                    text: line.trim().to_string(),
                }
            })
            .collect())
    }

    fn page_line_segments(&self, page: usize) -> Result<Vec<LineSegment>, AccessError> {
        Ok(if page == 1 { self.lines.clone() } else { Vec::new() })
    }

    fn page_has_actions(&self, _page: usize) -> Result<bool, AccessError> {
        Ok(self.page_actions)
    }

    fn document_has_actions(&self) -> Result<bool, AccessError> {
        Ok(false)
    }

    fn embedded_file_count(&self) -> Result<usize, AccessError> {
        Ok(0)
    }

    fn digital_signatures(&self) -> Option<Vec<DigitalSignature>> {
        self.digital.clone()
    }
}

/// Widget placed well below any text block so no label is found
pub fn widget(name: &str, kind: WidgetKind, index: usize) -> WidgetInfo {
    let y = 600.0 + index as f64 * 20.0;
    WidgetInfo {
        name: name.to_string(),
        tooltip: String::new(),
        is_required: false,
        kind,
        bounding_box: BoundingBox::new(320.0, y, 480.0, y + 14.0),
        page_index: 1,
        actions_present: false,
    }
}
