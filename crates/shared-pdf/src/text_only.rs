//! Text-pattern backend for documents without usable form structure

use std::collections::BTreeMap;

use shared_types::{
    AccessError, BoundingBox, DocumentAccess, LineSegment, PageGraphics, TextBlock, WidgetInfo,
};

const LINE_HEIGHT: f64 = 14.0;
const GLYPH_WIDTH: f64 = 6.0;
const MARGIN: f64 = 36.0;

/// Already-extracted text exposed as a document
///
/// Pages are split on form feed. Each non-empty line becomes one text
/// block stacked down the page, so text-based layout heuristics still see
/// the underscores of a signature line.
#[derive(Debug, Clone)]
pub struct TextOnlyDocument {
    source: String,
    pages: Vec<String>,
    metadata: BTreeMap<String, String>,
    page_count: Option<usize>,
}

impl TextOnlyDocument {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let pages = text.split('\x0C').map(str::to_string).collect();
        Self {
            source: source.into(),
            pages,
            metadata: BTreeMap::new(),
            page_count: None,
        }
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = metadata
            .into_iter()
            .map(|(k, v)| (k.trim_start_matches('/').to_lowercase(), v))
            .collect();
        self
    }

    /// Override the page count derived from form feeds
    pub fn with_page_count(mut self, page_count: usize) -> Self {
        self.page_count = Some(page_count.max(1));
        self
    }

    fn page(&self, page: usize) -> Option<&str> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .map(String::as_str)
    }
}

impl DocumentAccess for TextOnlyDocument {
    fn backend_name(&self) -> &'static str {
        "text"
    }

    fn source_locator(&self) -> &str {
        &self.source
    }

    fn raw_text(&self) -> Result<String, AccessError> {
        Ok(self.pages.join("\n"))
    }

    fn metadata(&self) -> Result<BTreeMap<String, String>, AccessError> {
        Ok(self.metadata.clone())
    }

    fn page_count(&self) -> Result<usize, AccessError> {
        Ok(self.page_count.unwrap_or(self.pages.len()))
    }

    fn widgets(&self) -> Result<Vec<WidgetInfo>, AccessError> {
        Ok(Vec::new())
    }

    fn page_graphics(&self, _page: usize) -> Result<PageGraphics, AccessError> {
        Err(AccessError::Unsupported("page graphics"))
    }

    fn page_text_blocks(&self, page: usize) -> Result<Vec<TextBlock>, AccessError> {
        let Some(text) = self.page(page) else {
            return Ok(Vec::new());
        };
        let blocks = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(i, line)| {
                let y0 = MARGIN + i as f64 * LINE_HEIGHT;
                let x1 = MARGIN + line.chars().count() as f64 * GLYPH_WIDTH;
                TextBlock {
                    bbox: BoundingBox::new(MARGIN, y0, x1, y0 + LINE_HEIGHT - 2.0),
                    text: line.to_string(),
                }
            })
            .collect();
        Ok(blocks)
    }

    fn page_line_segments(&self, _page: usize) -> Result<Vec<LineSegment>, AccessError> {
        Ok(Vec::new())
    }

    fn page_has_actions(&self, _page: usize) -> Result<bool, AccessError> {
        Err(AccessError::Unsupported("page actions"))
    }

    fn document_has_actions(&self) -> Result<bool, AccessError> {
        Err(AccessError::Unsupported("document actions"))
    }

    fn embedded_file_count(&self) -> Result<usize, AccessError> {
        Err(AccessError::Unsupported("embedded files"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_split_on_form_feed() {
        let doc = TextOnlyDocument::new("a.pdf", "page one\x0Cpage two\x0Cpage three");
        assert_eq!(doc.page_count().unwrap(), 3);
        assert_eq!(doc.page_text_blocks(2).unwrap()[0].text, "page two");
        assert!(doc.page_text_blocks(9).unwrap().is_empty());
    }

    #[test]
    fn test_blocks_stack_down_the_page() {
        let doc = TextOnlyDocument::new("a.pdf", "Signature: ________\n\nDate: ____");
        let blocks = doc.page_text_blocks(1).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].bbox.y0 > blocks[0].bbox.y1);
    }

    #[test]
    fn test_no_widgets_and_no_signatures() {
        let doc = TextOnlyDocument::new("a.pdf", "text").with_page_count(4);
        assert!(doc.widgets().unwrap().is_empty());
        assert_eq!(doc.digital_signatures(), None);
        assert_eq!(doc.page_count().unwrap(), 4);
        assert_eq!(
            doc.page_graphics(1),
            Err(AccessError::Unsupported("page graphics"))
        );
    }

    #[test]
    fn test_metadata_keys_normalized() {
        let meta = BTreeMap::from([("/Title".to_string(), "Claim Form".to_string())]);
        let doc = TextOnlyDocument::new("a.pdf", "").with_metadata(meta);
        assert_eq!(
            doc.metadata().unwrap().get("title").map(String::as_str),
            Some("Claim Form")
        );
    }
}
