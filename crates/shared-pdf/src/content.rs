//! Content-stream walk for page layout facts
//!
//! Produces text runs grouped into baseline blocks, stroked horizontal
//! segments, and image/drawing/glyph counts for one page. Positions are
//! approximate: glyph advance is estimated from the font size since font
//! metrics are not loaded.

use std::collections::BTreeSet;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use shared_types::{BoundingBox, LineSegment, PageGraphics, TextBlock};

use crate::objects::{self, decode_pdf_string, number};

/// Average glyph advance as a fraction of the font size
const GLYPH_ADVANCE: f64 = 0.5;

/// Rectangles thinner than this are treated as rules
const THIN_RECT: f64 = 2.0;

/// US Letter, used when a page has no usable MediaBox
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Layout facts for a single page, top-left origin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub blocks: Vec<TextBlock>,
    pub lines: Vec<LineSegment>,
    pub graphics: PageGraphics,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translate(tx: f64, ty: f64) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self` applied first, then `other`
    fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Length of a vertical unit vector after transformation
    fn vertical_scale(&self) -> f64 {
        let [_, _, c, d, _, _] = self.0;
        c.hypot(d)
    }

    fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, obj) in m.iter_mut().zip(operands) {
            *slot = number(obj)?;
        }
        Some(Matrix(m))
    }
}

#[derive(Debug, Clone, Copy)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font_size: f64,
    leading: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translate(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }
}

/// A positioned text run before baseline grouping
#[derive(Debug, Clone)]
struct TextRun {
    text: String,
    x0: f64,
    x1: f64,
    baseline: f64,
    size: f64,
}

struct Walker {
    image_names: BTreeSet<Vec<u8>>,
    page_top: f64,
    page_left: f64,
    ctm: Matrix,
    stack: Vec<Matrix>,
    text: TextState,
    current_point: Option<(f64, f64)>,
    pending_segments: Vec<LineSegment>,
    runs: Vec<TextRun>,
    layout: PageLayout,
}

impl Walker {
    fn new(doc: &Document, page: &Dictionary) -> Self {
        let media = page_media_box(doc, page);
        Self {
            image_names: image_xobject_names(doc, page),
            page_top: media[3],
            page_left: media[0],
            ctm: Matrix::IDENTITY,
            stack: Vec::new(),
            text: TextState::default(),
            current_point: None,
            pending_segments: Vec::new(),
            runs: Vec::new(),
            layout: PageLayout::default(),
        }
    }

    /// User space to top-left page space
    fn flip(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.page_left, self.page_top - y)
    }

    fn user_point(&self, x: f64, y: f64) -> (f64, f64) {
        let (ux, uy) = self.ctm.apply(x, y);
        self.flip(ux, uy)
    }

    fn operation(&mut self, op: &Operation) {
        let operands = op.operands.as_slice();
        let nums = |i: usize| operands.get(i).and_then(number);
        match op.operator.as_str() {
            "q" => self.stack.push(self.ctm),
            "Q" => {
                if let Some(m) = self.stack.pop() {
                    self.ctm = m;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.then(&self.ctm);
                }
            }
            "BT" => {
                self.text.matrix = Matrix::IDENTITY;
                self.text.line_matrix = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(size) = nums(1) {
                    self.text.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = nums(0) {
                    self.text.leading = leading;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (nums(0), nums(1)) {
                    self.text.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (nums(0), nums(1)) {
                    self.text.leading = -ty;
                    self.text.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text.matrix = m;
                    self.text.line_matrix = m;
                }
            }
            "T*" => self.text.next_line(),
            "Tj" | "TJ" => {
                if let Some(obj) = operands.first() {
                    self.show(obj);
                }
            }
            "'" => {
                self.text.next_line();
                if let Some(obj) = operands.first() {
                    self.show(obj);
                }
            }
            "\"" => {
                self.text.next_line();
                if let Some(obj) = operands.get(2) {
                    self.show(obj);
                }
            }
            "m" => {
                if let (Some(x), Some(y)) = (nums(0), nums(1)) {
                    self.current_point = Some(self.user_point(x, y));
                }
            }
            "l" => {
                if let (Some(x), Some(y)) = (nums(0), nums(1)) {
                    let end = self.user_point(x, y);
                    if let Some(start) = self.current_point {
                        self.pending_segments.push(LineSegment {
                            x0: start.0,
                            y0: start.1,
                            x1: end.0,
                            y1: end.1,
                        });
                    }
                    self.current_point = Some(end);
                }
            }
            "re" => {
                if let (Some(x), Some(y), Some(w), Some(h)) = (nums(0), nums(1), nums(2), nums(3))
                {
                    if h.abs() <= THIN_RECT {
                        let mid = y + h / 2.0;
                        let start = self.user_point(x, mid);
                        let end = self.user_point(x + w, mid);
                        self.pending_segments.push(LineSegment {
                            x0: start.0,
                            y0: start.1,
                            x1: end.0,
                            y1: end.1,
                        });
                    }
                    self.current_point = None;
                }
            }
            "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                self.layout.graphics.vector_drawing_ops += 1;
                self.layout.lines.append(&mut self.pending_segments);
                self.current_point = None;
            }
            "n" => {
                self.pending_segments.clear();
                self.current_point = None;
            }
            "Do" => {
                if let Some(Object::Name(name)) = operands.first() {
                    // Without resources every XObject counts as an image.
                    if self.image_names.is_empty() || self.image_names.contains(name) {
                        self.layout.graphics.image_count += 1;
                    }
                }
            }
            "BI" => self.layout.graphics.image_count += 1,
            _ => {}
        }
    }

    fn show(&mut self, operand: &Object) {
        let size = self.text.font_size;
        let mut text = String::new();
        let mut advance = 0.0;
        match operand {
            Object::String(bytes, _) => {
                let s = decode_pdf_string(bytes);
                advance += s.chars().count() as f64 * size * GLYPH_ADVANCE;
                text.push_str(&s);
            }
            Object::Array(items) => {
                for item in items {
                    match item {
                        Object::String(bytes, _) => {
                            let s = decode_pdf_string(bytes);
                            advance += s.chars().count() as f64 * size * GLYPH_ADVANCE;
                            text.push_str(&s);
                        }
                        other => {
                            if let Some(kern) = number(other) {
                                advance -= kern / 1000.0 * size;
                                // Large negative kerning separates words.
                                if kern < -100.0 {
                                    text.push(' ');
                                }
                            }
                        }
                    }
                }
            }
            _ => return,
        }

        let combined = self.text.matrix.then(&self.ctm);
        let (sx, sy) = combined.apply(0.0, 0.0);
        let (ex, _) = combined.apply(advance, 0.0);
        let (x0, baseline) = self.flip(sx, sy);
        let (x1, _) = self.flip(ex, sy);
        let rendered = size * combined.vertical_scale();

        self.layout.graphics.rendered_glyph_count +=
            text.chars().filter(|c| !c.is_whitespace()).count();
        self.text.matrix = Matrix::translate(advance, 0.0).then(&self.text.matrix);

        if text.trim().is_empty() {
            return;
        }
        self.runs.push(TextRun {
            text,
            x0: x0.min(x1),
            x1: x0.max(x1),
            baseline,
            size: rendered.max(1.0),
        });
    }

    fn finish(mut self) -> PageLayout {
        self.layout.blocks = group_runs(&self.runs);
        self.layout
    }
}

/// Merge consecutive runs sharing a baseline into blocks
fn group_runs(runs: &[TextRun]) -> Vec<TextBlock> {
    let mut blocks: Vec<(TextBlock, f64)> = Vec::new();
    for run in runs {
        let top = run.baseline - run.size;
        if let Some((block, baseline)) = blocks.last_mut() {
            let same_line = (run.baseline - *baseline).abs() < run.size * 0.5;
            let gap = run.x0 - block.bbox.x1;
            if same_line && gap < run.size * 3.0 && gap > -run.size {
                if gap > run.size * 0.2 && !block.text.ends_with(' ') {
                    block.text.push(' ');
                }
                block.text.push_str(&run.text);
                block.bbox = BoundingBox::new(
                    block.bbox.x0.min(run.x0),
                    block.bbox.y0.min(top),
                    block.bbox.x1.max(run.x1),
                    block.bbox.y1.max(run.baseline),
                );
                continue;
            }
        }
        blocks.push((
            TextBlock {
                bbox: BoundingBox::new(run.x0, top, run.x1, run.baseline),
                text: run.text.clone(),
            },
            run.baseline,
        ));
    }
    blocks.into_iter().map(|(block, _)| block).collect()
}

pub(crate) fn page_media_box(doc: &Document, page: &Dictionary) -> [f64; 4] {
    page.get(b"MediaBox")
        .ok()
        .and_then(|obj| objects::rect(doc, obj))
        .map(|[x0, y0, x1, y1]| [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)])
        .unwrap_or(DEFAULT_MEDIA_BOX)
}

/// Names of image XObjects in the page resources
fn image_xobject_names(doc: &Document, page: &Dictionary) -> BTreeSet<Vec<u8>> {
    let mut names = BTreeSet::new();
    let Some(resources) = objects::get_dict(doc, page, b"Resources") else {
        return names;
    };
    let Some(xobjects) = objects::get_dict(doc, resources, b"XObject") else {
        return names;
    };
    for (name, obj) in xobjects.iter() {
        if let Some(Object::Stream(stream)) = objects::resolve(doc, obj) {
            if objects::get_name(doc, &stream.dict, b"Subtype") == Some(b"Image".as_slice()) {
                names.insert(name.clone());
            }
        }
    }
    names
}

/// Walk one page's content streams
pub(crate) fn page_layout(doc: &Document, page_id: ObjectId) -> Result<PageLayout, String> {
    let page = doc.get_dictionary(page_id).map_err(|e| e.to_string())?;
    let bytes = doc.get_page_content(page_id).map_err(|e| e.to_string())?;
    let content = Content::decode(&bytes).map_err(|e| e.to_string())?;

    let mut walker = Walker::new(doc, page);
    for op in &content.operations {
        walker.operation(op);
    }
    Ok(walker.finish())
}
