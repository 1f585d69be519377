//! Signature, witness and notarization posture
//!
//! Signature evidence is taken from three channels in strict precedence:
//! signature widgets, digital signature objects, and a layout estimate
//! that only runs when the first two found nothing.

use regex::Regex;
use shared_types::{
    BoundingBox, DocumentAccess, LineSegment, SignatureProfile, TextBlock, WidgetInfo, WidgetKind,
};
use tracing::debug;

use crate::patterns::{
    CONDITIONAL_SIGNATURE, NOTARY, SIGNATURE_WORD, UNDERSCORE_RUN, WITNESS_WORD,
};

const MIN_LINE_LENGTH: f64 = 60.0;
const HORIZONTAL_TOLERANCE: f64 = 1.0;

/// Per-page and document caps for one layout keyword
#[derive(Debug, Clone, Copy)]
struct LayoutCaps {
    per_page: usize,
    total: usize,
}

const SIGNATURE_CAPS: LayoutCaps = LayoutCaps {
    per_page: 2,
    total: 5,
};

const WITNESS_CAPS: LayoutCaps = LayoutCaps {
    per_page: 2,
    total: 4,
};

/// Count used when no page layout could be read at all
const TEXT_FALLBACK_CAP: usize = 2;

/// Band beneath and to the right of a keyword block where a signing line is expected
fn signing_band(block: &BoundingBox) -> BoundingBox {
    BoundingBox::new(block.x0 - 10.0, block.y1 - 6.0, block.x1 + 200.0, block.y1 + 18.0)
}

fn line_is_close(band: &BoundingBox, line: &LineSegment) -> bool {
    let (lx0, lx1) = (line.x0.min(line.x1), line.x0.max(line.x1));
    let in_band = band.y0 - 6.0 <= line.y0 && line.y0 <= band.y1 + 6.0;
    in_band && !(lx1 < band.x0 || lx0 > band.x1)
}

fn is_signing_rule(line: &LineSegment) -> bool {
    line.is_horizontal(HORIZONTAL_TOLERANCE) && (line.x1 - line.x0).abs() > MIN_LINE_LENGTH
}

/// Signing lines on one page next to blocks matching `keyword`
pub fn count_page_lines(
    blocks: &[TextBlock],
    lines: &[LineSegment],
    keyword: &Regex,
    per_page: usize,
) -> usize {
    let rules: Vec<&LineSegment> = lines.iter().filter(|l| is_signing_rule(l)).collect();
    let count = blocks
        .iter()
        .filter(|block| keyword.is_match(&block.text))
        .filter(|block| {
            let band = signing_band(&block.bbox);
            UNDERSCORE_RUN.is_match(&block.text) || rules.iter().any(|l| line_is_close(&band, l))
        })
        .count();
    count.min(per_page)
}

fn estimate_from_layout(
    access: &dyn DocumentAccess,
    page_count: usize,
    normalized_text: &str,
    keyword: &Regex,
    caps: LayoutCaps,
) -> usize {
    let mut obtained = false;
    let mut hits = 0;
    for page in 1..=page_count {
        let blocks = match access.page_text_blocks(page) {
            Ok(blocks) => blocks,
            Err(e) => {
                debug!(page, error = %e, "No text blocks for layout estimate");
                continue;
            }
        };
        obtained = true;
        if !blocks.iter().any(|b| keyword.is_match(&b.text)) {
            continue;
        }
        let lines = access.page_line_segments(page).unwrap_or_default();
        hits += count_page_lines(&blocks, &lines, keyword, caps.per_page);
    }
    if !obtained {
        return keyword
            .find_iter(normalized_text)
            .count()
            .min(TEXT_FALLBACK_CAP);
    }
    hits.min(caps.total)
}

pub struct SignatureAnalyzer;

impl SignatureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        access: &dyn DocumentAccess,
        widgets: &[WidgetInfo],
        page_count: usize,
        normalized_text: &str,
    ) -> SignatureProfile {
        let widget_signature_count = widgets
            .iter()
            .filter(|w| w.kind == WidgetKind::Signature)
            .count();

        let digital = access.digital_signatures().unwrap_or_default();
        let digital_signature_count = digital.len();
        let timestamp_present = digital.iter().any(|s| s.timestamp_present);

        let layout_estimated_count = if widget_signature_count + digital_signature_count == 0 {
            estimate_from_layout(
                access,
                page_count,
                normalized_text,
                &SIGNATURE_WORD,
                SIGNATURE_CAPS,
            )
        } else {
            0
        };
        let witness_count = estimate_from_layout(
            access,
            page_count,
            normalized_text,
            &WITNESS_WORD,
            WITNESS_CAPS,
        );

        let notarized = timestamp_present || NOTARY.is_match(normalized_text);
        let conditional_signature_count = CONDITIONAL_SIGNATURE
            .iter()
            .map(|p| p.find_iter(normalized_text).count())
            .sum();

        let profile = SignatureProfile {
            widget_signature_count,
            digital_signature_count,
            layout_estimated_count,
            witness_count,
            notarized,
            conditional_signature_count,
        };
        debug!(?profile, "Signature profile");
        profile
    }
}

impl Default for SignatureAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
