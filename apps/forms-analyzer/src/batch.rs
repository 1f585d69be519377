//! Bounded parallel analysis of many documents

use std::fs;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use nigo_engine::{failed_result, BrandRegistry, NigoEngine};
use shared_types::AnalysisResult;
use tracing::{debug, info, warn};

use crate::inputs::InputItem;

/// Read, decode and analyze one document; never fails, errors become results
pub fn analyze_file(item: &InputItem, engine: &NigoEngine, registry: &BrandRegistry) -> AnalysisResult {
    let locator = item.locator();
    let data = match fs::read(&item.path) {
        Ok(data) => data,
        Err(e) => {
            warn!(path = %item.path.display(), error = %e, "Read failed");
            return failed_result(&locator, format!("Failed to read {}: {e}", item.path.display()));
        }
    };
    debug!(path = %item.path.display(), bytes = data.len(), "Decoding");
    match shared_pdf::open_document(&data, &locator) {
        Ok(doc) => engine.analyze(&*doc, registry),
        Err(e) => {
            warn!(source = %locator, error = %e, "Decode failed");
            failed_result(&locator, e.to_string())
        }
    }
}

/// Analyze `items` on at most `jobs` blocking workers; results keep input order
pub async fn run_batch(
    items: Vec<InputItem>,
    engine: Arc<NigoEngine>,
    registry: Arc<BrandRegistry>,
    jobs: usize,
) -> Vec<AnalysisResult> {
    let total = items.len();
    info!(total, jobs, "Starting batch");

    let results: Vec<AnalysisResult> = stream::iter(items)
        .map(|item| {
            let engine = engine.clone();
            let registry = registry.clone();
            async move {
                let locator = item.locator();
                tokio::task::spawn_blocking(move || analyze_file(&item, &engine, &registry))
                    .await
                    .unwrap_or_else(|e| {
                        warn!(source = %locator, error = %e, "Analysis task aborted");
                        failed_result(&locator, format!("Analysis task aborted: {e}"))
                    })
            }
        })
        .buffered(jobs.max(1))
        .collect()
        .await;

    let failed = results.iter().filter(|r| !r.is_success()).count();
    info!(total, failed, "Batch complete");
    results
}
