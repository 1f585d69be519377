//! JSON and CSV export of batch results

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use shared_types::AnalysisResult;

pub const CSV_HEADER: [&str; 10] = [
    "form_title",
    "source",
    "page",
    "field_name",
    "field_class",
    "rule_id",
    "severity",
    "issue",
    "evidence",
    "nigo_score",
];

const NO_FINDINGS: &str = "NO_NIGO";
const FAILED: &str = "ERROR";

/// Top-level JSON document
#[derive(Debug, Serialize)]
pub struct BatchOutput<'a> {
    pub generated_at: String,
    pub count: usize,
    pub results: &'a [AnalysisResult],
}

impl<'a> BatchOutput<'a> {
    pub fn new(results: &'a [AnalysisResult]) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            count: results.len(),
            results,
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display())),
        _ => Ok(()),
    }
}

pub fn write_json(path: &Path, results: &[AnalysisResult]) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(&BatchOutput::new(results))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Quote a CSV field when it holds a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(fields: &[String]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Finding rows for one result; a clean report gets a single `NO_NIGO` row
pub fn csv_rows(result: &AnalysisResult) -> Vec<Vec<String>> {
    let Some(report) = &result.report else {
        let error = result.error.clone().unwrap_or_default();
        return vec![vec![
            String::new(),
            result.source.clone(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            FAILED.to_string(),
            error,
            String::new(),
        ]];
    };

    let title = &report.document.form_title;
    let score = report.nigo_score.to_string();
    if report.findings.is_empty() {
        return vec![vec![
            title.clone(),
            result.source.clone(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            NO_FINDINGS.to_string(),
            String::new(),
            score,
        ]];
    }
    report
        .findings
        .iter()
        .map(|f| {
            vec![
                title.clone(),
                result.source.clone(),
                f.page.map(|p| p.to_string()).unwrap_or_default(),
                f.field_name.clone(),
                f.field_class.clone(),
                f.rule_id.clone(),
                f.severity.as_str().to_string(),
                f.message.clone(),
                f.evidence_text.clone(),
                score.clone(),
            ]
        })
        .collect()
}

pub fn render_csv(results: &[AnalysisResult]) -> String {
    let header: Vec<String> = CSV_HEADER.iter().map(|h| h.to_string()).collect();
    let mut out = csv_line(&header);
    for row in results.iter().flat_map(csv_rows) {
        out.push_str(&csv_line(&row));
    }
    out
}

pub fn write_csv(path: &Path, results: &[AnalysisResult]) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, render_csv(results))
        .with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nigo_engine::failed_result;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("Label='x' \"y\""), "\"Label='x' \"\"y\"\"\"");
        assert_eq!(csv_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_failed_result_row() {
        let result = failed_result("forms/bad.pdf", "Decode failed: bad xref");
        let rows = csv_rows(&result);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "forms/bad.pdf");
        assert_eq!(rows[0][7], "ERROR");
        assert_eq!(rows[0][8], "Decode failed: bad xref");
        assert_eq!(rows[0].len(), CSV_HEADER.len());
    }

    #[test]
    fn test_render_starts_with_header() {
        let csv = render_csv(&[]);
        assert_eq!(
            csv,
            "form_title,source,page,field_name,field_class,rule_id,severity,issue,evidence,nigo_score\n"
        );
    }

    #[test]
    fn test_json_document_shape() {
        let results = vec![failed_result("a.pdf", "boom")];
        let value = serde_json::to_value(BatchOutput::new(&results)).unwrap();
        assert_eq!(value["count"], 1);
        assert_eq!(value["results"][0]["status"], "error");
        assert!(value["generated_at"].as_str().is_some());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/findings.csv");
        write_csv(&path, &[failed_result("a.pdf", "boom")]).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use nigo_engine::failed_result;
    use proptest::prelude::*;

    /// Reverse of `csv_field` for a single field
    fn unquote(field: &str) -> String {
        match field.strip_prefix('"').and_then(|f| f.strip_suffix('"')) {
            Some(inner) => inner.replace("\"\"", "\""),
            None => field.to_string(),
        }
    }

    proptest! {
        /// Quoting is reversible and bare fields never carry a delimiter
        #[test]
        fn csv_field_round_trips(value in "[a-zA-Z0-9 ,\"'\n=;]{0,40}") {
            let encoded = csv_field(&value);
            if !encoded.starts_with('"') {
                prop_assert!(!encoded.contains([',', '"', '\n']));
            }
            prop_assert_eq!(unquote(&encoded), value);
        }

        /// One header line plus one row per failed document
        #[test]
        fn failed_documents_get_one_row_each(messages in prop::collection::vec("[a-z ,]{0,20}", 0..8)) {
            let results: Vec<_> = messages
                .iter()
                .enumerate()
                .map(|(i, m)| failed_result(&format!("doc{i}.pdf"), m.clone()))
                .collect();
            let csv = render_csv(&results);
            prop_assert_eq!(csv.lines().count(), results.len() + 1);
            prop_assert!(csv.lines().skip(1).all(|line| line.contains(",ERROR,")));
        }
    }
}
