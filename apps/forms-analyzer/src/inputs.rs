//! Batch input lists

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// One document to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputItem {
    pub path: PathBuf,
    /// Where the document was published; defaults to the local path
    pub source: Option<String>,
}

impl InputItem {
    pub fn new(path: impl Into<PathBuf>, source: Option<String>) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// Locator handed to the analyzer for issuer and domain checks
    pub fn locator(&self) -> String {
        self.source
            .clone()
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Parse `path [source-url]` lines; blanks and `#` comments are skipped.
///
/// Relative paths resolve against `base_dir`.
pub fn parse_inputs(content: &str, base_dir: &Path) -> Vec<InputItem> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let path = PathBuf::from(parts.next()?);
            let path = if path.is_relative() {
                base_dir.join(path)
            } else {
                path
            };
            Some(InputItem::new(path, parts.next().map(str::to_string)))
        })
        .collect()
}

pub fn load_inputs(list: &Path) -> Result<Vec<InputItem>> {
    let content = fs::read_to_string(list)
        .with_context(|| format!("Failed to read input list {}", list.display()))?;
    let base_dir = list.parent().unwrap_or_else(|| Path::new("."));
    Ok(parse_inputs(&content, base_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let content = "\
# forms collected 2026-10
forms/w9.pdf https://www.irs.gov/pub/irs-pdf/fw9.pdf

   # indented comment
/abs/ira.pdf
";
        let items = parse_inputs(content, Path::new("/data"));
        assert_eq!(
            items,
            vec![
                InputItem::new(
                    "/data/forms/w9.pdf",
                    Some("https://www.irs.gov/pub/irs-pdf/fw9.pdf".to_string())
                ),
                InputItem::new("/abs/ira.pdf", None),
            ]
        );
    }

    #[test]
    fn test_locator_prefers_source() {
        let item = InputItem::new("a.pdf", Some("https://x.com/a.pdf".to_string()));
        assert_eq!(item.locator(), "https://x.com/a.pdf");
        assert_eq!(InputItem::new("a.pdf", None).locator(), "a.pdf");
    }

    #[test]
    fn test_missing_list_is_an_error() {
        let err = load_inputs(Path::new("/nonexistent/list.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/list.txt"));
    }
}
