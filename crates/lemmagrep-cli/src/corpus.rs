//! Corpus file loading.

use std::path::Path;

use lemmagrep_core::{LemmagrepError, LemmagrepResult};

use crate::config::CorpusConfig;

/// Read a UTF-8 corpus and return the text of each line, one entry per line.
///
/// Line endings are stripped. Lines with three or more tab-separated parts
/// contribute only their `tab_field` part; the rest are taken whole.
///
/// The returned string is both what gets lemmatized and what a match
/// displays as its `original_text`, so category and title columns never show
/// up in results. Line numbers still refer to the raw file.
pub async fn load_corpus(path: &Path, config: &CorpusConfig) -> LemmagrepResult<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        LemmagrepError::Corpus(format!(
            "Failed to read corpus '{}': {}",
            path.display(),
            e
        ))
    })?;

    let lines: Vec<String> = content
        .lines()
        .map(|line| extract_text(line, config.tab_field).to_string())
        .collect();

    tracing::info!(path = %path.display(), lines = lines.len(), "Corpus loaded");
    Ok(lines)
}

/// The indexable text of one raw corpus line.
pub fn extract_text(line: &str, tab_field: usize) -> &str {
    let line = line.trim_end_matches('\r');
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() >= 3 {
        if let Some(field) = parts.get(tab_field) {
            return field.trim();
        }
    }
    line.trim()
}
