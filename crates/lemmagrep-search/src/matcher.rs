use std::collections::BTreeSet;

use lemmagrep_core::Lemma;
use serde::Serialize;

use crate::index::{CorpusIndex, LineRecord};

/// A corpus line selected by [`search`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineMatch<'a> {
    /// The matching line.
    pub record: &'a LineRecord,
    /// Query lemmas found in the line, sorted.
    pub matched: Vec<Lemma>,
}

impl LineMatch<'_> {
    /// 1-based line number of the match.
    pub fn line_number(&self) -> usize {
        self.record.line_number
    }

    /// Text of the matching line.
    pub fn text(&self) -> &str {
        &self.record.original_text
    }
}

/// Every line whose lemma set shares at least one lemma with `query`,
/// in ascending line order.
///
/// An empty `query` matches nothing. The index is only read.
pub fn search<'a>(index: &'a CorpusIndex, query: &BTreeSet<Lemma>) -> Vec<LineMatch<'a>> {
    if query.is_empty() {
        return Vec::new();
    }

    index
        .records()
        .iter()
        .filter_map(|record| {
            let matched: Vec<Lemma> = query
                .iter()
                .filter(|lemma| record.lemma_set.contains(*lemma))
                .cloned()
                .collect();
            if matched.is_empty() {
                None
            } else {
                Some(LineMatch { record, matched })
            }
        })
        .collect()
}
