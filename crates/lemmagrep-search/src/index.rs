use std::collections::HashSet;

use lemmagrep_core::{Lemma, LemmagrepError, LemmagrepResult};
use serde::Serialize;

use crate::normalizer::Normalizer;

/// One corpus line and the lemmas it contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineRecord {
    /// 1-based position of the line in the source corpus.
    pub line_number: usize,
    /// The line as given, for display.
    pub original_text: String,
    /// Lemmas of `original_text`.
    pub lemma_set: HashSet<Lemma>,
}

impl LineRecord {
    /// Whether the line contains `lemma`.
    pub fn contains(&self, lemma: &str) -> bool {
        self.lemma_set.contains(lemma)
    }
}

/// Indexing policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOptions {
    /// Leave lines with no lemmas out of the index. Line numbers of the
    /// remaining lines still count the skipped ones.
    pub skip_empty: bool,
}

/// Per-line lemma sets over a whole corpus, ordered by line number.
///
/// Built once per corpus load and never mutated, so any number of searches
/// may read it concurrently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusIndex {
    records: Vec<LineRecord>,
}

impl CorpusIndex {
    /// Normalize every line and index it, keeping empty lines.
    pub fn build<S>(lines: &[S], normalizer: &Normalizer) -> Self
    where
        S: AsRef<str> + Sync,
    {
        Self::build_with(lines, normalizer, IndexOptions::default())
    }

    /// Normalize every line and index it under `options`.
    pub fn build_with<S>(lines: &[S], normalizer: &Normalizer, options: IndexOptions) -> Self
    where
        S: AsRef<str> + Sync,
    {
        let normalized = normalizer.normalize_lines(lines);
        Self::assemble(lines, &normalized, options)
    }

    /// Index lines whose lemma sequences were already computed.
    ///
    /// `normalized[i]` must be the normalization of `lines[i]`.
    pub fn from_normalized<S>(
        lines: &[S],
        normalized: &[Vec<Lemma>],
        options: IndexOptions,
    ) -> LemmagrepResult<Self>
    where
        S: AsRef<str>,
    {
        if lines.len() != normalized.len() {
            return Err(LemmagrepError::InvalidArgument(format!(
                "{} lines but {} normalized sequences",
                lines.len(),
                normalized.len()
            )));
        }
        Ok(Self::assemble(lines, normalized, options))
    }

    fn assemble<S>(lines: &[S], normalized: &[Vec<Lemma>], options: IndexOptions) -> Self
    where
        S: AsRef<str>,
    {
        let records: Vec<LineRecord> = lines
            .iter()
            .zip(normalized)
            .enumerate()
            .filter(|(_, (_, lemmas))| !(options.skip_empty && lemmas.is_empty()))
            .map(|(idx, (line, lemmas))| LineRecord {
                line_number: idx + 1,
                original_text: line.as_ref().to_string(),
                lemma_set: lemmas.iter().cloned().collect(),
            })
            .collect();

        tracing::info!(
            lines = lines.len(),
            records = records.len(),
            skip_empty = options.skip_empty,
            "Corpus indexed"
        );
        Self { records }
    }

    /// All records in line order.
    pub fn records(&self) -> &[LineRecord] {
        &self.records
    }

    /// The record for a 1-based line number, if indexed.
    pub fn get(&self, line_number: usize) -> Option<&LineRecord> {
        self.records
            .binary_search_by_key(&line_number, |r| r.line_number)
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct lemmas across the corpus.
    pub fn vocabulary_size(&self) -> usize {
        self.records
            .iter()
            .flat_map(|r| r.lemma_set.iter())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Index a corpus: line numbers `1..=N` in input order, one lemma set per line.
pub fn build_index<S>(lines: &[S], normalizer: &Normalizer) -> CorpusIndex
where
    S: AsRef<str> + Sync,
{
    CorpusIndex::build(lines, normalizer)
}
