use std::sync::Arc;

use lemmagrep_core::LemmagrepResult;

use crate::expansion::{ExpandedQuery, QueryExpander};
use crate::index::{CorpusIndex, IndexOptions};
use crate::matcher::{search, LineMatch};
use crate::normalizer::Normalizer;
use crate::oracle::{EmbeddingOracle, LazyOracle};
use crate::trainer::CooccurrenceTrainer;

/// Result of one semantic grep.
#[derive(Debug, Clone, PartialEq)]
pub enum GrepOutcome<'a> {
    /// The query normalized to no lemmas; nothing was searched.
    Degenerate {
        /// The query as typed.
        query: String,
    },
    /// The query was expanded and matched. `matches` may be empty.
    Searched {
        /// The expanded lemma set and how it was built.
        expansion: ExpandedQuery,
        /// Matching lines in corpus order.
        matches: Vec<LineMatch<'a>>,
    },
}

impl<'a> GrepOutcome<'a> {
    /// Whether the query had no lemmas to search for.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate { .. })
    }

    /// Matching lines; empty for a degenerate query.
    pub fn matches(&self) -> &[LineMatch<'a>] {
        match self {
            Self::Degenerate { .. } => &[],
            Self::Searched { matches, .. } => matches,
        }
    }

    /// The expansion, if the query was searched.
    pub fn expansion(&self) -> Option<&ExpandedQuery> {
        match self {
            Self::Degenerate { .. } => None,
            Self::Searched { expansion, .. } => Some(expansion),
        }
    }
}

/// A corpus index paired with a query expander.
///
/// The index is built once; every [`grep`](Self::grep) reuses it.
pub struct SemanticGrep {
    index: CorpusIndex,
    expander: QueryExpander,
    oracle: Arc<dyn EmbeddingOracle>,
}

impl SemanticGrep {
    /// Pair an existing index with a ready oracle.
    ///
    /// `normalizer` must be the one the index was built with.
    pub fn new(
        index: CorpusIndex,
        normalizer: Arc<Normalizer>,
        oracle: Arc<dyn EmbeddingOracle>,
    ) -> Self {
        let expander = QueryExpander::new(normalizer, oracle.clone());
        Self {
            index,
            expander,
            oracle,
        }
    }

    /// Normalize `lines` once, index them and train an embedding table on
    /// the same lemma sequences before returning.
    pub fn train<S>(
        lines: &[S],
        normalizer: Arc<Normalizer>,
        trainer: &CooccurrenceTrainer,
        options: IndexOptions,
    ) -> LemmagrepResult<Self>
    where
        S: AsRef<str> + Sync,
    {
        let sentences = normalizer.normalize_lines(lines);
        let index = CorpusIndex::from_normalized(lines, &sentences, options)?;
        let table = trainer.train(&sentences)?;
        Ok(Self::new(index, normalizer, Arc::new(table)))
    }

    /// Like [`train`](Self::train), but the embedding table is only trained
    /// when the first query needs neighbours.
    pub fn train_lazily<S>(
        lines: &[S],
        normalizer: Arc<Normalizer>,
        trainer: CooccurrenceTrainer,
        options: IndexOptions,
    ) -> LemmagrepResult<Self>
    where
        S: AsRef<str> + Sync,
    {
        let sentences = normalizer.normalize_lines(lines);
        let index = CorpusIndex::from_normalized(lines, &sentences, options)?;
        let dimension = trainer.config().dimension;
        let oracle = LazyOracle::new(dimension, move || trainer.train(&sentences));
        Ok(Self::new(index, normalizer, Arc::new(oracle)))
    }

    /// Expand `query` with up to `top_n` neighbours per lemma and return the
    /// matching lines.
    pub fn grep(&self, query: &str, top_n: usize) -> GrepOutcome<'_> {
        let expansion = self.expander.expand(query, top_n);
        if expansion.is_degenerate() {
            return GrepOutcome::Degenerate {
                query: query.to_string(),
            };
        }

        let matches = search(&self.index, &expansion.lemmas);
        tracing::info!(
            query = %query,
            lemmas = expansion.len(),
            matches = matches.len(),
            "Semantic grep finished"
        );
        GrepOutcome::Searched { expansion, matches }
    }

    /// The corpus index.
    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// The query expander.
    pub fn expander(&self) -> &QueryExpander {
        &self.expander
    }

    /// The embedding oracle.
    pub fn oracle(&self) -> &dyn EmbeddingOracle {
        self.oracle.as_ref()
    }
}
