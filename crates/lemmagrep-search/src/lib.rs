//! Semantic line retrieval with lemma normalization and embedding-based
//! query expansion.
//!
//! A corpus is normalized once into per-line lemma sets. A query word is
//! normalized to its lemma, widened with the lemmas of its nearest neighbours
//! in a word embedding space, and every line sharing at least one lemma with
//! that neighbourhood is returned in corpus order.
//!
//! # Main types
//!
//! - [`Normalizer`] — Tokenizes, filters stopwords and lemmatizes text.
//! - [`Lemmatizer`] — Trait for morphological analyzers; [`SnowballLemmatizer`] stems,
//!   [`DictionaryLemmatizer`] is table-driven.
//! - [`EmbeddingOracle`] — Trait for nearest-neighbour lookups; [`VectorTable`] is in-memory.
//! - [`CooccurrenceTrainer`] — Builds a [`VectorTable`] from the normalized corpus.
//! - [`QueryExpander`] — Turns a query into an [`ExpandedQuery`] lemma set.
//! - [`CorpusIndex`] — Per-line lemma sets over a corpus.
//! - [`search`] — Selects lines intersecting an expanded query.
//! - [`SemanticGrep`] — Ties the pieces together.

/// Query expansion through embedding neighbours.
pub mod expansion;
/// High-level grep facade.
pub mod grep;
/// Per-line lemma index.
pub mod index;
/// Lemmatizer trait and implementations.
pub mod lemmatizer;
/// Line selection by lemma-set intersection.
pub mod matcher;
/// Text to lemma normalization.
pub mod normalizer;
/// Embedding oracle trait, in-memory table and lazy wrapper.
pub mod oracle;
/// Noise-word sets.
pub mod stopwords;
/// Count-based embedding trainer.
pub mod trainer;

pub use expansion::{ExpandedNeighbor, ExpandedQuery, LemmaExpansion, QueryExpander};
pub use grep::{GrepOutcome, SemanticGrep};
pub use index::{build_index, CorpusIndex, IndexOptions, LineRecord};
pub use lemmatizer::{DictionaryLemmatizer, IdentityLemmatizer, Lemmatizer, SnowballLemmatizer};
pub use matcher::{search, LineMatch};
pub use normalizer::{Normalizer, DEFAULT_MIN_TOKEN_LEN};
pub use oracle::{cosine_similarity, EmbeddingOracle, LazyOracle, VectorTable};
pub use stopwords::StopwordSet;
pub use trainer::{CooccurrenceTrainer, TrainerConfig};
