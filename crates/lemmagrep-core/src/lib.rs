//! Core types and error definitions for lemmagrep.
//!
//! This crate provides the foundational types shared across all lemmagrep
//! crates: the unified error enum and the small value types that flow between
//! the normalizer, the embedding oracle and the matcher.
//!
//! # Main types
//!
//! - [`LemmagrepError`] — Unified error enum for all lemmagrep subsystems.
//! - [`LemmagrepResult`] — Convenience alias for `Result<T, LemmagrepError>`.
//! - [`Lemma`] — Canonical dictionary form of a word.
//! - [`Neighbor`] — A word returned by a nearest-neighbour query, with its similarity.

use serde::{Deserialize, Serialize};

// --- Error types ---

/// Top-level error type for lemmagrep.
///
/// Per-token and per-lemma variants ([`LemmagrepError::Lemmatization`],
/// [`LemmagrepError::OutOfVocabulary`]) are produced by collaborators and
/// absorbed by the search pipeline; they only surface to callers that talk to
/// a collaborator directly.
#[derive(Debug, thiserror::Error)]
pub enum LemmagrepError {
    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// The corpus could not be read or split into lines.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// The embedding model could not be built or loaded.
    #[error("Model error: {0}")]
    Model(String),

    /// A token could not be morphologically analyzed.
    #[error("Lemmatization failed for token '{0}'")]
    Lemmatization(String),

    /// A word has no trained vector.
    #[error("Word '{0}' is out of vocabulary")]
    OutOfVocabulary(String),

    /// A caller broke an operation's precondition.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`LemmagrepError`].
pub type LemmagrepResult<T> = Result<T, LemmagrepError>;

// --- Value types ---

/// Canonical dictionary form of a token. The atomic unit of comparison.
pub type Lemma = String;

/// One entry of a nearest-neighbour answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// The neighbouring vocabulary word, as the model stores it.
    pub word: String,
    /// Cosine similarity to the queried word, in `[-1, 1]`.
    pub similarity: f32,
}

impl Neighbor {
    /// Creates a neighbour entry.
    pub fn new(word: impl Into<String>, similarity: f32) -> Self {
        Self {
            word: word.into(),
            similarity,
        }
    }
}
