use std::collections::HashSet;
use std::sync::Arc;

use lemmagrep_core::{Lemma, LemmagrepError, LemmagrepResult};
use rayon::prelude::*;
use regex::Regex;

use crate::lemmatizer::Lemmatizer;
use crate::stopwords::StopwordSet;

/// Default minimum token length, in characters.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 2;

/// Turns raw text into an ordered sequence of lemmas.
///
/// Pipeline:
/// 1. Split on non-letter boundaries (digits and punctuation separate words)
/// 2. Lowercase
/// 3. Drop tokens shorter than `min_token_len` characters
/// 4. Drop stopwords
/// 5. Lemmatize; a token the lemmatizer rejects becomes its own lemma
/// 6. Drop the lemma if it is itself a stopword
///
/// `normalize` is a pure function of its input for a fixed stopword set and
/// lemmatizer, and never fails: bad tokens degrade one at a time.
pub struct Normalizer {
    stopwords: StopwordSet,
    lemmatizer: Arc<dyn Lemmatizer>,
    min_token_len: usize,
    word_re: Regex,
}

impl Normalizer {
    /// Create a normalizer with [`DEFAULT_MIN_TOKEN_LEN`].
    pub fn new(stopwords: StopwordSet, lemmatizer: Arc<dyn Lemmatizer>) -> LemmagrepResult<Self> {
        let word_re = Regex::new(r"\p{L}+")
            .map_err(|e| LemmagrepError::Config(format!("Invalid word pattern: {e}")))?;
        Ok(Self {
            stopwords,
            lemmatizer,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
            word_re,
        })
    }

    /// Set the minimum token length in characters. Chainable builder method.
    ///
    /// A length of zero is treated as one: empty tokens never exist.
    pub fn with_min_token_len(mut self, min_token_len: usize) -> Self {
        self.min_token_len = min_token_len.max(1);
        self
    }

    /// The configured minimum token length.
    pub fn min_token_len(&self) -> usize {
        self.min_token_len
    }

    /// The stopword set in use.
    pub fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    /// Normalize `text` into lemmas, in the order the words appear.
    pub fn normalize(&self, text: &str) -> Vec<Lemma> {
        self.word_re
            .find_iter(text)
            .filter_map(|m| self.normalize_token(m.as_str()))
            .collect()
    }

    /// Normalize `text` and collapse the result into a set.
    pub fn lemma_set(&self, text: &str) -> HashSet<Lemma> {
        self.normalize(text).into_iter().collect()
    }

    /// Normalize many lines in parallel. Output order matches input order.
    pub fn normalize_lines<S>(&self, lines: &[S]) -> Vec<Vec<Lemma>>
    where
        S: AsRef<str> + Sync,
    {
        lines
            .par_iter()
            .map(|line| self.normalize(line.as_ref()))
            .collect()
    }

    /// Run one already-split word through steps 2–6.
    ///
    /// Returns `None` when the word is filtered out. Used for neighbour words
    /// returned by an embedding oracle as well as for corpus tokens.
    pub fn normalize_token(&self, token: &str) -> Option<Lemma> {
        let token = token.to_lowercase();
        if token.chars().count() < self.min_token_len || self.stopwords.contains(&token) {
            return None;
        }

        let lemma = match self.lemmatizer.lemmatize(&token) {
            Ok(lemma) if !lemma.is_empty() => lemma,
            Ok(_) => token,
            Err(e) => {
                tracing::debug!(token = %token, error = %e, "Lemmatization fallback");
                token
            }
        };

        if self.stopwords.contains(&lemma) {
            return None;
        }
        Some(lemma)
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("stopwords", &self.stopwords.len())
            .field("min_token_len", &self.min_token_len)
            .finish_non_exhaustive()
    }
}
