use lemmagrep_core::{Lemma, LemmagrepError, LemmagrepResult};
use std::collections::HashMap;
use std::path::Path;

use rust_stemmers::{Algorithm, Stemmer};

/// Maps an inflected, lower-cased token to its dictionary form.
///
/// Implementations report tokens they cannot analyze with
/// [`LemmagrepError::Lemmatization`]. Callers decide how to degrade; the
/// [`Normalizer`](crate::Normalizer) keeps the token as its own lemma.
/// Any compatibility work an analyzer backend needs stays behind this trait.
pub trait Lemmatizer: Send + Sync {
    /// Return the lemma of `token`.
    fn lemmatize(&self, token: &str) -> LemmagrepResult<Lemma>;
}

/// Treats every token as its own lemma.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, token: &str) -> LemmagrepResult<Lemma> {
        Ok(token.to_string())
    }
}

/// Snowball stemmer used as a lemmatizer.
///
/// Inflections of one word collapse to a shared stem (`футбола`, `футболу`
/// and `футбол` all become `футбол`). The stem is applied until it stops
/// shrinking, so stemming a stem returns it unchanged and neighbour words
/// from a model trained on stems fold back onto themselves.
pub struct SnowballLemmatizer {
    stemmer: Stemmer,
}

impl SnowballLemmatizer {
    /// Stemmer for the given Snowball algorithm.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            stemmer: Stemmer::create(algorithm),
        }
    }

    /// The Russian Snowball stemmer.
    pub fn russian() -> Self {
        Self::new(Algorithm::Russian)
    }
}

impl Default for SnowballLemmatizer {
    fn default() -> Self {
        Self::russian()
    }
}

impl std::fmt::Debug for SnowballLemmatizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowballLemmatizer").finish_non_exhaustive()
    }
}

impl Lemmatizer for SnowballLemmatizer {
    fn lemmatize(&self, token: &str) -> LemmagrepResult<Lemma> {
        let mut current = token.to_string();
        loop {
            let next = self.stemmer.stem(&current);
            if next.is_empty() || next.len() >= current.len() {
                break;
            }
            current = next.into_owned();
        }
        if current.is_empty() {
            return Err(LemmagrepError::Lemmatization(token.to_string()));
        }
        Ok(current)
    }
}

/// Table-driven lemmatizer backed by a `form -> lemma` dictionary.
///
/// Unknown forms are reported as [`LemmagrepError::Lemmatization`].
#[derive(Debug, Clone, Default)]
pub struct DictionaryLemmatizer {
    forms: HashMap<String, Lemma>,
}

impl DictionaryLemmatizer {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `form` as an inflection of `lemma`. Both are lower-cased.
    pub fn insert(&mut self, form: &str, lemma: &str) {
        self.forms.insert(form.to_lowercase(), lemma.to_lowercase());
    }

    /// Register several forms of one lemma. The lemma maps to itself.
    pub fn insert_paradigm(&mut self, lemma: &str, forms: &[&str]) {
        self.insert(lemma, lemma);
        for form in forms {
            self.insert(form, lemma);
        }
    }

    /// Parse tab-separated `form<TAB>lemma` lines.
    ///
    /// Blank lines and lines starting with `#` are skipped. A line without a
    /// tab or with an empty column is rejected with its 1-based line number.
    pub fn from_tsv(content: &str) -> LemmagrepResult<Self> {
        let mut dict = Self::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '\t');
            let form = parts.next().map(str::trim).unwrap_or_default();
            let lemma = parts.next().map(str::trim).unwrap_or_default();
            if form.is_empty() || lemma.is_empty() {
                return Err(LemmagrepError::Config(format!(
                    "Invalid lemma dictionary entry on line {}: '{}'",
                    idx + 1,
                    line
                )));
            }
            dict.insert(form, lemma);
        }
        Ok(dict)
    }

    /// Load a TSV dictionary from disk.
    pub fn load(path: &Path) -> LemmagrepResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LemmagrepError::Config(format!(
                "Failed to read lemma dictionary '{}': {}",
                path.display(),
                e
            ))
        })?;
        let dict = Self::from_tsv(&content)?;
        tracing::info!(path = %path.display(), forms = dict.len(), "Lemma dictionary loaded");
        Ok(dict)
    }

    /// Number of known forms.
    pub fn len(&self) -> usize {
        self.forms.len()
    }

    /// Whether no forms are known.
    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl Lemmatizer for DictionaryLemmatizer {
    fn lemmatize(&self, token: &str) -> LemmagrepResult<Lemma> {
        self.forms
            .get(token)
            .cloned()
            .ok_or_else(|| LemmagrepError::Lemmatization(token.to_string()))
    }
}
