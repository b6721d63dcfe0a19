//! `lemmagrep.toml` loading.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) gives a working Russian-news setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lemmagrep_core::{LemmagrepError, LemmagrepResult};
use lemmagrep_search::stopwords::NEWS_EXTRAS;
use lemmagrep_search::{
    DictionaryLemmatizer, IdentityLemmatizer, IndexOptions, Lemmatizer, Normalizer,
    SnowballLemmatizer, StopwordSet, TrainerConfig, DEFAULT_MIN_TOKEN_LEN,
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LemmagrepConfig {
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub model: TrainerConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
    /// Field to index when a line has three or more tab-separated parts.
    #[serde(default = "default_tab_field")]
    pub tab_field: usize,
    #[serde(default)]
    pub skip_empty: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            tab_field: default_tab_field(),
            skip_empty: false,
        }
    }
}

impl CorpusConfig {
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            skip_empty: self.skip_empty,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    /// Start from the built-in Russian stopword list.
    #[serde(default = "default_true")]
    pub builtin_stopwords: bool,
    #[serde(default = "default_extra_stopwords")]
    pub extra_stopwords: Vec<String>,
    #[serde(default)]
    pub stopwords_file: Option<PathBuf>,
    /// TSV `form<TAB>lemma`. Replaces the stemmer when set.
    #[serde(default)]
    pub lemma_dictionary: Option<PathBuf>,
    /// Fold inflections with the Russian Snowball stemmer when no dictionary
    /// is configured. When off, every token is its own lemma.
    #[serde(default = "default_true")]
    pub stemming: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_token_len: default_min_token_len(),
            builtin_stopwords: true,
            extra_stopwords: default_extra_stopwords(),
            stopwords_file: None,
            lemma_dictionary: None,
            stemming: true,
        }
    }
}

impl NormalizerConfig {
    /// Build the normalizer, resolving relative paths against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> LemmagrepResult<Normalizer> {
        let mut stopwords = if self.builtin_stopwords {
            StopwordSet::russian()
        } else {
            StopwordSet::new()
        };
        stopwords.extend(&self.extra_stopwords);
        if let Some(file) = &self.stopwords_file {
            let added = stopwords.extend_from_file(&base_dir.join(file))?;
            tracing::info!(added, "Stopwords loaded from file");
        }

        let lemmatizer: Arc<dyn Lemmatizer> = match &self.lemma_dictionary {
            Some(path) => Arc::new(DictionaryLemmatizer::load(&base_dir.join(path))?),
            None if self.stemming => Arc::new(SnowballLemmatizer::russian()),
            None => {
                tracing::warn!("Stemming disabled and no lemma dictionary; tokens are their own lemmas");
                Arc::new(IdentityLemmatizer)
            }
        };

        Ok(Normalizer::new(stopwords, lemmatizer)?.with_min_token_len(self.min_token_len))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Neighbours requested per query lemma.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Matches printed per query; 0 prints all.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Characters of each matching line shown in text output.
    #[serde(default = "default_display_width")]
    pub display_width: usize,
    /// Train the model on the first query instead of at startup.
    #[serde(default)]
    pub lazy_training: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            max_results: default_max_results(),
            display_width: default_display_width(),
            lazy_training: false,
        }
    }
}

fn default_tab_field() -> usize {
    2
}
fn default_min_token_len() -> usize {
    DEFAULT_MIN_TOKEN_LEN
}
fn default_true() -> bool {
    true
}
fn default_extra_stopwords() -> Vec<String> {
    NEWS_EXTRAS.iter().map(|s| s.to_string()).collect()
}
fn default_top_n() -> usize {
    4
}
fn default_max_results() -> usize {
    10
}
fn default_display_width() -> usize {
    100
}

impl LemmagrepConfig {
    /// Parse TOML text and validate it.
    pub fn parse(content: &str) -> LemmagrepResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| LemmagrepError::Config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub async fn load(path: &Path) -> LemmagrepResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            LemmagrepError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    fn validate(&self) -> LemmagrepResult<()> {
        if self.model.dimension == 0 {
            return Err(LemmagrepError::Config(
                "model.dimension must be greater than zero".to_string(),
            ));
        }
        if self.model.window == 0 {
            return Err(LemmagrepError::Config(
                "model.window must be greater than zero".to_string(),
            ));
        }
        if self.normalizer.min_token_len == 0 {
            return Err(LemmagrepError::Config(
                "normalizer.min_token_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LemmagrepConfig::parse("").unwrap();
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.corpus.tab_field, 2);
        assert!(!config.corpus.skip_empty);
        assert_eq!(config.normalizer.min_token_len, 2);
        assert!(config.normalizer.extra_stopwords.contains(&"который".to_string()));
        assert_eq!(config.model, TrainerConfig::default());
        assert_eq!(config.query.top_n, 4);
        assert_eq!(config.query.max_results, 10);
        assert_eq!(config.query.display_width, 100);
    }

    #[test]
    fn test_partial_sections() {
        let config = LemmagrepConfig::parse(
            r#"
log_format = "json"

[model]
min_count = 1

[query]
top_n = 0
"#,
        )
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.model.min_count, 1);
        assert_eq!(config.model.dimension, 100);
        assert_eq!(config.query.top_n, 0);
        assert_eq!(config.query.max_results, 10);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = LemmagrepConfig::parse("[model]\ndimension = 0\n").unwrap_err();
        assert!(err.to_string().contains("model.dimension"));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = LemmagrepConfig::parse("[query\ntop_n = ").unwrap_err();
        assert!(matches!(err, LemmagrepError::Config(_)));
    }

    #[test]
    fn test_normalizer_build_resolves_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("lemmas.tsv"), "денег\tденьги\n").unwrap();
        std::fs::write(tmp.path().join("stop.txt"), "ремонт\n").unwrap();

        let config = LemmagrepConfig::parse(
            r#"
[normalizer]
lemma_dictionary = "lemmas.tsv"
stopwords_file = "stop.txt"
"#,
        )
        .unwrap();
        let normalizer = config.normalizer.build(tmp.path()).unwrap();
        assert_eq!(normalizer.normalize("денег на ремонт"), vec!["деньги"]);
    }

    #[test]
    fn test_default_normalizer_collapses_inflections() {
        let config = LemmagrepConfig::default();
        assert!(config.normalizer.stemming);
        let normalizer = config.normalizer.build(Path::new(".")).unwrap();

        let base = normalizer.normalize("футбол");
        assert_eq!(base.len(), 1);
        for form in ["футбола", "футболу", "Футболом"] {
            assert_eq!(normalizer.normalize(form), base, "form {form}");
        }
        assert_eq!(normalizer.normalize("ремонта"), normalizer.normalize("ремонтом"));
    }

    #[test]
    fn test_stemming_off_keeps_tokens() {
        let config = LemmagrepConfig::parse("[normalizer]\nstemming = false\n").unwrap();
        let normalizer = config.normalizer.build(Path::new(".")).unwrap();
        assert_eq!(normalizer.normalize("футбола"), vec!["футбола"]);
    }

    #[test]
    fn test_normalizer_build_missing_dictionary() {
        let tmp = tempfile::tempdir().unwrap();
        let config = NormalizerConfig {
            lemma_dictionary: Some(PathBuf::from("absent.tsv")),
            ..NormalizerConfig::default()
        };
        assert!(config.build(tmp.path()).is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("lemmagrep.toml");
        tokio::fs::write(&path, "[query]\nmax_results = 3\n").await.unwrap();
        let config = LemmagrepConfig::load(&path).await.unwrap();
        assert_eq!(config.query.max_results, 3);
    }
}
