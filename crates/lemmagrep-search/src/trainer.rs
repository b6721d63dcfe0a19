use std::collections::{BTreeMap, HashMap};

use lemmagrep_core::{Lemma, LemmagrepError, LemmagrepResult};
use serde::{Deserialize, Serialize};

use crate::oracle::VectorTable;

/// Settings for [`CooccurrenceTrainer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Number of vector components.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Context words considered on each side of a word.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Words seen fewer times than this get no vector.
    #[serde(default = "default_min_count")]
    pub min_count: usize,
}

fn default_dimension() -> usize {
    100
}
fn default_window() -> usize {
    5
}
fn default_min_count() -> usize {
    5
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            window: default_window(),
            min_count: default_min_count(),
        }
    }
}

/// Count-based distributional model over lemma sentences.
///
/// For every vocabulary word the trainer accumulates co-occurrence weights
/// (`1 / distance`) inside a symmetric window, reweights them with positive
/// pointwise mutual information, and folds the context dimensions into a
/// fixed-size vector by signed feature hashing. Words that occur in similar
/// contexts end up with similar vectors.
///
/// Training is deterministic: the same sentences always give the same table.
#[derive(Debug, Clone)]
pub struct CooccurrenceTrainer {
    config: TrainerConfig,
}

impl CooccurrenceTrainer {
    /// Validate `config` and create a trainer.
    pub fn new(config: TrainerConfig) -> LemmagrepResult<Self> {
        if config.dimension == 0 {
            return Err(LemmagrepError::Config(
                "model.dimension must be greater than zero".to_string(),
            ));
        }
        if config.window == 0 {
            return Err(LemmagrepError::Config(
                "model.window must be greater than zero".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// The trainer's settings.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Build a vector table from normalized sentences.
    pub fn train(&self, sentences: &[Vec<Lemma>]) -> LemmagrepResult<VectorTable> {
        let vocab = self.build_vocabulary(sentences);
        let ids: HashMap<&str, usize> = vocab
            .iter()
            .enumerate()
            .map(|(id, w)| (w.as_str(), id))
            .collect();

        // word id -> (context id -> weight); BTreeMap keeps summation order fixed
        let mut cooc: Vec<BTreeMap<usize, f64>> = vec![BTreeMap::new(); vocab.len()];
        for sentence in sentences {
            let seq: Vec<Option<usize>> = sentence
                .iter()
                .map(|w| ids.get(w.as_str()).copied())
                .collect();
            for (i, center) in seq.iter().enumerate() {
                let Some(center) = *center else { continue };
                let lo = i.saturating_sub(self.config.window);
                let hi = (i + self.config.window).min(seq.len().saturating_sub(1));
                for (j, ctx) in seq.iter().enumerate().take(hi + 1).skip(lo) {
                    if j == i {
                        continue;
                    }
                    if let Some(ctx) = *ctx {
                        let distance = i.abs_diff(j) as f64;
                        *cooc[center].entry(ctx).or_insert(0.0) += 1.0 / distance;
                    }
                }
            }
        }

        let marginals: Vec<f64> = cooc.iter().map(|row| row.values().sum()).collect();
        let total: f64 = marginals.iter().sum();
        let hashes: Vec<u32> = vocab.iter().map(|w| fnv1a(w.as_bytes())).collect();

        let dimension = self.config.dimension;
        let mut table = VectorTable::new(dimension)?;
        for (id, row) in cooc.iter().enumerate() {
            let mut vector = vec![0.0f32; dimension];
            for (&ctx, &weight) in row {
                let denom = marginals[id] * marginals[ctx];
                if denom <= 0.0 {
                    continue;
                }
                let pmi = (weight * total / denom).ln();
                if pmi <= 0.0 {
                    continue;
                }
                let hash = hashes[ctx];
                let sign = if hash & 0x8000_0000 == 0 { 1.0 } else { -1.0 };
                vector[hash as usize % dimension] += sign * pmi as f32;
            }
            table.insert(vocab[id].clone(), vector)?;
        }

        tracing::info!(
            sentences = sentences.len(),
            vocabulary = vocab.len(),
            dimension,
            window = self.config.window,
            "Embedding table trained"
        );
        Ok(table)
    }

    /// Words meeting `min_count`, sorted so ids are stable.
    fn build_vocabulary(&self, sentences: &[Vec<Lemma>]) -> Vec<Lemma> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for word in sentences.iter().flatten() {
            *counts.entry(word.as_str()).or_insert(0) += 1;
        }
        let mut vocab: Vec<Lemma> = counts
            .into_iter()
            .filter(|(_, count)| *count >= self.config.min_count)
            .map(|(word, _)| word.to_string())
            .collect();
        vocab.sort();
        vocab
    }
}

/// FNV-1a hash used to place context words in vector components.
fn fnv1a(data: &[u8]) -> u32 {
    let mut hash: u32 = 2166136261;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(16777619);
    }
    hash
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::oracle::EmbeddingOracle;

    fn sentences(raw: &[&str]) -> Vec<Vec<Lemma>> {
        raw.iter()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    fn corpus() -> Vec<Vec<Lemma>> {
        let mut out = Vec::new();
        for _ in 0..3 {
            out.extend(sentences(&[
                "нужный деньги ремонт квартира",
                "нужный финансы ремонт квартира",
                "футбольный матч начинаться вечер",
                "футбольный игра начинаться вечер",
            ]));
        }
        out
    }

    fn trainer(min_count: usize) -> CooccurrenceTrainer {
        CooccurrenceTrainer::new(TrainerConfig {
            dimension: 64,
            window: 2,
            min_count,
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = TrainerConfig {
            dimension: 0,
            ..TrainerConfig::default()
        };
        assert!(CooccurrenceTrainer::new(cfg).is_err());
        let cfg = TrainerConfig {
            window: 0,
            ..TrainerConfig::default()
        };
        assert!(CooccurrenceTrainer::new(cfg).is_err());
    }

    #[test]
    fn test_default_config() {
        let cfg = TrainerConfig::default();
        assert_eq!(cfg.dimension, 100);
        assert_eq!(cfg.window, 5);
        assert_eq!(cfg.min_count, 5);
    }

    #[test]
    fn test_shared_contexts_make_neighbors() {
        let table = trainer(1).train(&corpus()).unwrap();
        let n = table.nearest_neighbors("деньги", 1).unwrap();
        assert_eq!(n[0].word, "финансы");
        assert!(n[0].similarity > 0.99);

        let n = table.nearest_neighbors("матч", 1).unwrap();
        assert_eq!(n[0].word, "игра");
    }

    #[test]
    fn test_min_count_limits_vocabulary() {
        let mut data = corpus();
        data.push(vec!["редкий".to_string(), "деньги".to_string()]);
        let table = trainer(3).train(&data).unwrap();
        assert!(table.contains("деньги"));
        assert!(!table.contains("редкий"));
    }

    #[test]
    fn test_training_is_deterministic() {
        let a = trainer(1).train(&corpus()).unwrap();
        let b = trainer(1).train(&corpus()).unwrap();
        for word in a.words() {
            assert_eq!(a.vector(word), b.vector(word));
        }
    }

    #[test]
    fn test_empty_corpus() {
        let table = trainer(1).train(&[]).unwrap();
        assert_eq!(table.vocabulary_size(), 0);
        assert_eq!(table.dimension(), 64);
    }
}
