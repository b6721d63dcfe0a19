use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use lemmagrep_core::{LemmagrepError, LemmagrepResult, Neighbor};
use once_cell::sync::OnceCell;

/// Read-only nearest-neighbour access to a word embedding space.
///
/// Implementations must be safe for any number of concurrent readers.
pub trait EmbeddingOracle: Send + Sync {
    /// Up to `k` vocabulary words closest to `word` by cosine similarity,
    /// most similar first. `word` itself is never returned.
    ///
    /// Returns [`LemmagrepError::OutOfVocabulary`] when `word` has no vector.
    fn nearest_neighbors(&self, word: &str, k: usize) -> LemmagrepResult<Vec<Neighbor>>;

    /// Whether `word` has a vector.
    fn contains(&self, word: &str) -> bool;

    /// Dimension of the vectors.
    fn dimension(&self) -> usize;

    /// Number of words with a vector.
    fn vocabulary_size(&self) -> usize;
}

impl<T: EmbeddingOracle + ?Sized> EmbeddingOracle for Arc<T> {
    fn nearest_neighbors(&self, word: &str, k: usize) -> LemmagrepResult<Vec<Neighbor>> {
        (**self).nearest_neighbors(word, k)
    }

    fn contains(&self, word: &str) -> bool {
        (**self).contains(word)
    }

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn vocabulary_size(&self) -> usize {
        (**self).vocabulary_size()
    }
}

/// In-memory word vectors with brute-force cosine search.
///
/// Vectors are L2-normalized on insert so similarity is a dot product.
/// Ties in similarity are broken by word, so for a fixed table the top `k`
/// answer is always a prefix of the top `k + 1` answer.
#[derive(Debug, Clone)]
pub struct VectorTable {
    dimension: usize,
    words: Vec<String>,
    vectors: Vec<Vec<f32>>,
    lookup: HashMap<String, usize>,
}

impl VectorTable {
    /// Create an empty table for vectors of `dimension` components.
    pub fn new(dimension: usize) -> LemmagrepResult<Self> {
        if dimension == 0 {
            return Err(LemmagrepError::InvalidArgument(
                "Vector dimension must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            words: Vec::new(),
            vectors: Vec::new(),
            lookup: HashMap::new(),
        })
    }

    /// Insert or replace the vector for `word`.
    pub fn insert(&mut self, word: impl Into<String>, mut vector: Vec<f32>) -> LemmagrepResult<()> {
        if vector.len() != self.dimension {
            return Err(LemmagrepError::InvalidArgument(format!(
                "Vector has {} components, table expects {}",
                vector.len(),
                self.dimension
            )));
        }
        l2_normalize(&mut vector);

        let word = word.into();
        match self.lookup.get(&word) {
            Some(&idx) => self.vectors[idx] = vector,
            None => {
                self.lookup.insert(word.clone(), self.words.len());
                self.words.push(word);
                self.vectors.push(vector);
            }
        }
        Ok(())
    }

    /// The stored (normalized) vector of `word`.
    pub fn vector(&self, word: &str) -> Option<&[f32]> {
        self.lookup.get(word).map(|&idx| self.vectors[idx].as_slice())
    }

    /// Cosine similarity between two vocabulary words.
    pub fn similarity(&self, a: &str, b: &str) -> LemmagrepResult<f32> {
        let va = self
            .vector(a)
            .ok_or_else(|| LemmagrepError::OutOfVocabulary(a.to_string()))?;
        let vb = self
            .vector(b)
            .ok_or_else(|| LemmagrepError::OutOfVocabulary(b.to_string()))?;
        Ok(cosine_similarity(va, vb))
    }

    /// Vocabulary words in insertion order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

impl EmbeddingOracle for VectorTable {
    fn nearest_neighbors(&self, word: &str, k: usize) -> LemmagrepResult<Vec<Neighbor>> {
        let &target = self
            .lookup
            .get(word)
            .ok_or_else(|| LemmagrepError::OutOfVocabulary(word.to_string()))?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let query = &self.vectors[target];
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != target)
            .map(|(idx, v)| (idx, cosine_similarity(query, v)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| self.words[a.0].cmp(&self.words[b.0]))
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, sim)| Neighbor::new(self.words[idx].clone(), sim))
            .collect())
    }

    fn contains(&self, word: &str) -> bool {
        self.lookup.contains_key(word)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vocabulary_size(&self) -> usize {
        self.words.len()
    }
}

/// An oracle whose table is built on first use.
///
/// The builder runs at most once even when several threads race on the first
/// query; later callers block until it finishes and then share the result.
/// A failed build is not cached: the next query tries again.
pub struct LazyOracle<F>
where
    F: Fn() -> LemmagrepResult<VectorTable> + Send + Sync,
{
    cell: OnceCell<VectorTable>,
    dimension: usize,
    build: F,
}

impl<F> LazyOracle<F>
where
    F: Fn() -> LemmagrepResult<VectorTable> + Send + Sync,
{
    /// Wrap a builder of `dimension`-sized vectors. Nothing runs until the first query.
    pub fn new(dimension: usize, build: F) -> Self {
        Self {
            cell: OnceCell::new(),
            dimension,
            build,
        }
    }

    /// The table, building it if needed.
    pub fn table(&self) -> LemmagrepResult<&VectorTable> {
        self.cell.get_or_try_init(|| {
            tracing::info!("Building embedding table on first use");
            let table = (self.build)()?;
            if table.dimension() != self.dimension {
                return Err(LemmagrepError::Model(format!(
                    "Built table has dimension {}, expected {}",
                    table.dimension(),
                    self.dimension
                )));
            }
            Ok(table)
        })
    }

    /// Whether the table has been built.
    pub fn is_ready(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<F> EmbeddingOracle for LazyOracle<F>
where
    F: Fn() -> LemmagrepResult<VectorTable> + Send + Sync,
{
    fn nearest_neighbors(&self, word: &str, k: usize) -> LemmagrepResult<Vec<Neighbor>> {
        self.table()?.nearest_neighbors(word, k)
    }

    fn contains(&self, word: &str) -> bool {
        self.table().is_ok_and(|t| t.contains(word))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn vocabulary_size(&self) -> usize {
        self.table().map_or(0, VectorTable::vocabulary_size)
    }
}

/// Cosine similarity of two equal-length vectors; zero if either is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
