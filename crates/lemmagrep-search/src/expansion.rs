use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use lemmagrep_core::{Lemma, LemmagrepError};
use serde::Serialize;

use crate::normalizer::Normalizer;
use crate::oracle::EmbeddingOracle;

/// A neighbour word as returned by the oracle, after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedNeighbor {
    /// The raw vocabulary word.
    pub word: String,
    /// Its lemma, or `None` when normalization filtered it out.
    pub lemma: Option<Lemma>,
    /// Cosine similarity to the query lemma.
    pub similarity: f32,
}

/// How one query lemma was expanded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LemmaExpansion {
    /// The query lemma.
    pub lemma: Lemma,
    /// Whether the oracle answered for it. `false` both for words without a
    /// vector and when the lookup itself failed.
    pub in_vocabulary: bool,
    /// Neighbours in oracle order, most similar first.
    pub neighbors: Vec<ExpandedNeighbor>,
}

/// The semantic neighbourhood of a query: every lemma a matching line may contain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedQuery {
    /// The query as typed.
    pub query: String,
    /// Query lemmas plus normalized neighbour lemmas.
    pub lemmas: BTreeSet<Lemma>,
    /// Per-lemma detail, one entry per distinct query lemma.
    pub expansions: Vec<LemmaExpansion>,
}

impl ExpandedQuery {
    /// The query normalized to no lemmas at all (empty, or only stopwords).
    pub fn is_degenerate(&self) -> bool {
        self.expansions.is_empty()
    }

    /// Whether `lemma` belongs to the neighbourhood.
    pub fn contains(&self, lemma: &str) -> bool {
        self.lemmas.contains(lemma)
    }

    /// The lemmas the query itself normalized to.
    pub fn query_lemmas(&self) -> impl Iterator<Item = &str> {
        self.expansions.iter().map(|e| e.lemma.as_str())
    }

    /// Number of lemmas in the neighbourhood.
    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    /// Whether the neighbourhood is empty.
    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

/// Expands a query word into its lemma and the lemmas of its nearest
/// neighbours in embedding space.
///
/// Neighbour words pass through the same token pipeline as corpus words,
/// stopword filtering included, so a noise word the model happens to place
/// nearby never widens the search.
pub struct QueryExpander {
    normalizer: Arc<Normalizer>,
    oracle: Arc<dyn EmbeddingOracle>,
}

impl QueryExpander {
    /// Create an expander over a normalizer and a ready oracle.
    pub fn new(normalizer: Arc<Normalizer>, oracle: Arc<dyn EmbeddingOracle>) -> Self {
        Self { normalizer, oracle }
    }

    /// Expand `query` with up to `top_n` neighbours per query lemma.
    ///
    /// `top_n = 0` keeps only the query lemmas. An out-of-vocabulary lemma
    /// keeps only itself. The result always contains every query lemma.
    pub fn expand(&self, query: &str, top_n: usize) -> ExpandedQuery {
        let mut seen = HashSet::new();
        let query_lemmas: Vec<Lemma> = self
            .normalizer
            .normalize(query)
            .into_iter()
            .filter(|l| seen.insert(l.clone()))
            .collect();

        if query_lemmas.is_empty() {
            tracing::info!(query = %query, "Query normalized to no lemmas");
        }

        let mut lemmas = BTreeSet::new();
        let mut expansions = Vec::with_capacity(query_lemmas.len());
        for lemma in query_lemmas {
            let expansion = self.expand_lemma(lemma, top_n);
            lemmas.insert(expansion.lemma.clone());
            lemmas.extend(expansion.neighbors.iter().filter_map(|n| n.lemma.clone()));
            expansions.push(expansion);
        }

        tracing::debug!(query = %query, top_n, lemmas = lemmas.len(), "Query expanded");
        ExpandedQuery {
            query: query.to_string(),
            lemmas,
            expansions,
        }
    }

    fn expand_lemma(&self, lemma: Lemma, top_n: usize) -> LemmaExpansion {
        match self.oracle.nearest_neighbors(&lemma, top_n) {
            Ok(found) => {
                let neighbors = found
                    .into_iter()
                    .map(|n| ExpandedNeighbor {
                        lemma: self.normalizer.normalize_token(&n.word),
                        word: n.word,
                        similarity: n.similarity,
                    })
                    .collect();
                LemmaExpansion {
                    lemma,
                    in_vocabulary: true,
                    neighbors,
                }
            }
            Err(LemmagrepError::OutOfVocabulary(_)) => {
                tracing::info!(lemma = %lemma, "Lemma is out of vocabulary; matching it exactly");
                LemmaExpansion {
                    lemma,
                    in_vocabulary: false,
                    neighbors: Vec::new(),
                }
            }
            Err(e) => {
                tracing::warn!(lemma = %lemma, error = %e, "Neighbour lookup failed; matching lemma exactly");
                LemmaExpansion {
                    lemma,
                    in_vocabulary: false,
                    neighbors: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::lemmatizer::DictionaryLemmatizer;
    use crate::oracle::{LazyOracle, VectorTable};
    use crate::stopwords::StopwordSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn expander() -> QueryExpander {
        let mut dict = DictionaryLemmatizer::new();
        dict.insert_paradigm("деньги", &["денег"]);
        dict.insert_paradigm("средство", &["средства", "средств"]);
        let normalizer =
            Arc::new(Normalizer::new(StopwordSet::russian_news(), Arc::new(dict)).unwrap());

        let mut t = VectorTable::new(3).unwrap();
        t.insert("деньги", vec![1.0, 0.0, 0.0]).unwrap();
        t.insert("финансы", vec![0.95, 0.05, 0.0]).unwrap();
        t.insert("средства", vec![0.9, 0.1, 0.0]).unwrap();
        t.insert("это", vec![0.85, 0.15, 0.0]).unwrap();
        t.insert("бюджет", vec![0.8, 0.2, 0.0]).unwrap();
        t.insert("футбол", vec![0.0, 0.0, 1.0]).unwrap();
        QueryExpander::new(normalizer, Arc::new(t))
    }

    #[test]
    fn test_neighbors_are_lemmatized() {
        let q = expander().expand("денег", 2);
        assert!(q.contains("деньги"));
        assert!(q.contains("финансы"));
        assert!(q.contains("средство"));
        assert!(!q.contains("средства"));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_stopword_neighbors_are_dropped() {
        let q = expander().expand("деньги", 3);
        let e = &q.expansions[0];
        assert_eq!(e.neighbors.len(), 3);
        assert_eq!(e.neighbors[2].word, "это");
        assert_eq!(e.neighbors[2].lemma, None);
        assert!(!q.contains("это"));
    }

    #[test]
    fn test_top_n_zero_is_exact() {
        let q = expander().expand("деньги", 0);
        assert_eq!(q.lemmas.iter().collect::<Vec<_>>(), vec!["деньги"]);
        assert!(q.expansions[0].in_vocabulary);
    }

    #[test]
    fn test_out_of_vocabulary_keeps_lemma() {
        let q = expander().expand("хоккей", 5);
        assert_eq!(q.len(), 1);
        assert!(q.contains("хоккей"));
        assert!(!q.expansions[0].in_vocabulary);
        assert!(!q.is_degenerate());
    }

    #[test]
    fn test_stopword_query_is_degenerate() {
        let q = expander().expand("и", 5);
        assert!(q.is_degenerate());
        assert!(q.is_empty());
    }

    #[test]
    fn test_each_query_lemma_expanded() {
        let q = expander().expand("деньги и футбол, денег", 1);
        let lemmas: Vec<&str> = q.query_lemmas().collect();
        assert_eq!(lemmas, vec!["деньги", "футбол"]);
        assert!(q.contains("финансы"));
        // футбол's nearest neighbour is whichever word wins the zero-similarity tie
        assert_eq!(q.expansions[1].neighbors.len(), 1);
    }

    #[test]
    fn test_monotonic_in_top_n() {
        let e = expander();
        for n in 0..6 {
            let small = e.expand("деньги", n);
            let large = e.expand("деньги", n + 1);
            assert!(small.lemmas.is_subset(&large.lemmas), "top_n {n} not monotonic");
        }
    }

    #[test]
    fn test_failing_oracle_degrades_to_query_lemmas() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let oracle = LazyOracle::new(3, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(LemmagrepError::Model("training data unreadable".to_string()))
        });
        let normalizer = Arc::new(
            Normalizer::new(
                StopwordSet::russian_news(),
                Arc::new(DictionaryLemmatizer::new()),
            )
            .unwrap(),
        );
        let expander = QueryExpander::new(normalizer, Arc::new(oracle));

        let q = expander.expand("деньги", 3);
        assert!(!q.is_degenerate());
        assert_eq!(q.lemmas.iter().collect::<Vec<_>>(), vec!["деньги"]);
        assert!(!q.expansions[0].in_vocabulary);
        assert!(q.expansions[0].neighbors.is_empty());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        let q = expander.expand("деньги футбол", 3);
        assert_eq!(q.len(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
