//! Rendering of grep outcomes for the terminal and for JSON consumers.

use lemmagrep_search::{GrepOutcome, LemmaExpansion};
use serde::Serialize;

use crate::config::QueryConfig;

#[derive(Debug, Serialize)]
pub struct QueryReport<'a> {
    pub query: &'a str,
    pub degenerate: bool,
    pub lemmas: Vec<&'a str>,
    pub expansions: &'a [LemmaExpansion],
    pub total_matches: usize,
    pub matches: Vec<MatchReport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct MatchReport<'a> {
    pub line_number: usize,
    pub text: &'a str,
    pub matched: &'a [String],
}

impl<'a> QueryReport<'a> {
    pub fn new(query: &'a str, outcome: &'a GrepOutcome<'_>, config: &QueryConfig) -> Self {
        let shown = if config.max_results == 0 {
            outcome.matches().len()
        } else {
            config.max_results
        };
        let matches = outcome
            .matches()
            .iter()
            .take(shown)
            .map(|m| MatchReport {
                line_number: m.line_number(),
                text: m.text(),
                matched: &m.matched,
            })
            .collect();

        let (lemmas, expansions): (Vec<&str>, &[LemmaExpansion]) = match outcome.expansion() {
            Some(e) => (e.lemmas.iter().map(String::as_str).collect(), e.expansions.as_slice()),
            None => (Vec::new(), &[][..]),
        };

        Self {
            query,
            degenerate: outcome.is_degenerate(),
            lemmas,
            expansions,
            total_matches: outcome.matches().len(),
            matches,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_text(&self, display_width: usize) -> String {
        let mut out = String::new();
        if self.degenerate {
            out.push_str(&format!(
                "Query '{}' has no searchable words (empty or only stopwords).\n",
                self.query
            ));
            return out;
        }

        out.push_str(&format!("Query '{}'\n", self.query));
        for expansion in self.expansions {
            if !expansion.in_vocabulary {
                out.push_str(&format!("  {}: not in model vocabulary\n", expansion.lemma));
                continue;
            }
            let neighbors: Vec<String> = expansion
                .neighbors
                .iter()
                .map(|n| match &n.lemma {
                    Some(lemma) => format!("{lemma} ({:.2})", n.similarity),
                    None => format!("{} ({:.2}, filtered)", n.word, n.similarity),
                })
                .collect();
            out.push_str(&format!("  {}: {}\n", expansion.lemma, neighbors.join(", ")));
        }
        out.push_str(&format!("  searching: {}\n", self.lemmas.join(", ")));

        for m in &self.matches {
            out.push_str(&format!(
                "[Line {}] [{}]: {}\n",
                m.line_number,
                m.matched.join(", "),
                truncate(m.text, display_width)
            ));
        }
        let hidden = self.total_matches - self.matches.len();
        if hidden > 0 {
            out.push_str(&format!("... {hidden} more match(es) not shown\n"));
        }
        out.push_str(&format!("{} match(es)\n", self.total_matches));
        out
    }
}

/// At most `width` characters of `text`, with `...` appended when cut.
fn truncate(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use lemmagrep_search::{
        build_index, IdentityLemmatizer, Normalizer, SemanticGrep, StopwordSet, VectorTable,
    };
    use std::sync::Arc;

    fn grep() -> SemanticGrep {
        let normalizer =
            Arc::new(Normalizer::new(StopwordSet::russian(), Arc::new(IdentityLemmatizer)).unwrap());
        let index = build_index(
            &["деньги на ремонт", "финансы города", "матч вечером", "деньги и финансы"],
            &normalizer,
        );
        let mut table = VectorTable::new(2).unwrap();
        table.insert("деньги", vec![1.0, 0.0]).unwrap();
        table.insert("финансы", vec![0.9, 0.1]).unwrap();
        table.insert("матч", vec![0.0, 1.0]).unwrap();
        SemanticGrep::new(index, normalizer, Arc::new(table))
    }

    fn config(max_results: usize) -> QueryConfig {
        QueryConfig {
            max_results,
            ..QueryConfig::default()
        }
    }

    #[test]
    fn test_text_report_lists_matches() {
        let g = grep();
        let outcome = g.grep("деньги", 1);
        let text = QueryReport::new("деньги", &outcome, &config(10)).to_text(100);
        assert!(text.contains("деньги: финансы (0.99)"));
        assert!(text.contains("[Line 1] [деньги]: деньги на ремонт"));
        assert!(text.contains("[Line 4] [деньги, финансы]: деньги и финансы"));
        assert!(text.ends_with("3 match(es)\n"));
    }

    #[test]
    fn test_max_results_limits_shown() {
        let g = grep();
        let outcome = g.grep("деньги", 1);
        let report = QueryReport::new("деньги", &outcome, &config(1));
        assert_eq!(report.matches.len(), 1);
        assert_eq!(report.total_matches, 3);
        assert!(report.to_text(100).contains("... 2 more match(es) not shown"));
    }

    #[test]
    fn test_degenerate_report() {
        let g = grep();
        let outcome = g.grep("и", 4);
        let report = QueryReport::new("и", &outcome, &config(10));
        assert!(report.degenerate);
        assert!(report.to_text(100).contains("no searchable words"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["degenerate"], true);
        assert_eq!(json["total_matches"], 0);
    }

    #[test]
    fn test_json_report() {
        let g = grep();
        let outcome = g.grep("матч", 0);
        let report = QueryReport::new("матч", &outcome, &config(0));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["lemmas"], serde_json::json!(["матч"]));
        assert_eq!(json["matches"][0]["line_number"], 3);
        assert_eq!(json["matches"][0]["matched"], serde_json::json!(["матч"]));
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("деньги", 3), "ден...");
        assert_eq!(truncate("деньги", 6), "деньги");
        assert_eq!(truncate("деньги", 60), "деньги");
    }
}
