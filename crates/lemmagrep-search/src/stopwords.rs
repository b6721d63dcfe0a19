use lemmagrep_core::{LemmagrepError, LemmagrepResult};
use std::collections::HashSet;
use std::path::Path;

/// Russian function words: pronouns, prepositions, conjunctions, particles
/// and the most frequent auxiliaries.
const RUSSIAN: &[&str] = &[
    "и", "в", "во", "не", "что", "он", "на", "я", "с", "со", "как", "а", "то", "все", "она",
    "так", "его", "но", "да", "ты", "к", "у", "же", "вы", "за", "бы", "по", "только", "ее",
    "мне", "было", "вот", "от", "меня", "еще", "нет", "о", "из", "ему", "теперь", "когда",
    "даже", "ну", "вдруг", "ли", "если", "уже", "или", "ни", "быть", "был", "него", "до",
    "вас", "нибудь", "опять", "уж", "вам", "ведь", "там", "потом", "себя", "ничего", "ей",
    "может", "они", "тут", "где", "есть", "надо", "ней", "для", "мы", "тебя", "их", "чем",
    "была", "сам", "чтоб", "без", "будто", "чего", "раз", "тоже", "себе", "под", "будет",
    "ж", "тогда", "кто", "этот", "того", "потому", "этого", "какой", "совсем", "ним",
    "здесь", "этом", "один", "почти", "мой", "тем", "чтобы", "нее", "сейчас", "были",
    "куда", "зачем", "всех", "никогда", "можно", "при", "наконец", "два", "об", "другой",
    "хоть", "после", "над", "больше", "тот", "через", "эти", "нас", "про", "всего", "них",
    "какая", "много", "разве", "три", "эту", "моя", "впрочем", "хорошо", "свою", "этой",
    "перед", "иногда", "лучше", "чуть", "том", "нельзя", "такой", "им", "более", "всегда",
    "конечно", "всю", "между",
];

/// High-frequency words of news text that carry no topic.
pub const NEWS_EXTRAS: &[&str] = &["эти", "это", "который", "свой", "весь", "наш", "ваш"];

/// A fixed set of noise words, compared after lower-casing.
///
/// Membership is a hash lookup. The set is built once and never mutated
/// while a [`Normalizer`](crate::Normalizer) holds it.
#[derive(Debug, Clone, Default)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl StopwordSet {
    /// An empty set: nothing is filtered.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in Russian list.
    pub fn russian() -> Self {
        Self::from_words(RUSSIAN.iter().copied())
    }

    /// The built-in Russian list plus [`NEWS_EXTRAS`].
    pub fn russian_news() -> Self {
        let mut set = Self::russian();
        set.extend(NEWS_EXTRAS.iter().copied());
        set
    }

    /// Build a set from arbitrary words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.extend(words);
        set
    }

    /// Add words to the set. Blank entries are ignored.
    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref().trim();
            if !word.is_empty() {
                self.words.insert(word.to_lowercase());
            }
        }
    }

    /// Add every non-blank line of a file. Lines starting with `#` are comments.
    pub fn extend_from_file(&mut self, path: &Path) -> LemmagrepResult<usize> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LemmagrepError::Config(format!(
                "Failed to read stopwords file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let before = self.words.len();
        self.extend(content.lines().filter(|l| !l.trim_start().starts_with('#')));
        Ok(self.words.len() - before)
    }

    /// Whether `word` (already lower-cased) is noise.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Number of distinct stopwords.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the set filters nothing.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_russian_contains_basics() {
        let set = StopwordSet::russian();
        for w in ["и", "в", "мне", "на", "что"] {
            assert!(set.contains(w), "{w} should be a stopword");
        }
        assert!(!set.contains("деньги"));
        assert!(!set.contains("который"));
    }

    #[test]
    fn test_news_extras_added() {
        let set = StopwordSet::russian_news();
        assert!(set.contains("который"));
        assert!(set.contains("свой"));
        assert!(set.len() > StopwordSet::russian().len());
    }

    #[test]
    fn test_extend_lowercases_and_skips_blank() {
        let mut set = StopwordSet::new();
        set.extend(["  Foo ", "", "   ", "BAR"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("foo"));
        assert!(set.contains("bar"));
    }

    #[test]
    fn test_extend_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# corpus noise").unwrap();
        writeln!(file, "заявить").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "Сообщить").unwrap();

        let mut set = StopwordSet::new();
        let added = set.extend_from_file(file.path()).unwrap();
        assert_eq!(added, 2);
        assert!(set.contains("сообщить"));
        assert!(!set.contains("# corpus noise"));
    }

    #[test]
    fn test_extend_from_missing_file() {
        let mut set = StopwordSet::new();
        let err = set
            .extend_from_file(Path::new("/no/such/stopwords.txt"))
            .unwrap_err();
        assert!(matches!(err, LemmagrepError::Config(_)));
    }
}
