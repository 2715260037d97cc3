//! Lexical matching of post titles against corpus document ids.
//!
//! The score of a document is the number of distinct words its id shares with
//! the title. The first document to reach the highest score wins, and a
//! document must share at least one word to be selected at all.

use std::collections::HashSet;

use crate::corpus::Corpus;

/// Characters that separate words inside a document id.
const ID_WORD_SEPARATORS: [char; 2] = ['-', '_'];

/// Lower-cased, whitespace-separated words of a post title.
pub fn title_words(title: &str) -> HashSet<String> {
    title.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// Lower-cased words of a document id, with separators treated as spaces.
pub fn id_words(id: &str) -> HashSet<String> {
    id.replace(ID_WORD_SEPARATORS, " ")
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Number of distinct words shared by `title` and `id`.
pub fn overlap_score(title: &HashSet<String>, id: &str) -> usize {
    id_words(id).intersection(title).count()
}

/// Select the best document id for `title`, or `None` when nothing overlaps.
pub fn best_match<'c>(title: &str, corpus: &'c Corpus) -> Option<&'c str> {
    let words = title_words(title);
    let mut best: Option<&str> = None;
    let mut best_score = 0;

    for (id, _) in corpus.iter() {
        let score = overlap_score(&words, id);
        // Strict comparison: the earliest document at the maximum keeps it.
        if score > best_score {
            best_score = score;
            best = Some(id);
        }
    }

    if let Some(id) = best {
        tracing::debug!(id, score = best_score, "Matched document");
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;

    fn corpus_of(ids: &[&str]) -> Corpus {
        ids.iter()
            .map(|id| Document {
                id: id.to_string(),
                text: format!("body of {id}"),
            })
            .collect()
    }

    #[test]
    fn test_prefers_larger_overlap() {
        let corpus = corpus_of(&["install-guide", "setup-tutorial"]);
        assert_eq!(
            best_match("How to install the setup tutorial", &corpus),
            Some("setup-tutorial")
        );
    }

    #[test]
    fn test_no_overlap_returns_none() {
        let corpus = corpus_of(&["install-guide", "setup-tutorial"]);
        assert_eq!(best_match("random unrelated topic", &corpus), None);
    }

    #[test]
    fn test_tie_keeps_earliest_document() {
        let corpus = corpus_of(&["python-install", "python-setup", "rust-install"]);
        assert_eq!(best_match("python question", &corpus), Some("python-install"));

        let reversed = corpus_of(&["python-setup", "python-install"]);
        assert_eq!(best_match("python question", &reversed), Some("python-setup"));
    }

    #[test]
    fn test_later_document_wins_only_with_strictly_higher_score() {
        let corpus = corpus_of(&["python-basics", "python-async-basics"]);
        assert_eq!(
            best_match("python async basics", &corpus),
            Some("python-async-basics")
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let corpus = corpus_of(&["Docker_Compose-Tips"]);
        assert_eq!(
            best_match("DOCKER compose is confusing", &corpus),
            Some("Docker_Compose-Tips")
        );
    }

    #[test]
    fn test_repeated_words_count_once() {
        let words = title_words("rust rust rust");
        assert_eq!(overlap_score(&words, "rust-rust-guide"), 1);
    }

    #[test]
    fn test_punctuation_attached_to_title_words_does_not_match() {
        // Titles are split on whitespace only.
        let corpus = corpus_of(&["install-guide"]);
        assert_eq!(best_match("install? guide!", &corpus), None);
    }

    #[test]
    fn test_empty_corpus_and_empty_title() {
        assert_eq!(best_match("anything", &Corpus::default()), None);
        assert_eq!(best_match("", &corpus_of(&["install-guide"])), None);
    }

    #[test]
    fn test_result_is_deterministic() {
        let corpus = corpus_of(&["a-b", "b-c", "c-a", "a-b-c"]);
        let first = best_match("a b c", &corpus);
        for _ in 0..10 {
            assert_eq!(best_match("a b c", &corpus), first);
        }
        assert_eq!(first, Some("a-b-c"));
    }
}
