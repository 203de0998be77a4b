//! Sentiment keyword lexicon
//!
//! Process-wide, read-only lookup tables for the keyword sentiment strategy.
//! Built once on first use; nothing mutates them afterwards.
//!
//! Matching is case-insensitive substring containment against the lowercased
//! comment. A single word counts 1, a phrase counts 2.

use once_cell::sync::Lazy;
use std::collections::BTreeSet;

/// Weight of a matched single word
pub const WORD_WEIGHT: u32 = 1;

/// Weight of a matched phrase
pub const PHRASE_WEIGHT: u32 = 2;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "love", "fantastic", "wonderful", "awesome",
    "perfect", "best", "brilliant", "outstanding", "superb", "happy", "pleased", "satisfied",
    "impressed", "recommend", "quality", "efficient", "responsive", "helpful", "clear", "easy",
    "successful", "seamless", "professional", "dedication", "exceeded", "approve", "support",
    "beneficial", "agree", "help", "grow", "encourage", "innovation", "improve", "benefit",
    "progressive", "initiative", "simplify", "transparency", "appreciate", "effort",
    "important",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "worst", "poor", "disappointing", "horrible",
    "useless", "waste", "broken", "defective", "unhappy", "frustrated", "angry", "annoyed",
    "problem", "damaged", "disappointed", "refused", "unhelpful", "complicated",
    "time-consuming", "concerns", "failed", "difficult", "expensive", "overpriced",
    "confusing", "burden", "impractical", "corruption", "inaccessible", "delay", "paperwork",
    "drawbacks", "harmful", "oppose", "disagree",
];

const POSITIVE_PHRASES: &[&str] = &[
    "excellent quality", "highly recommend", "exceeded expectations", "excellent work",
    "great initiative", "much needed", "easy to follow", "help startups",
    "encourage innovation", "benefits small businesses", "improves transparency",
    "good points", "well done", "fully support",
];

const NEGATIVE_PHRASES: &[&str] = &[
    "extremely disappointed", "not helpful", "low quality", "poor quality",
    "terrible experience", "bad quality", "refused to help", "waste of time",
    "do not support", "strongly oppose",
];

/// Positive and negative hit totals for one comment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub positive: u32,
    pub negative: u32,
}

/// Immutable keyword tables
#[derive(Debug)]
pub struct Lexicon {
    positive_words: BTreeSet<String>,
    negative_words: BTreeSet<String>,
    positive_phrases: BTreeSet<String>,
    negative_phrases: BTreeSet<String>,
}

impl Lexicon {
    fn build() -> Self {
        fn table(entries: &[&str]) -> BTreeSet<String> {
            entries.iter().map(|e| e.trim().to_lowercase()).collect()
        }

        Self {
            positive_words: table(POSITIVE_WORDS),
            negative_words: table(NEGATIVE_WORDS),
            positive_phrases: table(POSITIVE_PHRASES),
            negative_phrases: table(NEGATIVE_PHRASES),
        }
    }

    /// Count weighted hits in `text`
    pub fn hits(&self, text: &str) -> KeywordHits {
        let lowered = text.to_lowercase();
        let count = |table: &BTreeSet<String>, weight: u32| -> u32 {
            table
                .iter()
                .filter(|entry| lowered.contains(entry.as_str()))
                .count() as u32
                * weight
        };

        KeywordHits {
            positive: count(&self.positive_words, WORD_WEIGHT)
                + count(&self.positive_phrases, PHRASE_WEIGHT),
            negative: count(&self.negative_words, WORD_WEIGHT)
                + count(&self.negative_phrases, PHRASE_WEIGHT),
        }
    }
}

/// The lexicon shared by every keyword classification
pub static LEXICON: Lazy<Lexicon> = Lazy::new(Lexicon::build);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_and_negative_tables_are_disjoint() {
        let lexicon = &*LEXICON;
        assert!(lexicon.positive_words.is_disjoint(&lexicon.negative_words));
        assert!(lexicon.positive_phrases.is_disjoint(&lexicon.negative_phrases));
        assert!(lexicon.positive_words.is_disjoint(&lexicon.negative_phrases));
        assert!(lexicon.negative_words.is_disjoint(&lexicon.positive_phrases));
    }

    #[test]
    fn test_words_are_single_tokens_and_phrases_are_not() {
        let lexicon = &*LEXICON;
        for word in lexicon.positive_words.iter().chain(&lexicon.negative_words) {
            assert!(!word.contains(' '), "{word:?} belongs in a phrase table");
        }
        for phrase in lexicon.positive_phrases.iter().chain(&lexicon.negative_phrases) {
            assert!(phrase.contains(' '), "{phrase:?} belongs in a word table");
        }
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(LEXICON.hits("GREAT"), KeywordHits { positive: 1, negative: 0 });
    }

    #[test]
    fn test_phrase_counts_double() {
        // "waste of time" is a phrase (2) and contains the word "waste" (1)
        assert_eq!(
            LEXICON.hits("a waste of time"),
            KeywordHits { positive: 0, negative: 3 }
        );
    }

    #[test]
    fn test_no_hits_for_neutral_text() {
        assert_eq!(LEXICON.hits("The meeting is on Tuesday"), KeywordHits::default());
    }
}
