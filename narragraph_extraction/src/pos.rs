//! Tokenization and part-of-speech tagging primitives.
//!
//! The canonicalizers need two linguistic judgments: "is this token a
//! determiner" (to drop before stemming) and "is this token a noun/verb"
//! (to pick head-of-phrase candidates). [`PosTagger`] is the seam for both;
//! [`RuleTagger`] is the shipped heuristic default (lexicons plus suffix
//! rules, noun fallback). Model-backed taggers implement the same trait.

/// Coarse part-of-speech categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    /// Determiners and articles ("the", "a", "every", ...).
    Determiner,
    /// Nouns. The fallback for unknown word tokens.
    Noun,
    /// Verbs.
    Verb,
    /// Anything that is not a word (numbers, symbols).
    Other,
}

/// Assigns a [`PosTag`] to each token of a phrase.
pub trait PosTagger {
    /// Tag each token. The output has the same length as the input.
    fn tag(&self, tokens: &[&str]) -> Vec<PosTag>;
}

const DETERMINERS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "some", "any", "each", "every", "no",
    "another", "all", "both", "either", "neither", "its", "his", "her", "their", "our", "my",
    "your",
];

/// Irregular and auxiliary verbs the suffix rules cannot catch.
const VERBS: &[&str] = &[
    "am", "is", "are", "was", "were", "be", "been", "being", "has", "have", "had", "do", "does",
    "did", "can", "could", "will", "would", "shall", "should", "may", "might", "must", "became",
    "began", "bought", "brought", "built", "came", "chose", "drew", "drove", "fell", "felt",
    "found", "gave", "got", "grew", "held", "kept", "knew", "led", "left", "lost", "made",
    "meant", "met", "paid", "put", "ran", "said", "sat", "saw", "sent", "set", "sold", "spent",
    "spoke", "stood", "taught", "thought", "told", "took", "went", "won", "wrote",
];

/// Lexicon-and-suffix POS tagger.
///
/// Tokens are matched case-insensitively against a determiner lexicon and an
/// irregular-verb lexicon; `-ing`/`-ed` word forms are tagged as verbs; any
/// other word token defaults to noun, matching the behavior of statistical
/// taggers on unknown tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleTagger;

impl RuleTagger {
    fn tag_one(token: &str) -> PosTag {
        if !token.chars().any(|c| c.is_alphabetic()) {
            return PosTag::Other;
        }
        let lower = token.to_lowercase();
        if DETERMINERS.contains(&lower.as_str()) {
            return PosTag::Determiner;
        }
        if VERBS.contains(&lower.as_str()) {
            return PosTag::Verb;
        }
        if lower.len() > 4 && (lower.ends_with("ing") || lower.ends_with("ed")) {
            return PosTag::Verb;
        }
        PosTag::Noun
    }
}

impl PosTagger for RuleTagger {
    fn tag(&self, tokens: &[&str]) -> Vec<PosTag> {
        tokens.iter().map(|t| Self::tag_one(t)).collect()
    }
}

/// Split a phrase into word tokens.
///
/// Whitespace-delimited, with leading/trailing punctuation stripped from
/// each token. Tokens that are punctuation-only are dropped.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| !t.is_empty())
        .collect()
}
