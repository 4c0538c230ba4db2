//! Canonicalization: clustering raw mention strings into canonical labels.
//!
//! A [`Mapper`] turns the full label multiset of a corpus into a
//! raw → canonical mapping, total over its input. Clustering decisions
//! depend on corpus-wide frequencies, so mappers must see the complete
//! vocabulary at once — the ingestion pipeline runs them exactly once per
//! fitting run, never per document.
//!
//! Two clustering strategies are provided on top of surface-form stemming
//! (no embeddings involved):
//!
//! - [`StemmingMapper`] groups labels sharing a stem-normalized key and maps
//!   every group member onto one representative.
//! - [`SubgramStemmingMapper`] additionally collapses a label into a
//!   dominant superphrase that contains it ("States" → "United States"),
//!   provided the longer phrase's corpus frequency justifies the
//!   specialization.

use std::collections::{BTreeMap, HashMap};

use rust_stemmers::{Algorithm, Stemmer};

use crate::pos::{tokenize, PosTag, PosTagger, RuleTagger};

/// Produces a raw → canonical label mapping, total over the input multiset.
pub trait Mapper {
    /// Create the mapping. Every input label has an entry; unclustered
    /// labels map to themselves. Empty input yields an empty map.
    fn create_mapping(&self, labels: &[String]) -> HashMap<String, String>;
}

/// Maps every label to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl Mapper for IdentityMapper {
    fn create_mapping(&self, labels: &[String]) -> HashMap<String, String> {
        labels.iter().map(|l| (l.clone(), l.clone())).collect()
    }
}

/// Representative selection policy for a cluster of labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ranking {
    /// Fewest tokens wins; ties break lexicographically.
    #[default]
    Shortest,
    /// Highest input multiplicity wins; ties break toward fewer tokens,
    /// then lexicographically.
    MostFrequent,
}

fn token_count(label: &str) -> usize {
    label.split_whitespace().count()
}

/// Count multiplicities over the raw label multiset.
fn count_labels(labels: &[String]) -> BTreeMap<&str, u64> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_default() += 1;
    }
    counts
}

/// Stem-normalization canonicalizer.
///
/// Labels are normalized to a key (tokenize, optionally drop
/// determiner-tagged tokens, lowercase and stem each token); labels sharing
/// a key form a cluster mapped onto one representative chosen by
/// [`Ranking`].
pub struct StemmingMapper {
    ignore_determiners: bool,
    ranking: Ranking,
    tagger: Box<dyn PosTagger>,
    stemmer: Stemmer,
}

impl StemmingMapper {
    /// Create a mapper with the default rule tagger and determiner dropping.
    pub fn new(ranking: Ranking) -> Self {
        Self {
            ignore_determiners: true,
            ranking,
            tagger: Box::new(RuleTagger),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Keep determiner tokens in the normalization key.
    pub fn keep_determiners(mut self) -> Self {
        self.ignore_determiners = false;
        self
    }

    /// Replace the POS tagger used for determiner detection.
    pub fn with_tagger(mut self, tagger: Box<dyn PosTagger>) -> Self {
        self.tagger = tagger;
        self
    }

    /// Normalize a label to its clustering key.
    fn normalize(&self, label: &str) -> String {
        let tokens = tokenize(label);
        let kept: Vec<&str> = if self.ignore_determiners {
            let tags = self.tagger.tag(&tokens);
            tokens
                .iter()
                .zip(&tags)
                .filter(|(_, tag)| **tag != PosTag::Determiner)
                .map(|(t, _)| *t)
                .collect()
        } else {
            tokens
        };
        kept.iter()
            .map(|t| self.stemmer.stem(&t.to_lowercase()).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Pick the cluster representative under the configured ranking.
    fn representative<'a>(&self, cluster: &[&'a str], counts: &BTreeMap<&str, u64>) -> &'a str {
        match self.ranking {
            Ranking::Shortest => *cluster
                .iter()
                .min_by_key(|l| (token_count(l), *l))
                .expect("cluster is non-empty"),
            Ranking::MostFrequent => *cluster
                .iter()
                .min_by_key(|l| {
                    (
                        std::cmp::Reverse(counts.get(*l).copied().unwrap_or(0)),
                        token_count(l),
                        *l,
                    )
                })
                .expect("cluster is non-empty"),
        }
    }
}

impl Mapper for StemmingMapper {
    fn create_mapping(&self, labels: &[String]) -> HashMap<String, String> {
        let counts = count_labels(labels);

        let mut clusters: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for &label in counts.keys() {
            clusters.entry(self.normalize(label)).or_default().push(label);
        }

        let mut mapping = HashMap::with_capacity(counts.len());
        for cluster in clusters.values() {
            let representative = self.representative(cluster, &counts);
            for label in cluster {
                mapping.insert(label.to_string(), representative.to_string());
            }
        }
        mapping
    }
}

/// The head-of-phrase token category a main-label candidate must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadWordType {
    /// Noun-headed phrases (entity labels).
    Noun,
    /// Verb-headed phrases (predicate labels).
    Verb,
}

/// Subgram canonicalizer for compound noun/verb phrases.
///
/// Stem-normalizes labels as [`StemmingMapper`] does, then identifies
/// main-label candidates: labels containing a token of the head category,
/// with at least [`min_candidate_tokens`](Self::min_candidate_tokens)
/// normalized tokens and corpus frequency of at least
/// [`min_candidate_frequency`](Self::min_candidate_frequency). A label maps
/// onto a candidate when the label's normalized form — padded with boundary
/// spaces, so "evil" never matches inside "devil" — is contained in the
/// candidate's, and the candidate outnumbers the label by
/// [`frequency_ratio`](Self::frequency_ratio): specialization has to be
/// justified by dominance, not containment alone. Labels with no eligible
/// candidate map to themselves.
pub struct SubgramStemmingMapper {
    head: HeadWordType,
    ranking: Ranking,
    /// Minimum normalized token count for a candidate. Default 1.
    pub min_candidate_tokens: usize,
    /// Minimum corpus frequency for a candidate. Default 2.
    pub min_candidate_frequency: u64,
    /// How many times a candidate must outnumber a label to absorb it.
    /// Default 2.0.
    pub frequency_ratio: f64,
    stemming: StemmingMapper,
}

impl SubgramStemmingMapper {
    /// Create a subgram mapper with default thresholds.
    pub fn new(head: HeadWordType, ranking: Ranking) -> Self {
        Self {
            head,
            ranking,
            min_candidate_tokens: 1,
            min_candidate_frequency: 2,
            frequency_ratio: 2.0,
            stemming: StemmingMapper::new(ranking),
        }
    }

    /// Override the candidate thresholds.
    pub fn with_thresholds(
        mut self,
        min_candidate_tokens: usize,
        min_candidate_frequency: u64,
        frequency_ratio: f64,
    ) -> Self {
        self.min_candidate_tokens = min_candidate_tokens;
        self.min_candidate_frequency = min_candidate_frequency;
        self.frequency_ratio = frequency_ratio;
        self
    }

    /// Replace the POS tagger used for determiner and head detection.
    pub fn with_tagger(mut self, tagger: Box<dyn PosTagger>) -> Self {
        self.stemming = self.stemming.with_tagger(tagger);
        self
    }

    fn head_tag(&self) -> PosTag {
        match self.head {
            HeadWordType::Noun => PosTag::Noun,
            HeadWordType::Verb => PosTag::Verb,
        }
    }

    fn is_candidate(&self, label: &str, normalized: &str, count: u64) -> bool {
        if count < self.min_candidate_frequency {
            return false;
        }
        if token_count(normalized) < self.min_candidate_tokens {
            return false;
        }
        let tokens = tokenize(label);
        let tags = self.stemming.tagger.tag(&tokens);
        tags.contains(&self.head_tag())
    }

    /// Pick the best candidate for a label under the configured ranking.
    fn best_candidate<'a>(
        &self,
        matches: &[&'a str],
        counts: &BTreeMap<&str, u64>,
    ) -> &'a str {
        match self.ranking {
            Ranking::Shortest => *matches
                .iter()
                .min_by_key(|c| {
                    (
                        token_count(c),
                        std::cmp::Reverse(counts.get(*c).copied().unwrap_or(0)),
                        *c,
                    )
                })
                .expect("match list is non-empty"),
            Ranking::MostFrequent => *matches
                .iter()
                .min_by_key(|c| {
                    (
                        std::cmp::Reverse(counts.get(*c).copied().unwrap_or(0)),
                        token_count(c),
                        *c,
                    )
                })
                .expect("match list is non-empty"),
        }
    }
}

impl Mapper for SubgramStemmingMapper {
    fn create_mapping(&self, labels: &[String]) -> HashMap<String, String> {
        let counts = count_labels(labels);

        // Padded normalized forms; the surrounding spaces keep containment
        // checks on token boundaries.
        let padded: BTreeMap<&str, String> = counts
            .keys()
            .map(|label| (*label, format!(" {} ", self.stemming.normalize(label))))
            .collect();

        let candidates: Vec<&str> = counts
            .iter()
            .filter(|(label, count)| self.is_candidate(label, &padded[*label], **count))
            .map(|(label, _)| *label)
            .collect();

        let mut mapping = HashMap::with_capacity(counts.len());
        for (&label, &count) in &counts {
            let label_norm = &padded[label];
            let matches: Vec<&str> = candidates
                .iter()
                .copied()
                .filter(|&candidate| {
                    if candidate == label {
                        return true;
                    }
                    let candidate_count = counts[candidate];
                    padded[candidate].contains(label_norm.as_str())
                        && candidate_count as f64 >= self.frequency_ratio * count as f64
                })
                .collect();

            let target = if matches.is_empty() {
                label
            } else {
                self.best_candidate(&matches, &counts)
            };
            mapping.insert(label.to_string(), target.to_string());
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identity_mapper_is_total() {
        let input = labels(&["Alice", "Bob", "Alice"]);
        let mapping = IdentityMapper.create_mapping(&input);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping["Alice"], "Alice");
        assert_eq!(mapping["Bob"], "Bob");
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(IdentityMapper.create_mapping(&[]).is_empty());
        assert!(StemmingMapper::new(Ranking::Shortest)
            .create_mapping(&[])
            .is_empty());
        assert!(
            SubgramStemmingMapper::new(HeadWordType::Noun, Ranking::Shortest)
                .create_mapping(&[])
                .is_empty()
        );
    }

    #[test]
    fn test_stemming_clusters_inflections() {
        let mapper = StemmingMapper::new(Ranking::Shortest);
        let mapping = mapper.create_mapping(&labels(&["cat", "cats", "the cat"]));
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping["cat"], "cat");
        assert_eq!(mapping["cats"], "cat");
        assert_eq!(mapping["the cat"], "cat");
    }

    #[test]
    fn test_stemming_most_frequent_ranking() {
        let mapper = StemmingMapper::new(Ranking::MostFrequent);
        let mapping = mapper.create_mapping(&labels(&["cats", "cats", "cats", "cat"]));
        assert_eq!(mapping["cat"], "cats");
        assert_eq!(mapping["cats"], "cats");
    }

    #[test]
    fn test_stemming_keeps_unrelated_labels_apart() {
        let mapper = StemmingMapper::new(Ranking::Shortest);
        let mapping = mapper.create_mapping(&labels(&["dog", "cat"]));
        assert_eq!(mapping["dog"], "dog");
        assert_eq!(mapping["cat"], "cat");
    }

    #[test]
    fn test_stemming_mapping_is_total_over_input() {
        let input = labels(&["running", "runs", "ran", "runner"]);
        let mapper = StemmingMapper::new(Ranking::Shortest);
        let mapping = mapper.create_mapping(&input);
        for label in &input {
            assert!(mapping.contains_key(label), "missing entry for {label:?}");
        }
    }

    #[test]
    fn test_subgram_united_states_scenario() {
        // "the United States" and "States" collapse onto the dominant
        // "United States"; "United States" itself stays put.
        let input = labels(&["the United States", "United States", "United States", "States"]);
        let mapper = SubgramStemmingMapper::new(HeadWordType::Noun, Ranking::Shortest);
        let mapping = mapper.create_mapping(&input);

        assert_eq!(mapping["the United States"], "United States");
        assert_eq!(mapping["States"], "United States");
        assert_eq!(mapping["United States"], "United States");
    }

    #[test]
    fn test_subgram_requires_frequency_dominance() {
        // "United States" appears only once: no candidate reaches the
        // minimum frequency, so every label maps to itself.
        let input = labels(&["the United States", "United States", "States"]);
        let mapper = SubgramStemmingMapper::new(HeadWordType::Noun, Ranking::Shortest);
        let mapping = mapper.create_mapping(&input);

        assert_eq!(mapping["the United States"], "the United States");
        assert_eq!(mapping["States"], "States");
        assert_eq!(mapping["United States"], "United States");
    }

    #[test]
    fn test_subgram_ratio_gate() {
        // Candidate frequency 2 does not double label frequency 2.
        let input = labels(&["United States", "United States", "States", "States"]);
        let mapper = SubgramStemmingMapper::new(HeadWordType::Noun, Ranking::Shortest);
        let mapping = mapper.create_mapping(&input);
        assert_eq!(mapping["States"], "States");

        // Raising the candidate's dominance flips the decision.
        let input = labels(&[
            "United States",
            "United States",
            "United States",
            "United States",
            "States",
            "States",
        ]);
        let mapping = mapper.create_mapping(&input);
        assert_eq!(mapping["States"], "United States");
    }

    #[test]
    fn test_subgram_padding_blocks_partial_word_matches() {
        // "evil" must not map into "devil" even when "devil" dominates.
        let input = labels(&["devil", "devil", "devil", "devil", "evil"]);
        let mapper = SubgramStemmingMapper::new(HeadWordType::Noun, Ranking::Shortest);
        let mapping = mapper.create_mapping(&input);
        assert_eq!(mapping["evil"], "evil");
    }

    #[test]
    fn test_subgram_verb_head_for_predicates() {
        let input = labels(&[
            "was elected",
            "was elected",
            "elected",
        ]);
        let mapper = SubgramStemmingMapper::new(HeadWordType::Verb, Ranking::Shortest);
        let mapping = mapper.create_mapping(&input);
        assert_eq!(mapping["elected"], "was elected");
        assert_eq!(mapping["was elected"], "was elected");
    }

    #[test]
    fn test_subgram_is_total_over_input() {
        let input = labels(&["alpha beta", "beta", "gamma", "alpha beta", "delta things"]);
        let mapper = SubgramStemmingMapper::new(HeadWordType::Noun, Ranking::MostFrequent);
        let mapping = mapper.create_mapping(&input);
        for label in &input {
            assert!(mapping.contains_key(label), "missing entry for {label:?}");
        }
    }
}
