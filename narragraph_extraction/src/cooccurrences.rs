//! Baseline co-occurrence extraction.
//!
//! [`PairwiseCooccurrenceExtractor`] emits one tuplet per unordered pair of
//! entity mentions in a document. Chunk- or window-scoped extractors
//! implement the same [`CooccurrenceExtractor`](crate::CooccurrenceExtractor)
//! trait.

use narragraph_core::Span;

use crate::{CooccurrenceExtractor, RawTuplet};

/// All unordered pairs of the document's entity mentions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseCooccurrenceExtractor;

impl CooccurrenceExtractor for PairwiseCooccurrenceExtractor {
    fn extract(&self, _text: &str, entities: &[Span]) -> Vec<RawTuplet> {
        let mut tuplets = Vec::new();
        for (i, one) in entities.iter().enumerate() {
            for two in &entities[i + 1..] {
                tuplets.push(RawTuplet {
                    entity_one: one.clone(),
                    entity_two: two.clone(),
                });
            }
        }
        tuplets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_over_three_entities() {
        let spans = vec![
            Span::new(0, 5, "Alice"),
            Span::new(10, 13, "Bob"),
            Span::new(20, 25, "Carol"),
        ];
        let tuplets = PairwiseCooccurrenceExtractor.extract("", &spans);
        assert_eq!(tuplets.len(), 3);
        assert_eq!(tuplets[0].entity_one.text, "Alice");
        assert_eq!(tuplets[0].entity_two.text, "Bob");
        assert_eq!(tuplets[2].entity_one.text, "Bob");
        assert_eq!(tuplets[2].entity_two.text, "Carol");
    }

    #[test]
    fn test_single_entity_yields_nothing() {
        let spans = vec![Span::new(0, 5, "Alice")];
        assert!(PairwiseCooccurrenceExtractor.extract("", &spans).is_empty());
    }

    #[test]
    fn test_no_entities() {
        assert!(PairwiseCooccurrenceExtractor.extract("text", &[]).is_empty());
    }
}
