//! Baseline triplet extraction.
//!
//! [`SvoTripletExtractor`] yields one triplet per consecutive pair of
//! capitalized tokens within a sentence, with the tokens between them as
//! the predicate phrase. A stand-in for dependency-parse extraction behind
//! the [`TripletExtractor`](crate::TripletExtractor) trait.

use narragraph_core::Span;

use crate::entities::word_spans;
use crate::{RawTriplet, TripletExtractor};

/// Sentence-local subject-verb-object extraction over capitalized tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvoTripletExtractor;

/// Sentence ranges split on terminal punctuation, as byte offsets.
fn sentence_ranges(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            if i > start {
                ranges.push((start, i));
            }
            start = i + c.len_utf8();
        }
    }
    if start < text.len() {
        ranges.push((start, text.len()));
    }
    ranges
}

impl TripletExtractor for SvoTripletExtractor {
    fn extract(&self, text: &str) -> Vec<RawTriplet> {
        let mut triplets = Vec::new();
        for (s_start, s_end) in sentence_ranges(text) {
            let sentence = &text[s_start..s_end];
            let words: Vec<(usize, usize)> = word_spans(sentence)
                .into_iter()
                .map(|(s, e)| (s_start + s, s_start + e))
                .collect();

            let entity_positions: Vec<usize> = words
                .iter()
                .enumerate()
                .filter(|(_, &(s, e))| {
                    text[s..e].chars().next().is_some_and(|c| c.is_uppercase())
                })
                .map(|(i, _)| i)
                .collect();

            for pair in entity_positions.windows(2) {
                let (subject_idx, object_idx) = (pair[0], pair[1]);
                if object_idx - subject_idx < 2 {
                    continue; // no predicate tokens between the entities
                }
                let (p_start, _) = words[subject_idx + 1];
                let (_, p_end) = words[object_idx - 1];
                let (s_s, s_e) = words[subject_idx];
                let (o_s, o_e) = words[object_idx];
                triplets.push(RawTriplet {
                    subject: Span::new(s_s, s_e, &text[s_s..s_e]),
                    predicate: Span::new(p_start, p_end, &text[p_start..p_end]),
                    object: Span::new(o_s, o_e, &text[o_s..o_e]),
                });
            }
        }
        triplets
    }
}
