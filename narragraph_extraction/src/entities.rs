//! Baseline entity extraction.
//!
//! [`CapitalizedEntityExtractor`] marks capitalized word tokens as entity
//! mentions. It is a surface-form stand-in for model-backed NER: good enough
//! to exercise the full pipeline and for corpora where proper nouns carry
//! the signal, and trivially replaceable through the
//! [`EntityExtractor`](crate::EntityExtractor) trait.

use narragraph_core::Span;

use crate::EntityExtractor;

/// Whitespace-delimited word tokens as byte-offset ranges, with surrounding
/// punctuation trimmed. Empty tokens are dropped.
pub(crate) fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }

    spans
        .into_iter()
        .filter_map(|(s, e)| trim_punctuation(text, s, e))
        .collect()
}

/// Shrink a token range past leading/trailing non-alphanumeric characters.
fn trim_punctuation(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let token = &text[start..end];
    let mut s = start;
    let mut e = end;
    for (i, c) in token.char_indices() {
        if c.is_alphanumeric() {
            s = start + i;
            break;
        }
    }
    for (i, c) in token.char_indices().rev() {
        if c.is_alphanumeric() {
            e = start + i + c.len_utf8();
            break;
        }
    }
    if !token.chars().any(|c| c.is_alphanumeric()) {
        return None;
    }
    (s < e).then_some((s, e))
}

/// Marks every capitalized word token as an entity mention.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapitalizedEntityExtractor;

impl EntityExtractor for CapitalizedEntityExtractor {
    fn extract(&self, text: &str) -> Vec<Span> {
        word_spans(text)
            .into_iter()
            .filter(|&(s, e)| {
                text[s..e]
                    .chars()
                    .next()
                    .is_some_and(|c| c.is_uppercase())
            })
            .map(|(s, e)| Span::new(s, e, &text[s..e]))
            .collect()
    }
}
