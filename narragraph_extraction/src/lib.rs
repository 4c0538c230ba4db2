//! # Narragraph Extraction
//!
//! Extraction layer for the Narragraph knowledge graph:
//!
//! - Extractor traits for triplets, entity spans, and entity-pair
//!   co-occurrences, with batch variants that preserve input order —
//!   [`TripletExtractor`], [`EntityExtractor`], [`CooccurrenceExtractor`]
//! - Baseline heuristic implementations usable without any model files —
//!   [`entities::CapitalizedEntityExtractor`], [`triplets::SvoTripletExtractor`],
//!   [`cooccurrences::PairwiseCooccurrenceExtractor`]
//! - Canonicalizers that cluster raw mention strings into canonical labels —
//!   [`mapping::StemmingMapper`], [`mapping::SubgramStemmingMapper`]
//! - The batch ingestion pipeline (write → resolve → aggregate) —
//!   [`pipeline::Pipeline`]
//!
//! The baseline extractors are surface-form heuristics: real deployments
//! plug model-backed extractors (NER, dependency parsing) through the same
//! traits. The linguistic primitives the canonicalizers rely on are likewise
//! behind seams: POS tagging via [`pos::PosTagger`] and stemming via the
//! Snowball stemmer.

pub mod cooccurrences;
pub mod entities;
pub mod mapping;
pub mod pipeline;
pub mod pos;
pub mod triplets;

use narragraph_core::Span;

pub use cooccurrences::PairwiseCooccurrenceExtractor;
pub use entities::CapitalizedEntityExtractor;
pub use mapping::{
    HeadWordType, IdentityMapper, Mapper, Ranking, StemmingMapper, SubgramStemmingMapper,
};
pub use pipeline::{DocumentInput, FitReport, OnExisting, Pipeline};
pub use triplets::SvoTripletExtractor;

/// A subject-predicate-object mention extracted from raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTriplet {
    /// Subject span.
    pub subject: Span,
    /// Predicate span.
    pub predicate: Span,
    /// Object span.
    pub object: Span,
}

/// A co-occurring entity-mention pair extracted from raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTuplet {
    /// First entity span.
    pub entity_one: Span,
    /// Second entity span.
    pub entity_two: Span,
}

/// Extracts subject-predicate-object triplets from text.
pub trait TripletExtractor {
    /// Extract triplets from one text.
    fn extract(&self, text: &str) -> Vec<RawTriplet>;

    /// Extract triplets from a batch of texts, preserving input order.
    ///
    /// The default calls [`extract`](Self::extract) per text; implementations
    /// backed by batched inference may override it.
    fn batch_extract(&self, texts: &[&str]) -> Vec<Vec<RawTriplet>> {
        texts.iter().map(|text| self.extract(text)).collect()
    }
}

/// Extracts entity spans from text.
pub trait EntityExtractor {
    /// Extract entity spans from one text.
    fn extract(&self, text: &str) -> Vec<Span>;

    /// Extract entity spans from a batch of texts, preserving input order.
    fn batch_extract(&self, texts: &[&str]) -> Vec<Vec<Span>> {
        texts.iter().map(|text| self.extract(text)).collect()
    }
}

/// Extracts co-occurring entity pairs from a document, given the entity
/// spans found in it.
pub trait CooccurrenceExtractor {
    /// Extract tuplets from one document.
    fn extract(&self, text: &str, entities: &[Span]) -> Vec<RawTuplet>;
}
