//! Batch ingestion pipeline: write → resolve → aggregate.
//!
//! One fitting run performs three strictly ordered phases against a single
//! store:
//!
//! 1. **Write** — documents are persisted in fixed-size batches (bounding
//!    transaction size only), then every extracted mention as an unresolved
//!    occurrence row, then every triplet/tuplet annotation referencing those
//!    rows. No canonical ids are assigned.
//! 2. **Resolution** — the full label vocabulary is collected across all
//!    ingested documents and each canonicalizer runs once over its complete
//!    multiset (clustering depends on global frequencies, so this cannot
//!    happen per document); the identity caches then resolve every
//!    unresolved annotation in one bulk pass.
//! 3. **Aggregation** — node statistics are recomputed wholesale.
//!
//! The pipeline is single-writer and sequential; see the concurrency notes
//! on [`GraphStore`]. Populating one backing store from several runs at the
//! same time is not supported.

use std::collections::BTreeMap;
use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

use narragraph_core::aggregation::{recompute_statistics, AggregationReport};
use narragraph_core::resolution::{resolve_annotations, ResolutionSummary};
use narragraph_core::{
    Category, GraphError, GraphStore, NewDocument, NewMention, NewTriplet, NewTuplet, Result, Span,
};

use crate::mapping::{HeadWordType, Mapper, Ranking, SubgramStemmingMapper};
use crate::{
    CapitalizedEntityExtractor, CooccurrenceExtractor, EntityExtractor,
    PairwiseCooccurrenceExtractor, SvoTripletExtractor, TripletExtractor,
};

/// Default document batch size for the write phase.
const DEFAULT_BATCH_SIZE: usize = 500;

/// What to do when fitting into a store that already holds data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnExisting {
    /// Fail with [`GraphError::AlreadyPopulated`].
    #[default]
    Stop,
    /// Clear the store first.
    Overwrite,
    /// Append to the existing data; already-resolved annotations are left
    /// untouched.
    Reuse,
}

/// One document to ingest, with optional metadata.
#[derive(Debug, Clone, Default)]
pub struct DocumentInput {
    /// Raw document text.
    pub text: String,
    /// Optional external string id.
    pub str_id: Option<String>,
    /// Optional calendar timestamp.
    pub timestamp: Option<NaiveDate>,
    /// Optional ordinal time (e.g. chapter number).
    pub timestamp_ordinal: Option<i64>,
    /// Category name → values.
    pub categories: BTreeMap<String, Vec<String>>,
    /// Free-form metadata.
    pub metadata: HashMap<String, String>,
}

impl DocumentInput {
    /// A document holding only text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    fn into_row(self) -> NewDocument {
        let categories = self
            .categories
            .into_iter()
            .flat_map(|(name, values)| {
                values
                    .into_iter()
                    .map(move |value| Category::new(name.clone(), value))
            })
            .collect();
        NewDocument {
            text: self.text,
            str_id: self.str_id,
            timestamp: self.timestamp,
            timestamp_ordinal: self.timestamp_ordinal,
            categories,
            metadata: self.metadata,
        }
    }
}

/// Counts reported by one fitting run.
#[derive(Debug, Clone, Default)]
pub struct FitReport {
    /// Documents written.
    pub documents: u64,
    /// Mention rows written.
    pub mentions: u64,
    /// Triplet annotations written.
    pub triplets: u64,
    /// Tuplet annotations written.
    pub tuplets: u64,
    /// Resolution-phase counts.
    pub resolution: ResolutionSummary,
    /// Aggregation-phase counts.
    pub aggregation: AggregationReport,
}

/// The batch ingestion pipeline.
///
/// Extractors and canonicalizers are pluggable; the defaults are the
/// heuristic baselines plus subgram stemming mappers (noun-headed for
/// entities, verb-headed for predicates). Without a triplet extractor the
/// pipeline runs in co-occurrence-only mode: entities come from the entity
/// extractor and no predicates or relations are created.
pub struct Pipeline {
    triplet_extractor: Option<Box<dyn TripletExtractor>>,
    entity_extractor: Option<Box<dyn EntityExtractor>>,
    cooccurrence_extractor: Option<Box<dyn CooccurrenceExtractor>>,
    entity_mapper: Box<dyn Mapper>,
    predicate_mapper: Box<dyn Mapper>,
    batch_size: usize,
    on_existing: OnExisting,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Full pipeline: triplets, entity mentions derived from them, and
    /// pairwise co-occurrences.
    pub fn new() -> Self {
        Self {
            triplet_extractor: Some(Box::new(SvoTripletExtractor)),
            entity_extractor: None,
            cooccurrence_extractor: Some(Box::new(PairwiseCooccurrenceExtractor)),
            entity_mapper: Box::new(SubgramStemmingMapper::new(
                HeadWordType::Noun,
                Ranking::Shortest,
            )),
            predicate_mapper: Box::new(SubgramStemmingMapper::new(
                HeadWordType::Verb,
                Ranking::Shortest,
            )),
            batch_size: DEFAULT_BATCH_SIZE,
            on_existing: OnExisting::Stop,
        }
    }

    /// Co-occurrence-only pipeline: no triplet extraction, entities from the
    /// baseline entity extractor.
    pub fn cooccurrence_only() -> Self {
        Self {
            triplet_extractor: None,
            entity_extractor: Some(Box::new(CapitalizedEntityExtractor)),
            ..Self::new()
        }
    }

    /// Replace the triplet extractor (`None` disables triplet extraction).
    pub fn with_triplet_extractor(
        mut self,
        extractor: Option<Box<dyn TripletExtractor>>,
    ) -> Self {
        self.triplet_extractor = extractor;
        self
    }

    /// Replace the entity extractor.
    pub fn with_entity_extractor(mut self, extractor: Box<dyn EntityExtractor>) -> Self {
        self.entity_extractor = Some(extractor);
        self
    }

    /// Replace the co-occurrence extractor (`None` disables tuplets).
    pub fn with_cooccurrence_extractor(
        mut self,
        extractor: Option<Box<dyn CooccurrenceExtractor>>,
    ) -> Self {
        self.cooccurrence_extractor = extractor;
        self
    }

    /// Replace the entity canonicalizer.
    pub fn with_entity_mapper(mut self, mapper: Box<dyn Mapper>) -> Self {
        self.entity_mapper = mapper;
        self
    }

    /// Replace the predicate canonicalizer.
    pub fn with_predicate_mapper(mut self, mapper: Box<dyn Mapper>) -> Self {
        self.predicate_mapper = mapper;
        self
    }

    /// Override the write-phase document batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the existing-data policy.
    pub fn on_existing(mut self, policy: OnExisting) -> Self {
        self.on_existing = policy;
        self
    }

    /// Run the full fitting pass over a document batch.
    pub fn fit<S: GraphStore>(
        &self,
        store: &mut S,
        docs: Vec<DocumentInput>,
    ) -> Result<FitReport> {
        if !store.is_empty()? {
            match self.on_existing {
                OnExisting::Stop => return Err(GraphError::AlreadyPopulated),
                OnExisting::Overwrite => store.clear()?,
                OnExisting::Reuse => {}
            }
        }

        let mut report = FitReport::default();

        // --- Write phase -----------------------------------------------
        info!(documents = docs.len(), "write phase: persisting documents");
        let mut texts = Vec::with_capacity(docs.len());
        let mut ids = Vec::with_capacity(docs.len());
        let mut batch = Vec::new();
        for input in docs {
            texts.push(input.text.clone());
            batch.push(input.into_row());
            if batch.len() >= self.batch_size {
                ids.extend(store.insert_documents(std::mem::take(&mut batch))?);
            }
        }
        if !batch.is_empty() {
            ids.extend(store.insert_documents(batch)?);
        }
        report.documents = ids.len() as u64;

        info!("write phase: extracting and persisting annotations");
        for (doc_id, text) in ids.iter().copied().zip(&texts) {
            let raw_triplets = self
                .triplet_extractor
                .as_ref()
                .map(|e| e.extract(text))
                .unwrap_or_default();

            // Entity spans: extractor output plus triplet subjects/objects,
            // de-duplicated by offsets into one mention row per span.
            let mut spans: BTreeMap<(usize, usize), Span> = BTreeMap::new();
            if let Some(extractor) = &self.entity_extractor {
                for span in extractor.extract(text) {
                    spans.insert((span.start, span.end), span);
                }
            }
            for triplet in &raw_triplets {
                for span in [&triplet.subject, &triplet.object] {
                    spans.insert((span.start, span.end), span.clone());
                }
            }

            let entity_spans: Vec<Span> = spans.values().cloned().collect();
            let mention_rows: Vec<NewMention> = entity_spans
                .iter()
                .map(|span| NewMention {
                    doc_id,
                    span: span.clone(),
                })
                .collect();
            let mention_ids = store.insert_mentions(mention_rows)?;
            let mention_of: HashMap<(usize, usize), u64> = entity_spans
                .iter()
                .map(|span| (span.start, span.end))
                .zip(mention_ids.iter().copied())
                .collect();
            report.mentions += entity_spans.len() as u64;

            if !raw_triplets.is_empty() {
                let rows: Vec<NewTriplet> = raw_triplets
                    .iter()
                    .map(|t| NewTriplet {
                        doc_id,
                        subject_mention: mention_of[&(t.subject.start, t.subject.end)],
                        predicate_span: t.predicate.clone(),
                        object_mention: mention_of[&(t.object.start, t.object.end)],
                    })
                    .collect();
                report.triplets += rows.len() as u64;
                store.insert_triplets(rows)?;
            }

            if let Some(extractor) = &self.cooccurrence_extractor {
                let mut rows = Vec::new();
                for t in extractor.extract(text, &entity_spans) {
                    let one = mention_of.get(&(t.entity_one.start, t.entity_one.end));
                    let two = mention_of.get(&(t.entity_two.start, t.entity_two.end));
                    let (Some(&mention_one), Some(&mention_two)) = (one, two) else {
                        return Err(GraphError::Backend(anyhow::anyhow!(
                            "co-occurrence extractor returned a span that is not among \
                             the document's entity spans"
                        )));
                    };
                    rows.push(NewTuplet {
                        doc_id,
                        mention_one,
                        mention_two,
                    });
                }
                report.tuplets += rows.len() as u64;
                store.insert_tuplets(rows)?;
            }
        }

        // --- Resolution phase ------------------------------------------
        // Canonicalizers see the complete multiset across all documents in
        // the store, including earlier runs when reusing.
        let entity_labels: Vec<String> = store
            .mentions()?
            .into_iter()
            .map(|m| m.span.text)
            .collect();
        let predicate_labels: Vec<String> = store
            .triplets()?
            .into_iter()
            .map(|t| t.predicate_span.text)
            .collect();
        info!(
            entity_labels = entity_labels.len(),
            predicate_labels = predicate_labels.len(),
            "resolution phase: canonicalizing labels"
        );
        let entity_mapping = self.entity_mapper.create_mapping(&entity_labels);
        let predicate_mapping = self.predicate_mapper.create_mapping(&predicate_labels);

        report.resolution = resolve_annotations(store, &entity_mapping, &predicate_mapping)?;

        // --- Aggregation phase -----------------------------------------
        info!("aggregation phase: recomputing statistics");
        report.aggregation = recompute_statistics(store)?;

        Ok(report)
    }
}
