//! Core data types for the Narragraph knowledge graph.
//!
//! Defines the persisted row types (documents, mentions, annotations, and the
//! four canonical node types) plus the shared statistics block. All rows are
//! serde-serializable so that any [`GraphStore`](crate::store::GraphStore)
//! backend can encode them.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unique identifier for a document.
pub type DocId = u64;
/// Unique identifier for an entity mention (occurrence) row.
pub type MentionId = u64;
/// Unique identifier for a canonical entity.
pub type EntityId = u64;
/// Unique identifier for a canonical predicate.
pub type PredicateId = u64;
/// Unique identifier for a canonical relation.
pub type RelationId = u64;
/// Unique identifier for a canonical co-occurrence.
pub type CooccurrenceId = u64;
/// Unique identifier for a triplet annotation.
pub type TripletId = u64;
/// Unique identifier for a tuplet annotation.
pub type TupletId = u64;

/// A character span inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start character offset (inclusive).
    pub start: usize,
    /// End character offset (exclusive).
    pub end: usize,
    /// The covered text, as it appears in the source.
    pub text: String,
}

impl Span {
    /// Create a span from offsets and text.
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// A `(name, value)` category tag.
///
/// Categories are attached to documents at ingestion time and inherited by
/// every annotation and canonical node whose lineage traces back to that
/// document. For canonical nodes the inherited set is materialized into a
/// per-node-type category table during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category {
    /// Category name (e.g. "source").
    pub name: String,
    /// Category value (e.g. "newswire").
    pub value: String,
}

impl Category {
    /// Create a category tag.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Node type discriminant for the per-type category tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Canonical entities.
    Entity,
    /// Canonical predicates.
    Predicate,
    /// Canonical relations.
    Relation,
    /// Canonical co-occurrences.
    Cooccurrence,
}

/// An ingested document. Created once at ingestion; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier (sequential).
    pub id: DocId,
    /// Raw document text.
    pub text: String,
    /// Optional external string identifier.
    pub str_id: Option<String>,
    /// Optional calendar timestamp.
    pub timestamp: Option<NaiveDate>,
    /// Optional integer ordinal time for non-calendar ordering
    /// (e.g. chapter number).
    pub timestamp_ordinal: Option<i64>,
    /// Category tags attached at ingestion.
    pub categories: Vec<Category>,
    /// Free-form metadata key-values.
    pub metadata: HashMap<String, String>,
}

/// A new document row, before an id has been assigned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDocument {
    /// Raw document text.
    pub text: String,
    /// Optional external string identifier.
    pub str_id: Option<String>,
    /// Optional calendar timestamp.
    pub timestamp: Option<NaiveDate>,
    /// Optional integer ordinal time.
    pub timestamp_ordinal: Option<i64>,
    /// Category tags.
    pub categories: Vec<Category>,
    /// Free-form metadata key-values.
    pub metadata: HashMap<String, String>,
}

impl NewDocument {
    /// Create a document row holding only text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// A single entity mention: a per-document text span, optionally resolved to
/// a canonical entity. Created unresolved during the write phase; the
/// `entity_id` is filled in during the resolution phase. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    /// Unique mention identifier.
    pub id: MentionId,
    /// Owning document.
    pub doc_id: DocId,
    /// The mention span.
    pub span: Span,
    /// Resolved canonical entity, once resolution has run.
    pub entity_id: Option<EntityId>,
}

/// A new mention row, before an id has been assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMention {
    /// Owning document.
    pub doc_id: DocId,
    /// The mention span.
    pub span: Span,
}

/// Statistics shared by every canonical node type.
///
/// Statistics are always a pure function of the node's current resolved
/// annotation set: the aggregation engine recomputes them wholesale and never
/// patches them incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    /// Number of resolved annotations for this node.
    pub frequency: u64,
    /// Number of distinct documents among those annotations.
    pub doc_frequency: u64,
    /// `(frequency - 1) * (n_docs / (doc_frequency + 1))` — a
    /// frequency-salience score discounted by document spread.
    pub adjusted_tf_idf: f64,
    /// Earliest calendar timestamp among owning documents.
    pub first_occurrence: Option<NaiveDate>,
    /// Latest calendar timestamp among owning documents.
    pub last_occurrence: Option<NaiveDate>,
    /// Earliest ordinal time among owning documents.
    pub first_occurrence_ordinal: Option<i64>,
    /// Latest ordinal time among owning documents.
    pub last_occurrence_ordinal: Option<i64>,
}

/// A canonical entity. Created lazily by the identity-resolution cache;
/// statistics are written only by the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Unique entity identifier.
    pub id: EntityId,
    /// Canonical label (the natural key).
    pub label: String,
    /// Aggregated statistics.
    pub stats: NodeStats,
    /// Distinct raw mention texts that resolved to this entity but differ
    /// from the canonical label.
    pub alt_labels: Vec<String>,
}

/// A canonical predicate, keyed by canonical predicate label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predicate {
    /// Unique predicate identifier.
    pub id: PredicateId,
    /// Canonical label (the natural key).
    pub label: String,
    /// Aggregated statistics.
    pub stats: NodeStats,
    /// Distinct raw predicate span texts that resolved to this predicate but
    /// differ from the canonical label.
    pub alt_labels: Vec<String>,
}

/// A canonical relation, keyed by `(subject, predicate, object)`.
///
/// Exactly one row exists per distinct key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    /// Unique relation identifier.
    pub id: RelationId,
    /// Subject entity.
    pub subject_id: EntityId,
    /// Predicate.
    pub predicate_id: PredicateId,
    /// Object entity.
    pub object_id: EntityId,
    /// Aggregated statistics.
    pub stats: NodeStats,
    /// Log-ratio measuring how specific this predicate is to this entity
    /// pair versus its corpus-wide base rate. Unbounded; `None` until
    /// aggregation has run.
    pub significance: Option<f64>,
}

/// A canonical co-occurrence, keyed by an unordered entity pair.
///
/// The pair is stored lower-id-first, so resolution of `(A, B)` and `(B, A)`
/// lands on the same row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cooccurrence {
    /// Unique co-occurrence identifier.
    pub id: CooccurrenceId,
    /// Lower entity id of the pair.
    pub entity_one_id: EntityId,
    /// Higher entity id of the pair.
    pub entity_two_id: EntityId,
    /// Aggregated statistics.
    pub stats: NodeStats,
    /// Pointwise mutual information of the pair. `None` until aggregation
    /// has run.
    pub pmi: Option<f64>,
}

/// Canonical ids assigned to a triplet during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripletResolution {
    /// Resolved subject entity.
    pub subject_id: EntityId,
    /// Resolved predicate.
    pub predicate_id: PredicateId,
    /// Resolved object entity.
    pub object_id: EntityId,
    /// Resolved relation row.
    pub relation_id: RelationId,
}

/// A subject-predicate-object annotation extracted from one document.
///
/// Subject and object reference shared mention rows; the predicate is an
/// inline span (predicate phrases are not shared with entity mentions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triplet {
    /// Unique triplet identifier.
    pub id: TripletId,
    /// Owning document.
    pub doc_id: DocId,
    /// Subject mention row.
    pub subject_mention: MentionId,
    /// Predicate span.
    pub predicate_span: Span,
    /// Object mention row.
    pub object_mention: MentionId,
    /// Canonical ids, once resolution has run.
    pub resolution: Option<TripletResolution>,
}

/// A new triplet row, before an id has been assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTriplet {
    /// Owning document.
    pub doc_id: DocId,
    /// Subject mention row.
    pub subject_mention: MentionId,
    /// Predicate span.
    pub predicate_span: Span,
    /// Object mention row.
    pub object_mention: MentionId,
}

/// Canonical ids assigned to a tuplet during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupletResolution {
    /// Resolved entity of the first mention.
    pub entity_one_id: EntityId,
    /// Resolved entity of the second mention.
    pub entity_two_id: EntityId,
    /// Resolved co-occurrence row (pair stored lower-id-first).
    pub cooccurrence_id: CooccurrenceId,
}

/// An entity-pair co-occurrence annotation extracted from one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuplet {
    /// Unique tuplet identifier.
    pub id: TupletId,
    /// Owning document.
    pub doc_id: DocId,
    /// First entity mention row.
    pub mention_one: MentionId,
    /// Second entity mention row.
    pub mention_two: MentionId,
    /// Canonical ids, once resolution has run.
    pub resolution: Option<TupletResolution>,
}

/// A new tuplet row, before an id has been assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTuplet {
    /// Owning document.
    pub doc_id: DocId,
    /// First entity mention row.
    pub mention_one: MentionId,
    /// Second entity mention row.
    pub mention_two: MentionId,
}

/// Order an entity pair canonically (lower id first).
pub fn ordered_pair(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
