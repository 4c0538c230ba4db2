//! Storage boundary for the Narragraph engines.
//!
//! [`GraphStore`] models the logical tables of the system — documents,
//! mentions, triplet/tuplet annotations, the four canonical node tables, and
//! one materialized category table per canonical node type. The engines are
//! written against this trait only; the relational/transactional mechanics
//! of a concrete backend live behind it.
//!
//! The store handle is passed explicitly into every call (there is no
//! ambient session state). Stores are **not** safe for concurrent population
//! of the same backing data from multiple runs or threads: the pipeline is
//! single-writer by contract. Once a run's write, resolve, and aggregate
//! phases have completed, concurrent readers are safe because no read
//! operation mutates row state.

pub mod memory;

use std::collections::HashMap;

use crate::error::Result;
use crate::types::*;

/// The storage abstraction all engines operate against.
///
/// Id assignment is sequential per table and durable: once an insert or
/// `create_*` call returns an id, that id permanently names the row.
pub trait GraphStore {
    // --- documents ---

    /// Insert a batch of documents, returning their assigned ids in order.
    fn insert_documents(&mut self, docs: Vec<NewDocument>) -> Result<Vec<DocId>>;

    /// Fetch a single document, or `None` if the id has no row.
    fn document(&self, id: DocId) -> Result<Option<Document>>;

    /// All documents, ordered by id.
    fn documents(&self) -> Result<Vec<Document>>;

    /// Number of documents in the store.
    fn document_count(&self) -> Result<u64>;

    // --- mentions ---

    /// Insert a batch of unresolved mention rows, returning assigned ids in order.
    fn insert_mentions(&mut self, mentions: Vec<NewMention>) -> Result<Vec<MentionId>>;

    /// Fetch a single mention, or `None` if the id has no row.
    fn mention(&self, id: MentionId) -> Result<Option<Mention>>;

    /// All mention rows, ordered by id.
    fn mentions(&self) -> Result<Vec<Mention>>;

    /// Write back the resolved canonical entity of a mention.
    fn set_mention_entity(&mut self, id: MentionId, entity: EntityId) -> Result<()>;

    // --- triplet / tuplet annotations ---

    /// Insert a batch of unresolved triplet annotations.
    fn insert_triplets(&mut self, rows: Vec<NewTriplet>) -> Result<Vec<TripletId>>;

    /// All triplet annotations, ordered by id.
    fn triplets(&self) -> Result<Vec<Triplet>>;

    /// Write back the canonical ids resolved for a triplet.
    fn set_triplet_resolution(&mut self, id: TripletId, res: TripletResolution) -> Result<()>;

    /// Insert a batch of unresolved tuplet annotations.
    fn insert_tuplets(&mut self, rows: Vec<NewTuplet>) -> Result<Vec<TupletId>>;

    /// All tuplet annotations, ordered by id.
    fn tuplets(&self) -> Result<Vec<Tuplet>>;

    /// Write back the canonical ids resolved for a tuplet.
    fn set_tuplet_resolution(&mut self, id: TupletId, res: TupletResolution) -> Result<()>;

    // --- canonical nodes ---
    //
    // `create_*` persists a zero-statistics row immediately so the returned
    // id is durable. Key uniqueness is the resolution caches' contract; the
    // store does not deduplicate.

    /// Create an entity row with zeroed statistics.
    fn create_entity(&mut self, label: &str) -> Result<EntityId>;

    /// Fetch a single entity, or `None` if the id has no row.
    fn entity(&self, id: EntityId) -> Result<Option<Entity>>;

    /// All entities, ordered by id.
    fn entities(&self) -> Result<Vec<Entity>>;

    /// Replace an entity row (aggregation write-back).
    fn update_entity(&mut self, entity: &Entity) -> Result<()>;

    /// Create a predicate row with zeroed statistics.
    fn create_predicate(&mut self, label: &str) -> Result<PredicateId>;

    /// Fetch a single predicate, or `None` if the id has no row.
    fn predicate(&self, id: PredicateId) -> Result<Option<Predicate>>;

    /// All predicates, ordered by id.
    fn predicates(&self) -> Result<Vec<Predicate>>;

    /// Replace a predicate row (aggregation write-back).
    fn update_predicate(&mut self, predicate: &Predicate) -> Result<()>;

    /// Create a relation row with zeroed statistics. Subject, predicate, and
    /// object ids must already exist (no forward references).
    fn create_relation(
        &mut self,
        subject: EntityId,
        predicate: PredicateId,
        object: EntityId,
    ) -> Result<RelationId>;

    /// Fetch a single relation, or `None` if the id has no row.
    fn relation(&self, id: RelationId) -> Result<Option<Relation>>;

    /// All relations, ordered by id.
    fn relations(&self) -> Result<Vec<Relation>>;

    /// Replace a relation row (aggregation write-back).
    fn update_relation(&mut self, relation: &Relation) -> Result<()>;

    /// Create a co-occurrence row with zeroed statistics. The pair must
    /// already be in canonical order (lower id first); both entity ids must
    /// already exist.
    fn create_cooccurrence(&mut self, entity_one: EntityId, entity_two: EntityId)
        -> Result<CooccurrenceId>;

    /// Fetch a single co-occurrence, or `None` if the id has no row.
    fn cooccurrence(&self, id: CooccurrenceId) -> Result<Option<Cooccurrence>>;

    /// All co-occurrences, ordered by id.
    fn cooccurrences(&self) -> Result<Vec<Cooccurrence>>;

    /// Replace a co-occurrence row (aggregation write-back).
    fn update_cooccurrence(&mut self, cooccurrence: &Cooccurrence) -> Result<()>;

    // --- materialized category tables ---

    /// Replace the whole category table for one canonical node type.
    /// Populated once per aggregation run.
    fn replace_categories(&mut self, kind: NodeKind, table: Vec<(u64, Category)>) -> Result<()>;

    /// Categories of a single node.
    fn categories_of(&self, kind: NodeKind, target: u64) -> Result<Vec<Category>>;

    /// The full category table for one canonical node type, keyed by node id.
    fn category_table(&self, kind: NodeKind) -> Result<HashMap<u64, Vec<Category>>>;

    // --- lifecycle ---

    /// Whether the store holds no documents.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.document_count()? == 0)
    }

    /// Delete every row in every table and reset id sequences.
    fn clear(&mut self) -> Result<()>;
}
