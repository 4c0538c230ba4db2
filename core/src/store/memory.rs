//! In-memory [`GraphStore`] implementation.
//!
//! Backs tests and ephemeral runs. Rows live in `BTreeMap` tables keyed by
//! id, so "ordered by id" reads fall out of iteration order. For a durable
//! store use the LMDB backend crate, which implements the same trait.

use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::store::GraphStore;
use crate::types::*;

/// An ephemeral store holding every table in memory.
#[derive(Debug, Default)]
pub struct MemStore {
    documents: BTreeMap<DocId, Document>,
    mentions: BTreeMap<MentionId, Mention>,
    triplets: BTreeMap<TripletId, Triplet>,
    tuplets: BTreeMap<TupletId, Tuplet>,
    entities: BTreeMap<EntityId, Entity>,
    predicates: BTreeMap<PredicateId, Predicate>,
    relations: BTreeMap<RelationId, Relation>,
    cooccurrences: BTreeMap<CooccurrenceId, Cooccurrence>,
    categories: HashMap<NodeKind, BTreeMap<u64, Vec<Category>>>,
    next_id: HashMap<&'static str, u64>,
}

impl MemStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self, table: &'static str) -> u64 {
        let counter = self.next_id.entry(table).or_insert(1);
        let id = *counter;
        *counter += 1;
        id
    }
}

impl GraphStore for MemStore {
    fn insert_documents(&mut self, docs: Vec<NewDocument>) -> Result<Vec<DocId>> {
        let mut ids = Vec::with_capacity(docs.len());
        for doc in docs {
            let id = self.next("documents");
            self.documents.insert(
                id,
                Document {
                    id,
                    text: doc.text,
                    str_id: doc.str_id,
                    timestamp: doc.timestamp,
                    timestamp_ordinal: doc.timestamp_ordinal,
                    categories: doc.categories,
                    metadata: doc.metadata,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    fn document(&self, id: DocId) -> Result<Option<Document>> {
        Ok(self.documents.get(&id).cloned())
    }

    fn documents(&self) -> Result<Vec<Document>> {
        Ok(self.documents.values().cloned().collect())
    }

    fn document_count(&self) -> Result<u64> {
        Ok(self.documents.len() as u64)
    }

    fn insert_mentions(&mut self, mentions: Vec<NewMention>) -> Result<Vec<MentionId>> {
        let mut ids = Vec::with_capacity(mentions.len());
        for mention in mentions {
            let id = self.next("mentions");
            self.mentions.insert(
                id,
                Mention {
                    id,
                    doc_id: mention.doc_id,
                    span: mention.span,
                    entity_id: None,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    fn mention(&self, id: MentionId) -> Result<Option<Mention>> {
        Ok(self.mentions.get(&id).cloned())
    }

    fn mentions(&self) -> Result<Vec<Mention>> {
        Ok(self.mentions.values().cloned().collect())
    }

    fn set_mention_entity(&mut self, id: MentionId, entity: EntityId) -> Result<()> {
        if let Some(row) = self.mentions.get_mut(&id) {
            row.entity_id = Some(entity);
        }
        Ok(())
    }

    fn insert_triplets(&mut self, rows: Vec<NewTriplet>) -> Result<Vec<TripletId>> {
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let id = self.next("triplets");
            self.triplets.insert(
                id,
                Triplet {
                    id,
                    doc_id: row.doc_id,
                    subject_mention: row.subject_mention,
                    predicate_span: row.predicate_span,
                    object_mention: row.object_mention,
                    resolution: None,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    fn triplets(&self) -> Result<Vec<Triplet>> {
        Ok(self.triplets.values().cloned().collect())
    }

    fn set_triplet_resolution(&mut self, id: TripletId, res: TripletResolution) -> Result<()> {
        if let Some(row) = self.triplets.get_mut(&id) {
            row.resolution = Some(res);
        }
        Ok(())
    }

    fn insert_tuplets(&mut self, rows: Vec<NewTuplet>) -> Result<Vec<TupletId>> {
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let id = self.next("tuplets");
            self.tuplets.insert(
                id,
                Tuplet {
                    id,
                    doc_id: row.doc_id,
                    mention_one: row.mention_one,
                    mention_two: row.mention_two,
                    resolution: None,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    fn tuplets(&self) -> Result<Vec<Tuplet>> {
        Ok(self.tuplets.values().cloned().collect())
    }

    fn set_tuplet_resolution(&mut self, id: TupletId, res: TupletResolution) -> Result<()> {
        if let Some(row) = self.tuplets.get_mut(&id) {
            row.resolution = Some(res);
        }
        Ok(())
    }

    fn create_entity(&mut self, label: &str) -> Result<EntityId> {
        let id = self.next("entities");
        self.entities.insert(
            id,
            Entity {
                id,
                label: label.to_string(),
                stats: NodeStats::default(),
                alt_labels: Vec::new(),
            },
        );
        Ok(id)
    }

    fn entity(&self, id: EntityId) -> Result<Option<Entity>> {
        Ok(self.entities.get(&id).cloned())
    }

    fn entities(&self) -> Result<Vec<Entity>> {
        Ok(self.entities.values().cloned().collect())
    }

    fn update_entity(&mut self, entity: &Entity) -> Result<()> {
        self.entities.insert(entity.id, entity.clone());
        Ok(())
    }

    fn create_predicate(&mut self, label: &str) -> Result<PredicateId> {
        let id = self.next("predicates");
        self.predicates.insert(
            id,
            Predicate {
                id,
                label: label.to_string(),
                stats: NodeStats::default(),
                alt_labels: Vec::new(),
            },
        );
        Ok(id)
    }

    fn predicate(&self, id: PredicateId) -> Result<Option<Predicate>> {
        Ok(self.predicates.get(&id).cloned())
    }

    fn predicates(&self) -> Result<Vec<Predicate>> {
        Ok(self.predicates.values().cloned().collect())
    }

    fn update_predicate(&mut self, predicate: &Predicate) -> Result<()> {
        self.predicates.insert(predicate.id, predicate.clone());
        Ok(())
    }

    fn create_relation(
        &mut self,
        subject: EntityId,
        predicate: PredicateId,
        object: EntityId,
    ) -> Result<RelationId> {
        let id = self.next("relations");
        self.relations.insert(
            id,
            Relation {
                id,
                subject_id: subject,
                predicate_id: predicate,
                object_id: object,
                stats: NodeStats::default(),
                significance: None,
            },
        );
        Ok(id)
    }

    fn relation(&self, id: RelationId) -> Result<Option<Relation>> {
        Ok(self.relations.get(&id).cloned())
    }

    fn relations(&self) -> Result<Vec<Relation>> {
        Ok(self.relations.values().cloned().collect())
    }

    fn update_relation(&mut self, relation: &Relation) -> Result<()> {
        self.relations.insert(relation.id, relation.clone());
        Ok(())
    }

    fn create_cooccurrence(
        &mut self,
        entity_one: EntityId,
        entity_two: EntityId,
    ) -> Result<CooccurrenceId> {
        let id = self.next("cooccurrences");
        self.cooccurrences.insert(
            id,
            Cooccurrence {
                id,
                entity_one_id: entity_one,
                entity_two_id: entity_two,
                stats: NodeStats::default(),
                pmi: None,
            },
        );
        Ok(id)
    }

    fn cooccurrence(&self, id: CooccurrenceId) -> Result<Option<Cooccurrence>> {
        Ok(self.cooccurrences.get(&id).cloned())
    }

    fn cooccurrences(&self) -> Result<Vec<Cooccurrence>> {
        Ok(self.cooccurrences.values().cloned().collect())
    }

    fn update_cooccurrence(&mut self, cooccurrence: &Cooccurrence) -> Result<()> {
        self.cooccurrences.insert(cooccurrence.id, cooccurrence.clone());
        Ok(())
    }

    fn replace_categories(&mut self, kind: NodeKind, table: Vec<(u64, Category)>) -> Result<()> {
        let mut by_target: BTreeMap<u64, Vec<Category>> = BTreeMap::new();
        for (target, category) in table {
            by_target.entry(target).or_default().push(category);
        }
        self.categories.insert(kind, by_target);
        Ok(())
    }

    fn categories_of(&self, kind: NodeKind, target: u64) -> Result<Vec<Category>> {
        Ok(self
            .categories
            .get(&kind)
            .and_then(|table| table.get(&target))
            .cloned()
            .unwrap_or_default())
    }

    fn category_table(&self, kind: NodeKind) -> Result<HashMap<u64, Vec<Category>>> {
        Ok(self
            .categories
            .get(&kind)
            .map(|table| table.iter().map(|(k, v)| (*k, v.clone())).collect())
            .unwrap_or_default())
    }

    fn clear(&mut self) -> Result<()> {
        *self = Self::default();
        Ok(())
    }
}
