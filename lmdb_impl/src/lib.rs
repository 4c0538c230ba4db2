//! # Narragraph LMDB
//!
//! Durable [`GraphStore`] backend on LMDB via the `heed` bindings.
//!
//! One named database per logical table, with bincode-serialized rows and a
//! counters table for sequential id assignment:
//!
//! | Database        | Key          | Value              |
//! |-----------------|--------------|--------------------|
//! | `documents`     | `u64`        | `Document`         |
//! | `mentions`      | `u64`        | `Mention`          |
//! | `triplets`      | `u64`        | `Triplet`          |
//! | `tuplets`       | `u64`        | `Tuplet`           |
//! | `entities`      | `u64`        | `Entity`           |
//! | `predicates`    | `u64`        | `Predicate`        |
//! | `relations`     | `u64`        | `Relation`         |
//! | `cooccurrences` | `u64`        | `Cooccurrence`     |
//! | `categories`    | `(u8, u64)`  | `Vec<Category>`    |
//! | `counters`      | `String`     | `u64`              |
//!
//! Every mutating trait method runs one write transaction; bulk inserts are
//! chunked by the caller (the pipeline batches documents) and committed per
//! call. Ids handed out are durable across process restarts.
//!
//! The single-writer constraint of the pipeline applies to this store as a
//! whole: do not populate one environment from several runs concurrently.

use std::fs;
use std::path::Path;

use anyhow::Context;
use heed::types::SerdeBincode;
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};

use narragraph_core::error::{GraphError, Result};
use narragraph_core::store::GraphStore;
use narragraph_core::types::*;

/// Default LMDB map size: 10 GiB.
pub const DEFAULT_MAP_SIZE: u64 = 10 * 1024 * 1024 * 1024;

/// Category-table key: node-kind discriminant plus target id.
type CategoryKey = (u8, u64);

fn kind_to_u8(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Entity => 0,
        NodeKind::Predicate => 1,
        NodeKind::Relation => 2,
        NodeKind::Cooccurrence => 3,
    }
}

fn backend(e: heed::Error) -> GraphError {
    GraphError::Backend(anyhow::Error::new(e))
}

/// LMDB-backed graph store.
pub struct LmdbStore {
    env: Env,
    documents: Database<SerdeBincode<u64>, SerdeBincode<Document>>,
    mentions: Database<SerdeBincode<u64>, SerdeBincode<Mention>>,
    triplets: Database<SerdeBincode<u64>, SerdeBincode<Triplet>>,
    tuplets: Database<SerdeBincode<u64>, SerdeBincode<Tuplet>>,
    entities: Database<SerdeBincode<u64>, SerdeBincode<Entity>>,
    predicates: Database<SerdeBincode<u64>, SerdeBincode<Predicate>>,
    relations: Database<SerdeBincode<u64>, SerdeBincode<Relation>>,
    cooccurrences: Database<SerdeBincode<u64>, SerdeBincode<Cooccurrence>>,
    categories: Database<SerdeBincode<CategoryKey>, SerdeBincode<Vec<Category>>>,
    counters: Database<SerdeBincode<String>, SerdeBincode<u64>>,
}

impl LmdbStore {
    /// Open (or create) a store at the given directory with the default map
    /// size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    /// Open (or create) a store with an explicit LMDB map size.
    pub fn open_with_map_size(path: impl AsRef<Path>, map_size: u64) -> Result<Self> {
        let path = path.as_ref();
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create data directory {}", path.display()))?;

        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size as usize)
                .max_dbs(10)
                .open(path)
                .with_context(|| format!("failed to open LMDB environment at {}", path.display()))?
        };

        let mut wtxn = env.write_txn().map_err(backend)?;
        let documents = env
            .create_database(&mut wtxn, Some("documents"))
            .map_err(backend)?;
        let mentions = env
            .create_database(&mut wtxn, Some("mentions"))
            .map_err(backend)?;
        let triplets = env
            .create_database(&mut wtxn, Some("triplets"))
            .map_err(backend)?;
        let tuplets = env
            .create_database(&mut wtxn, Some("tuplets"))
            .map_err(backend)?;
        let entities = env
            .create_database(&mut wtxn, Some("entities"))
            .map_err(backend)?;
        let predicates = env
            .create_database(&mut wtxn, Some("predicates"))
            .map_err(backend)?;
        let relations = env
            .create_database(&mut wtxn, Some("relations"))
            .map_err(backend)?;
        let cooccurrences = env
            .create_database(&mut wtxn, Some("cooccurrences"))
            .map_err(backend)?;
        let categories = env
            .create_database(&mut wtxn, Some("categories"))
            .map_err(backend)?;
        let counters = env
            .create_database(&mut wtxn, Some("counters"))
            .map_err(backend)?;
        wtxn.commit().map_err(backend)?;

        Ok(Self {
            env,
            documents,
            mentions,
            triplets,
            tuplets,
            entities,
            predicates,
            relations,
            cooccurrences,
            categories,
            counters,
        })
    }

    /// Allocate `count` sequential ids for a table, starting at the stored
    /// counter (1 on first use).
    fn next_ids(&self, wtxn: &mut RwTxn, table: &str, count: u64) -> Result<Vec<u64>> {
        let key = table.to_string();
        let start = self.counters.get(wtxn, &key).map_err(backend)?.unwrap_or(1);
        self.counters
            .put(wtxn, &key, &(start + count))
            .map_err(backend)?;
        Ok((start..start + count).collect())
    }

    /// Read a whole table, sorted by id.
    ///
    /// Bincode-serialized u64 keys do not sort numerically in LMDB byte
    /// order, so rows are sorted after collection.
    fn scan<V: serde::de::DeserializeOwned + 'static>(
        &self,
        rtxn: &RoTxn,
        db: Database<SerdeBincode<u64>, SerdeBincode<V>>,
    ) -> Result<Vec<(u64, V)>> {
        let mut rows = Vec::new();
        for item in db.iter(rtxn).map_err(backend)? {
            rows.push(item.map_err(backend)?);
        }
        rows.sort_by_key(|(id, _)| *id);
        Ok(rows)
    }
}

impl GraphStore for LmdbStore {
    fn insert_documents(&mut self, docs: Vec<NewDocument>) -> Result<Vec<DocId>> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let ids = self.next_ids(&mut wtxn, "documents", docs.len() as u64)?;
        for (id, doc) in ids.iter().zip(docs) {
            let row = Document {
                id: *id,
                text: doc.text,
                str_id: doc.str_id,
                timestamp: doc.timestamp,
                timestamp_ordinal: doc.timestamp_ordinal,
                categories: doc.categories,
                metadata: doc.metadata,
            };
            self.documents.put(&mut wtxn, id, &row).map_err(backend)?;
        }
        wtxn.commit().map_err(backend)?;
        Ok(ids)
    }

    fn document(&self, id: DocId) -> Result<Option<Document>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        self.documents.get(&rtxn, &id).map_err(backend)
    }

    fn documents(&self) -> Result<Vec<Document>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .scan(&rtxn, self.documents)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn document_count(&self) -> Result<u64> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        self.documents.len(&rtxn).map_err(backend)
    }

    fn insert_mentions(&mut self, mentions: Vec<NewMention>) -> Result<Vec<MentionId>> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let ids = self.next_ids(&mut wtxn, "mentions", mentions.len() as u64)?;
        for (id, mention) in ids.iter().zip(mentions) {
            let row = Mention {
                id: *id,
                doc_id: mention.doc_id,
                span: mention.span,
                entity_id: None,
            };
            self.mentions.put(&mut wtxn, id, &row).map_err(backend)?;
        }
        wtxn.commit().map_err(backend)?;
        Ok(ids)
    }

    fn mention(&self, id: MentionId) -> Result<Option<Mention>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        self.mentions.get(&rtxn, &id).map_err(backend)
    }

    fn mentions(&self) -> Result<Vec<Mention>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .scan(&rtxn, self.mentions)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn set_mention_entity(&mut self, id: MentionId, entity: EntityId) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        if let Some(mut row) = self.mentions.get(&wtxn, &id).map_err(backend)? {
            row.entity_id = Some(entity);
            self.mentions.put(&mut wtxn, &id, &row).map_err(backend)?;
        }
        wtxn.commit().map_err(backend)
    }

    fn insert_triplets(&mut self, rows: Vec<NewTriplet>) -> Result<Vec<TripletId>> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let ids = self.next_ids(&mut wtxn, "triplets", rows.len() as u64)?;
        for (id, row) in ids.iter().zip(rows) {
            let triplet = Triplet {
                id: *id,
                doc_id: row.doc_id,
                subject_mention: row.subject_mention,
                predicate_span: row.predicate_span,
                object_mention: row.object_mention,
                resolution: None,
            };
            self.triplets.put(&mut wtxn, id, &triplet).map_err(backend)?;
        }
        wtxn.commit().map_err(backend)?;
        Ok(ids)
    }

    fn triplets(&self) -> Result<Vec<Triplet>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .scan(&rtxn, self.triplets)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn set_triplet_resolution(&mut self, id: TripletId, res: TripletResolution) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        if let Some(mut row) = self.triplets.get(&wtxn, &id).map_err(backend)? {
            row.resolution = Some(res);
            self.triplets.put(&mut wtxn, &id, &row).map_err(backend)?;
        }
        wtxn.commit().map_err(backend)
    }

    fn insert_tuplets(&mut self, rows: Vec<NewTuplet>) -> Result<Vec<TupletId>> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let ids = self.next_ids(&mut wtxn, "tuplets", rows.len() as u64)?;
        for (id, row) in ids.iter().zip(rows) {
            let tuplet = Tuplet {
                id: *id,
                doc_id: row.doc_id,
                mention_one: row.mention_one,
                mention_two: row.mention_two,
                resolution: None,
            };
            self.tuplets.put(&mut wtxn, id, &tuplet).map_err(backend)?;
        }
        wtxn.commit().map_err(backend)?;
        Ok(ids)
    }

    fn tuplets(&self) -> Result<Vec<Tuplet>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .scan(&rtxn, self.tuplets)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn set_tuplet_resolution(&mut self, id: TupletId, res: TupletResolution) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        if let Some(mut row) = self.tuplets.get(&wtxn, &id).map_err(backend)? {
            row.resolution = Some(res);
            self.tuplets.put(&mut wtxn, &id, &row).map_err(backend)?;
        }
        wtxn.commit().map_err(backend)
    }

    fn create_entity(&mut self, label: &str) -> Result<EntityId> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let id = self.next_ids(&mut wtxn, "entities", 1)?[0];
        let row = Entity {
            id,
            label: label.to_string(),
            stats: NodeStats::default(),
            alt_labels: Vec::new(),
        };
        self.entities.put(&mut wtxn, &id, &row).map_err(backend)?;
        wtxn.commit().map_err(backend)?;
        Ok(id)
    }

    fn entity(&self, id: EntityId) -> Result<Option<Entity>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        self.entities.get(&rtxn, &id).map_err(backend)
    }

    fn entities(&self) -> Result<Vec<Entity>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .scan(&rtxn, self.entities)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn update_entity(&mut self, entity: &Entity) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        self.entities
            .put(&mut wtxn, &entity.id, entity)
            .map_err(backend)?;
        wtxn.commit().map_err(backend)
    }

    fn create_predicate(&mut self, label: &str) -> Result<PredicateId> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let id = self.next_ids(&mut wtxn, "predicates", 1)?[0];
        let row = Predicate {
            id,
            label: label.to_string(),
            stats: NodeStats::default(),
            alt_labels: Vec::new(),
        };
        self.predicates.put(&mut wtxn, &id, &row).map_err(backend)?;
        wtxn.commit().map_err(backend)?;
        Ok(id)
    }

    fn predicate(&self, id: PredicateId) -> Result<Option<Predicate>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        self.predicates.get(&rtxn, &id).map_err(backend)
    }

    fn predicates(&self) -> Result<Vec<Predicate>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .scan(&rtxn, self.predicates)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn update_predicate(&mut self, predicate: &Predicate) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        self.predicates
            .put(&mut wtxn, &predicate.id, predicate)
            .map_err(backend)?;
        wtxn.commit().map_err(backend)
    }

    fn create_relation(
        &mut self,
        subject: EntityId,
        predicate: PredicateId,
        object: EntityId,
    ) -> Result<RelationId> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let id = self.next_ids(&mut wtxn, "relations", 1)?[0];
        let row = Relation {
            id,
            subject_id: subject,
            predicate_id: predicate,
            object_id: object,
            stats: NodeStats::default(),
            significance: None,
        };
        self.relations.put(&mut wtxn, &id, &row).map_err(backend)?;
        wtxn.commit().map_err(backend)?;
        Ok(id)
    }

    fn relation(&self, id: RelationId) -> Result<Option<Relation>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        self.relations.get(&rtxn, &id).map_err(backend)
    }

    fn relations(&self) -> Result<Vec<Relation>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .scan(&rtxn, self.relations)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn update_relation(&mut self, relation: &Relation) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        self.relations
            .put(&mut wtxn, &relation.id, relation)
            .map_err(backend)?;
        wtxn.commit().map_err(backend)
    }

    fn create_cooccurrence(
        &mut self,
        entity_one: EntityId,
        entity_two: EntityId,
    ) -> Result<CooccurrenceId> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        let id = self.next_ids(&mut wtxn, "cooccurrences", 1)?[0];
        let row = Cooccurrence {
            id,
            entity_one_id: entity_one,
            entity_two_id: entity_two,
            stats: NodeStats::default(),
            pmi: None,
        };
        self.cooccurrences.put(&mut wtxn, &id, &row).map_err(backend)?;
        wtxn.commit().map_err(backend)?;
        Ok(id)
    }

    fn cooccurrence(&self, id: CooccurrenceId) -> Result<Option<Cooccurrence>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        self.cooccurrences.get(&rtxn, &id).map_err(backend)
    }

    fn cooccurrences(&self) -> Result<Vec<Cooccurrence>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .scan(&rtxn, self.cooccurrences)?
            .into_iter()
            .map(|(_, v)| v)
            .collect())
    }

    fn update_cooccurrence(&mut self, cooccurrence: &Cooccurrence) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        self.cooccurrences
            .put(&mut wtxn, &cooccurrence.id, cooccurrence)
            .map_err(backend)?;
        wtxn.commit().map_err(backend)
    }

    fn replace_categories(&mut self, kind: NodeKind, table: Vec<(u64, Category)>) -> Result<()> {
        let discriminant = kind_to_u8(kind);
        let mut wtxn = self.env.write_txn().map_err(backend)?;

        // Drop the old table for this kind.
        let stale: Vec<CategoryKey> = self
            .categories
            .iter(&wtxn)
            .map_err(backend)?
            .filter_map(|item| item.ok().map(|(k, _)| k))
            .filter(|(k, _)| *k == discriminant)
            .collect();
        for key in stale {
            self.categories.delete(&mut wtxn, &key).map_err(backend)?;
        }

        let mut grouped: std::collections::HashMap<u64, Vec<Category>> =
            std::collections::HashMap::new();
        for (target, category) in table {
            grouped.entry(target).or_default().push(category);
        }
        for (target, categories) in grouped {
            self.categories
                .put(&mut wtxn, &(discriminant, target), &categories)
                .map_err(backend)?;
        }
        wtxn.commit().map_err(backend)
    }

    fn categories_of(&self, kind: NodeKind, target: u64) -> Result<Vec<Category>> {
        let rtxn = self.env.read_txn().map_err(backend)?;
        Ok(self
            .categories
            .get(&rtxn, &(kind_to_u8(kind), target))
            .map_err(backend)?
            .unwrap_or_default())
    }

    fn category_table(
        &self,
        kind: NodeKind,
    ) -> Result<std::collections::HashMap<u64, Vec<Category>>> {
        let discriminant = kind_to_u8(kind);
        let rtxn = self.env.read_txn().map_err(backend)?;
        let mut table = std::collections::HashMap::new();
        for item in self.categories.iter(&rtxn).map_err(backend)? {
            let ((k, target), categories) = item.map_err(backend)?;
            if k == discriminant {
                table.insert(target, categories);
            }
        }
        Ok(table)
    }

    fn clear(&mut self) -> Result<()> {
        let mut wtxn = self.env.write_txn().map_err(backend)?;
        self.documents.clear(&mut wtxn).map_err(backend)?;
        self.mentions.clear(&mut wtxn).map_err(backend)?;
        self.triplets.clear(&mut wtxn).map_err(backend)?;
        self.tuplets.clear(&mut wtxn).map_err(backend)?;
        self.entities.clear(&mut wtxn).map_err(backend)?;
        self.predicates.clear(&mut wtxn).map_err(backend)?;
        self.relations.clear(&mut wtxn).map_err(backend)?;
        self.cooccurrences.clear(&mut wtxn).map_err(backend)?;
        self.categories.clear(&mut wtxn).map_err(backend)?;
        self.counters.clear(&mut wtxn).map_err(backend)?;
        wtxn.commit().map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, LmdbStore) {
        let dir = TempDir::new().expect("tempdir");
        let store = LmdbStore::open_with_map_size(dir.path(), 64 * 1024 * 1024).expect("open");
        (dir, store)
    }

    #[test]
    fn test_document_round_trip() {
        let (_dir, mut store) = open_temp();
        let ids = store
            .insert_documents(vec![NewDocument {
                text: "Alice met Bob.".into(),
                str_id: Some("d1".into()),
                timestamp: chrono::NaiveDate::from_ymd_opt(2021, 2, 3),
                timestamp_ordinal: Some(7),
                categories: vec![Category::new("source", "test")],
                metadata: Default::default(),
            }])
            .unwrap();
        assert_eq!(ids, vec![1]);

        let doc = store.document(1).unwrap().unwrap();
        assert_eq!(doc.text, "Alice met Bob.");
        assert_eq!(doc.str_id.as_deref(), Some("d1"));
        assert_eq!(doc.timestamp_ordinal, Some(7));
        assert!(store.document(2).unwrap().is_none());
    }

    #[test]
    fn test_sequential_ids_per_table() {
        let (_dir, mut store) = open_temp();
        let docs = store
            .insert_documents(vec![
                NewDocument::from_text("one"),
                NewDocument::from_text("two"),
            ])
            .unwrap();
        assert_eq!(docs, vec![1, 2]);

        // Each table has its own sequence.
        let entity = store.create_entity("Alice").unwrap();
        assert_eq!(entity, 1);
        let predicate = store.create_predicate("met").unwrap();
        assert_eq!(predicate, 1);
    }

    #[test]
    fn test_mention_resolution_write_back() {
        let (_dir, mut store) = open_temp();
        let doc = store
            .insert_documents(vec![NewDocument::from_text("Alice")])
            .unwrap()[0];
        let mention = store
            .insert_mentions(vec![NewMention {
                doc_id: doc,
                span: Span::new(0, 5, "Alice"),
            }])
            .unwrap()[0];

        store.set_mention_entity(mention, 3).unwrap();
        assert_eq!(store.mention(mention).unwrap().unwrap().entity_id, Some(3));
    }

    #[test]
    fn test_rows_are_returned_in_id_order() {
        let (_dir, mut store) = open_temp();
        // Enough rows that bincode key byte-order differs from id order.
        let docs: Vec<NewDocument> = (0..300)
            .map(|i| NewDocument::from_text(format!("doc {i}")))
            .collect();
        store.insert_documents(docs).unwrap();

        let rows = store.documents().unwrap();
        assert_eq!(rows.len(), 300);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.id, (i + 1) as u64);
        }
    }

    #[test]
    fn test_ids_persist_across_reopen() {
        let dir = TempDir::new().expect("tempdir");
        {
            let mut store =
                LmdbStore::open_with_map_size(dir.path(), 64 * 1024 * 1024).unwrap();
            let id = store.create_entity("Alice").unwrap();
            assert_eq!(id, 1);
        }
        {
            let mut store =
                LmdbStore::open_with_map_size(dir.path(), 64 * 1024 * 1024).unwrap();
            // Existing rows survive; the id sequence continues.
            assert_eq!(store.entities().unwrap().len(), 1);
            let id = store.create_entity("Bob").unwrap();
            assert_eq!(id, 2);
        }
    }

    #[test]
    fn test_update_entity_stats() {
        let (_dir, mut store) = open_temp();
        let id = store.create_entity("Alice").unwrap();
        let mut entity = store.entity(id).unwrap().unwrap();
        entity.stats.frequency = 9;
        entity.alt_labels = vec!["alice".into()];
        store.update_entity(&entity).unwrap();

        let back = store.entity(id).unwrap().unwrap();
        assert_eq!(back.stats.frequency, 9);
        assert_eq!(back.alt_labels, vec!["alice".to_string()]);
    }

    #[test]
    fn test_category_tables_are_kind_scoped() {
        let (_dir, mut store) = open_temp();
        store
            .replace_categories(NodeKind::Entity, vec![(1, Category::new("source", "a"))])
            .unwrap();
        store
            .replace_categories(
                NodeKind::Relation,
                vec![(1, Category::new("source", "b"))],
            )
            .unwrap();

        assert_eq!(
            store.categories_of(NodeKind::Entity, 1).unwrap(),
            vec![Category::new("source", "a")]
        );
        assert_eq!(
            store.categories_of(NodeKind::Relation, 1).unwrap(),
            vec![Category::new("source", "b")]
        );

        // Replacing one kind leaves the other untouched.
        store
            .replace_categories(NodeKind::Entity, vec![(2, Category::new("source", "c"))])
            .unwrap();
        assert!(store.categories_of(NodeKind::Entity, 1).unwrap().is_empty());
        assert_eq!(
            store.categories_of(NodeKind::Relation, 1).unwrap(),
            vec![Category::new("source", "b")]
        );
    }

    #[test]
    fn test_clear_resets_everything() {
        let (_dir, mut store) = open_temp();
        store
            .insert_documents(vec![NewDocument::from_text("one")])
            .unwrap();
        store.create_entity("Alice").unwrap();
        store.clear().unwrap();

        assert!(store.is_empty().unwrap());
        assert!(store.entities().unwrap().is_empty());
        // Sequences restart.
        assert_eq!(store.create_entity("Bob").unwrap(), 1);
    }

    #[test]
    fn test_annotation_round_trip() {
        let (_dir, mut store) = open_temp();
        let doc = store
            .insert_documents(vec![NewDocument::from_text("Alice met Bob.")])
            .unwrap()[0];
        let mentions = store
            .insert_mentions(vec![
                NewMention {
                    doc_id: doc,
                    span: Span::new(0, 5, "Alice"),
                },
                NewMention {
                    doc_id: doc,
                    span: Span::new(10, 13, "Bob"),
                },
            ])
            .unwrap();
        let triplet = store
            .insert_triplets(vec![NewTriplet {
                doc_id: doc,
                subject_mention: mentions[0],
                predicate_span: Span::new(6, 9, "met"),
                object_mention: mentions[1],
            }])
            .unwrap()[0];
        let tuplet = store
            .insert_tuplets(vec![NewTuplet {
                doc_id: doc,
                mention_one: mentions[0],
                mention_two: mentions[1],
            }])
            .unwrap()[0];

        store
            .set_triplet_resolution(
                triplet,
                TripletResolution {
                    subject_id: 1,
                    predicate_id: 1,
                    object_id: 2,
                    relation_id: 1,
                },
            )
            .unwrap();
        store
            .set_tuplet_resolution(
                tuplet,
                TupletResolution {
                    entity_one_id: 1,
                    entity_two_id: 2,
                    cooccurrence_id: 1,
                },
            )
            .unwrap();

        assert!(store.triplets().unwrap()[0].resolution.is_some());
        assert!(store.tuplets().unwrap()[0].resolution.is_some());
    }
}
