//! Canonical identity resolution.
//!
//! One cache per canonical node type, each preloading the existing rows of
//! its table and creating missing rows on first use, so that for a given
//! cache instance equal keys always resolve to the same durable id and at
//! most one row is ever created per key.
//!
//! Construction order matters and is driven by [`resolve_annotations`]:
//! entity and predicate caches are independent leaves; the co-occurrence
//! cache requires resolved entity ids; the relation cache requires resolved
//! entity and predicate ids and runs after co-occurrence resolution. There
//! is no lazy cross-type recursion.
//!
//! Label-keyed caches translate raw mention strings through a
//! canonicalization mapping produced ahead of time over the *full* label
//! vocabulary. A raw label absent from that mapping is a caller contract
//! violation and surfaces as [`GraphError::UnmappedLabel`].

use std::collections::HashMap;

use tracing::debug;

use crate::error::{GraphError, Result};
use crate::store::GraphStore;
use crate::types::*;

/// Raw-label → canonical-label mapping produced by a canonicalizer.
pub type LabelMapping = HashMap<String, String>;

fn canonical<'a>(mapping: &'a LabelMapping, raw: &str) -> Result<&'a str> {
    mapping
        .get(raw)
        .map(String::as_str)
        .ok_or_else(|| GraphError::UnmappedLabel(raw.to_string()))
}

/// Get-or-create cache for canonical entities, keyed by canonical label.
pub struct EntityCache<'a> {
    mapping: &'a LabelMapping,
    by_label: HashMap<String, EntityId>,
    created: u64,
}

impl<'a> EntityCache<'a> {
    /// Preload all existing entity rows.
    pub fn load<S: GraphStore>(store: &S, mapping: &'a LabelMapping) -> Result<Self> {
        let by_label = store
            .entities()?
            .into_iter()
            .map(|e| (e.label, e.id))
            .collect();
        Ok(Self {
            mapping,
            by_label,
            created: 0,
        })
    }

    /// Resolve a raw mention string to its canonical entity id, creating the
    /// entity row on first sight of its canonical label.
    pub fn get_or_create<S: GraphStore>(&mut self, store: &mut S, raw: &str) -> Result<EntityId> {
        let label = canonical(self.mapping, raw)?;
        if let Some(&id) = self.by_label.get(label) {
            return Ok(id);
        }
        let id = store.create_entity(label)?;
        self.by_label.insert(label.to_string(), id);
        self.created += 1;
        Ok(id)
    }

    /// Number of entity rows created through this cache instance.
    pub fn created(&self) -> u64 {
        self.created
    }
}

/// Get-or-create cache for canonical predicates, keyed by canonical label.
pub struct PredicateCache<'a> {
    mapping: &'a LabelMapping,
    by_label: HashMap<String, PredicateId>,
    created: u64,
}

impl<'a> PredicateCache<'a> {
    /// Preload all existing predicate rows.
    pub fn load<S: GraphStore>(store: &S, mapping: &'a LabelMapping) -> Result<Self> {
        let by_label = store
            .predicates()?
            .into_iter()
            .map(|p| (p.label, p.id))
            .collect();
        Ok(Self {
            mapping,
            by_label,
            created: 0,
        })
    }

    /// Resolve a raw predicate phrase to its canonical predicate id.
    pub fn get_or_create<S: GraphStore>(
        &mut self,
        store: &mut S,
        raw: &str,
    ) -> Result<PredicateId> {
        let label = canonical(self.mapping, raw)?;
        if let Some(&id) = self.by_label.get(label) {
            return Ok(id);
        }
        let id = store.create_predicate(label)?;
        self.by_label.insert(label.to_string(), id);
        self.created += 1;
        Ok(id)
    }

    /// Number of predicate rows created through this cache instance.
    pub fn created(&self) -> u64 {
        self.created
    }
}

/// Get-or-create cache for co-occurrences, keyed by the unordered entity
/// pair (stored lower-id-first so `(A, B)` and `(B, A)` share a row).
pub struct CooccurrenceCache {
    by_pair: HashMap<(EntityId, EntityId), CooccurrenceId>,
    created: u64,
}

impl CooccurrenceCache {
    /// Preload all existing co-occurrence rows.
    pub fn load<S: GraphStore>(store: &S) -> Result<Self> {
        let by_pair = store
            .cooccurrences()?
            .into_iter()
            .map(|c| ((c.entity_one_id, c.entity_two_id), c.id))
            .collect();
        Ok(Self {
            by_pair,
            created: 0,
        })
    }

    /// Resolve an entity pair (in either order) to its co-occurrence id.
    pub fn get_or_create<S: GraphStore>(
        &mut self,
        store: &mut S,
        a: EntityId,
        b: EntityId,
    ) -> Result<CooccurrenceId> {
        let pair = ordered_pair(a, b);
        if let Some(&id) = self.by_pair.get(&pair) {
            return Ok(id);
        }
        let id = store.create_cooccurrence(pair.0, pair.1)?;
        self.by_pair.insert(pair, id);
        self.created += 1;
        Ok(id)
    }

    /// Number of co-occurrence rows created through this cache instance.
    pub fn created(&self) -> u64 {
        self.created
    }
}

/// Get-or-create cache for relations, keyed by
/// `(subject, predicate, object)`.
pub struct RelationCache {
    by_key: HashMap<(EntityId, PredicateId, EntityId), RelationId>,
    created: u64,
}

impl RelationCache {
    /// Preload all existing relation rows.
    pub fn load<S: GraphStore>(store: &S) -> Result<Self> {
        let by_key = store
            .relations()?
            .into_iter()
            .map(|r| ((r.subject_id, r.predicate_id, r.object_id), r.id))
            .collect();
        Ok(Self {
            by_key,
            created: 0,
        })
    }

    /// Resolve a `(subject, predicate, object)` key to its relation id.
    pub fn get_or_create<S: GraphStore>(
        &mut self,
        store: &mut S,
        subject: EntityId,
        predicate: PredicateId,
        object: EntityId,
    ) -> Result<RelationId> {
        let key = (subject, predicate, object);
        if let Some(&id) = self.by_key.get(&key) {
            return Ok(id);
        }
        let id = store.create_relation(subject, predicate, object)?;
        self.by_key.insert(key, id);
        self.created += 1;
        Ok(id)
    }

    /// Number of relation rows created through this cache instance.
    pub fn created(&self) -> u64 {
        self.created
    }
}

/// Counts reported by a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    /// Mentions that received an entity id in this pass.
    pub mentions_resolved: u64,
    /// Tuplets that received canonical ids in this pass.
    pub tuplets_resolved: u64,
    /// Triplets that received canonical ids in this pass.
    pub triplets_resolved: u64,
    /// Entity rows created.
    pub entities_created: u64,
    /// Predicate rows created.
    pub predicates_created: u64,
    /// Co-occurrence rows created.
    pub cooccurrences_created: u64,
    /// Relation rows created.
    pub relations_created: u64,
}

/// Resolve every unresolved mention, tuplet, and triplet in the store.
///
/// Walks the annotation tables exactly once, in dependency order: mentions
/// (entities), then tuplets (co-occurrences), then triplets (predicates and
/// relations). Already-resolved rows are left untouched, so re-running
/// against a reused store only processes newly written annotations.
///
/// Both mappings must be total over the raw labels of the unresolved rows;
/// see [`GraphError::UnmappedLabel`].
pub fn resolve_annotations<S: GraphStore>(
    store: &mut S,
    entity_mapping: &LabelMapping,
    predicate_mapping: &LabelMapping,
) -> Result<ResolutionSummary> {
    let mut summary = ResolutionSummary::default();

    // Mentions → entities. Also build the mention → entity lookup the
    // annotation walks below resolve through.
    let mut entity_cache = EntityCache::load(store, entity_mapping)?;
    let mut mention_entity: HashMap<MentionId, EntityId> = HashMap::new();
    for mention in store.mentions()? {
        let entity_id = match mention.entity_id {
            Some(id) => id,
            None => {
                let id = entity_cache.get_or_create(store, &mention.span.text)?;
                store.set_mention_entity(mention.id, id)?;
                summary.mentions_resolved += 1;
                id
            }
        };
        mention_entity.insert(mention.id, entity_id);
    }
    summary.entities_created = entity_cache.created();
    debug!(
        mentions = mention_entity.len(),
        created = summary.entities_created,
        "resolved entity mentions"
    );

    let lookup = |mention_entity: &HashMap<MentionId, EntityId>, id: MentionId| {
        mention_entity
            .get(&id)
            .copied()
            .ok_or(GraphError::NotFound {
                kind: "mention",
                id,
            })
    };

    // Tuplets → co-occurrences.
    let mut cooccurrence_cache = CooccurrenceCache::load(store)?;
    for tuplet in store.tuplets()? {
        if tuplet.resolution.is_some() {
            continue;
        }
        let entity_one_id = lookup(&mention_entity, tuplet.mention_one)?;
        let entity_two_id = lookup(&mention_entity, tuplet.mention_two)?;
        let cooccurrence_id =
            cooccurrence_cache.get_or_create(store, entity_one_id, entity_two_id)?;
        store.set_tuplet_resolution(
            tuplet.id,
            TupletResolution {
                entity_one_id,
                entity_two_id,
                cooccurrence_id,
            },
        )?;
        summary.tuplets_resolved += 1;
    }
    summary.cooccurrences_created = cooccurrence_cache.created();
    debug!(
        tuplets = summary.tuplets_resolved,
        created = summary.cooccurrences_created,
        "resolved tuplets"
    );

    // Triplets → predicates and relations.
    let mut predicate_cache = PredicateCache::load(store, predicate_mapping)?;
    let mut relation_cache = RelationCache::load(store)?;
    for triplet in store.triplets()? {
        if triplet.resolution.is_some() {
            continue;
        }
        let subject_id = lookup(&mention_entity, triplet.subject_mention)?;
        let object_id = lookup(&mention_entity, triplet.object_mention)?;
        let predicate_id = predicate_cache.get_or_create(store, &triplet.predicate_span.text)?;
        let relation_id = relation_cache.get_or_create(store, subject_id, predicate_id, object_id)?;
        store.set_triplet_resolution(
            triplet.id,
            TripletResolution {
                subject_id,
                predicate_id,
                object_id,
                relation_id,
            },
        )?;
        summary.triplets_resolved += 1;
    }
    summary.predicates_created = predicate_cache.created();
    summary.relations_created = relation_cache.created();
    debug!(
        triplets = summary.triplets_resolved,
        predicates = summary.predicates_created,
        relations = summary.relations_created,
        "resolved triplets"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemStore;

    fn identity_mapping(labels: &[&str]) -> LabelMapping {
        labels
            .iter()
            .map(|l| (l.to_string(), l.to_string()))
            .collect()
    }

    #[test]
    fn test_get_or_create_is_stable() {
        let mut store = MemStore::new();
        let mapping = identity_mapping(&["Alice"]);
        let mut cache = EntityCache::load(&store, &mapping).unwrap();

        let first = cache.get_or_create(&mut store, "Alice").unwrap();
        let second = cache.get_or_create(&mut store, "Alice").unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.created(), 1);
        assert_eq!(store.entities().unwrap().len(), 1);
    }

    #[test]
    fn test_mapped_labels_share_a_row() {
        let mut store = MemStore::new();
        let mapping: LabelMapping = [
            ("the cat".to_string(), "cat".to_string()),
            ("cat".to_string(), "cat".to_string()),
        ]
        .into_iter()
        .collect();
        let mut cache = EntityCache::load(&store, &mapping).unwrap();

        let a = cache.get_or_create(&mut store, "the cat").unwrap();
        let b = cache.get_or_create(&mut store, "cat").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.entity(a).unwrap().unwrap().label, "cat");
    }

    #[test]
    fn test_unmapped_label_is_a_contract_violation() {
        let mut store = MemStore::new();
        let mapping = identity_mapping(&[]);
        let mut cache = EntityCache::load(&store, &mapping).unwrap();

        let err = cache.get_or_create(&mut store, "Alice").unwrap_err();
        assert!(matches!(err, GraphError::UnmappedLabel(label) if label == "Alice"));
    }

    #[test]
    fn test_cache_preloads_existing_rows() {
        let mut store = MemStore::new();
        let existing = store.create_entity("Alice").unwrap();

        let mapping = identity_mapping(&["Alice"]);
        let mut cache = EntityCache::load(&store, &mapping).unwrap();
        let id = cache.get_or_create(&mut store, "Alice").unwrap();
        assert_eq!(id, existing);
        assert_eq!(cache.created(), 0);
    }

    #[test]
    fn test_cooccurrence_resolution_is_symmetric() {
        let mut store = MemStore::new();
        let a = store.create_entity("Alice").unwrap();
        let b = store.create_entity("Bob").unwrap();

        let mut cache = CooccurrenceCache::load(&store).unwrap();
        let ab = cache.get_or_create(&mut store, a, b).unwrap();
        let ba = cache.get_or_create(&mut store, b, a).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(cache.created(), 1);

        let row = store.cooccurrence(ab).unwrap().unwrap();
        assert!(row.entity_one_id <= row.entity_two_id);
    }

    #[test]
    fn test_identical_triples_share_a_relation() {
        let mut store = MemStore::new();
        let subject = store.create_entity("Alice").unwrap();
        let object = store.create_entity("Bob").unwrap();
        let predicate = store.create_predicate("met").unwrap();

        let mut cache = RelationCache::load(&store).unwrap();
        let first = cache
            .get_or_create(&mut store, subject, predicate, object)
            .unwrap();
        let second = cache
            .get_or_create(&mut store, subject, predicate, object)
            .unwrap();
        assert_eq!(first, second);

        // The reversed direction is a different key.
        let reversed = cache
            .get_or_create(&mut store, object, predicate, subject)
            .unwrap();
        assert_ne!(first, reversed);
    }

    #[test]
    fn test_resolve_annotations_end_to_end() {
        let mut store = MemStore::new();
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
        store
            .insert_triplets(vec![NewTriplet {
                doc_id: doc,
                subject_mention: mentions[0],
                predicate_span: Span::new(6, 9, "met"),
                object_mention: mentions[1],
            }])
            .unwrap();
        store
            .insert_tuplets(vec![NewTuplet {
                doc_id: doc,
                mention_one: mentions[0],
                mention_two: mentions[1],
            }])
            .unwrap();

        let entity_mapping = identity_mapping(&["Alice", "Bob"]);
        let predicate_mapping = identity_mapping(&["met"]);
        let summary =
            resolve_annotations(&mut store, &entity_mapping, &predicate_mapping).unwrap();

        assert_eq!(summary.mentions_resolved, 2);
        assert_eq!(summary.entities_created, 2);
        assert_eq!(summary.predicates_created, 1);
        assert_eq!(summary.relations_created, 1);
        assert_eq!(summary.cooccurrences_created, 1);

        let triplet = &store.triplets().unwrap()[0];
        let res = triplet.resolution.expect("triplet resolved");
        assert_ne!(res.subject_id, res.object_id);

        let tuplet = &store.tuplets().unwrap()[0];
        assert!(tuplet.resolution.is_some());

        // Second pass is a no-op: everything is already resolved.
        let again = resolve_annotations(&mut store, &entity_mapping, &predicate_mapping).unwrap();
        assert_eq!(again, ResolutionSummary::default());
    }
}
