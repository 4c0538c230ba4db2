//! Statistics aggregation over resolved annotations.
//!
//! Recomputes, for every canonical node with at least one resolved
//! annotation, the full statistics block plus alternate labels, materialized
//! category tables, co-occurrence PMI, and relation significance. Statistics
//! are a pure function of the current annotation set: each run recomputes
//! them wholesale, never patching incrementally.
//!
//! Ordering constraint: entities → co-occurrences → predicates → relations.
//! PMI needs entity frequencies; relation significance needs predicate
//! frequencies and entity-pair sums, so it is the last step.

use std::collections::{BTreeSet, HashMap};

use tracing::info;

use crate::error::Result;
use crate::store::GraphStore;
use crate::types::*;

/// Counts reported by one aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationReport {
    /// Entities that received recomputed statistics.
    pub entities: u64,
    /// Co-occurrences that received recomputed statistics.
    pub cooccurrences: u64,
    /// Predicates that received recomputed statistics.
    pub predicates: u64,
    /// Relations that received recomputed statistics.
    pub relations: u64,
}

/// Per-node accumulator over its resolved annotations.
#[derive(Debug, Default)]
struct Acc {
    frequency: u64,
    doc_ids: BTreeSet<DocId>,
}

impl Acc {
    fn hit(&mut self, doc_id: DocId) {
        self.frequency += 1;
        self.doc_ids.insert(doc_id);
    }

    fn finalize(&self, docs: &HashMap<DocId, Document>, n_docs: u64) -> NodeStats {
        let timestamps: Vec<_> = self
            .doc_ids
            .iter()
            .filter_map(|id| docs.get(id).and_then(|d| d.timestamp))
            .collect();
        let ordinals: Vec<_> = self
            .doc_ids
            .iter()
            .filter_map(|id| docs.get(id).and_then(|d| d.timestamp_ordinal))
            .collect();

        let doc_frequency = self.doc_ids.len() as u64;
        NodeStats {
            frequency: self.frequency,
            doc_frequency,
            adjusted_tf_idf: (self.frequency.saturating_sub(1)) as f64
                * (n_docs as f64 / (doc_frequency + 1) as f64),
            first_occurrence: timestamps.iter().min().copied(),
            last_occurrence: timestamps.iter().max().copied(),
            first_occurrence_ordinal: ordinals.iter().min().copied(),
            last_occurrence_ordinal: ordinals.iter().max().copied(),
        }
    }

    /// De-duplicated union of the owning documents' category tags.
    fn categories(&self, docs: &HashMap<DocId, Document>) -> Vec<Category> {
        let set: BTreeSet<Category> = self
            .doc_ids
            .iter()
            .filter_map(|id| docs.get(id))
            .flat_map(|d| d.categories.iter().cloned())
            .collect();
        set.into_iter().collect()
    }
}

/// Recompute statistics for every canonical node backed by at least one
/// resolved annotation.
///
/// A node with no resolved annotations is left untouched, so frequency ≥ 1
/// holds wherever a logarithm is taken. An empty corpus (zero documents) is
/// a no-op.
pub fn recompute_statistics<S: GraphStore>(store: &mut S) -> Result<AggregationReport> {
    let n_docs = store.document_count()?;
    if n_docs == 0 {
        return Ok(AggregationReport::default());
    }

    let docs: HashMap<DocId, Document> =
        store.documents()?.into_iter().map(|d| (d.id, d)).collect();
    let mentions = store.mentions()?;
    let triplets = store.triplets()?;
    let tuplets = store.tuplets()?;

    let mut report = AggregationReport::default();

    // --- Entities ------------------------------------------------------
    // Every subject/object role is a shared mention row, so grouping the
    // mention table by resolved entity covers all roles without double
    // counting a span referenced by both a triplet and a tuplet.
    let mut entity_accs: HashMap<EntityId, Acc> = HashMap::new();
    let mut raw_texts: HashMap<EntityId, BTreeSet<String>> = HashMap::new();
    for mention in &mentions {
        if let Some(entity_id) = mention.entity_id {
            entity_accs.entry(entity_id).or_default().hit(mention.doc_id);
            raw_texts
                .entry(entity_id)
                .or_default()
                .insert(mention.span.text.clone());
        }
    }

    let mut entity_categories: Vec<(u64, Category)> = Vec::new();
    let mut entity_freq: HashMap<EntityId, u64> = HashMap::new();
    for mut entity in store.entities()? {
        let Some(acc) = entity_accs.get(&entity.id) else {
            continue;
        };
        entity.stats = acc.finalize(&docs, n_docs);
        entity.alt_labels = raw_texts
            .get(&entity.id)
            .map(|texts| {
                texts
                    .iter()
                    .filter(|t| **t != entity.label)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        entity_freq.insert(entity.id, entity.stats.frequency);
        for category in acc.categories(&docs) {
            entity_categories.push((entity.id, category));
        }
        store.update_entity(&entity)?;
        report.entities += 1;
    }
    store.replace_categories(NodeKind::Entity, entity_categories)?;

    // Sum of frequencies over all canonical entities; the PMI baseline.
    let total_entity_freq: u64 = entity_freq.values().sum();

    // --- Co-occurrences ------------------------------------------------
    let mut cooccurrence_accs: HashMap<CooccurrenceId, Acc> = HashMap::new();
    for tuplet in &tuplets {
        if let Some(res) = tuplet.resolution {
            cooccurrence_accs
                .entry(res.cooccurrence_id)
                .or_default()
                .hit(tuplet.doc_id);
        }
    }

    let mut cooccurrence_categories: Vec<(u64, Category)> = Vec::new();
    for mut cooccurrence in store.cooccurrences()? {
        let Some(acc) = cooccurrence_accs.get(&cooccurrence.id) else {
            continue;
        };
        cooccurrence.stats = acc.finalize(&docs, n_docs);
        let freq_one = entity_freq
            .get(&cooccurrence.entity_one_id)
            .copied()
            .unwrap_or(1);
        let freq_two = entity_freq
            .get(&cooccurrence.entity_two_id)
            .copied()
            .unwrap_or(1);
        cooccurrence.pmi = Some(
            (cooccurrence.stats.frequency as f64).ln() + (total_entity_freq as f64).ln()
                - (freq_one as f64).ln()
                - (freq_two as f64).ln(),
        );
        for category in acc.categories(&docs) {
            cooccurrence_categories.push((cooccurrence.id, category));
        }
        store.update_cooccurrence(&cooccurrence)?;
        report.cooccurrences += 1;
    }
    store.replace_categories(NodeKind::Cooccurrence, cooccurrence_categories)?;

    // --- Predicates ----------------------------------------------------
    let mut predicate_accs: HashMap<PredicateId, Acc> = HashMap::new();
    let mut predicate_texts: HashMap<PredicateId, BTreeSet<String>> = HashMap::new();
    for triplet in &triplets {
        if let Some(res) = triplet.resolution {
            predicate_accs
                .entry(res.predicate_id)
                .or_default()
                .hit(triplet.doc_id);
            predicate_texts
                .entry(res.predicate_id)
                .or_default()
                .insert(triplet.predicate_span.text.clone());
        }
    }

    let mut predicate_categories: Vec<(u64, Category)> = Vec::new();
    let mut predicate_freq: HashMap<PredicateId, u64> = HashMap::new();
    for mut predicate in store.predicates()? {
        let Some(acc) = predicate_accs.get(&predicate.id) else {
            continue;
        };
        predicate.stats = acc.finalize(&docs, n_docs);
        predicate.alt_labels = predicate_texts
            .get(&predicate.id)
            .map(|texts| {
                texts
                    .iter()
                    .filter(|t| **t != predicate.label)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        predicate_freq.insert(predicate.id, predicate.stats.frequency);
        for category in acc.categories(&docs) {
            predicate_categories.push((predicate.id, category));
        }
        store.update_predicate(&predicate)?;
        report.predicates += 1;
    }
    store.replace_categories(NodeKind::Predicate, predicate_categories)?;

    // --- Relations -----------------------------------------------------
    let mut relation_accs: HashMap<RelationId, Acc> = HashMap::new();
    for triplet in &triplets {
        if let Some(res) = triplet.resolution {
            relation_accs
                .entry(res.relation_id)
                .or_default()
                .hit(triplet.doc_id);
        }
    }

    // Entity-pair frequency: relation frequencies summed over all predicates
    // between the same ordered (subject, object) pair.
    let relations = store.relations()?;
    let mut pair_freq: HashMap<(EntityId, EntityId), u64> = HashMap::new();
    for relation in &relations {
        if let Some(acc) = relation_accs.get(&relation.id) {
            *pair_freq
                .entry((relation.subject_id, relation.object_id))
                .or_default() += acc.frequency;
        }
    }
    // Corpus-wide baseline for significance: total predicate annotations.
    let total_predicate_freq: u64 = predicate_freq.values().sum();

    let mut relation_categories: Vec<(u64, Category)> = Vec::new();
    for mut relation in relations {
        let Some(acc) = relation_accs.get(&relation.id) else {
            continue;
        };
        relation.stats = acc.finalize(&docs, n_docs);
        let pair = pair_freq
            .get(&(relation.subject_id, relation.object_id))
            .copied()
            .unwrap_or(1);
        let predicate = predicate_freq.get(&relation.predicate_id).copied().unwrap_or(1);
        // log P(predicate | pair) - log P(predicate)
        //   = log freq(relation) - log freq(pair)
        //     - log freq(predicate) + log N
        relation.significance = Some(
            (relation.stats.frequency as f64).ln() - (pair as f64).ln() - (predicate as f64).ln()
                + (total_predicate_freq as f64).ln(),
        );
        for category in acc.categories(&docs) {
            relation_categories.push((relation.id, category));
        }
        store.update_relation(&relation)?;
        report.relations += 1;
    }
    store.replace_categories(NodeKind::Relation, relation_categories)?;

    info!(
        entities = report.entities,
        cooccurrences = report.cooccurrences,
        predicates = report.predicates,
        relations = report.relations,
        "recomputed node statistics"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::resolve_annotations;
    use crate::store::memory::MemStore;
    use chrono::NaiveDate;

    fn identity(labels: &[&str]) -> HashMap<String, String> {
        labels
            .iter()
            .map(|l| (l.to_string(), l.to_string()))
            .collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Two documents: "Alice met Bob." and "Alice met Carol." with triplets
    /// and pairwise tuplets, resolved with identity mappings.
    fn fixture() -> MemStore {
        let mut store = MemStore::new();
        let docs = store
            .insert_documents(vec![
                NewDocument {
                    text: "Alice met Bob.".into(),
                    timestamp: Some(date(2020, 1, 1)),
                    timestamp_ordinal: Some(1),
                    categories: vec![Category::new("source", "a")],
                    ..Default::default()
                },
                NewDocument {
                    text: "Alice met Carol.".into(),
                    timestamp: Some(date(2020, 6, 1)),
                    timestamp_ordinal: Some(2),
                    categories: vec![Category::new("source", "b")],
                    ..Default::default()
                },
            ])
            .unwrap();

        let m1 = store
            .insert_mentions(vec![
                NewMention {
                    doc_id: docs[0],
                    span: Span::new(0, 5, "Alice"),
                },
                NewMention {
                    doc_id: docs[0],
                    span: Span::new(10, 13, "Bob"),
                },
            ])
            .unwrap();
        let m2 = store
            .insert_mentions(vec![
                NewMention {
                    doc_id: docs[1],
                    span: Span::new(0, 5, "Alice"),
                },
                NewMention {
                    doc_id: docs[1],
                    span: Span::new(10, 15, "Carol"),
                },
            ])
            .unwrap();

        store
            .insert_triplets(vec![
                NewTriplet {
                    doc_id: docs[0],
                    subject_mention: m1[0],
                    predicate_span: Span::new(6, 9, "met"),
                    object_mention: m1[1],
                },
                NewTriplet {
                    doc_id: docs[1],
                    subject_mention: m2[0],
                    predicate_span: Span::new(6, 9, "met"),
                    object_mention: m2[1],
                },
            ])
            .unwrap();
        store
            .insert_tuplets(vec![
                NewTuplet {
                    doc_id: docs[0],
                    mention_one: m1[0],
                    mention_two: m1[1],
                },
                NewTuplet {
                    doc_id: docs[1],
                    mention_one: m2[0],
                    mention_two: m2[1],
                },
            ])
            .unwrap();

        resolve_annotations(
            &mut store,
            &identity(&["Alice", "Bob", "Carol"]),
            &identity(&["met"]),
        )
        .unwrap();
        store
    }

    fn entity_by_label(store: &MemStore, label: &str) -> Entity {
        store
            .entities()
            .unwrap()
            .into_iter()
            .find(|e| e.label == label)
            .expect("entity exists")
    }

    #[test]
    fn test_empty_corpus_is_a_noop() {
        let mut store = MemStore::new();
        let report = recompute_statistics(&mut store).unwrap();
        assert_eq!(report, AggregationReport::default());
    }

    #[test]
    fn test_entity_frequencies() {
        let mut store = fixture();
        let report = recompute_statistics(&mut store).unwrap();
        assert_eq!(report.entities, 3);

        let alice = entity_by_label(&store, "Alice");
        assert_eq!(alice.stats.frequency, 2);
        assert_eq!(alice.stats.doc_frequency, 2);

        let bob = entity_by_label(&store, "Bob");
        assert_eq!(bob.stats.frequency, 1);
        assert_eq!(bob.stats.doc_frequency, 1);

        let carol = entity_by_label(&store, "Carol");
        assert_eq!(carol.stats.frequency, 1);
    }

    #[test]
    fn test_adjusted_tf_idf_formula() {
        let mut store = fixture();
        recompute_statistics(&mut store).unwrap();

        // Alice: (2 - 1) * (2 / (2 + 1)) = 2/3
        let alice = entity_by_label(&store, "Alice");
        assert!((alice.stats.adjusted_tf_idf - 2.0 / 3.0).abs() < 1e-12);

        // Bob: (1 - 1) * anything = 0
        let bob = entity_by_label(&store, "Bob");
        assert_eq!(bob.stats.adjusted_tf_idf, 0.0);
    }

    #[test]
    fn test_temporal_bounds_calendar_and_ordinal() {
        let mut store = fixture();
        recompute_statistics(&mut store).unwrap();

        let alice = entity_by_label(&store, "Alice");
        assert_eq!(alice.stats.first_occurrence, Some(date(2020, 1, 1)));
        assert_eq!(alice.stats.last_occurrence, Some(date(2020, 6, 1)));
        assert_eq!(alice.stats.first_occurrence_ordinal, Some(1));
        assert_eq!(alice.stats.last_occurrence_ordinal, Some(2));

        let bob = entity_by_label(&store, "Bob");
        assert_eq!(bob.stats.first_occurrence, Some(date(2020, 1, 1)));
        assert_eq!(bob.stats.last_occurrence, Some(date(2020, 1, 1)));
    }

    #[test]
    fn test_categories_are_unioned_and_deduplicated() {
        let mut store = fixture();
        recompute_statistics(&mut store).unwrap();

        let alice = entity_by_label(&store, "Alice");
        let cats = store.categories_of(NodeKind::Entity, alice.id).unwrap();
        assert_eq!(
            cats,
            vec![Category::new("source", "a"), Category::new("source", "b")]
        );

        let bob = entity_by_label(&store, "Bob");
        let cats = store.categories_of(NodeKind::Entity, bob.id).unwrap();
        assert_eq!(cats, vec![Category::new("source", "a")]);
    }

    #[test]
    fn test_cooccurrence_stats_and_pmi() {
        let mut store = fixture();
        let report = recompute_statistics(&mut store).unwrap();
        assert_eq!(report.cooccurrences, 2);

        // N = 2 + 1 + 1 = 4; pair (Alice, Bob): ln 1 + ln 4 - ln 2 - ln 1 = ln 2
        let alice = entity_by_label(&store, "Alice");
        let bob = entity_by_label(&store, "Bob");
        let pair = ordered_pair(alice.id, bob.id);
        let cooc = store
            .cooccurrences()
            .unwrap()
            .into_iter()
            .find(|c| (c.entity_one_id, c.entity_two_id) == pair)
            .unwrap();
        assert_eq!(cooc.stats.frequency, 1);
        assert!((cooc.pmi.unwrap() - 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_relation_significance() {
        let mut store = fixture();
        let report = recompute_statistics(&mut store).unwrap();
        assert_eq!(report.predicates, 1);
        assert_eq!(report.relations, 2);

        // Each relation: freq 1, pair freq 1, predicate freq 2, N = 2
        // ln 1 - ln 1 - ln 2 + ln 2 = 0
        for relation in store.relations().unwrap() {
            assert!((relation.significance.unwrap() - 0.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_alt_labels_exclude_canonical_label() {
        let mut store = MemStore::new();
        let doc = store
            .insert_documents(vec![NewDocument::from_text("the cat sat")])
            .unwrap()[0];
        store
            .insert_mentions(vec![
                NewMention {
                    doc_id: doc,
                    span: Span::new(0, 7, "the cat"),
                },
                NewMention {
                    doc_id: doc,
                    span: Span::new(0, 7, "cat"),
                },
            ])
            .unwrap();
        let mapping: HashMap<String, String> = [
            ("the cat".to_string(), "cat".to_string()),
            ("cat".to_string(), "cat".to_string()),
        ]
        .into_iter()
        .collect();
        resolve_annotations(&mut store, &mapping, &HashMap::new()).unwrap();
        recompute_statistics(&mut store).unwrap();

        let cat = entity_by_label(&store, "cat");
        assert_eq!(cat.stats.frequency, 2);
        assert_eq!(cat.alt_labels, vec!["the cat".to_string()]);
    }

    #[test]
    fn test_node_without_annotations_is_untouched() {
        let mut store = fixture();
        let orphan = store.create_entity("Nobody").unwrap();
        recompute_statistics(&mut store).unwrap();

        let entity = store.entity(orphan).unwrap().unwrap();
        assert_eq!(entity.stats, NodeStats::default());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut store = fixture();
        recompute_statistics(&mut store).unwrap();
        let first: Vec<_> = store.entities().unwrap();
        recompute_statistics(&mut store).unwrap();
        let second: Vec<_> = store.entities().unwrap();
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.stats, b.stats);
        }
    }
}
