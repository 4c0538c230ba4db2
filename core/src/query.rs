//! Graph views over an aggregated store.
//!
//! Serves filtered top-k retrieval, focus-set expansion, and relation edge
//! grouping, plus the single/batch record getters and the data-bounds
//! summary exposed to presentation layers.
//!
//! Relation and co-occurrence graphs share the selection code through the
//! [`Connection`] tagged variant, which exposes endpoints and statistics
//! regardless of the concrete edge table.
//!
//! Retrieval policy for record getters: single-item lookups surface
//! [`GraphError::NotFound`]; batch lookups by an explicit id list are
//! best-effort and silently omit ids with no match.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::filter::{DataBounds, GraphFilter};
use crate::store::GraphStore;
use crate::types::*;

/// Which edge table a graph view is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionType {
    /// Directed subject→object relation edges.
    Relation,
    /// Undirected entity-pair co-occurrence edges.
    Cooccurrence,
}

/// An edge row of either table, behind a common interface.
#[derive(Debug, Clone)]
enum Connection {
    Relation(Relation),
    Cooccurrence(Cooccurrence),
}

impl Connection {
    fn endpoints(&self) -> (EntityId, EntityId) {
        match self {
            Connection::Relation(r) => (r.subject_id, r.object_id),
            Connection::Cooccurrence(c) => (c.entity_one_id, c.entity_two_id),
        }
    }

    fn stats(&self) -> &NodeStats {
        match self {
            Connection::Relation(r) => &r.stats,
            Connection::Cooccurrence(c) => &c.stats,
        }
    }

    fn id(&self) -> u64 {
        match self {
            Connection::Relation(r) => r.id,
            Connection::Cooccurrence(c) => c.id,
        }
    }
}

/// A node of a graph view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    /// Entity id.
    pub id: EntityId,
    /// Canonical entity label.
    pub label: String,
    /// Entity frequency.
    pub frequency: u64,
    /// Whether this node was part of the query's focus set.
    pub is_focus: bool,
}

/// One member relation of a grouped edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeMember {
    /// Relation id.
    pub relation_id: RelationId,
    /// Predicate label of the relation.
    pub label: String,
    /// Relation frequency.
    pub frequency: u64,
}

/// An edge of a graph view.
///
/// For relation views, multiple predicates connecting the same ordered
/// entity pair are grouped into one edge whose label joins the top members;
/// for co-occurrence views each edge is one row and carries no label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Stable edge identifier (`"from->to"` for grouped relations, the row
    /// id for co-occurrences).
    pub id: String,
    /// Source entity id (subject side for relations).
    pub from: EntityId,
    /// Target entity id (object side for relations).
    pub to: EntityId,
    /// Display label; `None` for co-occurrence edges.
    pub label: Option<String>,
    /// Sum of member frequencies.
    pub total_weight: f64,
    /// Member relations, sorted by descending frequency. Empty for
    /// co-occurrence edges.
    pub group: Vec<EdgeMember>,
}

/// A filtered graph view: nodes plus connecting edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphView {
    /// Selected nodes.
    pub nodes: Vec<GraphNode>,
    /// Selected edges.
    pub edges: Vec<GraphEdge>,
}

/// How many member labels a grouped edge shows before eliding the rest.
const GROUP_LABEL_MEMBERS: usize = 3;

fn load_connections<S: GraphStore>(
    store: &S,
    connection: ConnectionType,
    filter: &GraphFilter,
) -> Result<Vec<Connection>> {
    let (kind, rows): (NodeKind, Vec<Connection>) = match connection {
        ConnectionType::Relation => (
            NodeKind::Relation,
            store.relations()?.into_iter().map(Connection::Relation).collect(),
        ),
        ConnectionType::Cooccurrence => (
            NodeKind::Cooccurrence,
            store
                .cooccurrences()?
                .into_iter()
                .map(Connection::Cooccurrence)
                .collect(),
        ),
    };
    let categories = store.category_table(kind)?;
    Ok(rows
        .into_iter()
        .filter(|conn| {
            let cats = categories.get(&conn.id()).map(Vec::as_slice).unwrap_or(&[]);
            filter.matches_edge(conn.stats(), cats)
        })
        .collect())
}

/// Entities passing the node-side filter conditions, keyed by id.
pub(crate) fn eligible_entities<S: GraphStore>(
    store: &S,
    filter: &GraphFilter,
) -> Result<HashMap<EntityId, Entity>> {
    let categories = store.category_table(NodeKind::Entity)?;
    Ok(store
        .entities()?
        .into_iter()
        .filter(|entity| {
            let cats = categories.get(&entity.id).map(Vec::as_slice).unwrap_or(&[]);
            filter.matches_entity(entity, cats)
        })
        .map(|entity| (entity.id, entity))
        .collect())
}

/// Group connections into view edges.
///
/// Relations sharing an ordered `(subject, object)` pair collapse into one
/// edge labeled with the top members by frequency (an ellipsis marker is
/// appended when more exist). Co-occurrences map one row to one edge.
fn build_edges<S: GraphStore>(store: &S, connections: &[Connection]) -> Result<Vec<GraphEdge>> {
    let mut relation_groups: HashMap<(EntityId, EntityId), Vec<&Relation>> = HashMap::new();
    let mut edges = Vec::new();

    for conn in connections {
        match conn {
            Connection::Relation(relation) => {
                relation_groups
                    .entry((relation.subject_id, relation.object_id))
                    .or_default()
                    .push(relation);
            }
            Connection::Cooccurrence(cooc) => {
                edges.push(GraphEdge {
                    id: cooc.id.to_string(),
                    from: cooc.entity_one_id,
                    to: cooc.entity_two_id,
                    label: None,
                    total_weight: cooc.stats.frequency as f64,
                    group: Vec::new(),
                });
            }
        }
    }

    if !relation_groups.is_empty() {
        let predicates: HashMap<PredicateId, String> = store
            .predicates()?
            .into_iter()
            .map(|p| (p.id, p.label))
            .collect();

        for ((from, to), mut group) in relation_groups {
            group.sort_by(|a, b| b.stats.frequency.cmp(&a.stats.frequency));

            let members: Vec<EdgeMember> = group
                .iter()
                .map(|r| EdgeMember {
                    relation_id: r.id,
                    label: predicates
                        .get(&r.predicate_id)
                        .cloned()
                        .unwrap_or_default(),
                    frequency: r.stats.frequency,
                })
                .collect();

            let mut labels: Vec<&str> = members
                .iter()
                .take(GROUP_LABEL_MEMBERS)
                .map(|m| m.label.as_str())
                .collect();
            if members.len() > GROUP_LABEL_MEMBERS {
                labels.push("...");
            }

            edges.push(GraphEdge {
                id: format!("{from}->{to}"),
                from,
                to,
                label: Some(labels.join(", ")),
                total_weight: group.iter().map(|r| r.stats.frequency as f64).sum(),
                group: members,
            });
        }
    }

    Ok(edges)
}

/// Nodes of a view: selected entities that appear on at least one edge.
fn connected_nodes(
    selected: &HashMap<EntityId, Entity>,
    edges: &[GraphEdge],
    focus: &HashSet<EntityId>,
) -> Vec<GraphNode> {
    let connected: HashSet<EntityId> = edges
        .iter()
        .flat_map(|e| [e.from, e.to])
        .collect();
    let mut nodes: Vec<GraphNode> = selected
        .values()
        .filter(|entity| connected.contains(&entity.id))
        .map(|entity| GraphNode {
            id: entity.id,
            label: entity.label.clone(),
            frequency: entity.stats.frequency,
            is_focus: focus.contains(&entity.id),
        })
        .collect();
    nodes.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.id.cmp(&b.id)));
    nodes
}

/// Top-k retrieval: the highest-frequency entities satisfying the node
/// filters, connected by the heaviest qualifying edges among them.
pub fn get_graph<S: GraphStore>(
    store: &S,
    connection: ConnectionType,
    filter: &GraphFilter,
) -> Result<GraphView> {
    filter.validate()?;

    let eligible = eligible_entities(store, filter)?;
    let mut ranked: Vec<&Entity> = eligible.values().collect();
    ranked.sort_by(|a, b| {
        b.stats
            .frequency
            .cmp(&a.stats.frequency)
            .then(a.id.cmp(&b.id))
    });
    if let Some(limit) = filter.limit_nodes {
        ranked.truncate(limit);
    }
    let selected: HashMap<EntityId, Entity> =
        ranked.into_iter().map(|e| (e.id, e.clone())).collect();

    let connections: Vec<Connection> = load_connections(store, connection, filter)?
        .into_iter()
        .filter(|conn| {
            let (a, b) = conn.endpoints();
            selected.contains_key(&a) && selected.contains_key(&b)
        })
        .collect();

    let mut edges = build_edges(store, &connections)?;
    edges.sort_by(|a, b| {
        b.total_weight
            .partial_cmp(&a.total_weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    if let Some(limit) = filter.limit_edges {
        edges.truncate(limit);
    }

    let nodes = connected_nodes(&selected, &edges, &HashSet::new());
    Ok(GraphView { nodes, edges })
}

/// Focus expansion: every qualifying edge touching a focus node, neighbor
/// nodes filling the remaining node budget by descending frequency, edges
/// ranked focus-endpoints-first.
pub fn expand_from_focus<S: GraphStore>(
    store: &S,
    focus_ids: &[EntityId],
    connection: ConnectionType,
    filter: &GraphFilter,
) -> Result<GraphView> {
    filter.validate()?;

    let focus: HashSet<EntityId> = focus_ids.iter().copied().collect();
    let eligible = eligible_entities(store, filter)?;

    // Edges touching the focus set whose endpoints both pass entity filters.
    let connections: Vec<Connection> = load_connections(store, connection, filter)?
        .into_iter()
        .filter(|conn| {
            let (a, b) = conn.endpoints();
            (focus.contains(&a) || focus.contains(&b))
                && eligible.contains_key(&a)
                && eligible.contains_key(&b)
        })
        .collect();

    // Reached entities, focus nodes first, then neighbors by frequency.
    let reached: HashSet<EntityId> = connections
        .iter()
        .flat_map(|c| {
            let (a, b) = c.endpoints();
            [a, b]
        })
        .collect();
    let mut ranked: Vec<&Entity> = reached
        .iter()
        .filter_map(|id| eligible.get(id))
        .collect();
    ranked.sort_by(|a, b| {
        focus
            .contains(&b.id)
            .cmp(&focus.contains(&a.id))
            .then(b.stats.frequency.cmp(&a.stats.frequency))
            .then(a.id.cmp(&b.id))
    });
    if let Some(limit) = filter.limit_nodes {
        ranked.truncate(limit);
    }
    let selected: HashMap<EntityId, Entity> =
        ranked.into_iter().map(|e| (e.id, e.clone())).collect();

    // Drop edges that lost an endpoint to the node budget, then rank by
    // focus-endpoint count and weight.
    let connections: Vec<Connection> = connections
        .into_iter()
        .filter(|conn| {
            let (a, b) = conn.endpoints();
            selected.contains_key(&a) && selected.contains_key(&b)
        })
        .collect();
    let mut edges = build_edges(store, &connections)?;
    let focus_count =
        |e: &GraphEdge| focus.contains(&e.from) as u8 + focus.contains(&e.to) as u8;
    edges.sort_by(|a, b| {
        focus_count(b)
            .cmp(&focus_count(a))
            .then(
                b.total_weight
                    .partial_cmp(&a.total_weight)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
            .then_with(|| a.id.cmp(&b.id))
    });
    if let Some(limit) = filter.limit_edges {
        edges.truncate(limit);
    }

    let nodes = connected_nodes(&selected, &edges, &focus);
    Ok(GraphView { nodes, edges })
}

/// Value ranges of the store, for initializing filter controls.
pub fn data_bounds<S: GraphStore>(store: &S, connection: ConnectionType) -> Result<DataBounds> {
    let mut bounds = DataBounds::default();

    let node_freqs: Vec<u64> = store
        .entities()?
        .iter()
        .map(|e| e.stats.frequency)
        .filter(|f| *f > 0)
        .collect();
    bounds.minimum_node_frequency = node_freqs.iter().min().copied().unwrap_or(0);
    bounds.maximum_node_frequency = node_freqs.iter().max().copied().unwrap_or(0);

    let edge_freqs: Vec<u64> = match connection {
        ConnectionType::Relation => store
            .relations()?
            .iter()
            .map(|r| r.stats.frequency)
            .filter(|f| *f > 0)
            .collect(),
        ConnectionType::Cooccurrence => store
            .cooccurrences()?
            .iter()
            .map(|c| c.stats.frequency)
            .filter(|f| *f > 0)
            .collect(),
    };
    bounds.minimum_edge_frequency = edge_freqs.iter().min().copied().unwrap_or(0);
    bounds.maximum_edge_frequency = edge_freqs.iter().max().copied().unwrap_or(0);

    for doc in store.documents()? {
        for category in &doc.categories {
            let values = bounds.categories.entry(category.name.clone()).or_default();
            if !values.contains(&category.value) {
                values.push(category.value.clone());
            }
        }
        if let Some(ts) = doc.timestamp {
            bounds.earliest_date = Some(bounds.earliest_date.map_or(ts, |e| e.min(ts)));
            bounds.latest_date = Some(bounds.latest_date.map_or(ts, |l| l.max(ts)));
        }
        if let Some(ord) = doc.timestamp_ordinal {
            bounds.earliest_ordinal = Some(bounds.earliest_ordinal.map_or(ord, |e| e.min(ord)));
            bounds.latest_ordinal = Some(bounds.latest_ordinal.map_or(ord, |l| l.max(ord)));
        }
    }
    for values in bounds.categories.values_mut() {
        values.sort();
    }

    Ok(bounds)
}

// ---------------------------------------------------------------------------
// Record getters
// ---------------------------------------------------------------------------

macro_rules! getters {
    ($single:ident, $multi:ident, $method:ident, $ty:ty, $id_ty:ty, $kind:literal) => {
        /// Fetch a single row; absent ids surface [`GraphError::NotFound`].
        pub fn $single<S: GraphStore>(store: &S, id: $id_ty) -> Result<$ty> {
            store.$method(id)?.ok_or(GraphError::NotFound { kind: $kind, id })
        }

        /// Fetch rows by explicit ids. Best-effort: ids with no match are
        /// silently omitted rather than failing the batch.
        pub fn $multi<S: GraphStore>(store: &S, ids: &[$id_ty]) -> Result<Vec<$ty>> {
            let mut rows = Vec::with_capacity(ids.len());
            for &id in ids {
                if let Some(row) = store.$method(id)? {
                    rows.push(row);
                }
            }
            Ok(rows)
        }
    };
}

getters!(get_document, get_documents, document, Document, DocId, "document");
getters!(get_entity, get_entities, entity, Entity, EntityId, "entity");
getters!(get_predicate, get_predicates, predicate, Predicate, PredicateId, "predicate");
getters!(get_relation, get_relations, relation, Relation, RelationId, "relation");
getters!(
    get_cooccurrence,
    get_cooccurrences,
    cooccurrence,
    Cooccurrence,
    CooccurrenceId,
    "cooccurrence"
);
getters!(get_mention, get_mentions, mention, Mention, MentionId, "mention");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::recompute_statistics;
    use crate::resolution::resolve_annotations;
    use crate::store::memory::MemStore;

    fn identity(labels: &[&str]) -> HashMap<String, String> {
        labels
            .iter()
            .map(|l| (l.to_string(), l.to_string()))
            .collect()
    }

    /// Fixture: four entities, relations and co-occurrences among them.
    ///
    /// doc1 "Alice met Bob", doc2 "Alice met Carol", doc3 "Alice met Bob"
    /// again plus "Dave" alone with Bob.
    fn fixture() -> MemStore {
        let mut store = MemStore::new();
        let texts = [
            ("Alice", "met", "Bob"),
            ("Alice", "met", "Carol"),
            ("Alice", "met", "Bob"),
            ("Dave", "greeted", "Bob"),
        ];
        for (subject, predicate, object) in texts {
            let doc = store
                .insert_documents(vec![NewDocument::from_text(format!(
                    "{subject} {predicate} {object}."
                ))])
                .unwrap()[0];
            let s_end = subject.len();
            let p_end = s_end + 1 + predicate.len();
            let mentions = store
                .insert_mentions(vec![
                    NewMention {
                        doc_id: doc,
                        span: Span::new(0, s_end, subject),
                    },
                    NewMention {
                        doc_id: doc,
                        span: Span::new(p_end + 1, p_end + 1 + object.len(), object),
                    },
                ])
                .unwrap();
            store
                .insert_triplets(vec![NewTriplet {
                    doc_id: doc,
                    subject_mention: mentions[0],
                    predicate_span: Span::new(s_end + 1, p_end, predicate),
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
        }
        resolve_annotations(
            &mut store,
            &identity(&["Alice", "Bob", "Carol", "Dave"]),
            &identity(&["met", "greeted"]),
        )
        .unwrap();
        recompute_statistics(&mut store).unwrap();
        store
    }

    fn entity_id(store: &MemStore, label: &str) -> EntityId {
        store
            .entities()
            .unwrap()
            .into_iter()
            .find(|e| e.label == label)
            .unwrap()
            .id
    }

    #[test]
    fn test_get_graph_returns_connected_top_nodes() {
        let store = fixture();
        let view = get_graph(&store, ConnectionType::Relation, &GraphFilter::default()).unwrap();

        // Alice->Bob (freq 2), Alice->Carol, Dave->Bob
        assert_eq!(view.edges.len(), 3);
        assert_eq!(view.nodes.len(), 4);
        // Heaviest edge first.
        assert_eq!(view.edges[0].total_weight, 2.0);
        assert_eq!(view.edges[0].label.as_deref(), Some("met"));
    }

    #[test]
    fn test_get_graph_node_limit_keeps_top_frequency() {
        let store = fixture();
        let filter = GraphFilter {
            limit_nodes: Some(2),
            ..Default::default()
        };
        let view = get_graph(&store, ConnectionType::Relation, &filter).unwrap();

        // Top-2 entities are Alice (3 mentions... counted per doc role) and Bob.
        let labels: HashSet<String> = view.nodes.iter().map(|n| n.label.clone()).collect();
        assert!(labels.contains("Alice"));
        assert!(labels.contains("Bob"));
        // Only the Alice->Bob edge survives among the selected pair.
        assert_eq!(view.edges.len(), 1);
        assert_eq!(view.edges[0].total_weight, 2.0);
    }

    #[test]
    fn test_get_graph_edge_limit_truncates_by_weight() {
        let store = fixture();
        let filter = GraphFilter {
            limit_edges: Some(1),
            ..Default::default()
        };
        let view = get_graph(&store, ConnectionType::Relation, &filter).unwrap();
        assert_eq!(view.edges.len(), 1);
        assert_eq!(view.edges[0].total_weight, 2.0);
    }

    #[test]
    fn test_cooccurrence_edges_are_unlabeled() {
        let store = fixture();
        let view =
            get_graph(&store, ConnectionType::Cooccurrence, &GraphFilter::default()).unwrap();
        assert_eq!(view.edges.len(), 3);
        assert!(view.edges.iter().all(|e| e.label.is_none()));
        assert!(view.edges.iter().all(|e| e.group.is_empty()));
    }

    #[test]
    fn test_node_count_monotonicity_under_tightening() {
        let store = fixture();
        let mut previous = usize::MAX;
        for min_freq in 1..=4 {
            let filter = GraphFilter {
                minimum_node_frequency: Some(min_freq),
                ..Default::default()
            };
            let view = get_graph(&store, ConnectionType::Relation, &filter).unwrap();
            assert!(view.nodes.len() <= previous);
            previous = view.nodes.len();
        }
    }

    #[test]
    fn test_invalid_filter_is_rejected() {
        let store = fixture();
        let filter = GraphFilter {
            minimum_node_frequency: Some(5),
            maximum_node_frequency: Some(1),
            ..Default::default()
        };
        let err = get_graph(&store, ConnectionType::Relation, &filter).unwrap_err();
        assert!(matches!(err, GraphError::InvalidFilter(_)));
    }

    #[test]
    fn test_blacklisted_entity_disappears() {
        let store = fixture();
        let dave = entity_id(&store, "Dave");
        let filter = GraphFilter {
            blacklisted_entity_ids: HashSet::from([dave]),
            ..Default::default()
        };
        let view = get_graph(&store, ConnectionType::Relation, &filter).unwrap();
        assert!(view.nodes.iter().all(|n| n.id != dave));
        assert!(view.edges.iter().all(|e| e.from != dave && e.to != dave));
    }

    #[test]
    fn test_edge_grouping_joins_top_labels() {
        let mut store = fixture();
        // Add three more predicates between Alice and Bob so the group label
        // elides beyond the top three.
        let alice = entity_id(&store, "Alice");
        let bob = entity_id(&store, "Bob");
        for label in ["called", "saw", "knew"] {
            let doc = store
                .insert_documents(vec![NewDocument::from_text(format!("Alice {label} Bob."))])
                .unwrap()[0];
            let mentions = store
                .insert_mentions(vec![
                    NewMention {
                        doc_id: doc,
                        span: Span::new(0, 5, "Alice"),
                    },
                    NewMention {
                        doc_id: doc,
                        span: Span::new(6 + label.len() + 1, 6 + label.len() + 4, "Bob"),
                    },
                ])
                .unwrap();
            store
                .insert_triplets(vec![NewTriplet {
                    doc_id: doc,
                    subject_mention: mentions[0],
                    predicate_span: Span::new(6, 6 + label.len(), label),
                    object_mention: mentions[1],
                }])
                .unwrap();
        }
        resolve_annotations(
            &mut store,
            &identity(&["Alice", "Bob", "Carol", "Dave"]),
            &identity(&["met", "greeted", "called", "saw", "knew"]),
        )
        .unwrap();
        recompute_statistics(&mut store).unwrap();

        let view = get_graph(&store, ConnectionType::Relation, &GraphFilter::default()).unwrap();
        let edge = view
            .edges
            .iter()
            .find(|e| e.from == alice && e.to == bob)
            .unwrap();
        assert_eq!(edge.group.len(), 4);
        assert_eq!(edge.total_weight, 5.0);
        let label = edge.label.as_deref().unwrap();
        assert!(label.starts_with("met"), "highest-frequency member leads: {label}");
        assert!(label.ends_with("..."), "elision marker expected: {label}");
        assert_eq!(label.matches(", ").count(), 3);
    }

    #[test]
    fn test_expand_from_focus_marks_focus_nodes() {
        let store = fixture();
        let alice = entity_id(&store, "Alice");
        let view = expand_from_focus(
            &store,
            &[alice],
            ConnectionType::Relation,
            &GraphFilter::default(),
        )
        .unwrap();

        // Alice touches Bob and Carol, not Dave.
        let labels: HashSet<String> = view.nodes.iter().map(|n| n.label.clone()).collect();
        assert_eq!(
            labels,
            HashSet::from(["Alice".into(), "Bob".into(), "Carol".into()])
        );
        for node in &view.nodes {
            assert_eq!(node.is_focus, node.id == alice);
        }
    }

    #[test]
    fn test_expand_from_focus_edge_ranking_prefers_focus_pairs() {
        let store = fixture();
        let alice = entity_id(&store, "Alice");
        let bob = entity_id(&store, "Bob");
        let view = expand_from_focus(
            &store,
            &[alice, bob],
            ConnectionType::Relation,
            &GraphFilter::default(),
        )
        .unwrap();

        // The Alice->Bob edge has two focus endpoints and ranks first even
        // though Dave->Bob has one.
        assert_eq!(view.edges[0].from, alice);
        assert_eq!(view.edges[0].to, bob);
    }

    #[test]
    fn test_expand_from_focus_node_budget_keeps_focus_first() {
        let store = fixture();
        let alice = entity_id(&store, "Alice");
        let view = expand_from_focus(
            &store,
            &[alice],
            ConnectionType::Relation,
            &GraphFilter {
                limit_nodes: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(view.nodes.iter().any(|n| n.id == alice));
        assert!(view.nodes.len() <= 2);
    }

    #[test]
    fn test_data_bounds() {
        let store = fixture();
        let bounds = data_bounds(&store, ConnectionType::Relation).unwrap();
        assert_eq!(bounds.minimum_node_frequency, 1);
        assert_eq!(bounds.maximum_node_frequency, 3);
        assert_eq!(bounds.minimum_edge_frequency, 1);
        assert_eq!(bounds.maximum_edge_frequency, 2);

        let cooc_bounds = data_bounds(&store, ConnectionType::Cooccurrence).unwrap();
        assert_eq!(cooc_bounds.maximum_edge_frequency, 2);
    }

    #[test]
    fn test_single_get_not_found() {
        let store = MemStore::new();
        let err = get_entity(&store, 99).unwrap_err();
        assert!(matches!(
            err,
            GraphError::NotFound {
                kind: "entity",
                id: 99
            }
        ));
    }

    #[test]
    fn test_batch_get_omits_missing_ids() {
        let store = fixture();
        let alice = entity_id(&store, "Alice");
        let rows = get_entities(&store, &[alice, 9999]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Alice");
    }
}
