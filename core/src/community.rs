//! Weighted community detection over the co-occurrence graph.
//!
//! Builds an undirected graph over the filtered entity set using
//! co-occurrence edges weighted by raw frequency or PMI, partitions it with
//! a caller-selected method, and scores each community by internal density,
//! average edge weight, and conductance.
//!
//! Partitioning cost is unbounded on large graphs; callers bound it by
//! pre-filtering the entity set (there is no internal timeout).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraphError, Result};
use crate::filter::GraphFilter;
use crate::query::eligible_entities;
use crate::store::GraphStore;
use crate::types::*;

/// Which co-occurrence field supplies edge weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightMeasure {
    /// Raw pair frequency.
    Frequency,
    /// Pointwise mutual information.
    Pmi,
}

/// Partitioning algorithm selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartitionMethod {
    /// Modularity-maximizing partitioning (Leiden).
    Modularity {
        /// Resolution parameter; larger values produce smaller communities.
        resolution: f64,
    },
    /// K-clique percolation: communities are unions of adjacent k-cliques
    /// (cliques sharing k-1 nodes). May produce overlapping communities.
    KClique {
        /// Minimum clique size.
        k: usize,
    },
    /// Plain connected components. Includes isolated entities as singleton
    /// communities.
    ConnectedComponents,
}

/// Configuration for community detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityConfig {
    /// Edge weight source. Default: PMI.
    pub weight_measure: WeightMeasure,
    /// Edges below this weight (on the selected measure) are dropped.
    /// Default: 2.0.
    pub min_weight: f64,
    /// Partitioning algorithm. Default: k-clique percolation with k = 4.
    pub method: PartitionMethod,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            weight_measure: WeightMeasure::Pmi,
            min_weight: 2.0,
            method: PartitionMethod::KClique { k: 4 },
        }
    }
}

/// Leiden refinement randomness parameter.
const LEIDEN_THETA: f64 = 0.3;
/// Leiden granularity parameter.
const LEIDEN_GAMMA: f64 = 0.05;

/// A community member reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityMember {
    /// Entity id.
    pub id: EntityId,
    /// Canonical entity label.
    pub label: String,
}

/// A detected community with its induced edge set and derived scores.
///
/// Never persisted; computed on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityView {
    /// Member entities, ordered by id.
    pub members: Vec<CommunityMember>,
    /// Internal edges as entity-id pairs (lower id first).
    pub edges: Vec<(EntityId, EntityId)>,
    /// Internal-edge count over the number of possible member pairs.
    pub density: f64,
    /// Mean weight of internal edges.
    pub avg_pmi: f64,
    /// Boundary edges over all edges touching the community:
    /// `boundary / (boundary + 2 × internal)`.
    pub conductance: f64,
    /// Composite score: `density × (1 − conductance)`.
    pub score: f64,
}

/// The weighted undirected graph community detection runs on.
struct WeightedGraph {
    nodes: Vec<EntityId>,
    adjacency: HashMap<EntityId, HashSet<EntityId>>,
    weights: HashMap<(EntityId, EntityId), f64>,
}

impl WeightedGraph {
    fn weight(&self, a: EntityId, b: EntityId) -> f64 {
        self.weights.get(&ordered_pair(a, b)).copied().unwrap_or(0.0)
    }

    fn neighbors(&self, id: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        self.adjacency.get(&id).into_iter().flatten().copied()
    }
}

/// Detect communities over the filtered co-occurrence graph.
///
/// Degenerate communities (size ≤ 1, or no possible internal edges) report
/// zero density and conductance rather than failing.
pub fn detect_communities<S: GraphStore>(
    store: &S,
    filter: &GraphFilter,
    config: &CommunityConfig,
) -> Result<Vec<CommunityView>> {
    filter.validate()?;

    let entities = eligible_entities(store, filter)?;
    let graph = build_graph(store, filter, config, &entities)?;
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.weights.len(),
        "running community detection"
    );

    let partitions: Vec<Vec<EntityId>> = match &config.method {
        PartitionMethod::Modularity { resolution } => modularity_partitions(&graph, *resolution)?,
        PartitionMethod::KClique { k } => k_clique_partitions(&graph, *k),
        PartitionMethod::ConnectedComponents => connected_components(&graph),
    };

    let mut views: Vec<CommunityView> = partitions
        .into_iter()
        .map(|members| score_community(&graph, &entities, members))
        .collect();
    views.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then_with(|| a.members.first().map(|m| m.id).cmp(&b.members.first().map(|m| m.id)))
    });
    Ok(views)
}

fn build_graph<S: GraphStore>(
    store: &S,
    filter: &GraphFilter,
    config: &CommunityConfig,
    entities: &HashMap<EntityId, Entity>,
) -> Result<WeightedGraph> {
    let categories = store.category_table(NodeKind::Cooccurrence)?;
    let mut adjacency: HashMap<EntityId, HashSet<EntityId>> = HashMap::new();
    let mut weights: HashMap<(EntityId, EntityId), f64> = HashMap::new();

    for id in entities.keys() {
        adjacency.entry(*id).or_default();
    }

    for cooc in store.cooccurrences()? {
        if cooc.entity_one_id == cooc.entity_two_id {
            continue; // self-loop
        }
        if !entities.contains_key(&cooc.entity_one_id)
            || !entities.contains_key(&cooc.entity_two_id)
        {
            continue;
        }
        let cats = categories.get(&cooc.id).map(Vec::as_slice).unwrap_or(&[]);
        if !filter.matches_edge(&cooc.stats, cats) {
            continue;
        }
        let weight = match config.weight_measure {
            WeightMeasure::Frequency => cooc.stats.frequency as f64,
            WeightMeasure::Pmi => cooc.pmi.unwrap_or(0.0),
        };
        if weight < config.min_weight {
            continue;
        }
        let pair = (cooc.entity_one_id, cooc.entity_two_id);
        weights.insert(pair, weight);
        adjacency.entry(pair.0).or_default().insert(pair.1);
        adjacency.entry(pair.1).or_default().insert(pair.0);
    }

    let mut nodes: Vec<EntityId> = adjacency.keys().copied().collect();
    nodes.sort_unstable();
    Ok(WeightedGraph {
        nodes,
        adjacency,
        weights,
    })
}

/// Modularity-maximizing partitioning via graphrs Leiden.
///
/// Only edge-connected nodes participate; isolated entities are not assigned
/// to any community by this method.
fn modularity_partitions(graph: &WeightedGraph, resolution: f64) -> Result<Vec<Vec<EntityId>>> {
    use graphrs::algorithms::community::leiden::{leiden, QualityFunction};
    use graphrs::{Edge as GEdge, EdgeDedupeStrategy, Graph, GraphSpecs};

    if graph.weights.is_empty() {
        return Ok(Vec::new());
    }

    let edges: Vec<_> = graph
        .weights
        .iter()
        .map(|(&(a, b), &w)| GEdge::with_weight(a, b, w))
        .collect();

    let mut specs = GraphSpecs::undirected_create_missing();
    specs.edge_dedupe_strategy = EdgeDedupeStrategy::KeepLast;
    let g = Graph::<u64, ()>::new_from_nodes_and_edges(vec![], edges, specs)
        .map_err(|e| GraphError::Backend(anyhow::anyhow!("graph construction failed: {}", e.message)))?;

    let raw: Vec<HashSet<u64>> = leiden(
        &g,
        true,
        QualityFunction::Modularity,
        Some(resolution),
        Some(LEIDEN_THETA),
        Some(LEIDEN_GAMMA),
    )
    .map_err(|e| GraphError::Backend(anyhow::anyhow!("leiden failed: {}", e.message)))?;

    Ok(raw
        .into_iter()
        .map(|members| {
            let mut ids: Vec<EntityId> = members.into_iter().collect();
            ids.sort_unstable();
            ids
        })
        .collect())
}

/// Maximal cliques via Bron–Kerbosch with pivoting.
fn maximal_cliques(graph: &WeightedGraph) -> Vec<Vec<EntityId>> {
    fn extend(
        graph: &WeightedGraph,
        r: &mut Vec<EntityId>,
        mut p: HashSet<EntityId>,
        mut x: HashSet<EntityId>,
        out: &mut Vec<Vec<EntityId>>,
    ) {
        if p.is_empty() && x.is_empty() {
            let mut clique = r.clone();
            clique.sort_unstable();
            out.push(clique);
            return;
        }
        // Pivot on the vertex with the most candidates among its neighbors.
        let pivot = p
            .iter()
            .chain(x.iter())
            .copied()
            .max_by_key(|v| graph.neighbors(*v).filter(|n| p.contains(n)).count());
        let pivot_neighbors: HashSet<EntityId> = pivot
            .map(|v| graph.neighbors(v).collect())
            .unwrap_or_default();

        let candidates: Vec<EntityId> = p
            .iter()
            .copied()
            .filter(|v| !pivot_neighbors.contains(v))
            .collect();
        for v in candidates {
            let neighbors: HashSet<EntityId> = graph.neighbors(v).collect();
            r.push(v);
            extend(
                graph,
                r,
                p.intersection(&neighbors).copied().collect(),
                x.intersection(&neighbors).copied().collect(),
                out,
            );
            r.pop();
            p.remove(&v);
            x.insert(v);
        }
    }

    let mut out = Vec::new();
    let p: HashSet<EntityId> = graph
        .nodes
        .iter()
        .copied()
        .filter(|n| graph.adjacency.get(n).is_some_and(|adj| !adj.is_empty()))
        .collect();
    extend(graph, &mut Vec::new(), p, HashSet::new(), &mut out);
    out
}

/// K-clique percolation: cliques of size ≥ k are merged whenever they share
/// k − 1 nodes; each merged chain forms one community.
fn k_clique_partitions(graph: &WeightedGraph, k: usize) -> Vec<Vec<EntityId>> {
    let k = k.max(2);
    let cliques: Vec<Vec<EntityId>> = maximal_cliques(graph)
        .into_iter()
        .filter(|c| c.len() >= k)
        .collect();
    if cliques.is_empty() {
        return Vec::new();
    }

    // Union-find over cliques.
    let mut parent: Vec<usize> = (0..cliques.len()).collect();
    fn find(parent: &mut Vec<usize>, i: usize) -> usize {
        if parent[i] != i {
            let next = parent[i];
            let root = find(parent, next);
            parent[i] = root;
        }
        parent[i]
    }

    let sets: Vec<HashSet<EntityId>> = cliques
        .iter()
        .map(|c| c.iter().copied().collect())
        .collect();
    for i in 0..cliques.len() {
        for j in (i + 1)..cliques.len() {
            let shared = sets[i].intersection(&sets[j]).count();
            if shared >= k - 1 {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }

    let mut merged: HashMap<usize, HashSet<EntityId>> = HashMap::new();
    for i in 0..cliques.len() {
        let root = find(&mut parent, i);
        merged.entry(root).or_default().extend(sets[i].iter().copied());
    }
    merged
        .into_values()
        .map(|members| {
            let mut ids: Vec<EntityId> = members.into_iter().collect();
            ids.sort_unstable();
            ids
        })
        .collect()
}

/// Connected components over the adjacency sets. Isolated nodes become
/// singleton communities.
fn connected_components(graph: &WeightedGraph) -> Vec<Vec<EntityId>> {
    let mut visited: HashSet<EntityId> = HashSet::new();
    let mut components = Vec::new();

    for &start in &graph.nodes {
        if !visited.insert(start) {
            continue;
        }
        let mut component = vec![start];
        let mut queue = vec![start];
        while let Some(current) = queue.pop() {
            for neighbor in graph.neighbors(current) {
                if visited.insert(neighbor) {
                    component.push(neighbor);
                    queue.push(neighbor);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}

fn score_community(
    graph: &WeightedGraph,
    entities: &HashMap<EntityId, Entity>,
    members: Vec<EntityId>,
) -> CommunityView {
    let member_set: HashSet<EntityId> = members.iter().copied().collect();

    let mut internal_edges: Vec<(EntityId, EntityId)> = Vec::new();
    let mut weight_sum = 0.0;
    for (i, &a) in members.iter().enumerate() {
        for &b in &members[i + 1..] {
            if graph.adjacency.get(&a).is_some_and(|adj| adj.contains(&b)) {
                internal_edges.push(ordered_pair(a, b));
                weight_sum += graph.weight(a, b);
            }
        }
    }
    internal_edges.sort_unstable();

    let internal = internal_edges.len();
    let size = members.len();
    let possible = size * size.saturating_sub(1) / 2;
    let density = if possible > 0 {
        internal as f64 / possible as f64
    } else {
        0.0
    };
    let avg_pmi = if internal > 0 {
        weight_sum / internal as f64
    } else {
        0.0
    };

    let boundary: usize = members
        .iter()
        .map(|&m| graph.neighbors(m).filter(|n| !member_set.contains(n)).count())
        .sum();
    let touching = boundary + 2 * internal;
    let conductance = if touching > 0 {
        boundary as f64 / touching as f64
    } else {
        0.0
    };

    CommunityView {
        members: members
            .iter()
            .map(|&id| CommunityMember {
                id,
                label: entities.get(&id).map(|e| e.label.clone()).unwrap_or_default(),
            })
            .collect(),
        edges: internal_edges,
        density,
        avg_pmi,
        conductance,
        score: density * (1.0 - conductance),
    }
}
