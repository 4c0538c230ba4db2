//! Graph filtering.
//!
//! [`GraphFilter`] is a conjunction of per-node-type predicates: numeric
//! ranges on frequency and document frequency, calendar/ordinal date ranges,
//! category membership, and an entity-id blacklist. Values within one
//! category combine with OR; distinct categories combine with AND.
//!
//! Date ranges use overlap semantics: a node passes when its occurrence
//! window intersects the filter window (`last_occurrence >= earliest` and
//! `first_occurrence <= latest`). A node with no recorded bound fails a set
//! bound, mirroring SQL comparison-with-NULL behavior in the stores this
//! model was lifted from.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::types::{Category, Entity, EntityId, NodeStats};

/// A conjunction of filter conditions for graph queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFilter {
    /// Maximum number of nodes to return.
    pub limit_nodes: Option<usize>,
    /// Maximum number of edges to return.
    pub limit_edges: Option<usize>,
    /// Minimum node (entity) frequency.
    pub minimum_node_frequency: Option<u64>,
    /// Maximum node (entity) frequency.
    pub maximum_node_frequency: Option<u64>,
    /// Minimum node document frequency.
    pub minimum_node_doc_frequency: Option<u64>,
    /// Maximum node document frequency.
    pub maximum_node_doc_frequency: Option<u64>,
    /// Minimum edge (relation/co-occurrence) frequency.
    pub minimum_edge_frequency: Option<u64>,
    /// Maximum edge frequency.
    pub maximum_edge_frequency: Option<u64>,
    /// Minimum edge document frequency.
    pub minimum_edge_doc_frequency: Option<u64>,
    /// Maximum edge document frequency.
    pub maximum_edge_doc_frequency: Option<u64>,
    /// Earliest calendar date of the filter window.
    pub earliest_date: Option<NaiveDate>,
    /// Latest calendar date of the filter window.
    pub latest_date: Option<NaiveDate>,
    /// Earliest ordinal time of the filter window.
    pub earliest_ordinal: Option<i64>,
    /// Latest ordinal time of the filter window.
    pub latest_ordinal: Option<i64>,
    /// Entities excluded regardless of other conditions.
    pub blacklisted_entity_ids: HashSet<EntityId>,
    /// Category conditions: within one name values combine with OR, across
    /// names with AND.
    pub categories: BTreeMap<String, Vec<String>>,
}

/// Summary of a store's value ranges, for initializing filter controls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataBounds {
    /// Lowest entity frequency present.
    pub minimum_node_frequency: u64,
    /// Highest entity frequency present.
    pub maximum_node_frequency: u64,
    /// Lowest edge frequency present (for the queried connection type).
    pub minimum_edge_frequency: u64,
    /// Highest edge frequency present.
    pub maximum_edge_frequency: u64,
    /// Available document categories and their values.
    pub categories: BTreeMap<String, Vec<String>>,
    /// Earliest document calendar timestamp.
    pub earliest_date: Option<NaiveDate>,
    /// Latest document calendar timestamp.
    pub latest_date: Option<NaiveDate>,
    /// Earliest document ordinal time.
    pub earliest_ordinal: Option<i64>,
    /// Latest document ordinal time.
    pub latest_ordinal: Option<i64>,
}

fn check_range<T: PartialOrd + std::fmt::Display>(
    name: &str,
    min: &Option<T>,
    max: &Option<T>,
) -> Result<()> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(GraphError::InvalidFilter(format!(
                "{name} range is inverted ({lo} > {hi})"
            )));
        }
    }
    Ok(())
}

impl GraphFilter {
    /// Check the filter for malformed or inconsistent combinations.
    pub fn validate(&self) -> Result<()> {
        check_range(
            "node frequency",
            &self.minimum_node_frequency,
            &self.maximum_node_frequency,
        )?;
        check_range(
            "node doc frequency",
            &self.minimum_node_doc_frequency,
            &self.maximum_node_doc_frequency,
        )?;
        check_range(
            "edge frequency",
            &self.minimum_edge_frequency,
            &self.maximum_edge_frequency,
        )?;
        check_range(
            "edge doc frequency",
            &self.minimum_edge_doc_frequency,
            &self.maximum_edge_doc_frequency,
        )?;
        check_range("date", &self.earliest_date, &self.latest_date)?;
        check_range("ordinal time", &self.earliest_ordinal, &self.latest_ordinal)?;
        for (name, values) in &self.categories {
            if values.is_empty() {
                return Err(GraphError::InvalidFilter(format!(
                    "category {name:?} has no values"
                )));
            }
        }
        Ok(())
    }

    /// Whether a node/edge occurrence window intersects the filter window.
    fn window_matches(&self, stats: &NodeStats) -> bool {
        if let Some(earliest) = self.earliest_date {
            match stats.last_occurrence {
                Some(last) if last >= earliest => {}
                _ => return false,
            }
        }
        if let Some(latest) = self.latest_date {
            match stats.first_occurrence {
                Some(first) if first <= latest => {}
                _ => return false,
            }
        }
        if let Some(earliest) = self.earliest_ordinal {
            match stats.last_occurrence_ordinal {
                Some(last) if last >= earliest => {}
                _ => return false,
            }
        }
        if let Some(latest) = self.latest_ordinal {
            match stats.first_occurrence_ordinal {
                Some(first) if first <= latest => {}
                _ => return false,
            }
        }
        true
    }

    /// Whether a category set satisfies the AND-of-ORs conditions.
    fn categories_match(&self, categories: &[Category]) -> bool {
        self.categories.iter().all(|(name, values)| {
            categories
                .iter()
                .any(|c| c.name == *name && values.contains(&c.value))
        })
    }

    /// Whether an entity passes the node-side conditions.
    pub fn matches_entity(&self, entity: &Entity, categories: &[Category]) -> bool {
        if self.blacklisted_entity_ids.contains(&entity.id) {
            return false;
        }
        if let Some(min) = self.minimum_node_frequency {
            if entity.stats.frequency < min {
                return false;
            }
        }
        if let Some(max) = self.maximum_node_frequency {
            if entity.stats.frequency > max {
                return false;
            }
        }
        if let Some(min) = self.minimum_node_doc_frequency {
            if entity.stats.doc_frequency < min {
                return false;
            }
        }
        if let Some(max) = self.maximum_node_doc_frequency {
            if entity.stats.doc_frequency > max {
                return false;
            }
        }
        self.window_matches(&entity.stats) && self.categories_match(categories)
    }

    /// Whether an edge (relation or co-occurrence) passes the edge-side
    /// conditions.
    pub fn matches_edge(&self, stats: &NodeStats, categories: &[Category]) -> bool {
        if let Some(min) = self.minimum_edge_frequency {
            if stats.frequency < min {
                return false;
            }
        }
        if let Some(max) = self.maximum_edge_frequency {
            if stats.frequency > max {
                return false;
            }
        }
        if let Some(min) = self.minimum_edge_doc_frequency {
            if stats.doc_frequency < min {
                return false;
            }
        }
        if let Some(max) = self.maximum_edge_doc_frequency {
            if stats.doc_frequency > max {
                return false;
            }
        }
        self.window_matches(stats) && self.categories_match(categories)
    }
}
