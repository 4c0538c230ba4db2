//! # Narragraph Core
//!
//! Core engine for turning extracted textual mentions into a deduplicated,
//! statistically-scored knowledge graph.
//!
//! This crate defines the shared data model, the [`GraphStore`](store::GraphStore)
//! storage boundary (with an in-memory implementation), and the three engines
//! that operate on a populated store:
//!
//! - [`resolution`] — canonical identity assignment: label → entity/predicate,
//!   entity pair → co-occurrence, (subject, predicate, object) → relation,
//!   with at-most-one-row-per-key guarantees.
//! - [`aggregation`] — full recompute of frequency, document frequency,
//!   adjusted term weight, temporal bounds, categories, PMI, and relation
//!   significance from the resolved annotation set.
//! - [`query`] and [`community`] — filtered/top-k/focus-expanded graph views,
//!   relation edge grouping, and weighted community detection.
//!
//! The pipeline is batch-oriented and single-writer: one fitting run performs
//! write → resolve → aggregate as strictly ordered phases. Once those phases
//! complete, the graph is read-only from the query engine's perspective and
//! safe for concurrent readers.

pub mod aggregation;
pub mod community;
pub mod error;
pub mod filter;
pub mod query;
pub mod resolution;
pub mod store;
pub mod types;

pub use aggregation::{recompute_statistics, AggregationReport};
pub use community::{
    detect_communities, CommunityConfig, CommunityMember, CommunityView, PartitionMethod,
    WeightMeasure,
};
pub use error::{GraphError, Result};
pub use filter::{DataBounds, GraphFilter};
pub use query::{
    data_bounds, expand_from_focus, get_graph, ConnectionType, EdgeMember, GraphEdge, GraphNode,
    GraphView,
};
pub use resolution::{resolve_annotations, ResolutionSummary};
pub use store::{memory::MemStore, GraphStore};
pub use types::*;
