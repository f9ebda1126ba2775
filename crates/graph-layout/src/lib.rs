//! Flow-proportional graph layout
//!
//! This crate lays out weighted directed graphs as Sankey diagrams: nodes
//! are grouped in levels along the flow, and every node and edge band is as
//! thick as the flow going through it.
//!
//! # Layout Engines
//!
//! - [`SankeyLayout`]: layered layout with barycenter crossing reduction
//!
//! # Example
//!
//! ```
//! use graph_layout::{FlowEdge, FlowGraph, FlowNode, LayoutEngine, SankeyLayout};
//!
//! let graph = FlowGraph::new(
//!     vec![FlowNode::new("s"), FlowNode::new("a"), FlowNode::new("b")],
//!     vec![
//!         FlowEdge::weighted("s", "a", 5.0),
//!         FlowEdge::weighted("s", "b", 5.0),
//!     ],
//! );
//!
//! // Use the LayoutEngine trait:
//! let engine = SankeyLayout::default();
//! let result = engine.layout(&graph).unwrap();
//! assert_eq!(result.node("a").unwrap().length, result.node("b").unwrap().length);
//!
//! // Or inspect the levels alone
//! let levels = engine.compute_levels(&graph).unwrap();
//! assert_eq!(levels, vec![vec!["s"], vec!["a", "b"]]);
//! ```

mod engine;
mod geometry;

pub mod layered;

pub use engine::LayoutEngine;
pub use geometry::Point;

// Re-export layered layout types
pub use layered::{
    AttrValue, Attrs, EdgeGeometry, FlowEdge, FlowGraph, FlowNode, NodeGeometry, Padding,
    ParseRankDirError, PathCommand, RankDir, SankeyError, SankeyLayout, SankeyResult,
    DEFAULT_MIN_NODE_LENGTH,
};
