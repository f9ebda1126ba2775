use derive_more::{Display, From};
use petgraph::visit::{EdgeRef, IntoEdgeReferences, IntoNodeIdentifiers};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Attribute value attached to a node or an edge
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum AttrValue {
    #[display("{_0}")]
    Number(f64),
    #[display("{_0}")]
    Text(String),
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Number(value.into())
    }
}

impl AttrValue {
    /// Numeric value, parsing text when possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) if n.is_finite() => Some(*n),
            AttrValue::Number(_) => None,
            AttrValue::Text(s) => s.trim().parse().ok().filter(|n: &f64| n.is_finite()),
        }
    }

    /// Numbers order numerically before text, text orders lexicographically
    pub(crate) fn order(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.to_string().cmp(&other.to_string()),
        }
    }
}

pub type Attrs = HashMap<String, AttrValue>;

/// A node of the flow graph
#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub attrs: Attrs,
}

impl FlowNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }
}

/// A flow between two nodes
///
/// Several edges may connect the same pair of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub source: String,
    pub target: String,
    pub attrs: Attrs,
}

impl FlowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            attrs: Attrs::new(),
        }
    }

    /// Edge carrying its flow in the default `weight` attribute
    pub fn weighted(source: impl Into<String>, target: impl Into<String>, weight: f64) -> Self {
        Self::new(source, target).with_attr("weight", weight)
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }
}

/// Nodes and edges handed to the layout
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn new(nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) -> Self {
        Self { nodes, edges }
    }

    /// Build from any petgraph graph with numeric edge weights
    ///
    /// Edge weights are stored under the `weight` attribute. `node_id` names
    /// each node; names must be unique.
    pub fn from_graph<G, F>(graph: G, mut node_id: F) -> Self
    where
        G: IntoNodeIdentifiers + IntoEdgeReferences,
        G::EdgeWeight: Copy + Into<f64>,
        F: FnMut(G::NodeId) -> String,
    {
        let nodes = graph
            .node_identifiers()
            .map(|node| FlowNode::new(node_id(node)))
            .collect();
        let edges = graph
            .edge_references()
            .map(|edge| {
                FlowEdge::weighted(
                    node_id(edge.source()),
                    node_id(edge.target()),
                    (*edge.weight()).into(),
                )
            })
            .collect();

        Self { nodes, edges }
    }
}
