mod crossings;
mod input;
mod layers;
mod positions;
mod result;

use crate::{LayoutEngine, Point};
use derive_more::Display;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, warn};

use crossings::{count_crossings, order_levels};
use layers::{auto_levels, ordered_levels, Levels};
use positions::{assign_coordinates, assign_lengths, orient, route_edges, Frame};

pub use input::{AttrValue, Attrs, FlowEdge, FlowGraph, FlowNode};
pub use result::{EdgeGeometry, NodeGeometry, PathCommand, SankeyResult};

/// Errors that can occur during Sankey layout computation
#[derive(Debug, Error, PartialEq)]
pub enum SankeyError {
    /// Two input nodes share the same id
    #[error("node {0:?} is defined more than once")]
    DuplicateNode(String),

    /// An edge endpoint is not among the input nodes
    #[error("edge #{edge} references unknown node {node:?}")]
    UnknownNode { edge: usize, node: String },

    /// Automatic levelling could not reach these nodes from any node with
    /// the minimum in-degree
    #[error("nodes {0:?} cannot be reached from a minimum in-degree node")]
    UnreachableNodes(Vec<String>),

    /// `ordering` is configured but a node lacks that field
    #[error("node {node:?} has no ordering field {field:?}")]
    MissingOrderingField { node: String, field: String },
}

/// Direction of the flow, from the first level to the last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum RankDir {
    /// Top to bottom
    #[display("TB")]
    TopBottom,
    /// Bottom to top
    #[display("BT")]
    BottomTop,
    /// Left to right
    #[default]
    #[display("LR")]
    LeftRight,
    /// Right to left
    #[display("RL")]
    RightLeft,
}

impl RankDir {
    /// Whether levels are stacked vertically
    pub fn is_vertical(self) -> bool {
        matches!(self, RankDir::TopBottom | RankDir::BottomTop)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown rank direction {0:?}, expected TB, BT, LR or RL")]
pub struct ParseRankDirError(String);

impl FromStr for RankDir {
    type Err = ParseRankDirError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" => Ok(RankDir::TopBottom),
            "BT" => Ok(RankDir::BottomTop),
            "LR" => Ok(RankDir::LeftRight),
            "RL" => Ok(RankDir::RightLeft),
            _ => Err(ParseRankDirError(s.to_string())),
        }
    }
}

/// Blank space around the drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(padding: f64) -> Self {
        Self::new(padding, padding, padding, padding)
    }

    /// Padding seen with x and y swapped
    pub(crate) fn transpose(self) -> Self {
        Self::new(self.left, self.bottom, self.right, self.top)
    }

    /// Padding seen with the x axis mirrored
    pub(crate) fn mirror_x(self) -> Self {
        Self::new(self.top, self.left, self.bottom, self.right)
    }

    /// Padding seen with the y axis mirrored
    pub(crate) fn mirror_y(self) -> Self {
        Self::new(self.bottom, self.right, self.top, self.left)
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

impl From<f64> for Padding {
    fn from(padding: f64) -> Self {
        Self::uniform(padding)
    }
}

impl From<[f64; 4]> for Padding {
    fn from([top, right, bottom, left]: [f64; 4]) -> Self {
        Self::new(top, right, bottom, left)
    }
}

/// Node length used when a node carries no flow and `node_height` is unset
pub const DEFAULT_MIN_NODE_LENGTH: f64 = 10.0;

/// Configuration for the layered Sankey layout
///
/// Levels are laid out along the flow direction, node lengths across it are
/// proportional to the flow going through each node.
#[derive(Debug, Clone)]
pub struct SankeyLayout {
    /// Canvas width
    pub width: f64,

    /// Canvas height
    pub height: f64,

    /// When set, the drawing is translated so the canvas centre lands here
    pub center: Option<Point>,

    pub rankdir: RankDir,

    /// Node extent along the flow, computed from the canvas when unset
    pub node_width: Option<f64>,

    /// Length of nodes without any flow
    pub node_height: Option<f64>,

    /// Space between nodes of the same level
    pub nodesep: f64,

    /// Space between levels
    pub ranksep: f64,

    pub padding: Padding,

    /// Node field whose value decides the level, automatic levels when unset
    pub ordering: Option<String>,

    /// Edge field deciding the order of edges on a node face, by position
    /// of the other endpoint when unset
    pub edge_ordering: Option<String>,

    /// Edge field holding the flow, defaults to 1 when missing
    pub edge_weight_name: String,
}

impl Default for SankeyLayout {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
            center: None,
            rankdir: RankDir::LeftRight,
            node_width: None,
            node_height: None,
            nodesep: 10.0,
            ranksep: 50.0,
            padding: Padding::default(),
            ordering: None,
            edge_ordering: None,
            edge_weight_name: "weight".to_string(),
        }
    }
}

impl SankeyLayout {
    /// Create a new layout for a canvas of the given size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }
}

/// Working copy of an input node
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub id: String,
    pub in_edges: Vec<usize>,
    pub out_edges: Vec<usize>,
    pub in_weight: f64,
    pub out_weight: f64,
    pub ordering: Option<AttrValue>,
    pub level: usize,
    pub pos_idx: f64,
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub anchor_points: Vec<[f64; 2]>,
}

impl NodeRecord {
    fn new(id: String, ordering: Option<AttrValue>) -> Self {
        Self {
            id,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
            in_weight: 0.0,
            out_weight: 0.0,
            ordering,
            level: 0,
            pos_idx: 0.0,
            x: 0.0,
            y: 0.0,
            length: 0.0,
            anchor_points: Vec::new(),
        }
    }

    pub fn in_degree(&self) -> usize {
        self.in_edges.len()
    }
}

/// Working copy of an input edge
#[derive(Debug, Clone)]
pub(crate) struct EdgeRecord {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub ordering: Option<AttrValue>,
    pub size: f64,
    pub source_anchor: usize,
    pub target_anchor: usize,
    pub four_points: [Point; 4],
    pub control_points: [Point; 4],
}

/// Working graph rebuilt on every layout run
#[derive(Debug, Clone)]
pub(crate) struct Records {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl Records {
    /// Index the input and accumulate degrees and weights
    fn build(graph: &FlowGraph, config: &SankeyLayout) -> Result<Self, SankeyError> {
        let mut index = HashMap::new();
        let mut nodes = Vec::with_capacity(graph.nodes.len());

        for node in &graph.nodes {
            if index.insert(node.id.as_str(), nodes.len()).is_some() {
                return Err(SankeyError::DuplicateNode(node.id.clone()));
            }
            let ordering = config
                .ordering
                .as_ref()
                .and_then(|field| node.attrs.get(field).cloned());
            nodes.push(NodeRecord::new(node.id.clone(), ordering));
        }

        let mut edges = Vec::with_capacity(graph.edges.len());
        for (edge_index, edge) in graph.edges.iter().enumerate() {
            let lookup = |id: &str| {
                index.get(id).copied().ok_or_else(|| SankeyError::UnknownNode {
                    edge: edge_index,
                    node: id.to_string(),
                })
            };
            let source = lookup(&edge.source)?;
            let target = lookup(&edge.target)?;

            let weight = match edge
                .attrs
                .get(&config.edge_weight_name)
                .and_then(AttrValue::as_number)
            {
                Some(weight) if weight < 0.0 => {
                    warn!(edge = edge_index, weight, "negative flow clamped to 0");
                    0.0
                }
                Some(weight) => weight,
                None => 1.0,
            };

            nodes[source].out_edges.push(edge_index);
            nodes[source].out_weight += weight;
            nodes[target].in_edges.push(edge_index);
            nodes[target].in_weight += weight;

            edges.push(EdgeRecord {
                source,
                target,
                weight,
                ordering: config
                    .edge_ordering
                    .as_ref()
                    .and_then(|field| edge.attrs.get(field).cloned()),
                size: 0.0,
                source_anchor: 0,
                target_anchor: 0,
                four_points: [Point::zero(); 4],
                control_points: [Point::zero(); 4],
            });
        }

        Ok(Self { nodes, edges })
    }
}

impl SankeyLayout {
    /// Compute the levels of every node
    ///
    /// Exposed separately so callers can inspect the structure without
    /// computing any geometry.
    ///
    /// # Errors
    /// Returns an error if the input is inconsistent or if some nodes cannot
    /// be assigned a level
    pub fn compute_levels(&self, graph: &FlowGraph) -> Result<Vec<Vec<String>>, SankeyError> {
        let records = Records::build(graph, self)?;
        let levels = self.assign_levels(&records)?;
        Ok(levels.ids(&records))
    }

    fn assign_levels(&self, records: &Records) -> Result<Levels, SankeyError> {
        match &self.ordering {
            None => auto_levels(records),
            Some(field) => ordered_levels(records, field),
        }
    }

    /// Run the full layout pipeline
    ///
    /// The input is left untouched, the geometry of every node and edge is
    /// returned in input order.
    ///
    /// # Errors
    /// Returns an error if an edge references an unknown node, if node ids
    /// are duplicated, or if levels cannot be assigned
    pub fn execute(&self, graph: &FlowGraph) -> Result<SankeyResult, SankeyError> {
        let mut records = Records::build(graph, self)?;
        if records.nodes.is_empty() {
            return Ok(SankeyResult::default());
        }

        let mut levels = self.assign_levels(&records)?;
        for (level, nodes) in levels.nodes.iter().enumerate() {
            for &node in nodes {
                records.nodes[node].level = level;
            }
        }
        debug!(
            levels = levels.nodes.len(),
            max_nodes = levels.max_nodes,
            "assigned levels"
        );

        // Lay out in left-to-right space, other directions are derived from
        // it, so padding is mapped the inverse way
        let frame = match self.rankdir {
            RankDir::LeftRight => Frame::new(self.width, self.height, self.padding),
            RankDir::RightLeft => Frame::new(self.width, self.height, self.padding.mirror_x()),
            RankDir::TopBottom => {
                Frame::new(self.height, self.width, self.padding.transpose())
            }
            RankDir::BottomTop => Frame::new(
                self.height,
                self.width,
                self.padding.mirror_y().transpose(),
            ),
        };

        let sizes = assign_lengths(&mut records, &levels, &frame, self);
        debug!(node_width = sizes.node_width, ratio = sizes.ratio, "sized nodes");

        order_levels(&mut records, &mut levels);
        let crossings = count_crossings(&records, &levels);
        debug!(crossings, "ordered levels");

        assign_coordinates(&mut records, &levels, &sizes, &frame, self);
        route_edges(&mut records, &sizes);

        let mut result = SankeyResult::from_records(&records, &levels, &sizes, crossings);
        orient(&mut result, self.rankdir, &frame);

        if let Some(center) = self.center {
            result.translate(center.x - self.width / 2.0, center.y - self.height / 2.0);
        }

        Ok(result)
    }
}

impl<'a> LayoutEngine<&'a FlowGraph> for SankeyLayout {
    type Output = SankeyResult;
    type Error = SankeyError;

    fn layout(&self, graph: &'a FlowGraph) -> Result<Self::Output, Self::Error> {
        self.execute(graph)
    }
}
