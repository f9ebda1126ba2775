use super::layers::Levels;
use super::positions::Sizes;
use super::Records;
use crate::Point;
use std::fmt;

/// Geometry of a laid out node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGeometry {
    pub id: String,

    /// Index of the node's level, 0 being the first along the flow
    pub level: usize,

    /// Position within the level after crossing reduction
    pub order: usize,

    /// Top-left corner
    pub x: f64,
    pub y: f64,

    pub width: f64,
    pub height: f64,

    /// Extent across the flow, proportional to the flow through the node
    pub length: f64,

    /// Where edge bands attach, as fractions of the node box: `[0, 0]` is
    /// the top-left corner and `[1, 1]` the bottom-right one
    pub anchor_points: Vec<[f64; 2]>,
}

/// Geometry of a laid out edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeGeometry {
    pub source: String,
    pub target: String,
    pub weight: f64,

    /// Band thickness
    pub size: f64,

    /// Index into the source node's anchor points
    pub source_anchor: usize,

    /// Index into the target node's anchor points
    pub target_anchor: usize,

    /// Band corners: source top, source bottom, target top, target bottom
    pub four_points: [Point; 4],

    /// Bezier control points for the two ribbon sides
    pub control_points: [Point; 4],
}

/// One step of a ribbon outline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    CurveTo(Point, Point, Point),
    LineTo(Point),
    Close,
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathCommand::MoveTo(p) => write!(f, "M {} {}", p.x, p.y),
            PathCommand::CurveTo(c1, c2, p) => write!(
                f,
                "C {} {} {} {} {} {}",
                c1.x, c1.y, c2.x, c2.y, p.x, p.y
            ),
            PathCommand::LineTo(p) => write!(f, "L {} {}", p.x, p.y),
            PathCommand::Close => write!(f, "Z"),
        }
    }
}

impl EdgeGeometry {
    /// Closed outline of the band: one curve from source top to target top,
    /// down the target face, and back along the bottom curve
    pub fn ribbon_path(&self) -> [PathCommand; 5] {
        let [p0, p1, p2, p3] = self.four_points;
        let [c0, c1, c2, c3] = self.control_points;
        [
            PathCommand::MoveTo(p0),
            PathCommand::CurveTo(c0, c1, p2),
            PathCommand::LineTo(p3),
            PathCommand::CurveTo(c3, c2, p1),
            PathCommand::Close,
        ]
    }

    /// The ribbon outline as SVG path data
    pub fn svg_path(&self) -> String {
        self.ribbon_path()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output of a Sankey layout run
///
/// Nodes and edges are listed in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SankeyResult {
    pub nodes: Vec<NodeGeometry>,
    pub edges: Vec<EdgeGeometry>,

    /// Node ids per level, in their final order
    pub levels: Vec<Vec<String>>,

    /// Node length per unit of flow
    pub ratio: f64,

    /// Crossings left between adjacent levels
    pub crossings: usize,
}

impl SankeyResult {
    pub(crate) fn from_records(
        records: &Records,
        levels: &Levels,
        sizes: &Sizes,
        crossings: usize,
    ) -> Self {
        let mut order = vec![0; records.nodes.len()];
        for level in &levels.nodes {
            for (position, &node) in level.iter().enumerate() {
                order[node] = position;
            }
        }

        let nodes = records
            .nodes
            .iter()
            .zip(order)
            .map(|(node, order)| NodeGeometry {
                id: node.id.clone(),
                level: node.level,
                order,
                x: node.x,
                y: node.y,
                width: sizes.node_width,
                height: node.length,
                length: node.length,
                anchor_points: node.anchor_points.clone(),
            })
            .collect();

        let edges = records
            .edges
            .iter()
            .map(|edge| EdgeGeometry {
                source: records.nodes[edge.source].id.clone(),
                target: records.nodes[edge.target].id.clone(),
                weight: edge.weight,
                size: edge.size,
                source_anchor: edge.source_anchor,
                target_anchor: edge.target_anchor,
                four_points: edge.four_points,
                control_points: edge.control_points,
            })
            .collect();

        Self {
            nodes,
            edges,
            levels: levels.ids(records),
            ratio: sizes.ratio,
            crossings,
        }
    }

    /// Look up a node by id
    pub fn node(&self, id: &str) -> Option<&NodeGeometry> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Edges leaving the given node
    pub fn edges_from<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a EdgeGeometry> + 'a {
        self.edges.iter().filter(move |edge| edge.source == id)
    }

    /// Move the whole drawing
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let shift = |p: &mut Point| *p = p.offset(dx, dy);
        for node in &mut self.nodes {
            node.x += dx;
            node.y += dy;
        }
        for edge in &mut self.edges {
            edge.four_points.iter_mut().for_each(shift);
            edge.control_points.iter_mut().for_each(shift);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn edge() -> EdgeGeometry {
        EdgeGeometry {
            source: "s".to_string(),
            target: "t".to_string(),
            weight: 1.0,
            size: 2.0,
            source_anchor: 0,
            target_anchor: 0,
            four_points: [
                Point::new(10.0, 0.0),
                Point::new(10.0, 2.0),
                Point::new(30.0, 4.0),
                Point::new(30.0, 6.0),
            ],
            control_points: [
                Point::new(20.0, 0.0),
                Point::new(20.0, 4.0),
                Point::new(20.0, 2.0),
                Point::new(20.0, 6.0),
            ],
        }
    }

    #[test]
    fn test_ribbon_path_order() {
        let path = edge().ribbon_path();
        assert_eq!(path[0], PathCommand::MoveTo(Point::new(10.0, 0.0)));
        assert_eq!(
            path[1],
            PathCommand::CurveTo(
                Point::new(20.0, 0.0),
                Point::new(20.0, 4.0),
                Point::new(30.0, 4.0)
            )
        );
        assert_eq!(path[2], PathCommand::LineTo(Point::new(30.0, 6.0)));
        assert_eq!(
            path[3],
            PathCommand::CurveTo(
                Point::new(20.0, 6.0),
                Point::new(20.0, 2.0),
                Point::new(10.0, 2.0)
            )
        );
        assert_eq!(path[4], PathCommand::Close);
    }

    #[test]
    fn test_svg_path() {
        assert_eq!(
            edge().svg_path(),
            "M 10 0 C 20 0 20 4 30 4 L 30 6 C 20 6 20 2 10 2 Z"
        );
    }

    #[test]
    fn test_translate_moves_points() {
        let mut result = SankeyResult {
            edges: vec![edge()],
            ..Default::default()
        };
        result.translate(1.0, -1.0);
        assert_eq!(result.edges[0].four_points[0], Point::new(11.0, -1.0));
        assert_eq!(result.edges[0].control_points[3], Point::new(21.0, 5.0));
    }
}
