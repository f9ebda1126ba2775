use super::layers::Levels;
use super::result::SankeyResult;
use super::{EdgeRecord, Padding, RankDir, Records, SankeyLayout, DEFAULT_MIN_NODE_LENGTH};
use crate::Point;
use std::cmp::Ordering;

/// Canvas seen in left-to-right space
///
/// For vertical rank directions width and height are swapped, so `width`
/// always runs along the flow.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub width: f64,
    pub height: f64,
    pub padding: Padding,
}

impl Frame {
    pub fn new(width: f64, height: f64, padding: Padding) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    fn width_budget(&self) -> f64 {
        self.width - self.padding.left - self.padding.right
    }

    fn height_budget(&self) -> f64 {
        self.height - self.padding.top - self.padding.bottom
    }
}

/// Sizes shared by every node
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sizes {
    /// Node extent along the flow
    pub node_width: f64,

    /// Length per unit of flow
    pub ratio: f64,
}

/// Compute the shared node width, the flow ratio and every node length
///
/// The ratio is chosen so the first level, spaced by `nodesep`, fills the
/// available height when it is the fullest level.
pub(crate) fn assign_lengths(
    records: &mut Records,
    levels: &Levels,
    frame: &Frame,
    config: &SankeyLayout,
) -> Sizes {
    let level_count = levels.nodes.len().max(1) as f64;
    let node_width = config.node_width.unwrap_or_else(|| {
        ((frame.width_budget() - (level_count - 1.0) * config.ranksep) / level_count).max(0.0)
    });

    let first_level_weight: f64 = levels
        .nodes
        .first()
        .into_iter()
        .flatten()
        .map(|&n| records.nodes[n].out_weight)
        .sum();
    let gaps = levels.max_nodes.saturating_sub(1) as f64 * config.nodesep;
    let ratio = if first_level_weight > 0.0 {
        (frame.height_budget() - gaps).max(0.0) / first_level_weight
    } else {
        0.0
    };

    let min_length = config.node_height.unwrap_or(DEFAULT_MIN_NODE_LENGTH);
    for node in &mut records.nodes {
        let weight = if node.level == 0 || node.in_degree() == 0 {
            node.out_weight
        } else {
            node.in_weight
        };
        let length = weight * ratio;
        node.length = if length > 0.0 { length } else { min_length };
    }

    Sizes { node_width, ratio }
}

/// Place levels side by side and stack the nodes of each level
pub(crate) fn assign_coordinates(
    records: &mut Records,
    levels: &Levels,
    sizes: &Sizes,
    frame: &Frame,
    config: &SankeyLayout,
) {
    let mut x = frame.padding.left;
    for level in &levels.nodes {
        let mut y = frame.padding.top;
        for &node in level {
            let node = &mut records.nodes[node];
            node.x = x;
            node.y = y;
            y += node.length + config.nodesep;
        }
        x += sizes.node_width + config.ranksep;
    }
}

/// Order edges leaving or entering a node face
///
/// Edges with an ordering value come first, sorted by it. Ties are broken by
/// the position of the other endpoint, then by input order.
fn face_order<F>(records: &Records, edges: &[usize], other: F) -> Vec<usize>
where
    F: Fn(&EdgeRecord) -> usize,
{
    let mut sorted = edges.to_vec();
    sorted.sort_by(|&a, &b| {
        let (ea, eb) = (&records.edges[a], &records.edges[b]);
        let by_field = match (&ea.ordering, &eb.ordering) {
            (Some(va), Some(vb)) => va.order(vb),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_field
            .then_with(|| {
                records.nodes[other(ea)]
                    .y
                    .total_cmp(&records.nodes[other(eb)].y)
            })
            .then(a.cmp(&b))
    });
    sorted
}

/// Slice node faces into flow bands and derive edge geometry
///
/// Every band produces one anchor point on its node, `[1, f]` on the
/// outgoing face and `[0, f]` on the incoming one, `f` being the band
/// centre relative to the node length.
pub(crate) fn route_edges(records: &mut Records, sizes: &Sizes) {
    for edge in &mut records.edges {
        edge.size = edge.weight * sizes.ratio;
    }

    for node in 0..records.nodes.len() {
        let outgoing = face_order(records, &records.nodes[node].out_edges, |e| e.target);
        let incoming = face_order(records, &records.nodes[node].in_edges, |e| e.source);

        let (x, y, length) = {
            let n = &records.nodes[node];
            (n.x, n.y, n.length)
        };

        for (side, face) in [(1.0, outgoing), (0.0, incoming)] {
            let face_x = x + side * sizes.node_width;
            let mut offset = 0.0;
            for edge in face {
                let size = records.edges[edge].size;
                let top = Point::new(face_x, y + offset);
                let bottom = Point::new(face_x, y + offset + size);
                let fraction = if length > 0.0 {
                    (offset + size / 2.0) / length
                } else {
                    0.5
                };

                let anchors = &mut records.nodes[node].anchor_points;
                anchors.push([side, fraction]);
                let anchor = anchors.len() - 1;

                let record = &mut records.edges[edge];
                if side > 0.0 {
                    record.four_points[0] = top;
                    record.four_points[1] = bottom;
                    record.source_anchor = anchor;
                } else {
                    record.four_points[2] = top;
                    record.four_points[3] = bottom;
                    record.target_anchor = anchor;
                }
                offset += size;
            }
        }
    }

    for edge in &mut records.edges {
        let [source_top, source_bottom, target_top, target_bottom] = edge.four_points;
        let mid = (source_top.x + target_top.x) / 2.0;
        edge.control_points = [
            Point::new(mid, source_top.y),
            Point::new(mid, target_top.y),
            Point::new(mid, source_bottom.y),
            Point::new(mid, target_bottom.y),
        ];
    }
}

/// Turn a left-to-right result into the requested rank direction
///
/// `frame` is the left-to-right frame the result was computed in.
pub(crate) fn orient(result: &mut SankeyResult, rankdir: RankDir, frame: &Frame) {
    match rankdir {
        RankDir::LeftRight => {}
        RankDir::RightLeft => mirror_x(result, frame.width),
        RankDir::TopBottom => transpose(result),
        RankDir::BottomTop => {
            transpose(result);
            mirror_y(result, frame.width);
        }
    }
}

fn mirror_x(result: &mut SankeyResult, width: f64) {
    let flip = |p: &mut Point| p.x = width - p.x;
    for node in &mut result.nodes {
        node.x = width - node.x - node.width;
        for anchor in &mut node.anchor_points {
            anchor[0] = 1.0 - anchor[0];
        }
    }
    for edge in &mut result.edges {
        edge.four_points.iter_mut().for_each(flip);
        edge.control_points.iter_mut().for_each(flip);
    }
}

fn mirror_y(result: &mut SankeyResult, height: f64) {
    let flip = |p: &mut Point| p.y = height - p.y;
    for node in &mut result.nodes {
        node.y = height - node.y - node.height;
        for anchor in &mut node.anchor_points {
            anchor[1] = 1.0 - anchor[1];
        }
    }
    for edge in &mut result.edges {
        edge.four_points.iter_mut().for_each(flip);
        edge.control_points.iter_mut().for_each(flip);
    }
}

fn transpose(result: &mut SankeyResult) {
    let swap = |p: &mut Point| *p = p.transpose();
    for node in &mut result.nodes {
        std::mem::swap(&mut node.x, &mut node.y);
        std::mem::swap(&mut node.width, &mut node.height);
        for anchor in &mut node.anchor_points {
            anchor.swap(0, 1);
        }
    }
    for edge in &mut result.edges {
        edge.four_points.iter_mut().for_each(swap);
        edge.control_points.iter_mut().for_each(swap);
    }
}
