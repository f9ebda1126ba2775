use super::layers::Levels;
use super::Records;
use tracing::trace;

/// Order nodes within each level with one barycenter sweep
///
/// The forward pass moves every node to the mean position of its
/// out-neighbors, the backward pass to the mean position of its
/// in-neighbors. Levels are then sorted by the resulting positions, and
/// positions are replaced by the index within the level.
pub(crate) fn order_levels(records: &mut Records, levels: &mut Levels) {
    for level in &levels.nodes {
        for (index, &node) in level.iter().enumerate() {
            records.nodes[node].pos_idx = index as f64;
        }
    }

    for level in &levels.nodes {
        for &node in level {
            let targets: Vec<usize> = records.nodes[node]
                .out_edges
                .iter()
                .map(|&e| records.edges[e].target)
                .collect();
            if let Some(mean) = mean_position(records, &targets) {
                records.nodes[node].pos_idx = mean;
            }
        }
    }

    for level in levels.nodes.iter().rev() {
        for &node in level {
            let sources: Vec<usize> = records.nodes[node]
                .in_edges
                .iter()
                .map(|&e| records.edges[e].source)
                .collect();
            if let Some(mean) = mean_position(records, &sources) {
                records.nodes[node].pos_idx = mean;
            }
        }
    }

    for level in &mut levels.nodes {
        level.sort_by(|&a, &b| records.nodes[a].pos_idx.total_cmp(&records.nodes[b].pos_idx));
        for (index, &node) in level.iter().enumerate() {
            records.nodes[node].pos_idx = index as f64;
        }
        trace!(?level, "sorted level");
    }
}

fn mean_position(records: &Records, nodes: &[usize]) -> Option<f64> {
    if nodes.is_empty() {
        return None;
    }
    let sum: f64 = nodes.iter().map(|&n| records.nodes[n].pos_idx).sum();
    Some(sum / nodes.len() as f64)
}

/// Count the crossings between edges joining adjacent levels
///
/// Edges skipping levels or going backwards are ignored. Edges sharing an
/// endpoint never cross.
pub(crate) fn count_crossings(records: &Records, levels: &Levels) -> usize {
    let mut crossings = 0;

    for upper_level in 0..levels.nodes.len().saturating_sub(1) {
        let lower_level = upper_level + 1;

        // (upper position, lower position) of every edge between the two levels
        let spans: Vec<(f64, f64)> = records
            .edges
            .iter()
            .filter(|edge| {
                records.nodes[edge.source].level == upper_level
                    && records.nodes[edge.target].level == lower_level
            })
            .map(|edge| {
                (
                    records.nodes[edge.source].pos_idx,
                    records.nodes[edge.target].pos_idx,
                )
            })
            .collect();

        for (i, &(upper1, lower1)) in spans.iter().enumerate() {
            for &(upper2, lower2) in spans.iter().skip(i + 1) {
                if (upper1 < upper2 && lower1 > lower2) || (upper1 > upper2 && lower1 < lower2) {
                    crossings += 1;
                }
            }
        }
    }

    crossings
}

#[cfg(test)]
mod tests {
    use super::super::layers::auto_levels;
    use super::*;
    use crate::layered::{FlowEdge, FlowGraph, FlowNode, SankeyLayout};
    use test_log::test;

    fn prepare(nodes: &[&str], edges: &[(&str, &str)]) -> (Records, Levels) {
        let graph = FlowGraph::new(
            nodes.iter().map(|&id| FlowNode::new(id)).collect(),
            edges
                .iter()
                .map(|&(s, t)| FlowEdge::weighted(s, t, 1.0))
                .collect(),
        );
        let mut records = Records::build(&graph, &SankeyLayout::default()).unwrap();
        let levels = auto_levels(&records).unwrap();
        for (level, nodes) in levels.nodes.iter().enumerate() {
            for &node in nodes {
                records.nodes[node].level = level;
            }
        }
        (records, levels)
    }

    #[test]
    fn test_breadth_first_levels_do_not_cross() {
        let (mut records, levels) = prepare(&["a", "b", "y", "x"], &[("a", "x"), ("b", "y")]);
        assert_eq!(levels.ids(&records)[1], vec!["x", "y"]);

        for level in &levels.nodes {
            for (index, &node) in level.iter().enumerate() {
                records.nodes[node].pos_idx = index as f64;
            }
        }
        assert_eq!(count_crossings(&records, &levels), 0);
    }

    #[test]
    fn test_untangles_crossed_pair() {
        let (mut records, mut levels) = prepare(&["a", "b", "x", "y"], &[("a", "y"), ("b", "x")]);
        // swap the second level so both edges cross
        levels.nodes[1].reverse();
        assert_eq!(levels.ids(&records)[1], vec!["x", "y"]);
        for level in &levels.nodes {
            for (index, &node) in level.iter().enumerate() {
                records.nodes[node].pos_idx = index as f64;
            }
        }
        assert_eq!(count_crossings(&records, &levels), 1);

        order_levels(&mut records, &mut levels);
        assert_eq!(count_crossings(&records, &levels), 0);
    }

    #[test]
    fn test_positions_are_discrete_after_ordering() {
        let (mut records, mut levels) = prepare(
            &["s", "a", "b", "c"],
            &[("s", "a"), ("s", "b"), ("s", "c")],
        );
        order_levels(&mut records, &mut levels);
        let mut positions: Vec<f64> = levels.nodes[1]
            .iter()
            .map(|&n| records.nodes[n].pos_idx)
            .collect();
        positions.sort_by(f64::total_cmp);
        assert_eq!(positions, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_shared_endpoint_is_not_a_crossing() {
        let (mut records, levels) = prepare(&["a", "b", "x"], &[("a", "x"), ("b", "x")]);
        for level in &levels.nodes {
            for (index, &node) in level.iter().enumerate() {
                records.nodes[node].pos_idx = index as f64;
            }
        }
        assert_eq!(count_crossings(&records, &levels), 0);
    }
}
