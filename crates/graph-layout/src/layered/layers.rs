use super::{AttrValue, Records, SankeyError};
use tracing::trace;

/// Node indices grouped by level
#[derive(Debug, Clone, Default)]
pub(crate) struct Levels {
    pub nodes: Vec<Vec<usize>>,

    /// Largest number of nodes in a single level
    pub max_nodes: usize,
}

impl Levels {
    fn from_nodes(nodes: Vec<Vec<usize>>) -> Self {
        let max_nodes = nodes.iter().map(Vec::len).max().unwrap_or(0);
        Self { nodes, max_nodes }
    }

    pub fn ids(&self, records: &Records) -> Vec<Vec<String>> {
        self.nodes
            .iter()
            .map(|level| level.iter().map(|&n| records.nodes[n].id.clone()).collect())
            .collect()
    }
}

/// Assign levels by breadth-first layering
///
/// Level 0 holds every node whose in-degree is the smallest in the graph;
/// each following level holds the not yet levelled targets of the previous
/// one.
///
/// # Errors
/// Returns [`SankeyError::UnreachableNodes`] when a level adds no node while
/// some remain unlevelled
pub(crate) fn auto_levels(records: &Records) -> Result<Levels, SankeyError> {
    let nodes = &records.nodes;
    let Some(min_in_degree) = nodes.iter().map(|n| n.in_degree()).min() else {
        return Ok(Levels::default());
    };

    let mut levelled = vec![false; nodes.len()];
    let first: Vec<usize> = (0..nodes.len())
        .filter(|&n| nodes[n].in_degree() == min_in_degree)
        .collect();
    for &n in &first {
        levelled[n] = true;
    }
    let mut added = first.len();
    let mut levels = vec![first];

    while added < nodes.len() {
        let mut next = Vec::new();
        for &node in levels.last().into_iter().flatten() {
            for &edge in &nodes[node].out_edges {
                let target = records.edges[edge].target;
                if !levelled[target] {
                    levelled[target] = true;
                    next.push(target);
                }
            }
        }

        if next.is_empty() {
            let unreachable = (0..nodes.len())
                .filter(|&n| !levelled[n])
                .map(|n| nodes[n].id.clone())
                .collect();
            return Err(SankeyError::UnreachableNodes(unreachable));
        }

        trace!(level = levels.len(), nodes = next.len(), "levelled");
        added += next.len();
        levels.push(next);
    }

    Ok(Levels::from_nodes(levels))
}

/// Assign levels from the value of a node field
///
/// Each distinct value is one level, levels are sorted by ascending value
/// (numerically when values are numbers). Nodes keep their input order
/// within a level.
///
/// # Errors
/// Returns [`SankeyError::MissingOrderingField`] for the first node without
/// the field
pub(crate) fn ordered_levels(records: &Records, field: &str) -> Result<Levels, SankeyError> {
    let mut keyed: Vec<(&AttrValue, usize)> = Vec::with_capacity(records.nodes.len());
    for (index, node) in records.nodes.iter().enumerate() {
        let value = node
            .ordering
            .as_ref()
            .ok_or_else(|| SankeyError::MissingOrderingField {
                node: node.id.clone(),
                field: field.to_string(),
            })?;
        keyed.push((value, index));
    }

    // Stable, so input order is kept among equal values
    keyed.sort_by(|(a, _), (b, _)| a.order(b));

    let mut levels: Vec<Vec<usize>> = Vec::new();
    let mut current: Option<&AttrValue> = None;
    for (value, index) in keyed {
        match (current, levels.last_mut()) {
            (Some(previous), Some(level)) if previous.order(value).is_eq() => level.push(index),
            _ => levels.push(vec![index]),
        }
        current = Some(value);
    }

    Ok(Levels::from_nodes(levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layered::{FlowEdge, FlowGraph, FlowNode, SankeyLayout};
    use test_log::test;

    fn records(nodes: &[FlowNode], edges: &[(&str, &str)], ordering: Option<&str>) -> Records {
        let graph = FlowGraph::new(
            nodes.to_vec(),
            edges
                .iter()
                .map(|&(s, t)| FlowEdge::weighted(s, t, 1.0))
                .collect(),
        );
        let config = SankeyLayout {
            ordering: ordering.map(str::to_string),
            ..Default::default()
        };
        Records::build(&graph, &config).unwrap()
    }

    fn plain(ids: &[&str]) -> Vec<FlowNode> {
        ids.iter().map(|&id| FlowNode::new(id)).collect()
    }

    #[test]
    fn test_chain_levels() {
        let records = records(&plain(&["a", "b", "c"]), &[("a", "b"), ("b", "c")], None);
        let levels = auto_levels(&records).unwrap();
        assert_eq!(levels.ids(&records), vec![vec!["a"], vec!["b"], vec!["c"]]);
        assert_eq!(levels.max_nodes, 1);
    }

    #[test]
    fn test_multiple_sources_share_first_level() {
        let records = records(
            &plain(&["x", "s1", "s2", "t"]),
            &[("s1", "x"), ("s2", "x"), ("x", "t"), ("s1", "t")],
            None,
        );
        let levels = auto_levels(&records).unwrap();
        assert_eq!(
            levels.ids(&records),
            vec![vec!["s1", "s2"], vec!["x", "t"]]
        );
        assert_eq!(levels.max_nodes, 2);
    }

    #[test]
    fn test_cycle_uses_minimum_in_degree() {
        // Every node has an incoming edge, the minimum in-degree is 1
        let records = records(
            &plain(&["a", "b", "c"]),
            &[("a", "b"), ("b", "c"), ("c", "a"), ("b", "a")],
            None,
        );
        let levels = auto_levels(&records).unwrap();
        assert_eq!(levels.ids(&records), vec![vec!["b", "c"], vec!["a"]]);
    }

    #[test]
    fn test_isolated_node_joins_first_level() {
        let records = records(&plain(&["a", "b", "lonely"]), &[("a", "b")], None);
        let levels = auto_levels(&records).unwrap();
        assert_eq!(levels.ids(&records), vec![vec!["a", "lonely"], vec!["b"]]);
    }

    #[test]
    fn test_unreachable_component_is_reported() {
        let records = records(
            &plain(&["s", "t", "c1", "c2"]),
            &[("s", "t"), ("c1", "c2"), ("c2", "c1")],
            None,
        );
        let err = auto_levels(&records).unwrap_err();
        assert_eq!(
            err,
            SankeyError::UnreachableNodes(vec!["c1".to_string(), "c2".to_string()])
        );
    }

    #[test]
    fn test_ordered_levels_numeric() {
        let nodes = vec![
            FlowNode::new("a").with_attr("rank", 10),
            FlowNode::new("b").with_attr("rank", 2),
            FlowNode::new("c").with_attr("rank", 10),
            FlowNode::new("d").with_attr("rank", "2"),
        ];
        let records = records(&nodes, &[("b", "a")], Some("rank"));
        let levels = ordered_levels(&records, "rank").unwrap();
        assert_eq!(levels.ids(&records), vec![vec!["b", "d"], vec!["a", "c"]]);
        assert_eq!(levels.max_nodes, 2);
    }

    #[test]
    fn test_ordered_levels_text() {
        let nodes = vec![
            FlowNode::new("a").with_attr("stage", "sink"),
            FlowNode::new("b").with_attr("stage", "middle"),
            FlowNode::new("c").with_attr("stage", "alpha"),
        ];
        let records = records(&nodes, &[], Some("stage"));
        let levels = ordered_levels(&records, "stage").unwrap();
        assert_eq!(levels.ids(&records), vec![vec!["c"], vec!["b"], vec!["a"]]);
    }

    #[test]
    fn test_ordered_levels_missing_field() {
        let nodes = vec![FlowNode::new("a").with_attr("rank", 1), FlowNode::new("b")];
        let records = records(&nodes, &[], Some("rank"));
        assert_eq!(
            ordered_levels(&records, "rank").unwrap_err(),
            SankeyError::MissingOrderingField {
                node: "b".to_string(),
                field: "rank".to_string()
            }
        );
    }
}
