use crate::{Graph, GraphError, PriorityQueue, VertexKey};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Result of a single-source shortest path search
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths<K: VertexKey> {
    pub start: K,
    /// Distance from `start` for every vertex, `f64::INFINITY` if unreachable
    pub distances: HashMap<K, f64>,
    /// Predecessor on the shortest path, `None` for `start` and unreachable vertices
    pub previous_vertices: HashMap<K, Option<K>>,
}

impl<K: VertexKey> ShortestPaths<K> {
    pub fn distance(&self, target: &K) -> Option<f64> {
        self.distances.get(target).copied()
    }

    /// Vertex keys from `start` to `target`, both included
    pub fn path_to(&self, target: &K) -> Option<Vec<K>> {
        if !self.distance(target)?.is_finite() {
            return None;
        }

        let mut path = vec![target.clone()];
        let mut current = target;
        while let Some(Some(previous)) = self.previous_vertices.get(current) {
            path.push(previous.clone());
            current = previous;
        }
        path.reverse();
        Some(path)
    }
}

/// Dijkstra's shortest paths from `start`
///
/// Edge weights must be non-negative, negative weights give wrong distances
/// (checked in debug builds only).
///
/// # Errors
/// Returns [`GraphError::VertexNotFound`] if `start` is not in the graph
pub fn dijkstra<K>(graph: &Graph<K>, start: &K) -> Result<ShortestPaths<K>, GraphError>
where
    K: VertexKey + 'static,
{
    let start_vertex = graph
        .vertex(start)
        .ok_or_else(|| GraphError::VertexNotFound(start.to_string()))?;
    debug!(start = %start_vertex, vertices = graph.vertex_count(), "dijkstra");

    let mut distances: HashMap<K, f64> = HashMap::new();
    let mut previous_vertices: HashMap<K, Option<K>> = HashMap::new();
    for vertex in graph.all_vertices() {
        distances.insert(vertex.key().clone(), f64::INFINITY);
        previous_vertices.insert(vertex.key().clone(), None);
    }
    distances.insert(start.clone(), 0.0);

    let mut visited: HashSet<K> = HashSet::new();
    let mut queue = PriorityQueue::new();
    queue.add(start.clone(), 0.0);

    while let Some(current_key) = queue.poll() {
        let Some(current) = graph.vertex(&current_key) else {
            continue;
        };
        let current_distance = distances[&current_key];

        for neighbor in graph.neighbors(current) {
            let neighbor_key = neighbor.key();
            if visited.contains(neighbor_key) {
                continue;
            }
            let Some(edge) = graph.find_edge(&current_key, neighbor_key) else {
                continue;
            };
            debug_assert!(edge.weight >= 0.0, "negative edge weight {}", edge.weight);

            let candidate = current_distance + edge.weight;
            if candidate < distances[neighbor_key] {
                trace!(vertex = %neighbor, distance = candidate, "relaxing");
                distances.insert(neighbor_key.clone(), candidate);
                previous_vertices.insert(neighbor_key.clone(), Some(current_key.clone()));

                if queue.has_value(neighbor_key) {
                    queue.change_priority(neighbor_key.clone(), candidate);
                } else {
                    queue.add(neighbor_key.clone(), candidate);
                }
            }
        }

        visited.insert(current_key);
    }

    Ok(ShortestPaths {
        start: start.clone(),
        distances,
        previous_vertices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Edge;
    use petgraph::algo::dijkstra as reference_dijkstra;
    use std::collections::HashMap;
    use test_log::test;

    fn graph(directed: bool, edges: &[(&'static str, &'static str, f64)]) -> Graph<&'static str> {
        let mut graph = Graph::new(directed);
        for &(start, end, weight) in edges {
            graph.add_edge(Edge::new(start, end, weight)).unwrap();
        }
        graph
    }

    #[test]
    fn test_prefers_cheaper_indirect_path() {
        let g = graph(true, &[("a", "b", 1.0), ("b", "c", 2.0), ("a", "c", 5.0)]);
        let paths = dijkstra(&g, &"a").unwrap();
        assert_eq!(paths.distance(&"c"), Some(3.0));
        assert_eq!(paths.previous_vertices[&"c"], Some("b"));
        assert_eq!(paths.path_to(&"c"), Some(vec!["a", "b", "c"]));
    }

    #[test]
    fn test_decrease_key_reorders_queue() {
        // d is queued at 10 first, then improved to 3 through b
        let g = graph(
            true,
            &[("a", "d", 10.0), ("a", "b", 1.0), ("b", "d", 2.0), ("d", "e", 1.0)],
        );
        let paths = dijkstra(&g, &"a").unwrap();
        assert_eq!(paths.distance(&"d"), Some(3.0));
        assert_eq!(paths.distance(&"e"), Some(4.0));
        assert_eq!(paths.path_to(&"e"), Some(vec!["a", "b", "d", "e"]));
    }

    #[test]
    fn test_unreachable_vertices_are_infinite() {
        let g = graph(true, &[("a", "b", 1.0), ("c", "a", 1.0)]);
        let paths = dijkstra(&g, &"a").unwrap();
        assert_eq!(paths.distance(&"a"), Some(0.0));
        assert_eq!(paths.distance(&"c"), Some(f64::INFINITY));
        assert_eq!(paths.previous_vertices[&"c"], None);
        assert_eq!(paths.previous_vertices[&"a"], None);
        assert_eq!(paths.path_to(&"c"), None);
        assert_eq!(paths.path_to(&"a"), Some(vec!["a"]));
        assert_eq!(paths.distances.len(), 3);
    }

    #[test]
    fn test_undirected_graph() {
        let g = graph(
            false,
            &[
                ("a", "b", 4.0),
                ("a", "e", 7.0),
                ("a", "c", 3.0),
                ("b", "c", 6.0),
                ("b", "d", 5.0),
                ("c", "d", 11.0),
                ("c", "e", 8.0),
                ("d", "e", 2.0),
                ("d", "g", 10.0),
                ("d", "f", 2.0),
                ("e", "g", 5.0),
                ("f", "g", 3.0),
            ],
        );
        let paths = dijkstra(&g, &"a").unwrap();
        let expected = [
            ("a", 0.0),
            ("b", 4.0),
            ("c", 3.0),
            ("d", 9.0),
            ("e", 7.0),
            ("f", 11.0),
            ("g", 12.0),
        ];
        for (key, distance) in expected {
            assert_eq!(paths.distance(&key), Some(distance), "distance to {key}");
        }
        assert_eq!(paths.path_to(&"g"), Some(vec!["a", "e", "g"]));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let g = graph(
            true,
            &[("s", "a", 1.0), ("s", "b", 1.0), ("a", "t", 1.0), ("b", "t", 1.0)],
        );
        let first = dijkstra(&g, &"s").unwrap();
        for _ in 0..5 {
            assert_eq!(dijkstra(&g, &"s").unwrap(), first);
        }
    }

    #[test]
    fn test_matches_petgraph() {
        let edges = [
            ("a", "b", 7.0),
            ("a", "c", 9.0),
            ("a", "f", 14.0),
            ("b", "c", 10.0),
            ("b", "d", 15.0),
            ("c", "d", 11.0),
            ("c", "f", 2.0),
            ("d", "e", 6.0),
            ("e", "f", 9.0),
            ("f", "e", 1.5),
            ("g", "a", 1.0),
        ];
        let g = graph(true, &edges);

        let mut reference = petgraph::Graph::<&str, f64>::new();
        let mut indices = HashMap::new();
        for vertex in g.all_vertices() {
            indices.insert(*vertex.key(), reference.add_node(*vertex.key()));
        }
        for (start, end, weight) in edges {
            reference.add_edge(indices[start], indices[end], weight);
        }

        let expected = reference_dijkstra(&reference, indices["a"], None, |e| *e.weight());
        let paths = dijkstra(&g, &"a").unwrap();

        for (key, index) in &indices {
            match expected.get(index) {
                Some(distance) => assert_eq!(paths.distance(key), Some(*distance), "{key}"),
                None => assert_eq!(paths.distance(key), Some(f64::INFINITY), "{key}"),
            }
        }
    }

    #[test]
    fn test_unknown_start() {
        let g = graph(true, &[("a", "b", 1.0)]);
        assert_eq!(
            dijkstra(&g, &"x").unwrap_err(),
            GraphError::VertexNotFound("x".to_string())
        );
    }
}
