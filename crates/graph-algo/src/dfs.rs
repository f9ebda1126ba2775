use crate::{Graph, GraphError, Vertex, VertexKey};
use std::collections::HashSet;
use tracing::debug;

/// Vertex being entered or left
#[derive(Debug)]
pub struct Visit<'g, K> {
    pub current: &'g Vertex<K>,
    pub previous: Option<&'g Vertex<K>>,
}

/// Candidate move from `current` to `next`
#[derive(Debug)]
pub struct Step<'g, K> {
    pub previous: Option<&'g Vertex<K>>,
    pub current: &'g Vertex<K>,
    pub next: &'g Vertex<K>,
}

type VisitHook<'a, K> = Box<dyn for<'g> FnMut(&Visit<'g, K>) + 'a>;
type StepHook<'a, K> = Box<dyn for<'g> FnMut(&Step<'g, K>) -> bool + 'a>;

/// Hooks driving a depth-first traversal
///
/// Without a custom `allow_traversal`, each vertex is visited at most once
/// (the start vertex included).
pub struct DfsCallbacks<'a, K> {
    allow_traversal: Option<StepHook<'a, K>>,
    enter_vertex: Option<VisitHook<'a, K>>,
    leave_vertex: Option<VisitHook<'a, K>>,
}

impl<K> Default for DfsCallbacks<'_, K> {
    fn default() -> Self {
        Self {
            allow_traversal: None,
            enter_vertex: None,
            leave_vertex: None,
        }
    }
}

impl<'a, K> DfsCallbacks<'a, K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: for<'g> FnMut(&Visit<'g, K>) + 'a,
    {
        self.enter_vertex = Some(Box::new(hook));
        self
    }

    pub fn on_leave<F>(mut self, hook: F) -> Self
    where
        F: for<'g> FnMut(&Visit<'g, K>) + 'a,
    {
        self.leave_vertex = Some(Box::new(hook));
        self
    }

    /// Replace the visit-once policy
    ///
    /// A permissive policy on a cyclic graph never terminates.
    pub fn allow_traversal<F>(mut self, hook: F) -> Self
    where
        F: for<'g> FnMut(&Step<'g, K>) -> bool + 'a,
    {
        self.allow_traversal = Some(Box::new(hook));
        self
    }
}

/// Callbacks with the default policy resolved for one traversal
struct Walker<'a, K: VertexKey> {
    callbacks: DfsCallbacks<'a, K>,
    seen: HashSet<K>,
}

impl<'a, K: VertexKey> Walker<'a, K> {
    fn new(callbacks: DfsCallbacks<'a, K>, start: &Vertex<K>) -> Self {
        let mut seen = HashSet::new();
        seen.insert(start.key().clone());
        Self { callbacks, seen }
    }

    fn allow(&mut self, step: &Step<'_, K>) -> bool {
        match &mut self.callbacks.allow_traversal {
            Some(hook) => hook(step),
            None => self.seen.insert(step.next.key().clone()),
        }
    }

    fn enter(&mut self, visit: &Visit<'_, K>) {
        if let Some(hook) = &mut self.callbacks.enter_vertex {
            hook(visit);
        }
    }

    fn leave(&mut self, visit: &Visit<'_, K>) {
        if let Some(hook) = &mut self.callbacks.leave_vertex {
            hook(visit);
        }
    }
}

fn start_vertex<'g, K: VertexKey>(graph: &'g Graph<K>, start: &K) -> Result<&'g Vertex<K>, GraphError> {
    graph
        .vertex(start)
        .ok_or_else(|| GraphError::VertexNotFound(start.to_string()))
}

/// Recursive depth-first traversal from `start`
///
/// Neighbors are explored in incident-edge insertion order. Recursion depth
/// equals the length of the current path, see
/// [`depth_first_search_iterative`] for very deep graphs.
///
/// # Errors
/// Returns [`GraphError::VertexNotFound`] if `start` is not in the graph
pub fn depth_first_search<K: VertexKey>(
    graph: &Graph<K>,
    start: &K,
    callbacks: DfsCallbacks<'_, K>,
) -> Result<(), GraphError> {
    let start = start_vertex(graph, start)?;
    debug!(start = %start, "depth-first search");

    let mut walker = Walker::new(callbacks, start);
    visit_recursive(graph, start, None, &mut walker);
    Ok(())
}

fn visit_recursive<'g, K: VertexKey>(
    graph: &'g Graph<K>,
    current: &'g Vertex<K>,
    previous: Option<&'g Vertex<K>>,
    walker: &mut Walker<'_, K>,
) {
    walker.enter(&Visit { current, previous });

    for next in graph.neighbors(current) {
        if walker.allow(&Step {
            previous,
            current,
            next,
        }) {
            visit_recursive(graph, next, Some(current), walker);
        }
    }

    walker.leave(&Visit { current, previous });
}

struct Frame<'g, K> {
    current: &'g Vertex<K>,
    previous: Option<&'g Vertex<K>>,
    neighbors: std::vec::IntoIter<&'g Vertex<K>>,
}

/// Depth-first traversal with an explicit stack
///
/// Calls the hooks in exactly the same order as [`depth_first_search`].
///
/// # Errors
/// Returns [`GraphError::VertexNotFound`] if `start` is not in the graph
pub fn depth_first_search_iterative<K: VertexKey>(
    graph: &Graph<K>,
    start: &K,
    callbacks: DfsCallbacks<'_, K>,
) -> Result<(), GraphError> {
    let start = start_vertex(graph, start)?;
    debug!(start = %start, "iterative depth-first search");

    let mut walker = Walker::new(callbacks, start);
    walker.enter(&Visit {
        current: start,
        previous: None,
    });
    let mut stack = vec![Frame {
        current: start,
        previous: None,
        neighbors: graph.neighbors(start).into_iter(),
    }];

    while let Some(frame) = stack.last_mut() {
        let (current, previous) = (frame.current, frame.previous);

        match frame.neighbors.next() {
            Some(next) => {
                if walker.allow(&Step {
                    previous,
                    current,
                    next,
                }) {
                    walker.enter(&Visit {
                        current: next,
                        previous: Some(current),
                    });
                    stack.push(Frame {
                        current: next,
                        previous: Some(current),
                        neighbors: graph.neighbors(next).into_iter(),
                    });
                }
            }
            None => {
                walker.leave(&Visit { current, previous });
                stack.pop();
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Edge;
    use std::cell::RefCell;
    use test_log::test;

    fn graph(directed: bool, edges: &[(&'static str, &'static str)]) -> Graph<&'static str> {
        let mut graph = Graph::new(directed);
        for &(start, end) in edges {
            graph.add_edge(Edge::unweighted(start, end)).unwrap();
        }
        graph
    }

    /// Record every hook call as `enter:x`, `leave:x` or `step:x>y`
    fn trace(
        graph: &Graph<&'static str>,
        start: &'static str,
        iterative: bool,
    ) -> Vec<String> {
        let log = RefCell::new(Vec::new());
        let callbacks = DfsCallbacks::new()
            .on_enter(|visit| log.borrow_mut().push(format!("enter:{}", visit.current)))
            .on_leave(|visit| log.borrow_mut().push(format!("leave:{}", visit.current)));

        if iterative {
            depth_first_search_iterative(graph, &start, callbacks).unwrap();
        } else {
            depth_first_search(graph, &start, callbacks).unwrap();
        }
        log.into_inner()
    }

    #[test]
    fn test_enter_and_leave_order() {
        let g = graph(true, &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "e")]);
        assert_eq!(
            trace(&g, "a", false),
            vec![
                "enter:a", "enter:b", "enter:d", "leave:d", "leave:b", "enter:c", "enter:e",
                "leave:e", "leave:c", "leave:a"
            ]
        );
    }

    #[test]
    fn test_cycle_visits_each_vertex_once() {
        let g = graph(true, &[("a", "b"), ("b", "c"), ("c", "a")]);
        let log = trace(&g, "a", false);
        let entered: Vec<_> = log.iter().filter(|l| l.starts_with("enter")).collect();
        assert_eq!(entered, vec!["enter:a", "enter:b", "enter:c"]);
    }

    #[test]
    fn test_undirected_diamond_visits_once() {
        let g = graph(false, &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
        let log = trace(&g, "a", false);
        let entered: Vec<_> = log.iter().filter(|l| l.starts_with("enter")).collect();
        assert_eq!(entered, vec!["enter:a", "enter:b", "enter:d", "enter:c"]);
    }

    #[test]
    fn test_iterative_matches_recursive() {
        let g = graph(
            false,
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d"), ("d", "e"), ("e", "a")],
        );
        assert_eq!(trace(&g, "a", true), trace(&g, "a", false));

        let g = graph(true, &[("a", "b"), ("b", "c"), ("c", "a"), ("b", "d")]);
        assert_eq!(trace(&g, "b", true), trace(&g, "b", false));
    }

    #[test]
    fn test_previous_vertex_is_reported() {
        let g = graph(true, &[("a", "b"), ("b", "c")]);
        let parents = RefCell::new(Vec::new());
        let callbacks = DfsCallbacks::new().on_enter(|visit| {
            parents.borrow_mut().push((
                *visit.current.key(),
                visit.previous.map(|v| *v.key()),
            ))
        });
        depth_first_search(&g, &"a", callbacks).unwrap();
        assert_eq!(
            parents.into_inner(),
            vec![("a", None), ("b", Some("a")), ("c", Some("b"))]
        );
    }

    #[test]
    fn test_custom_allow_traversal() {
        // Allow revisits but bound the path length through the hook
        let g = graph(true, &[("a", "b"), ("b", "a")]);
        let steps = RefCell::new(0);
        let entered = RefCell::new(0);
        let callbacks = DfsCallbacks::new()
            .on_enter(|_| *entered.borrow_mut() += 1)
            .allow_traversal(|_| {
                *steps.borrow_mut() += 1;
                *steps.borrow() <= 3
            });
        depth_first_search(&g, &"a", callbacks).unwrap();
        assert_eq!(*entered.borrow(), 4);
    }

    #[test]
    fn test_unknown_start() {
        let g = graph(true, &[("a", "b")]);
        let err = depth_first_search(&g, &"z", DfsCallbacks::new()).unwrap_err();
        assert_eq!(err, GraphError::VertexNotFound("z".to_string()));
    }
}
