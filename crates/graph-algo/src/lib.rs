//! Graph data structures and algorithms
//!
//! - [`Graph`]: directed or undirected graph with keyed vertices and
//!   weighted edges, stored in arenas
//! - [`MinHeap`] / [`MaxHeap`] and [`PriorityQueue`] with decrease-key
//! - [`depth_first_search`] driven by enter/leave/allow-traversal hooks
//! - [`dijkstra`] single-source shortest paths
//!
//! # Example
//!
//! ```
//! use graph_algo::{dijkstra, Edge, Graph};
//!
//! let mut graph = Graph::directed();
//! graph
//!     .add_edge(Edge::new("a", "b", 1.0))?
//!     .add_edge(Edge::new("b", "c", 2.0))?
//!     .add_edge(Edge::new("a", "c", 5.0))?;
//!
//! let paths = dijkstra(&graph, &"a")?;
//! assert_eq!(paths.distance(&"c"), Some(3.0));
//! assert_eq!(paths.path_to(&"c"), Some(vec!["a", "b", "c"]));
//! # Ok::<(), graph_algo::GraphError>(())
//! ```

mod comparator;
mod dfs;
mod dijkstra;
mod graph;
mod heap;
mod priority_queue;

pub use comparator::Comparator;
pub use dfs::{depth_first_search, depth_first_search_iterative, DfsCallbacks, Step, Visit};
pub use dijkstra::{dijkstra, ShortestPaths};
pub use graph::{Edge, EdgeId, Graph, GraphError, Vertex, VertexId, VertexKey};
pub use heap::{Heap, HeapOrder, MaxHeap, MaxOrder, MinHeap, MinOrder};
pub use priority_queue::PriorityQueue;
