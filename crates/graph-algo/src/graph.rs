use derive_more::{Display, From};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use thiserror::Error;
use tracing::{debug, warn};

/// Requirements on vertex keys
pub trait VertexKey: Clone + Eq + Hash + fmt::Display {}

impl<K> VertexKey for K where K: Clone + Eq + Hash + fmt::Display {}

/// Errors raised while building or querying a [`Graph`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    /// An edge with the same `<start>_<end>` key is already in the graph
    #[error("edge {0} has already been added before")]
    DuplicateEdge(String),

    /// The requested vertex is not part of the graph
    #[error("vertex {0} is not in the graph")]
    VertexNotFound(String),
}

/// Handle of a vertex in its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct VertexId(usize);

/// Handle of an edge in its graph's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
pub struct EdgeId(usize);

impl VertexId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A graph node identified by its key
///
/// Incident edges are stored as handles in insertion order, without
/// duplicates.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex<K> {
    key: K,
    edges: Vec<EdgeId>,
}

impl<K: VertexKey> Vertex<K> {
    pub fn new(key: K) -> Self {
        Self {
            key,
            edges: Vec::new(),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    /// Incident edge handles, in insertion order
    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn degree(&self) -> usize {
        self.edges.len()
    }

    pub fn has_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    fn add_edge(&mut self, edge: EdgeId) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    fn delete_edge(&mut self, edge: EdgeId) {
        self.edges.retain(|&e| e != edge);
    }
}

impl<K: fmt::Display> fmt::Display for Vertex<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// A weighted connection between two vertex keys
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<K> {
    pub start: K,
    pub end: K,
    pub weight: f64,
}

impl<K: VertexKey> Edge<K> {
    pub fn new(start: K, end: K, weight: f64) -> Self {
        Self { start, end, weight }
    }

    /// Edge with the default weight of 0
    pub fn unweighted(start: K, end: K) -> Self {
        Self::new(start, end, 0.0)
    }

    /// `<start>_<end>`, unique within a graph
    pub fn key(&self) -> String {
        format!("{}_{}", self.start, self.end)
    }

    /// Swap endpoints in place
    ///
    /// This changes the edge key: edges already in a graph must be reversed
    /// through [`Graph::reverse`] so the key index follows.
    pub fn reverse(&mut self) -> &mut Self {
        std::mem::swap(&mut self.start, &mut self.end);
        self
    }

    /// Whether `key` is one of the endpoints
    pub fn touches(&self, key: &K) -> bool {
        self.start == *key || self.end == *key
    }

    /// The endpoint that is not `key`
    pub fn other(&self, key: &K) -> &K {
        if self.start == *key {
            &self.end
        } else {
            &self.start
        }
    }
}

impl<K: VertexKey> fmt::Display for Edge<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Directed or undirected graph owning its vertices and edges
///
/// Vertices and edges live in arenas addressed by [`VertexId`] and
/// [`EdgeId`]. Vertices are kept in insertion order, which is the order used
/// by [`Graph::adjacency_matrix`]. Deleted edges leave an empty slot so
/// existing handles stay valid.
#[derive(Debug, Clone)]
pub struct Graph<K> {
    vertices: Vec<Vertex<K>>,
    vertex_index: HashMap<K, VertexId>,
    edges: Vec<Option<Edge<K>>>,
    edge_index: HashMap<String, EdgeId>,
    directed: bool,
}

impl<K: VertexKey> Graph<K> {
    pub fn new(directed: bool) -> Self {
        Self {
            vertices: Vec::new(),
            vertex_index: HashMap::new(),
            edges: Vec::new(),
            edge_index: HashMap::new(),
            directed,
        }
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_index.len()
    }

    /// Insert a vertex by key
    ///
    /// Only the key is taken: incident edges belong to this graph's arena
    /// and are registered through [`Graph::add_edge`]. A vertex already
    /// present keeps its edges.
    pub fn add_vertex(&mut self, vertex: Vertex<K>) -> &mut Self {
        if !self.vertex_index.contains_key(vertex.key()) {
            let id = VertexId(self.vertices.len());
            self.vertex_index.insert(vertex.key.clone(), id);
            self.vertices.push(Vertex::new(vertex.key));
        }
        self
    }

    fn ensure_vertex(&mut self, key: &K) -> VertexId {
        if let Some(&id) = self.vertex_index.get(key) {
            return id;
        }
        self.add_vertex(Vertex::new(key.clone()));
        VertexId(self.vertices.len() - 1)
    }

    pub fn vertex(&self, key: &K) -> Option<&Vertex<K>> {
        self.vertex_index
            .get(key)
            .map(|id| &self.vertices[id.index()])
    }

    pub fn vertex_id(&self, key: &K) -> Option<VertexId> {
        self.vertex_index.get(key).copied()
    }

    pub fn vertex_by_id(&self, id: VertexId) -> Option<&Vertex<K>> {
        self.vertices.get(id.index())
    }

    pub fn edge_by_id(&self, id: EdgeId) -> Option<&Edge<K>> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    /// Edge registered under a `<start>_<end>` key
    pub fn edge_by_key(&self, key: &str) -> Option<&Edge<K>> {
        self.edge_index
            .get(key)
            .and_then(|&id| self.edge_by_id(id))
    }

    /// All vertices in insertion order
    pub fn all_vertices(&self) -> &[Vertex<K>] {
        &self.vertices
    }

    /// All edges in insertion order
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge<K>> {
        self.edges.iter().flatten()
    }

    /// Add an edge, inserting missing endpoints
    ///
    /// # Errors
    /// Returns [`GraphError::DuplicateEdge`] if an edge with the same key
    /// already exists.
    pub fn add_edge(&mut self, edge: Edge<K>) -> Result<&mut Self, GraphError> {
        let key = edge.key();
        if self.edge_index.contains_key(&key) {
            warn!(%key, "rejecting duplicate edge");
            return Err(GraphError::DuplicateEdge(key));
        }

        let start = self.ensure_vertex(&edge.start);
        let end = self.ensure_vertex(&edge.end);

        let id = EdgeId(self.edges.len());
        self.edges.push(Some(edge));
        self.edge_index.insert(key, id);

        self.vertices[start.index()].add_edge(id);
        if !self.directed {
            self.vertices[end.index()].add_edge(id);
        }

        Ok(self)
    }

    /// Remove the edge between `start` and `end`, if any
    ///
    /// For undirected graphs the edge is matched in either direction.
    pub fn delete_edge(&mut self, start: &K, end: &K) -> Option<Edge<K>> {
        let id = self.find_edge_id(start, end)?;
        let edge = self.edges[id.index()].take()?;
        self.edge_index.remove(&edge.key());

        for key in [&edge.start, &edge.end] {
            if let Some(&vertex) = self.vertex_index.get(key) {
                self.vertices[vertex.index()].delete_edge(id);
            }
        }

        debug!(edge = %edge, "deleted edge");
        Some(edge)
    }

    /// Remove every edge incident to `key`
    pub fn delete_vertex_edges(&mut self, key: &K) -> Vec<Edge<K>> {
        let Some(vertex) = self.vertex(key) else {
            return Vec::new();
        };

        let incident: Vec<(K, K)> = vertex
            .edges
            .iter()
            .filter_map(|&id| self.edge_by_id(id))
            .map(|edge| (edge.start.clone(), edge.end.clone()))
            .collect();

        incident
            .into_iter()
            .filter_map(|(start, end)| self.delete_edge(&start, &end))
            .collect()
    }

    /// Incident edges of a vertex, in insertion order
    pub fn vertex_edges(&self, vertex: &Vertex<K>) -> Vec<&Edge<K>> {
        vertex
            .edges
            .iter()
            .filter_map(|&id| self.edge_by_id(id))
            .collect()
    }

    /// Vertices reached through the incident edges of `vertex`
    ///
    /// One entry per incident edge, picking whichever endpoint is not
    /// `vertex` itself.
    pub fn neighbors(&self, vertex: &Vertex<K>) -> Vec<&Vertex<K>> {
        self.vertex_edges(vertex)
            .into_iter()
            .filter_map(|edge| self.vertex(edge.other(&vertex.key)))
            .collect()
    }

    pub fn has_neighbor(&self, vertex: &Vertex<K>, other: &K) -> bool {
        self.vertex_edges(vertex)
            .iter()
            .any(|edge| edge.touches(other))
    }

    fn find_edge_id(&self, start: &K, end: &K) -> Option<EdgeId> {
        let vertex = self.vertex(start)?;
        vertex.edges.iter().copied().find(|&id| {
            self.edge_by_id(id)
                .is_some_and(|edge| edge.other(start) == end)
        })
    }

    /// First incident edge of `start` that leads to `end`
    pub fn find_edge(&self, start: &K, end: &K) -> Option<&Edge<K>> {
        self.find_edge_id(start, end)
            .and_then(|id| self.edge_by_id(id))
    }

    /// Insertion index of every vertex key
    pub fn vertex_indices(&self) -> HashMap<K, usize> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(index, vertex)| (vertex.key.clone(), index))
            .collect()
    }

    /// Dense weight matrix indexed by insertion order
    ///
    /// Missing edges are `f64::INFINITY`.
    pub fn adjacency_matrix(&self) -> Vec<Vec<f64>> {
        let indices = self.vertex_indices();
        let n = self.vertices.len();
        let mut matrix = vec![vec![f64::INFINITY; n]; n];

        for (index, vertex) in self.vertices.iter().enumerate() {
            for neighbor in self.neighbors(vertex) {
                let Some(edge) = self.find_edge(&vertex.key, &neighbor.key) else {
                    continue;
                };
                matrix[index][indices[&neighbor.key]] = edge.weight;
            }
        }

        matrix
    }

    /// Sum of all edge weights
    pub fn weight(&self) -> f64 {
        self.all_edges().map(|edge| edge.weight).sum()
    }

    /// Reverse every edge of a directed graph, re-indexing edge keys
    ///
    /// Undirected graphs are left untouched.
    pub fn reverse(&mut self) -> &mut Self {
        if !self.directed {
            return self;
        }

        for vertex in &mut self.vertices {
            vertex.edges.clear();
        }
        self.edge_index.clear();

        for (index, slot) in self.edges.iter_mut().enumerate() {
            let Some(edge) = slot else {
                continue;
            };
            edge.reverse();
            let id = EdgeId(index);
            self.edge_index.insert(edge.key(), id);
            let start = self.vertex_index[&edge.start];
            self.vertices[start.index()].add_edge(id);
        }

        self
    }
}

impl<K: VertexKey> Default for Graph<K> {
    fn default() -> Self {
        Self::directed()
    }
}

impl<K: VertexKey> fmt::Display for Graph<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{vertex}")?;
        }
        Ok(())
    }
}
