// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{distance, Vertex};
use std::collections::btree_map::{BTreeMap, Entry};

/// Error conditions raised while assembling a [Graph].
///
/// Construction is fail-fast: any of these aborts the build, leaving no
/// partially-usable graph behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// [Graph::add_vertex] was called with an id that is already taken.
    #[error("vertex {0} is already present")]
    DuplicateVertex(i64),

    /// [Graph::add_edge] referenced a vertex absent from the graph.
    #[error("edge endpoint {0} is not a known vertex")]
    UnknownVertex(i64),

    /// [Graph::add_edge] was called with both endpoints equal.
    #[error("self-loop on vertex {0}")]
    SelfLoop(i64),
}

/// Represents a road network as a set of [Vertices](Vertex) (intersections)
/// and undirected edges (road segments) between them.
///
/// An edge is pure connectivity: it carries no stored weight, and the travel
/// cost between adjacent vertices is always recomputed from their positions
/// with [earth_distance](crate::earth_distance). Adjacency is stored
/// symmetrically, so `neighbors(u)` contains `v` exactly when `neighbors(v)`
/// contains `u`.
///
/// Vertices are keyed in a [BTreeMap], giving [Graph::iter] a deterministic
/// (id-ascending) order. [KDTree](crate::KDTree) construction relies on this
/// to produce identical trees from identical graphs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph(BTreeMap<i64, (Vertex, Vec<i64>)>);

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of vertices in the graph.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the graph has no vertices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all [Vertices](Vertex) in the graph,
    /// in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Vertex> {
        self.0.iter().map(|(_, (vertex, _))| vertex)
    }

    /// Retrieves the [Vertex] with the provided id.
    pub fn get_vertex(&self, id: i64) -> Option<Vertex> {
        self.0.get(&id).map(|&(vertex, _)| vertex)
    }

    /// Inserts a [Vertex] with the given id and position.
    ///
    /// Construction-time API: vertices must not be added after a
    /// [KDTree](crate::KDTree) has been built over this graph, as the tree
    /// would not know about them.
    pub fn add_vertex(&mut self, id: i64, lon: f64, lat: f64) -> Result<(), GraphError> {
        match self.0.entry(id) {
            Entry::Vacant(e) => {
                e.insert((Vertex { id, lat, lon }, Vec::default()));
                Ok(())
            }
            Entry::Occupied(_) => Err(GraphError::DuplicateVertex(id)),
        }
    }

    /// Inserts an undirected edge between two existing vertices.
    ///
    /// Both endpoints must already be present; referencing a missing vertex
    /// is a malformed-input error surfaced here, at build time, rather than
    /// at query time. Inserting an edge that already exists is a no-op.
    pub fn add_edge(&mut self, u: i64, v: i64) -> Result<(), GraphError> {
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        if !self.0.contains_key(&u) {
            return Err(GraphError::UnknownVertex(u));
        }
        if !self.0.contains_key(&v) {
            return Err(GraphError::UnknownVertex(v));
        }

        let (_, u_adj) = self.0.get_mut(&u).ok_or(GraphError::UnknownVertex(u))?;
        if !u_adj.contains(&v) {
            u_adj.push(v);
        }
        let (_, v_adj) = self.0.get_mut(&v).ok_or(GraphError::UnknownVertex(v))?;
        if !v_adj.contains(&u) {
            v_adj.push(u);
        }
        Ok(())
    }

    /// Gets the ids of all vertices adjacent to `v`.
    /// Returns an empty slice for an unknown id.
    pub fn neighbors(&self, v: i64) -> &[i64] {
        self.0
            .get(&v)
            .map(|(_, adjacent)| adjacent.as_slice())
            .unwrap_or_default()
    }

    /// Returns the latitude of vertex `v`, or `0.0` for an unknown id.
    ///
    /// The neutral fallback lets batch lookups over a mixed id set degrade
    /// gracefully; use [Graph::get_vertex] to distinguish a missing vertex
    /// from one at the zero coordinate.
    pub fn lat(&self, v: i64) -> f64 {
        self.0.get(&v).map(|(vertex, _)| vertex.lat).unwrap_or(0.0)
    }

    /// Returns the longitude of vertex `v`, or `0.0` for an unknown id.
    pub fn lon(&self, v: i64) -> f64 {
        self.0.get(&v).map(|(vertex, _)| vertex.lon).unwrap_or(0.0)
    }

    /// Returns the great-circle distance between vertices `u` and `v`,
    /// in miles. This is the sole travel-cost function used by route finding.
    pub fn distance(&self, u: i64, v: i64) -> f64 {
        distance::earth_distance(self.lat(u), self.lon(u), self.lat(v), self.lon(v))
    }

    /// Returns the initial bearing from vertex `u` to vertex `v`, in degrees
    /// in the range `(-180, 180]`.
    pub fn bearing(&self, u: i64, v: i64) -> f64 {
        distance::initial_bearing(self.lat(u), self.lon(u), self.lat(v), self.lon(v))
    }

    /// Removes every vertex with no incident edge and returns how many were
    /// removed.
    ///
    /// Map data routinely contains points that belong to no road segment.
    /// Running this once, after ingestion and before building a
    /// [KDTree](crate::KDTree), guarantees the index never resolves a
    /// position to an unroutable vertex. Connectivity of the remaining graph
    /// is not guaranteed, only assumed reasonable for road data.
    pub fn prune_isolated(&mut self) -> usize {
        let isolated: Vec<i64> = self
            .0
            .iter()
            .filter(|(_, (_, adjacent))| adjacent.is_empty())
            .map(|(&id, _)| id)
            .collect();
        for id in &isolated {
            self.0.remove(id);
        }
        if !isolated.is_empty() {
            log::debug!("pruned {} isolated vertices", isolated.len());
        }
        isolated.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        let mut g = Graph::new();
        g.add_vertex(1, -122.2585, 37.8715).unwrap();
        g.add_vertex(2, -122.2601, 37.8690).unwrap();
        g.add_vertex(3, -122.2555, 37.8702).unwrap();
        g.add_edge(1, 2).unwrap();
        g.add_edge(2, 3).unwrap();
        g.add_edge(3, 1).unwrap();
        g
    }

    #[test]
    fn add_vertex_rejects_duplicates() {
        let mut g = Graph::new();
        g.add_vertex(1, 0.0, 0.0).unwrap();
        assert_eq!(
            g.add_vertex(1, 1.0, 1.0),
            Err(GraphError::DuplicateVertex(1))
        );
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn add_edge_rejects_unknown_endpoints() {
        let mut g = Graph::new();
        g.add_vertex(1, 0.0, 0.0).unwrap();
        assert_eq!(g.add_edge(1, 2), Err(GraphError::UnknownVertex(2)));
        assert_eq!(g.add_edge(9, 1), Err(GraphError::UnknownVertex(9)));
        assert!(g.neighbors(1).is_empty());
    }

    #[test]
    fn add_edge_rejects_self_loops() {
        let mut g = Graph::new();
        g.add_vertex(1, 0.0, 0.0).unwrap();
        assert_eq!(g.add_edge(1, 1), Err(GraphError::SelfLoop(1)));
    }

    #[test]
    fn edges_are_symmetric() {
        let g = triangle();
        for (u, v) in [(1, 2), (2, 3), (3, 1)] {
            assert!(g.neighbors(u).contains(&v));
            assert!(g.neighbors(v).contains(&u));
        }
    }

    #[test]
    fn duplicate_edge_is_a_noop() {
        let mut g = triangle();
        g.add_edge(1, 2).unwrap();
        g.add_edge(2, 1).unwrap();
        assert_eq!(g.neighbors(1).len(), 2);
        assert_eq!(g.neighbors(2).len(), 2);
    }

    #[test]
    fn unknown_id_lookups_degrade_to_neutral_values() {
        let g = triangle();
        assert_eq!(g.lat(42), 0.0);
        assert_eq!(g.lon(42), 0.0);
        assert!(g.neighbors(42).is_empty());
        assert_eq!(g.get_vertex(42), None);
    }

    #[test]
    fn distance_symmetry_and_zero() {
        let g = triangle();
        for u in [1, 2, 3] {
            assert_eq!(g.distance(u, u), 0.0);
            for v in [1, 2, 3] {
                assert!((g.distance(u, v) - g.distance(v, u)).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn prune_removes_only_isolated_vertices() {
        let mut g = triangle();
        g.add_vertex(4, -122.26, 37.87).unwrap();
        g.add_vertex(5, -122.27, 37.88).unwrap();

        assert_eq!(g.prune_isolated(), 2);
        assert_eq!(g.len(), 3);
        assert_eq!(g.get_vertex(4), None);
        assert_eq!(g.get_vertex(5), None);
        // A second pass has nothing left to remove.
        assert_eq!(g.prune_isolated(), 0);
    }

    #[test]
    fn iteration_is_id_ordered() {
        let mut g = Graph::new();
        g.add_vertex(30, 0.0, 0.0).unwrap();
        g.add_vertex(10, 0.0, 0.0).unwrap();
        g.add_vertex(20, 0.0, 0.0).unwrap();
        let ids: Vec<i64> = g.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }
}
