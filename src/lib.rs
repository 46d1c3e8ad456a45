// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Nearest-intersection lookup and shortest-path routing over road-network data.
//!
//! A road network is represented as a standard undirected graph of
//! intersections ([Vertices](Vertex)) connected by road segments. Edges carry
//! no stored weight; travel cost is always the great-circle distance between
//! the connected intersections, in miles. On top of the graph, a [KDTree]
//! built over locally-projected vertex coordinates answers "which intersection
//! is closest to this position?", and [find_route] runs A* to find shortest
//! paths between intersections. Vertex and edge data is supplied by an
//! external ingestion layer before any query is served.
//!
//! # Example
//!
//! ```
//! let mut g = wayfarer::Graph::new();
//! g.add_vertex(1, -122.2585, 37.8715).unwrap();
//! g.add_vertex(2, -122.2601, 37.8690).unwrap();
//! g.add_vertex(3, -122.2555, 37.8702).unwrap();
//! g.add_edge(1, 2).unwrap();
//! g.add_edge(2, 3).unwrap();
//!
//! let tree = wayfarer::KDTree::from_graph(&g).expect("graph is not empty");
//! let route = wayfarer::shortest_path(&g, &tree, -122.2584, 37.8714, -122.2556, 37.8703)
//!     .expect("failed to find route");
//!
//! assert_eq!(route, vec![1, 2, 3]);
//! ```
//!
//! Both the graph and the tree are built once and never mutated afterwards,
//! so they can be shared freely between query threads; all mutable search
//! state lives on the stack of the querying call.

mod astar;
mod distance;
mod graph;
mod kd;
mod names;
mod projection;

pub use astar::{find_route, shortest_path, RouteError};
pub use distance::{earth_distance, initial_bearing};
pub use graph::{Graph, GraphError};
pub use kd::{KDTree, PlanePoint};
pub use names::{Location, LocationIndex};
pub use projection::{project_to_x, project_to_y};

/// Represents an intersection of the road network.
///
/// Identity is the externally-assigned `id`, unique within a [Graph].
/// Positions are in degrees, WGS 84. Vertices are immutable once the
/// graph is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}
