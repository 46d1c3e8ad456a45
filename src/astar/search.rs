// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{Graph, KDTree, RouteError};

#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
    score: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score.eq(&other.score)
    }
}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        // NOTE: We revert the order of comparison,
        // as lower scores are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap.
        other.score.partial_cmp(&self.score)
    }
}

impl Eq for QueueItem {}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.partial_cmp(self).unwrap()
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&v) = came_from.get(&last) {
        path.push(v);
        last = v;
    }

    path.reverse();
    return path;
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the shortest route between two vertices of the provided graph,
/// as an ordered list of vertex ids, start and destination included.
///
/// The cost of traversing an edge is the great-circle distance between its
/// endpoints, and the search is guided by the great-circle distance to the
/// destination. Since that guide never overestimates the remaining cost and
/// respects the triangle inequality along every edge, the first time the
/// destination is popped off the frontier its cost is optimal, and no vertex
/// is ever expanded twice.
///
/// When `from_id == to_id`, the route is the single-element path.
/// Returns [RouteError::NoPath] if the destination is unreachable; the
/// search runs to frontier exhaustion to conclude that.
pub fn find_route(g: &Graph, from_id: i64, to_id: i64) -> Result<Vec<i64>, RouteError> {
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::default();
    let mut came_from: HashMap<i64, i64> = HashMap::default();
    let mut known_costs: HashMap<i64, f64> = HashMap::default();

    g.get_vertex(to_id)
        .ok_or(RouteError::UnknownVertex(to_id))?;
    g.get_vertex(from_id)
        .ok_or(RouteError::UnknownVertex(from_id))?;

    queue.push(QueueItem {
        at: from_id,
        cost: 0.0,
        score: g.distance(from_id, to_id),
    });
    known_costs.insert(from_id, 0.0);

    while let Some(item) = queue.pop() {
        if item.at == to_id {
            return Ok(reconstruct_path(&came_from, to_id));
        }

        // Contrary to the wikipedia definition, we might keep multiple items in the queue for the same vertex.
        if item.cost > known_costs.get(&item.at).cloned().unwrap_or(f64::INFINITY) {
            continue;
        }

        for &neighbor_id in g.neighbors(item.at) {
            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + g.distance(item.at, neighbor_id);
            if neighbor_cost
                > known_costs
                    .get(&neighbor_id)
                    .cloned()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            // Push the new item into the queue
            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
                score: neighbor_cost + g.distance(neighbor_id, to_id),
            });
        }
    }

    log::debug!("frontier exhausted: no path from {} to {}", from_id, to_id);
    Err(RouteError::NoPath {
        from: from_id,
        to: to_id,
    })
}

/// Finds the shortest route between two lat-lon positions: each position is
/// resolved to the nearest graph vertex through the index, then the route is
/// searched with [find_route].
///
/// The first element of the route is the vertex nearest to the start
/// position, the last one the vertex nearest to the destination position.
pub fn shortest_path(
    g: &Graph,
    tree: &KDTree,
    start_lon: f64,
    start_lat: f64,
    dest_lon: f64,
    dest_lat: f64,
) -> Result<Vec<i64>, RouteError> {
    let from_id = tree.nearest(start_lon, start_lat);
    let to_id = tree.nearest(dest_lon, dest_lat);
    find_route(g, from_id, to_id)
}
