// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{projection, Graph};

/// A vertex id paired with its position on the locally-projected plane.
///
/// This is the unit the [KDTree] is built from; the id is a non-owning
/// back-reference into the [Graph] the point was projected out of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanePoint {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

impl PlanePoint {
    /// Projects a lat-lon position into a plane point carrying `id`.
    pub fn project(id: i64, lon: f64, lat: f64) -> Self {
        Self {
            id,
            x: projection::project_to_x(lon, lat),
            y: projection::project_to_y(lon, lat),
        }
    }
}

/// An axis-aligned rectangle of the projected plane.
///
/// During a nearest-neighbor descent, a rectangle represents the region of
/// the plane a subtree could still contain; rectangles only ever live as
/// values local to one query call.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Rect {
    /// The tight bounding rectangle of a point set, or None for an empty set.
    fn around(points: &[PlanePoint]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut rect = Rect {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in rest {
            rect.min_x = rect.min_x.min(p.x);
            rect.min_y = rect.min_y.min(p.y);
            rect.max_x = rect.max_x.max(p.x);
            rect.max_y = rect.max_y.max(p.y);
        }
        Some(rect)
    }

    /// Splits into (west, east) halves along the vertical line at `x`.
    fn split_x(self, x: f64) -> (Self, Self) {
        (Self { max_x: x, ..self }, Self { min_x: x, ..self })
    }

    /// Splits into (south, north) halves along the horizontal line at `y`.
    fn split_y(self, y: f64) -> (Self, Self) {
        (Self { max_y: y, ..self }, Self { min_y: y, ..self })
    }

    /// Squared distance from a point to the closest point of this rectangle;
    /// zero if the point lies inside it.
    fn dist_sq_to(&self, x: f64, y: f64) -> f64 {
        let dx = (self.min_x - x).max(x - self.max_x).max(0.0);
        let dy = (self.min_y - y).max(y - self.max_y).max(0.0);
        dx * dx + dy * dy
    }
}

fn dist_sq(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    dx * dx + dy * dy
}

/// The best candidate seen so far by a nearest-neighbor descent, threaded
/// through the recursion as a plain value so concurrent queries never share
/// state.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: i64,
    dist_sq: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct KdNode {
    point: PlanePoint,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree)
/// over projected vertex positions, speeding up nearest-intersection lookup
/// from a linear scan to an expected-logarithmic descent. Every routing
/// request starts with two such lookups, so on any real map the tree pays
/// for its memory many times over.
///
/// The tree is balanced by construction: each level splits the remaining
/// points at the positional median of the current axis, alternating x and y
/// by depth (x at the root). It is never rebalanced or mutated afterwards.
/// An empty tree cannot be constructed ([KDTree::build] returns None for an
/// empty set), so a nearest query always has an answer.
///
/// Geometry is Euclidean in the projected plane, which is only valid near
/// the projection's reference point; queries far outside the served map
/// region degrade with the projection itself.
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree {
    root: KdNode,
    bounds: Rect,
}

impl KDTree {
    /// Projects every vertex of the graph and builds a tree over them.
    /// Returns None if the graph has no vertices.
    ///
    /// [Graph::prune_isolated] should run first, so that the tree never
    /// resolves a position to a vertex with no incident road.
    pub fn from_graph(g: &Graph) -> Option<Self> {
        let mut points: Vec<PlanePoint> = g
            .iter()
            .map(|v| PlanePoint::project(v.id, v.lon, v.lat))
            .collect();
        let tree = Self::build(&mut points);
        if tree.is_some() {
            log::debug!("built k-d tree over {} vertices", g.len());
        }
        tree
    }

    /// Builds a tree from a slice of projected points. Points will be
    /// reordered in the slice to facilitate building the tree. Returns None
    /// for an empty slice.
    ///
    /// Points sharing a coordinate on the splitting axis are ordered by
    /// their position in the input slice (the per-axis sort is stable), so
    /// building twice from the same ordered set yields structurally
    /// identical trees.
    pub fn build(points: &mut [PlanePoint]) -> Option<Self> {
        let bounds = Rect::around(points)?;
        Self::build_impl(points, true).map(|root| Self { root, bounds })
    }

    fn build_impl(points: &mut [PlanePoint], x_divides: bool) -> Option<KdNode> {
        match points.len() {
            0 => None,
            1 => Some(KdNode {
                point: points[0],
                left: None,
                right: None,
            }),
            _ => {
                if x_divides {
                    points.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap());
                } else {
                    points.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
                }
                let median = points.len() / 2;
                let point = points[median];
                let (left, right_and_pivot) = points.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(KdNode {
                    point,
                    left: box_option(Self::build_impl(left, !x_divides)),
                    right: box_option(Self::build_impl(right, !x_divides)),
                })
            }
        }
    }

    /// Finds the id of the vertex whose projected position is closest to the
    /// given lat-lon position.
    pub fn nearest(&self, lon: f64, lat: f64) -> i64 {
        self.nearest_projected(
            projection::project_to_x(lon, lat),
            projection::project_to_y(lon, lat),
        )
    }

    /// Finds the id of the vertex whose projected position is closest to the
    /// given point of the projected plane.
    pub fn nearest_projected(&self, x: f64, y: f64) -> i64 {
        // The initial candidate is "no point yet": the root visit replaces
        // it before any pruning decision is taken.
        let unset = Candidate {
            id: self.root.point.id,
            dist_sq: f64::INFINITY,
        };
        self.root.nearest(x, y, true, self.bounds, unset).id
    }
}

impl KdNode {
    fn nearest(
        &self,
        x: f64,
        y: f64,
        x_divides: bool,
        region: Rect,
        mut best: Candidate,
    ) -> Candidate {
        let d = dist_sq(x, y, self.point.x, self.point.y);
        if d < best.dist_sq {
            best = Candidate {
                id: self.point.id,
                dist_sq: d,
            };
        }

        // Split this node's region at its point and order the halves so that
        // the one containing the query point is descended into first.
        let (near, far, near_region, far_region) = if x_divides {
            let (west, east) = region.split_x(self.point.x);
            if x <= self.point.x {
                (&self.left, &self.right, west, east)
            } else {
                (&self.right, &self.left, east, west)
            }
        } else {
            let (south, north) = region.split_y(self.point.y);
            if y <= self.point.y {
                (&self.left, &self.right, south, north)
            } else {
                (&self.right, &self.left, north, south)
            }
        };

        if let Some(ref branch) = near {
            best = branch.nearest(x, y, !x_divides, near_region, best);
        }

        // The far half can only hold an improvement if the closest point of
        // its rectangle is strictly closer than the current best.
        if let Some(ref branch) = far {
            if far_region.dist_sq_to(x, y) < best.dist_sq {
                best = branch.nearest(x, y, !x_divides, far_region, best);
            }
        }

        best
    }
}

#[inline]
fn box_option<T>(o: Option<T>) -> Option<Box<T>> {
    o.map(|thing| Box::new(thing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn pt(id: i64, x: f64, y: f64) -> PlanePoint {
        PlanePoint { id, x, y }
    }

    fn nine_points() -> Vec<PlanePoint> {
        vec![
            pt(1, 0.01, 0.01),
            pt(2, 0.01, 0.05),
            pt(3, 0.03, 0.09),
            pt(4, 0.04, 0.03),
            pt(5, 0.04, 0.07),
            pt(6, 0.07, 0.03),
            pt(7, 0.07, 0.01),
            pt(8, 0.08, 0.05),
            pt(9, 0.08, 0.09),
        ]
    }

    fn brute_force_nearest(points: &[PlanePoint], x: f64, y: f64) -> f64 {
        points
            .iter()
            .map(|p| dist_sq(x, y, p.x, p.y))
            .min_by(|a, b| a.partial_cmp(b).unwrap())
            .unwrap()
    }

    #[test]
    fn kd_tree_small() {
        let tree = KDTree::build(&mut nine_points()).expect("k-d tree from non-empty slice");

        assert_eq!(tree.nearest_projected(0.02, 0.02), 1);
        assert_eq!(tree.nearest_projected(0.05, 0.03), 4);
        assert_eq!(tree.nearest_projected(0.05, 0.08), 5);
        assert_eq!(tree.nearest_projected(0.09, 0.06), 8);
    }

    #[test]
    fn empty_set_has_no_tree() {
        assert_eq!(KDTree::build(&mut []), None);
        assert_eq!(KDTree::from_graph(&Graph::new()), None);
    }

    #[test]
    fn single_point_always_wins() {
        let tree = KDTree::build(&mut [pt(7, 1.0, -2.0)]).unwrap();
        assert_eq!(tree.nearest_projected(1.0, -2.0), 7);
        assert_eq!(tree.nearest_projected(-100.0, 100.0), 7);
    }

    #[test]
    fn every_point_matches_itself() {
        let points = nine_points();
        let tree = KDTree::build(&mut points.clone()).unwrap();
        for p in &points {
            assert_eq!(tree.nearest_projected(p.x, p.y), p.id);
        }
    }

    #[test]
    fn every_vertex_matches_itself_through_projection() {
        let mut g = Graph::new();
        g.add_vertex(10, -122.2585, 37.8715).unwrap();
        g.add_vertex(11, -122.2601, 37.8690).unwrap();
        g.add_vertex(12, -122.2555, 37.8702).unwrap();
        g.add_vertex(13, -122.2612, 37.8731).unwrap();
        let tree = KDTree::from_graph(&g).unwrap();
        for v in g.iter() {
            assert_eq!(tree.nearest(v.lon, v.lat), v.id);
        }
    }

    #[test]
    fn query_far_outside_the_data_bounds() {
        let tree = KDTree::build(&mut nine_points()).unwrap();
        // Well north-east of every point: 9 at (0.08, 0.09) is closest.
        assert_eq!(tree.nearest_projected(5.0, 5.0), 9);
        // Well south-west: 1 at (0.01, 0.01).
        assert_eq!(tree.nearest_projected(-5.0, -5.0), 1);
    }

    #[test]
    fn rebuild_from_same_order_is_identical() {
        let points = nine_points();
        let a = KDTree::build(&mut points.clone()).unwrap();
        let b = KDTree::build(&mut points.clone()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn duplicate_coordinates_are_tolerated() {
        let mut points = vec![pt(1, 0.5, 0.5), pt(2, 0.5, 0.5), pt(3, -0.5, 0.0)];
        let tree = KDTree::build(&mut points).unwrap();
        let winner = tree.nearest_projected(0.5, 0.5);
        assert!(winner == 1 || winner == 2);
        assert_eq!(tree.nearest_projected(-0.4, 0.1), 3);
    }

    fn check_against_brute_force(point_count: usize, query_count: usize, seed: u64) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let points: Vec<PlanePoint> = (0..point_count)
            .map(|i| {
                pt(
                    i as i64,
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                )
            })
            .collect();
        let tree = KDTree::build(&mut points.clone()).unwrap();

        for _ in 0..query_count {
            // Query both inside and outside the data bounds.
            let x = rng.gen_range(-1.5..1.5);
            let y = rng.gen_range(-1.5..1.5);
            let id = tree.nearest_projected(x, y);
            let found = points.iter().find(|p| p.id == id).unwrap();
            let expected = brute_force_nearest(&points, x, y);
            assert_eq!(
                dist_sq(x, y, found.x, found.y),
                expected,
                "nearest({}, {}) returned {}, which is not minimal",
                x,
                y,
                id
            );
        }
    }

    #[test]
    fn matches_brute_force_tiny() {
        check_against_brute_force(10, 500, 0xC0FFEE);
    }

    #[test]
    fn matches_brute_force_medium() {
        check_against_brute_force(1_000, 200, 0xBADD_CAFE);
    }

    #[test]
    fn matches_brute_force_large() {
        check_against_brute_force(100_000, 50, 0xDEAD_BEEF);
    }
}
