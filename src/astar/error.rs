// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Error conditions which may occur during [find_route](crate::find_route)
/// or [shortest_path](crate::shortest_path).
///
/// Both variants are recoverable, per-query outcomes: once the graph and the
/// index are built, a failed query never poisons the query-serving path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The start or destination vertex doesn't exist in the graph.
    #[error("unknown vertex: {0}")]
    UnknownVertex(i64),

    /// The destination is not reachable from the start.
    ///
    /// Road graphs are not guaranteed to be connected; the search reports
    /// this by exhausting its frontier without ever reaching the
    /// destination. Distinct from a route, so a caller can never mistake
    /// the outcome for a degenerate path.
    #[error("no path from {from} to {to}")]
    NoPath { from: i64, to: i64 },
}
