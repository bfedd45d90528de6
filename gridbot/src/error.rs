//! Errors raised by grid queries and grid construction.
//!
//! Failing to find a path is not an error: searches report it through
//! [`PathFinderState::NoPathFound`](crate::PathFinderState::NoPathFound) and the
//! exploration loop reports it through [`ExploreState::Stuck`](crate::ExploreState::Stuck).

use crate::grid::Point;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// The queried coordinate lies outside the grid.
    #[error("cell {point} is outside the {rows}x{columns} grid")]
    InvalidCell {
        point: Point,
        rows: usize,
        columns: usize,
    },

    /// The cell is an obstacle and has no traversal cost.
    #[error("cell {0} is blocked")]
    Blocked(Point),

    /// A grid literal had rows of different lengths.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("grid has no cells")]
    EmptyGrid,

    /// Cost 0 is reserved for cells the agent has not sensed yet.
    #[error("cell {0} has cost 0, traversal costs must be at least 1")]
    ZeroCost(Point),
}
