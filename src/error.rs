use thiserror::Error;

use crate::maze::Coord;

/// Contract violations reported by the grid, the generators and the solvers.
///
/// "No path" is not an error: solvers report it as `Ok(false)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MazeError {
    #[error("grid must be at least 3x3 including its border, got {rows}x{cols}")]
    InvalidDimensions { rows: u16, cols: u16 },

    #[error("cell {0:?} is outside the grid interior")]
    OutOfBounds(Coord),

    #[error("{which} {coord:?} {problem}")]
    InvalidEndpoint {
        which: Endpoint,
        coord: Coord,
        problem: EndpointProblem,
    },

    #[error("run cancelled")]
    Cancelled,
}

/// Which end of a solve an [`MazeError::InvalidEndpoint`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointProblem {
    OutsideInterior,
    Wall,
    SameAsStart,
}

impl std::fmt::Display for EndpointProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointProblem::OutsideInterior => write!(f, "is outside the grid interior"),
            EndpointProblem::Wall => write!(f, "is a wall"),
            EndpointProblem::SameAsStart => write!(f, "is the same cell as start"),
        }
    }
}
