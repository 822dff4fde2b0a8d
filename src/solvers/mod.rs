mod bfs;
mod recursive;
mod stack;

pub use bfs::solve_breadth_first;
pub use recursive::solve_recursive;
pub use stack::solve_stack;

use crate::{
    error::{Endpoint, EndpointProblem, MazeError},
    maze::{Coord, Grid},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    Recursive,
    Stack,
    BreadthFirst,
}

impl Solver {
    pub const ALL: [Solver; 3] = [Solver::Recursive, Solver::Stack, Solver::BreadthFirst];
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::Recursive => write!(f, "Recursive depth-first"),
            Solver::Stack => write!(f, "Stack depth-first"),
            Solver::BreadthFirst => write!(f, "Breadth-first (shortest path)"),
        }
    }
}

/// Checks the endpoints and wipes marks left by an earlier solve.
///
/// Returns `Ok(false)` when the grid has no passages at all, which callers
/// report as unreachable rather than as a bad endpoint.
fn prepare(grid: &mut Grid, start: Coord, end: Coord) -> Result<bool, MazeError> {
    if !grid.has_passages() {
        tracing::debug!("solve requested on an uncarved grid");
        return Ok(false);
    }
    for (which, coord) in [(Endpoint::Start, start), (Endpoint::End, end)] {
        let problem = if !grid.in_bounds(coord) {
            EndpointProblem::OutsideInterior
        } else if !grid[coord].is_passage() {
            EndpointProblem::Wall
        } else {
            continue;
        };
        return Err(MazeError::InvalidEndpoint {
            which,
            coord,
            problem,
        });
    }
    if start == end {
        return Err(MazeError::InvalidEndpoint {
            which: Endpoint::End,
            coord: end,
            problem: EndpointProblem::SameAsStart,
        });
    }
    grid.reset_solution();
    Ok(true)
}

/// Solve the maze from `start` to `end` with the chosen strategy.
/// Returns whether `end` was reached.
pub fn solve_maze(
    grid: &mut Grid,
    solver: Solver,
    start: Coord,
    end: Coord,
) -> Result<bool, MazeError> {
    tracing::info!(%solver, ?start, ?end, "solving maze");
    let found = match solver {
        Solver::Recursive => solve_recursive(grid, start, end)?,
        Solver::Stack => solve_stack(grid, start, end)?,
        Solver::BreadthFirst => solve_breadth_first(grid, start, end)?,
    };
    tracing::info!(found, "solve finished");
    Ok(found)
}
