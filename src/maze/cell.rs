/// State of a single grid cell.
///
/// `Blocked` is a wall. Every other state is a passage; the solve-time
/// states only record how a solver has treated the passage so far.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Blocked,
    /// A carved passage not yet touched by a solver.
    Open,
    /// Entered by a solver and still part of its current route.
    Visiting,
    /// Abandoned by a depth-first solver after a dead end.
    Backtrack,
    /// Part of the route reconstructed by the breadth-first solver.
    Path,
}

impl CellState {
    /// Passable for both carving adjacency and solve traversal.
    pub fn is_passage(self) -> bool {
        self != CellState::Blocked
    }

    /// Marks written by solvers, wiped by [`Grid::reset_solution`](super::Grid::reset_solution).
    pub fn is_solve_mark(self) -> bool {
        matches!(
            self,
            CellState::Visiting | CellState::Backtrack | CellState::Path
        )
    }
}
