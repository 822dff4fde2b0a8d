pub mod cell;
pub mod grid;

pub use cell::CellState;
pub use grid::{CancelFlag, EventSink, Grid, GridEvent, StepKind};

/// Grid coordinate as `(row, col)`. Row 0 is the top border.
pub type Coord = (u16, u16);

/// Cardinal step between two adjacent cells. South increases the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    South,
    North,
    East,
    West,
}

impl Direction {
    /// Order used by [`Grid::neighbors`], both generators and the recursive solver.
    pub const NEIGHBOR_ORDER: [Direction; 4] = [
        Direction::South,
        Direction::North,
        Direction::East,
        Direction::West,
    ];

    /// Order used by the explicit-stack and breadth-first solvers.
    pub const SWEEP_ORDER: [Direction; 4] = [
        Direction::South,
        Direction::East,
        Direction::North,
        Direction::West,
    ];

    /// The coordinate one step away in this direction.
    ///
    /// NOTE: stepping off row or column 0 wraps to `u16::MAX` and stepping past
    /// `u16::MAX` saturates. Both land outside any grid, so callers only need
    /// the usual bounds check.
    pub fn step(self, (row, col): Coord) -> Coord {
        match self {
            Direction::South => (row.saturating_add(1), col),
            Direction::North => (row.wrapping_sub(1), col),
            Direction::East => (row, col.saturating_add(1)),
            Direction::West => (row, col.wrapping_sub(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_directions() {
        let steps = Direction::NEIGHBOR_ORDER.map(|dir| dir.step((5, 5)));
        assert_eq!(steps, [(6, 5), (4, 5), (5, 6), (5, 4)]);
    }

    #[test]
    fn test_step_off_edge_leaves_grid() {
        assert_eq!(Direction::North.step((0, 3)), (u16::MAX, 3));
        assert_eq!(Direction::West.step((3, 0)), (3, u16::MAX));
        assert_eq!(Direction::South.step((u16::MAX, 3)), (u16::MAX, 3));
    }
}
