use super::prepare;
use crate::{
    error::MazeError,
    maze::{CellState, Coord, Direction, Grid},
};

/// Depth-first search with an explicit stack, so route length is not bounded by
/// call depth.
///
/// Moves to the first open neighbor in [`Direction::SWEEP_ORDER`] (south, east,
/// north, west); with none left the cursor is marked
/// [`CellState::Backtrack`] and popped. On success the stacked cells, all
/// [`CellState::Visiting`], are the route from `start` to `end`.
pub fn solve_stack(grid: &mut Grid, start: Coord, end: Coord) -> Result<bool, MazeError> {
    if !prepare(grid, start, end)? {
        return Ok(false);
    }

    let mut stack = vec![start];
    let mut cursor = start;
    while cursor != end {
        grid.step(cursor, CellState::Visiting)?;

        let next = Direction::SWEEP_ORDER
            .into_iter()
            .map(|dir| dir.step(cursor))
            .find(|&c| grid.in_bounds(c) && grid[c] == CellState::Open);

        match next {
            Some(next) => {
                stack.push(next);
                cursor = next;
            }
            None => {
                grid.step(cursor, CellState::Backtrack)?;
                stack.pop();
                match stack.last() {
                    Some(&top) => cursor = top,
                    None => return Ok(false),
                }
            }
        }
    }
    grid.step(end, CellState::Visiting)?;
    tracing::debug!(route = stack.len(), "stack solver reached the end");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::tests::grid_from_ascii;

    #[test]
    fn test_stack_backtracks_out_of_dead_end() {
        let (mut grid, start, end) = grid_from_ascii(&[
            "######", //
            "#S..E#", //
            "#.####", //
            "######",
        ]);
        assert_eq!(solve_stack(&mut grid, start, end), Ok(true));
        assert_eq!(grid.coords_in_state(CellState::Backtrack), vec![(2, 1)]);
        assert_eq!(grid.count(CellState::Visiting), 4);
    }

    #[test]
    fn test_sweep_order_prefers_east_over_north() {
        // From the start, north and east are both open; east is tried first and
        // leads straight to the end, so the northern branch is never entered.
        let (mut grid, start, end) = grid_from_ascii(&[
            "#####", //
            "#...#", //
            "#S.E#", //
            "#####",
        ]);
        assert_eq!(solve_stack(&mut grid, start, end), Ok(true));
        assert_eq!(
            grid.coords_in_state(CellState::Visiting),
            vec![(2, 1), (2, 2), (2, 3)]
        );
        assert_eq!(grid.count(CellState::Open), 3);
    }

    #[test]
    fn test_stack_handles_long_corridor() {
        let mut grid = Grid::new(3, 2002).unwrap();
        for col in 1..=2000 {
            grid.set((1, col), CellState::Open);
        }
        assert_eq!(solve_stack(&mut grid, (1, 1), (1, 2000)), Ok(true));
        assert_eq!(grid.count(CellState::Visiting), 2000);
    }
}
