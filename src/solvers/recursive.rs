use super::prepare;
use crate::{
    error::MazeError,
    maze::{CellState, Coord, Direction, Grid},
};

/// Depth-first search on the call stack, trying neighbors south, north, east, west.
///
/// On success the cells left as [`CellState::Visiting`] are the route from
/// `start` to `end`; dead ends are left as [`CellState::Backtrack`]. The route
/// is not necessarily the shortest one. Call depth grows with the route
/// length, so very large grids are better served by [`solve_stack`](super::solve_stack).
pub fn solve_recursive(grid: &mut Grid, start: Coord, end: Coord) -> Result<bool, MazeError> {
    if !prepare(grid, start, end)? {
        return Ok(false);
    }
    visit(grid, start, end)
}

fn visit(grid: &mut Grid, coord: Coord, end: Coord) -> Result<bool, MazeError> {
    grid.step(coord, CellState::Visiting)?;
    if coord == end {
        return Ok(true);
    }

    for dir in Direction::NEIGHBOR_ORDER {
        let next = dir.step(coord);
        // Checked lazily: earlier branches change what is still open.
        if grid.in_bounds(next) && grid[next] == CellState::Open && visit(grid, next, end)? {
            return Ok(true);
        }
    }

    grid.step(coord, CellState::Backtrack)?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::tests::{assert_contiguous, grid_from_ascii};

    #[test]
    fn test_backtracks_out_of_dead_end() {
        let (mut grid, start, end) = grid_from_ascii(&[
            "######", //
            "#S..E#", //
            "#.####", //
            "######",
        ]);
        assert_eq!(solve_recursive(&mut grid, start, end), Ok(true));
        assert_eq!(grid.coords_in_state(CellState::Backtrack), vec![(2, 1)]);
        assert_eq!(
            grid.coords_in_state(CellState::Visiting),
            vec![(1, 1), (1, 2), (1, 3), (1, 4)]
        );
    }

    #[test]
    fn test_takes_first_branch_not_shortest() {
        let (mut grid, start, end) = grid_from_ascii(&[
            "#######", //
            "#S....#", //
            "#.###E#", //
            "#.###.#", //
            "#.....#", //
            "#######",
        ]);
        assert_eq!(solve_recursive(&mut grid, start, end), Ok(true));
        // South is tried first, so the long way round is taken.
        let route = [
            (1, 1),
            (2, 1),
            (3, 1),
            (4, 1),
            (4, 2),
            (4, 3),
            (4, 4),
            (4, 5),
            (3, 5),
            (2, 5),
        ];
        assert_contiguous(&route);
        let mut visiting = grid.coords_in_state(CellState::Visiting);
        let mut expected = route.to_vec();
        visiting.sort();
        expected.sort();
        assert_eq!(visiting, expected);
        assert_eq!(grid.count(CellState::Backtrack), 0);
    }

    #[test]
    fn test_resolving_same_grid() {
        let (mut grid, start, end) = grid_from_ascii(&[
            "######", //
            "#S..E#", //
            "#.####", //
            "######",
        ]);
        assert_eq!(solve_recursive(&mut grid, start, end), Ok(true));
        // Swapped endpoints on the already-marked grid.
        assert_eq!(solve_recursive(&mut grid, end, start), Ok(true));
        assert_eq!(grid.count(CellState::Visiting), 4);
        assert_eq!(grid[(2, 1)], CellState::Open);
    }
}
