use std::collections::VecDeque;

use super::prepare;
use crate::{
    error::MazeError,
    maze::{CellState, Coord, Direction, Grid},
};

/// Breadth-first search with path reconstruction.
///
/// Explored cells are marked [`CellState::Visiting`]. Once `end` has been
/// discovered the parent links are walked back to `start` and every cell on
/// the way, both endpoints included, is marked [`CellState::Path`]. The
/// traced route is a shortest one.
pub fn solve_breadth_first(grid: &mut Grid, start: Coord, end: Coord) -> Result<bool, MazeError> {
    if !prepare(grid, start, end)? {
        return Ok(false);
    }

    // Parent links indexed by ravelled coordinate, fresh for every run.
    // A link is written once, when its cell is first queued.
    let mut parents: Vec<Option<usize>> = vec![None; grid.area()];
    let end_idx = grid.ravel_index(end);
    let mut queue = VecDeque::from([start]);

    while parents[end_idx].is_none() {
        let Some(&current) = queue.front() else {
            return Ok(false);
        };
        grid.step(current, CellState::Visiting)?;

        let current_idx = grid.ravel_index(current);
        let discovered = grid
            .neighbors_in(Direction::SWEEP_ORDER, current, |s| s == CellState::Open)
            .filter(|&c| parents[grid.ravel_index(c)].is_none())
            .collect::<Vec<_>>();
        for next in discovered {
            parents[grid.ravel_index(next)] = Some(current_idx);
            queue.push_back(next);
        }
        queue.pop_front();
    }
    tracing::debug!(queued = queue.len(), "end discovered, tracing parents");

    let mut idx = end_idx;
    loop {
        let coord = grid.unravel_index(idx);
        grid.step(coord, CellState::Path)?;
        if coord == start {
            break;
        }
        let Some(parent) = parents[idx] else {
            break;
        };
        idx = parent;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::GridEvent;
    use crate::solvers::tests::{assert_contiguous, grid_from_ascii};
    use std::sync::mpsc;

    #[test]
    fn test_open_room_shortest_path() {
        // 3x3 open room: any shortest route corner to corner has 4 steps.
        let (mut grid, start, end) = grid_from_ascii(&[
            "#####", //
            "#S..#", //
            "#...#", //
            "#..E#", //
            "#####",
        ]);
        assert_eq!(solve_breadth_first(&mut grid, start, end), Ok(true));
        let path = grid.coords_in_state(CellState::Path);
        assert_eq!(path.len(), 5);
        assert!(path.contains(&start) && path.contains(&end));
    }

    #[test]
    fn test_picks_short_way_round() {
        let (mut grid, start, end) = grid_from_ascii(&[
            "#######", //
            "#S....#", //
            "#.###E#", //
            "#.###.#", //
            "#.....#", //
            "#######",
        ]);
        assert_eq!(solve_breadth_first(&mut grid, start, end), Ok(true));
        assert_eq!(
            grid.coords_in_state(CellState::Path),
            vec![(1, 1), (1, 2), (1, 3), (1, 4), (1, 5), (2, 5)]
        );
    }

    #[test]
    fn test_trace_is_emitted_end_to_start() {
        let (tx, rx) = mpsc::channel();
        let mut grid = Grid::with_sink(4, 6, Box::new(tx)).unwrap();
        for col in 1..=4 {
            grid.set((1, col), CellState::Open);
        }
        grid.set((2, 1), CellState::Open);
        let (start, end) = ((1, 1), (1, 4));
        assert_eq!(solve_breadth_first(&mut grid, start, end), Ok(true));

        let traced = rx
            .try_iter()
            .filter_map(|e| match e {
                GridEvent::Update {
                    coord,
                    new: CellState::Path,
                    ..
                } => Some(coord),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(traced, vec![(1, 4), (1, 3), (1, 2), (1, 1)]);
        assert_contiguous(&traced);
    }

    #[test]
    fn test_end_found_before_queue_drains() {
        let (mut grid, start, end) = grid_from_ascii(&[
            "#######", //
            "#SE...#", //
            "#######",
        ]);
        assert_eq!(solve_breadth_first(&mut grid, start, end), Ok(true));
        // Only the start was expanded; the far corridor is untouched.
        assert_eq!(grid.count(CellState::Visiting), 0);
        assert_eq!(grid.count(CellState::Open), 3);
    }
}
