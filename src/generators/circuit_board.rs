use rand::Rng;

use super::carvable_directions;
use crate::{
    error::MazeError,
    maze::{CellState, Coord, Direction, Grid},
};

/// Stack length at which cells with nothing left to carve are dropped.
const MAX_STACK: usize = 100;
/// Longest straight run carved in one go.
const MAX_RUN: u32 = 10;

fn can_grow(grid: &Grid, coord: Coord) -> bool {
    Direction::NEIGHBOR_ORDER
        .into_iter()
        .any(|dir| grid.is_carvable(dir.step(coord)))
}

/// Randomized run-length carving.
///
/// Unwinds the stack to the most recent cell that still has a carvable
/// neighbor, picks one of those neighbors at random and keeps carving in that
/// direction for 1 to 10 cells, stopping early at the first cell that would
/// close a loop. Every iteration carves at least one cell, so the grid-area
/// iteration cap is never reached before the stack runs dry.
///
/// Once the stack holds [`MAX_STACK`] cells it is compacted: exhausted cells
/// are dropped, cells that can still grow are kept in order. A cell never
/// regains a carvable neighbor, so nothing reachable is lost.
pub fn carve_circuit_board<R: Rng + ?Sized>(
    grid: &mut Grid,
    start: Coord,
    rng: &mut R,
) -> Result<(), MazeError> {
    if !grid.is_carvable(start) {
        return Ok(());
    }
    grid.step(start, CellState::Open)?;

    let mut stack = vec![start];
    let mut compact_at = MAX_STACK;

    for _ in 0..grid.area() {
        if stack.len() >= compact_at {
            let before = stack.len();
            stack.retain(|&coord| can_grow(grid, coord));
            compact_at = (stack.len() * 2).max(MAX_STACK);
            tracing::trace!(before, after = stack.len(), "compacted carving stack");
        }

        let (mut cursor, directions) = loop {
            let Some(&top) = stack.last() else {
                return Ok(());
            };
            let directions = carvable_directions(grid, top);
            if !directions.is_empty() {
                break (top, directions);
            }
            stack.pop();
        };

        let dir = directions[rng.random_range(0..directions.len())];
        for _ in 0..rng.random_range(1..=MAX_RUN) {
            let next = dir.step(cursor);
            if !grid.is_carvable(next) {
                break;
            }
            grid.step(next, CellState::Open)?;
            stack.push(next);
            cursor = next;
        }
    }

    tracing::debug!(stack = stack.len(), "circuit board carving hit its iteration cap");
    Ok(())
}
