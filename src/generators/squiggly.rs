use rand::Rng;

use crate::{
    error::MazeError,
    maze::{CellState, Coord, Grid},
};

/// Randomized depth-first carving.
///
/// A cell is only carved while it touches at most one passage, so every carve
/// attaches exactly one new leaf to the tree grown from `start`. Recursion depth
/// grows with the maze; prefer [`carve_circuit_board`](super::carve_circuit_board)
/// on very large grids.
pub fn carve_squiggly<R: Rng + ?Sized>(
    grid: &mut Grid,
    start: Coord,
    rng: &mut R,
) -> Result<(), MazeError> {
    carve(grid, start, rng)
}

fn carve<R: Rng + ?Sized>(grid: &mut Grid, coord: Coord, rng: &mut R) -> Result<(), MazeError> {
    if !grid.is_carvable(coord) {
        return Ok(());
    }
    grid.step(coord, CellState::Open)?;

    // Try the remaining walls around this cell in random order. Each one is
    // re-checked on entry since deeper carving may have made it ineligible.
    let mut walls = grid
        .neighbors(coord, |s| s == CellState::Blocked)
        .collect::<Vec<_>>();
    while !walls.is_empty() {
        let next = walls.swap_remove(rng.random_range(0..walls.len()));
        carve(grid, next, rng)?;
    }
    Ok(())
}
