use rand::{Rng, SeedableRng, rngs::StdRng};

mod circuit_board;
mod squiggly;

pub use circuit_board::carve_circuit_board;
pub use squiggly::carve_squiggly;

use crate::{
    error::MazeError,
    maze::{CellState, Coord, Direction, Grid},
};

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generator {
    /// Randomized depth-first carving with many short winding branches.
    Squiggly,
    /// Randomized run-length carving with long straight corridors.
    CircuitBoard,
}

impl Generator {
    pub const ALL: [Generator; 2] = [Generator::Squiggly, Generator::CircuitBoard];
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::Squiggly => write!(f, "Squiggly (randomized depth-first)"),
            Generator::CircuitBoard => write!(f, "Circuit board (randomized runs)"),
        }
    }
}

/// Side length above which squiggly recursion gets too deep to be worth the risk.
const SQUIGGLY_MAX_SIDE: u16 = 200;

/// Choose a generator the way the interactive shell does: large grids always get
/// the circuit board, otherwise a fair coin decides.
pub fn pick_generator<R: Rng + ?Sized>(rows: u16, cols: u16, rng: &mut R) -> Generator {
    if rows > SQUIGGLY_MAX_SIDE || cols > SQUIGGLY_MAX_SIDE || rng.random_bool(0.5) {
        Generator::CircuitBoard
    } else {
        Generator::Squiggly
    }
}

/// Uniformly random interior cell.
pub fn random_interior_cell<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Coord {
    (
        rng.random_range(1..grid.rows() - 1),
        rng.random_range(1..grid.cols() - 1),
    )
}

/// Directions from `coord` whose neighbor may be carved without closing a loop.
fn carvable_directions(grid: &Grid, coord: Coord) -> Vec<Direction> {
    Direction::NEIGHBOR_ORDER
        .into_iter()
        .filter(|dir| grid.is_carvable(dir.step(coord)))
        .collect()
}

/// Carve a perfect maze into `grid` starting at `start`.
///
/// A grid that already holds passages is cleared first. Returns the number of
/// carved cells.
pub fn generate_maze(
    grid: &mut Grid,
    generator: Generator,
    start: Coord,
    seed: Option<u64>,
) -> Result<usize, MazeError> {
    if !grid.in_bounds(start) {
        return Err(MazeError::OutOfBounds(start));
    }
    if grid.has_passages() {
        tracing::debug!("clearing previous maze before carving");
        grid.clear();
    }

    let mut rng = get_rng(seed);
    tracing::info!(%generator, ?start, rows = grid.rows(), cols = grid.cols(), "carving maze");
    match generator {
        Generator::Squiggly => carve_squiggly(grid, start, &mut rng)?,
        Generator::CircuitBoard => carve_circuit_board(grid, start, &mut rng)?,
    }

    let carved = grid.count(CellState::Open);
    tracing::info!(carved, "maze carved");
    Ok(carved)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::maze::{CancelFlag, GridEvent};
    use std::collections::{HashSet, VecDeque};
    use std::sync::mpsc;

    /// Passages must form a spanning tree: one connected component with
    /// exactly `n - 1` adjacency edges.
    pub(crate) fn assert_perfect(grid: &Grid) {
        let passages = grid
            .interior()
            .filter(|&c| grid[c].is_passage())
            .collect::<Vec<_>>();
        assert!(!passages.is_empty(), "no passages carved");

        let edges = passages
            .iter()
            .map(|&c| {
                [Direction::South, Direction::East]
                    .into_iter()
                    .filter(|dir| {
                        let n = dir.step(c);
                        grid.in_bounds(n) && grid[n].is_passage()
                    })
                    .count()
            })
            .sum::<usize>();
        assert_eq!(edges, passages.len() - 1, "passages contain a cycle");

        let mut seen = HashSet::from([passages[0]]);
        let mut queue = VecDeque::from([passages[0]]);
        while let Some(c) = queue.pop_front() {
            for n in grid.neighbors(c, CellState::is_passage) {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        assert_eq!(seen.len(), passages.len(), "passages are disconnected");
    }

    /// No wall is left that could still be carved: every Blocked interior cell
    /// touches either no passage or at least two.
    pub(crate) fn assert_filled(grid: &Grid) {
        let leftover = grid
            .interior()
            .filter(|&c| grid[c] == CellState::Blocked && grid.open_neighbor_count(c) == 1)
            .collect::<Vec<_>>();
        assert!(leftover.is_empty(), "carvable walls left: {leftover:?}");
    }

    #[test]
    fn test_generators_carve_perfect_mazes() {
        for generator in Generator::ALL {
            for seed in 0..8 {
                let mut grid = Grid::new(23, 31).unwrap();
                let mut rng = get_rng(Some(seed));
                let start = random_interior_cell(&grid, &mut rng);
                let carved = generate_maze(&mut grid, generator, start, Some(seed)).unwrap();
                assert!(carved > 1, "{generator} carved only {carved} cells");
                assert_eq!(grid[start], CellState::Open);
                assert_perfect(&grid);
                assert_filled(&grid);
            }
        }
    }

    #[test]
    fn test_single_interior_cell() {
        for generator in Generator::ALL {
            let mut grid = Grid::new(3, 3).unwrap();
            assert_eq!(generate_maze(&mut grid, generator, (1, 1), Some(7)), Ok(1));
            assert_eq!(grid.coords_in_state(CellState::Open), vec![(1, 1)]);
        }
    }

    #[test]
    fn test_same_seed_same_maze() {
        for generator in Generator::ALL {
            let mut a = Grid::new(25, 25).unwrap();
            let mut b = Grid::new(25, 25).unwrap();
            generate_maze(&mut a, generator, (5, 7), Some(42)).unwrap();
            generate_maze(&mut b, generator, (5, 7), Some(42)).unwrap();
            assert_eq!(
                a.coords_in_state(CellState::Open),
                b.coords_in_state(CellState::Open)
            );
        }
    }

    #[test]
    fn test_regenerate_clears_previous_maze() {
        let mut grid = Grid::new(15, 15).unwrap();
        generate_maze(&mut grid, Generator::Squiggly, (1, 1), Some(1)).unwrap();
        grid.set((1, 1), CellState::Visiting);
        generate_maze(&mut grid, Generator::CircuitBoard, (13, 13), Some(2)).unwrap();
        assert_eq!(grid.count(CellState::Visiting), 0);
        assert_eq!(grid[(13, 13)], CellState::Open);
        assert_perfect(&grid);
    }

    #[test]
    fn test_rejects_start_on_border() {
        let mut grid = Grid::new(9, 9).unwrap();
        assert_eq!(
            generate_maze(&mut grid, Generator::Squiggly, (0, 4), None),
            Err(MazeError::OutOfBounds((0, 4)))
        );
        assert!(!grid.has_passages());
    }

    #[test]
    fn test_every_carve_is_reported() {
        let (tx, rx) = mpsc::channel();
        let mut grid = Grid::with_sink(17, 17, Box::new(tx)).unwrap();
        let carved = generate_maze(&mut grid, Generator::CircuitBoard, (8, 8), Some(3)).unwrap();
        let opened = rx
            .try_iter()
            .filter(|e| {
                matches!(
                    e,
                    GridEvent::Update {
                        new: CellState::Open,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(opened, carved);
    }

    #[test]
    fn test_cancelled_generation_stops_early() {
        for generator in Generator::ALL {
            let mut grid = Grid::new(31, 31).unwrap();
            let flag = CancelFlag::new();
            flag.cancel();
            grid.set_cancel_flag(flag);
            assert_eq!(
                generate_maze(&mut grid, generator, (15, 15), Some(9)),
                Err(MazeError::Cancelled)
            );
            assert_eq!(grid.count(CellState::Open), 1);
        }
    }

    #[test]
    fn test_pick_generator_prefers_circuit_board_for_large_grids() {
        let mut rng = get_rng(Some(0));
        for _ in 0..20 {
            assert_eq!(
                pick_generator(201, 50, &mut rng),
                Generator::CircuitBoard
            );
        }
        let picks = (0..200)
            .map(|_| pick_generator(50, 50, &mut rng))
            .collect::<HashSet<_>>();
        assert_eq!(picks.len(), 2);
    }

    #[test]
    fn test_random_interior_cell_in_bounds() {
        let grid = Grid::new(4, 9).unwrap();
        let mut rng = get_rng(Some(5));
        for _ in 0..100 {
            assert!(grid.in_bounds(random_interior_cell(&grid, &mut rng)));
        }
    }
}
