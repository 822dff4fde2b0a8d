use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc::{Sender, SyncSender},
};

use super::{Coord, Direction, cell::CellState};
use crate::error::MazeError;

/// Change notification sent to the attached [`EventSink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridEvent {
    /// A sink was attached to a fresh all-blocked grid of this size.
    Initial { rows: u16, cols: u16 },
    /// A cell changed state.
    Update {
        coord: Coord,
        old: CellState,
        new: CellState,
    },
}

/// Kind of algorithm step that just happened, handed to [`EventSink::pace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Reset,
    Carve,
    Visit,
    Backtrack,
    Trace,
}

impl From<CellState> for StepKind {
    fn from(state: CellState) -> Self {
        match state {
            CellState::Blocked => StepKind::Reset,
            CellState::Open => StepKind::Carve,
            CellState::Visiting => StepKind::Visit,
            CellState::Backtrack => StepKind::Backtrack,
            CellState::Path => StepKind::Trace,
        }
    }
}

/// Receives every cell state change made by the generators and solvers.
/// This is the only channel through which rendering or animation sees the grid.
pub trait EventSink: Send {
    fn on_cell_state_changed(&mut self, event: &GridEvent);

    /// Called after each algorithm step. Sinks may block here to throttle the run.
    fn pace(&mut self, _kind: StepKind) {}
}

// A dropped receiver only means nobody is watching any more.
impl EventSink for Sender<GridEvent> {
    fn on_cell_state_changed(&mut self, event: &GridEvent) {
        let _ = self.send(*event);
    }
}

impl EventSink for SyncSender<GridEvent> {
    fn on_cell_state_changed(&mut self, event: &GridEvent) {
        let _ = self.send(*event);
    }
}

/// Shared abort signal checked by the algorithms between steps.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// `rows x cols` cell matrix whose outermost ring is a permanent wall.
pub struct Grid {
    data: Box<[CellState]>,
    rows: u16,
    cols: u16,
    sink: Option<Box<dyn EventSink>>,
    cancel: Option<CancelFlag>,
}

impl Grid {
    /// Creates an all-blocked grid. Both dimensions include the border and must be at least 3.
    pub fn new(rows: u16, cols: u16) -> Result<Self, MazeError> {
        if rows < 3 || cols < 3 {
            return Err(MazeError::InvalidDimensions { rows, cols });
        }
        let data = vec![CellState::Blocked; rows as usize * cols as usize].into_boxed_slice();
        Ok(Grid {
            data,
            rows,
            cols,
            sink: None,
            cancel: None,
        })
    }

    /// Same as [`Grid::new`], reporting every change to `sink`.
    pub fn with_sink(rows: u16, cols: u16, mut sink: Box<dyn EventSink>) -> Result<Self, MazeError> {
        let mut grid = Grid::new(rows, cols)?;
        sink.on_cell_state_changed(&GridEvent::Initial { rows, cols });
        grid.sink = Some(sink);
        Ok(grid)
    }

    pub fn set_cancel_flag(&mut self, flag: CancelFlag) {
        self.cancel = Some(flag);
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Total cell count, border included.
    pub fn area(&self) -> usize {
        self.data.len()
    }

    /// True iff `coord` lies strictly inside the border.
    pub fn in_bounds(&self, (row, col): Coord) -> bool {
        row > 0 && col > 0 && row < self.rows - 1 && col < self.cols - 1
    }

    pub(crate) fn ravel_index(&self, (row, col): Coord) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    pub(crate) fn unravel_index(&self, idx: usize) -> Coord {
        let cols = self.cols as usize;
        ((idx / cols) as u16, (idx % cols) as u16)
    }

    /// Sets an interior cell and notifies the sink. Returns whether the state changed.
    pub(crate) fn set(&mut self, coord: Coord, state: CellState) -> bool {
        debug_assert!(self.in_bounds(coord), "border cell {coord:?} is never written");
        let idx = self.ravel_index(coord);
        let old = self.data[idx];
        if old == state {
            return false;
        }
        self.data[idx] = state;
        if let Some(sink) = self.sink.as_mut() {
            sink.on_cell_state_changed(&GridEvent::Update {
                coord,
                old,
                new: state,
            });
        }
        true
    }

    /// One algorithm step: set the cell, let the sink pace, then honour cancellation.
    /// The border is never written.
    pub fn step(&mut self, coord: Coord, state: CellState) -> Result<(), MazeError> {
        if !self.in_bounds(coord) {
            return Err(MazeError::OutOfBounds(coord));
        }
        if self.set(coord, state) {
            if let Some(sink) = self.sink.as_mut() {
                sink.pace(StepKind::from(state));
            }
        }
        self.check_cancelled()
    }

    pub fn check_cancelled(&self) -> Result<(), MazeError> {
        match &self.cancel {
            Some(flag) if flag.is_cancelled() => Err(MazeError::Cancelled),
            _ => Ok(()),
        }
    }

    /// In-bounds cardinal neighbors of `coord` satisfying `predicate`, in
    /// [`Direction::NEIGHBOR_ORDER`] (south, north, east, west).
    pub fn neighbors<F>(&self, coord: Coord, predicate: F) -> impl Iterator<Item = Coord> + '_
    where
        F: Fn(CellState) -> bool + 'static,
    {
        self.neighbors_in(Direction::NEIGHBOR_ORDER, coord, predicate)
    }

    /// Like [`Grid::neighbors`] with an explicit direction order.
    pub fn neighbors_in<F>(
        &self,
        order: [Direction; 4],
        coord: Coord,
        predicate: F,
    ) -> impl Iterator<Item = Coord> + '_
    where
        F: Fn(CellState) -> bool + 'static,
    {
        order
            .into_iter()
            .map(move |dir| dir.step(coord))
            .filter(move |&c| self.in_bounds(c) && predicate(self[c]))
    }

    /// Number of passage cells touching `coord`.
    pub fn open_neighbor_count(&self, coord: Coord) -> usize {
        self.neighbors(coord, CellState::is_passage).count()
    }

    /// Blocked cell that may be carved without closing a loop: in bounds,
    /// still a wall, and touching at most one passage.
    pub fn is_carvable(&self, coord: Coord) -> bool {
        self.in_bounds(coord)
            && self[coord] == CellState::Blocked
            && self.open_neighbor_count(coord) <= 1
    }

    /// Every interior coordinate, row by row.
    pub fn interior(&self) -> impl Iterator<Item = Coord> + '_ {
        (1..self.rows - 1).flat_map(move |row| (1..self.cols - 1).map(move |col| (row, col)))
    }

    pub fn count(&self, state: CellState) -> usize {
        self.data.iter().filter(|&&s| s == state).count()
    }

    pub fn coords_in_state(&self, state: CellState) -> Vec<Coord> {
        self.interior().filter(|&c| self[c] == state).collect()
    }

    pub fn has_passages(&self) -> bool {
        self.data.iter().any(|s| s.is_passage())
    }

    /// Turns every passage back into a wall. Fresh grids do not need this.
    pub fn clear(&mut self) {
        for idx in 0..self.data.len() {
            if self.data[idx].is_passage() {
                let coord = self.unravel_index(idx);
                self.set(coord, CellState::Blocked);
            }
        }
    }

    /// Wipes solver marks so the carved maze can be solved again.
    pub fn reset_solution(&mut self) {
        for idx in 0..self.data.len() {
            if self.data[idx].is_solve_mark() {
                let coord = self.unravel_index(idx);
                self.set(coord, CellState::Open);
            }
        }
    }
}

impl std::ops::Index<Coord> for Grid {
    type Output = CellState;

    fn index(&self, coord: Coord) -> &Self::Output {
        &self.data[self.ravel_index(coord)]
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("passages", &self.data.iter().filter(|s| s.is_passage()).count())
            .finish()
    }
}
