use std::{
    io::{Stdout, Write},
    sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError},
    time::Duration,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Color, StyledContent, Stylize},
    terminal::{self, ClearType},
};

use super::UserActionEvent;
use crate::maze::{CellState, GridEvent};

pub enum RendererStatus {
    Completed,
    Cancelled,
}

/// Terminal side of the event stream: maps cell states to colours and animates updates.
pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    /// Current grid dimensions (rows, cols)
    grid_dims: Option<(u16, u16)>,
    /// Pause after each drawn update
    step_delay: Duration,
    /// How long to wait on a channel before re-checking user actions
    poll_timeout: Duration,
    /// Number of cell updates drawn so far
    updates_drawn: usize,
}

impl Renderer {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;
    /// Rows reserved below the grid for the status line.
    pub const NUM_STATUS_ROWS: u16 = 2;
    const MAX_STEP_DELAY: Duration = Duration::from_millis(500);

    pub fn new(step_delay: Duration, poll_timeout: Duration) -> Self {
        Self {
            stdout: std::io::stdout(),
            grid_dims: None,
            step_delay,
            poll_timeout,
            updates_drawn: 0,
        }
    }

    fn symbol(state: CellState) -> StyledContent<&'static str> {
        let styled_symbol = match state {
            CellState::Blocked => "██".with(Color::DarkGrey),
            CellState::Open => "  ".with(Color::Reset),
            CellState::Visiting => "██".with(Color::DarkYellow),
            CellState::Backtrack => "██".with(Color::Red),
            CellState::Path => "██".with(Color::Yellow),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Renderer::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        styled_symbol
    }

    /// Halve or double the step delay, staying within `[0, MAX_STEP_DELAY]`.
    fn adjust_delay(delay: Duration, faster: bool) -> Duration {
        if faster {
            delay / 2
        } else {
            (delay * 2)
                .max(Duration::from_millis(1))
                .min(Self::MAX_STEP_DELAY)
        }
    }

    /// Draw grid events until the sender hangs up or the user cancels.
    pub fn render(
        &mut self,
        grid_event_rx: Receiver<GridEvent>,
        action_rx: Receiver<UserActionEvent>,
    ) -> std::io::Result<RendererStatus> {
        let mut paused = false;
        loop {
            // Apply pending user actions. While paused, block here until resumed.
            loop {
                let action = if paused {
                    match action_rx.recv_timeout(self.poll_timeout) {
                        Ok(action) => action,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => {
                            paused = false;
                            break;
                        }
                    }
                } else {
                    match action_rx.try_recv() {
                        Ok(action) => action,
                        Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                    }
                };
                tracing::debug!(?action, "[renderer] user action");
                match action {
                    UserActionEvent::Pause => paused = true,
                    UserActionEvent::Resume => paused = false,
                    UserActionEvent::SpeedUp => {
                        self.step_delay = Renderer::adjust_delay(self.step_delay, true)
                    }
                    UserActionEvent::SlowDown => {
                        self.step_delay = Renderer::adjust_delay(self.step_delay, false)
                    }
                    UserActionEvent::Cancel => return Ok(RendererStatus::Cancelled),
                }
                self.draw_status(paused)?;
            }

            match grid_event_rx.recv_timeout(self.poll_timeout) {
                Ok(event) => {
                    self.draw_event(event)?;
                    if !self.step_delay.is_zero() {
                        std::thread::sleep(self.step_delay);
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::info!(updates = self.updates_drawn, "[renderer] event stream ended");
                    self.draw_status(false)?;
                    if let Some((rows, _)) = self.grid_dims {
                        queue!(
                            self.stdout,
                            cursor::MoveTo(0, rows + 1),
                            terminal::Clear(ClearType::CurrentLine)
                        )?;
                        self.stdout.flush()?;
                    }
                    return Ok(RendererStatus::Completed);
                }
            }
        }
    }

    fn draw_event(&mut self, event: GridEvent) -> std::io::Result<()> {
        match event {
            GridEvent::Initial { rows, cols } => {
                self.grid_dims = Some((rows, cols));
                self.stdout
                    .queue(terminal::Clear(ClearType::All))?
                    .queue(cursor::MoveTo(0, 0))?;
                for row in 0..rows {
                    self.stdout.queue(cursor::MoveTo(0, row))?;
                    for _ in 0..cols {
                        self.stdout
                            .queue(style::PrintStyledContent(Renderer::symbol(CellState::Blocked)))?;
                    }
                }
                self.draw_status(false)?;
            }
            GridEvent::Update {
                coord: (row, col),
                new,
                ..
            } => {
                self.updates_drawn += 1;
                queue!(
                    self.stdout,
                    cursor::MoveTo(col * Renderer::CELL_WIDTH, row),
                    style::PrintStyledContent(Renderer::symbol(new))
                )?;
            }
        }
        self.stdout.flush()
    }

    fn draw_status(&mut self, paused: bool) -> std::io::Result<()> {
        let Some((rows, _)) = self.grid_dims else {
            return Ok(());
        };
        let state = if paused { "paused" } else { "running" };
        let status = format!(
            "[{state}] delay {:?} | Enter: pause/resume  Up/Down: speed  Esc: exit",
            self.step_delay
        );
        queue!(
            self.stdout,
            cursor::MoveTo(0, rows),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(status.with(Color::Cyan))
        )?;
        self.stdout.flush()
    }
}
