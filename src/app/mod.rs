mod renderer;

use std::{
    io::{Stdout, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Sender},
    },
    time::Duration,
};

use crossterm::{
    ExecutableCommand, QueueableCommand, cursor,
    event::{self, KeyCode},
    queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};
use rand::seq::IndexedRandom;

use crate::{
    app::renderer::{Renderer, RendererStatus},
    error::MazeError,
    generators::{Generator, generate_maze, get_rng, pick_generator, random_interior_cell},
    maze::{CancelFlag, CellState, Grid, GridEvent},
    solvers::{Solver, solve_maze},
};

#[derive(Debug)]
enum UserActionEvent {
    Pause,
    Resume,
    SpeedUp,
    SlowDown,
    Cancel,
}

/// Generator menu entry. `Random` defers to [`pick_generator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeneratorChoice {
    Fixed(Generator),
    Random,
}

impl std::fmt::Display for GeneratorChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeneratorChoice::Fixed(generator) => write!(f, "{generator}"),
            GeneratorChoice::Random => write!(f, "Random (circuit board on large grids)"),
        }
    }
}

/// Settings for the terminal driver.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Grid rows including the border
    pub rows: u16,
    /// Grid columns including the border
    pub cols: u16,
    /// Seed for carving and endpoint selection. `None` uses OS entropy.
    pub seed: Option<u64>,
    /// Initial pause between rendered cell updates
    pub step_delay: Duration,
    /// How often the input and render threads check their flags
    pub poll_timeout: Duration,
    /// Maximum number of grid events buffered between compute and render threads
    pub channel_buffer: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rows: 41,
            cols: 41,
            seed: None,
            step_delay: Duration::from_millis(2),
            poll_timeout: Duration::from_millis(100),
            channel_buffer: 1000,
        }
    }
}

impl AppConfig {
    /// Reads positional `[rows] [cols] [seed]`. Missing or unparsable values keep their defaults.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let mut config = Self::default();
        let mut args = args.into_iter();
        if let Some(rows) = args.next().and_then(|s| s.parse::<u16>().ok()) {
            config.rows = rows.max(3);
        }
        if let Some(cols) = args.next().and_then(|s| s.parse::<u16>().ok()) {
            config.cols = cols.max(3);
        }
        config.seed = args.next().and_then(|s| s.parse::<u64>().ok());
        config
    }

    /// Shrinks the grid so it fits a terminal of the given size.
    pub fn fit_terminal(&mut self, term_width: u16, term_height: u16) {
        let max_cols = (term_width / Renderer::CELL_WIDTH).max(3);
        let max_rows = term_height.saturating_sub(Renderer::NUM_STATUS_ROWS).max(3);
        self.cols = self.cols.min(max_cols);
        self.rows = self.rows.min(max_rows);
    }
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    /// even if the panic occurs in a different thread
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Pick the algorithms, then carve and solve one maze while the renderer animates it.
    pub fn run(&self, stdout: &mut Stdout) -> std::io::Result<()> {
        let mut config = self.config.clone();
        if let Ok((term_width, term_height)) = terminal::size() {
            config.fit_terminal(term_width, term_height);
        }
        tracing::info!(rows = config.rows, cols = config.cols, seed = ?config.seed, "starting");

        let choices = [
            GeneratorChoice::Fixed(Generator::Squiggly),
            GeneratorChoice::Fixed(Generator::CircuitBoard),
            GeneratorChoice::Random,
        ];
        let Some(choice) = App::select_from_menu(
            stdout,
            "Select maze generation algorithm (use arrow keys and Enter, or Esc to exit):",
            &choices,
        )?
        else {
            return Ok(());
        };

        let Some(solver) = App::select_from_menu(
            stdout,
            "Select maze solving algorithm (use arrow keys and Enter, or Esc to exit):",
            &Solver::ALL,
        )?
        else {
            return Ok(());
        };

        let cancel = CancelFlag::new();
        let render_done = Arc::new(AtomicBool::new(false));

        let (action_tx, action_rx) = mpsc::channel::<UserActionEvent>();
        let input_thread_handle = {
            let cancel = cancel.clone();
            let render_done = render_done.clone();
            let poll_timeout = config.poll_timeout;
            std::thread::spawn(move || -> std::io::Result<()> {
                App::listen_to_user_input(action_tx, poll_timeout, &render_done, &cancel)
            })
        };

        let (grid_event_tx, grid_event_rx) =
            mpsc::sync_channel::<GridEvent>(config.channel_buffer);
        let render_thread_handle = {
            let render_done = render_done.clone();
            let mut renderer = Renderer::new(config.step_delay, config.poll_timeout);
            std::thread::spawn(move || {
                let status = renderer.render(grid_event_rx, action_rx);
                render_done.store(true, Ordering::Relaxed);
                status
            })
        };

        // Squiggly carving and recursive solving recurse once per cell.
        let stack_size = 64 * 1024 * 1024;
        let compute_thread_handle = {
            let config = config.clone();
            let cancel = cancel.clone();
            std::thread::Builder::new()
                .name("compute".into())
                .stack_size(stack_size)
                .spawn(move || App::compute(&config, choice, solver, grid_event_tx, cancel))?
        };

        let outcome = match compute_thread_handle.join() {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!("compute thread panicked");
                cancel.cancel();
                Err(MazeError::Cancelled)
            }
        };

        let status = match render_thread_handle.join() {
            Ok(status) => status?,
            Err(_) => {
                tracing::error!("render thread panicked");
                RendererStatus::Cancelled
            }
        };
        let _ = input_thread_handle.join();

        if let RendererStatus::Cancelled = status {
            tracing::info!("rendering was cancelled by user");
            return Ok(());
        }

        let msg = match &outcome {
            Ok(true) => "Path found! ".to_string(),
            Ok(false) => "No path found. ".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "run failed");
                format!("Run failed: {e}. ")
            }
        };
        stdout.execute(style::PrintStyledContent(
            msg.with(Color::Green).attribute(Attribute::Bold),
        ))?;
        stdout.execute(style::PrintStyledContent(
            "Press Esc to exit...\r\n"
                .with(Color::Blue)
                .attribute(Attribute::Bold),
        ))?;
        App::wait_for_esc()?;
        Ok(())
    }

    /// Carve and solve one maze, streaming every cell change to the renderer.
    /// Returns whether the end was reached.
    fn compute(
        config: &AppConfig,
        choice: GeneratorChoice,
        solver: Solver,
        grid_event_tx: mpsc::SyncSender<GridEvent>,
        cancel: CancelFlag,
    ) -> Result<bool, MazeError> {
        let mut grid = Grid::with_sink(config.rows, config.cols, Box::new(grid_event_tx))?;
        grid.set_cancel_flag(cancel);

        let mut rng = get_rng(config.seed);
        let generator = match choice {
            GeneratorChoice::Fixed(generator) => generator,
            GeneratorChoice::Random => pick_generator(grid.rows(), grid.cols(), &mut rng),
        };
        let start = random_interior_cell(&grid, &mut rng);
        generate_maze(&mut grid, generator, start, config.seed)?;

        // Endpoint selection by clicking is not available here; pick two passages.
        let passages = grid.coords_in_state(CellState::Open);
        let endpoints = passages
            .choose_multiple(&mut rng, 2)
            .copied()
            .collect::<Vec<_>>();
        let &[from, to] = endpoints.as_slice() else {
            tracing::info!("maze has a single passage, nothing to solve");
            return Ok(false);
        };
        solve_maze(&mut grid, solver, from, to)
        // Grid is dropped here, as well as the grid_event_tx sender
    }

    /// Listen for key presses and forward them to the renderer.
    /// Esc also raises the cancel flag so the compute thread stops at its next step.
    fn listen_to_user_input(
        action_tx: Sender<UserActionEvent>,
        poll_timeout: Duration,
        render_done: &AtomicBool,
        cancel: &CancelFlag,
    ) -> std::io::Result<()> {
        let mut is_paused = false;
        loop {
            if render_done.load(Ordering::Relaxed) || cancel.is_cancelled() {
                return Ok(());
            }
            if !event::poll(poll_timeout)? {
                continue;
            }
            let event::Event::Key(key_event) = event::read()? else {
                continue;
            };
            if key_event.kind != event::KeyEventKind::Press {
                continue;
            }
            let action = match key_event.code {
                KeyCode::Esc => {
                    tracing::debug!("[input loop] Esc key pressed, cancelling");
                    cancel.cancel();
                    UserActionEvent::Cancel
                }
                KeyCode::Enter => {
                    is_paused = !is_paused;
                    if is_paused {
                        UserActionEvent::Pause
                    } else {
                        UserActionEvent::Resume
                    }
                }
                KeyCode::Up => UserActionEvent::SpeedUp,
                KeyCode::Down => UserActionEvent::SlowDown,
                _ => continue,
            };
            if action_tx.send(action).is_err() {
                // Renderer has exited
                return Ok(());
            }
        }
    }

    /// Wait for the user to press the Esc key
    /// This function blocks until Esc is pressed
    fn wait_for_esc() -> std::io::Result<()> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if code == KeyCode::Esc && kind == event::KeyEventKind::Press {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Present a menu of options to the user and let them select one using arrow keys
    /// Returns None if user cancels input with Esc
    fn select_from_menu<T: std::fmt::Display + Copy>(
        stdout: &mut Stdout,
        prompt: &str,
        options: &[T],
    ) -> std::io::Result<Option<T>> {
        if options.is_empty() {
            return Ok(None);
        }

        queue!(stdout, cursor::Hide, cursor::SavePosition)?;
        let mut selected = 0;

        let selected_option = loop {
            queue!(
                stdout,
                cursor::RestorePosition,
                terminal::Clear(ClearType::FromCursorDown)
            )?;
            stdout.queue(style::PrintStyledContent(prompt.with(Color::Yellow)))?;
            for (i, option) in options.iter().enumerate() {
                if i == selected {
                    stdout.queue(style::SetAttribute(Attribute::Reverse))?;
                }
                stdout.queue(style::Print(format!("\r\n{}", option)))?;
                if i == selected {
                    stdout.queue(style::SetAttribute(Attribute::NoReverse))?;
                }
            }
            stdout.queue(style::Print("\r\n"))?;
            stdout.flush()?;

            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if kind != event::KeyEventKind::Press {
                    continue;
                }
                match code {
                    KeyCode::Up => {
                        selected = match selected {
                            0 => options.len() - 1,
                            _ => selected - 1,
                        };
                    }
                    KeyCode::Down => {
                        selected = (selected + 1) % options.len();
                    }
                    KeyCode::Enter => break Some(options[selected]),
                    KeyCode::Esc => break None,
                    _ => {}
                }
            }
        };

        queue!(
            stdout,
            cursor::RestorePosition,
            terminal::Clear(ClearType::FromCursorDown),
            cursor::Show
        )?;
        stdout.flush()?;

        Ok(selected_option)
    }
}
