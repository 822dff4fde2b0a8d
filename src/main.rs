use mazecarve::app::{App, AppConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Log to a daily file under `logs/`, since the terminal belongs to the renderer.
/// Filter with `RUST_LOG`, default `info`.
fn init_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily("logs", "mazecarve.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    guard
}

fn main() -> std::io::Result<()> {
    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = init_logging();

    let config = AppConfig::from_args(std::env::args().skip(1));
    let app = App::new(config);

    let mut stdout = std::io::stdout();
    App::setup_terminal(&mut stdout)?;
    let result = app.run(&mut stdout);
    App::restore_terminal(&mut stdout)?;
    if let Err(e) = &result {
        tracing::error!(error = %e, "terminal app failed");
    }
    result
}
