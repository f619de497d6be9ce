//! Interactive terminal UI.

mod app;
mod input;
mod ui;

use std::io;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use portpatrol_core::{
    PortScanner, PortScannerPort, ProcessKiller, ProcessKillerPort, ProcessRegistry, Settings,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, info};

use app::{App, Effect};

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Run the TUI until the operator quits.
pub async fn run(initial_port: Option<u16>, settings: Settings) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let registry = ProcessRegistry::new(PortScanner::new(&settings));
    let result = run_loop(&mut terminal, initial_port, &settings, &registry, &ProcessKiller::new()).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop<S, K>(
    terminal: &mut Term,
    initial_port: Option<u16>,
    settings: &Settings,
    registry: &ProcessRegistry<S>,
    killer: &K,
) -> Result<()>
where
    S: PortScannerPort,
    K: ProcessKillerPort,
{
    let mut app = App::new(initial_port, settings, terminal.size()?.height);
    terminal.draw(|f| ui::draw(f, &app))?;

    let count = registry.refresh().await;
    info!(count, "initial scan complete");
    app.set_entities(registry.snapshot());

    let tick_rate = settings.tick_rate();
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(app.poll_timeout(Instant::now(), tick_rate))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(intent) = input::map_key(app.view().view_mode, key) {
                        let effect = app.apply(intent);
                        if effect == Effect::Refresh {
                            app.begin_refresh(Instant::now());
                            terminal.draw(|f| ui::draw(f, &app))?;
                        }
                        perform(effect, &mut app, registry, killer).await;
                    }
                }
                Event::Resize(_, height) => app.resize(height),
                _ => {}
            }
        }

        if app.should_quit() {
            break;
        }

        if app.tick(Instant::now()) {
            debug!("delayed refresh after kill");
            registry.refresh().await;
            app.set_entities(registry.snapshot());
        }
    }

    Ok(())
}

async fn perform<S, K>(effect: Effect, app: &mut App, registry: &ProcessRegistry<S>, killer: &K)
where
    S: PortScannerPort,
    K: ProcessKillerPort,
{
    match effect {
        Effect::None | Effect::Quit => {}
        Effect::Refresh => {
            registry.refresh().await;
            app.refresh_finished(registry.snapshot(), Instant::now());
        }
        Effect::Kill(request) => {
            info!(pid = request.pid, port = request.port, force = request.force, "killing process");
            let result = killer.kill(request.pid, request.force).await;
            app.kill_finished(request, result, Instant::now());
        }
        Effect::Inspect { pid } => {
            let details = registry.describe(pid).await;
            app.set_details(pid, details);
        }
    }
}
