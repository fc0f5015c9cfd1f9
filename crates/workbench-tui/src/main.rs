mod actions;
mod app;
mod ui;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::actions::{describe_error, execute_action};
use crate::app::App;
use workbench_client::{HttpTransport, InteractionsClient, InteractionsView, QueryState, Transport};
use workbench_core::query::validate_page_size;

#[derive(Debug, Parser)]
#[command(name = "workbench-tui", version, about = "customer interactions workbench TUI")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = workbench_config::load(args.config)
        .with_context(|| "load config")?
        .with_base_url(args.base_url.as_deref())?;
    let page_size = match args.page_size {
        Some(size) => validate_page_size(size)?,
        None => config.list.page_size,
    };

    let transport = HttpTransport::new(
        config.api.base_url.clone(),
        config.api.timeout,
        &config.api.user_agent,
    )
    .with_context(|| "build http client")?;
    let mut view = InteractionsView::new(
        InteractionsClient::new(transport),
        &config.list.filters,
        page_size,
    );
    let mut app = App::new(view.query().clone());

    let mut terminal = TerminalGuard::new()?;
    run_app(&mut terminal, &mut view, &mut app)
}

fn run_app<T: Transport>(
    terminal: &mut TerminalGuard,
    view: &mut InteractionsView<T>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        while let Some(action) = app.next_action() {
            let mut redraw = |app: &App, state: &QueryState| -> Result<()> {
                terminal
                    .terminal_mut()
                    .draw(|frame| ui::draw(frame, app, state))?;
                Ok(())
            };
            if let Err(err) = execute_action(app, view, action, &mut redraw) {
                app.fail(describe_error(&err));
            }
        }

        terminal
            .terminal_mut()
            .draw(|frame| ui::draw(frame, app, view.state()))?;

        if app.should_quit {
            break;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    Ok(())
}

struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore_terminal();
            original_hook(info);
        }));
        Ok(Self { terminal })
    }

    fn terminal_mut(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = restore_terminal();
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
