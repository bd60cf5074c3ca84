/// Main TUI application

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::{DashboardFrame, HostTransport, Orchestrator, OverseerConfig, Renderer};
use crate::screens;

/// Renderer that owns the real terminal for the lifetime of the dashboard
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    version: &'static str,
    restored: bool,
}

impl TerminalRenderer {
    pub fn new(version: &'static str) -> Result<Self> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("Failed to enter alternate screen");
        }

        match Self::open_terminal(stdout) {
            Ok(terminal) => Ok(Self {
                terminal,
                version,
                restored: false,
            }),
            Err(e) => {
                // `Drop` never runs for a renderer that was not built
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                Err(e)
            }
        }
    }

    fn open_terminal<W: io::Write>(writer: W) -> Result<Terminal<CrosstermBackend<W>>> {
        let mut terminal = Terminal::new(CrosstermBackend::new(writer)).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        Ok(terminal)
    }

    /// Restore terminal
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, frame: &DashboardFrame) -> Result<()> {
        let version = self.version;
        self.terminal.draw(|f| screens::draw(f, frame, version))?;
        Ok(())
    }

    fn quit_requested(&mut self) -> Result<bool> {
        // Raw mode swallows SIGINT, so Ctrl+C arrives as a key event
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
                    _ => {}
                }
            }
        }
        Ok(false)
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "failed to restore terminal");
        }
    }
}

/// Run the live dashboard until the user quits
pub async fn run(config: &OverseerConfig, transport: Arc<dyn HostTransport>, version: &'static str) -> Result<()> {
    info!(hosts = config.hosts.len(), user = %config.ssh_user, "starting dashboard");

    let mut renderer = TerminalRenderer::new(version)?;
    let result = Orchestrator::new(config, transport).run(&mut renderer).await;
    renderer.restore()?;

    info!("dashboard stopped");
    result
}
