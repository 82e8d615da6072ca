//! Terminal lifecycle.
//!
//! `ratatui::try_init` switches to raw mode and the alternate screen and
//! chains a panic hook that restores the terminal before the report prints.
//! Dropping [`Tui`] restores it on every other exit path.

use color_eyre::eyre::Result;
use ratatui::{DefaultTerminal, Frame};

pub struct Tui {
    terminal: DefaultTerminal,
}

impl Tui {
    pub fn enter() -> Result<Self> {
        let mut terminal = ratatui::try_init()?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(Self { terminal })
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        ratatui::restore();
    }
}

/// Install color-eyre's report and panic hooks. Must run before
/// [`Tui::enter`] so the terminal-restoring hook wraps them.
pub fn install_hooks() -> Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .install()
}
