//! Entering and leaving the demo's full-screen terminal.
//!
//! The screen is handed back on quit (runtime drop) and on panic. Restoring
//! only undoes what `setup_terminal` actually did, so a panic before setup
//! leaves the shell's terminal alone.

use std::io::{self, Stdout};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Set while the demo owns the screen.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Switches to raw mode on the alternate screen with the cursor hidden.
///
/// Install the panic hook first so a crash mid-demo still restores the shell.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("walkthru could not switch the terminal to raw mode")?;
    ACTIVE.store(true, Ordering::SeqCst);

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)
        .context("walkthru could not open the alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("walkthru could not start drawing")
}

/// Gives the screen back to the shell. Later calls are no-ops.
pub fn restore_terminal() -> Result<()> {
    if !ACTIVE.swap(false, Ordering::SeqCst) {
        return Ok(());
    }
    execute!(io::stdout(), Show, LeaveAlternateScreen)
        .context("walkthru could not leave the alternate screen")?;
    disable_raw_mode().context("walkthru could not leave raw mode")
}

/// Restores the shell before the default hook prints the panic message.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        previous(info);
    }));
}
