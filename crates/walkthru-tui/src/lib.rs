//! Full-screen terminal presentation of the walkthru demo.

pub mod effects;
pub mod events;
pub mod layout;
pub mod palette;
pub mod render;
pub mod runtime;
pub mod scene;
pub mod state;
pub mod terminal;
pub mod text;
pub mod update;

use std::io::{IsTerminal, Write, stderr, stdout};

use anyhow::Result;
pub use runtime::TuiRuntime;
pub use state::{AppState, SessionOptions, View};

/// Runs the interactive demo until the user quits.
pub fn run_interactive(options: SessionOptions) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The interactive demo requires a terminal.\n\
             Use `walkthru play` for headless playback."
        );
    }

    // Print pre-TUI info to stderr (will be replaced by alternate screen)
    let mut err = stderr();
    writeln!(err, "walkthru")?;
    writeln!(err, "Mode: {:?}", options.walkthrough.mode)?;
    writeln!(err, "Theme: {}", options.theme)?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(AppState::new(&options), options.tick)?;
    runtime.run()
}

/// Guesses a light terminal background from `COLORFGBG` ("fg;bg").
pub fn terminal_prefers_light() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .is_some_and(background_is_light)
}

fn background_is_light(colorfgbg: &str) -> bool {
    matches!(colorfgbg.rsplit(';').next(), Some("7" | "15"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_light() {
        assert!(background_is_light("0;15"));
        assert!(background_is_light("0;default;7"));
        assert!(!background_is_light("15;0"));
        assert!(!background_is_light(""));
    }
}
