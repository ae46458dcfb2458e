//! Runtime execution modes.
//!
//! - `play`: Headless playback driven by a tokio interval
//! - `tui`: Full-screen interactive terminal UI (optional feature)

pub mod play;

#[cfg(feature = "tui")]
pub use walkthru_tui::{SessionOptions, run_interactive, terminal_prefers_light};

#[cfg(not(feature = "tui"))]
pub use self::headless::*;

#[cfg(not(feature = "tui"))]
mod headless {
    use std::time::Duration;

    use walkthru_core::WalkthroughOptions;
    use walkthru_core::host::Theme;

    pub struct SessionOptions {
        pub walkthrough: WalkthroughOptions,
        pub theme: Theme,
        pub speed: f64,
        pub tick: Duration,
        pub mirror_loop: bool,
    }

    pub fn run_interactive(_options: SessionOptions) -> anyhow::Result<()> {
        anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
    }

    pub fn terminal_prefers_light() -> bool {
        false
    }
}
