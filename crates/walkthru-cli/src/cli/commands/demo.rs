//! Interactive demo handler.

use anyhow::Result;
use walkthru_core::config::Config;

use crate::cli::Session;
use crate::modes;

pub fn run(session: &Session, config: &Config) -> Result<()> {
    modes::run_interactive(modes::SessionOptions {
        walkthrough: session.walkthrough,
        theme: session.theme,
        speed: session.speed,
        tick: session.tick,
        mirror_loop: config.playback.auto_loop,
    })
}
