//! Play command handler.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{self, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::Session;
use crate::modes::play::{self, PlayOptions};

pub struct PlayRunOptions<'a> {
    pub session: &'a Session,
    pub json: bool,
    pub loops: u32,
    pub duration: Option<Duration>,
    pub read_stdin: bool,
}

pub async fn run(options: PlayRunOptions<'_>) -> Result<()> {
    let session = options.session;
    let play_options = PlayOptions {
        walkthrough: session.walkthrough,
        theme: session.theme,
        speed: session.speed,
        tick: session.tick,
        json: options.json,
        loops: options.loops,
        duration: options.duration,
    };

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("ctrl-c received");
                cancel.cancel();
            }
        })
    };

    let input = options.read_stdin.then(|| BufReader::new(io::stdin()));
    let mut stdout = io::stdout();
    let result = play::run_play(play_options, input, &mut stdout, cancel)
        .await
        .context("play walkthrough");

    ctrl_c.abort();
    result.map(|_| ())
}
