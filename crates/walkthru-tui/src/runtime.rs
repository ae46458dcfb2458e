//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! This is the "Elm runtime" boundary: all side effects happen here.
//! The reducer stays pure and produces effects; this module executes them.

use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::{render, terminal, update};

/// Full-screen TUI runtime.
///
/// Owns the terminal and state. Terminal state is restored on drop and on
/// panic.
pub struct TuiRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: AppState,
    /// Wall-clock interval between ticks.
    tick: Duration,
    last_tick: Instant,
}

impl TuiRuntime {
    pub fn new(state: AppState, tick: Duration) -> Result<Self> {
        // Set up panic hook BEFORE entering alternate screen
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        Ok(Self {
            terminal,
            state,
            tick,
            last_tick: Instant::now(),
        })
    }

    /// Runs the main event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Layout depends on the size, so it goes first.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(event, UiEvent::Tick { .. } | UiEvent::Terminal(_)) {
                    dirty = true;
                }
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        info!(
            now_ms = self.state.walkthrough.now().as_millis() as u64,
            state = %self.state.walkthrough.state(),
            "session ended"
        );
        Ok(())
    }

    /// Collects terminal input, then a Tick once the interval has elapsed.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        // Block until input arrives or the next tick is due.
        let time_until_tick = self.tick.saturating_sub(self.last_tick.elapsed());
        if event::poll(time_until_tick)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        let elapsed = self.last_tick.elapsed();
        if elapsed >= self.tick {
            events.push(UiEvent::Tick { elapsed });
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::OpenBrowser { url } => {
                if let Err(err) = open::that(&url) {
                    warn!(%url, "failed to open browser: {err}");
                    self.state.notice = Some(format!("Could not open {url}"));
                }
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
