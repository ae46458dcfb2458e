//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;
use walkthru_core::host::Host;
use walkthru_core::{Act, PlaybackMode, WalkthroughEffect};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::{AppState, View};

/// The main reducer function.
pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    let effects = match event {
        UiEvent::Tick { elapsed } => handle_tick(app, elapsed),
        UiEvent::Frame { width, height } | UiEvent::Terminal(Event::Resize(width, height)) => {
            app.host.width = width;
            app.host.height = height;
            vec![]
        }
        UiEvent::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(app, key)
        }
        UiEvent::Terminal(_) => vec![],
    };
    app.host.sidebar_open = app.walkthrough.snapshot().sidebar_open;
    effects
}

fn handle_tick(app: &mut AppState, elapsed: Duration) -> Vec<UiEffect> {
    app.spinner_frame = app.spinner_frame.wrapping_add(1);
    let delta = app.clock.scale(elapsed);
    if delta.is_zero() {
        return vec![];
    }
    match app.view() {
        View::Editor => {
            let effects = app.walkthrough.advance_by(delta);
            apply_walkthrough_effects(app, effects)
        }
        View::Camera => {
            app.advance_mirror(delta);
            vec![]
        }
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    app.notice = None;
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            return vec![];
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
            return vec![];
        }
        KeyCode::Char('t') => {
            app.theme = app.theme.toggled();
            return vec![];
        }
        KeyCode::Char('f') => {
            if let Err(err) = app.host.request_fullscreen() {
                debug!("fullscreen denied: {err:#}");
            }
            return vec![];
        }
        KeyCode::Char('c') => {
            app.view_override = Some(match app.view() {
                View::Editor => View::Camera,
                View::Camera => View::Editor,
            });
            return vec![];
        }
        KeyCode::Char(' ') => {
            app.clock.paused = !app.clock.paused;
            return vec![];
        }
        KeyCode::Char('+' | '=') => {
            app.clock.faster();
            app.notice = Some(format!("Speed {:.2}\u{d7}", app.clock.speed));
            return vec![];
        }
        KeyCode::Char('-') => {
            app.clock.slower();
            app.notice = Some(format!("Speed {:.2}\u{d7}", app.clock.speed));
            return vec![];
        }
        _ => {}
    }

    match app.view() {
        View::Editor => handle_editor_key(app, key),
        View::Camera => handle_camera_key(app, key),
    }
}

fn handle_editor_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let effects = match key.code {
        KeyCode::Enter if app.walkthrough.mode() == PlaybackMode::Guided => {
            app.walkthrough.tour_cta()
        }
        KeyCode::Char(digit @ '1'..='3') => {
            let index = digit as usize - '1' as usize;
            app.walkthrough.select_act(Act::all()[index])
        }
        KeyCode::Char('a') => app.walkthrough.accept_diffs(),
        KeyCode::Char('i') => app.walkthrough.insert_research(),
        KeyCode::Char('r') => app.walkthrough.replay(),
        KeyCode::Char('s') => app.walkthrough.toggle_sidebar(),
        _ => return vec![],
    };
    apply_walkthrough_effects(app, effects)
}

/// The mirrored instance plays by itself; only the finale link is live.
fn handle_camera_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    match (key.code, app.mirror.director().shot().caption_link) {
        (KeyCode::Enter, Some(url)) => open_link(app, url),
        _ => vec![],
    }
}

fn apply_walkthrough_effects(app: &mut AppState, effects: Vec<WalkthroughEffect>) -> Vec<UiEffect> {
    let mut ui_effects = Vec::new();
    for effect in effects {
        match effect {
            WalkthroughEffect::Snapshot(_) => {}
            WalkthroughEffect::OpenLink(url) => ui_effects.extend(open_link(app, url)),
            WalkthroughEffect::TourFinished => {
                app.notice = Some("Tour complete. Press r to replay.".to_string());
            }
        }
    }
    ui_effects
}

fn open_link(app: &mut AppState, url: &str) -> Vec<UiEffect> {
    app.notice = Some(format!("Opening {url}"));
    vec![UiEffect::OpenBrowser {
        url: url.to_string(),
    }]
}
