//! What the walkthrough needs from whoever embeds it.
//!
//! The embedding page passes a query string (`?theme=light&mode=auto`) at
//! start and may later push theme changes as JSON messages.

use std::borrow::Cow;
use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::Viewport;
use crate::model::PlaybackMode;
use crate::tooltip::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First value of `key` in a query string. A leading `?` is ignored.
fn query_value<'a>(query: &'a str, key: &str) -> Option<Cow<'a, str>> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v)
}

/// Theme from the `theme` query parameter, else the system preference,
/// else dark.
pub fn read_initial_theme(query: &str, prefers_light: bool) -> Theme {
    if let Some(theme) = query_value(query, "theme").and_then(|v| Theme::parse(&v)) {
        return theme;
    }
    if prefers_light { Theme::Light } else { Theme::Dark }
}

/// `mode=auto` selects auto playback; anything else is guided.
pub fn read_playback_mode(query: &str) -> PlaybackMode {
    match query_value(query, "mode").as_deref() {
        Some("auto") => PlaybackMode::Auto,
        _ => PlaybackMode::Guided,
    }
}

#[derive(Debug, Deserialize)]
struct ThemeMessage {
    #[serde(rename = "type")]
    kind: String,
    theme: Theme,
}

/// Parses a `{"type":"theme-change","theme":"dark"|"light"}` message.
pub fn parse_theme_message(raw: &str) -> Option<Theme> {
    match serde_json::from_str::<ThemeMessage>(raw) {
        Ok(msg) if msg.kind == "theme-change" => Some(msg.theme),
        Ok(msg) => {
            debug!(kind = %msg.kind, "ignoring non-theme message");
            None
        }
        Err(err) => {
            debug!(%err, "ignoring malformed message");
            None
        }
    }
}

/// Handle returned by [`ThemeChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type ThemeCallback = Box<dyn FnMut(Theme) + Send>;

/// Fan-out of theme changes pushed by the embedding page.
#[derive(Default)]
pub struct ThemeChannel {
    next_id: u64,
    subscribers: Vec<(Subscription, ThemeCallback)>,
}

impl fmt::Debug for ThemeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeChannel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ThemeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, callback: F) -> Subscription
    where
        F: FnMut(Theme) + Send + 'static,
    {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `subscription` was not registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription);
        self.subscribers.len() != before
    }

    /// Delivers a raw message to every subscriber. Malformed messages are
    /// dropped without notifying anyone.
    pub fn deliver(&mut self, raw: &str) -> Option<Theme> {
        let theme = parse_theme_message(raw)?;
        for (_, callback) in &mut self.subscribers {
            callback(theme);
        }
        Some(theme)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Presentation-side capabilities.
pub trait Host {
    /// Current size of the visible area.
    fn viewport(&self) -> Viewport;

    /// Bounds of the element tagged with `name`, if it is on screen.
    fn resolve_anchor(&self, name: &str) -> Option<Rect>;

    /// Asks for fullscreen. Callers ignore a denial.
    fn request_fullscreen(&mut self) -> Result<()>;
}
