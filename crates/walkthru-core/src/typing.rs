//! Character-by-character reveal of a chat prompt.

use std::time::Duration;

use tracing::debug;

use crate::timer::{Epoch, Timer};

/// Emitted when the visible prefix reaches the full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingCompleted {
    pub epoch: Epoch,
}

/// Grows a visible prefix of `text` one character per `speed`, after `start_delay`.
///
/// Completion is reported exactly once per run. Any restart (new text or an
/// explicit `start`) clears the completion flag and bumps the epoch.
#[derive(Debug, Default)]
pub struct TypingSimulator {
    text: String,
    char_count: usize,
    speed: Duration,
    start_delay: Duration,
    revealed: usize,
    started: bool,
    completed: bool,
    running: bool,
    timer: Timer,
    epoch: Epoch,
}

impl TypingSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh run of `text`.
    pub fn start(&mut self, text: &str, speed: Duration, start_delay: Duration, now: Duration) {
        self.text = text.to_string();
        self.char_count = text.chars().count();
        self.speed = speed;
        self.start_delay = start_delay;
        self.restart(now);
    }

    /// Swaps the text being typed.
    ///
    /// A different text resets the counter to zero and replays the delay and
    /// reveal sequence. The same text leaves a running sequence untouched.
    pub fn set_text(&mut self, text: &str, now: Duration) {
        if self.running && self.text == text {
            return;
        }
        self.text = text.to_string();
        self.char_count = text.chars().count();
        self.restart(now);
    }

    /// Cancels the run. No completion fires afterwards.
    pub fn stop(&mut self) {
        if self.running {
            debug!(epoch = self.epoch.0, "typing stopped");
        }
        self.running = false;
        self.started = false;
        self.revealed = 0;
        self.timer.cancel();
        self.epoch = self.epoch.next();
    }

    fn restart(&mut self, now: Duration) {
        self.epoch = self.epoch.next();
        self.revealed = 0;
        self.started = false;
        self.completed = false;
        self.running = true;
        self.timer.arm(now, self.start_delay);
        debug!(epoch = self.epoch.0, chars = self.char_count, "typing started");
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timer.deadline()
    }

    /// Processes the pending step if it is due at `now`.
    pub fn advance(&mut self, now: Duration) -> Option<TypingCompleted> {
        if !self.timer.fire_if_due(now) {
            return None;
        }

        if self.started {
            self.revealed = (self.revealed + 1).min(self.char_count);
        } else {
            self.started = true;
        }

        if self.revealed < self.char_count {
            self.timer.arm(now, self.speed);
            return None;
        }

        if self.completed {
            return None;
        }
        self.completed = true;
        Some(TypingCompleted { epoch: self.epoch })
    }

    /// The currently visible prefix.
    pub fn visible(&self) -> &str {
        if !self.started {
            return "";
        }
        match self.text.char_indices().nth(self.revealed) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }

    pub fn visible_len(&self) -> usize {
        if self.started { self.revealed } else { 0 }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True while characters are still being revealed (cursor shown).
    pub fn is_typing(&self) -> bool {
        self.running && self.started && self.revealed < self.char_count
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}
