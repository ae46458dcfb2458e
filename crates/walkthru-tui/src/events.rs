//! UI events fed to the reducer.

use std::time::Duration;

use crossterm::event::Event;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Wall-clock time passed since the previous tick.
    Tick { elapsed: Duration },
    /// Current terminal size, sent before every batch of events.
    Frame { width: u16, height: u16 },
    Terminal(Event),
}
