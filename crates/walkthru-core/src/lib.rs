//! Core of the walkthru scripted product demo.
//!
//! Everything here is synchronous and runs on an injected virtual clock:
//! the orchestrator in [`walkthrough`] owns the act state machine and the
//! timed sub-machines, and presentation layers only feed it operations and
//! time, then read its snapshot.

pub mod camera;
pub mod config;
pub mod diff_reveal;
pub mod host;
pub mod logging;
pub mod mirror;
pub mod model;
pub mod morph;
pub mod research;
pub mod script;
pub mod snapshot;
pub mod timer;
pub mod tooltip;
pub mod tour;
pub mod typing;
pub mod walkthrough;
pub mod word_diff;

pub use config::Config;
pub use model::{Act, PlaybackMode, ResearchPhase, WalkthroughState};
pub use snapshot::Snapshot;
pub use walkthrough::{Walkthrough, WalkthroughEffect, WalkthroughOptions};
