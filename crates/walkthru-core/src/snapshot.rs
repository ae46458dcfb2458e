//! Immutable view of a walkthrough at one instant.

use serde::Serialize;

use crate::model::{ResearchPhase, WalkthroughState};

/// Everything external consumers (camera, tour watchers, logs) may observe.
///
/// Produced after every state mutation; `version` increases by one for each
/// snapshot that differs from the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Snapshot {
    pub version: u64,
    pub state: WalkthroughState,
    pub chat_typing_done: bool,
    pub diffs_visible: bool,
    pub sidebar_open: bool,
    pub tour_step_index: usize,
    pub tour_active: bool,
    pub research_phase: ResearchPhase,
}

impl Snapshot {
    /// Compares every observable field, ignoring `version`.
    pub fn same_content(&self, other: &Snapshot) -> bool {
        Snapshot {
            version: other.version,
            ..*self
        } == *other
    }
}
