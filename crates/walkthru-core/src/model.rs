//! Core state vocabulary shared by every walkthrough component.

use serde::{Deserialize, Serialize};

/// One of the three demo scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Act {
    Rewrite,
    Proofread,
    Research,
}

impl Act {
    /// Returns all acts in playback order.
    pub fn all() -> &'static [Act] {
        &[Act::Rewrite, Act::Proofread, Act::Research]
    }

    /// The running state that starts this act.
    pub fn running(self) -> WalkthroughState {
        match self {
            Act::Rewrite => WalkthroughState::Act1,
            Act::Proofread => WalkthroughState::Act2,
            Act::Research => WalkthroughState::Act3,
        }
    }

    /// The settled state reached when this act finishes.
    pub fn complete(self) -> WalkthroughState {
        match self {
            Act::Rewrite => WalkthroughState::Act1Complete,
            Act::Proofread => WalkthroughState::Act2Complete,
            Act::Research => WalkthroughState::Act3Complete,
        }
    }

    /// Tab label for the progress indicator.
    pub fn label(self) -> &'static str {
        match self {
            Act::Rewrite => "Rewrite",
            Act::Proofread => "Proofread",
            Act::Research => "Research",
        }
    }

    /// Parses a lowercase act name (`rewrite`, `proofread`, `research`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rewrite" => Some(Act::Rewrite),
            "proofread" => Some(Act::Proofread),
            "research" => Some(Act::Research),
            _ => None,
        }
    }
}

/// The authoritative execution state of a walkthrough.
///
/// Exactly one act is running (`act1`..`act3`) or the walkthrough is settled
/// (`idle` or one of the `*-complete` states).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WalkthroughState {
    #[default]
    Idle,
    Act1,
    Act1Complete,
    Act2,
    Act2Complete,
    Act3,
    Act3Complete,
}

impl WalkthroughState {
    /// Act highlighted in the progress tabs.
    pub fn current_act(self) -> Act {
        match self {
            WalkthroughState::Act2 | WalkthroughState::Act2Complete => Act::Proofread,
            WalkthroughState::Act3 | WalkthroughState::Act3Complete => Act::Research,
            _ => Act::Rewrite,
        }
    }

    /// Acts shown as completed in the progress tabs.
    pub fn completed_acts(self) -> &'static [Act] {
        match self {
            WalkthroughState::Act1Complete | WalkthroughState::Act2 => &[Act::Rewrite],
            WalkthroughState::Act2Complete | WalkthroughState::Act3 => {
                &[Act::Rewrite, Act::Proofread]
            }
            WalkthroughState::Act3Complete => &[Act::Rewrite, Act::Proofread, Act::Research],
            WalkthroughState::Idle | WalkthroughState::Act1 => &[],
        }
    }

    /// The act currently running, if any.
    pub fn running_act(self) -> Option<Act> {
        match self {
            WalkthroughState::Act1 => Some(Act::Rewrite),
            WalkthroughState::Act2 => Some(Act::Proofread),
            WalkthroughState::Act3 => Some(Act::Research),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WalkthroughState::Idle => "idle",
            WalkthroughState::Act1 => "act1",
            WalkthroughState::Act1Complete => "act1-complete",
            WalkthroughState::Act2 => "act2",
            WalkthroughState::Act2Complete => "act2-complete",
            WalkthroughState::Act3 => "act3",
            WalkthroughState::Act3Complete => "act3-complete",
        }
    }
}

impl std::fmt::Display for WalkthroughState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the walkthrough is driven. Fixed for the lifetime of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Tooltip-driven: the viewer confirms every tour step.
    #[default]
    Guided,
    /// Unattended: acts progress on fixed timers.
    Auto,
}

/// Lifecycle of the research act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchPhase {
    #[default]
    Idle,
    Loading,
    ResponseVisible,
    Inserting,
    Inserted,
}

impl ResearchPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ResearchPhase::Idle => "idle",
            ResearchPhase::Loading => "loading",
            ResearchPhase::ResponseVisible => "response-visible",
            ResearchPhase::Inserting => "inserting",
            ResearchPhase::Inserted => "inserted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_act_state_mapping() {
        for act in Act::all() {
            assert_eq!(act.running().running_act(), Some(*act));
            assert_eq!(act.complete().running_act(), None);
            assert_eq!(act.complete().current_act(), *act);
        }
    }

    #[test]
    fn test_completed_acts_follow_progress() {
        assert!(WalkthroughState::Idle.completed_acts().is_empty());
        assert!(WalkthroughState::Act1.completed_acts().is_empty());
        assert_eq!(WalkthroughState::Act2.completed_acts(), &[Act::Rewrite]);
        assert_eq!(
            WalkthroughState::Act3.completed_acts(),
            &[Act::Rewrite, Act::Proofread]
        );
        assert_eq!(WalkthroughState::Act3Complete.completed_acts().len(), 3);
    }

    #[test]
    fn test_state_serializes_kebab_case() {
        let json = serde_json::to_string(&WalkthroughState::Act2Complete).unwrap();
        assert_eq!(json, "\"act2-complete\"");
        let phase = serde_json::to_string(&ResearchPhase::ResponseVisible).unwrap();
        assert_eq!(phase, "\"response-visible\"");
    }
}
