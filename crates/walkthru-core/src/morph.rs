//! Act 1 text morph: rough notes rearrange into polished prose.

use std::time::Duration;

use tracing::debug;

use crate::timer::{Epoch, Timer};
use crate::word_diff::MorphPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MorphPhase {
    /// Original text shown.
    #[default]
    Before,
    /// "Thinking" shimmer before words move.
    Thinking,
    /// Words sliding, fading in and out.
    Animating,
    /// Final text shown.
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MorphCompleted {
    pub epoch: Epoch,
}

/// Timed phase machine around a [`MorphPlan`].
#[derive(Debug)]
pub struct TextMorph {
    plan: MorphPlan,
    thinking_delay: Duration,
    phase: MorphPhase,
    animating_since: Option<Duration>,
    timer: Timer,
    epoch: Epoch,
}

impl TextMorph {
    pub fn new(from: &str, to: &str, duration: Duration, thinking_delay: Duration) -> Self {
        Self {
            plan: MorphPlan::new(from, to, duration),
            thinking_delay,
            phase: MorphPhase::Before,
            animating_since: None,
            timer: Timer::default(),
            epoch: Epoch::default(),
        }
    }

    /// Starts the morph unless it is already in progress or finished.
    pub fn activate(&mut self, now: Duration) {
        if self.phase != MorphPhase::Before {
            return;
        }
        self.epoch = self.epoch.next();
        self.phase = MorphPhase::Thinking;
        self.timer.arm(now, self.thinking_delay);
        debug!(epoch = self.epoch.0, "morph thinking");
    }

    /// Returns to the original text and cancels any pending step.
    pub fn deactivate(&mut self) {
        if self.phase == MorphPhase::Before && !self.timer.is_armed() {
            return;
        }
        self.phase = MorphPhase::Before;
        self.animating_since = None;
        self.timer.cancel();
        self.epoch = self.epoch.next();
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timer.deadline()
    }

    pub fn advance(&mut self, now: Duration) -> Option<MorphCompleted> {
        if !self.timer.fire_if_due(now) {
            return None;
        }
        match self.phase {
            MorphPhase::Thinking => {
                self.phase = MorphPhase::Animating;
                self.animating_since = Some(now);
                self.timer.arm(now, self.plan.total());
                debug!(epoch = self.epoch.0, "morph animating");
                None
            }
            MorphPhase::Animating => {
                self.phase = MorphPhase::After;
                self.animating_since = None;
                Some(MorphCompleted { epoch: self.epoch })
            }
            MorphPhase::Before | MorphPhase::After => None,
        }
    }

    pub fn phase(&self) -> MorphPhase {
        self.phase
    }

    pub fn plan(&self) -> &MorphPlan {
        &self.plan
    }

    /// Time spent animating so far, if animating.
    pub fn progress(&self, now: Duration) -> Option<Duration> {
        self.animating_since.map(|since| now.saturating_sub(since))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_morph_runs_thinking_then_animation() {
        let mut morph = TextMorph::new("a b", "b a", ms(1000), ms(800));
        morph.activate(ms(0));
        assert_eq!(morph.phase(), MorphPhase::Thinking);

        assert_eq!(morph.advance(ms(800)), None);
        assert_eq!(morph.phase(), MorphPhase::Animating);
        assert_eq!(morph.progress(ms(900)), Some(ms(100)));

        let done = morph.advance(ms(1800));
        assert!(done.is_some());
        assert_eq!(morph.phase(), MorphPhase::After);
    }

    #[test]
    fn test_reactivation_after_finish_is_a_no_op() {
        let mut morph = TextMorph::new("a", "b", ms(100), ms(0));
        morph.activate(ms(0));
        morph.advance(ms(0));
        morph.advance(ms(100));
        morph.activate(ms(200));
        assert_eq!(morph.phase(), MorphPhase::After);
        assert_eq!(morph.next_deadline(), None);
    }

    #[test]
    fn test_deactivate_cancels_completion() {
        let mut morph = TextMorph::new("a", "b", ms(100), ms(0));
        morph.activate(ms(0));
        morph.advance(ms(0));
        morph.deactivate();
        assert_eq!(morph.advance(ms(1_000)), None);
        assert_eq!(morph.phase(), MorphPhase::Before);
    }
}
