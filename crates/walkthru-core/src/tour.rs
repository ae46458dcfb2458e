//! Guided tour: a step index over the scripted tooltips plus one
//! auto-advance watcher per step visit.

use std::time::Duration;

use tracing::debug;

use crate::model::{Act, ResearchPhase};
use crate::script::{AwaitCondition, TourStep};
use crate::snapshot::Snapshot;
use crate::timer::Timer;

/// Side effects the orchestrator applies after the tour advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TourDirective {
    /// Act to start, declared by the step that was just left.
    pub trigger: Option<Act>,
    /// Declared by the step that was just entered.
    pub open_sidebar: bool,
    /// The index ran past the last step.
    pub finished: bool,
}

#[derive(Debug, Default)]
struct Watcher {
    timer: Timer,
    fired: bool,
}

#[derive(Debug)]
pub struct TourEngine {
    steps: &'static [TourStep],
    index: usize,
    active: bool,
    watcher: Watcher,
}

impl TourEngine {
    pub fn new(steps: &'static [TourStep]) -> Self {
        Self {
            steps,
            index: 0,
            active: !steps.is_empty(),
            watcher: Watcher::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The step being shown, `None` once the tour finished.
    pub fn current(&self) -> Option<&'static TourStep> {
        if !self.active {
            return None;
        }
        self.steps.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Moves to the next step.
    pub fn advance(&mut self) -> Option<TourDirective> {
        let leaving = self.current()?;
        self.index += 1;
        self.watcher = Watcher::default();

        let mut directive = TourDirective {
            trigger: leaving.triggers_act,
            ..TourDirective::default()
        };
        match self.steps.get(self.index) {
            Some(entered) => {
                directive.open_sidebar = entered.opens_sidebar;
                debug!(step = entered.id, index = self.index, "tour step");
            }
            None => {
                self.active = false;
                directive.finished = true;
                debug!("tour finished");
            }
        }
        Some(directive)
    }

    pub fn replay(&mut self) {
        self.index = 0;
        self.active = !self.steps.is_empty();
        self.watcher = Watcher::default();
    }

    /// Arms the current step's watcher once its condition holds.
    pub fn observe(&mut self, snapshot: &Snapshot, now: Duration) {
        let Some(auto) = self.current().and_then(|s| s.auto_advance) else {
            return;
        };
        if self.watcher.fired || self.watcher.timer.is_armed() {
            return;
        }
        if condition_holds(auto.condition, snapshot) {
            self.watcher.timer.arm(now, auto.grace);
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.watcher.timer.deadline()
    }

    /// Fires a due watcher. The condition is checked again at expiry; if it
    /// no longer holds the watcher disarms and waits for the next snapshot.
    pub fn fire_if_due(&mut self, snapshot: &Snapshot, now: Duration) -> Option<TourDirective> {
        if !self.watcher.timer.fire_if_due(now) {
            return None;
        }
        let auto = self.current().and_then(|s| s.auto_advance)?;
        if !condition_holds(auto.condition, snapshot) {
            debug!(index = self.index, "tour watcher condition lapsed");
            return None;
        }
        self.watcher.fired = true;
        self.advance()
    }
}

/// Whether `snapshot` satisfies an auto-advance condition.
pub fn condition_holds(condition: AwaitCondition, snapshot: &Snapshot) -> bool {
    match condition {
        AwaitCondition::TypingDone => snapshot.chat_typing_done,
        AwaitCondition::ActComplete(act) => snapshot.state == act.complete(),
        AwaitCondition::DiffsVisible => snapshot.diffs_visible,
        AwaitCondition::ResearchPhase(phase) => {
            research_rank(snapshot.research_phase) >= research_rank(phase)
        }
        AwaitCondition::SidebarOpen => snapshot.sidebar_open,
    }
}

fn research_rank(phase: ResearchPhase) -> u8 {
    match phase {
        ResearchPhase::Idle => 0,
        ResearchPhase::Loading => 1,
        ResearchPhase::ResponseVisible => 2,
        ResearchPhase::Inserting => 3,
        ResearchPhase::Inserted => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WalkthroughState;
    use crate::script::TOUR_STEPS;
    use crate::tooltip::Placement;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn index_of(id: &str) -> usize {
        TOUR_STEPS.iter().position(|s| s.id == id).unwrap()
    }

    #[test]
    fn test_advance_reports_trigger_of_left_step() {
        let mut tour = TourEngine::new(TOUR_STEPS);
        tour.advance();
        let directive = tour.advance().unwrap();
        assert_eq!(directive.trigger, None);
        assert_eq!(tour.current().unwrap().id, "ask-rewrite");

        let directive = tour.advance().unwrap();
        assert_eq!(directive.trigger, Some(Act::Rewrite));
        assert_eq!(tour.current().unwrap().id, "watch-morph");
    }

    #[test]
    fn test_entering_sidebar_step_opens_sidebar() {
        let mut tour = TourEngine::new(TOUR_STEPS);
        while tour.current().unwrap().id != "insert-to-doc" {
            tour.advance();
        }
        let directive = tour.advance().unwrap();
        assert!(directive.open_sidebar);
        assert_eq!(tour.index(), index_of("sidebar-reveal"));
    }

    #[test]
    fn test_running_off_the_end_finishes() {
        static TWO: &[TourStep] = &[
            TourStep::new("a", "center", "a", Placement::Center),
            TourStep::new("b", "center", "b", Placement::Center),
        ];
        let mut tour = TourEngine::new(TWO);
        tour.advance();
        let directive = tour.advance().unwrap();
        assert!(directive.finished);
        assert!(!tour.is_active());
        assert!(tour.current().is_none());
        assert!(tour.advance().is_none());

        tour.replay();
        assert!(tour.is_active());
        assert_eq!(tour.index(), 0);
    }

    #[test]
    fn test_watcher_fires_once_after_grace() {
        let mut tour = TourEngine::new(TOUR_STEPS);
        while tour.current().unwrap().id != "watch-morph" {
            tour.advance();
        }
        let running = Snapshot {
            state: WalkthroughState::Act1,
            ..Snapshot::default()
        };
        tour.observe(&running, ms(0));
        assert_eq!(tour.next_deadline(), None);

        let done = Snapshot {
            state: WalkthroughState::Act1Complete,
            ..Snapshot::default()
        };
        tour.observe(&done, ms(1_000));
        tour.observe(&done, ms(1_200));
        assert_eq!(tour.next_deadline(), Some(ms(1_600)));

        assert!(tour.fire_if_due(&done, ms(1_599)).is_none());
        assert!(tour.fire_if_due(&done, ms(1_600)).is_some());
        assert_eq!(tour.current().unwrap().id, "rewrite-done");
    }

    #[test]
    fn test_lapsed_condition_does_not_advance() {
        let mut tour = TourEngine::new(TOUR_STEPS);
        while tour.current().unwrap().id != "scanning" {
            tour.advance();
        }
        let visible = Snapshot {
            diffs_visible: true,
            ..Snapshot::default()
        };
        tour.observe(&visible, ms(0));
        assert!(tour.fire_if_due(&Snapshot::default(), ms(300)).is_none());
        assert_eq!(tour.current().unwrap().id, "scanning");

        tour.observe(&visible, ms(400));
        assert!(tour.fire_if_due(&visible, ms(700)).is_some());
    }

    #[test]
    fn test_research_condition_accepts_later_phases() {
        let cond = AwaitCondition::ResearchPhase(ResearchPhase::ResponseVisible);
        let mut snap = Snapshot::default();
        snap.research_phase = ResearchPhase::Loading;
        assert!(!condition_holds(cond, &snap));
        snap.research_phase = ResearchPhase::Inserting;
        assert!(condition_holds(cond, &snap));
    }
}
