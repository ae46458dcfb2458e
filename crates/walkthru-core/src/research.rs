//! Act 3 research: loading shimmer, synthesized answer, insert into the doc.

use std::time::Duration;

use tracing::debug;

use crate::model::ResearchPhase;
use crate::script::ResearchTiming;
use crate::timer::{Epoch, Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchEvent {
    PhaseChanged { epoch: Epoch, phase: ResearchPhase },
    /// Insert animation finished; fires once per run.
    Completed { epoch: Epoch },
}

#[derive(Debug)]
pub struct ResearchPhaseMachine {
    timing: ResearchTiming,
    wait_for_insert: bool,
    phase: ResearchPhase,
    timer: Timer,
    epoch: Epoch,
}

impl ResearchPhaseMachine {
    pub fn new(timing: ResearchTiming, wait_for_insert: bool) -> Self {
        Self {
            timing,
            wait_for_insert,
            phase: ResearchPhase::Idle,
            timer: Timer::default(),
            epoch: Epoch::default(),
        }
    }

    /// Starts the sequence from `idle`.
    ///
    /// A machine already past `idle` keeps its phase; in particular a
    /// finished run holds at `inserted` instead of replaying.
    pub fn activate(&mut self, timing: ResearchTiming, now: Duration) {
        if self.phase != ResearchPhase::Idle {
            return;
        }
        self.timing = timing;
        self.epoch = self.epoch.next();
        self.phase = ResearchPhase::Loading;
        self.timer.arm(now, self.timing.loading_shimmer_duration);
        debug!(epoch = self.epoch.0, "research loading");
    }

    /// Resets to `idle` and cancels any pending step.
    pub fn deactivate(&mut self) {
        if self.phase == ResearchPhase::Idle {
            return;
        }
        debug!(epoch = self.epoch.0, phase = self.phase.as_str(), "research reset");
        self.phase = ResearchPhase::Idle;
        self.timer.cancel();
        self.epoch = self.epoch.next();
    }

    /// External "insert to doc". Honoured only while the response is visible.
    pub fn insert(&mut self, now: Duration) -> Option<ResearchEvent> {
        if self.phase != ResearchPhase::ResponseVisible {
            debug!(phase = self.phase.as_str(), "insert ignored");
            return None;
        }
        Some(self.start_inserting(now))
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timer.deadline()
    }

    pub fn advance(&mut self, now: Duration) -> Option<ResearchEvent> {
        if !self.timer.fire_if_due(now) {
            return None;
        }
        match self.phase {
            ResearchPhase::Loading => {
                self.phase = ResearchPhase::ResponseVisible;
                if !self.wait_for_insert {
                    self.timer.arm(now, self.timing.insert_to_doc_delay);
                }
                Some(self.changed())
            }
            ResearchPhase::ResponseVisible => Some(self.start_inserting(now)),
            ResearchPhase::Inserting => {
                self.phase = ResearchPhase::Inserted;
                debug!(epoch = self.epoch.0, "research inserted");
                Some(ResearchEvent::Completed { epoch: self.epoch })
            }
            ResearchPhase::Idle | ResearchPhase::Inserted => None,
        }
    }

    fn start_inserting(&mut self, now: Duration) -> ResearchEvent {
        self.phase = ResearchPhase::Inserting;
        self.timer.arm(now, self.timing.insert_animation_duration);
        self.changed()
    }

    fn changed(&self) -> ResearchEvent {
        ResearchEvent::PhaseChanged {
            epoch: self.epoch,
            phase: self.phase,
        }
    }

    pub fn phase(&self) -> ResearchPhase {
        self.phase
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn waits_for_insert(&self) -> bool {
        self.wait_for_insert
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ACT3;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn run(machine: &mut ResearchPhaseMachine, until: Duration) -> Vec<ResearchEvent> {
        let mut events = Vec::new();
        while let Some(deadline) = machine.next_deadline() {
            if deadline > until {
                break;
            }
            events.extend(machine.advance(deadline));
        }
        events
    }

    fn completions(events: &[ResearchEvent]) -> Vec<Epoch> {
        events
            .iter()
            .filter_map(|e| match e {
                ResearchEvent::Completed { epoch } => Some(*epoch),
                ResearchEvent::PhaseChanged { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_timed_sequence_runs_to_inserted() {
        let t = ACT3.timing;
        let mut machine = ResearchPhaseMachine::new(t, false);
        machine.activate(t, ms(0));
        assert_eq!(machine.phase(), ResearchPhase::Loading);

        run(&mut machine, t.loading_shimmer_duration);
        assert_eq!(machine.phase(), ResearchPhase::ResponseVisible);

        let total =
            t.loading_shimmer_duration + t.insert_to_doc_delay + t.insert_animation_duration;
        let events = run(&mut machine, total);
        assert_eq!(machine.phase(), ResearchPhase::Inserted);
        assert_eq!(completions(&events).len(), 1);
    }

    #[test]
    fn test_waits_for_insert_when_configured() {
        let t = ACT3.timing;
        let mut machine = ResearchPhaseMachine::new(t, true);
        machine.activate(t, ms(0));
        run(&mut machine, ms(60_000));
        assert_eq!(machine.phase(), ResearchPhase::ResponseVisible);

        assert!(machine.insert(ms(60_000)).is_some());
        assert_eq!(machine.phase(), ResearchPhase::Inserting);
        let events = run(&mut machine, ms(60_000) + t.insert_animation_duration);
        assert_eq!(completions(&events).len(), 1);
    }

    #[test]
    fn test_insert_before_response_is_ignored() {
        let t = ACT3.timing;
        let mut machine = ResearchPhaseMachine::new(t, true);
        machine.activate(t, ms(0));
        assert!(machine.insert(ms(10)).is_none());
        assert_eq!(machine.phase(), ResearchPhase::Loading);
    }

    #[test]
    fn test_inserted_holds_on_reactivation() {
        let t = ACT3.timing;
        let mut machine = ResearchPhaseMachine::new(t, false);
        machine.activate(t, ms(0));
        run(&mut machine, ms(60_000));
        let epoch = machine.epoch();

        machine.activate(t, ms(60_000));
        assert_eq!(machine.phase(), ResearchPhase::Inserted);
        assert_eq!(machine.epoch(), epoch);
        assert_eq!(machine.next_deadline(), None);
    }

    #[test]
    fn test_cancelled_run_never_completes() {
        let t = ACT3.timing;
        let quick = ResearchTiming {
            loading_shimmer_duration: ms(10),
            insert_to_doc_delay: ms(10),
            insert_animation_duration: ms(10),
        };
        let mut machine = ResearchPhaseMachine::new(t, false);
        machine.activate(t, ms(0));
        let mut events = run(&mut machine, ms(2_000));
        assert_eq!(machine.phase(), ResearchPhase::ResponseVisible);
        machine.deactivate();

        machine.activate(quick, ms(2_000));
        let fresh = machine.epoch();
        events.extend(run(&mut machine, ms(60_000)));
        assert_eq!(completions(&events), vec![fresh]);
    }
}
