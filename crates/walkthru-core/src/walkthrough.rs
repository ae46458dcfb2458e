//! The walkthrough orchestrator.
//!
//! Owns the act state machine and every timed sub-machine, and is the only
//! place state changes. All operations take effect at the orchestrator's
//! current virtual time and return the effects they produced; time only
//! moves through [`Walkthrough::advance_to`].
//!
//! Machine wiring is re-derived from the act state after every mutation:
//!
//! | state           | typing | morph            | diffs  | research             |
//! |-----------------|--------|------------------|--------|----------------------|
//! | `act1`          | prompt | after typing     | -      | -                    |
//! | `act1-complete` | held   | held at `after`  | -      | -                    |
//! | `act2`          | -      | -                | run    | -                    |
//! | `act3`          | prompt | -                | -      | after typing         |
//! | `act3-complete` | held   | -                | -      | held at `inserted`   |

use std::time::Duration;

use tracing::{debug, info};

use crate::diff_reveal::{DiffEvent, DiffRevealSequencer};
use crate::model::{Act, PlaybackMode, WalkthroughState};
use crate::morph::TextMorph;
use crate::research::{ResearchEvent, ResearchPhaseMachine};
use crate::script::{ACT1, ACT2, ACT3, CtaSignal, TIMING, TOUR_STEPS};
use crate::snapshot::Snapshot;
use crate::timer::{Timer, earliest};
use crate::tour::{TourDirective, TourEngine};
use crate::typing::TypingSimulator;

/// Construction options for one walkthrough instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkthroughOptions {
    pub mode: PlaybackMode,
    /// Overrides the mode default (guided waits, auto does not).
    pub wait_for_accept: Option<bool>,
    /// Overrides the mode default (guided waits, auto does not).
    pub wait_for_insert: Option<bool>,
    /// Auto mode only: replay after the finale.
    pub auto_loop: bool,
}

impl WalkthroughOptions {
    pub fn new(mode: PlaybackMode) -> Self {
        Self {
            mode,
            wait_for_accept: None,
            wait_for_insert: None,
            auto_loop: mode == PlaybackMode::Auto,
        }
    }

    pub fn wait_for_accept(&self) -> bool {
        self.wait_for_accept.unwrap_or(self.mode == PlaybackMode::Guided)
    }

    pub fn wait_for_insert(&self) -> bool {
        self.wait_for_insert.unwrap_or(self.mode == PlaybackMode::Guided)
    }
}

/// Outbound effects, in the order they were produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkthroughEffect {
    /// The observable state changed.
    Snapshot(Snapshot),
    /// The viewer confirmed a link step; open `url` outside the walkthrough.
    OpenLink(&'static str),
    /// The guided tour ran past its last step.
    TourFinished,
}

/// Timer-driven transitions owned by auto mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AutoStep {
    Start,
    NextAct(Act),
    OpenSidebar,
    Replay,
}

#[derive(Debug)]
pub struct Walkthrough {
    options: WalkthroughOptions,
    now: Duration,

    state: WalkthroughState,
    chat_typing_done: bool,
    diffs_visible: bool,
    sidebar_open: bool,

    typing: TypingSimulator,
    /// Act whose chat prompt the simulator holds.
    typing_for: Option<Act>,
    morph: TextMorph,
    diffs: DiffRevealSequencer,
    research: ResearchPhaseMachine,
    tour: Option<TourEngine>,

    auto_timer: Timer,
    auto_step: Option<AutoStep>,

    snapshot: Snapshot,
    effects: Vec<WalkthroughEffect>,
}

impl Walkthrough {
    pub fn new(options: WalkthroughOptions) -> Self {
        let tour = match options.mode {
            PlaybackMode::Guided => Some(TourEngine::new(TOUR_STEPS)),
            PlaybackMode::Auto => None,
        };
        let mut walkthrough = Self {
            options,
            now: Duration::ZERO,
            state: WalkthroughState::Idle,
            chat_typing_done: false,
            diffs_visible: false,
            sidebar_open: false,
            typing: TypingSimulator::new(),
            typing_for: None,
            morph: new_morph(),
            diffs: DiffRevealSequencer::new(ACT2, options.wait_for_accept()),
            research: ResearchPhaseMachine::new(ACT3.timing, options.wait_for_insert()),
            tour,
            auto_timer: Timer::default(),
            auto_step: None,
            snapshot: Snapshot::default(),
            effects: Vec::new(),
        };
        walkthrough.snapshot = walkthrough.capture(0);
        walkthrough.schedule_auto_start();
        info!(mode = ?options.mode, "walkthrough mounted");
        walkthrough
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn options(&self) -> &WalkthroughOptions {
        &self.options
    }

    pub fn mode(&self) -> PlaybackMode {
        self.options.mode
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn state(&self) -> WalkthroughState {
        self.state
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    pub fn typing(&self) -> &TypingSimulator {
        &self.typing
    }

    pub fn morph(&self) -> &TextMorph {
        &self.morph
    }

    pub fn diffs(&self) -> &DiffRevealSequencer {
        &self.diffs
    }

    pub fn research(&self) -> &ResearchPhaseMachine {
        &self.research
    }

    pub fn tour(&self) -> Option<&TourEngine> {
        self.tour.as_ref()
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Jumps straight to the start of `act`, from any state.
    pub fn select_act(&mut self, act: Act) -> Vec<WalkthroughEffect> {
        self.cancel_auto();
        self.enter_act(act);
        self.settle()
    }

    /// Marks `act` finished. Ignored unless `act` is the one running.
    pub fn complete_act(&mut self, act: Act) -> Vec<WalkthroughEffect> {
        self.finish_act(act);
        self.settle()
    }

    /// Returns every observable flag to its initial value.
    ///
    /// A walkthrough that is already in its initial state is left untouched.
    pub fn replay(&mut self) -> Vec<WalkthroughEffect> {
        if self.is_initial() {
            debug!("replay on initial state ignored");
            return Vec::new();
        }
        self.reset();
        self.settle()
    }

    /// The viewer confirmed the current tour step.
    pub fn tour_cta(&mut self) -> Vec<WalkthroughEffect> {
        let Some(step) = self.tour.as_ref().and_then(TourEngine::current) else {
            debug!("tour cta without an active step");
            return Vec::new();
        };
        if let Some(url) = step.cta_link {
            self.effects.push(WalkthroughEffect::OpenLink(url));
            return self.settle();
        }
        if step.cta.is_none() {
            debug!(step = step.id, "step has no call to action");
            return Vec::new();
        }
        match step.cta_signal {
            Some(CtaSignal::AcceptDiffs) => self.forward_accept(),
            Some(CtaSignal::InsertResearch) => self.forward_insert(),
            None => {}
        }
        let directive = self.tour.as_mut().and_then(TourEngine::advance);
        self.apply_directive(directive);
        self.settle()
    }

    /// External "accept all" for the proofread diffs.
    pub fn accept_diffs(&mut self) -> Vec<WalkthroughEffect> {
        self.forward_accept();
        self.settle()
    }

    /// External "insert to doc" for the research answer.
    pub fn insert_research(&mut self) -> Vec<WalkthroughEffect> {
        self.forward_insert();
        self.settle()
    }

    pub fn toggle_sidebar(&mut self) -> Vec<WalkthroughEffect> {
        self.sidebar_open = !self.sidebar_open;
        self.settle()
    }

    /// Earliest pending timer across the orchestrator and its machines.
    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([
            self.auto_timer.deadline(),
            self.typing.next_deadline(),
            self.morph.next_deadline(),
            self.diffs.next_deadline(),
            self.research.next_deadline(),
            self.tour.as_ref().and_then(TourEngine::next_deadline),
        ])
    }

    /// Runs every timer due up to `target`, in deadline order.
    ///
    /// Timers sharing a deadline fire in a fixed order: orchestrator, typing,
    /// morph, diffs, research, tour.
    pub fn advance_to(&mut self, target: Duration) -> Vec<WalkthroughEffect> {
        let mut effects = Vec::new();
        while let Some(deadline) = self.next_deadline().filter(|d| *d <= target) {
            self.now = self.now.max(deadline);
            effects.extend(self.fire_due());
        }
        self.now = self.now.max(target);
        effects
    }

    pub fn advance_by(&mut self, delta: Duration) -> Vec<WalkthroughEffect> {
        self.advance_to(self.now + delta)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn fire_due(&mut self) -> Vec<WalkthroughEffect> {
        let now = self.now;
        let mut effects = Vec::new();

        if self.auto_timer.fire_if_due(now)
            && let Some(step) = self.auto_step.take()
        {
            self.run_auto_step(step);
            effects.extend(self.settle());
        }

        if self.typing.advance(now).is_some() {
            self.chat_typing_done = true;
            debug!(act = ?self.typing_for, "chat prompt typed");
            effects.extend(self.settle());
        }

        if self.morph.advance(now).is_some() {
            self.finish_act(Act::Rewrite);
            effects.extend(self.settle());
        }

        if let Some(event) = self.diffs.advance(now) {
            self.on_diff_event(event);
            effects.extend(self.settle());
        }

        if let Some(event) = self.research.advance(now) {
            self.on_research_event(event);
            effects.extend(self.settle());
        }

        let snapshot = self.snapshot;
        let directive = self
            .tour
            .as_mut()
            .and_then(|tour| tour.fire_if_due(&snapshot, now));
        if directive.is_some() {
            self.apply_directive(directive);
            effects.extend(self.settle());
        }

        effects
    }

    fn run_auto_step(&mut self, step: AutoStep) {
        match step {
            AutoStep::Start => {
                if self.state == WalkthroughState::Idle {
                    self.enter_act(Act::Rewrite);
                }
            }
            AutoStep::NextAct(act) => self.enter_act(act),
            AutoStep::OpenSidebar => {
                self.sidebar_open = true;
                if self.options.auto_loop {
                    self.arm_auto(TIMING.auto_replay_delay, AutoStep::Replay);
                }
            }
            AutoStep::Replay => {
                info!("auto replay");
                self.reset();
            }
        }
    }

    fn enter_act(&mut self, act: Act) {
        self.stop_machines();
        self.chat_typing_done = false;
        self.diffs_visible = false;
        self.state = act.running();
        info!(state = %self.state, "act started");
    }

    fn finish_act(&mut self, act: Act) {
        if self.state.running_act() != Some(act) {
            debug!(?act, state = %self.state, "completion for idle act ignored");
            return;
        }
        self.state = act.complete();
        info!(state = %self.state, "act complete");

        if self.options.mode == PlaybackMode::Auto {
            let next = match act {
                Act::Rewrite => AutoStep::NextAct(Act::Proofread),
                Act::Proofread => AutoStep::NextAct(Act::Research),
                Act::Research => AutoStep::OpenSidebar,
            };
            self.arm_auto(TIMING.inter_act_delay, next);
        }
    }

    fn forward_accept(&mut self) {
        if let Some(event) = self.diffs.accept(self.now) {
            self.on_diff_event(event);
        }
    }

    fn forward_insert(&mut self) {
        if let Some(event) = self.research.insert(self.now) {
            self.on_research_event(event);
        }
    }

    fn on_diff_event(&mut self, event: DiffEvent) {
        match event {
            // An accept before the grace expires skips `AllVisible`; every
            // diff is on screen once accepting starts either way.
            DiffEvent::AllVisible { .. } | DiffEvent::Accepting { .. } => {
                self.diffs_visible = true;
            }
            DiffEvent::Completed { .. } => self.finish_act(Act::Proofread),
            DiffEvent::Revealed { .. } => {}
        }
    }

    fn on_research_event(&mut self, event: ResearchEvent) {
        if let ResearchEvent::Completed { .. } = event {
            self.finish_act(Act::Research);
        }
    }

    fn apply_directive(&mut self, directive: Option<TourDirective>) {
        let Some(directive) = directive else {
            return;
        };
        if let Some(act) = directive.trigger {
            self.enter_act(act);
        }
        if directive.open_sidebar {
            self.sidebar_open = true;
        }
        if directive.finished {
            self.effects.push(WalkthroughEffect::TourFinished);
        }
    }

    fn reset(&mut self) {
        self.stop_machines();
        self.state = WalkthroughState::Idle;
        self.chat_typing_done = false;
        self.diffs_visible = false;
        self.sidebar_open = false;
        if let Some(tour) = self.tour.as_mut() {
            tour.replay();
        }
        self.cancel_auto();
        self.schedule_auto_start();
        info!("walkthrough reset");
    }

    fn stop_machines(&mut self) {
        self.typing.stop();
        self.typing_for = None;
        self.morph.deactivate();
        self.diffs.deactivate();
        self.research.deactivate();
    }

    fn is_initial(&self) -> bool {
        let auto_ready = match self.options.mode {
            PlaybackMode::Auto => self.auto_step == Some(AutoStep::Start),
            PlaybackMode::Guided => true,
        };
        let initial = Snapshot {
            tour_active: self.options.mode == PlaybackMode::Guided,
            ..Snapshot::default()
        };
        auto_ready && self.typing_for.is_none() && self.capture(0).same_content(&initial)
    }

    fn schedule_auto_start(&mut self) {
        if self.options.mode == PlaybackMode::Auto {
            self.arm_auto(TIMING.auto_start_delay, AutoStep::Start);
        }
    }

    fn arm_auto(&mut self, after: Duration, step: AutoStep) {
        self.auto_timer.arm(self.now, after);
        self.auto_step = Some(step);
    }

    fn cancel_auto(&mut self) {
        self.auto_timer.cancel();
        self.auto_step = None;
    }

    /// Re-derives machine wiring from the act state.
    fn sync_machines(&mut self) {
        let now = self.now;

        let prompt_act = match self.state {
            WalkthroughState::Act1 | WalkthroughState::Act1Complete => Some(Act::Rewrite),
            WalkthroughState::Act3 | WalkthroughState::Act3Complete => Some(Act::Research),
            _ => None,
        };
        if prompt_act != self.typing_for {
            match prompt_act {
                Some(Act::Rewrite) if self.state == WalkthroughState::Act1 => {
                    self.typing
                        .start(ACT1.chat_prompt, ACT1.typing_speed, TIMING.typing_start_delay, now);
                    self.typing_for = prompt_act;
                }
                Some(Act::Research) if self.state == WalkthroughState::Act3 => {
                    self.typing
                        .start(ACT3.chat_prompt, ACT3.typing_speed, TIMING.typing_start_delay, now);
                    self.typing_for = prompt_act;
                }
                _ => {
                    self.typing.stop();
                    self.typing_for = None;
                }
            }
        }

        match self.state {
            WalkthroughState::Act1 if self.chat_typing_done => self.morph.activate(now),
            WalkthroughState::Act1 | WalkthroughState::Act1Complete => {}
            _ => self.morph.deactivate(),
        }

        match self.state {
            WalkthroughState::Act2 => self.diffs.activate(ACT2, now),
            WalkthroughState::Act2Complete => {}
            _ => self.diffs.deactivate(),
        }

        match self.state {
            WalkthroughState::Act3 if self.chat_typing_done => {
                self.research.activate(ACT3.timing, now);
            }
            WalkthroughState::Act3 | WalkthroughState::Act3Complete => {}
            _ => self.research.deactivate(),
        }
    }

    /// Rewires machines, publishes a snapshot if anything observable changed,
    /// and drains pending effects.
    fn settle(&mut self) -> Vec<WalkthroughEffect> {
        self.sync_machines();

        let next = self.capture(self.snapshot.version + 1);
        if !next.same_content(&self.snapshot) {
            self.snapshot = next;
            self.effects.push(WalkthroughEffect::Snapshot(next));
        }
        let snapshot = self.snapshot;
        if let Some(tour) = self.tour.as_mut() {
            tour.observe(&snapshot, self.now);
        }

        std::mem::take(&mut self.effects)
    }

    fn capture(&self, version: u64) -> Snapshot {
        Snapshot {
            version,
            state: self.state,
            chat_typing_done: self.chat_typing_done,
            diffs_visible: self.diffs_visible,
            sidebar_open: self.sidebar_open,
            tour_step_index: self.tour.as_ref().map_or(0, TourEngine::index),
            tour_active: self.tour.as_ref().is_some_and(TourEngine::is_active),
            research_phase: self.research.phase(),
        }
    }
}

fn new_morph() -> TextMorph {
    TextMorph::new(
        ACT1.rough_draft,
        ACT1.polished_draft,
        ACT1.morph_duration,
        ACT1.thinking_delay,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff_reveal::DiffPhase;
    use crate::model::ResearchPhase;
    use crate::morph::MorphPhase;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn guided() -> Walkthrough {
        Walkthrough::new(WalkthroughOptions::new(PlaybackMode::Guided))
    }

    fn auto() -> Walkthrough {
        Walkthrough::new(WalkthroughOptions::new(PlaybackMode::Auto))
    }

    fn snapshots(effects: &[WalkthroughEffect]) -> Vec<Snapshot> {
        effects
            .iter()
            .filter_map(|e| match e {
                WalkthroughEffect::Snapshot(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    fn step_id(w: &Walkthrough) -> &'static str {
        w.tour().and_then(TourEngine::current).map_or("", |s| s.id)
    }

    /// Presses the tour CTA until `id` is the current step.
    fn cta_until(w: &mut Walkthrough, id: &str) {
        for _ in 0..TOUR_STEPS.len() {
            if step_id(w) == id {
                return;
            }
            w.tour_cta();
        }
        panic!("never reached {id}");
    }

    /// Lets time run until the tour reaches `id`.
    fn wait_until(w: &mut Walkthrough, id: &str) {
        for _ in 0..600 {
            if step_id(w) == id {
                return;
            }
            w.advance_by(ms(100));
        }
        panic!("tour stuck at {}", step_id(w));
    }

    #[test]
    fn test_state_linearity() {
        let mut w = guided();
        for act in Act::all() {
            w.select_act(*act);
            assert_eq!(w.state(), act.running());
            w.complete_act(*act);
            assert_eq!(w.state(), act.complete());
        }
        assert_eq!(w.state(), WalkthroughState::Act3Complete);
        assert_eq!(w.state().completed_acts(), Act::all());
    }

    #[test]
    fn test_complete_for_other_act_is_ignored() {
        let mut w = guided();
        w.select_act(Act::Proofread);
        assert!(w.complete_act(Act::Rewrite).is_empty());
        assert_eq!(w.state(), WalkthroughState::Act2);
    }

    #[test]
    fn test_replay_restores_initial_and_is_idempotent() {
        let mut w = guided();
        cta_until(&mut w, "ask-rewrite");
        w.tour_cta();
        w.advance_by(ms(20_000));
        w.toggle_sidebar();
        assert_ne!(w.state(), WalkthroughState::Idle);

        let effects = w.replay();
        let snap = w.snapshot();
        assert_eq!(snapshots(&effects).len(), 1);
        assert_eq!(snap.state, WalkthroughState::Idle);
        assert!(!snap.sidebar_open);
        assert!(!snap.chat_typing_done);
        assert!(!snap.diffs_visible);
        assert_eq!(snap.research_phase, ResearchPhase::Idle);
        assert_eq!(snap.tour_step_index, 0);
        assert!(snap.tour_active);
        assert_eq!(w.next_deadline(), None);

        assert!(w.replay().is_empty());
        assert_eq!(w.snapshot(), snap);
    }

    #[test]
    fn test_replay_twice_in_auto_mode_keeps_start_timer() {
        let mut w = auto();
        w.advance_to(ms(5_000));
        w.replay();
        let deadline = w.next_deadline();
        w.advance_by(ms(100));
        assert!(w.replay().is_empty());
        assert_eq!(w.next_deadline(), deadline);
    }

    #[test]
    fn test_snapshot_versions_increase_only_on_change() {
        let mut w = guided();
        let before = w.snapshot();
        assert!(w.advance_by(ms(10_000)).is_empty());
        let effects = w.toggle_sidebar();
        let snaps = snapshots(&effects);
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].version, before.version + 1);
        assert!(snaps[0].sidebar_open);
    }

    #[test]
    fn test_auto_mode_runs_all_acts_then_loops() {
        let mut w = auto();
        w.advance_to(ms(499));
        assert_eq!(w.state(), WalkthroughState::Idle);
        w.advance_to(ms(500));
        assert_eq!(w.state(), WalkthroughState::Act1);

        let mut seen = vec![w.state()];
        let mut sidebar_seen = false;
        let mut t = ms(500);
        while t < ms(120_000) {
            t += ms(50);
            for snap in snapshots(&w.advance_to(t)) {
                if seen.last() != Some(&snap.state) {
                    seen.push(snap.state);
                }
                sidebar_seen |= snap.sidebar_open;
            }
            if sidebar_seen && w.state() == WalkthroughState::Act1 {
                break;
            }
        }

        assert_eq!(
            &seen[..7],
            &[
                WalkthroughState::Act1,
                WalkthroughState::Act1Complete,
                WalkthroughState::Act2,
                WalkthroughState::Act2Complete,
                WalkthroughState::Act3,
                WalkthroughState::Act3Complete,
                WalkthroughState::Idle,
            ]
        );
        assert!(sidebar_seen);
        assert_eq!(w.state(), WalkthroughState::Act1);
    }

    #[test]
    fn test_auto_inter_act_delay() {
        let mut w = auto();
        w.advance_to(ms(500));
        let mut t = ms(500);
        while w.state() != WalkthroughState::Act1Complete {
            t += ms(10);
            w.advance_to(t);
        }
        let completed_at = t;
        w.advance_to(completed_at + TIMING.inter_act_delay - ms(20));
        assert_eq!(w.state(), WalkthroughState::Act1Complete);
        w.advance_to(completed_at + TIMING.inter_act_delay);
        assert_eq!(w.state(), WalkthroughState::Act2);
    }

    #[test]
    fn test_morph_waits_for_typing_and_thinking() {
        let mut w = guided();
        w.select_act(Act::Rewrite);
        let typed = TIMING.typing_start_delay
            + ACT1.typing_speed * u32::try_from(ACT1.chat_prompt.chars().count()).unwrap();
        w.advance_to(typed - ms(1));
        assert!(!w.snapshot().chat_typing_done);
        assert_eq!(w.morph().phase(), MorphPhase::Before);

        w.advance_to(typed);
        assert!(w.snapshot().chat_typing_done);
        assert_eq!(w.morph().phase(), MorphPhase::Thinking);

        w.advance_to(typed + ACT1.thinking_delay);
        assert_eq!(w.morph().phase(), MorphPhase::Animating);
        w.advance_to(typed + ACT1.thinking_delay + ACT1.morph_duration);
        assert_eq!(w.state(), WalkthroughState::Act1Complete);
    }

    #[test]
    fn test_guided_tour_plays_through_to_finale() {
        let mut w = guided();
        cta_until(&mut w, "ask-rewrite");
        w.tour_cta();
        assert_eq!(w.state(), WalkthroughState::Act1);
        assert_eq!(step_id(&w), "watch-morph");

        wait_until(&mut w, "rewrite-done");
        assert_eq!(w.state(), WalkthroughState::Act1Complete);
        cta_until(&mut w, "click-proofread");
        w.tour_cta();
        assert_eq!(w.state(), WalkthroughState::Act2);

        wait_until(&mut w, "see-diffs");
        assert_eq!(w.diffs().phase(), DiffPhase::ShowingDiffs);
        w.advance_by(ms(30_000));
        assert_eq!(w.diffs().phase(), DiffPhase::ShowingDiffs);
        w.tour_cta();
        assert_eq!(w.diffs().phase(), DiffPhase::Accepting);
        assert_eq!(step_id(&w), "diffs-resolved");
        w.advance_by(ACT2.timing.resolve_animation_duration);
        assert_eq!(w.state(), WalkthroughState::Act2Complete);

        cta_until(&mut w, "ask-research");
        w.tour_cta();
        assert_eq!(w.state(), WalkthroughState::Act3);
        wait_until(&mut w, "insert-to-doc");
        assert_eq!(w.research().phase(), ResearchPhase::ResponseVisible);
        w.tour_cta();
        assert_eq!(w.research().phase(), ResearchPhase::Inserting);
        assert!(w.snapshot().sidebar_open);
        assert_eq!(step_id(&w), "sidebar-reveal");

        wait_until(&mut w, "finale");
        assert_eq!(w.state(), WalkthroughState::Act3Complete);
        assert_eq!(w.research().phase(), ResearchPhase::Inserted);

        let effects = w.tour_cta();
        assert!(effects.contains(&WalkthroughEffect::OpenLink(crate::script::SIGN_UP_URL)));
        assert_eq!(step_id(&w), "finale");
    }

    #[test]
    fn test_early_accept_still_moves_tour_past_scanning() {
        let mut w = guided();
        cta_until(&mut w, "ask-rewrite");
        w.tour_cta();
        wait_until(&mut w, "rewrite-done");
        cta_until(&mut w, "click-proofread");
        w.tour_cta();
        assert_eq!(step_id(&w), "scanning");

        // Both diffs are up, the visibility grace has not run out yet.
        w.advance_by(ms(1_700));
        assert_eq!(w.diffs().phase(), DiffPhase::ShowingDiffs);
        assert_eq!(w.diffs().visible_count(), 2);
        assert!(!w.snapshot().diffs_visible);

        w.accept_diffs();
        assert_eq!(w.diffs().phase(), DiffPhase::Accepting);
        assert!(w.snapshot().diffs_visible);

        wait_until(&mut w, "see-diffs");
        w.advance_by(ms(10_000));
        assert_eq!(w.state(), WalkthroughState::Act2Complete);
        assert!(w.snapshot().diffs_visible);

        w.tour_cta();
        assert_eq!(step_id(&w), "diffs-resolved");
    }

    #[test]
    fn test_accept_outside_showing_diffs_is_ignored() {
        let mut w = guided();
        w.select_act(Act::Proofread);
        assert!(w.accept_diffs().is_empty());
        assert_eq!(w.diffs().phase(), DiffPhase::Scanning);
    }

    #[test]
    fn test_select_act_mid_run_cancels_stale_completion() {
        let mut w = Walkthrough::new(WalkthroughOptions {
            wait_for_accept: Some(false),
            ..WalkthroughOptions::new(PlaybackMode::Guided)
        });
        w.select_act(Act::Proofread);
        w.advance_by(ms(1_500));
        w.select_act(Act::Rewrite);
        w.select_act(Act::Proofread);

        let mut completions = 0;
        let mut prev = w.state();
        for _ in 0..100 {
            for snap in snapshots(&w.advance_by(ms(100))) {
                if snap.state == WalkthroughState::Act2Complete && prev != snap.state {
                    completions += 1;
                }
                prev = snap.state;
            }
        }
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_tour_cta_in_auto_mode_is_ignored() {
        let mut w = auto();
        assert!(w.tour_cta().is_empty());
        assert!(!w.snapshot().tour_active);
    }
}
