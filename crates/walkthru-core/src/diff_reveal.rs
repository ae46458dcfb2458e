//! Act 2 proofreading: scripted diffs revealed one at a time, then resolved.
//!
//! ```text
//! idle ─activate─▶ scanning ─scanning_delay─▶ showing-diffs ─┬─accept()───────────▶ accepting ─resolve─▶ clean
//!                                                            └─accept_all_delay──▶
//! ```
//!
//! The automatic branch only exists when the sequencer is not waiting for an
//! external accept.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::script::{ProofreadScript, ScriptedDiff};
use crate::timer::{Epoch, Timer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffPhase {
    #[default]
    Idle,
    Scanning,
    ShowingDiffs,
    Accepting,
    Clean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffEvent {
    /// One more scripted diff became visible.
    Revealed { epoch: Epoch, visible: usize },
    /// Every diff is on screen.
    AllVisible { epoch: Epoch },
    /// Deletions start fading out.
    Accepting { epoch: Epoch },
    /// Clean text shown; fires once per run.
    Completed { epoch: Epoch },
}

/// What the single pending timer will do when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    ShowDiffs,
    Reveal,
    NotifyVisible,
    AutoAccept,
    Resolve,
}

#[derive(Debug)]
pub struct DiffRevealSequencer {
    script: ProofreadScript,
    wait_for_accept: bool,
    phase: DiffPhase,
    visible: usize,
    timer: Timer,
    pending: Option<Pending>,
    epoch: Epoch,
}

impl DiffRevealSequencer {
    pub fn new(script: ProofreadScript, wait_for_accept: bool) -> Self {
        Self {
            script,
            wait_for_accept,
            phase: DiffPhase::Idle,
            visible: 0,
            timer: Timer::default(),
            pending: None,
            epoch: Epoch::default(),
        }
    }

    /// Starts a run over `script`. Ignored while a run is active.
    pub fn activate(&mut self, script: ProofreadScript, now: Duration) {
        if self.phase != DiffPhase::Idle {
            return;
        }
        self.script = script;
        self.epoch = self.epoch.next();
        self.phase = DiffPhase::Scanning;
        self.visible = 0;
        self.schedule(now, self.script.timing.scanning_delay, Pending::ShowDiffs);
        debug!(epoch = self.epoch.0, diffs = self.script.diffs.len(), "diff scan started");
    }

    /// Resets to idle and cancels everything pending.
    pub fn deactivate(&mut self) {
        if self.phase == DiffPhase::Idle {
            return;
        }
        debug!(epoch = self.epoch.0, phase = ?self.phase, "diff run cancelled");
        self.phase = DiffPhase::Idle;
        self.visible = 0;
        self.timer.cancel();
        self.pending = None;
        self.epoch = self.epoch.next();
    }

    /// External "accept all". Honoured only while diffs are showing.
    pub fn accept(&mut self, now: Duration) -> Option<DiffEvent> {
        if self.phase != DiffPhase::ShowingDiffs {
            debug!(phase = ?self.phase, "accept ignored");
            return None;
        }
        Some(self.start_accepting(now))
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timer.deadline()
    }

    pub fn advance(&mut self, now: Duration) -> Option<DiffEvent> {
        if !self.timer.fire_if_due(now) {
            return None;
        }
        let timing = self.script.timing;
        match self.pending.take()? {
            Pending::ShowDiffs => {
                self.phase = DiffPhase::ShowingDiffs;
                if self.script.diffs.is_empty() {
                    self.schedule(now, timing.diffs_visible_grace, Pending::NotifyVisible);
                } else {
                    self.schedule(now, Duration::ZERO, Pending::Reveal);
                }
                None
            }
            Pending::Reveal => {
                self.visible += 1;
                if self.visible < self.script.diffs.len() {
                    self.schedule(now, timing.diff_stagger_delay, Pending::Reveal);
                } else {
                    self.schedule(now, timing.diffs_visible_grace, Pending::NotifyVisible);
                }
                Some(DiffEvent::Revealed {
                    epoch: self.epoch,
                    visible: self.visible,
                })
            }
            Pending::NotifyVisible => {
                if !self.wait_for_accept {
                    self.schedule(now, timing.accept_all_delay, Pending::AutoAccept);
                }
                Some(DiffEvent::AllVisible { epoch: self.epoch })
            }
            Pending::AutoAccept => Some(self.start_accepting(now)),
            Pending::Resolve => {
                self.phase = DiffPhase::Clean;
                debug!(epoch = self.epoch.0, "diffs resolved");
                Some(DiffEvent::Completed { epoch: self.epoch })
            }
        }
    }

    fn start_accepting(&mut self, now: Duration) -> DiffEvent {
        self.visible = self.script.diffs.len();
        self.phase = DiffPhase::Accepting;
        self.schedule(
            now,
            self.script.timing.resolve_animation_duration,
            Pending::Resolve,
        );
        DiffEvent::Accepting { epoch: self.epoch }
    }

    fn schedule(&mut self, now: Duration, after: Duration, pending: Pending) {
        self.timer.arm(now, after);
        self.pending = Some(pending);
    }

    pub fn phase(&self) -> DiffPhase {
        self.phase
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn total(&self) -> usize {
        self.script.diffs.len()
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn waits_for_accept(&self) -> bool {
        self.wait_for_accept
    }

    /// Splits the paragraph into renderable segments for the current phase.
    pub fn segments(&self) -> Vec<Segment> {
        match self.phase {
            DiffPhase::Idle | DiffPhase::Scanning => {
                vec![Segment::plain(self.script.text_with_errors)]
            }
            DiffPhase::Clean => vec![Segment::plain(self.script.clean_text)],
            DiffPhase::ShowingDiffs | DiffPhase::Accepting => scripted_segments(
                self.script.text_with_errors,
                self.script.diffs,
                self.visible,
                self.phase == DiffPhase::Accepting,
            ),
        }
    }
}

// ============================================================================
// Rendering segments
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    /// Red strikethrough; `resolved` while fading out.
    Deletion { resolved: bool },
    /// Green insertion.
    Insertion,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Self {
            kind: SegmentKind::Plain,
            text: text.to_string(),
        }
    }
}

/// Lays the first `visible` scripted diffs over `text`.
///
/// Diffs are matched left to right; a diff whose anchor is missing from the
/// remaining text is skipped.
pub fn scripted_segments(
    text: &str,
    diffs: &[ScriptedDiff],
    visible: usize,
    resolving: bool,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut remaining = text;

    for (index, diff) in diffs.iter().enumerate() {
        let shown = index < visible;
        match *diff {
            ScriptedDiff::Replace {
                original,
                corrected,
                ..
            } => {
                let Some(pos) = remaining.find(original) else {
                    continue;
                };
                if shown {
                    segments.push(Segment::plain(&remaining[..pos]));
                    segments.push(Segment {
                        kind: SegmentKind::Deletion {
                            resolved: resolving,
                        },
                        text: original.to_string(),
                    });
                    segments.push(Segment {
                        kind: SegmentKind::Insertion,
                        text: corrected.to_string(),
                    });
                } else {
                    segments.push(Segment::plain(&remaining[..pos + original.len()]));
                }
                remaining = &remaining[pos + original.len()..];
            }
            ScriptedDiff::Insert {
                before, inserted, ..
            } => {
                let Some(pos) = remaining.find(before) else {
                    continue;
                };
                let end = pos + before.len();
                segments.push(Segment::plain(&remaining[..end]));
                if shown {
                    segments.push(Segment {
                        kind: SegmentKind::Insertion,
                        text: format!(" {inserted}"),
                    });
                }
                remaining = &remaining[end..];
            }
        }
    }

    segments.push(Segment::plain(remaining));
    segments.retain(|s| !s.text.is_empty());
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{ACT2, ProofreadTiming};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn run(seq: &mut DiffRevealSequencer, until: Duration) -> Vec<DiffEvent> {
        let mut events = Vec::new();
        while let Some(deadline) = seq.next_deadline() {
            if deadline > until {
                break;
            }
            events.extend(seq.advance(deadline));
        }
        events
    }

    fn completions(events: &[DiffEvent]) -> Vec<Epoch> {
        events
            .iter()
            .filter_map(|e| match e {
                DiffEvent::Completed { epoch } => Some(*epoch),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_guided_accept_all_scenario() {
        let timing = ACT2.timing;
        let mut seq = DiffRevealSequencer::new(ACT2, true);
        seq.activate(ACT2, ms(0));
        assert_eq!(seq.phase(), DiffPhase::Scanning);

        let reveal_done = timing.scanning_delay + timing.diff_stagger_delay * 2;
        let mut events = run(&mut seq, reveal_done);
        assert_eq!(seq.phase(), DiffPhase::ShowingDiffs);
        assert_eq!(seq.visible_count(), 2);

        // Parked: nothing else fires without the accept signal.
        events.extend(run(&mut seq, ms(60_000)));
        assert_eq!(seq.phase(), DiffPhase::ShowingDiffs);
        assert!(events.contains(&DiffEvent::AllVisible { epoch: seq.epoch() }));

        assert!(seq.accept(ms(60_000)).is_some());
        assert_eq!(seq.phase(), DiffPhase::Accepting);

        events.extend(run(
            &mut seq,
            ms(60_000) + timing.resolve_animation_duration,
        ));
        assert_eq!(seq.phase(), DiffPhase::Clean);
        assert_eq!(completions(&events).len(), 1);
    }

    #[test]
    fn test_auto_accepts_after_delay() {
        let t = ACT2.timing;
        let mut seq = DiffRevealSequencer::new(ACT2, false);
        seq.activate(ACT2, ms(0));
        let accept_at =
            t.scanning_delay + t.diff_stagger_delay + t.diffs_visible_grace + t.accept_all_delay;
        run(&mut seq, accept_at - ms(1));
        assert_eq!(seq.phase(), DiffPhase::ShowingDiffs);
        run(&mut seq, accept_at);
        assert_eq!(seq.phase(), DiffPhase::Accepting);
        let events = run(&mut seq, accept_at + t.resolve_animation_duration);
        assert_eq!(completions(&events).len(), 1);
    }

    #[test]
    fn test_accept_outside_showing_is_ignored() {
        let mut seq = DiffRevealSequencer::new(ACT2, true);
        assert!(seq.accept(ms(0)).is_none());
        seq.activate(ACT2, ms(0));
        assert!(seq.accept(ms(10)).is_none());
        assert_eq!(seq.phase(), DiffPhase::Scanning);
    }

    #[test]
    fn test_cancelled_run_never_completes() {
        static ONE_DIFF: &[ScriptedDiff] = &[ScriptedDiff::Replace {
            original: "handcrafed",
            corrected: "handcrafted",
            description: "typo",
        }];
        let other = ProofreadScript {
            diffs: ONE_DIFF,
            timing: ProofreadTiming {
                scanning_delay: ms(100),
                ..ACT2.timing
            },
            ..ACT2
        };

        let mut seq = DiffRevealSequencer::new(ACT2, false);
        seq.activate(ACT2, ms(0));
        let mut events = run(&mut seq, ms(1_300));
        let stale = seq.epoch();
        seq.deactivate();
        assert_eq!(seq.phase(), DiffPhase::Idle);

        seq.activate(other, ms(1_300));
        let fresh = seq.epoch();
        assert_ne!(stale, fresh);
        events.extend(run(&mut seq, ms(60_000)));

        assert_eq!(completions(&events), vec![fresh]);
        assert_eq!(seq.total(), 1);
    }

    #[test]
    fn test_segments_mark_visible_diffs() {
        let segments = scripted_segments(ACT2.text_with_errors, ACT2.diffs, 1, false);
        let deletions: Vec<&str> = segments
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::Deletion { .. }))
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(deletions, vec!["handcrafed"]);
        assert!(!segments.iter().any(|s| s.text == " afford"));

        let all = scripted_segments(ACT2.text_with_errors, ACT2.diffs, 2, true);
        assert!(all.iter().any(|s| s.text == " afford"));
        assert!(all
            .iter()
            .any(|s| s.kind == SegmentKind::Deletion { resolved: true }));
    }

    #[test]
    fn test_segments_without_visible_diffs_reproduce_text() {
        let segments = scripted_segments(ACT2.text_with_errors, ACT2.diffs, 0, false);
        let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, ACT2.text_with_errors);
    }
}
