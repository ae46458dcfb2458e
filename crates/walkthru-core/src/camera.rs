//! Virtual camera for small viewports.
//!
//! The full walkthrough is laid out on a fixed 1200×800 canvas. On compact
//! viewports a camera pans and zooms across that canvas, one scripted shot
//! per moment of the demo, with a caption card underneath.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::model::{ResearchPhase, WalkthroughState};
use crate::script::SIGN_UP_URL;
use crate::snapshot::Snapshot;
use crate::timer::{Timer, earliest};

pub const CANVAS_WIDTH: f64 = 1200.0;
pub const CANVAS_HEIGHT: f64 = 800.0;

/// Caption card height subtracted from the default phone viewport.
pub const CAPTION_CARD_HEIGHT: f64 = 80.0;

/// How long the establishing shot holds once act 1 starts.
pub const WIDE_HOLD: Duration = Duration::from_millis(2000);

/// Dwell time of each timed finale shot.
pub const FINALE_SHOT_DWELL: Duration = Duration::from_millis(3000);

pub const SIDEBAR_REVEAL_SHOT: usize = 9;
pub const FULL_REVEAL_SHOT: usize = 10;
pub const FINALE_SHOT: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Ease,
    OutExpo,
    OutCubic,
}

impl Easing {
    pub fn as_css(self) -> &'static str {
        match self {
            Easing::Ease => "ease",
            Easing::OutExpo => "cubic-bezier(0.16, 1, 0.3, 1)",
            Easing::OutCubic => "cubic-bezier(0.33, 1, 0.68, 1)",
        }
    }

    /// Eased progress for linear progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            // Close enough to CSS `ease` for terminal interpolation.
            Easing::Ease => t * t * (3.0 - 2.0 * t),
            Easing::OutExpo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::OutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraShot {
    pub id: &'static str,
    pub scale: f64,
    pub origin_x: f64,
    pub origin_y: f64,
    pub caption: &'static str,
    pub caption_link: Option<&'static str>,
    /// Transition into this shot; zero snaps.
    pub transition: Duration,
    pub easing: Easing,
}

const fn shot(
    id: &'static str,
    scale: f64,
    origin: (f64, f64),
    caption: &'static str,
    transition_ms: u64,
    easing: Easing,
) -> CameraShot {
    CameraShot {
        id,
        scale,
        origin_x: origin.0,
        origin_y: origin.1,
        caption,
        caption_link: None,
        transition: Duration::from_millis(transition_ms),
        easing,
    }
}

pub const SHOTS: [CameraShot; 12] = [
    shot(
        "wide-open",
        0.31,
        (600.0, 400.0),
        "Meet your AI writing team.",
        0,
        Easing::Ease,
    ),
    shot(
        "chat-input-typing",
        1.15,
        (990.0, 740.0),
        "When you need a hand, just talk to your AI buddy.",
        800,
        Easing::OutExpo,
    ),
    shot(
        "message-sent",
        1.1,
        (990.0, 480.0),
        "Watch what happens next\u{2026}",
        600,
        Easing::OutCubic,
    ),
    shot(
        "text-morph",
        1.1,
        (430.0, 400.0),
        "Words move like magic. Right in your doc.",
        800,
        Easing::OutCubic,
    ),
    shot(
        "rewrite-diffs",
        1.1,
        (430.0, 400.0),
        "Rough notes \u{2192} polished prose.",
        400,
        Easing::Ease,
    ),
    shot(
        "proofread-diffs",
        1.25,
        (430.0, 380.0),
        "Catches typos and missing words.",
        500,
        Easing::OutCubic,
    ),
    shot(
        "research-typing",
        1.15,
        (990.0, 740.0),
        "Need to research something? Just ask.",
        800,
        Easing::OutCubic,
    ),
    shot(
        "research-response",
        1.0,
        (990.0, 400.0),
        "Sources included. One click to insert.",
        600,
        Easing::OutCubic,
    ),
    shot(
        "insert-to-doc",
        1.0,
        (430.0, 500.0),
        "Research flows right into your document.",
        600,
        Easing::OutCubic,
    ),
    shot(
        "sidebar-reveal",
        0.45,
        (500.0, 400.0),
        "Everything lives in one project.",
        1000,
        Easing::OutExpo,
    ),
    shot(
        "full-reveal",
        0.36,
        (600.0, 400.0),
        "Drafts, research, notes. Nothing gets lost.",
        1000,
        Easing::OutExpo,
    ),
    CameraShot {
        caption_link: Some(SIGN_UP_URL),
        ..shot(
            "finale",
            0.31,
            (600.0, 400.0),
            "Try Inkstone for FREE \u{2192}",
            600,
            Easing::OutCubic,
        )
    },
];

/// Picks the shot for a snapshot.
///
/// Later-act conditions are checked first: a snapshot can satisfy several
/// stale predicates at once and the most advanced one wins.
pub fn select_shot(snapshot: &Snapshot) -> usize {
    let Snapshot {
        state,
        chat_typing_done,
        sidebar_open,
        research_phase,
        ..
    } = *snapshot;

    if state == WalkthroughState::Act3Complete && sidebar_open {
        return FINALE_SHOT;
    }
    if sidebar_open {
        return SIDEBAR_REVEAL_SHOT;
    }
    match research_phase {
        ResearchPhase::Inserted | ResearchPhase::Inserting => return 8,
        ResearchPhase::ResponseVisible => return 7,
        ResearchPhase::Idle | ResearchPhase::Loading => {}
    }
    match state {
        WalkthroughState::Act3 if chat_typing_done => 7,
        WalkthroughState::Act3 => 6,
        WalkthroughState::Act2 | WalkthroughState::Act2Complete => 5,
        WalkthroughState::Act1Complete => 4,
        WalkthroughState::Act1 if chat_typing_done => 3,
        WalkthroughState::Act1 => 1,
        _ => 0,
    }
}

// ============================================================================
// Projection
// ============================================================================

/// The visible area the canvas is projected into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Portrait phones, and landscape phones that are short as well as narrow.
    pub fn is_compact(&self) -> bool {
        self.width < 768.0 || (self.width < 1024.0 && self.height < 500.0)
    }
}

impl Default for Viewport {
    /// A 375×667 phone minus the caption card.
    fn default() -> Self {
        Self::new(375.0, 667.0 - CAPTION_CARD_HEIGHT)
    }
}

/// `translate(tx, ty) scale(s)` applied with a top-left transform origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
    pub transition: Duration,
    pub easing: Easing,
}

impl CameraTransform {
    /// Maps a canvas point into viewport coordinates.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.translate_x + x * self.scale,
            self.translate_y + y * self.scale,
        )
    }

    /// Maps a viewport point back onto the canvas.
    pub fn unapply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.translate_x) / self.scale,
            (y - self.translate_y) / self.scale,
        )
    }

    /// Interpolates from `from` towards `self`, `elapsed` into the transition.
    pub fn blend(&self, from: &CameraTransform, elapsed: Duration) -> CameraTransform {
        if self.transition.is_zero() || elapsed >= self.transition {
            return *self;
        }
        let t = self
            .easing
            .apply(elapsed.as_secs_f64() / self.transition.as_secs_f64());
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        CameraTransform {
            translate_x: lerp(from.translate_x, self.translate_x),
            translate_y: lerp(from.translate_y, self.translate_y),
            scale: lerp(from.scale, self.scale),
            ..*self
        }
    }

    pub fn transition_css(&self) -> String {
        if self.transition.is_zero() {
            "none".to_string()
        } else {
            format!(
                "transform {}ms {}",
                self.transition.as_millis(),
                self.easing.as_css()
            )
        }
    }
}

impl fmt::Display for CameraTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

/// Centres the shot's origin in the viewport at the shot's scale.
pub fn project(shot: &CameraShot, viewport: Viewport) -> CameraTransform {
    CameraTransform {
        translate_x: viewport.width / 2.0 - shot.origin_x * shot.scale,
        translate_y: viewport.height / 2.0 - shot.origin_y * shot.scale,
        scale: shot.scale,
        transition: shot.transition,
        easing: shot.easing,
    }
}

// ============================================================================
// Director
// ============================================================================

/// Follows a stream of snapshots and decides which shot is on screen.
#[derive(Debug)]
pub struct CameraDirector {
    shot: usize,
    holding_wide: bool,
    hold_timer: Timer,
    shot_timer: Timer,
    last: Option<Snapshot>,
}

impl Default for CameraDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDirector {
    pub fn new() -> Self {
        Self {
            shot: 0,
            holding_wide: true,
            hold_timer: Timer::default(),
            shot_timer: Timer::default(),
            last: None,
        }
    }

    pub fn shot_index(&self) -> usize {
        self.shot
    }

    pub fn shot(&self) -> &'static CameraShot {
        &SHOTS[self.shot]
    }

    pub fn is_holding(&self) -> bool {
        self.holding_wide
    }

    /// Feeds a snapshot. Returns the new shot index if the shot changed.
    pub fn observe(&mut self, snapshot: Snapshot, now: Duration) -> Option<usize> {
        self.last = Some(snapshot);
        if self.holding_wide {
            if snapshot.state == WalkthroughState::Act1 && !self.hold_timer.is_armed() {
                self.hold_timer.arm(now, WIDE_HOLD);
                debug!("camera holding wide shot");
            }
            return None;
        }
        self.follow(&snapshot, now)
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([self.hold_timer.deadline(), self.shot_timer.deadline()])
    }

    /// Fires due timers. Returns the new shot index if the shot changed.
    pub fn advance(&mut self, now: Duration) -> Option<usize> {
        let mut changed = None;
        if self.hold_timer.fire_if_due(now) {
            self.holding_wide = false;
            if let Some(snapshot) = self.last {
                changed = self.follow(&snapshot, now);
            }
        }
        if self.shot_timer.fire_if_due(now) {
            let next = match self.shot {
                SIDEBAR_REVEAL_SHOT => Some(FULL_REVEAL_SHOT),
                FULL_REVEAL_SHOT => Some(FINALE_SHOT),
                _ => None,
            };
            if let Some(next) = next {
                self.cut_to(next, now);
                changed = Some(next);
            }
        }
        changed
    }

    fn follow(&mut self, snapshot: &Snapshot, now: Duration) -> Option<usize> {
        let mut target = select_shot(snapshot).min(SHOTS.len() - 1);
        // The timed finale shots outrank a plain "sidebar open" snapshot.
        if target == SIDEBAR_REVEAL_SHOT && self.shot > SIDEBAR_REVEAL_SHOT {
            return None;
        }
        // The finale is only reached through the reveal chain.
        if target == FINALE_SHOT {
            match self.shot {
                SIDEBAR_REVEAL_SHOT | FULL_REVEAL_SHOT => return None,
                FINALE_SHOT => {}
                _ => target = SIDEBAR_REVEAL_SHOT,
            }
        }
        if target == self.shot {
            return None;
        }
        self.cut_to(target, now);
        Some(target)
    }

    fn cut_to(&mut self, index: usize, now: Duration) {
        self.shot = index;
        match index {
            SIDEBAR_REVEAL_SHOT | FULL_REVEAL_SHOT => self.shot_timer.arm(now, FINALE_SHOT_DWELL),
            _ => self.shot_timer.cancel(),
        }
        debug!(shot = SHOTS[index].id, "camera cut");
    }
}
