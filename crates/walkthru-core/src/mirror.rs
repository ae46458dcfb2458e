//! The mirrored camera instance.
//!
//! Small viewports do not show the interactive walkthrough. They show a
//! second, auto-playing walkthrough through the camera instead, and this rig
//! owns that pairing on its own virtual clock.

use std::time::Duration;

use serde::Serialize;

use crate::camera::{CameraDirector, CameraShot, CameraTransform, SHOTS, Viewport, project};
use crate::model::PlaybackMode;
use crate::timer::earliest;
use crate::walkthrough::{Walkthrough, WalkthroughEffect, WalkthroughOptions};

/// The camera cut to `shot` at virtual time `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShotChange {
    #[serde(serialize_with = "as_millis")]
    pub at: Duration,
    pub shot: usize,
}

impl ShotChange {
    pub fn shot(&self) -> &'static CameraShot {
        &SHOTS[self.shot]
    }
}

fn as_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(value.as_millis() as u64)
}

#[derive(Debug)]
pub struct CameraRig {
    walkthrough: Walkthrough,
    director: CameraDirector,
}

impl CameraRig {
    /// Mounts an auto-mode walkthrough. `auto_loop` keeps it replaying.
    pub fn new(auto_loop: bool) -> Self {
        let mut options = WalkthroughOptions::new(PlaybackMode::Auto);
        options.auto_loop = auto_loop;
        let walkthrough = Walkthrough::new(options);
        let mut director = CameraDirector::new();
        director.observe(walkthrough.snapshot(), Duration::ZERO);
        Self {
            walkthrough,
            director,
        }
    }

    pub fn walkthrough(&self) -> &Walkthrough {
        &self.walkthrough
    }

    pub fn director(&self) -> &CameraDirector {
        &self.director
    }

    pub fn now(&self) -> Duration {
        self.walkthrough.now()
    }

    /// Target transform of the current shot for `viewport`.
    pub fn transform(&self, viewport: Viewport) -> CameraTransform {
        project(self.director.shot(), viewport)
    }

    /// Earliest pending timer of either the walkthrough or the director.
    pub fn next_deadline(&self) -> Option<Duration> {
        earliest([
            self.walkthrough.next_deadline(),
            self.director.next_deadline(),
        ])
    }

    /// Runs both clocks up to `target`, interleaving their timers in
    /// deadline order so every snapshot reaches the director on time.
    pub fn advance_to(&mut self, target: Duration) -> Vec<ShotChange> {
        let mut changes = Vec::new();
        while let Some(at) = self.next_deadline().filter(|at| *at <= target) {
            let at = at.max(self.now());
            let effects = self.walkthrough.advance_to(at);
            self.observe(effects, at, &mut changes);
            if let Some(shot) = self.director.advance(at) {
                changes.push(ShotChange { at, shot });
            }
        }
        let effects = self.walkthrough.advance_to(target);
        self.observe(effects, target, &mut changes);
        changes
    }

    pub fn advance_by(&mut self, delta: Duration) -> Vec<ShotChange> {
        self.advance_to(self.now() + delta)
    }

    fn observe(
        &mut self,
        effects: Vec<WalkthroughEffect>,
        at: Duration,
        changes: &mut Vec<ShotChange>,
    ) {
        for effect in effects {
            if let WalkthroughEffect::Snapshot(snapshot) = effect
                && let Some(shot) = self.director.observe(snapshot, at)
            {
                changes.push(ShotChange { at, shot });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{
        FINALE_SHOT, FINALE_SHOT_DWELL, FULL_REVEAL_SHOT, SIDEBAR_REVEAL_SHOT, WIDE_HOLD,
    };
    use crate::model::WalkthroughState;

    #[test]
    fn test_mirror_holds_wide_then_follows_the_acts() {
        let mut rig = CameraRig::new(false);
        assert_eq!(rig.director().shot_index(), 0);

        let changes = rig.advance_to(Duration::from_secs(120));
        assert_eq!(rig.walkthrough().state(), WalkthroughState::Act3Complete);

        let first = changes.first().unwrap();
        assert!(first.at >= WIDE_HOLD);
        assert!(changes.windows(2).all(|pair| pair[0].at <= pair[1].at));

        // After the insert the sidebar opens and the reveal shots play out
        // on their timers before the finale.
        let shots: Vec<usize> = changes.iter().map(|c| c.shot).collect();
        assert_eq!(
            &shots[shots.len() - 4..],
            &[8, SIDEBAR_REVEAL_SHOT, FULL_REVEAL_SHOT, FINALE_SHOT]
        );
        let tail = &changes[changes.len() - 3..];
        assert_eq!(tail[1].at - tail[0].at, FINALE_SHOT_DWELL);
        assert_eq!(tail[2].at - tail[1].at, FINALE_SHOT_DWELL);
        assert!(changes.last().unwrap().shot().caption_link.is_some());
        assert_eq!(rig.director().shot_index(), FINALE_SHOT);
    }

    #[test]
    fn test_split_advances_match_a_single_advance() {
        let mut whole = CameraRig::new(false);
        let expected = whole.advance_to(Duration::from_secs(40));

        let mut stepped = CameraRig::new(false);
        let mut changes = Vec::new();
        for _ in 0..400 {
            changes.extend(stepped.advance_by(Duration::from_millis(100)));
        }
        assert_eq!(changes, expected);
    }

    #[test]
    fn test_transform_tracks_current_shot() {
        let mut rig = CameraRig::new(false);
        let viewport = Viewport::default();
        let wide = rig.transform(viewport);
        rig.advance_to(Duration::from_secs(5));
        assert_ne!(rig.director().shot_index(), 0);
        assert_ne!(rig.transform(viewport), wide);
    }
}
