//! TUI state.
//!
//! `AppState` is owned by the runtime, mutated only by the reducer and read
//! by render. Virtual time lives inside the walkthroughs; this module only
//! decides how much of it passes per wall-clock tick.

use std::time::Duration;

use anyhow::Result;
use ratatui::layout::Rect;
use walkthru_core::camera::{CAPTION_CARD_HEIGHT, CameraTransform, SHOTS, Viewport, project};
use walkthru_core::host::{Host, Theme};
use walkthru_core::mirror::{CameraRig, ShotChange};
use walkthru_core::tooltip;
use walkthru_core::{Walkthrough, WalkthroughOptions};

use crate::layout::Panes;

/// Approximate pixel size of one terminal cell, used wherever the core
/// expects pixels (viewport thresholds, camera projection).
pub const CELL_WIDTH_PX: f64 = 10.0;
pub const CELL_HEIGHT_PX: f64 = 20.0;

/// Rows taken by the caption card under the camera stage.
pub const CAPTION_ROWS: u16 = (CAPTION_CARD_HEIGHT / CELL_HEIGHT_PX) as u16;

const MIN_SPEED: f64 = 0.25;
const MAX_SPEED: f64 = 8.0;

/// Everything the interactive session needs to start.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub walkthrough: WalkthroughOptions,
    pub theme: Theme,
    pub speed: f64,
    pub tick: Duration,
    /// Keep the mirrored camera instance looping.
    pub mirror_loop: bool,
}

/// Which presentation fills the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The interactive editor scene.
    Editor,
    /// The mirrored auto instance seen through the camera.
    Camera,
}

/// Playback speed and pause, applied to wall-clock ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    pub speed: f64,
    pub paused: bool,
}

impl Clock {
    pub fn new(speed: f64) -> Self {
        Self {
            speed: speed.clamp(MIN_SPEED, MAX_SPEED),
            paused: false,
        }
    }

    /// Virtual time that passes during `elapsed` of wall time.
    pub fn scale(&self, elapsed: Duration) -> Duration {
        if self.paused {
            Duration::ZERO
        } else {
            elapsed.mul_f64(self.speed)
        }
    }

    pub fn faster(&mut self) {
        self.speed = (self.speed * 2.0).min(MAX_SPEED);
    }

    pub fn slower(&mut self) {
        self.speed = (self.speed / 2.0).max(MIN_SPEED);
    }
}

/// The terminal as seen by the walkthrough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalHost {
    pub width: u16,
    pub height: u16,
    pub sidebar_open: bool,
    /// Header and footer hidden.
    pub fullscreen: bool,
}

impl TerminalHost {
    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn panes(&self) -> Panes {
        Panes::compute(self.area(), self.sidebar_open, !self.fullscreen)
    }
}

impl Host for TerminalHost {
    fn viewport(&self) -> Viewport {
        Viewport::new(
            f64::from(self.width) * CELL_WIDTH_PX,
            f64::from(self.height) * CELL_HEIGHT_PX,
        )
    }

    fn resolve_anchor(&self, name: &str) -> Option<tooltip::Rect> {
        self.panes().anchor(name).map(|rect| {
            tooltip::Rect::new(
                f64::from(rect.x),
                f64::from(rect.y),
                f64::from(rect.width),
                f64::from(rect.height),
            )
        })
    }

    /// Terminals are already full screen; this hides the chrome instead.
    fn request_fullscreen(&mut self) -> Result<()> {
        self.fullscreen = !self.fullscreen;
        Ok(())
    }
}

/// Where the camera is coming from, for blending into the current shot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMotion {
    from: CameraTransform,
    cut_at: Duration,
}

impl CameraMotion {
    pub fn new(initial: CameraTransform) -> Self {
        Self {
            from: initial,
            cut_at: Duration::ZERO,
        }
    }

    /// Starts a transition at `at`, from wherever the camera was heading
    /// towards `previous`.
    pub fn cut(&mut self, previous: CameraTransform, at: Duration) {
        self.from = previous.blend(&self.from, at.saturating_sub(self.cut_at));
        self.cut_at = at;
    }

    /// Transform on screen at `now` while heading for `target`.
    pub fn live(&self, target: CameraTransform, now: Duration) -> CameraTransform {
        target.blend(&self.from, now.saturating_sub(self.cut_at))
    }
}

pub struct AppState {
    pub walkthrough: Walkthrough,
    pub mirror: CameraRig,
    pub camera: CameraMotion,
    pub theme: Theme,
    pub clock: Clock,
    pub host: TerminalHost,
    /// Forces a view regardless of terminal size.
    pub view_override: Option<View>,
    pub should_quit: bool,
    /// One-line message shown in the footer until the next key press.
    pub notice: Option<String>,
    pub spinner_frame: usize,
}

impl AppState {
    pub fn new(options: &SessionOptions) -> Self {
        let mirror = CameraRig::new(options.mirror_loop);
        let camera = CameraMotion::new(project(mirror.director().shot(), Viewport::default()));
        Self {
            walkthrough: Walkthrough::new(options.walkthrough),
            mirror,
            camera,
            theme: options.theme,
            clock: Clock::new(options.speed),
            host: TerminalHost::default(),
            view_override: None,
            should_quit: false,
            notice: None,
            spinner_frame: 0,
        }
    }

    pub fn view(&self) -> View {
        self.view_override.unwrap_or_else(|| {
            if self.host.viewport().is_compact() {
                View::Camera
            } else {
                View::Editor
            }
        })
    }

    /// Pixel viewport of the camera stage (terminal minus caption card).
    pub fn stage_viewport(&self) -> Viewport {
        let rows = self.host.height.saturating_sub(CAPTION_ROWS);
        Viewport::new(
            f64::from(self.host.width) * CELL_WIDTH_PX,
            f64::from(rows) * CELL_HEIGHT_PX,
        )
    }

    /// Runs the mirrored instance forward and starts a camera transition
    /// for every cut it made.
    pub fn advance_mirror(&mut self, delta: Duration) -> Vec<ShotChange> {
        let viewport = self.stage_viewport();
        let mut previous = self.mirror.director().shot_index();
        let changes = self.mirror.advance_by(delta);
        for change in &changes {
            self.camera.cut(project(&SHOTS[previous], viewport), change.at);
            previous = change.shot;
        }
        changes
    }

    /// Camera transform on screen right now.
    pub fn live_camera(&self) -> CameraTransform {
        let target = self.mirror.transform(self.stage_viewport());
        self.camera.live(target, self.mirror.now())
    }
}

#[cfg(test)]
mod tests {
    use walkthru_core::PlaybackMode;

    use super::*;

    fn options(mode: PlaybackMode) -> SessionOptions {
        SessionOptions {
            walkthrough: WalkthroughOptions::new(mode),
            theme: Theme::Dark,
            speed: 1.0,
            tick: Duration::from_millis(33),
            mirror_loop: false,
        }
    }

    #[test]
    fn test_clock_scales_and_pauses() {
        let mut clock = Clock::new(2.0);
        assert_eq!(clock.scale(Duration::from_millis(100)), Duration::from_millis(200));
        clock.paused = true;
        assert_eq!(clock.scale(Duration::from_millis(100)), Duration::ZERO);
    }

    #[test]
    fn test_clock_speed_is_bounded() {
        let mut clock = Clock::new(100.0);
        assert_eq!(clock.speed, MAX_SPEED);
        clock.faster();
        assert_eq!(clock.speed, MAX_SPEED);
        for _ in 0..10 {
            clock.slower();
        }
        assert_eq!(clock.speed, MIN_SPEED);
    }

    #[test]
    fn test_small_terminals_get_the_camera() {
        let mut app = AppState::new(&options(PlaybackMode::Guided));
        app.host.width = 60;
        app.host.height = 40;
        assert_eq!(app.view(), View::Camera);

        app.host.width = 140;
        assert_eq!(app.view(), View::Editor);

        app.view_override = Some(View::Camera);
        assert_eq!(app.view(), View::Camera);
    }

    #[test]
    fn test_host_resolves_anchors_in_cells() {
        let host = TerminalHost {
            width: 140,
            height: 40,
            sidebar_open: false,
            fullscreen: false,
        };
        let rect = host.resolve_anchor("chat-input").unwrap();
        assert!(rect.x > 70.0);
        assert_eq!(rect.height, 3.0);
        assert!(host.resolve_anchor("sidebar").is_none());
        assert_eq!(host.viewport(), Viewport::new(1400.0, 800.0));
    }

    #[test]
    fn test_fullscreen_request_hides_chrome() {
        let mut host = TerminalHost {
            width: 120,
            height: 30,
            ..TerminalHost::default()
        };
        host.request_fullscreen().unwrap();
        assert!(host.fullscreen);
        assert_eq!(host.panes().header.height, 0);
    }

    #[test]
    fn test_camera_blends_from_previous_shot() {
        let mut app = AppState::new(&options(PlaybackMode::Guided));
        app.host.width = 40;
        app.host.height = 34;
        let wide = app.live_camera();

        let changes = app.advance_mirror(Duration::from_millis(2600));
        let first = changes.first().unwrap();
        let target = app.mirror.transform(app.stage_viewport());

        // Right after the cut the camera has barely moved.
        let just_cut = app.camera.live(target, first.at);
        assert_eq!(just_cut.scale, wide.scale);

        let settled = app.camera.live(target, first.at + Duration::from_secs(5));
        assert_eq!(settled, target);
    }
}
