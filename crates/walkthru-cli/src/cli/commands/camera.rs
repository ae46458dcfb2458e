//! Camera command handler.
//!
//! Films the mirrored auto walkthrough and prints one line per cut with the
//! transform for the given viewport.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use walkthru_core::camera::{CameraTransform, SHOTS, Viewport, project};
use walkthru_core::mirror::{CameraRig, ShotChange};

pub struct CameraRunOptions {
    pub width: f64,
    pub height: f64,
    pub duration: Duration,
    pub auto_loop: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Cut {
    #[serde(flatten)]
    change: ShotChange,
    id: &'static str,
    caption: &'static str,
    caption_link: Option<&'static str>,
    transform: CameraTransform,
    transition: String,
}

pub fn run(options: &CameraRunOptions) -> Result<()> {
    if !(options.width > 0.0 && options.height > 0.0) {
        anyhow::bail!(
            "viewport must be positive, got {}x{}",
            options.width,
            options.height
        );
    }
    let viewport = Viewport::new(options.width, options.height);
    if !viewport.is_compact() {
        tracing::info!(
            width = options.width,
            height = options.height,
            "viewport is not compact; the camera would normally stay off"
        );
    }

    for cut in film(viewport, options.duration, options.auto_loop) {
        if options.json {
            let line = serde_json::to_string(&cut).context("serialize camera cut")?;
            println!("{line}");
        } else {
            println!(
                "{:>8.2}s  #{:<2} {:<20} {}  {}  {}",
                cut.change.at.as_secs_f64(),
                cut.change.shot,
                cut.id,
                cut.transform,
                cut.transition,
                cut.caption,
            );
        }
    }
    Ok(())
}

/// Every cut up to `duration`, starting with the opening shot at zero.
fn film(viewport: Viewport, duration: Duration, auto_loop: bool) -> Vec<Cut> {
    let mut rig = CameraRig::new(auto_loop);
    let opening = ShotChange {
        at: Duration::ZERO,
        shot: rig.director().shot_index(),
    };
    let mut changes = vec![opening];
    changes.extend(rig.advance_to(duration));

    changes
        .into_iter()
        .map(|change| {
            let shot = &SHOTS[change.shot];
            let transform = project(shot, viewport);
            Cut {
                change,
                id: shot.id,
                caption: shot.caption,
                caption_link: shot.caption_link,
                transition: transform.transition_css(),
                transform,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use walkthru_core::camera::FINALE_SHOT;

    use super::*;

    #[test]
    fn test_film_opens_wide_and_ends_on_finale() {
        let cuts = film(Viewport::default(), Duration::from_secs(120), false);
        let first = &cuts[0];
        assert_eq!(first.change.at, Duration::ZERO);
        assert_eq!(first.id, "wide-open");
        assert_eq!(first.transition, "none");

        let ids: Vec<&str> = cuts.iter().map(|c| c.id).collect();
        assert_eq!(&ids[ids.len() - 3..], &["sidebar-reveal", "full-reveal", "finale"]);

        let last = cuts.last().unwrap();
        assert_eq!(last.change.shot, FINALE_SHOT);
        assert!(last.caption_link.is_some());
    }

    #[test]
    fn test_chat_input_shot_on_default_phone() {
        let cuts = film(Viewport::default(), Duration::from_secs(5), false);
        let typing = cuts.iter().find(|c| c.id == "chat-input-typing").unwrap();
        assert!((typing.transform.translate_x - -951.0).abs() < 1e-9);
        assert!((typing.transform.translate_y - -557.5).abs() < 1e-9);
        assert_eq!(typing.transition, "transform 800ms cubic-bezier(0.16, 1, 0.3, 1)");
    }

    #[test]
    fn test_cut_serializes_time_in_millis() {
        let cuts = film(Viewport::default(), Duration::from_secs(5), false);
        let json = serde_json::to_value(&cuts[1]).unwrap();
        assert_eq!(json["at"], cuts[1].change.at.as_millis() as u64);
        assert_eq!(json["shot"], 1);
    }
}
