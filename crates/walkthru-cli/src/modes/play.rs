//! Headless playback.
//!
//! Drives one walkthrough from a tokio interval, applies line commands from
//! an input stream between ticks and writes every outbound effect to an
//! output stream. Stops on cancellation, at the end of input when the
//! walkthrough cannot finish on its own, after `loops` finales, or once
//! `duration` of virtual time has passed.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkthru_core::host::{Theme, ThemeChannel};
use walkthru_core::{
    Act, Snapshot, Walkthrough, WalkthroughEffect, WalkthroughOptions, WalkthroughState,
};

#[derive(Debug, Clone, Copy)]
pub struct PlayOptions {
    pub walkthrough: WalkthroughOptions,
    pub theme: Theme,
    pub speed: f64,
    pub tick: Duration,
    pub json: bool,
    /// Finales to play before stopping; 0 plays forever.
    pub loops: u32,
    pub duration: Option<Duration>,
}

/// One line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Cta,
    Accept,
    Insert,
    Sidebar,
    Replay,
    Select(Act),
    Complete(Act),
    /// Stop reading input until this much more virtual time has passed.
    Wait(Duration),
    Quit,
    /// A raw message for the theme channel.
    Message(String),
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.starts_with('{') {
            return Some(Command::Message(line.to_string()));
        }
        let mut words = line.split_whitespace();
        let command = match (words.next()?, words.next()) {
            ("cta" | "next", None) => Command::Cta,
            ("accept", None) => Command::Accept,
            ("insert", None) => Command::Insert,
            ("sidebar", None) => Command::Sidebar,
            ("replay", None) => Command::Replay,
            ("quit", None) => Command::Quit,
            ("select", Some(act)) => Command::Select(Act::parse(act)?),
            ("complete", Some(act)) => Command::Complete(Act::parse(act)?),
            ("wait", Some(ms)) => Command::Wait(Duration::from_millis(ms.parse().ok()?)),
            _ => return None,
        };
        words.next().is_none().then_some(command)
    }
}

/// Output record in `--json` mode.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum PlayEvent<'a> {
    Snapshot {
        at_ms: u64,
        #[serde(flatten)]
        snapshot: &'a Snapshot,
        tour_step: Option<&'static str>,
    },
    OpenLink {
        at_ms: u64,
        url: &'static str,
    },
    TourFinished {
        at_ms: u64,
    },
    Theme {
        at_ms: u64,
        theme: Theme,
    },
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayOutcome {
    pub now: Duration,
    pub state: WalkthroughState,
    pub finales: u32,
    pub theme: Theme,
}

struct Player<'w, W> {
    walkthrough: Walkthrough,
    options: PlayOptions,
    out: &'w mut W,
    last_state: WalkthroughState,
    finales: u32,
    finished: bool,
}

impl<W: AsyncWrite + Unpin> Player<'_, W> {
    fn at_ms(&self) -> u64 {
        self.walkthrough.now().as_millis() as u64
    }

    async fn emit(&mut self, effects: Vec<WalkthroughEffect>) -> Result<()> {
        for effect in effects {
            match effect {
                WalkthroughEffect::Snapshot(snapshot) => {
                    let entered = snapshot.state != self.last_state;
                    self.last_state = snapshot.state;
                    if entered && snapshot.state == WalkthroughState::Act3Complete {
                        self.finales += 1;
                        if self.options.loops != 0 && self.finales >= self.options.loops {
                            self.finished = true;
                        }
                    }
                    self.write_snapshot(&snapshot).await?;
                }
                WalkthroughEffect::OpenLink(url) => {
                    let line = if self.options.json {
                        json_line(&PlayEvent::OpenLink {
                            at_ms: self.at_ms(),
                            url,
                        })?
                    } else {
                        format!("{:>8.2}s  open {url}\n", self.walkthrough.now().as_secs_f64())
                    };
                    self.write(&line).await?;
                }
                WalkthroughEffect::TourFinished => {
                    self.finished = true;
                    let line = if self.options.json {
                        json_line(&PlayEvent::TourFinished {
                            at_ms: self.at_ms(),
                        })?
                    } else {
                        format!("{:>8.2}s  tour finished\n", self.walkthrough.now().as_secs_f64())
                    };
                    self.write(&line).await?;
                }
            }
        }
        Ok(())
    }

    async fn write_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let tour_step = self
            .walkthrough
            .tour()
            .and_then(|tour| tour.current())
            .map(|step| step.id);
        let line = if self.options.json {
            json_line(&PlayEvent::Snapshot {
                at_ms: self.at_ms(),
                snapshot,
                tour_step,
            })?
        } else {
            format!(
                "{:>8.2}s  {:<14} typed={:<5} diffs={:<5} sidebar={:<5} research={}{}\n",
                self.walkthrough.now().as_secs_f64(),
                snapshot.state.as_str(),
                snapshot.chat_typing_done,
                snapshot.diffs_visible,
                snapshot.sidebar_open,
                snapshot.research_phase.as_str(),
                tour_step.map(|id| format!("  step={id}")).unwrap_or_default(),
            )
        };
        self.write(&line).await
    }

    async fn write_theme(&mut self, theme: Theme) -> Result<()> {
        let line = if self.options.json {
            json_line(&PlayEvent::Theme {
                at_ms: self.at_ms(),
                theme,
            })?
        } else {
            format!("{:>8.2}s  theme {theme}\n", self.walkthrough.now().as_secs_f64())
        };
        self.write(&line).await
    }

    async fn write(&mut self, line: &str) -> Result<()> {
        self.out
            .write_all(line.as_bytes())
            .await
            .context("write playback output")?;
        self.out.flush().await.context("flush playback output")
    }

    /// Runs virtual time up to `target` one deadline at a time, so every
    /// effect is reported at the instant it happened.
    async fn advance_to(&mut self, target: Duration) -> Result<()> {
        while let Some(deadline) = self.walkthrough.next_deadline().filter(|d| *d <= target) {
            let effects = self.walkthrough.advance_to(deadline);
            self.emit(effects).await?;
            if self.finished {
                return Ok(());
            }
        }
        let effects = self.walkthrough.advance_to(target);
        self.emit(effects).await
    }

    /// Applies one command. Returns how long input should pause.
    async fn apply(
        &mut self,
        command: Command,
        themes: &mut ThemeChannel,
    ) -> Result<Option<Duration>> {
        let w = &mut self.walkthrough;
        let effects = match command {
            Command::Cta => w.tour_cta(),
            Command::Accept => w.accept_diffs(),
            Command::Insert => w.insert_research(),
            Command::Sidebar => w.toggle_sidebar(),
            Command::Replay => w.replay(),
            Command::Select(act) => w.select_act(act),
            Command::Complete(act) => w.complete_act(act),
            Command::Wait(delay) => return Ok(Some(delay)),
            Command::Quit => {
                self.finished = true;
                Vec::new()
            }
            Command::Message(raw) => {
                if themes.deliver(&raw).is_none() {
                    debug!("ignored message on the theme channel");
                }
                Vec::new()
            }
        };
        self.emit(effects).await?;
        Ok(None)
    }

    /// True when nothing but time passing could end the run.
    fn waits_forever(&self) -> bool {
        self.walkthrough.next_deadline().is_none() && self.options.duration.is_none()
    }
}

fn json_line(event: &PlayEvent<'_>) -> Result<String> {
    let mut line = serde_json::to_string(event).context("serialize playback event")?;
    line.push('\n');
    Ok(line)
}

/// Plays a walkthrough until one of the stop conditions holds.
pub async fn run_play<R, W>(
    options: PlayOptions,
    input: Option<R>,
    out: &mut W,
    cancel: CancellationToken,
) -> Result<PlayOutcome>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut player = Player {
        walkthrough: Walkthrough::new(options.walkthrough),
        options,
        out,
        last_state: WalkthroughState::Idle,
        finales: 0,
        finished: false,
    };

    let (theme_tx, mut theme_rx) = watch::channel(options.theme);
    let mut themes = ThemeChannel::new();
    let subscription = themes.subscribe(move |theme| {
        theme_tx.send_replace(theme);
    });

    let initial = player.walkthrough.snapshot();
    player.write_snapshot(&initial).await?;
    player.write_theme(options.theme).await?;

    let mut lines = input.map(AsyncBufReadExt::lines);
    let mut input_resumes_at = Duration::ZERO;

    let mut interval = time::interval(options.tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    while !player.finished {
        let reading = lines.is_some() && player.walkthrough.now() >= input_resumes_at;

        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                info!("playback cancelled");
                break;
            }

            line = async {
                match lines.as_mut() {
                    Some(lines) => lines.next_line().await,
                    None => Ok(None),
                }
            }, if reading => {
                let Some(line) = line.context("read playback input")? else {
                    debug!("input closed");
                    lines = None;
                    if player.waits_forever() {
                        info!("input closed with nothing scheduled");
                        break;
                    }
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse(&line) {
                    Some(command) => {
                        debug!(?command, "playback command");
                        if let Some(delay) = player.apply(command, &mut themes).await? {
                            input_resumes_at = player.walkthrough.now() + delay;
                        }
                    }
                    None => warn!(%line, "unknown playback command"),
                }
            }

            _ = interval.tick() => {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick).mul_f64(options.speed);
                last_tick = now;

                let target = player.walkthrough.now() + elapsed;
                let target = options.duration.map_or(target, |limit| target.min(limit));
                player.advance_to(target).await?;

                if options.duration.is_some_and(|limit| player.walkthrough.now() >= limit) {
                    break;
                }
                if lines.is_none() && player.waits_forever() {
                    info!("nothing left to play");
                    break;
                }
            }
        }

        if theme_rx.has_changed().unwrap_or(false) {
            let theme = *theme_rx.borrow_and_update();
            player.write_theme(theme).await?;
        }
    }

    themes.unsubscribe(subscription);
    let theme = *theme_rx.borrow();
    let outcome = PlayOutcome {
        now: player.walkthrough.now(),
        state: player.walkthrough.state(),
        finales: player.finales,
        theme,
    };
    info!(
        now_ms = outcome.now.as_millis() as u64,
        state = %outcome.state,
        finales = outcome.finales,
        "playback ended"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use tokio::io::BufReader;
    use walkthru_core::PlaybackMode;

    use super::*;

    fn options(mode: PlaybackMode) -> PlayOptions {
        let mut walkthrough = WalkthroughOptions::new(mode);
        walkthrough.auto_loop = false;
        PlayOptions {
            walkthrough,
            theme: Theme::Dark,
            speed: 1.0,
            tick: Duration::from_millis(50),
            json: true,
            loops: 1,
            duration: None,
        }
    }

    async fn play(
        options: PlayOptions,
        input: Option<&str>,
    ) -> (PlayOutcome, Vec<serde_json::Value>) {
        let mut out = Vec::new();
        let input = input.map(|text| BufReader::new(text.as_bytes()));
        let outcome = run_play(options, input, &mut out, CancellationToken::new())
            .await
            .unwrap();
        let events = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (outcome, events)
    }

    fn states(events: &[serde_json::Value]) -> Vec<&str> {
        events
            .iter()
            .filter(|e| e["event"] == "snapshot")
            .map(|e| e["state"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(" cta "), Some(Command::Cta));
        assert_eq!(
            Command::parse("select research"),
            Some(Command::Select(Act::Research))
        );
        assert_eq!(
            Command::parse("wait 250"),
            Some(Command::Wait(Duration::from_millis(250)))
        );
        assert_eq!(Command::parse("select nothing"), None);
        assert_eq!(Command::parse("accept now"), None);
        assert_eq!(Command::parse("wait soon"), None);
        assert!(matches!(
            Command::parse(r#"{"type":"theme-change","theme":"light"}"#),
            Some(Command::Message(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_plays_through_once() {
        let (outcome, events) = play(options(PlaybackMode::Auto), None).await;
        assert_eq!(outcome.state, WalkthroughState::Act3Complete);
        assert_eq!(outcome.finales, 1);

        let states = states(&events);
        assert_eq!(states.first(), Some(&"idle"));
        assert_eq!(states.last(), Some(&"act3-complete"));
        let mut seen = states.clone();
        seen.dedup();
        assert_eq!(
            seen,
            vec![
                "idle",
                "act1",
                "act1-complete",
                "act2",
                "act2-complete",
                "act3",
                "act3-complete"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_drive_a_guided_walkthrough() {
        let mut opts = options(PlaybackMode::Guided);
        opts.duration = Some(Duration::from_secs(10));
        let (outcome, events) = play(opts, Some("select proofread\nwait 5000\naccept\n")).await;

        assert_eq!(outcome.state, WalkthroughState::Act2Complete);
        assert_eq!(outcome.now, Duration::from_secs(10));
        assert!(states(&events).contains(&"act2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_messages_are_forwarded() {
        let mut opts = options(PlaybackMode::Guided);
        opts.duration = Some(Duration::from_secs(1));
        let input = "{\"type\":\"theme-change\",\"theme\":\"light\"}\n{\"type\":\"other\"}\nnot json\n";
        let (outcome, events) = play(opts, Some(input)).await;

        assert_eq!(outcome.theme, Theme::Light);
        let themes: Vec<&str> = events
            .iter()
            .filter(|e| e["event"] == "theme")
            .map(|e| e["theme"].as_str().unwrap())
            .collect();
        assert_eq!(themes, vec!["dark", "light"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guided_without_input_stops_when_idle() {
        let (outcome, events) = play(options(PlaybackMode::Guided), Some("")).await;
        assert_eq!(outcome.state, WalkthroughState::Idle);
        assert_eq!(states(&events), vec!["idle"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_playback() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut out = Vec::new();
        let outcome = run_play(
            options(PlaybackMode::Auto),
            None::<BufReader<&[u8]>>,
            &mut out,
            cancel,
        )
        .await
        .unwrap();
        assert_eq!(outcome.now, Duration::ZERO);
        assert_eq!(outcome.state, WalkthroughState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_output() {
        let mut opts = options(PlaybackMode::Auto);
        opts.json = false;
        opts.duration = Some(Duration::from_secs(2));
        let mut out = Vec::new();
        run_play(opts, None::<BufReader<&[u8]>>, &mut out, CancellationToken::new())
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().next().unwrap().contains("idle"));
        assert!(text.contains("act1"));
        assert!(text.contains("theme dark"));
    }
}
