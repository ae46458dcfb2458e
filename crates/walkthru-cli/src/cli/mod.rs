//! CLI entry and dispatch.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use walkthru_core::config::{self, Config};
use walkthru_core::host::{self, Theme};
use walkthru_core::{PlaybackMode, WalkthroughOptions};

mod commands;

#[derive(Parser)]
#[command(name = "walkthru")]
#[command(version = "0.1")]
#[command(about = "Scripted three-act editor walkthrough")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    session: SessionArgs,
}

/// Options shared by the interactive demo and headless playback.
#[derive(clap::Args, Debug, Clone, Default)]
struct SessionArgs {
    /// Playback mode: guided or auto (default: query, then config)
    #[arg(long, value_parser = parse_mode)]
    mode: Option<PlaybackMode>,

    /// Color theme: dark or light (default: query, then config, then terminal)
    #[arg(long, value_parser = parse_theme)]
    theme: Option<Theme>,

    /// Embedding query string, e.g. "theme=light&mode=auto"
    #[arg(long, default_value = "", env = "WALKTHRU_QUERY")]
    query: String,

    /// Virtual clock multiplier (default: config)
    #[arg(long)]
    speed: Option<f64>,
}

/// Session settings after flags, query and config have been merged.
#[derive(Debug, Clone, Copy)]
struct Session {
    walkthrough: WalkthroughOptions,
    theme: Theme,
    speed: f64,
    tick: Duration,
}

impl SessionArgs {
    /// Flags win over the query string, which wins over the config.
    fn resolve(&self, config: &Config, prefers_light: bool) -> Result<Session> {
        let mode = self.mode.unwrap_or_else(|| {
            match host::read_playback_mode(&self.query) {
                PlaybackMode::Auto => PlaybackMode::Auto,
                PlaybackMode::Guided => config.mode,
            }
        });
        let prefers_light = config.theme.map_or(prefers_light, |t| t == Theme::Light);
        let theme = self
            .theme
            .unwrap_or_else(|| host::read_initial_theme(&self.query, prefers_light));

        let speed = self.speed.unwrap_or(config.playback.speed);
        if !(speed.is_finite() && speed > 0.0) {
            anyhow::bail!("--speed must be positive, got {speed}");
        }

        Ok(Session {
            walkthrough: config.walkthrough_options(mode),
            theme,
            speed,
            tick: config.tick(),
        })
    }
}

fn parse_mode(value: &str) -> Result<PlaybackMode, String> {
    match value {
        "guided" => Ok(PlaybackMode::Guided),
        "auto" => Ok(PlaybackMode::Auto),
        _ => Err(format!("invalid mode '{value}' (expected guided or auto)")),
    }
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    Theme::parse(value).ok_or_else(|| format!("invalid theme '{value}' (expected dark or light)"))
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Plays the walkthrough without a terminal UI, printing each snapshot
    ///
    /// Commands are read from stdin, one per line: cta, accept, insert,
    /// sidebar, replay, select <act>, complete <act>, wait <ms>, quit, or a
    /// JSON theme-change message.
    Play {
        #[command(flatten)]
        session: SessionArgs,

        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,

        /// Stop after this many finales (0 = never)
        #[arg(long, default_value_t = 1)]
        loops: u32,

        /// Stop after this much virtual time, in milliseconds
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,

        /// Ignore stdin
        #[arg(long = "no-input")]
        no_input: bool,
    },

    /// Shows a word diff from the script
    Diff {
        /// Which pair of texts to compare
        #[arg(long, value_enum, default_value_t = commands::diff::DiffPair::Rewrite)]
        pair: commands::diff::DiffPair,

        /// Print the tokens and morph plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Prints the camera cuts of the mirrored auto walkthrough
    Camera {
        /// Viewport width in pixels (default: config)
        #[arg(long)]
        width: Option<f64>,

        /// Viewport height in pixels (default: config)
        #[arg(long)]
        height: Option<f64>,

        /// Virtual time to film, in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 60_000)]
        duration_ms: u64,

        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print the effective settings, defaults included
    Show,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    let result = rt.block_on(async move { dispatch(cli).await });
    // A blocked stdin read cannot be cancelled; don't wait for it.
    rt.shutdown_background();
    result
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load().context("load config")?;

    // default to the interactive demo
    let Some(command) = cli.command else {
        let _guard = walkthru_core::logging::init_file(&config::paths::logs_dir(), &config.log_level)?;
        let session = cli.session.resolve(&config, crate::modes::terminal_prefers_light())?;
        return commands::demo::run(&session, &config);
    };

    walkthru_core::logging::init_stderr(&config.log_level)?;

    match command {
        Commands::Play {
            session,
            json,
            loops,
            duration_ms,
            no_input,
        } => {
            let session = session.resolve(&config, false)?;
            commands::play::run(commands::play::PlayRunOptions {
                session: &session,
                json,
                loops,
                duration: duration_ms.map(Duration::from_millis),
                read_stdin: !no_input,
            })
            .await
        }

        Commands::Diff { pair, json } => commands::diff::run(pair, json),

        Commands::Camera {
            width,
            height,
            duration_ms,
            json,
        } => {
            let viewport = config.viewport();
            commands::camera::run(&commands::camera::CameraRunOptions {
                width: width.unwrap_or(viewport.width),
                height: height.unwrap_or(viewport.height),
                duration: Duration::from_millis(duration_ms),
                auto_loop: config.playback.auto_loop,
                json,
            })
        }

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Show => commands::config::show(&config),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(query: &str) -> SessionArgs {
        SessionArgs {
            query: query.to_string(),
            ..SessionArgs::default()
        }
    }

    #[test]
    fn test_query_selects_auto_and_theme() {
        let session = args("?mode=auto&theme=light")
            .resolve(&Config::default(), false)
            .unwrap();
        assert_eq!(session.walkthrough.mode, PlaybackMode::Auto);
        assert!(session.walkthrough.auto_loop);
        assert_eq!(session.theme, Theme::Light);
    }

    #[test]
    fn test_flags_beat_query_and_config() {
        let config = Config {
            theme: Some(Theme::Light),
            mode: PlaybackMode::Auto,
            ..Config::default()
        };
        let session = SessionArgs {
            mode: Some(PlaybackMode::Guided),
            theme: Some(Theme::Dark),
            ..args("theme=light")
        }
        .resolve(&config, true)
        .unwrap();
        assert_eq!(session.walkthrough.mode, PlaybackMode::Guided);
        assert_eq!(session.theme, Theme::Dark);
    }

    #[test]
    fn test_config_theme_beats_terminal_hint() {
        let config = Config {
            theme: Some(Theme::Dark),
            ..Config::default()
        };
        let session = args("").resolve(&config, true).unwrap();
        assert_eq!(session.theme, Theme::Dark);

        let session = args("").resolve(&Config::default(), true).unwrap();
        assert_eq!(session.theme, Theme::Light);
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let err = SessionArgs {
            speed: Some(0.0),
            ..args("")
        }
        .resolve(&Config::default(), false)
        .unwrap_err();
        assert!(err.to_string().contains("--speed"));
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("auto"), Ok(PlaybackMode::Auto));
        assert!(parse_mode("Auto").is_err());
    }
}
