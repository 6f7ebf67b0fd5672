// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use lyricsync::app_config::{self, Config};
use lyricsync::app_controller::{Controller, PreviewRequest, SeekRequest};
use lyricsync::subtitle_processor::SubtitleSource;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play an audio file with its synchronized subtitle transcript
    Preview(PreviewArgs),

    /// Parse a subtitle file and list its cues
    Cues(CuesArgs),

    /// Generate shell completions for lyricsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Audio file to preview
    #[arg(value_name = "AUDIO_PATH")]
    audio_path: PathBuf,

    /// SRT subtitle file (defaults to the configured path)
    #[arg(short, long)]
    subtitles: Option<PathBuf>,

    /// Timeline click: when playback reaches AT, jump to TARGET (seconds or HH:MM:SS,mmm)
    #[arg(long = "seek", value_name = "AT=TARGET")]
    seeks: Vec<SeekRequest>,

    /// Playback speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// Audio length in seconds (defaults to the end of the last cue plus padding)
    #[arg(long)]
    duration: Option<f64>,

    /// Run as fast as possible instead of in real time
    #[arg(long)]
    no_realtime: bool,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct CuesArgs {
    /// SRT subtitle file (defaults to the configured path)
    #[arg(value_name = "SUBTITLE_PATH")]
    subtitles: Option<PathBuf>,

    /// Print cues as JSON
    #[arg(long)]
    json: bool,
}

/// lyricsync - karaoke-style subtitle previews
///
/// Plays an audio file against its SRT subtitle track and builds the
/// transcript as each cue comes up.
#[derive(Parser, Debug)]
#[command(name = "lyricsync")]
#[command(version)]
#[command(about = "Karaoke-style subtitle preview for audio files")]
#[command(long_about = "lyricsync plays an audio file against its SRT subtitle track and prints the transcript as it builds up.

EXAMPLES:
    lyricsync preview song.mp3                        # Use subtitle.srt from the config
    lyricsync preview song.mp3 -s lyrics.srt          # Use a specific subtitle file
    lyricsync preview song.mp3 --seek 12=3.5          # At 12s, jump back to 3.5s
    lyricsync preview song.mp3 --speed 4 --no-realtime
    lyricsync cues lyrics.srt --json                  # Dump parsed cues
    lyricsync completions bash > lyricsync.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "1;31"),
            Level::Warn => ("WARN ", "1;33"),
            Level::Info => ("INFO ", "1;32"),
            Level::Debug => ("DEBUG", "1;36"),
            Level::Trace => ("TRACE", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with trace so the max level alone decides what shows
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "lyricsync", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Preview(args) => run_preview(config, args).await,
        Commands::Cues(args) => run_cues(config, args),
        Commands::Completions { .. } => Ok(()),
    }
}

fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    match &cli.log_level {
        Some(log_level) => config.log_level = log_level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

async fn run_preview(mut config: Config, args: PreviewArgs) -> Result<()> {
    // Override config with CLI options if provided
    if let Some(speed) = args.speed {
        config.playback.speed = speed;
    }
    if args.no_realtime {
        config.playback.realtime = false;
    }

    let subtitles = args.subtitles
        .unwrap_or_else(|| PathBuf::from(&config.subtitle.path));

    let controller = Controller::with_config(config)?;

    let upload = controller.inspect_upload(&args.audio_path)?;
    info!("File: {}", upload);

    let report = controller.run_preview(PreviewRequest {
        audio_path: args.audio_path,
        subtitles: SubtitleSource::File(subtitles),
        seeks: args.seeks,
        duration: args.duration,
    }).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.transcript.render_marked());
    }

    if report.transitions.is_empty() {
        warn!("No cue was reached during playback");
    }

    Ok(())
}

fn run_cues(config: Config, args: CuesArgs) -> Result<()> {
    let path = args.subtitles
        .unwrap_or_else(|| PathBuf::from(&config.subtitle.path));

    let controller = Controller::with_config(config)?;
    let track = controller.load_track(&SubtitleSource::File(path.clone()))
        .map_err(|e| anyhow!("Failed to load {}: {}", path.display(), e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(track.cues())?);
    } else {
        for cue in &track {
            print!("{}", cue);
        }
        info!("{} cues", track.len());
    }

    Ok(())
}
