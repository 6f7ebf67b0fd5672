use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::time::MissedTickBehavior;

use crate::app_config::Config;
use crate::errors::AppError;
use crate::file_utils::FileInfo;
use crate::media::{self, BlobStore};
use crate::playback::{PlaybackEngine, SimulatedPlayer};
use crate::session::{SessionManager, SessionUpdate};
use crate::subtitle_processor::{parse_timestamp, Cue, CueTrack, SubtitleSource};
use crate::sync_engine::{SeekOutcome, TickOutcome, TranscriptView};

// @module: Application controller for audio previews

/// A scripted timeline click: once playback reaches `at`, jump to `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRequest {
    pub at: f64,
    pub target: f64,
}

fn parse_seconds(value: &str) -> Option<f64> {
    let value = value.trim();
    value
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .or_else(|| parse_timestamp(value))
}

impl FromStr for SeekRequest {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (at, target) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid seek '{}', expected AT=TARGET", s))?;

        let at = parse_seconds(at).ok_or_else(|| anyhow!("Invalid seek time: {}", at))?;
        let target = parse_seconds(target).ok_or_else(|| anyhow!("Invalid seek target: {}", target))?;

        Ok(SeekRequest { at, target })
    }
}

/// Everything needed to preview one audio file
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub audio_path: PathBuf,
    pub subtitles: SubtitleSource,
    pub seeks: Vec<SeekRequest>,
    /// Audio length in seconds; derived from the track when absent
    pub duration: Option<f64>,
}

/// Summary of a finished preview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewReport {
    pub audio: String,
    pub cue_count: usize,
    pub duration: f64,
    pub ticks: usize,
    /// Cue indices in the order they were emitted
    pub transitions: Vec<u32>,
    /// Cue indices highlighted by seeks, ascending
    pub highlights: Vec<u32>,
    pub transcript: TranscriptView,
}

/// Main application controller for subtitle previews
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Describe an uploaded file, rejecting anything that is not audio
    pub fn inspect_upload<P: AsRef<Path>>(&self, path: P) -> Result<FileInfo, AppError> {
        media::inspect_audio(path)
    }

    /// Load and parse a subtitle track
    pub fn load_track(&self, source: &SubtitleSource) -> Result<CueTrack, AppError> {
        source.load_track().inspect_err(|e| {
            error!("Subtitle track unavailable ({}): {}", source, e);
        })
    }

    /// Play an audio file against its subtitle track and collect the transcript
    pub async fn run_preview(&self, request: PreviewRequest) -> Result<PreviewReport, AppError> {
        let playback = &self.config.playback;

        let store = BlobStore::new();
        let audio = store.open_audio(&request.audio_path)?;
        let audio_name = audio.name().to_string();

        let track = self.load_track(&request.subtitles)?;
        let cue_count = track.len();
        let duration = request
            .duration
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .unwrap_or_else(|| track.end_time() + playback.tail_padding_secs);

        info!(
            "Previewing {} with {} cues over {}",
            audio_name,
            cue_count,
            Cue::format_timestamp(duration)
        );

        let mut seeks = request.seeks.clone();
        seeks.sort_by(|a, b| a.at.total_cmp(&b.at));
        let mut next_seek = 0;

        let player = SimulatedPlayer::new(duration).with_rate(playback.speed);
        let mut manager = SessionManager::new(store.clone());
        let session = manager.open(track, audio, player, playback.session_options())?;

        if !session.player().is_playing() {
            session.play_pause()?;
        }

        let progress = Self::timeline_bar(duration, playback.realtime);
        let tick = playback.tick_interval();
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ticks = 0;
        let mut transitions = Vec::new();

        loop {
            if playback.realtime {
                interval.tick().await;
            } else {
                tokio::task::yield_now().await;
            }

            let position = session.player_mut().advance(tick);
            ticks += 1;

            while let Some(seek) = seeks.get(next_seek).filter(|seek| seek.at <= position) {
                debug!("Timeline click at {:.3}s -> {:.3}s", seek.at, seek.target);
                session.seek(seek.target)?;
                next_seek += 1;
            }

            for update in session.drain_updates() {
                match update {
                    SessionUpdate::Transcript(TickOutcome::Advanced { cue_index })
                    | SessionUpdate::Transcript(TickOutcome::Restarted { cue_index })
                    | SessionUpdate::Transcript(TickOutcome::Rewound { cue_index }) => {
                        transitions.push(cue_index);
                        progress.println(session.view().render_marked());
                        progress.println("");
                    }
                    SessionUpdate::Transcript(_) => {}
                    SessionUpdate::Highlight(SeekOutcome::Highlighted { cue_index, visible }) => {
                        debug!("Cue {} highlighted (visible: {})", cue_index, visible);
                    }
                    SessionUpdate::Highlight(SeekOutcome::NotFound) => {}
                    SessionUpdate::Finished => info!("Playback finished"),
                }
            }

            let current = session.current_time();
            progress.set_position((current * 1000.0) as u64);
            progress.set_message(Cue::format_timestamp(current));

            if session.is_finished() || !session.player().is_playing() {
                break;
            }
        }
        progress.finish_and_clear();

        let transcript = session.view();
        let highlights = session.engine().highlights().collect();
        manager.close();

        debug!("{} audio handle(s) still live after preview", store.live_count());

        Ok(PreviewReport {
            audio: audio_name,
            cue_count,
            duration,
            ticks,
            transitions,
            highlights,
            transcript,
        })
    }

    fn timeline_bar(duration: f64, visible: bool) -> ProgressBar {
        if !visible {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new((duration * 1000.0) as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{msg} [{bar:50.cyan/blue}] {percent}%") {
            bar.set_style(style.progress_chars("=> "));
        }
        bar
    }
}
