/*!
 * # lyricsync - karaoke-style subtitle previews for audio files
 *
 * A Rust library for playing an audio file alongside its SRT subtitle track,
 * building a time-synchronized transcript as playback progresses.
 *
 * ## Features
 *
 * - Strict SRT parsing into timed cues
 * - Cue synchronization against any playback clock
 * - Accumulating transcript with seek highlights
 * - Scoped in-memory audio handles with guaranteed release
 * - Deterministic session teardown
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing into a `CueTrack`
 * - `sync_engine`: Tick/seek driven transcript state
 * - `playback`: Playback engine boundary:
 *   - `playback::events`: Listener registry with unsubscribe handles
 *   - `playback::simulated`: Clock-driven engine without audio output
 * - `media`: In-memory audio handles
 * - `session`: Preview session lifecycle and source swaps
 * - `file_utils`: File inspection
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod sync_engine;
pub mod playback;
pub mod media;
pub mod session;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use subtitle_processor::{Cue, CueTrack, SubtitleSource};
pub use sync_engine::{SeekOutcome, SyncEngine, TickOutcome, TranscriptLine, TranscriptView};
pub use playback::{PlaybackEngine, PlaybackEvent, SimulatedPlayer, Subscription};
pub use media::{AudioHandle, BlobStore};
pub use session::{PreviewSession, SessionManager, SessionOptions, SessionUpdate};
pub use errors::{AppError, FormatError, MediaError, PlaybackError};
