/*!
 * Playback engine boundary.
 *
 * The real decoder/waveform widget is an external collaborator. This module
 * describes what the rest of the crate needs from it:
 * - `events`: listener registration with explicit unsubscribe handles
 * - `simulated`: a clock-driven engine used by the CLI preview and tests
 */

pub mod events;
pub mod simulated;

pub use events::{Listener, ListenerRegistry, Subscription};
pub use simulated::SimulatedPlayer;

use crate::errors::PlaybackError;
use crate::media::AudioHandle;

/// Notifications emitted by a playback engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// Fired once after `load` completes
    Ready,
    /// Periodic position update while playing, in seconds
    TimeUpdate(f64),
    /// Position changed by an explicit seek, in seconds
    Seek(f64),
    /// Playback reached the end of the audio
    Finished,
}

/// Controls and notifications of an audio playback engine
pub trait PlaybackEngine {
    /// Load audio; `Ready` is emitted once the engine can play
    fn load(&mut self, audio: &AudioHandle) -> Result<(), PlaybackError>;

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Toggle playback; returns whether the engine is now playing
    fn play_pause(&mut self) -> Result<bool, PlaybackError> {
        if self.is_playing() {
            self.pause();
            Ok(false)
        } else {
            self.play()?;
            Ok(true)
        }
    }

    fn is_playing(&self) -> bool;

    fn is_ready(&self) -> bool;

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Total length in seconds
    fn duration(&self) -> f64;

    /// Jump to an absolute position; emits `Seek`
    fn seek_to(&mut self, position: f64) -> Result<(), PlaybackError>;

    fn subscribe(&mut self, listener: Listener<PlaybackEvent>) -> Subscription;

    /// Returns false if the subscription was not registered
    fn unsubscribe(&mut self, subscription: Subscription) -> bool;

    /// Release engine resources. The engine is unusable afterwards.
    fn destroy(&mut self);
}

/// Map a click on the timeline (0.0 = start, 1.0 = end) to seconds
pub fn timeline_position(fraction: f64, duration: f64) -> f64 {
    if !fraction.is_finite() || !duration.is_finite() || duration <= 0.0 {
        return 0.0;
    }
    fraction.clamp(0.0, 1.0) * duration
}
