use std::time::Duration;
use log::{debug, info};

use super::{Listener, ListenerRegistry, PlaybackEngine, PlaybackEvent, Subscription};
use crate::errors::PlaybackError;
use crate::media::AudioHandle;

// @module: Clock-driven playback engine without audio output

/// Playback engine that advances a virtual clock instead of decoding audio.
///
/// The caller decides the tick cadence by calling `advance`; each call while
/// playing emits one `TimeUpdate`.
#[derive(Debug)]
pub struct SimulatedPlayer {
    listeners: ListenerRegistry<PlaybackEvent>,
    duration: f64,
    position: f64,
    rate: f64,
    playing: bool,
    ready: bool,
    destroyed: bool,
    loaded: Option<String>,
}

impl SimulatedPlayer {
    /// Create a player for audio of the given length in seconds
    pub fn new(duration: f64) -> Self {
        let duration = if duration.is_finite() && duration > 0.0 { duration } else { 0.0 };
        Self {
            listeners: ListenerRegistry::new(),
            duration,
            position: 0.0,
            rate: 1.0,
            playing: false,
            ready: false,
            destroyed: false,
            loaded: None,
        }
    }

    /// Set the playback rate; non-positive values are ignored
    pub fn with_rate(mut self, rate: f64) -> Self {
        if rate.is_finite() && rate > 0.0 {
            self.rate = rate;
        }
        self
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Id of the loaded audio handle
    pub fn loaded_id(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Move the clock forward by `elapsed` wall time and return the new position
    pub fn advance(&mut self, elapsed: Duration) -> f64 {
        if !self.playing || self.destroyed {
            return self.position;
        }

        self.position = (self.position + elapsed.as_secs_f64() * self.rate).min(self.duration);
        self.listeners.emit(&PlaybackEvent::TimeUpdate(self.position));

        if self.position >= self.duration {
            self.playing = false;
            debug!("Playback finished at {:.3}s", self.position);
            self.listeners.emit(&PlaybackEvent::Finished);
        }

        self.position
    }

    fn ensure_usable(&self) -> Result<(), PlaybackError> {
        if self.destroyed {
            return Err(PlaybackError::Destroyed);
        }
        if !self.ready {
            return Err(PlaybackError::NotLoaded);
        }
        Ok(())
    }
}

impl PlaybackEngine for SimulatedPlayer {
    fn load(&mut self, audio: &AudioHandle) -> Result<(), PlaybackError> {
        if self.destroyed {
            return Err(PlaybackError::Destroyed);
        }

        self.loaded = Some(audio.id().to_string());
        self.position = 0.0;
        self.playing = false;
        self.ready = true;
        info!("Loaded {} ({}, {} bytes)", audio.name(), audio.mime_type(), audio.len());

        self.listeners.emit(&PlaybackEvent::Ready);
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        self.ensure_usable()?;
        if self.position >= self.duration {
            self.position = 0.0;
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn seek_to(&mut self, position: f64) -> Result<(), PlaybackError> {
        self.ensure_usable()?;
        if !position.is_finite() {
            return Err(PlaybackError::InvalidPosition(position));
        }

        self.position = position.clamp(0.0, self.duration);
        self.listeners.emit(&PlaybackEvent::Seek(self.position));
        Ok(())
    }

    fn subscribe(&mut self, listener: Listener<PlaybackEvent>) -> Subscription {
        self.listeners.subscribe(listener)
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.playing = false;
        self.ready = false;
        self.loaded = None;
        self.listeners.clear();
        self.destroyed = true;
        debug!("Playback engine destroyed");
    }
}
