use log::info;

use super::{PreviewSession, SessionOptions};
use crate::errors::PlaybackError;
use crate::media::{AudioHandle, BlobStore};
use crate::playback::PlaybackEngine;
use crate::subtitle_processor::CueTrack;

/// Holds at most one live preview session and swaps it on source change
pub struct SessionManager<P: PlaybackEngine> {
    store: BlobStore,
    current: Option<PreviewSession<P>>,
    sessions_opened: usize,
}

impl<P: PlaybackEngine> SessionManager<P> {
    /// Create a manager handing out audio handles from the given store
    pub fn new(store: BlobStore) -> Self {
        Self {
            store,
            current: None,
            sessions_opened: 0,
        }
    }

    /// Store used for audio handles
    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    /// Open a session for a new source, tearing the previous one down first
    pub fn open(&mut self, track: CueTrack, audio: AudioHandle, player: P, options: SessionOptions) -> Result<&mut PreviewSession<P>, PlaybackError> {
        if self.close() {
            info!("Audio source changed, previous session discarded");
        }

        let session = PreviewSession::start(track, audio, player, options)?;
        self.sessions_opened += 1;
        Ok(self.current.insert(session))
    }

    pub fn current(&self) -> Option<&PreviewSession<P>> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut PreviewSession<P>> {
        self.current.as_mut()
    }

    /// Close the live session. Returns whether there was one.
    pub fn close(&mut self) -> bool {
        match self.current.take() {
            Some(session) => {
                session.close();
                true
            }
            None => false,
        }
    }

    /// Number of sessions opened over the manager's lifetime
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened
    }
}

impl<P: PlaybackEngine> Drop for SessionManager<P> {
    fn drop(&mut self) {
        self.close();
    }
}
