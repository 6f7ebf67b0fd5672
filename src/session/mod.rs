/*!
 * Preview session lifecycle.
 *
 * A `PreviewSession` owns everything that belongs to one loaded audio file:
 * the sync engine (and through it the cue track), the playback engine, the
 * listener subscriptions wiring the two together, and the audio handle.
 * Closing or dropping the session unsubscribes every listener, destroys the
 * player and releases the audio handle.
 *
 * `SessionManager` swaps sessions when the audio source changes.
 */

pub mod manager;

pub use manager::SessionManager;

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use log::{debug, info};

use crate::errors::PlaybackError;
use crate::media::AudioHandle;
use crate::playback::{timeline_position, PlaybackEngine, PlaybackEvent, Subscription};
use crate::subtitle_processor::CueTrack;
use crate::sync_engine::{SeekOutcome, SyncEngine, TickOutcome, TranscriptView};

/// Session behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Start playing as soon as the player reports readiness
    pub autoplay: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { autoplay: true }
    }
}

/// Something the UI layer should react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionUpdate {
    /// The transcript changed on a tick
    Transcript(TickOutcome),
    /// A seek landed on a cue
    Highlight(SeekOutcome),
    /// Playback reached the end of the audio
    Finished,
}

/// One audio file being previewed with its subtitle track
pub struct PreviewSession<P: PlaybackEngine> {
    engine: Rc<RefCell<SyncEngine>>,
    player: P,
    audio: Option<AudioHandle>,
    subscriptions: Vec<Subscription>,
    updates: Rc<RefCell<Vec<SessionUpdate>>>,
    ready: Rc<Cell<bool>>,
    finished: Rc<Cell<bool>>,
    options: SessionOptions,
    autoplayed: bool,
    closed: bool,
}

impl<P: PlaybackEngine> PreviewSession<P> {
    /// Wire a track to a player, load the audio and autoplay when ready.
    ///
    /// On error everything acquired so far is released before returning.
    pub fn start(track: CueTrack, audio: AudioHandle, player: P, options: SessionOptions) -> Result<Self, PlaybackError> {
        let cue_count = track.len();
        let mut session = Self {
            engine: Rc::new(RefCell::new(SyncEngine::new(track))),
            player,
            audio: Some(audio),
            subscriptions: Vec::with_capacity(2),
            updates: Rc::new(RefCell::new(Vec::new())),
            ready: Rc::new(Cell::new(false)),
            finished: Rc::new(Cell::new(false)),
            options,
            autoplayed: false,
            closed: false,
        };

        session.attach_listeners();

        if let Some(audio) = session.audio.as_ref() {
            session.player.load(audio)?;
            info!("Preview session started for {} with {} cues", audio.name(), cue_count);
        }

        session.poll_ready()?;
        Ok(session)
    }

    fn attach_listeners(&mut self) {
        let engine = Rc::clone(&self.engine);
        let updates = Rc::clone(&self.updates);
        let sync = self.player.subscribe(Box::new(move |event: &PlaybackEvent| match *event {
            PlaybackEvent::TimeUpdate(position) => {
                let outcome = engine.borrow_mut().on_tick(position);
                if outcome.is_transition() {
                    updates.borrow_mut().push(SessionUpdate::Transcript(outcome));
                }
            }
            PlaybackEvent::Seek(position) => {
                let outcome = engine.borrow_mut().on_seek(position);
                if outcome != SeekOutcome::NotFound {
                    updates.borrow_mut().push(SessionUpdate::Highlight(outcome));
                }
            }
            PlaybackEvent::Ready | PlaybackEvent::Finished => {}
        }));

        let ready = Rc::clone(&self.ready);
        let finished = Rc::clone(&self.finished);
        let updates = Rc::clone(&self.updates);
        let lifecycle = self.player.subscribe(Box::new(move |event: &PlaybackEvent| match *event {
            PlaybackEvent::Ready => ready.set(true),
            PlaybackEvent::Finished => {
                finished.set(true);
                updates.borrow_mut().push(SessionUpdate::Finished);
            }
            PlaybackEvent::TimeUpdate(_) => finished.set(false),
            PlaybackEvent::Seek(_) => {}
        }));

        self.subscriptions.push(sync);
        self.subscriptions.push(lifecycle);
    }

    /// Start playback once the player has signalled readiness (autoplay only).
    ///
    /// Returns whether playback was started by this call.
    pub fn poll_ready(&mut self) -> Result<bool, PlaybackError> {
        if self.closed || !self.options.autoplay || self.autoplayed || !self.ready.get() {
            return Ok(false);
        }
        self.player.play()?;
        self.autoplayed = true;
        debug!("Autoplay started");
        Ok(true)
    }

    /// Toggle play/pause; returns whether the player is now playing
    pub fn play_pause(&mut self) -> Result<bool, PlaybackError> {
        if self.closed {
            return Err(PlaybackError::Destroyed);
        }
        self.player.play_pause()
    }

    /// Seek the player to an absolute position
    pub fn seek(&mut self, position: f64) -> Result<(), PlaybackError> {
        if self.closed {
            return Err(PlaybackError::Destroyed);
        }
        self.player.seek_to(position)
    }

    /// Seek to a point on the timeline given as a fraction of the duration
    pub fn seek_fraction(&mut self, fraction: f64) -> Result<(), PlaybackError> {
        let position = timeline_position(fraction, self.player.duration());
        self.seek(position)
    }

    /// Take the updates accumulated since the last call
    pub fn drain_updates(&self) -> Vec<SessionUpdate> {
        std::mem::take(&mut *self.updates.borrow_mut())
    }

    pub fn view(&self) -> TranscriptView {
        self.engine.borrow().view()
    }

    pub fn engine(&self) -> Ref<'_, SyncEngine> {
        self.engine.borrow()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn current_time(&self) -> f64 {
        self.player.current_time()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Id of the audio handle held by this session
    pub fn audio_id(&self) -> Option<&str> {
        self.audio.as_ref().map(|audio| audio.id())
    }

    /// Tear the session down explicitly
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        for subscription in self.subscriptions.drain(..) {
            self.player.unsubscribe(subscription);
        }
        self.player.destroy();

        if let Some(audio) = self.audio.take() {
            info!("Closing preview session for {}", audio.name());
            audio.release();
        }
    }
}

impl<P: PlaybackEngine> Drop for PreviewSession<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}
