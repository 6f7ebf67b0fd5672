/*!
 * Integration tests for preview session setup, source swap and teardown
 */

use std::time::Duration;
use anyhow::Result;
use lyricsync::errors::PlaybackError;
use lyricsync::media::BlobStore;
use lyricsync::playback::{PlaybackEngine, SimulatedPlayer};
use lyricsync::session::{PreviewSession, SessionManager, SessionOptions, SessionUpdate};
use lyricsync::subtitle_processor::CueTrack;
use lyricsync::sync_engine::{SeekOutcome, TickOutcome};
use crate::common;

fn start_session(store: &BlobStore, options: SessionOptions) -> Result<PreviewSession<SimulatedPlayer>> {
    let track = CueTrack::parse(common::TWO_CUE_SRT)?;
    let audio = store.create(vec![0u8; 64], "audio/mpeg", "song.mp3");
    Ok(PreviewSession::start(track, audio, SimulatedPlayer::new(5.0), options)?)
}

#[test]
fn test_start_withAutoplay_shouldPlayOnceReady() -> Result<()> {
    common::init_logging();
    let store = BlobStore::new();

    let session = start_session(&store, SessionOptions::default())?;

    assert!(session.player().is_ready());
    assert!(session.player().is_playing());
    assert_eq!(session.player().listener_count(), 2);
    assert_eq!(store.live_count(), 1);
    assert!(session.view().is_empty());

    Ok(())
}

#[test]
fn test_start_withoutAutoplay_shouldWaitForToggle() -> Result<()> {
    let store = BlobStore::new();
    let mut session = start_session(&store, SessionOptions { autoplay: false })?;

    assert!(!session.player().is_playing());
    assert!(!session.poll_ready()?);

    assert!(session.play_pause()?);
    assert!(!session.play_pause()?);

    Ok(())
}

#[test]
fn test_ticks_shouldBuildTranscriptAndReportFinish() -> Result<()> {
    let store = BlobStore::new();
    let mut session = start_session(&store, SessionOptions::default())?;

    session.player_mut().advance(Duration::from_millis(1500));
    session.player_mut().advance(Duration::from_millis(300));
    session.player_mut().advance(Duration::from_millis(1700));

    assert_eq!(session.view().texts(), vec!["Hello world", "Goodbye"]);
    assert!(!session.is_finished());

    session.player_mut().advance(Duration::from_secs(2));

    assert!(session.is_finished());
    assert_eq!(
        session.drain_updates(),
        vec![
            SessionUpdate::Transcript(TickOutcome::Advanced { cue_index: 1 }),
            SessionUpdate::Transcript(TickOutcome::Advanced { cue_index: 2 }),
            SessionUpdate::Finished,
        ]
    );
    assert!(session.drain_updates().is_empty());

    Ok(())
}

#[test]
fn test_seek_aheadOfTranscript_shouldHighlightWithoutRevealing() -> Result<()> {
    let store = BlobStore::new();
    let mut session = start_session(&store, SessionOptions::default())?;
    session.player_mut().advance(Duration::from_millis(1500));
    session.drain_updates();

    session.seek(3.5)?;

    assert_eq!(
        session.drain_updates(),
        vec![SessionUpdate::Highlight(SeekOutcome::Highlighted { cue_index: 2, visible: false })]
    );
    assert_eq!(session.view().texts(), vec!["Hello world"]);

    // The next tick from the new position reveals the cue, already highlighted
    session.player_mut().advance(Duration::from_millis(100));
    let view = session.view();
    assert_eq!(view.len(), 2);
    assert!(!view.lines[0].highlighted);
    assert!(view.lines[1].highlighted);

    Ok(())
}

#[test]
fn test_seek_backwards_shouldRewindInsteadOfRepeating() -> Result<()> {
    let store = BlobStore::new();
    let track = CueTrack::parse(common::THREE_CUE_SRT)?;
    let audio = store.create(vec![0u8; 64], "audio/mpeg", "song.mp3");
    let mut session = PreviewSession::start(track, audio, SimulatedPlayer::new(15.0), SessionOptions::default())?;
    session.player_mut().advance(Duration::from_millis(2000));
    session.player_mut().advance(Duration::from_millis(4000));
    assert_eq!(session.view().len(), 2);
    session.drain_updates();

    session.seek(2.5)?;
    session.player_mut().advance(Duration::from_millis(100));
    session.player_mut().advance(Duration::from_millis(3500));

    assert_eq!(
        session.view().texts(),
        vec!["This is a test subtitle.", "It contains multiple entries."]
    );
    assert_eq!(
        session.drain_updates(),
        vec![
            SessionUpdate::Highlight(SeekOutcome::Highlighted { cue_index: 1, visible: true }),
            SessionUpdate::Transcript(TickOutcome::Rewound { cue_index: 1 }),
            SessionUpdate::Transcript(TickOutcome::Advanced { cue_index: 2 }),
        ]
    );

    Ok(())
}

#[test]
fn test_seekFraction_shouldMapTimelineClick() -> Result<()> {
    let store = BlobStore::new();
    let mut session = start_session(&store, SessionOptions::default())?;

    // A quarter of 5 seconds lands inside the first cue
    session.seek_fraction(0.25)?;

    assert_eq!(session.current_time(), 1.25);
    assert_eq!(session.engine().highlights().collect::<Vec<_>>(), vec![1]);

    Ok(())
}

#[test]
fn test_close_shouldReleaseAudioHandle() -> Result<()> {
    let store = BlobStore::new();
    let session = start_session(&store, SessionOptions::default())?;
    let id = session.audio_id().map(str::to_string);

    session.close();

    assert_eq!(store.live_count(), 0);
    assert!(!store.is_live(id.as_deref().unwrap_or_default()));

    Ok(())
}

#[test]
fn test_drop_shouldReleaseAudioHandle() -> Result<()> {
    let store = BlobStore::new();
    {
        let mut session = start_session(&store, SessionOptions::default())?;
        session.player_mut().advance(Duration::from_millis(1500));
        assert_eq!(store.live_count(), 1);
    }

    assert_eq!(store.live_count(), 0);
    Ok(())
}

#[test]
fn test_start_withDestroyedPlayer_shouldFailAndRelease() -> Result<()> {
    let store = BlobStore::new();
    let track = CueTrack::parse(common::TWO_CUE_SRT)?;
    let audio = store.create(vec![0u8; 8], "audio/wav", "clip.wav");
    let mut player = SimulatedPlayer::new(5.0);
    player.destroy();

    let result = PreviewSession::start(track, audio, player, SessionOptions::default());

    assert!(matches!(result, Err(PlaybackError::Destroyed)));
    assert_eq!(store.live_count(), 0);

    Ok(())
}

#[test]
fn test_manager_sourceChange_shouldDiscardPreviousSession() -> Result<()> {
    let store = BlobStore::new();
    let mut manager = SessionManager::new(store.clone());

    let first_audio = store.create(vec![0u8; 8], "audio/wav", "first.wav");
    let first_id = first_audio.id().to_string();
    let session = manager.open(
        CueTrack::parse(common::TWO_CUE_SRT)?,
        first_audio,
        SimulatedPlayer::new(5.0),
        SessionOptions::default(),
    )?;
    session.player_mut().advance(Duration::from_millis(1500));
    assert_eq!(session.view().len(), 1);

    let second_audio = manager.store().create(vec![0u8; 8], "audio/wav", "second.wav");
    let second_id = second_audio.id().to_string();
    let session = manager.open(
        CueTrack::parse(common::THREE_CUE_SRT)?,
        second_audio,
        SimulatedPlayer::new(15.0),
        SessionOptions::default(),
    )?;

    // Fresh transcript for the new source
    assert!(session.view().is_empty());
    assert!(!store.is_live(&first_id));
    assert!(store.is_live(&second_id));
    assert_eq!(store.live_count(), 1);
    assert_eq!(manager.sessions_opened(), 2);

    assert!(manager.close());
    assert!(manager.current().is_none());
    assert!(!manager.close());
    assert_eq!(store.live_count(), 0);

    Ok(())
}

#[test]
fn test_manager_drop_shouldCloseLiveSession() -> Result<()> {
    let store = BlobStore::new();
    {
        let mut manager = SessionManager::new(store.clone());
        let audio = store.create(vec![0u8; 8], "audio/wav", "clip.wav");
        manager.open(
            CueTrack::parse(common::TWO_CUE_SRT)?,
            audio,
            SimulatedPlayer::new(5.0),
            SessionOptions::default(),
        )?;
        assert!(manager.current().is_some());
    }

    assert_eq!(store.live_count(), 0);
    Ok(())
}
