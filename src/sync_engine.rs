/*!
 * Synchronization of a parsed cue track with a playback clock.
 *
 * The engine is a plain stateful object driven by two inputs:
 * - `on_tick(position)`: periodic position updates from the playback engine
 * - `on_seek(position)`: discrete jumps requested by the user
 *
 * Transcript policy: cues accumulate in emission order and each cue appears
 * at most once. Reaching a cue that is already shown (after a seek back)
 * rewinds the transcript to that cue, dropping the lines after it. Once the
 * final cue of the track has been emitted the track is complete, and the next
 * cue transition (a replay from the start, for instance) begins a fresh
 * transcript. Positions outside every cue window never change state.
 *
 * Highlights are keyed by cue identity (`sequence_index`) and only decorate
 * lines that are already part of the transcript.
 */

use std::collections::BTreeSet;
use log::{debug, trace};
use serde::Serialize;

use crate::subtitle_processor::{Cue, CueTrack};

/// Result of feeding one tick to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No cue covers the position
    Idle,
    /// The covering cue is the one already emitted
    Unchanged,
    /// A new cue was emitted and appended to the transcript
    Advanced { cue_index: u32 },
    /// The track had completed; the transcript was cleared before emitting
    Restarted { cue_index: u32 },
    /// The cue was already shown; lines after it were dropped
    Rewound { cue_index: u32 },
}

impl TickOutcome {
    /// Whether the transcript changed as a result of the tick
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            Self::Advanced { .. } | Self::Restarted { .. } | Self::Rewound { .. }
        )
    }
}

/// Result of a seek
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// No cue covers the target position
    NotFound,
    /// The covering cue was recorded as highlighted
    Highlighted {
        cue_index: u32,
        /// Whether the cue is already shown in the transcript
        visible: bool,
    },
}

/// One line of the rendered transcript
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptLine {
    pub cue_index: u32,
    pub text: String,
    pub highlighted: bool,
}

/// What should currently be rendered
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TranscriptView {
    pub lines: Vec<TranscriptLine>,
}

impl TranscriptView {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Line texts in display order
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    /// Transcript as a single text block, one cue per line
    pub fn render(&self) -> String {
        self.texts().join("\n")
    }

    /// Transcript with highlighted lines prefixed by `> `
    pub fn render_marked(&self) -> String {
        self.lines
            .iter()
            .map(|line| {
                if line.highlighted {
                    format!("> {}", line.text)
                } else {
                    format!("  {}", line.text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ShownCue {
    cue_index: u32,
    text: String,
}

/// Stateful transcript builder for one playback session
#[derive(Debug)]
pub struct SyncEngine {
    track: CueTrack,
    last_emitted: Option<u32>,
    accumulated: Vec<ShownCue>,
    highlights: BTreeSet<u32>,
    completed: bool,
}

impl SyncEngine {
    /// Create an engine for a parsed track, with an empty transcript
    pub fn new(track: CueTrack) -> Self {
        Self {
            track,
            last_emitted: None,
            accumulated: Vec::new(),
            highlights: BTreeSet::new(),
            completed: false,
        }
    }

    pub fn track(&self) -> &CueTrack {
        &self.track
    }

    /// Sequence index of the most recently emitted cue
    pub fn last_emitted(&self) -> Option<u32> {
        self.last_emitted
    }

    /// Whether the final cue of the track has been emitted
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Highlighted cue indices in ascending order
    pub fn highlights(&self) -> impl Iterator<Item = u32> + '_ {
        self.highlights.iter().copied()
    }

    /// Re-evaluate the transcript for a new playback position
    pub fn on_tick(&mut self, position: f64) -> TickOutcome {
        let Some(cue) = self.track.find_at(position) else {
            trace!("No cue at {:.3}s", position);
            return TickOutcome::Idle;
        };

        if self.last_emitted == Some(cue.sequence_index) {
            return TickOutcome::Unchanged;
        }

        let cue_index = cue.sequence_index;
        let text = cue.text.clone();
        let is_final = self.is_final(cue_index);

        let restarted = self.completed;
        if restarted {
            debug!("Track completed earlier, starting a fresh transcript at cue {}", cue_index);
            self.accumulated.clear();
            self.completed = false;
        }

        self.last_emitted = Some(cue_index);

        // Repeated ticks inside one cue stop at the last-emitted check above.
        // Finding the cue earlier in the transcript means playback went back to it.
        let rewound = match self.position_shown(cue_index) {
            Some(shown_at) => {
                self.accumulated.truncate(shown_at + 1);
                true
            }
            None => {
                self.accumulated.push(ShownCue { cue_index, text });
                false
            }
        };

        if is_final {
            self.completed = true;
        }

        debug!(
            "Cue {} emitted at {} ({} line(s) shown)",
            cue_index,
            Cue::format_timestamp(position),
            self.accumulated.len()
        );

        if restarted {
            TickOutcome::Restarted { cue_index }
        } else if rewound {
            TickOutcome::Rewound { cue_index }
        } else {
            TickOutcome::Advanced { cue_index }
        }
    }

    /// Record a user seek; highlights the covering cue without revealing it
    pub fn on_seek(&mut self, position: f64) -> SeekOutcome {
        let Some(cue) = self.track.find_at(position) else {
            trace!("Seek to {:.3}s hit no cue", position);
            return SeekOutcome::NotFound;
        };

        let cue_index = cue.sequence_index;
        self.highlights.insert(cue_index);
        let visible = self.is_shown(cue_index);

        debug!(
            "Seek to {} highlighted cue {} (visible: {})",
            Cue::format_timestamp(position),
            cue_index,
            visible
        );

        SeekOutcome::Highlighted { cue_index, visible }
    }

    /// Current transcript
    pub fn view(&self) -> TranscriptView {
        TranscriptView {
            lines: self
                .accumulated
                .iter()
                .map(|shown| TranscriptLine {
                    cue_index: shown.cue_index,
                    text: shown.text.clone(),
                    highlighted: self.highlights.contains(&shown.cue_index),
                })
                .collect(),
        }
    }

    /// Current transcript rendered as text
    pub fn transcript_text(&self) -> String {
        self.view().render()
    }

    /// Clear all transcript and highlight state, keeping the track
    pub fn reset(&mut self) {
        self.last_emitted = None;
        self.accumulated.clear();
        self.highlights.clear();
        self.completed = false;
    }

    fn is_shown(&self, cue_index: u32) -> bool {
        self.position_shown(cue_index).is_some()
    }

    fn position_shown(&self, cue_index: u32) -> Option<usize> {
        self.accumulated.iter().position(|shown| shown.cue_index == cue_index)
    }

    fn is_final(&self, cue_index: u32) -> bool {
        self.track
            .last()
            .is_some_and(|cue| cue.sequence_index == cue_index)
    }
}
