//! Speech chunking and a playback driver for an external speech engine.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::trace;

/// Longest chunk handed to the speech engine, in characters.
pub const MAX_CHUNK_LENGTH: usize = 20;

fn chunk_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // A clause ending in ， or 。 when it fits, otherwise a plain run.
        Regex::new(r"[^，。]{1,20}[，。]|.{1,20}").expect("chunk pattern is valid")
    })
}

/// Split text into speakable chunks of at most 21 characters
/// (20 plus a closing ， or 。).
pub fn prepare_chunks(text: &str) -> Vec<String> {
    let chunks: Vec<String> = chunk_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    if chunks.is_empty() {
        vec![text.to_string()]
    } else {
        chunks
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeechSettings {
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

impl SpeechSettings {
    pub fn new(rate: f32, pitch: f32) -> Self {
        Self {
            rate: rate.clamp(0.1, 10.0),
            pitch: pitch.clamp(0.0, 2.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    PlayingChunk(usize),
    Finished,
    Cancelled,
}

/// Drives chunk-by-chunk playback.
///
/// The caller speaks [`Playback::current_chunk`] and reports completion
/// with [`Playback::chunk_complete`]. Events that do not match the current
/// state are ignored.
#[derive(Debug, Clone)]
pub struct Playback {
    chunks: Vec<String>,
    state: PlaybackState,
}

impl Playback {
    pub fn new(chunks: Vec<String>) -> Self {
        Self {
            chunks,
            state: PlaybackState::Idle,
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::new(prepare_chunks(text))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn current_chunk(&self) -> Option<&str> {
        match self.state {
            PlaybackState::PlayingChunk(index) => self.chunks.get(index).map(String::as_str),
            _ => None,
        }
    }

    /// Begin (or restart) playback from the first chunk.
    pub fn start(&mut self) -> PlaybackState {
        if matches!(self.state, PlaybackState::PlayingChunk(_)) {
            return self.state;
        }
        self.state = if self.chunks.is_empty() {
            PlaybackState::Finished
        } else {
            PlaybackState::PlayingChunk(0)
        };
        self.state
    }

    /// The engine finished speaking chunk `index`.
    pub fn chunk_complete(&mut self, index: usize) -> PlaybackState {
        match self.state {
            PlaybackState::PlayingChunk(current) if current == index => {
                let next = index + 1;
                self.state = if next < self.chunks.len() {
                    PlaybackState::PlayingChunk(next)
                } else {
                    PlaybackState::Finished
                };
            }
            state => trace!(?state, index, "ignoring stale chunk completion"),
        }
        self.state
    }

    pub fn cancel(&mut self) -> PlaybackState {
        self.state = PlaybackState::Cancelled;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_break_after_clause_punctuation() {
        let chunks = prepare_chunks("你好，世界。再见");
        assert_eq!(chunks, vec!["你好，", "世界。", "再见"]);
    }

    #[test]
    fn long_runs_are_cut_at_twenty_characters() {
        let text = "一".repeat(45);
        let chunks = prepare_chunks(&text);
        let lengths: Vec<usize> = chunks.iter().map(|c| c.chars().count()).collect();
        assert_eq!(lengths, vec![20, 20, 5]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn punctuation_past_the_limit_starts_a_new_chunk() {
        let text = format!("{}。", "二".repeat(25));
        let chunks = prepare_chunks(&text);
        assert_eq!(chunks[0].chars().count(), 20);
        assert_eq!(chunks[1], "二二二二二。");
    }

    #[test]
    fn text_without_matches_is_one_chunk() {
        assert_eq!(prepare_chunks(""), vec![String::new()]);
    }

    #[test]
    fn plays_every_chunk_then_finishes() {
        let mut playback = Playback::from_text("你好，世界。");
        assert_eq!(playback.state(), PlaybackState::Idle);
        assert_eq!(playback.current_chunk(), None);

        assert_eq!(playback.start(), PlaybackState::PlayingChunk(0));
        assert_eq!(playback.current_chunk(), Some("你好，"));
        assert_eq!(playback.chunk_complete(0), PlaybackState::PlayingChunk(1));
        assert_eq!(playback.current_chunk(), Some("世界。"));
        assert_eq!(playback.chunk_complete(1), PlaybackState::Finished);
    }

    #[test]
    fn stale_completions_are_ignored() {
        let mut playback = Playback::new(vec!["a".into(), "b".into()]);
        assert_eq!(playback.chunk_complete(0), PlaybackState::Idle);
        playback.start();
        assert_eq!(playback.chunk_complete(1), PlaybackState::PlayingChunk(0));
        assert_eq!(playback.start(), PlaybackState::PlayingChunk(0));
    }

    #[test]
    fn cancel_from_any_state() {
        let mut playback = Playback::new(vec!["a".into(), "b".into()]);
        assert_eq!(playback.cancel(), PlaybackState::Cancelled);

        playback.start();
        playback.chunk_complete(0);
        assert_eq!(playback.cancel(), PlaybackState::Cancelled);
        assert_eq!(playback.chunk_complete(1), PlaybackState::Cancelled);
        assert_eq!(playback.current_chunk(), None);

        assert_eq!(playback.start(), PlaybackState::PlayingChunk(0));
    }

    #[test]
    fn empty_playback_finishes_immediately() {
        let mut playback = Playback::new(Vec::new());
        assert_eq!(playback.start(), PlaybackState::Finished);
    }

    #[test]
    fn settings_are_clamped() {
        let settings = SpeechSettings::new(50.0, -1.0);
        assert_eq!(settings, SpeechSettings { rate: 10.0, pitch: 0.0 });
        assert_eq!(SpeechSettings::default().rate, 1.0);
    }
}
