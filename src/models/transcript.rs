use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A single transcribed word with second-resolution timestamps.
///
/// Words come from the ASR collaborator and are immutable: the pipeline
/// moves them into whichever segment they belong to, never rewrites them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
    /// The word text
    #[serde(rename = "word")]
    pub text: String,
}

impl Word {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// One diarization interval: who spoke, from when to when.
///
/// Speaker labels are opaque strings ("S0", "S1", or resolved human names);
/// any renaming happens upstream of this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerTurn {
    pub speaker: String,
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
}

impl SpeakerTurn {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A speaker-labeled segment of the reconciled timeline.
///
/// Bounds are the originating diarization turn's bounds, not the bounds of
/// the contained words. `words` is sorted by start time and `text` is the
/// space-joined concatenation of the word texts in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub speaker: String,
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
    /// Space-joined text of the contained words
    pub text: String,
    /// Constituent words, sorted by start time
    pub words: Vec<Word>,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }
}

/// The merged output of diarization + ASR: one ordered, speaker-labeled
/// transcript. This is the unit every downstream analyzer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledTranscript {
    /// Unique speaker labels present in the transcript, sorted
    pub speakers: Vec<String>,
    /// Segments ordered by start time
    pub segments: Vec<Segment>,
}

impl ReconciledTranscript {
    /// Total speaking time in seconds, summed over segment durations.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(Segment::duration).sum()
    }
}

/// Reject reversed intervals before any component consumes them.
pub fn check_interval(start: f64, end: f64, what: &str) -> CoreResult<()> {
    if end < start {
        return Err(CoreError::MalformedInput(format!(
            "{what} has end {end:.3} before start {start:.3}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_duration() {
        let seg = Segment {
            speaker: "S0".to_string(),
            start: 1.5,
            end: 4.0,
            text: String::new(),
            words: vec![],
        };
        assert!((seg.duration() - 2.5).abs() < 1e-9);
        assert_eq!(seg.word_count(), 0);
    }

    #[test]
    fn test_check_interval_rejects_reversed() {
        assert!(check_interval(0.0, 1.0, "turn").is_ok());
        assert!(check_interval(1.0, 1.0, "turn").is_ok());
        assert!(check_interval(2.0, 1.0, "turn").is_err());
    }

    #[test]
    fn test_word_wire_field_name() {
        let json = r#"{"start": 0.5, "end": 0.8, "word": "hello"}"#;
        let word: Word = serde_json::from_str(json).unwrap();
        assert_eq!(word.text, "hello");
        let back = serde_json::to_string(&word).unwrap();
        assert!(back.contains("\"word\":\"hello\""));
    }
}
