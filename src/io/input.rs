use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::models::{check_interval, FeatureRow, ReconciledTranscript, SpeakerTurn, Word};

/// Wire shape of the diarization collaborator's output.
#[derive(Debug, Deserialize)]
struct DiarizationFile {
    segments: Vec<SpeakerTurn>,
}

/// Wire shape of the ASR collaborator's output. Segment-level text is
/// carried but unused; only the word stream matters for reconciliation.
#[derive(Debug, Deserialize)]
struct AsrFile {
    segments: Vec<AsrSegment>,
}

#[derive(Debug, Deserialize)]
struct AsrSegment {
    #[serde(default)]
    words: Vec<Word>,
}

#[derive(Debug, Deserialize)]
struct FeatureFile {
    rows: Vec<FeatureRow>,
}

/// Parse a diarization timeline file (`{"segments": [{speaker, start, end}]}`).
pub fn parse_diarization_file(path: &Path) -> Result<Vec<SpeakerTurn>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path:?}"))?;
    parse_diarization_json(&content)
}

pub fn parse_diarization_json(json: &str) -> Result<Vec<SpeakerTurn>> {
    let file: DiarizationFile =
        serde_json::from_str(json).context("Failed to parse diarization JSON")?;
    for turn in &file.segments {
        check_interval(turn.start, turn.end, "diarization turn")?;
    }
    debug!("Parsed {} diarization turns", file.segments.len());
    Ok(file.segments)
}

/// Parse a word-level ASR transcript file and flatten it to a word stream.
/// Words with empty text are skipped, matching the upstream contract that
/// only real tokens carry timing.
pub fn parse_transcript_file(path: &Path) -> Result<Vec<Word>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path:?}"))?;
    parse_transcript_json(&content)
}

pub fn parse_transcript_json(json: &str) -> Result<Vec<Word>> {
    let file: AsrFile = serde_json::from_str(json).context("Failed to parse transcript JSON")?;
    let mut words = Vec::new();
    for segment in file.segments {
        for word in segment.words {
            let text = word.text.trim();
            if text.is_empty() {
                continue;
            }
            check_interval(word.start, word.end, "transcript word")?;
            words.push(Word {
                start: word.start,
                end: word.end,
                text: text.to_string(),
            });
        }
    }
    debug!("Parsed {} transcript words", words.len());
    Ok(words)
}

/// Parse a previously written reconciled-timeline artifact.
pub fn parse_reconciled_file(path: &Path) -> Result<ReconciledTranscript> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path:?}"))?;
    let transcript: ReconciledTranscript =
        serde_json::from_str(&content).context("Failed to parse reconciled transcript JSON")?;
    for seg in &transcript.segments {
        check_interval(seg.start, seg.end, "segment")?;
    }
    Ok(transcript)
}

/// Parse an acoustic feature table (`{"rows": [{segment_id, <features>...}]}`).
pub fn parse_features_file(path: &Path) -> Result<Vec<FeatureRow>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path:?}"))?;
    let file: FeatureFile =
        serde_json::from_str(&content).context("Failed to parse feature table JSON")?;
    Ok(file.rows)
}
