use tracing::{debug, info};

use crate::error::CoreResult;
use crate::models::{check_interval, ReconciledTranscript, Segment, SpeakerTurn, Word};

/// Merge a diarization timeline with a word-level transcript.
///
/// Every word is assigned to at most one turn: the turn whose interval
/// overlaps it the most, ties broken by earliest turn start. A zero-length
/// word belongs to the turn containing its start in `[turn.start, turn.end)`.
/// Every turn produces a segment, including turns that matched no words.
/// Words overlapping no turn are dropped.
///
/// Inputs need not be pre-sorted; both sequences are stable-sorted by start
/// time here. Empty inputs yield an empty transcript, not an error.
pub fn reconcile(turns: &[SpeakerTurn], words: &[Word]) -> CoreResult<ReconciledTranscript> {
    for turn in turns {
        check_interval(turn.start, turn.end, "diarization turn")?;
    }
    for word in words {
        check_interval(word.start, word.end, "transcript word")?;
    }

    let mut turns: Vec<SpeakerTurn> = turns.to_vec();
    turns.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    let mut words: Vec<Word> = words.to_vec();
    words.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    info!(
        "Reconciling {} diarization turns with {} words",
        turns.len(),
        words.len()
    );

    // Per-turn word buckets, filled by assigning each word to its best turn
    let mut buckets: Vec<Vec<Word>> = vec![Vec::new(); turns.len()];
    let mut dropped = 0usize;

    for word in words {
        match best_turn_for_word(&word, &turns) {
            Some(idx) => buckets[idx].push(word),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("{} words overlapped no diarization turn and were dropped", dropped);
    }

    let segments: Vec<Segment> = turns
        .iter()
        .zip(buckets)
        .map(|(turn, mut bucket)| {
            bucket.sort_by(|a, b| {
                a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal)
            });
            let text = bucket
                .iter()
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            Segment {
                speaker: turn.speaker.clone(),
                start: turn.start,
                end: turn.end,
                text,
                words: bucket,
            }
        })
        .collect();

    let mut speakers: Vec<String> = segments.iter().map(|s| s.speaker.clone()).collect();
    speakers.sort();
    speakers.dedup();

    info!(
        "Reconciled into {} segments across {} speakers",
        segments.len(),
        speakers.len()
    );

    Ok(ReconciledTranscript { speakers, segments })
}

/// Index of the turn with greatest temporal overlap with `word`, ties broken
/// by earliest turn start (i.e. first in the sorted array).
fn best_turn_for_word(word: &Word, turns: &[SpeakerTurn]) -> Option<usize> {
    if word.end > word.start {
        let mut best: Option<(usize, f64)> = None;
        for (i, turn) in turns.iter().enumerate() {
            let overlap = (word.end.min(turn.end) - word.start.max(turn.start)).max(0.0);
            if overlap > 0.0 && best.is_none_or(|(_, b)| overlap > b) {
                best = Some((i, overlap));
            }
        }
        best.map(|(i, _)| i)
    } else {
        // Zero-length word: membership of its start in [turn.start, turn.end)
        turns
            .iter()
            .position(|t| t.start <= word.start && word.start < t.end)
    }
}
