use std::collections::BTreeMap;

use tracing::info;

use crate::error::CoreResult;
use crate::models::{
    check_interval, BackchannelEvent, InterruptionEvent, InterruptionKind, InterruptionParameters,
    InterruptionReport, InterruptionStats, Segment, SpeakerInterruptionStats,
};

/// Thresholds for interruption classification.
#[derive(Debug, Clone)]
pub struct InterruptionConfig {
    /// Minimum temporal overlap in seconds to count as a hard interruption
    pub min_overlap_sec: f64,
    /// Maximum gap in seconds for an instant-takeover interruption
    pub max_gap_sec: f64,
    /// Fewer words than this (combined with a short duration) reclassifies
    /// the candidate as a backchannel
    pub min_words_interrupter: usize,
    /// Maximum duration in seconds for backchannel reclassification
    pub max_backchannel_duration_sec: f64,
}

impl Default for InterruptionConfig {
    fn default() -> Self {
        Self {
            min_overlap_sec: 0.2,
            max_gap_sec: 0.15,
            min_words_interrupter: 3,
            max_backchannel_duration_sec: 0.6,
        }
    }
}

impl InterruptionConfig {
    fn parameters(&self) -> InterruptionParameters {
        InterruptionParameters {
            min_overlap_sec: self.min_overlap_sec,
            max_gap_sec: self.max_gap_sec,
            min_words_interrupter: self.min_words_interrupter,
            max_backchannel_duration_sec: self.max_backchannel_duration_sec,
        }
    }
}

/// Scan a sorted timeline for interruptions and backchannels.
///
/// Segments must be pre-sorted by start time; indices in the emitted events
/// refer to positions in that input. Only boundaries between different
/// speakers are considered. For each such pair the classifier applies, in
/// order: overlap >= min_overlap_sec (interrupter is whichever segment
/// started later; equal starts fall to the lexicographically smaller speaker
/// id), then 0 <= gap <= max_gap_sec (interrupter is the following segment).
/// A candidate whose segment has both fewer than `min_words_interrupter`
/// words and a duration under `max_backchannel_duration_sec` becomes a
/// backchannel instead. No boundary ever yields both event kinds.
pub fn detect_interruptions(
    segments: &[Segment],
    config: &InterruptionConfig,
) -> CoreResult<InterruptionReport> {
    for seg in segments {
        check_interval(seg.start, seg.end, "segment")?;
    }

    info!("Analyzing {} segments for interruptions", segments.len());

    let mut interruptions = Vec::new();
    let mut backchannels = Vec::new();

    for (i, pair) in segments.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if prev.speaker == next.speaker {
            continue;
        }

        let overlap = (prev.end.min(next.end) - prev.start.max(next.start)).max(0.0);
        let gap = next.start - prev.end;

        let (kind, interrupter_idx) = if overlap >= config.min_overlap_sec {
            (InterruptionKind::Overlap, overlap_interrupter(prev, next, i))
        } else if gap >= 0.0 && gap <= config.max_gap_sec {
            (InterruptionKind::QuickTakeover, i + 1)
        } else {
            continue;
        };

        let interrupted_idx = if interrupter_idx == i { i + 1 } else { i };
        let interrupter = &segments[interrupter_idx];
        let interrupted = &segments[interrupted_idx];

        let word_count = interrupter.word_count();
        let duration = interrupter.duration();

        if word_count < config.min_words_interrupter
            && duration < config.max_backchannel_duration_sec
        {
            backchannels.push(BackchannelEvent {
                time: interrupter.start,
                speaker: interrupter.speaker.clone(),
                segment_index: interrupter_idx,
                text: interrupter.text.clone(),
                duration,
                word_count,
            });
        } else {
            interruptions.push(InterruptionEvent {
                time: interrupter.start,
                overlap_duration: overlap,
                gap,
                interrupter: interrupter.speaker.clone(),
                interrupted: interrupted.speaker.clone(),
                interrupter_segment_index: interrupter_idx,
                interrupted_segment_index: interrupted_idx,
                interrupter_segment_text: preview(&interrupter.text),
                interrupted_segment_text: preview(&interrupted.text),
                kind,
                interrupter_word_count: word_count,
                interrupter_duration: duration,
            });
        }
    }

    let mut per_speaker: BTreeMap<String, SpeakerInterruptionStats> = segments
        .iter()
        .map(|s| (s.speaker.clone(), SpeakerInterruptionStats::default()))
        .collect();
    for event in &interruptions {
        per_speaker.entry(event.interrupter.clone()).or_default().interruptions_made += 1;
        per_speaker.entry(event.interrupted.clone()).or_default().interruptions_received += 1;
    }
    for event in &backchannels {
        per_speaker.entry(event.speaker.clone()).or_default().backchannels_made += 1;
    }

    info!(
        "Found {} interruptions and {} backchannels",
        interruptions.len(),
        backchannels.len()
    );

    Ok(InterruptionReport {
        parameters: config.parameters(),
        stats: InterruptionStats {
            total_interruptions: interruptions.len(),
            total_backchannels: backchannels.len(),
            per_speaker,
        },
        interruptions,
        backchannels,
    })
}

/// Index of the interrupter in the overlap case: the segment that began
/// later. Simultaneous starts are broken by the smaller speaker label so the
/// outcome never depends on array order.
fn overlap_interrupter(prev: &Segment, next: &Segment, prev_idx: usize) -> usize {
    if next.start > prev.start {
        prev_idx + 1
    } else if prev.start > next.start {
        prev_idx
    } else if next.speaker < prev.speaker {
        prev_idx + 1
    } else {
        prev_idx
    }
}

/// Truncate event text to a 100-character preview.
fn preview(text: &str) -> String {
    if text.chars().count() > 100 {
        let cut: String = text.chars().take(100).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}
