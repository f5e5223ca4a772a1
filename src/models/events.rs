use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How an interruption boundary was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionKind {
    /// Segments overlap in time (hard interruption)
    Overlap,
    /// Near-zero gap between segments (soft/instant takeover)
    QuickTakeover,
}

/// One detected interruption at a boundary between two adjacent segments.
///
/// Created once during the detector's forward pass and immutable after.
/// Segment indices refer to positions in the detector's sorted input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterruptionEvent {
    /// Start time of the interrupter's segment, in seconds
    pub time: f64,
    /// Temporal overlap between the two segments (>= 0)
    pub overlap_duration: f64,
    /// Gap from the earlier segment's end to the later one's start;
    /// negative when the segments overlap
    pub gap: f64,
    pub interrupter: String,
    pub interrupted: String,
    pub interrupter_segment_index: usize,
    pub interrupted_segment_index: usize,
    /// Text preview of the interrupter's segment (truncated to 100 chars)
    pub interrupter_segment_text: String,
    /// Text preview of the interrupted segment (truncated to 100 chars)
    pub interrupted_segment_text: String,
    #[serde(rename = "type")]
    pub kind: InterruptionKind,
    pub interrupter_word_count: usize,
    pub interrupter_duration: f64,
}

/// A short, low-word-count overlap or takeover that does not count as a
/// true interruption. Mutually exclusive with [`InterruptionEvent`] for the
/// same segment boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackchannelEvent {
    /// Start time of the backchanneling segment, in seconds
    pub time: f64,
    pub speaker: String,
    /// Position of the backchanneling segment in the sorted input
    pub segment_index: usize,
    pub text: String,
    pub duration: f64,
    pub word_count: usize,
}

/// Per-speaker interruption tallies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerInterruptionStats {
    pub interruptions_made: usize,
    pub interruptions_received: usize,
    pub backchannels_made: usize,
}

/// Aggregate counts over one detector run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterruptionStats {
    pub total_interruptions: usize,
    pub total_backchannels: usize,
    /// Every speaker present in the input appears here, even with zero counts
    pub per_speaker: BTreeMap<String, SpeakerInterruptionStats>,
}

/// Threshold parameters echoed into the output artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterruptionParameters {
    pub min_overlap_sec: f64,
    pub max_gap_sec: f64,
    pub min_words_interrupter: usize,
    pub max_backchannel_duration_sec: f64,
}

/// Full output of one interruption-detection pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterruptionReport {
    pub parameters: InterruptionParameters,
    pub interruptions: Vec<InterruptionEvent>,
    pub backchannels: Vec<BackchannelEvent>,
    pub stats: InterruptionStats,
}
