use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Run-length statistics for one speaker.
///
/// A run is a maximal consecutive subsequence of segments with the same
/// speaker. Run duration spans from the first segment's start to the last
/// segment's end; total speaking time sums each segment's own duration so
/// inter-segment gaps are not counted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub num_runs: usize,
    pub avg_run_segments: f64,
    pub avg_run_duration_sec: f64,
    pub max_run_duration_sec: f64,
    pub max_run_segments: usize,
    pub total_speaking_time_sec: f64,
}

/// Turn-taking analysis over the reconciled timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnTakingStats {
    /// Unique speaker labels, sorted
    pub speakers: Vec<String>,
    /// Transition counts keyed "A->B", zero-filled over all ordered pairs
    pub transitions: BTreeMap<String, usize>,
    pub total_transitions: usize,
    /// Fraction of transitions where the speaker changed; 0.0 when there
    /// are no transitions
    pub alternation_rate: f64,
    pub runs: BTreeMap<String, RunStats>,
}

/// Basic per-speaker totals computed straight from the segments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakerStats {
    pub total_speaking_time_sec: f64,
    pub total_speaking_time_min: f64,
    pub total_words: usize,
    pub num_segments: usize,
    /// 0.0 when the speaker has no speaking time
    pub words_per_minute: f64,
}

/// Word count and speaking rate for one speaker in one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateWindowSample {
    pub window_index: usize,
    pub window_start: f64,
    pub window_end: f64,
    pub speaker: String,
    pub word_count: usize,
    pub words_per_minute: f64,
}

/// Speaking-rate timeseries artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateTimeseries {
    pub window_size_sec: f64,
    pub step_size_sec: f64,
    /// Sparse: (window, speaker) pairs with zero words are omitted
    pub timeseries: Vec<RateWindowSample>,
}

/// One merged per-speaker speech window.
///
/// Every persisted window satisfies `duration >= min_final_len_sec`; shorter
/// windows are discarded during merging, never persisted with a flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechWindow {
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub speaker: String,
    /// Space-joined text of the merged segments
    pub text: String,
    pub word_count: usize,
    /// Stable identifier assigned at persist time ("seg_0000", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_id: Option<String>,
}
