use tracing::{debug, info};

use crate::error::CoreResult;
use crate::models::{check_interval, Segment, SpeechWindow};

/// Configuration for merging segments into speech windows.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Maximum gap in seconds allowed between merged pieces
    pub max_gap_sec: f64,
    /// Merged windows longer than this are not extended further
    pub max_window_len_sec: f64,
    /// Minimum final window length in seconds; shorter windows are discarded
    pub min_final_len_sec: f64,
    /// Pre-merge filter: drop segments shorter than this...
    pub min_seed_len_sec: f64,
    /// ...unless they carry at least this many words
    pub min_seed_words: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_gap_sec: 1.0,
            max_window_len_sec: f64::INFINITY,
            min_final_len_sec: 3.0,
            min_seed_len_sec: 1.0,
            min_seed_words: 3,
        }
    }
}

/// Open-window accumulator for the merge fold.
struct OpenWindow {
    start: f64,
    end: f64,
    texts: Vec<String>,
    word_count: usize,
    speaker: String,
}

impl OpenWindow {
    fn seed(seg: &Segment) -> Self {
        Self {
            start: seg.start,
            end: seg.end,
            texts: if seg.text.is_empty() { vec![] } else { vec![seg.text.clone()] },
            word_count: seg.word_count(),
            speaker: seg.speaker.clone(),
        }
    }

    fn extend(&mut self, seg: &Segment) {
        self.end = seg.end;
        if !seg.text.is_empty() {
            self.texts.push(seg.text.clone());
        }
        self.word_count += seg.word_count();
    }

    /// Close the window, keeping it only if it meets the minimum length.
    fn close(self, min_final_len_sec: f64) -> Option<SpeechWindow> {
        let duration = self.end - self.start;
        if duration < min_final_len_sec {
            debug!("Discarding window of {:.2}s (below minimum)", duration);
            return None;
        }
        Some(SpeechWindow {
            start_time: self.start,
            end_time: self.end,
            duration,
            speaker: self.speaker,
            text: self.texts.join(" "),
            word_count: self.word_count,
            window_id: None,
        })
    }
}

/// Collapse a sequence of segments into larger speech windows.
///
/// Segments are stable-sorted by start time first. One window stays open at
/// a time: an incoming segment extends it when the gap from the window's end
/// is at most `max_gap_sec` and the prospective window length stays within
/// `max_window_len_sec`; otherwise the open window is closed (kept only when
/// at least `min_final_len_sec` long, silently discarded otherwise) and a
/// new one opens at the segment's bounds. The length check only gates
/// extension: a single segment longer than the cap still seeds its own
/// window. Output windows never overlap and strictly increase in start time.
pub fn merge_windows(segments: &[Segment], config: &MergeConfig) -> CoreResult<Vec<SpeechWindow>> {
    for seg in segments {
        check_interval(seg.start, seg.end, "segment")?;
    }

    let mut sorted: Vec<&Segment> = segments.iter().collect();
    sorted.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    let mut windows = Vec::new();
    let mut open: Option<OpenWindow> = None;

    for seg in sorted {
        let extended = match &mut open {
            None => false,
            Some(current) => {
                let gap = seg.start - current.end;
                let prospective_len = seg.end - current.start;
                if gap <= config.max_gap_sec && prospective_len <= config.max_window_len_sec {
                    current.extend(seg);
                    true
                } else {
                    false
                }
            }
        };

        if !extended {
            let closed = open.replace(OpenWindow::seed(seg));
            if let Some(window) = closed.and_then(|w| w.close(config.min_final_len_sec)) {
                windows.push(window);
            }
        }
    }

    if let Some(window) = open.and_then(|w| w.close(config.min_final_len_sec)) {
        windows.push(window);
    }

    Ok(windows)
}

/// Build speech windows for one speaker of a reconciled timeline.
///
/// Filters to the target speaker, drops tiny seed segments (shorter than
/// `min_seed_len_sec` with fewer than `min_seed_words` words), then merges.
pub fn windows_for_speaker(
    segments: &[Segment],
    speaker: &str,
    config: &MergeConfig,
) -> CoreResult<Vec<SpeechWindow>> {
    for seg in segments {
        check_interval(seg.start, seg.end, "segment")?;
    }

    let kept: Vec<Segment> = segments
        .iter()
        .filter(|s| s.speaker == speaker)
        .filter(|s| s.duration() >= config.min_seed_len_sec || s.word_count() >= config.min_seed_words)
        .cloned()
        .collect();

    info!(
        "Merging {} segments for speaker {} (of {} total)",
        kept.len(),
        speaker,
        segments.len()
    );

    merge_windows(&kept, config)
}
