use std::collections::BTreeMap;

use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::models::{check_interval, RateTimeseries, RateWindowSample, Segment};

/// Windowing parameters for the speaking-rate timeseries.
#[derive(Debug, Clone)]
pub struct RateConfig {
    /// Window size in seconds
    pub window_size_sec: f64,
    /// Stride between windows; `None` means contiguous non-overlapping
    /// windows (stride = window size)
    pub step_size_sec: Option<f64>,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            window_size_sec: 30.0,
            step_size_sec: None,
        }
    }
}

/// Bucket word starts into fixed or sliding time windows per speaker.
///
/// Window `i` covers `[start + i*step, start + i*step + window_size)` where
/// `start` is the earliest word start; windows are generated while their
/// start precedes the latest word end. A word belongs to a window when
/// `window_start <= word.start < window_end`, so with a sliding stride one
/// word can land in several windows. Output is sparse: (window, speaker)
/// pairs with no words produce no sample. Empty input yields an empty
/// timeseries.
pub fn compute_rate(segments: &[Segment], config: &RateConfig) -> CoreResult<RateTimeseries> {
    if config.window_size_sec <= 0.0 {
        return Err(CoreError::MalformedInput(format!(
            "window size must be positive, got {}",
            config.window_size_sec
        )));
    }
    let step = config.step_size_sec.unwrap_or(config.window_size_sec);
    if step <= 0.0 {
        return Err(CoreError::MalformedInput(format!(
            "step size must be positive, got {step}"
        )));
    }
    for seg in segments {
        check_interval(seg.start, seg.end, "segment")?;
        for word in &seg.words {
            check_interval(word.start, word.end, "word")?;
        }
    }

    // (start, end, speaker) per word
    let words: Vec<(f64, f64, &str)> = segments
        .iter()
        .flat_map(|s| s.words.iter().map(move |w| (w.start, w.end, s.speaker.as_str())))
        .collect();

    let mut timeseries = Vec::new();
    if words.is_empty() {
        return Ok(RateTimeseries {
            window_size_sec: config.window_size_sec,
            step_size_sec: step,
            timeseries,
        });
    }

    let conversation_start = words.iter().map(|w| w.0).fold(f64::INFINITY, f64::min);
    let conversation_end = words.iter().map(|w| w.1).fold(f64::NEG_INFINITY, f64::max);

    info!(
        "Windowing {} words over {:.1}s..{:.1}s (window {:.1}s, step {:.1}s)",
        words.len(),
        conversation_start,
        conversation_end,
        config.window_size_sec,
        step
    );

    let mut window_index = 0usize;
    loop {
        let window_start = conversation_start + window_index as f64 * step;
        if window_start >= conversation_end {
            break;
        }
        let window_end = window_start + config.window_size_sec;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for &(start, _, speaker) in &words {
            if start >= window_start && start < window_end {
                *counts.entry(speaker).or_insert(0) += 1;
            }
        }

        for (speaker, word_count) in counts {
            timeseries.push(RateWindowSample {
                window_index,
                window_start,
                window_end,
                speaker: speaker.to_string(),
                word_count,
                words_per_minute: word_count as f64 / config.window_size_sec * 60.0,
            });
        }

        window_index += 1;
    }

    Ok(RateTimeseries {
        window_size_sec: config.window_size_sec,
        step_size_sec: step,
        timeseries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Word;

    fn seg_with_words(speaker: &str, starts: &[f64]) -> Segment {
        let words: Vec<Word> = starts
            .iter()
            .map(|&s| Word {
                start: s,
                end: s + 0.2,
                text: "w".to_string(),
            })
            .collect();
        let start = starts.first().copied().unwrap_or(0.0);
        let end = starts.last().copied().unwrap_or(0.0) + 0.2;
        Segment {
            speaker: speaker.to_string(),
            start,
            end,
            text: String::new(),
            words,
        }
    }

    #[test]
    fn test_contiguous_windows() {
        let segments = vec![
            seg_with_words("A", &[0.0, 1.0, 2.0, 31.0]),
            seg_with_words("B", &[5.0, 6.0]),
        ];

        let result = compute_rate(&segments, &RateConfig::default()).unwrap();

        assert!((result.step_size_sec - 30.0).abs() < 1e-9);
        // Window 0: A has 3 words, B has 2; window 1: A has 1
        assert_eq!(result.timeseries.len(), 3);
        let w0_a = &result.timeseries[0];
        assert_eq!((w0_a.window_index, w0_a.speaker.as_str(), w0_a.word_count), (0, "A", 3));
        assert!((w0_a.words_per_minute - 6.0).abs() < 1e-9);
        let w0_b = &result.timeseries[1];
        assert_eq!((w0_b.speaker.as_str(), w0_b.word_count), ("B", 2));
        let w1_a = &result.timeseries[2];
        assert_eq!((w1_a.window_index, w1_a.word_count), (1, 1));
    }

    #[test]
    fn test_sparse_output_omits_empty_speaker_windows() {
        let segments = vec![
            seg_with_words("A", &[0.0]),
            seg_with_words("B", &[65.0]),
        ];

        let result = compute_rate(&segments, &RateConfig::default()).unwrap();

        // Three windows span 0..65.2; window 1 (30..60) has no words at all
        let indices: Vec<(usize, &str)> = result
            .timeseries
            .iter()
            .map(|s| (s.window_index, s.speaker.as_str()))
            .collect();
        assert_eq!(indices, vec![(0, "A"), (2, "B")]);
    }

    #[test]
    fn test_window_membership_is_half_open() {
        // A word starting exactly at a window boundary belongs to the later window
        let segments = vec![seg_with_words("A", &[0.0, 30.0])];

        let result = compute_rate(&segments, &RateConfig::default()).unwrap();

        assert_eq!(result.timeseries.len(), 2);
        assert_eq!(result.timeseries[0].word_count, 1);
        assert_eq!(result.timeseries[1].word_count, 1);
        assert_eq!(result.timeseries[1].window_index, 1);
    }

    #[test]
    fn test_sliding_windows_overlap() {
        let segments = vec![seg_with_words("A", &[5.0])];
        let config = RateConfig {
            window_size_sec: 10.0,
            step_size_sec: Some(5.0),
        };

        let result = compute_rate(&segments, &config).unwrap();

        // Word at absolute 5.0 sits in the conversation's only instantaneous
        // span; conversation is 5.0..5.2 so only window 0 exists
        assert_eq!(result.timeseries.len(), 1);
        assert_eq!(result.timeseries[0].word_count, 1);
        assert!((result.timeseries[0].window_start - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_sliding_window_counts_word_twice() {
        let segments = vec![seg_with_words("A", &[0.0, 7.0, 24.8])];
        let config = RateConfig {
            window_size_sec: 10.0,
            step_size_sec: Some(5.0),
        };

        let result = compute_rate(&segments, &config).unwrap();

        // Word at 7.0 is counted in window 0 (0..10) and window 1 (5..15)
        let counts: Vec<(usize, usize)> = result
            .timeseries
            .iter()
            .map(|s| (s.window_index, s.word_count))
            .collect();
        assert!(counts.contains(&(0, 2)));
        assert!(counts.contains(&(1, 1)));
    }

    #[test]
    fn test_empty_input() {
        let result = compute_rate(&[], &RateConfig::default()).unwrap();
        assert!(result.timeseries.is_empty());

        let no_words = vec![Segment {
            speaker: "A".to_string(),
            start: 0.0,
            end: 10.0,
            text: String::new(),
            words: vec![],
        }];
        let result = compute_rate(&no_words, &RateConfig::default()).unwrap();
        assert!(result.timeseries.is_empty());
    }

    #[test]
    fn test_invalid_window_size() {
        assert!(compute_rate(
            &[],
            &RateConfig {
                window_size_sec: 0.0,
                step_size_sec: None
            }
        )
        .is_err());
    }
}
