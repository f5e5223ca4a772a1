use std::collections::BTreeMap;

use tracing::info;

use crate::error::CoreResult;
use crate::models::{check_interval, RunStats, Segment, SpeakerStats, TurnTakingStats};

/// Compute turn-taking statistics over a sorted timeline.
///
/// Segments must be pre-sorted by start time; the caller owns that ordering
/// so it matches the interruption detector's view of the same timeline.
/// Each consecutive pair records one transition keyed "prev->next" in a
/// matrix zero-filled over all ordered speaker pairs. With fewer than two
/// segments there are no transitions and the alternation rate is 0.0 by
/// convention.
pub fn analyze_turns(segments: &[Segment]) -> CoreResult<TurnTakingStats> {
    for seg in segments {
        check_interval(seg.start, seg.end, "segment")?;
    }

    let mut speakers: Vec<String> = segments.iter().map(|s| s.speaker.clone()).collect();
    speakers.sort();
    speakers.dedup();

    info!(
        "Analyzing turn-taking over {} segments, {} speakers",
        segments.len(),
        speakers.len()
    );

    let mut transitions: BTreeMap<String, usize> = BTreeMap::new();
    for a in &speakers {
        for b in &speakers {
            transitions.insert(format!("{a}->{b}"), 0);
        }
    }

    let total_transitions = segments.len().saturating_sub(1);
    let mut alternations = 0usize;
    for pair in segments.windows(2) {
        let key = format!("{}->{}", pair[0].speaker, pair[1].speaker);
        *transitions.entry(key).or_insert(0) += 1;
        if pair[0].speaker != pair[1].speaker {
            alternations += 1;
        }
    }

    let alternation_rate = if total_transitions > 0 {
        alternations as f64 / total_transitions as f64
    } else {
        0.0
    };

    let runs = run_stats(segments, &speakers);

    Ok(TurnTakingStats {
        speakers,
        transitions,
        total_transitions,
        alternation_rate,
        runs,
    })
}

/// Collect per-speaker run statistics.
///
/// Run duration is the span from the run's first start to its last end;
/// total speaking time sums each segment's own duration instead, so gaps
/// inside a run are not double counted as speech.
fn run_stats(segments: &[Segment], speakers: &[String]) -> BTreeMap<String, RunStats> {
    // (speaker, segment count, span duration) per run
    let mut runs: Vec<(String, usize, f64)> = Vec::new();
    let mut iter = segments.iter();
    if let Some(first) = iter.next() {
        let mut speaker = first.speaker.clone();
        let mut count = 1usize;
        let mut run_start = first.start;
        let mut run_end = first.end;
        for seg in iter {
            if seg.speaker == speaker {
                count += 1;
                run_end = seg.end;
            } else {
                runs.push((speaker, count, run_end - run_start));
                speaker = seg.speaker.clone();
                count = 1;
                run_start = seg.start;
                run_end = seg.end;
            }
        }
        runs.push((speaker, count, run_end - run_start));
    }

    let mut stats: BTreeMap<String, RunStats> = speakers
        .iter()
        .map(|s| (s.clone(), RunStats::default()))
        .collect();

    for (speaker, count, duration) in runs {
        let entry = stats.entry(speaker).or_default();
        entry.num_runs += 1;
        // Reuse avg fields as accumulators; divided through below
        entry.avg_run_segments += count as f64;
        entry.avg_run_duration_sec += duration;
        entry.max_run_duration_sec = entry.max_run_duration_sec.max(duration);
        entry.max_run_segments = entry.max_run_segments.max(count);
    }
    for entry in stats.values_mut() {
        if entry.num_runs > 0 {
            entry.avg_run_segments /= entry.num_runs as f64;
            entry.avg_run_duration_sec /= entry.num_runs as f64;
        }
    }

    for seg in segments {
        if let Some(entry) = stats.get_mut(&seg.speaker) {
            entry.total_speaking_time_sec += seg.duration();
        }
    }

    stats
}

/// Basic per-speaker totals: speaking time, word count, segment count, and
/// an overall words-per-minute figure (0.0 when a speaker has no time).
pub fn basic_speaker_stats(segments: &[Segment]) -> CoreResult<BTreeMap<String, SpeakerStats>> {
    for seg in segments {
        check_interval(seg.start, seg.end, "segment")?;
    }

    let mut stats: BTreeMap<String, SpeakerStats> = BTreeMap::new();
    for seg in segments {
        let entry = stats.entry(seg.speaker.clone()).or_default();
        entry.total_speaking_time_sec += seg.duration();
        entry.total_words += seg.word_count();
        entry.num_segments += 1;
    }

    for entry in stats.values_mut() {
        entry.total_speaking_time_min = entry.total_speaking_time_sec / 60.0;
        entry.words_per_minute = if entry.total_speaking_time_min > 0.0 {
            entry.total_words as f64 / entry.total_speaking_time_min
        } else {
            0.0
        };
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(speaker: &str, start: f64, end: f64) -> Segment {
        Segment {
            speaker: speaker.to_string(),
            start,
            end,
            text: String::new(),
            words: vec![],
        }
    }

    #[test]
    fn test_transitions_and_alternation() {
        let segments = vec![
            seg("A", 0.0, 1.0),
            seg("B", 1.0, 2.0),
            seg("B", 2.0, 3.0),
            seg("A", 3.0, 4.0),
        ];

        let stats = analyze_turns(&segments).unwrap();

        assert_eq!(stats.total_transitions, 3);
        assert_eq!(stats.transitions["A->B"], 1);
        assert_eq!(stats.transitions["B->B"], 1);
        assert_eq!(stats.transitions["B->A"], 1);
        assert_eq!(stats.transitions["A->A"], 0);
        assert!((stats.alternation_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_alternation_rate_is_one_when_every_pair_differs() {
        let segments = vec![seg("A", 0.0, 1.0), seg("B", 1.0, 2.0), seg("A", 2.0, 3.0)];

        let stats = analyze_turns(&segments).unwrap();

        assert!((stats.alternation_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fewer_than_two_segments() {
        let stats = analyze_turns(&[seg("A", 0.0, 2.0)]).unwrap();
        assert_eq!(stats.total_transitions, 0);
        assert!((stats.alternation_rate - 0.0).abs() < 1e-9);
        assert_eq!(stats.runs["A"].num_runs, 1);

        let empty = analyze_turns(&[]).unwrap();
        assert_eq!(empty.total_transitions, 0);
        assert!(empty.speakers.is_empty());
    }

    #[test]
    fn test_run_detection() {
        let segments = vec![
            seg("A", 0.0, 1.0),
            seg("A", 1.5, 3.0),
            seg("B", 3.0, 4.0),
            seg("A", 4.0, 5.0),
        ];

        let stats = analyze_turns(&segments).unwrap();

        let a = &stats.runs["A"];
        assert_eq!(a.num_runs, 2);
        assert_eq!(a.max_run_segments, 2);
        // First run spans 0.0..3.0, second 4.0..5.0
        assert!((a.max_run_duration_sec - 3.0).abs() < 1e-9);
        assert!((a.avg_run_duration_sec - 2.0).abs() < 1e-9);
        assert!((a.avg_run_segments - 1.5).abs() < 1e-9);
        // Speaking time sums segment durations, not run spans
        assert!((a.total_speaking_time_sec - 3.5).abs() < 1e-9);

        let b = &stats.runs["B"];
        assert_eq!(b.num_runs, 1);
        assert!((b.total_speaking_time_sec - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_speaking_time_conservation() {
        let segments = vec![
            seg("A", 0.0, 1.5),
            seg("B", 1.5, 4.0),
            seg("A", 4.5, 6.0),
            seg("B", 6.0, 6.25),
        ];

        let stats = analyze_turns(&segments).unwrap();

        let total: f64 = stats.runs.values().map(|r| r.total_speaking_time_sec).sum();
        let expected: f64 = segments.iter().map(Segment::duration).sum();
        assert!((total - expected).abs() < 1e-9);
    }

    #[test]
    fn test_basic_speaker_stats() {
        let mut a = seg("A", 0.0, 60.0);
        a.words = (0..120)
            .map(|i| crate::models::Word {
                start: i as f64 * 0.5,
                end: i as f64 * 0.5 + 0.3,
                text: format!("w{i}"),
            })
            .collect();
        let b = seg("B", 60.0, 61.0);

        let stats = basic_speaker_stats(&[a, b]).unwrap();

        assert_eq!(stats["A"].total_words, 120);
        assert!((stats["A"].words_per_minute - 120.0).abs() < 1e-9);
        assert_eq!(stats["B"].total_words, 0);
        assert_eq!(stats["B"].num_segments, 1);
    }
}
