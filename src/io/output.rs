use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::analysis::merge::MergeConfig;
use crate::models::{ReconciledTranscript, SpeechWindow};

/// Write any artifact as pretty-printed JSON.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {path:?}"))?;
    serde_json::to_writer_pretty(file, value).context("Failed to write JSON")?;
    Ok(())
}

/// Merge parameters echoed into the speech-windows artifact.
#[derive(Debug, Clone, Serialize)]
pub struct MergeParameters {
    pub max_gap_sec: f64,
    pub min_final_len_sec: f64,
    pub min_seed_len_sec: f64,
    pub min_seed_words: usize,
    /// Omitted when no length cap was configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_window_len_sec: Option<f64>,
}

impl From<&MergeConfig> for MergeParameters {
    fn from(config: &MergeConfig) -> Self {
        Self {
            max_gap_sec: config.max_gap_sec,
            min_final_len_sec: config.min_final_len_sec,
            min_seed_len_sec: config.min_seed_len_sec,
            min_seed_words: config.min_seed_words,
            max_window_len_sec: config.max_window_len_sec.is_finite().then_some(config.max_window_len_sec),
        }
    }
}

/// Per-speaker speech-windows artifact, consumed by the audio-slicing
/// collaborator downstream.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechWindowsFile {
    pub target_speaker: String,
    pub generated_at: String,
    pub total_windows: usize,
    /// Sum of window durations in seconds
    pub total_duration: f64,
    pub parameters: MergeParameters,
    pub windows: Vec<SpeechWindow>,
}

impl SpeechWindowsFile {
    /// Assemble the artifact, stamping each window with a stable id.
    pub fn new(target_speaker: &str, mut windows: Vec<SpeechWindow>, config: &MergeConfig) -> Self {
        for (i, window) in windows.iter_mut().enumerate() {
            window.window_id = Some(format!("seg_{i:04}"));
        }
        Self {
            target_speaker: target_speaker.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            total_windows: windows.len(),
            total_duration: windows.iter().map(|w| w.duration).sum(),
            parameters: MergeParameters::from(config),
            windows,
        }
    }
}

/// Human-readable rendering of a reconciled timeline.
pub struct HumanTranscript<'a> {
    transcript: &'a ReconciledTranscript,
}

impl<'a> HumanTranscript<'a> {
    pub fn new(transcript: &'a ReconciledTranscript) -> Self {
        Self { transcript }
    }

    /// Format the timeline as `[MM:SS.mmm] Speaker:` blocks with wrapped text.
    pub fn format(&self) -> String {
        let mut output = String::new();

        for segment in &self.transcript.segments {
            let start_time = format_timestamp(segment.start);
            output.push_str(&format!("[{}] {}:\n", start_time, segment.speaker));
            let wrapped = wrap_text(&segment.text, 80);
            output.push_str(&wrapped);
            output.push_str("\n\n");
        }

        output
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {path:?}"))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Format seconds as MM:SS.mmm
fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let secs = total_ms / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}.{:03}", secs / 60, secs % 60, millis)
}

/// Wrap text at approximately the given width
fn wrap_text(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        if line_len + word.len() + 1 > width && line_len > 0 {
            result.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            result.push(' ');
            line_len += 1;
        }
        result.push_str(word);
        line_len += word.len();
    }

    result
}
