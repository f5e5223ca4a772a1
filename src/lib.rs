pub mod analysis;
pub mod error;
pub mod io;
pub mod models;

pub use analysis::{
    analyze_turns, basic_speaker_stats, compute_rate, detect_interruptions, merge_windows,
    reconcile, score_arousal, windows_for_speaker, ArousalConfig, InterruptionConfig, MergeConfig,
    RateConfig,
};
pub use error::{CoreError, CoreResult};
pub use io::{
    parse_diarization_file, parse_features_file, parse_reconciled_file, parse_transcript_file,
    write_json, HumanTranscript, SpeechWindowsFile,
};
pub use models::{
    ArousalReport, ArousalRow, BackchannelEvent, FeatureRow, InterruptionEvent,
    InterruptionReport, RateTimeseries, ReconciledTranscript, Segment, SpeakerTurn, SpeechWindow,
    TurnTakingStats, Word,
};
