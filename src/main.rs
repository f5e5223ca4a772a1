use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crosstalk::{
    analyze_turns, basic_speaker_stats, compute_rate, detect_interruptions, parse_diarization_file,
    parse_features_file, parse_reconciled_file, parse_transcript_file, reconcile, score_arousal,
    windows_for_speaker, write_json, ArousalConfig, HumanTranscript, InterruptionConfig,
    MergeConfig, RateConfig, SpeechWindowsFile,
};

#[derive(Parser)]
#[command(name = "crosstalk")]
#[command(author, version, about = "Conversational-dynamics analysis for diarized transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge a diarization timeline with an ASR word transcript
    Reconcile {
        /// Diarization segments file (JSON)
        #[arg(short, long)]
        diarization: PathBuf,

        /// Word-level ASR transcript file (JSON)
        #[arg(short, long)]
        transcript: PathBuf,

        /// Output file for the reconciled timeline (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Optional human-readable transcript (text)
        #[arg(long)]
        human_readable: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Detect interruptions and backchannels in a reconciled timeline
    Interruptions {
        /// Reconciled timeline file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the interruption report (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Minimum overlap in seconds to count as interruption
        #[arg(long, default_value = "0.2")]
        min_overlap_sec: f64,

        /// Maximum gap in seconds for an instant takeover
        #[arg(long, default_value = "0.15")]
        max_gap_sec: f64,

        /// Minimum words for a real interruption
        #[arg(long, default_value = "3")]
        min_words_interrupter: usize,

        /// Maximum backchannel duration in seconds
        #[arg(long, default_value = "0.6")]
        max_backchannel_duration_sec: f64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compute turn-taking transition and run statistics
    Turns {
        /// Reconciled timeline file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for turn-taking statistics (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compute a per-speaker speaking-rate timeseries
    Rate {
        /// Reconciled timeline file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the rate timeseries (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Window size in seconds
        #[arg(long, default_value = "30.0")]
        window_size_sec: f64,

        /// Step between windows in seconds (default: non-overlapping)
        #[arg(long)]
        step_size_sec: Option<f64>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Build merged speech windows for one speaker
    Windows {
        /// Reconciled timeline file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Target speaker label
        #[arg(short, long)]
        speaker: String,

        /// Output file for the speech windows (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Maximum gap in seconds between merged pieces
        #[arg(long, default_value = "1.0")]
        max_gap_sec: f64,

        /// Minimum final window length in seconds
        #[arg(long, default_value = "3.0")]
        min_final_len_sec: f64,

        /// Maximum merged window length in seconds (default: unlimited)
        #[arg(long)]
        max_window_len_sec: Option<f64>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Score acoustic feature rows with the arousal index
    Arousal {
        /// Feature table file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for scored rows (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// Heated threshold in standard deviations above the mean
        #[arg(long, default_value = "2.0")]
        threshold_k: f64,

        /// Features to score (default: the standard acoustic set)
        #[arg(long, value_delimiter = ',')]
        features: Option<Vec<String>>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print per-speaker summary statistics without writing anything
    Stats {
        /// Reconciled timeline file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Reconcile {
            diarization,
            transcript,
            output,
            human_readable,
            verbose,
        } => {
            setup_logging(verbose);
            run_reconcile(diarization, transcript, output, human_readable)
        }
        Commands::Interruptions {
            input,
            output,
            min_overlap_sec,
            max_gap_sec,
            min_words_interrupter,
            max_backchannel_duration_sec,
            verbose,
        } => {
            setup_logging(verbose);
            let config = InterruptionConfig {
                min_overlap_sec,
                max_gap_sec,
                min_words_interrupter,
                max_backchannel_duration_sec,
            };
            run_interruptions(input, output, config)
        }
        Commands::Turns {
            input,
            output,
            verbose,
        } => {
            setup_logging(verbose);
            run_turns(input, output)
        }
        Commands::Rate {
            input,
            output,
            window_size_sec,
            step_size_sec,
            verbose,
        } => {
            setup_logging(verbose);
            run_rate(
                input,
                output,
                RateConfig {
                    window_size_sec,
                    step_size_sec,
                },
            )
        }
        Commands::Windows {
            input,
            speaker,
            output,
            max_gap_sec,
            min_final_len_sec,
            max_window_len_sec,
            verbose,
        } => {
            setup_logging(verbose);
            let config = MergeConfig {
                max_gap_sec,
                min_final_len_sec,
                max_window_len_sec: max_window_len_sec.unwrap_or(f64::INFINITY),
                ..Default::default()
            };
            run_windows(input, speaker, output, config)
        }
        Commands::Arousal {
            input,
            output,
            threshold_k,
            features,
            verbose,
        } => {
            setup_logging(verbose);
            let config = match features {
                Some(names) => ArousalConfig::for_features(names, threshold_k),
                None => ArousalConfig {
                    threshold_k,
                    ..Default::default()
                },
            };
            run_arousal(input, output, config)
        }
        Commands::Stats { input, verbose } => {
            setup_logging(verbose);
            run_stats(input)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

fn run_reconcile(
    diarization: PathBuf,
    transcript: PathBuf,
    output: PathBuf,
    human_readable: Option<PathBuf>,
) -> Result<()> {
    info!("Loading diarization from {:?}", diarization);
    let turns = parse_diarization_file(&diarization).context("Failed to load diarization")?;

    info!("Loading transcript from {:?}", transcript);
    let words = parse_transcript_file(&transcript).context("Failed to load transcript")?;

    let result = reconcile(&turns, &words)?;

    write_json(&result, &output)?;
    info!("Reconciled timeline written to {:?}", output);

    if let Some(path) = human_readable {
        HumanTranscript::new(&result).write_file(&path)?;
        info!("Human-readable transcript written to {:?}", path);
    }

    Ok(())
}

fn run_interruptions(input: PathBuf, output: PathBuf, config: InterruptionConfig) -> Result<()> {
    let mut transcript = parse_reconciled_file(&input).context("Failed to load timeline")?;
    sort_segments(&mut transcript.segments);

    let report = detect_interruptions(&transcript.segments, &config)?;

    write_json(&report, &output)?;
    info!(
        "{} interruptions, {} backchannels written to {:?}",
        report.stats.total_interruptions, report.stats.total_backchannels, output
    );
    Ok(())
}

fn run_turns(input: PathBuf, output: PathBuf) -> Result<()> {
    let mut transcript = parse_reconciled_file(&input).context("Failed to load timeline")?;
    sort_segments(&mut transcript.segments);

    let stats = analyze_turns(&transcript.segments)?;

    write_json(&stats, &output)?;
    info!(
        "{} transitions, alternation rate {:.2} written to {:?}",
        stats.total_transitions, stats.alternation_rate, output
    );
    Ok(())
}

fn run_rate(input: PathBuf, output: PathBuf, config: RateConfig) -> Result<()> {
    let transcript = parse_reconciled_file(&input).context("Failed to load timeline")?;

    let timeseries = compute_rate(&transcript.segments, &config)?;

    write_json(&timeseries, &output)?;
    info!(
        "{} timeseries samples written to {:?}",
        timeseries.timeseries.len(),
        output
    );
    Ok(())
}

fn run_windows(input: PathBuf, speaker: String, output: PathBuf, config: MergeConfig) -> Result<()> {
    let transcript = parse_reconciled_file(&input).context("Failed to load timeline")?;

    if !transcript.speakers.contains(&speaker) {
        warn!(
            "Speaker {:?} not present in timeline (speakers: {:?})",
            speaker, transcript.speakers
        );
    }

    let windows = windows_for_speaker(&transcript.segments, &speaker, &config)?;
    let file = SpeechWindowsFile::new(&speaker, windows, &config);

    write_json(&file, &output)?;
    info!(
        "{} windows ({:.1}s total) written to {:?}",
        file.total_windows, file.total_duration, output
    );
    Ok(())
}

fn run_arousal(input: PathBuf, output: PathBuf, config: ArousalConfig) -> Result<()> {
    let rows = parse_features_file(&input).context("Failed to load feature table")?;

    let report = score_arousal(&rows, &config)?;

    write_json(&report, &output)?;
    let heated = report.rows.iter().filter(|r| r.is_heated).count();
    info!(
        "{} rows scored, {} heated, written to {:?}",
        report.rows.len(),
        heated,
        output
    );
    Ok(())
}

fn run_stats(input: PathBuf) -> Result<()> {
    let mut transcript = parse_reconciled_file(&input).context("Failed to load timeline")?;
    sort_segments(&mut transcript.segments);

    let speaker_stats = basic_speaker_stats(&transcript.segments)?;
    let turn_stats = analyze_turns(&transcript.segments)?;

    println!("Conversation Summary");
    println!("====================");
    println!("Segments: {}", transcript.segments.len());
    println!("Speakers: {:?}", transcript.speakers);
    println!();

    println!(
        "{:<20} {:>10} {:>8} {:>6} {:>9}",
        "Speaker", "Time(min)", "Words", "WPM", "Segments"
    );
    println!("{}", "-".repeat(58));
    for (speaker, stats) in &speaker_stats {
        println!(
            "{:<20} {:>10.1} {:>8} {:>6.0} {:>9}",
            speaker,
            stats.total_speaking_time_min,
            stats.total_words,
            stats.words_per_minute,
            stats.num_segments
        );
    }
    println!();

    println!("Turn-taking");
    println!("-----------");
    println!("Total transitions: {}", turn_stats.total_transitions);
    println!("Alternation rate: {:.1}%", turn_stats.alternation_rate * 100.0);
    for (speaker, runs) in &turn_stats.runs {
        println!(
            "{}: {} runs, avg {:.1} segments, longest {:.1}s",
            speaker, runs.num_runs, runs.avg_run_segments, runs.max_run_duration_sec
        );
    }

    Ok(())
}

/// Every analyzer expects segments sorted by start time; sorting once here
/// keeps the interruption and turn-taking views consistent.
fn sort_segments(segments: &mut [crosstalk::Segment]) {
    segments.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));
}
