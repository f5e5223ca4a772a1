use std::collections::BTreeMap;

use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::models::{ArousalParameters, ArousalReport, ArousalRow, FeatureRow};

/// Scoring parameters for the arousal index.
#[derive(Debug, Clone)]
pub struct ArousalConfig {
    /// Per-feature polarity: +1.0 contributes positively to the index,
    /// -1.0 negatively. The keys define which features are scored.
    pub polarities: BTreeMap<String, f64>,
    /// A row is heated when its index is at least `threshold_k` standard
    /// deviations above the mean index
    pub threshold_k: f64,
}

impl ArousalConfig {
    /// Build a config scoring the given features, all with positive polarity
    /// except `pauses_ratio` which pulls the index down.
    pub fn for_features<I, S>(names: I, threshold_k: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let polarities = names
            .into_iter()
            .map(|n| {
                let name = n.into();
                let sign = if name == "pauses_ratio" { -1.0 } else { 1.0 };
                (name, sign)
            })
            .collect();
        Self {
            polarities,
            threshold_k,
        }
    }
}

impl Default for ArousalConfig {
    fn default() -> Self {
        Self::for_features(
            ["pitch_mean", "pitch_std", "rms_mean", "tempo_wpm", "pauses_ratio"],
            2.0,
        )
    }
}

/// Score feature rows with per-feature z-scores and a composite index.
///
/// For every configured feature the population mean and standard deviation
/// are computed across all rows; a zero standard deviation is degenerate
/// input and yields z = 0 on that feature for every row. The index is the
/// polarity-signed sum of z-scores, and a row is heated when its index
/// reaches `mean + threshold_k * std` of the index distribution. A row
/// missing a configured feature aborts the run.
pub fn score_arousal(rows: &[FeatureRow], config: &ArousalConfig) -> CoreResult<ArousalReport> {
    let parameters = ArousalParameters {
        threshold_k: config.threshold_k,
        polarities: config.polarities.clone(),
    };

    if rows.is_empty() {
        return Ok(ArousalReport {
            parameters,
            rows: vec![],
        });
    }

    for row in rows {
        for name in config.polarities.keys() {
            if !row.features.contains_key(name) {
                return Err(CoreError::MalformedInput(format!(
                    "row {} is missing feature {name}",
                    row.segment_id
                )));
            }
        }
    }

    info!(
        "Scoring {} rows over {} features (k={})",
        rows.len(),
        config.polarities.len(),
        config.threshold_k
    );

    // Population mean/std per feature
    let mut moments: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for name in config.polarities.keys() {
        let values: Vec<f64> = rows.iter().map(|r| r.features[name]).collect();
        moments.insert(name.as_str(), mean_std(&values));
    }

    let mut scored: Vec<ArousalRow> = rows
        .iter()
        .map(|row| {
            let mut z_scores = BTreeMap::new();
            let mut arousal_index = 0.0;
            for (name, sign) in &config.polarities {
                let (mean, std) = moments[name.as_str()];
                let z = if std > 0.0 {
                    (row.features[name] - mean) / std
                } else {
                    0.0
                };
                z_scores.insert(name.clone(), z);
                arousal_index += sign * z;
            }
            ArousalRow {
                segment_id: row.segment_id.clone(),
                features: row.features.clone(),
                z_scores,
                arousal_index,
                is_heated: false,
            }
        })
        .collect();

    let indices: Vec<f64> = scored.iter().map(|r| r.arousal_index).collect();
    let (index_mean, index_std) = mean_std(&indices);
    let threshold = index_mean + config.threshold_k * index_std;
    for row in &mut scored {
        row.is_heated = row.arousal_index >= threshold;
    }

    let heated = scored.iter().filter(|r| r.is_heated).count();
    info!("{} of {} rows flagged heated", heated, scored.len());

    Ok(ArousalReport {
        parameters,
        rows: scored,
    })
}

/// Population mean and standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, pairs: &[(&str, f64)]) -> FeatureRow {
        FeatureRow {
            segment_id: id.to_string(),
            features: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    fn config(names: &[&str], k: f64) -> ArousalConfig {
        ArousalConfig::for_features(names.iter().copied(), k)
    }

    #[test]
    fn test_z_scores_and_index() {
        let rows = vec![
            row("a", &[("pitch_mean", 100.0)]),
            row("b", &[("pitch_mean", 200.0)]),
        ];

        let report = score_arousal(&rows, &config(&["pitch_mean"], 2.0)).unwrap();

        // mean 150, population std 50: z = -1 and +1
        assert!((report.rows[0].z_scores["pitch_mean"] + 1.0).abs() < 1e-9);
        assert!((report.rows[1].z_scores["pitch_mean"] - 1.0).abs() < 1e-9);
        assert!((report.rows[0].arousal_index + 1.0).abs() < 1e-9);
        assert!((report.rows[1].arousal_index - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_feature_contributes_zero() {
        let rows = vec![
            row("a", &[("pitch_mean", 100.0), ("rms_mean", 0.5)]),
            row("b", &[("pitch_mean", 200.0), ("rms_mean", 0.5)]),
        ];

        let report = score_arousal(&rows, &config(&["pitch_mean", "rms_mean"], 2.0)).unwrap();

        for r in &report.rows {
            assert!((r.z_scores["rms_mean"]).abs() < 1e-9);
        }
        // Index identical to pitch-only scoring: the flat column drops out
        assert!((report.rows[0].arousal_index + 1.0).abs() < 1e-9);
        assert!((report.rows[1].arousal_index - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_polarity_inverts_contribution() {
        let rows = vec![
            row("a", &[("pauses_ratio", 0.1)]),
            row("b", &[("pauses_ratio", 0.5)]),
        ];

        let report = score_arousal(&rows, &config(&["pauses_ratio"], 2.0)).unwrap();

        // More pausing means a lower index
        assert!(report.rows[0].arousal_index > report.rows[1].arousal_index);
        assert!((report.rows[0].arousal_index - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_heated_threshold() {
        // One outlier among flat rows should be the only heated one at k=1.5
        let mut rows: Vec<FeatureRow> = (0..9)
            .map(|i| row(&format!("r{i}"), &[("rms_mean", 1.0 + 0.01 * i as f64)]))
            .collect();
        rows.push(row("spike", &[("rms_mean", 10.0)]));

        let report = score_arousal(&rows, &config(&["rms_mean"], 1.5)).unwrap();

        let heated: Vec<&str> = report
            .rows
            .iter()
            .filter(|r| r.is_heated)
            .map(|r| r.segment_id.as_str())
            .collect();
        assert_eq!(heated, vec!["spike"]);
    }

    #[test]
    fn test_missing_feature_is_malformed() {
        let rows = vec![
            row("a", &[("pitch_mean", 100.0)]),
            row("b", &[("rms_mean", 0.5)]),
        ];

        assert!(score_arousal(&rows, &config(&["pitch_mean"], 2.0)).is_err());
    }

    #[test]
    fn test_empty_rows() {
        let report = score_arousal(&[], &ArousalConfig::default()).unwrap();
        assert!(report.rows.is_empty());
    }
}
