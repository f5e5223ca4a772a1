use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One row of the externally produced acoustic feature table.
///
/// Feature extraction itself is an upstream collaborator; this crate only
/// sees the resulting values keyed by segment id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    pub segment_id: String,
    /// Raw feature values by feature name
    #[serde(flatten)]
    pub features: BTreeMap<String, f64>,
}

/// A feature row after arousal scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArousalRow {
    pub segment_id: String,
    #[serde(flatten)]
    pub features: BTreeMap<String, f64>,
    /// Per-feature z-scores (0.0 on zero-variance features)
    pub z_scores: BTreeMap<String, f64>,
    /// Signed sum of z-scores per the polarity configuration
    pub arousal_index: f64,
    /// Whether arousal_index >= mean + threshold_k * std over all rows
    pub is_heated: bool,
}

/// Scoring parameters echoed into the output artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArousalParameters {
    pub threshold_k: f64,
    /// +1.0 or -1.0 per feature; features contributing negatively (e.g.
    /// pauses_ratio) pull the index down
    pub polarities: BTreeMap<String, f64>,
}

/// Full output of one arousal-scoring pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArousalReport {
    pub parameters: ArousalParameters,
    pub rows: Vec<ArousalRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_row_flattens() {
        let json = r#"{"segment_id": "seg_0001", "pitch_mean": 182.4, "rms_mean": 0.03}"#;
        let row: FeatureRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.segment_id, "seg_0001");
        assert_eq!(row.features.len(), 2);
        assert!((row.features["pitch_mean"] - 182.4).abs() < 1e-9);
    }
}
