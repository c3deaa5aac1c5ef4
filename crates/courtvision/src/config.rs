//! Top-level analysis configuration, loadable from partial JSON.

use std::path::Path;

use crate::court::{CourtDimensions, MiniCourtConfig};
use crate::homography::{HomographyConfig, HomographyMode};

/// Every tunable of a rally analysis run.
///
/// Missing JSON fields fall back to their defaults, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Real-world court dimensions in meters.
    pub court: CourtDimensions,
    /// Placement of the mini court in the output frame.
    pub canvas: MiniCourtConfig,
    pub homography: HomographyConfig,
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.court.validate()?;
        self.canvas.validate()?;

        if self.homography.mode == HomographyMode::AllKeypoints {
            let ransac = &self.homography.ransac;
            if ransac.max_iters == 0 {
                return Err("homography.ransac.max_iters must be > 0".into());
            }
            if !ransac.inlier_threshold.is_finite() || ransac.inlier_threshold <= 0.0 {
                return Err(format!(
                    "homography.ransac.inlier_threshold must be finite and > 0, got {}",
                    ransac.inlier_threshold
                ));
            }
            if ransac.min_inliers < 4 {
                return Err(format!(
                    "homography.ransac.min_inliers must be >= 4, got {}",
                    ransac.min_inliers
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.court.double_line_width, 10.97);
        assert_eq!(config.canvas.rect_width, 250.0);
    }

    #[test]
    fn partial_json_overrides_selected_fields() {
        let raw = r#"{
            "canvas": { "buffer": 30 },
            "homography": { "mode": "all_keypoints", "ransac": { "inlier_threshold": 2.5 } }
        }"#;
        let config: AnalysisConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.canvas.buffer, 30.0);
        assert_eq!(config.canvas.padding, 20.0);
        assert_eq!(config.homography.mode, HomographyMode::AllKeypoints);
        assert_eq!(config.homography.ransac.inlier_threshold, 2.5);
        assert_eq!(config.homography.ransac.max_iters, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let mut config = AnalysisConfig::default();
        config.homography.mode = HomographyMode::AllKeypoints;
        config.court.player_1_height = 1.8;
        let json = serde_json::to_string(&config).unwrap();
        let back: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<AnalysisConfig>(r#"{ "cort": {} }"#).is_err());
    }

    #[test]
    fn validate_checks_ransac_only_when_used() {
        let mut config = AnalysisConfig::default();
        config.homography.ransac.min_inliers = 2;
        assert!(config.validate().is_ok());
        config.homography.mode = HomographyMode::AllKeypoints;
        let err = config.validate().unwrap_err();
        assert!(err.contains("min_inliers"), "{err}");
    }

    #[test]
    fn from_json_file_reports_invalid_dimensions() {
        let path = std::env::temp_dir().join(format!(
            "courtvision_config_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "court": { "double_line_width": -1.0 } }"#).unwrap();
        let err = AnalysisConfig::from_json_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("double_line_width"), "{err}");
    }
}
