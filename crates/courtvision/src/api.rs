//! High-level rally analysis API.
//!
//! [`RallyAnalyzer`] is the primary entry point. It wraps an
//! [`AnalysisConfig`] and turns one [`RallyInput`] (keypoints, detections and
//! shot frames of a single video) into a [`RallyReport`].

use std::path::Path;

use crate::analytics::{
    analyze_segments, fold_snapshots, AnalyticsError, DataGap, ShotRecord, StatsSnapshot,
    StatsTable,
};
use crate::config::AnalysisConfig;
use crate::court::{CourtKeypoints, MiniCourtCanvas};
use crate::geometry::CourtPoint;
use crate::homography::{CourtHomography, DetectedKeypoints, HomographyError};
use crate::tracks::{project_detections, CourtTracks, FrameDetections};

// ── Input / output ─────────────────────────────────────────────────────────

/// Everything upstream detectors produce for one rally video.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RallyInput {
    pub fps: f64,
    /// Width of the video frame in pixels; positions the mini court.
    pub frame_width: f64,
    /// Length of the per-frame statistics table. Defaults to the track length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_count: Option<usize>,
    /// 28 scalars: `x, y` for each of the 14 court keypoints in camera pixels.
    pub court_keypoints: Vec<f64>,
    #[serde(default)]
    pub player_detections: Vec<FrameDetections>,
    #[serde(default)]
    pub ball_detections: Vec<FrameDetections>,
    #[serde(default)]
    pub shot_frames: Vec<usize>,
}

impl RallyInput {
    /// Load an input bundle from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// A shot segment that produced no statistics update.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SkippedSegment {
    pub start_frame: usize,
    pub end_frame: usize,
    #[serde(flatten)]
    pub reason: DataGap,
}

/// Full analysis output for one rally.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RallyReport {
    /// Camera → court homography, row-major.
    pub homography: [[f64; 3]; 3],
    /// Mini-court background box `[top_left, bottom_right]`.
    pub canvas_bounds: [CourtPoint; 2],
    pub court_keypoints: CourtKeypoints,
    /// Court lines as keypoint index pairs.
    pub court_lines: [[usize; 2]; 8],
    pub tracks: CourtTracks,
    pub shots: Vec<ShotRecord>,
    pub skipped_segments: Vec<SkippedSegment>,
    pub snapshots: Vec<StatsSnapshot>,
    pub frame_stats: StatsTable,
}

// ── Error type ─────────────────────────────────────────────────────────────

/// Fatal failure of a rally analysis run.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Configuration or input values are unusable.
    Config(String),
    Homography(HomographyError),
    Analytics(AnalyticsError),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "invalid configuration: {}", msg),
            Self::Homography(e) => write!(f, "court homography failed: {}", e),
            Self::Analytics(e) => write!(f, "rally analytics failed: {}", e),
        }
    }
}

impl std::error::Error for AnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(_) => None,
            Self::Homography(e) => Some(e),
            Self::Analytics(e) => Some(e),
        }
    }
}

impl From<HomographyError> for AnalysisError {
    fn from(e: HomographyError) -> Self {
        Self::Homography(e)
    }
}

impl From<AnalyticsError> for AnalysisError {
    fn from(e: AnalyticsError) -> Self {
        Self::Analytics(e)
    }
}

// ── Analyzer ───────────────────────────────────────────────────────────────

/// Primary analysis interface.
///
/// Create once, analyze many rallies.
///
/// # Examples
///
/// ```no_run
/// use courtvision::{RallyAnalyzer, RallyInput};
/// use std::path::Path;
///
/// let input = RallyInput::from_json_file(Path::new("demos/rally.json")).unwrap();
/// let report = RallyAnalyzer::default().analyze(&input).unwrap();
/// println!("{} shots analysed", report.shots.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RallyAnalyzer {
    config: AnalysisConfig,
}

impl RallyAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Load configuration JSON and create an analyzer in one step.
    pub fn from_config_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(AnalysisConfig::from_json_file(path)?))
    }

    /// Access the current configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut AnalysisConfig {
        &mut self.config
    }

    /// Mini-court placement for a frame of the given width.
    pub fn canvas_for(&self, frame_width: f64) -> MiniCourtCanvas {
        MiniCourtCanvas::for_frame(frame_width, &self.config.canvas, &self.config.court)
    }

    /// Run the full pipeline on one rally.
    ///
    /// Geometry and parameter failures are fatal. Shot segments with missing
    /// ball or player data are skipped and listed in
    /// [`RallyReport::skipped_segments`].
    pub fn analyze(&self, input: &RallyInput) -> Result<RallyReport, AnalysisError> {
        self.config.validate().map_err(AnalysisError::Config)?;
        if !input.frame_width.is_finite() || input.frame_width <= 0.0 {
            return Err(AnalysisError::Config(format!(
                "frame_width must be finite and > 0 (got {})",
                input.frame_width
            )));
        }

        let canvas = self.canvas_for(input.frame_width);
        let layout = canvas.layout();

        let detected = DetectedKeypoints::from_flat(&input.court_keypoints)?;
        let homography =
            CourtHomography::from_detected_keypoints(&detected, layout, &self.config.homography)?;

        let tracks = project_detections(
            &input.player_detections,
            &input.ball_detections,
            &homography,
        );

        let analysis = analyze_segments(
            &tracks,
            &input.shot_frames,
            input.fps,
            layout.court_width_px(),
            self.config.court.double_line_width,
        )?;
        let snapshots = fold_snapshots(&analysis.records);
        let frame_count = input.frame_count.unwrap_or_else(|| tracks.frame_count());
        let frame_stats = StatsTable::forward_fill(&snapshots, frame_count);

        tracing::info!(
            "Rally analysed: {} frames, {} shots, {} segments skipped",
            frame_count,
            analysis.records.len(),
            analysis.gaps.len()
        );

        let (top_left, bottom_right) = canvas.bounds();
        Ok(RallyReport {
            homography: homography.to_array(),
            canvas_bounds: [top_left, bottom_right],
            court_keypoints: layout.keypoints().clone(),
            court_lines: layout.lines().index_pairs(),
            tracks,
            shots: analysis.records,
            skipped_segments: analysis
                .gaps
                .into_iter()
                .map(|(seg, reason)| SkippedSegment {
                    start_frame: seg.start,
                    end_frame: seg.end,
                    reason,
                })
                .collect(),
            snapshots,
            frame_stats,
        })
    }
}
