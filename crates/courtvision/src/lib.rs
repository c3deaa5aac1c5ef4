//! courtvision — perspective-normalized tennis rally analytics.
//!
//! Takes upstream detector output for one broadcast video (court keypoints,
//! player and ball boxes, shot frames) and produces top-down court positions
//! plus per-player shot and movement speeds. The pipeline stages are:
//!
//! 1. **Court** – canonical mini-court keypoints and lines derived from real
//!    court dimensions and a drawing region.
//! 2. **Homography** – camera → court mapping from the detected keypoints
//!    (exact 4-corner DLT, or RANSAC over all 14 keypoints).
//! 3. **Tracks** – detections projected onto the court (players at their feet,
//!    the ball at its box center).
//! 4. **Analytics** – shot attribution, speeds in km/h, cumulative snapshots
//!    and a forward-filled per-frame table.
//!
//! # Public API
//! - [`RallyAnalyzer`] with [`RallyInput`] / [`RallyReport`] as primary entry point
//! - [`AnalysisConfig`] for tuning
//! - the individual stages for callers that already hold intermediate data
//!
//! The library does no I/O beyond optional JSON loading helpers and is
//! single-threaded; every constructed type is immutable and `Send + Sync`.

mod analytics;
mod api;
mod config;
mod court;
mod geometry;
mod homography;
mod tracks;
mod units;

#[cfg(test)]
mod test_utils;

pub use analytics::{
    analyze_segments, compute_shot_statistics, fold_snapshots, nearest_player, opponent_of,
    shot_segments, AnalyticsError, DataGap, FrameStats, PlayerFrameStats, PlayerStats,
    SegmentAnalysis, ShotRecord, ShotSegment, StatsSnapshot, StatsTable, AVERAGE_EPSILON,
};
pub use api::{AnalysisError, RallyAnalyzer, RallyInput, RallyReport, SkippedSegment};
pub use config::AnalysisConfig;
pub use court::{
    derive_keypoints, derive_line_segments, CourtDimensions, CourtKeypoint, CourtKeypoints,
    CourtLayout, CourtLines, MiniCourtCanvas, MiniCourtConfig, N_KEYPOINTS,
};
pub use geometry::{CameraPoint, CameraSpace, CoordinateSpace, CourtPoint, CourtSpace, Point};
pub use homography::{
    estimate_homography_dlt, fit_homography_ransac, CourtHomography, DetectedKeypoints,
    HomographyConfig, HomographyError, HomographyMode, RansacHomographyConfig,
    RansacHomographyResult, MIN_HOMOGENEOUS_W,
};
pub use tracks::{
    project_detections, BoundingBox, CourtTracks, EntityId, FrameDetections, FrameTrack, BALL_ID,
    PLAYER_IDS,
};
pub use units::{
    measure_distance, meters_to_pixels, pixels_to_meters, speed_kmh, PixelScale, MPS_TO_KMH,
};
