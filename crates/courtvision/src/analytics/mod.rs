//! Rally statistics: shot attribution, speeds, cumulative snapshots and the
//! dense per-frame table.
//!
//! The pipeline is three pure stages:
//!
//! 1. [`analyze_segments`] turns consecutive shot frames into [`ShotRecord`]s,
//!    skipping segments with missing track data.
//! 2. [`fold_snapshots`] folds the records into immutable cumulative
//!    [`StatsSnapshot`]s, one per record.
//! 3. [`StatsTable::forward_fill`] expands the sparse snapshots into one
//!    [`FrameStats`] row per video frame.
//!
//! [`compute_shot_statistics`] runs stages 1 and 2.

mod segment;
mod snapshot;
mod table;

pub use segment::{
    analyze_segments, nearest_player, opponent_of, shot_segments, DataGap, SegmentAnalysis,
    ShotRecord, ShotSegment,
};
pub use snapshot::{
    compute_shot_statistics, fold_snapshots, PlayerStats, StatsSnapshot, AVERAGE_EPSILON,
};
pub use table::{FrameStats, PlayerFrameStats, StatsTable};

// ── Error type ─────────────────────────────────────────────────────────────

/// Fatal analytics failures. Missing track data is not an error; see [`DataGap`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Frame rate is zero, negative or not finite.
    InvalidFrameRate { fps: f64 },
    /// Pixel-to-meter reference is unusable.
    InvalidCourtScale {
        court_width_px: f64,
        real_court_width_m: f64,
    },
    /// Shot frames are not strictly increasing.
    UnorderedShotFrames {
        index: usize,
        previous: usize,
        current: usize,
    },
}

impl std::fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFrameRate { fps } => {
                write!(f, "invalid frame rate {} (must be finite and > 0)", fps)
            }
            Self::InvalidCourtScale {
                court_width_px,
                real_court_width_m,
            } => write!(
                f,
                "invalid court scale: {} px for {} m (both must be finite and > 0)",
                court_width_px, real_court_width_m
            ),
            Self::UnorderedShotFrames {
                index,
                previous,
                current,
            } => write!(
                f,
                "shot frames must be strictly increasing: shot_frames[{}] = {} follows {}",
                index, current, previous
            ),
        }
    }
}

impl std::error::Error for AnalyticsError {}
