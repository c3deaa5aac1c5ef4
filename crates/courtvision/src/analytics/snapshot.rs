//! Cumulative per-player statistics as a fold over shot records.

use crate::tracks::{CourtTracks, EntityId, PLAYER_IDS};

use super::segment::{analyze_segments, ShotRecord};
use super::AnalyticsError;

/// Added to every average denominator so a zero count yields 0 instead of NaN.
pub const AVERAGE_EPSILON: f64 = 1e-6;

/// Cumulative counters for one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayerStats {
    pub shot_count: u32,
    pub total_shot_speed_kmh: f64,
    pub last_shot_speed_kmh: f64,
    /// Segments in which this player was the opponent. Informational only:
    /// the movement average divides by `shot_count`.
    pub movement_count: u32,
    pub total_movement_speed_kmh: f64,
    pub last_movement_speed_kmh: f64,
}

impl PlayerStats {
    pub fn avg_shot_speed_kmh(&self) -> f64 {
        self.total_shot_speed_kmh / (f64::from(self.shot_count) + AVERAGE_EPSILON)
    }

    /// Total movement speed over the player's own shot count.
    pub fn avg_movement_speed_kmh(&self) -> f64 {
        self.total_movement_speed_kmh / (f64::from(self.shot_count) + AVERAGE_EPSILON)
    }

    fn record_shot(mut self, speed_kmh: f64) -> Self {
        self.shot_count += 1;
        self.total_shot_speed_kmh += speed_kmh;
        self.last_shot_speed_kmh = speed_kmh;
        self
    }

    fn record_movement(mut self, speed_kmh: f64) -> Self {
        self.movement_count += 1;
        self.total_movement_speed_kmh += speed_kmh;
        self.last_movement_speed_kmh = speed_kmh;
        self
    }

    /// True when no counter of `self` is below the one in `prev`.
    pub fn dominates(&self, prev: &PlayerStats) -> bool {
        self.shot_count >= prev.shot_count
            && self.movement_count >= prev.movement_count
            && self.total_shot_speed_kmh >= prev.total_shot_speed_kmh
            && self.total_movement_speed_kmh >= prev.total_movement_speed_kmh
    }
}

/// Statistics of both players, valid from `frame` onwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StatsSnapshot {
    pub frame: usize,
    /// Indexed by player: slot 0 is player 1, slot 1 is player 2.
    pub players: [PlayerStats; 2],
}

fn slot(id: EntityId) -> Option<usize> {
    PLAYER_IDS.iter().position(|&p| p == id)
}

impl StatsSnapshot {
    /// All-zero statistics at `frame`.
    pub fn zero(frame: usize) -> Self {
        Self {
            frame,
            players: [PlayerStats::default(); 2],
        }
    }

    pub fn player(&self, id: EntityId) -> Option<&PlayerStats> {
        slot(id).map(|i| &self.players[i])
    }

    /// Successor snapshot: a copy of `self` with `record` applied, stamped
    /// with the record's start frame.
    pub fn apply(&self, record: &ShotRecord) -> Self {
        let mut next = *self;
        next.frame = record.start_frame;
        if let Some(i) = slot(record.shooter) {
            next.players[i] = next.players[i].record_shot(record.ball_speed_kmh);
        }
        if let Some(i) = slot(record.opponent) {
            next.players[i] = next.players[i].record_movement(record.opponent_speed_kmh);
        }
        next
    }
}

/// One snapshot per record, each building on the previous one.
pub fn fold_snapshots(records: &[ShotRecord]) -> Vec<StatsSnapshot> {
    records
        .iter()
        .scan(StatsSnapshot::zero(0), |prev, record| {
            *prev = prev.apply(record);
            Some(*prev)
        })
        .collect()
}

/// Analyse the segments between consecutive `shot_frames` and fold them into
/// cumulative snapshots.
///
/// `court_width_px` is the canonical width of the doubles court and
/// `real_court_width_m` its real-world width; together they fix the
/// pixel-to-meter scale for the whole run.
pub fn compute_shot_statistics(
    tracks: &CourtTracks,
    shot_frames: &[usize],
    fps: f64,
    court_width_px: f64,
    real_court_width_m: f64,
) -> Result<Vec<StatsSnapshot>, AnalyticsError> {
    let analysis = analyze_segments(
        tracks,
        shot_frames,
        fps,
        court_width_px,
        real_court_width_m,
    )?;
    let snapshots = fold_snapshots(&analysis.records);
    tracing::info!(
        "Shot statistics: {} segments analysed, {} skipped for missing data",
        analysis.records.len(),
        analysis.gaps.len()
    );
    Ok(snapshots)
}
