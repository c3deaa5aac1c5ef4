//! Dense per-frame statistics table.

use serde::{Deserialize, Serialize};

use crate::tracks::{EntityId, PLAYER_IDS};

use super::snapshot::{PlayerStats, StatsSnapshot};

/// One player's live statistics at a given frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerFrameStats {
    #[serde(flatten)]
    pub stats: PlayerStats,
    pub avg_shot_speed_kmh: f64,
    pub avg_movement_speed_kmh: f64,
}

impl From<PlayerStats> for PlayerFrameStats {
    fn from(stats: PlayerStats) -> Self {
        Self {
            stats,
            avg_shot_speed_kmh: stats.avg_shot_speed_kmh(),
            avg_movement_speed_kmh: stats.avg_movement_speed_kmh(),
        }
    }
}

/// Statistics row for one video frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub frame: usize,
    pub players: [PlayerFrameStats; 2],
}

impl FrameStats {
    fn from_snapshot(frame: usize, snapshot: &StatsSnapshot) -> Self {
        Self {
            frame,
            players: snapshot.players.map(PlayerFrameStats::from),
        }
    }

    pub fn player(&self, id: EntityId) -> Option<&PlayerFrameStats> {
        PLAYER_IDS
            .iter()
            .position(|&p| p == id)
            .map(|i| &self.players[i])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsTable {
    rows: Vec<FrameStats>,
}

impl StatsTable {
    /// Expand sparse snapshots into one row per frame in `0..frame_count`.
    ///
    /// Each frame takes the latest snapshot at or before it; frames before
    /// the first snapshot are all-zero. `snapshots` must be ordered by frame,
    /// as produced by [`super::fold_snapshots`]. Snapshots at or beyond
    /// `frame_count` never apply.
    pub fn forward_fill(snapshots: &[StatsSnapshot], frame_count: usize) -> Self {
        let zero = StatsSnapshot::zero(0);
        let mut current = &zero;
        let mut pending = snapshots.iter().peekable();

        let rows = (0..frame_count)
            .map(|frame| {
                while let Some(next) = pending.next_if(|s| s.frame <= frame) {
                    current = next;
                }
                FrameStats::from_snapshot(frame, current)
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[FrameStats] {
        &self.rows
    }

    pub fn get(&self, frame: usize) -> Option<&FrameStats> {
        self.rows.get(frame)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
