//! Per-segment shot analysis: attribution, ball speed and opponent speed.

use crate::geometry::{CourtPoint, CourtSpace};
use crate::tracks::{CourtTracks, EntityId, FrameTrack, PLAYER_IDS};
use crate::units::{speed_kmh, PixelScale};

use super::AnalyticsError;

/// Interval between two consecutive shot events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShotSegment {
    pub start: usize,
    pub end: usize,
}

/// Pair up consecutive shot frames. Frames must be strictly increasing.
pub fn shot_segments(shot_frames: &[usize]) -> Result<Vec<ShotSegment>, AnalyticsError> {
    shot_frames
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            if w[1] <= w[0] {
                Err(AnalyticsError::UnorderedShotFrames {
                    index: i + 1,
                    previous: w[0],
                    current: w[1],
                })
            } else {
                Ok(ShotSegment {
                    start: w[0],
                    end: w[1],
                })
            }
        })
        .collect()
}

/// Outcome of one successfully analysed segment.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ShotRecord {
    pub start_frame: usize,
    pub end_frame: usize,
    /// Player judged to have hit the ball at `start_frame`.
    pub shooter: EntityId,
    pub opponent: EntityId,
    pub elapsed_s: f64,
    pub ball_speed_kmh: f64,
    /// Average speed of the opponent over the segment.
    pub opponent_speed_kmh: f64,
}

/// Why a segment produced no statistics update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataGap {
    MissingBall { frame: usize },
    NoPlayers { frame: usize },
    MissingOpponent { player: EntityId, frame: usize },
}

impl std::fmt::Display for DataGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBall { frame } => write!(f, "no ball position at frame {}", frame),
            Self::NoPlayers { frame } => write!(f, "no player positions at frame {}", frame),
            Self::MissingOpponent { player, frame } => {
                write!(f, "no position for player {} at frame {}", player, frame)
            }
        }
    }
}

/// Result of analysing every segment of a rally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentAnalysis {
    pub records: Vec<ShotRecord>,
    /// Skipped segments and the reason for each.
    pub gaps: Vec<(ShotSegment, DataGap)>,
}

/// Constant per-run conversion from frames and canonical pixels to km/h.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpeedContext {
    fps: f64,
    scale: PixelScale,
}

impl SpeedContext {
    pub(crate) fn new(
        fps: f64,
        court_width_px: f64,
        real_court_width_m: f64,
    ) -> Result<Self, AnalyticsError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(AnalyticsError::InvalidFrameRate { fps });
        }
        let scale = PixelScale::from_reference(real_court_width_m, court_width_px).ok_or(
            AnalyticsError::InvalidCourtScale {
                court_width_px,
                real_court_width_m,
            },
        )?;
        Ok(Self { fps, scale })
    }

    fn elapsed_s(&self, seg: ShotSegment) -> f64 {
        (seg.end - seg.start) as f64 / self.fps
    }

    fn speed_kmh(&self, from: CourtPoint, to: CourtPoint, elapsed_s: f64) -> f64 {
        speed_kmh(self.scale.to_meters(from.distance_to(&to)), elapsed_s)
    }
}

/// The tracked player closest to `ball`.
///
/// Only [`PLAYER_IDS`] are considered. Scanning in ascending id order with a
/// strict comparison makes exact ties resolve to the lower id.
pub fn nearest_player(players: &FrameTrack<CourtSpace>, ball: CourtPoint) -> Option<EntityId> {
    let mut best: Option<(EntityId, f64)> = None;
    for id in PLAYER_IDS {
        let Some(p) = players.get(id) else {
            continue;
        };
        let d = p.distance_to(&ball);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((id, d));
        }
    }
    best.map(|(id, _)| id)
}

/// The other player of the pair.
pub fn opponent_of(player: EntityId) -> EntityId {
    if player == PLAYER_IDS[0] {
        PLAYER_IDS[1]
    } else {
        PLAYER_IDS[0]
    }
}

pub(crate) fn analyze_segment(
    tracks: &CourtTracks,
    seg: ShotSegment,
    ctx: &SpeedContext,
) -> Result<ShotRecord, DataGap> {
    let ball_start = tracks
        .ball(seg.start)
        .ok_or(DataGap::MissingBall { frame: seg.start })?;
    let ball_end = tracks
        .ball(seg.end)
        .ok_or(DataGap::MissingBall { frame: seg.end })?;
    let elapsed_s = ctx.elapsed_s(seg);
    let ball_speed_kmh = ctx.speed_kmh(ball_start, ball_end, elapsed_s);

    let shooter = tracks
        .players_at(seg.start)
        .and_then(|players| nearest_player(players, ball_start))
        .ok_or(DataGap::NoPlayers { frame: seg.start })?;
    let opponent = opponent_of(shooter);

    let opp_start = tracks.player(seg.start, opponent).ok_or(DataGap::MissingOpponent {
        player: opponent,
        frame: seg.start,
    })?;
    let opp_end = tracks.player(seg.end, opponent).ok_or(DataGap::MissingOpponent {
        player: opponent,
        frame: seg.end,
    })?;

    Ok(ShotRecord {
        start_frame: seg.start,
        end_frame: seg.end,
        shooter,
        opponent,
        elapsed_s,
        ball_speed_kmh,
        opponent_speed_kmh: ctx.speed_kmh(opp_start, opp_end, elapsed_s),
    })
}

/// Analyse every consecutive pair of shot frames.
///
/// Segments with missing ball or player data are skipped and reported in
/// [`SegmentAnalysis::gaps`]; they are not errors.
pub fn analyze_segments(
    tracks: &CourtTracks,
    shot_frames: &[usize],
    fps: f64,
    court_width_px: f64,
    real_court_width_m: f64,
) -> Result<SegmentAnalysis, AnalyticsError> {
    let ctx = SpeedContext::new(fps, court_width_px, real_court_width_m)?;
    let segments = shot_segments(shot_frames)?;

    let mut analysis = SegmentAnalysis::default();
    for seg in segments {
        match analyze_segment(tracks, seg, &ctx) {
            Ok(record) => analysis.records.push(record),
            Err(gap) => {
                tracing::debug!(
                    "skipping shot segment {}..{}: {}",
                    seg.start,
                    seg.end,
                    gap
                );
                analysis.gaps.push((seg, gap));
            }
        }
    }
    Ok(analysis)
}
