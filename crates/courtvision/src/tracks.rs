//! Per-frame entity tracks and projection of raw detections onto the court.

use std::collections::BTreeMap;

use crate::geometry::{CameraPoint, CoordinateSpace, CourtPoint, CourtSpace, Point};
use crate::homography::CourtHomography;

/// Tracker-assigned entity id.
pub type EntityId = u32;

/// The two tracked players.
pub const PLAYER_IDS: [EntityId; 2] = [1, 2];

/// Id of the single ball in the ball track sequence.
pub const BALL_ID: EntityId = 1;

/// Axis-aligned detection box in camera pixels. Serializes as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn center(&self) -> CameraPoint {
        CameraPoint::new(0.5 * (self.x1 + self.x2), 0.5 * (self.y1 + self.y2))
    }

    /// Bottom-center of the box, where a standing player touches the ground.
    pub fn foot(&self) -> CameraPoint {
        CameraPoint::new(0.5 * (self.x1 + self.x2), self.y2)
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// Detector output for one frame: entity id → box. Absent ids were not seen.
pub type FrameDetections = BTreeMap<EntityId, BoundingBox>;

/// Positions of the entities visible in one frame.
///
/// Missing entities are absent from the map; there is no sentinel coordinate.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FrameTrack<S: CoordinateSpace> {
    positions: BTreeMap<EntityId, Point<S>>,
}

impl<S: CoordinateSpace> FrameTrack<S> {
    pub fn single(id: EntityId, p: Point<S>) -> Self {
        Self {
            positions: BTreeMap::from([(id, p)]),
        }
    }

    pub fn get(&self, id: EntityId) -> Option<Point<S>> {
        self.positions.get(&id).copied()
    }

    pub fn insert(&mut self, id: EntityId, p: Point<S>) {
        self.positions.insert(id, p);
    }

    /// Entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Point<S>)> + '_ {
        self.positions.iter().map(|(&id, &p)| (id, p))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<S: CoordinateSpace> FromIterator<(EntityId, Point<S>)> for FrameTrack<S> {
    fn from_iter<I: IntoIterator<Item = (EntityId, Point<S>)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

/// Canonical-space player and ball tracks, two parallel sequences indexed by frame.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct CourtTracks {
    players: Vec<FrameTrack<CourtSpace>>,
    ball: Vec<FrameTrack<CourtSpace>>,
}

impl CourtTracks {
    /// Pads the shorter sequence with empty frames so both have equal length.
    pub fn new(
        mut players: Vec<FrameTrack<CourtSpace>>,
        mut ball: Vec<FrameTrack<CourtSpace>>,
    ) -> Self {
        let n = players.len().max(ball.len());
        players.resize_with(n, FrameTrack::default);
        ball.resize_with(n, FrameTrack::default);
        Self { players, ball }
    }

    pub fn frame_count(&self) -> usize {
        self.players.len()
    }

    pub fn players_at(&self, frame: usize) -> Option<&FrameTrack<CourtSpace>> {
        self.players.get(frame)
    }

    pub fn player(&self, frame: usize, id: EntityId) -> Option<CourtPoint> {
        self.players.get(frame)?.get(id)
    }

    pub fn ball(&self, frame: usize) -> Option<CourtPoint> {
        self.ball.get(frame)?.get(BALL_ID)
    }

    pub fn player_frames(&self) -> &[FrameTrack<CourtSpace>] {
        &self.players
    }

    pub fn ball_frames(&self) -> &[FrameTrack<CourtSpace>] {
        &self.ball
    }
}

/// Map raw detections into canonical court space.
///
/// Players are anchored at their foot position, the ball at its box center.
/// Only [`BALL_ID`] is read from the ball detections.
pub fn project_detections(
    player_detections: &[FrameDetections],
    ball_detections: &[FrameDetections],
    homography: &CourtHomography,
) -> CourtTracks {
    let players: Vec<FrameTrack<CourtSpace>> = player_detections
        .iter()
        .map(|frame| {
            let ids: Vec<EntityId> = frame.keys().copied().collect();
            let feet: Vec<CameraPoint> = frame.values().map(BoundingBox::foot).collect();
            ids.into_iter().zip(homography.transform(&feet)).collect()
        })
        .collect();

    let ball: Vec<FrameTrack<CourtSpace>> = ball_detections
        .iter()
        .map(|frame| match frame.get(&BALL_ID) {
            Some(bbox) => FrameTrack::single(BALL_ID, homography.transform_point(bbox.center())),
            None => FrameTrack::default(),
        })
        .collect();

    let tracks = CourtTracks::new(players, ball);
    let n_ball = tracks.ball.iter().filter(|f| !f.is_empty()).count();
    tracing::info!(
        "Projected {} frames onto the court ({} with a ball position)",
        tracks.frame_count(),
        n_ball
    );
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra::Matrix3;

    #[test]
    fn anchors_follow_box_geometry() {
        let b = BoundingBox::new(100.0, 200.0, 140.0, 300.0);
        assert_eq!(b.center().to_array(), [120.0, 250.0]);
        assert_eq!(b.foot().to_array(), [120.0, 300.0]);
        assert_eq!(b.width(), 40.0);
        assert_eq!(b.height(), 100.0);
    }

    #[test]
    fn detections_parse_with_string_ids() {
        let raw = r#"[{"1": [10, 20, 30, 40], "2": [50, 60, 70, 80]}, {}]"#;
        let frames: Vec<FrameDetections> = serde_json::from_str(raw).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0][&2], BoundingBox::new(50.0, 60.0, 70.0, 80.0));
        assert!(frames[1].is_empty());
    }

    #[test]
    fn projection_keeps_ids_and_gaps() {
        // Pure scaling by 0.5 keeps the expected values obvious.
        let h = CourtHomography::from_matrix(Matrix3::new(
            0.5, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 1.0,
        ))
        .unwrap();

        let players = vec![
            FrameDetections::from([
                (1, BoundingBox::new(100.0, 100.0, 120.0, 200.0)),
                (2, BoundingBox::new(300.0, 50.0, 320.0, 90.0)),
            ]),
            FrameDetections::from([(2, BoundingBox::new(302.0, 52.0, 322.0, 92.0))]),
            FrameDetections::new(),
        ];
        let ball = vec![
            FrameDetections::from([(BALL_ID, BoundingBox::new(10.0, 10.0, 14.0, 14.0))]),
            FrameDetections::new(),
        ];

        let tracks = project_detections(&players, &ball, &h);
        assert_eq!(tracks.frame_count(), 3);
        assert_eq!(tracks.player(0, 1).unwrap().to_array(), [55.0, 100.0]);
        assert_eq!(tracks.player(0, 2).unwrap().to_array(), [155.0, 45.0]);
        assert_eq!(tracks.player(1, 1), None);
        assert_abs_diff_eq!(tracks.player(1, 2).unwrap().x, 156.0);
        assert!(tracks.players_at(2).unwrap().is_empty());

        assert_eq!(tracks.ball(0).unwrap().to_array(), [6.0, 6.0]);
        assert_eq!(tracks.ball(1), None);
        // Ball sequence is padded to the player sequence length.
        assert_eq!(tracks.ball_frames().len(), 3);
        assert_eq!(tracks.ball(2), None);
        assert_eq!(tracks.ball(99), None);
    }

    #[test]
    fn frame_track_iterates_in_id_order() {
        let track: FrameTrack<CourtSpace> = [
            (2, CourtPoint::new(1.0, 1.0)),
            (1, CourtPoint::new(0.0, 0.0)),
        ]
        .into_iter()
        .collect();
        let ids: Vec<EntityId> = track.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(track.len(), 2);
    }
}
