//! Shared fixtures for unit tests: a plausible broadcast camera and synthetic tracks.

use nalgebra::Matrix3;

use crate::court::{CourtKeypoint, CourtLayout, N_KEYPOINTS};
use crate::geometry::{CameraPoint, CourtPoint};
use crate::homography::{CourtHomography, DetectedKeypoints};
use crate::tracks::{CourtTracks, EntityId, FrameTrack};

/// Scale + translate + mild perspective, roughly a court seen from behind a baseline.
pub(crate) fn broadcast_camera_homography() -> Matrix3<f64> {
    Matrix3::new(3.5, 0.1, 640.0, -0.05, 3.3, 480.0, 0.0001, -0.00005, 1.0)
}

pub(crate) fn project_exact(h: &Matrix3<f64>, xy: [f64; 2]) -> [f64; 2] {
    let p = h * nalgebra::Vector3::new(xy[0], xy[1], 1.0);
    [p[0] / p[2], p[1] / p[2]]
}

/// Camera → court homography for a trapezoidal court image in a 1920x1080 frame.
pub(crate) fn broadcast_court_homography(layout: &CourtLayout) -> CourtHomography {
    let camera = [
        CameraPoint::new(575.0, 305.0),
        CameraPoint::new(1335.0, 300.0),
        CameraPoint::new(1580.0, 860.0),
        CameraPoint::new(330.0, 865.0),
    ];
    CourtHomography::from_corners(&camera, &layout.corner_quad())
        .expect("fixture corners are a valid quad")
}

/// Keypoints a perfect detector would report for `layout` under `truth`.
pub(crate) fn camera_keypoints_for(
    layout: &CourtLayout,
    truth: &CourtHomography,
) -> DetectedKeypoints {
    let points: [CameraPoint; N_KEYPOINTS] = std::array::from_fn(|i| {
        truth
            .to_camera(layout.keypoint(CourtKeypoint::ALL[i]))
            .expect("court keypoints are in front of the camera")
    });
    DetectedKeypoints::new(points)
}

/// Build canonical tracks from per-frame `(id, [x, y])` player lists and
/// optional ball positions.
pub(crate) fn court_tracks(
    players: &[Vec<(EntityId, [f64; 2])>],
    ball: &[Option<[f64; 2]>],
) -> CourtTracks {
    let players = players
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|&(id, xy)| (id, CourtPoint::from_array(xy)))
                .collect::<FrameTrack<_>>()
        })
        .collect();
    let ball = ball
        .iter()
        .map(|xy| match xy {
            Some(xy) => FrameTrack::single(crate::tracks::BALL_ID, CourtPoint::from_array(*xy)),
            None => FrameTrack::default(),
        })
        .collect();
    CourtTracks::new(players, ball)
}
