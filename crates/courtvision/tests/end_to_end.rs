use approx::assert_abs_diff_eq;

use courtvision::{
    compute_shot_statistics, BoundingBox, CameraPoint, CourtHomography, CourtKeypoint,
    CourtPoint, CourtTracks, FrameDetections, FrameTrack, HomographyMode, RallyAnalyzer,
    RallyInput, StatsTable, BALL_ID, N_KEYPOINTS,
};

const FRAME_WIDTH: f64 = 1920.0;
const FPS: f64 = 30.0;

fn camera_truth(analyzer: &RallyAnalyzer) -> CourtHomography {
    let canvas = analyzer.canvas_for(FRAME_WIDTH);
    let camera = [
        CameraPoint::new(575.0, 305.0),
        CameraPoint::new(1335.0, 300.0),
        CameraPoint::new(1580.0, 860.0),
        CameraPoint::new(330.0, 865.0),
    ];
    CourtHomography::from_corners(&camera, &canvas.layout().corner_quad()).unwrap()
}

fn player_box(truth: &CourtHomography, foot: [f64; 2]) -> BoundingBox {
    let p = truth.to_camera(CourtPoint::from_array(foot)).unwrap();
    BoundingBox::new(p.x - 20.0, p.y - 80.0, p.x + 20.0, p.y)
}

fn ball_box(truth: &CourtHomography, center: [f64; 2]) -> BoundingBox {
    let p = truth.to_camera(CourtPoint::from_array(center)).unwrap();
    BoundingBox::new(p.x - 3.0, p.y - 3.0, p.x + 3.0, p.y + 3.0)
}

fn kmh(a: [f64; 2], b: [f64; 2], court_width_px: f64, elapsed_s: f64) -> f64 {
    let px = (a[0] - b[0]).hypot(a[1] - b[1]);
    px * 10.97 / court_width_px / elapsed_s * 3.6
}

#[test]
fn ball_crossing_court_width_in_one_second_is_39_49_kmh() {
    let court_width_px = 210.0;
    let mut players = vec![FrameTrack::default(); 31];
    let mut ball = vec![FrameTrack::default(); 31];
    for frame in [0, 30] {
        players[frame] = [
            (1, CourtPoint::new(100.0, 95.0)),
            (2, CourtPoint::new(100.0, 100.0 + court_width_px + 5.0)),
        ]
        .into_iter()
        .collect();
    }
    ball[0] = FrameTrack::single(BALL_ID, CourtPoint::new(100.0, 100.0));
    ball[30] = FrameTrack::single(BALL_ID, CourtPoint::new(100.0, 100.0 + court_width_px));
    let tracks = CourtTracks::new(players, ball);

    let snaps = compute_shot_statistics(&tracks, &[0, 30], FPS, court_width_px, 10.97).unwrap();
    assert_eq!(snaps.len(), 1);
    let shooter = snaps[0].player(1).unwrap();
    assert_eq!(shooter.shot_count, 1);
    assert_abs_diff_eq!(shooter.last_shot_speed_kmh, 39.492, epsilon = 1e-3);
    // Opponent stood still.
    assert_eq!(snaps[0].player(2).unwrap().last_movement_speed_kmh, 0.0);

    let table = StatsTable::forward_fill(&snaps, 31);
    assert_abs_diff_eq!(
        table.get(30).unwrap().players[0].avg_shot_speed_kmh,
        39.492,
        epsilon = 1e-3
    );
}

#[test]
fn analyzer_runs_full_rally_from_camera_detections() {
    let analyzer = RallyAnalyzer::default();
    let truth = camera_truth(&analyzer);
    let canvas = analyzer.canvas_for(FRAME_WIDTH);
    let layout = canvas.layout();
    let court_width_px = layout.court_width_px();

    let court_keypoints: Vec<f64> = CourtKeypoint::ALL
        .iter()
        .flat_map(|&kp| {
            let p = truth.to_camera(layout.keypoint(kp)).unwrap();
            [p.x, p.y]
        })
        .collect();
    assert_eq!(court_keypoints.len(), 2 * N_KEYPOINTS);

    // Canonical positions at the three shot frames.
    let p1 = [[1700.0, 80.0], [1720.0, 85.0], [1710.0, 78.0]];
    let p2 = [[1780.0, 510.0], [1760.0, 515.0], [1765.0, 505.0]];
    let b = [[1705.0, 90.0], [1775.0, 500.0], [1700.0, 95.0]];
    let shots = [0usize, 30, 60];

    let mut player_detections = vec![FrameDetections::new(); 75];
    let mut ball_detections = vec![FrameDetections::new(); 75];
    for (i, &frame) in shots.iter().enumerate() {
        player_detections[frame] = FrameDetections::from([
            (1, player_box(&truth, p1[i])),
            (2, player_box(&truth, p2[i])),
        ]);
        ball_detections[frame] = FrameDetections::from([(BALL_ID, ball_box(&truth, b[i]))]);
    }

    let input = RallyInput {
        fps: FPS,
        frame_width: FRAME_WIDTH,
        frame_count: None,
        court_keypoints,
        player_detections,
        ball_detections,
        shot_frames: shots.to_vec(),
    };
    let report = analyzer.analyze(&input).unwrap();

    assert_eq!(report.tracks.frame_count(), 75);
    let foot = report.tracks.player(30, 2).unwrap();
    assert_abs_diff_eq!(foot.x, p2[1][0], epsilon = 1e-6);
    assert_abs_diff_eq!(foot.y, p2[1][1], epsilon = 1e-6);

    assert_eq!(report.shots.len(), 2);
    assert!(report.skipped_segments.is_empty());

    let first = &report.shots[0];
    assert_eq!((first.shooter, first.opponent), (1, 2));
    assert_abs_diff_eq!(
        first.ball_speed_kmh,
        kmh(b[0], b[1], court_width_px, 1.0),
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        first.opponent_speed_kmh,
        kmh(p2[0], p2[1], court_width_px, 1.0),
        epsilon = 1e-6
    );

    let second = &report.shots[1];
    assert_eq!((second.shooter, second.opponent), (2, 1));
    assert_abs_diff_eq!(
        second.ball_speed_kmh,
        kmh(b[1], b[2], court_width_px, 1.0),
        epsilon = 1e-6
    );

    assert_eq!(
        report.snapshots.iter().map(|s| s.frame).collect::<Vec<_>>(),
        vec![0, 30]
    );
    assert_eq!(report.frame_stats.len(), 75);
    let row = report.frame_stats.get(45).unwrap();
    assert_eq!(row.players[0].stats.shot_count, 1);
    assert_eq!(row.players[1].stats.shot_count, 1);
    assert_eq!(row.players[1].stats.movement_count, 1);
    assert_eq!(row.players, report.frame_stats.get(30).unwrap().players);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["shots"].as_array().unwrap().len(), 2);
    assert_eq!(json["frame_stats"].as_array().unwrap().len(), 75);
    assert_eq!(json["court_keypoints"].as_array().unwrap().len(), N_KEYPOINTS);
}

#[test]
fn outlier_keypoint_is_rejected_in_all_keypoints_mode() {
    let mut analyzer = RallyAnalyzer::default();
    let truth = camera_truth(&analyzer);
    let canvas = analyzer.canvas_for(FRAME_WIDTH);

    let mut court_keypoints: Vec<f64> = CourtKeypoint::ALL
        .iter()
        .flat_map(|&kp| {
            let p = truth.to_camera(canvas.layout().keypoint(kp)).unwrap();
            [p.x, p.y]
        })
        .collect();
    // Corrupt a service-line keypoint badly.
    let i = CourtKeypoint::NearServiceCenter.index();
    court_keypoints[2 * i] += 120.0;
    court_keypoints[2 * i + 1] -= 90.0;

    analyzer.config_mut().homography.mode = HomographyMode::AllKeypoints;
    let input = RallyInput {
        fps: FPS,
        frame_width: FRAME_WIDTH,
        frame_count: Some(1),
        court_keypoints,
        player_detections: Vec::new(),
        ball_detections: Vec::new(),
        shot_frames: Vec::new(),
    };
    let report = analyzer.analyze(&input).unwrap();

    let fitted = CourtHomography::from_array(report.homography).unwrap();
    for kp in CourtKeypoint::ALL {
        let camera = truth.to_camera(canvas.layout().keypoint(kp)).unwrap();
        let err = fitted.reprojection_error(camera, canvas.layout().keypoint(kp));
        assert!(err < 1e-6, "{:?}: err={}", kp, err);
    }
}

#[test]
fn missing_ball_segment_is_skipped_not_fatal() {
    let analyzer = RallyAnalyzer::default();
    let truth = camera_truth(&analyzer);
    let canvas = analyzer.canvas_for(FRAME_WIDTH);
    let court_keypoints: Vec<f64> = CourtKeypoint::ALL
        .iter()
        .flat_map(|&kp| {
            let p = truth.to_camera(canvas.layout().keypoint(kp)).unwrap();
            [p.x, p.y]
        })
        .collect();

    let players = FrameDetections::from([
        (1, player_box(&truth, [1700.0, 80.0])),
        (2, player_box(&truth, [1780.0, 510.0])),
    ]);
    let input = RallyInput {
        fps: FPS,
        frame_width: FRAME_WIDTH,
        frame_count: Some(20),
        court_keypoints,
        player_detections: vec![players; 11],
        ball_detections: vec![FrameDetections::new(); 11],
        shot_frames: vec![0, 10],
    };
    let report = analyzer.analyze(&input).unwrap();
    assert!(report.shots.is_empty());
    assert_eq!(report.skipped_segments.len(), 1);
    assert_eq!(report.skipped_segments[0].start_frame, 0);
    assert_eq!(report.frame_stats.len(), 20);
    for row in report.frame_stats.rows() {
        for p in &row.players {
            assert_eq!(p.avg_shot_speed_kmh, 0.0);
            assert_eq!(p.avg_movement_speed_kmh, 0.0);
        }
    }
}
