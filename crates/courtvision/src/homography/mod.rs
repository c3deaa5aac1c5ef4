//! Homography estimation and the camera → court mapper.

mod core;
mod mapper;
mod quad;

pub use self::core::{
    estimate_homography_dlt, fit_homography_ransac, HomographyError, RansacHomographyConfig,
    RansacHomographyResult, MIN_HOMOGENEOUS_W,
};
pub use mapper::{CourtHomography, DetectedKeypoints, HomographyConfig, HomographyMode};
