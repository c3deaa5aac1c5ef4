//! Canonical court model: real-world dimensions, keypoint layout and the
//! mini-court canvas that hosts it.

mod canvas;
mod dimensions;
mod layout;

pub use canvas::{MiniCourtCanvas, MiniCourtConfig};
pub use dimensions::CourtDimensions;
pub use layout::{
    derive_keypoints, derive_line_segments, CourtKeypoint, CourtKeypoints, CourtLayout,
    CourtLines, N_KEYPOINTS,
};
