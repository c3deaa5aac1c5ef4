//! Mini-court placement inside a video frame.
//!
//! The mini court is drawn on a semi-transparent background box anchored to
//! the top-right corner of the frame. The box and the padded court inside it
//! define the canonical court space for the whole run.

use crate::geometry::CourtPoint;

use super::dimensions::CourtDimensions;
use super::layout::CourtLayout;

/// Size and placement of the mini-court background box, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MiniCourtConfig {
    /// Background box width.
    pub rect_width: f64,
    /// Background box height.
    pub rect_height: f64,
    /// Gap between the box and the top/right frame edges.
    pub buffer: f64,
    /// Gap between the box and the court outline.
    pub padding: f64,
}

impl Default for MiniCourtConfig {
    fn default() -> Self {
        Self {
            rect_width: 250.0,
            rect_height: 500.0,
            buffer: 50.0,
            padding: 20.0,
        }
    }
}

impl MiniCourtConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("rect_width", self.rect_width),
            ("rect_height", self.rect_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be finite and > 0 (got {value})"));
            }
        }
        for (name, value) in [("buffer", self.buffer), ("padding", self.padding)] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be finite and >= 0 (got {value})"));
            }
        }
        if 2.0 * self.padding >= self.rect_width.min(self.rect_height) {
            return Err(format!(
                "padding ({:.1}px) leaves no room for the court inside a {:.1}x{:.1} box",
                self.padding, self.rect_width, self.rect_height
            ));
        }
        Ok(())
    }
}

/// Background box plus the court layout drawn inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniCourtCanvas {
    start: CourtPoint,
    end: CourtPoint,
    layout: CourtLayout,
}

impl MiniCourtCanvas {
    /// Place the canvas for a frame `frame_width` pixels wide.
    ///
    /// Frames narrower than `rect_width + buffer` push the box past the left
    /// edge; the layout is still derived.
    pub fn for_frame(
        frame_width: f64,
        config: &MiniCourtConfig,
        dimensions: &CourtDimensions,
    ) -> Self {
        let end = CourtPoint::new(frame_width - config.buffer, config.buffer + config.rect_height);
        let start = CourtPoint::new(end.x - config.rect_width, end.y - config.rect_height);
        let layout = CourtLayout::derive(
            start,
            [config.rect_width, config.rect_height],
            config.padding,
            dimensions,
        );
        Self { start, end, layout }
    }

    pub fn layout(&self) -> &CourtLayout {
        &self.layout
    }

    /// Background box corners `(top_left, bottom_right)`.
    pub fn bounds(&self) -> (CourtPoint, CourtPoint) {
        (self.start, self.end)
    }

    pub fn contains(&self, p: CourtPoint) -> bool {
        p.x >= self.start.x && p.x <= self.end.x && p.y >= self.start.y && p.y <= self.end.y
    }

    /// Clip a canonical point into the background box.
    pub fn clamp_to_canvas(&self, p: CourtPoint) -> CourtPoint {
        CourtPoint::new(
            p.x.clamp(self.start.x, self.end.x),
            p.y.clamp(self.start.y, self.end.y),
        )
    }
}
