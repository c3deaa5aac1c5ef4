//! Real-world tennis court measurements.

/// Fixed court measurements in meters.
///
/// Passed explicitly to layout and analytics code so that several analyses
/// with different court standards can run side by side.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CourtDimensions {
    /// Width between the singles sidelines.
    pub single_line_width: f64,
    /// Width between the doubles sidelines.
    pub double_line_width: f64,
    /// Baseline to net distance.
    pub half_court_line_height: f64,
    /// Width of the service boxes (equal to the singles width on a standard court).
    pub service_line_width: f64,
    /// Width of one doubles alley.
    pub double_alley_difference: f64,
    /// Baseline to service line distance.
    pub no_mans_land_height: f64,
    /// Reference standing height of player 1.
    pub player_1_height: f64,
    /// Reference standing height of player 2.
    pub player_2_height: f64,
}

impl Default for CourtDimensions {
    fn default() -> Self {
        Self {
            single_line_width: 8.23,
            double_line_width: 10.97,
            half_court_line_height: 11.88,
            service_line_width: 6.4,
            double_alley_difference: 1.37,
            no_mans_land_height: 5.48,
            player_1_height: 1.88,
            player_2_height: 1.91,
        }
    }
}

impl CourtDimensions {
    /// Full baseline-to-baseline length.
    pub fn court_length(&self) -> f64 {
        2.0 * self.half_court_line_height
    }

    /// Reference height for a player id (1 or 2).
    pub fn player_height(&self, player_id: u32) -> Option<f64> {
        match player_id {
            1 => Some(self.player_1_height),
            2 => Some(self.player_2_height),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("single_line_width", self.single_line_width),
            ("double_line_width", self.double_line_width),
            ("half_court_line_height", self.half_court_line_height),
            ("service_line_width", self.service_line_width),
            ("double_alley_difference", self.double_alley_difference),
            ("no_mans_land_height", self.no_mans_land_height),
            ("player_1_height", self.player_1_height),
            ("player_2_height", self.player_2_height),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be finite and > 0 (got {value})"));
            }
        }

        if self.single_line_width >= self.double_line_width {
            return Err("single_line_width must be < double_line_width".to_string());
        }
        if self.no_mans_land_height >= self.half_court_line_height {
            return Err("no_mans_land_height must be < half_court_line_height".to_string());
        }
        Ok(())
    }
}
