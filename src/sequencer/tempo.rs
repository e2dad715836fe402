// Tempo drag - maps horizontal drag distance to a tempo multiplier

/// Lowest multiplier a drag can produce
pub const DEFAULT_TEMPO_FLOOR: f64 = 0.005;

/// Linear, anchor-relative tempo control
///
/// The multiplier scales the tick interval. Dragging left of the anchor
/// shortens the interval (`1 - |dx| / width`, never below the floor), dragging
/// right lengthens it (`1 + dx / width`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoDrag {
    floor: f64,
}

impl TempoDrag {
    pub fn new(floor: f64) -> Self {
        let floor = if floor.is_finite() && floor > 0.0 {
            floor
        } else {
            DEFAULT_TEMPO_FLOOR
        };
        Self { floor }
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Multiplier for a pointer `offset_x` pixels right of the anchor
    pub fn multiplier(&self, offset_x: f32, viewport_width: f32) -> f64 {
        if viewport_width <= 0.0 || !offset_x.is_finite() {
            return 1.0;
        }

        let ratio = offset_x as f64 / viewport_width as f64;
        if ratio < 0.0 {
            (1.0 - ratio.abs()).max(self.floor)
        } else {
            1.0 + ratio
        }
    }

    /// Clamp an externally supplied multiplier into the valid range
    pub fn clamp(&self, multiplier: f64) -> Option<f64> {
        multiplier
            .is_finite()
            .then(|| multiplier.max(self.floor))
    }
}

impl Default for TempoDrag {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPO_FLOOR)
    }
}

/// Tick interval shown next to the tempo control, in milliseconds
pub fn interval_label(multiplier: f64, base_interval_ms: u64) -> u64 {
    (multiplier * base_interval_ms as f64).round().max(0.0) as u64
}
