use crate::Span;

/// The discrete zoom level of the map and the span it corresponds to.
///
/// The level and the span are two views of the same value: setting one
/// recomputes the other. Levels outside `[MIN, MAX]` are clamped, as the API
/// returns nothing useful beyond them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    level: u8,
    delta: f64,
}
impl Zoom {
    /// The coarsest level.
    pub const MIN: u8 = 3;
    /// The finest level.
    pub const MAX: u8 = 19;

    /// The zoom level for a span; the smaller extent decides.
    pub fn from_span(span: Span) -> Self {
        let delta = span.min_delta();
        Self {
            level: level_from_delta(delta),
            delta,
        }
    }

    /// The span for a zoom level.
    pub fn from_level(z: i32) -> Self {
        let level = clamp_level(z);
        Self {
            level,
            delta: delta_from_level(level),
        }
    }

    /// The discrete level.
    pub fn z(&self) -> u8 {
        self.level
    }

    /// Set the discrete level, recomputing the span.
    pub fn set_z(&mut self, z: i32) {
        *self = Self::from_level(z);
    }

    /// The span, with the same extent on both axes.
    pub fn span(&self) -> Span {
        Span::square(self.delta)
    }

    /// Set the span, recomputing the level.
    pub fn set_span(&mut self, span: Span) {
        *self = Self::from_span(span);
    }

    /// The level to show when a server cluster is opened: one level finer,
    /// except that 16 jumps straight to 19, as 17 and 18 show the same photos.
    pub fn cluster_expansion_level(&self) -> u8 {
        match self.level {
            16 => 19,
            level => clamp_level(level as i32 + 1),
        }
    }
}

/// `2 + log2(180 / delta)`, truncated and clamped.
pub(crate) fn level_from_delta(delta: f64) -> u8 {
    // Truncation toward zero; NaN becomes 0 and infinities saturate.
    clamp_level((2.0 + (180.0 / delta).log2()) as i32)
}

/// `180 / 2^(level - 2)`.
pub(crate) fn delta_from_level(level: u8) -> f64 {
    180.0 / 2f64.powi(level as i32 - 2)
}

fn clamp_level(z: i32) -> u8 {
    z.clamp(Zoom::MIN as i32, Zoom::MAX as i32) as u8
}
