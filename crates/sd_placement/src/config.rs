use bevy::prelude::*;

/// Tuning for how input maps onto preview edits.
#[derive(Resource, Debug, Clone)]
pub struct PlacementConfig {
    /// Nudge axis value is divided by this per tick.
    pub nudge_divisor: f32,
    /// Degrees of rotation per unit of rotate axis per tick.
    pub rotate_degrees_per_unit: f32,
    /// Scale axis value is divided by this per tick.
    pub scale_divisor: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            nudge_divisor: 10.0,
            rotate_degrees_per_unit: 1.0,
            scale_divisor: 10.0,
        }
    }
}
