use serde::{Deserialize, Serialize};

/// Photometric unit a light intensity is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LightUnit {
    #[default]
    Lumen,
    Candela,
    Lux,
    Nits,
    Ev100,
}

impl LightUnit {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lumen => "Lumen",
            Self::Candela => "Candela",
            Self::Lux => "Lux",
            Self::Nits => "Nits",
            Self::Ev100 => "EV100",
        }
    }
}

/// Per-instance light facet values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightOverride {
    pub intensity: f32,
    pub unit: LightUnit,
    /// Spot cone angle in degrees.
    pub cone_angle: f32,
    pub range: f32,
    pub enabled: bool,
    /// Linear RGB.
    pub color: [f32; 3],
}

impl Default for LightOverride {
    fn default() -> Self {
        Self {
            intensity: 600.0,
            unit: LightUnit::Lumen,
            cone_angle: 30.0,
            range: 10.0,
            enabled: true,
            color: [1.0, 1.0, 1.0],
        }
    }
}

impl LightOverride {
    /// Field-wise comparison with a tolerance on the numeric values.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        let close = |a: f32, b: f32| (a - b).abs() <= epsilon;
        self.unit == other.unit
            && self.enabled == other.enabled
            && close(self.intensity, other.intensity)
            && close(self.cone_angle, other.cone_angle)
            && close(self.range, other.range)
            && self
                .color
                .iter()
                .zip(other.color.iter())
                .all(|(a, b)| close(*a, *b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_eq_tolerates_small_drift() {
        let a = LightOverride::default();
        let mut b = a.clone();
        b.intensity += 1e-5;
        b.color[1] -= 1e-6;
        assert!(a.approx_eq(&b, 1e-4));
    }

    #[test]
    fn approx_eq_detects_flag_change() {
        let a = LightOverride::default();
        let b = LightOverride {
            enabled: false,
            ..a.clone()
        };
        assert!(!a.approx_eq(&b, 1.0));
    }
}
