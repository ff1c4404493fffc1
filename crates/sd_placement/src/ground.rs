use bevy::prelude::*;

/// Ground-detection collaborator: a downward probe from `origin`.
pub trait GroundQuery: Send + Sync {
    fn query_ground_height(&self, origin: Vec3) -> Option<f32>;
}

/// Infinite horizontal plane at a fixed height.
#[derive(Clone, Copy, Debug)]
pub struct FlatGround(pub f32);

impl GroundQuery for FlatGround {
    fn query_ground_height(&self, origin: Vec3) -> Option<f32> {
        (origin.y >= self.0).then_some(self.0)
    }
}

/// A probe that never hits anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGround;

impl GroundQuery for NoGround {
    fn query_ground_height(&self, _origin: Vec3) -> Option<f32> {
        None
    }
}

/// The ground probe used by the placement system.
#[derive(Resource)]
pub struct GroundProbe(pub Box<dyn GroundQuery>);

impl GroundProbe {
    pub fn new(query: impl GroundQuery + 'static) -> Self {
        Self(Box::new(query))
    }
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self::new(NoGround)
    }
}

/// Last known ground height. Misses leave it untouched.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroundCache {
    level: Option<f32>,
}

impl GroundCache {
    /// Probe below `origin`; returns whether the probe hit.
    pub fn update(&mut self, ground: &dyn GroundQuery, origin: Vec3) -> bool {
        match ground.query_ground_height(origin) {
            Some(height) => {
                self.level = Some(height);
                true
            }
            None => false,
        }
    }

    pub fn level(&self) -> Option<f32> {
        self.level
    }
}
