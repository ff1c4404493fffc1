use bevy::prelude::*;

pub mod collision;
pub mod ids;
pub mod level;
pub mod light;
pub mod pose;
pub mod scene_node;

pub use collision::CollisionFlags;
pub use ids::{InstanceId, InstanceIdGenerator, TemplateId};
pub use level::LevelIdentity;
pub use light::{LightOverride, LightUnit};
pub use pose::{pose_approx_eq, quat_from_array, quat_to_array, vec3_from_array, vec3_to_array};
pub use scene_node::{set_collision_recursive, SceneNode};

/// Core plugin providing the shared data model for scenedrop.
pub struct SdCorePlugin;

impl Plugin for SdCorePlugin {
    fn build(&self, _app: &mut App) {
        // Core types are used by other crates; no systems to register here.
    }
}
