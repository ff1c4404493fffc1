use bevy::prelude::*;

pub mod history;
pub mod instance;
pub mod registry;

pub use history::{Edit, EditHistory};
pub use instance::{InstanceOverrides, InstanceRecord, SpawnedInstance};
pub use registry::{RegistrySnapshot, RestoreReport, SpawnRegistry};

/// Registry plugin for scenedrop.
/// Owns the live set of placed instances for the active level.
pub struct SdRegistryPlugin;

impl Plugin for SdRegistryPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnRegistry>();
    }
}
