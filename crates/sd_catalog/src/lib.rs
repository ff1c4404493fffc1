use bevy::prelude::*;

pub mod catalog;
pub mod loader;
pub mod manifest;
pub mod template;

pub use catalog::{Catalog, CatalogHandle, CatalogProvider};
pub use loader::{poll_catalog_load, start_catalog_load, CatalogLoadTask, CatalogReady, CatalogSource};
pub use manifest::{load_catalog, parse_catalog, CatalogIoError, CatalogManifest, ManifestEntry, CATALOG_MANIFEST};
pub use template::{PreviewHandle, SpawnableKind, SpawnableTemplate};

/// Catalog plugin for scenedrop.
/// Loads the spawnable catalog in the background and publishes it as a resource.
pub struct SdCatalogPlugin;

impl Plugin for SdCatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CatalogSource>()
            .init_resource::<CatalogLoadTask>()
            .add_event::<CatalogReady>()
            .add_systems(Startup, start_catalog_load)
            .add_systems(Update, poll_catalog_load);
    }
}
