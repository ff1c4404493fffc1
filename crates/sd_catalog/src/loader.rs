use std::path::PathBuf;

use bevy::prelude::*;
use bevy::tasks::{block_on, poll_once, IoTaskPool, Task, TaskPool};

use crate::catalog::{Catalog, CatalogHandle};
use crate::manifest::{load_catalog, CatalogIoError, CATALOG_MANIFEST};

/// Where the catalog manifest is read from.
#[derive(Resource, Clone, Debug)]
pub struct CatalogSource {
    pub manifest: PathBuf,
}

impl Default for CatalogSource {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from(CATALOG_MANIFEST),
        }
    }
}

/// In-flight background load of the catalog.
///
/// Dropping the task cancels the load; the catalog resource is then never
/// inserted and placement never gets enabled.
#[derive(Resource, Default)]
pub struct CatalogLoadTask {
    task: Option<Task<Result<Catalog, CatalogIoError>>>,
}

impl CatalogLoadTask {
    /// Start reading `manifest` on the IO task pool.
    pub fn spawn(manifest: PathBuf) -> Self {
        let pool = IoTaskPool::get_or_init(TaskPool::new);
        let task = pool.spawn(async move { load_catalog(&manifest) });
        Self { task: Some(task) }
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_some()
    }

    pub fn cancel(&mut self) {
        self.task = None;
    }

    /// Take the finished result, if the task completed.
    pub fn poll(&mut self) -> Option<Result<Catalog, CatalogIoError>> {
        let task = self.task.as_mut()?;
        let result = block_on(poll_once(task))?;
        self.task = None;
        Some(result)
    }
}

/// Fired once the catalog resource has been inserted.
#[derive(Event, Clone, Debug)]
pub struct CatalogReady {
    pub templates: usize,
}

/// Kick off the catalog load unless a catalog is already present.
pub fn start_catalog_load(
    source: Res<CatalogSource>,
    existing: Option<Res<CatalogHandle>>,
    mut load: ResMut<CatalogLoadTask>,
) {
    if existing.is_some() || load.is_pending() {
        return;
    }
    *load = CatalogLoadTask::spawn(source.manifest.clone());
}

/// Poll the background load and publish the catalog when it finishes.
pub fn poll_catalog_load(
    mut commands: Commands,
    mut load: ResMut<CatalogLoadTask>,
    mut ready: EventWriter<CatalogReady>,
) {
    let Some(result) = load.poll() else { return };

    match result {
        Ok(catalog) => {
            info!("Catalog loaded with {} templates", catalog.len());
            ready.send(CatalogReady {
                templates: catalog.len(),
            });
            commands.insert_resource(CatalogHandle::new(catalog));
        }
        Err(e) => warn!("Failed to load catalog: {}", e),
    }
}
