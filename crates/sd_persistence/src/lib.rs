use std::path::PathBuf;

use bevy::prelude::*;
use sd_catalog::CatalogHandle;
use sd_core::LevelIdentity;
use sd_registry::SpawnRegistry;

pub mod format;
pub mod snapshot;
pub mod store;

pub use format::{GameObjectSave, GeneralSave, LevelSaveFile, LightingSave};
pub use snapshot::LevelSaveSnapshot;
pub use store::{save_filename, LoadReport, SaveError, SaveStore, SaveStoreConfig, SAVES_DIR, SAVE_EXTENSION};

/// Ask for the current registry contents to be saved for the active level.
#[derive(Event, Clone, Debug, Default)]
pub struct SaveRequest;

/// Ask for a save to be loaded into the registry.
#[derive(Event, Clone, Debug)]
pub enum LoadRequest {
    /// Most recent save of the active level.
    Latest,
    /// A specific save file.
    File(PathBuf),
    /// Rescan the save root without restoring anything.
    Refresh,
}

#[derive(Event, Clone, Debug, PartialEq)]
pub enum PersistenceEvent {
    Saved(PathBuf),
    SaveFailed(String),
    Restored { restored: usize, skipped: usize },
    LoadFailed(String),
    Refreshed { loaded: usize, failed: usize },
}

/// Persistence plugin for scenedrop.
/// Writes level saves to disk and restores them into the registry.
pub struct SdPersistencePlugin;

impl Plugin for SdPersistencePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SaveStoreConfig>();

        if !app.world().contains_resource::<SaveStore>() {
            let config = app.world().resource::<SaveStoreConfig>().clone();
            app.insert_resource(SaveStore::new(config));
        }

        app.add_event::<SaveRequest>()
            .add_event::<LoadRequest>()
            .add_event::<PersistenceEvent>()
            .add_systems(Startup, scan_saves)
            .add_systems(Update, (handle_save_requests, handle_load_requests).chain());
    }
}

/// Index the saves already on disk so load affordances are right from the start.
pub fn scan_saves(mut store: ResMut<SaveStore>) {
    let report = store.load_all();
    info!(
        "Indexed {} saves under {}",
        report.loaded,
        store.config().root.display()
    );
    for (path, reason) in &report.failed {
        warn!("Skipped save {}: {}", path.display(), reason);
    }
}

/// Write the registry to disk for each queued save request.
pub fn handle_save_requests(
    mut requests: EventReader<SaveRequest>,
    mut store: ResMut<SaveStore>,
    mut registry: ResMut<SpawnRegistry>,
    level: Option<Res<LevelIdentity>>,
    mut events: EventWriter<PersistenceEvent>,
) {
    for _ in requests.read() {
        let Some(level) = level.as_deref() else {
            warn!("Save requested without an active level");
            events.send(PersistenceEvent::SaveFailed("no active level".to_string()));
            continue;
        };

        match store.save(&registry.snapshot(), level) {
            Ok(path) => {
                registry.mark_saved();
                events.send(PersistenceEvent::Saved(path));
            }
            Err(e) => {
                warn!("Failed to save level '{}': {}", level.name, e);
                events.send(PersistenceEvent::SaveFailed(e.to_string()));
            }
        }
    }
}

/// Rescan saves and restore the requested one into the registry.
pub fn handle_load_requests(
    mut requests: EventReader<LoadRequest>,
    mut store: ResMut<SaveStore>,
    mut registry: ResMut<SpawnRegistry>,
    level: Option<Res<LevelIdentity>>,
    catalog: Option<Res<CatalogHandle>>,
    mut events: EventWriter<PersistenceEvent>,
) {
    for request in requests.read() {
        let report = store.load_all();
        info!(
            "Scanned saves: {} loaded, {} failed",
            report.loaded,
            report.failed.len()
        );

        let save = match request {
            LoadRequest::Refresh => {
                events.send(PersistenceEvent::Refreshed {
                    loaded: report.loaded,
                    failed: report.failed.len(),
                });
                continue;
            }
            LoadRequest::Latest => match level.as_deref() {
                Some(level) => store.latest_for(level),
                None => {
                    events.send(PersistenceEvent::LoadFailed("no active level".to_string()));
                    continue;
                }
            },
            LoadRequest::File(path) => store.find_by_path(path),
        };

        let Some(save) = save else {
            events.send(PersistenceEvent::LoadFailed("no matching save".to_string()));
            continue;
        };
        let Some(catalog) = catalog.as_deref() else {
            warn!("Catalog not loaded yet, cannot restore {:?}", save.file_path());
            events.send(PersistenceEvent::LoadFailed("catalog not loaded".to_string()));
            continue;
        };

        let result = registry.restore(&save.entries, catalog.catalog());
        events.send(PersistenceEvent::Restored {
            restored: result.restored,
            skipped: result.skipped_count(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_catalog::{Catalog, SpawnableKind, SpawnableTemplate};
    use sd_registry::{SdRegistryPlugin, SpawnedInstance};
    use tempfile::tempdir;

    fn app(root: &std::path::Path) -> App {
        let catalog = Catalog::from_templates(vec![SpawnableTemplate::new("rail_01", SpawnableKind::Rail)]);
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(SaveStoreConfig::with_root(root))
            .insert_resource(CatalogHandle::new(catalog))
            .insert_resource(LevelIdentity::new("a1b2c3", "Downtown Plaza"))
            .add_plugins((SdRegistryPlugin, SdPersistencePlugin));
        app
    }

    fn drain(app: &mut App) -> Vec<PersistenceEvent> {
        app.world_mut()
            .resource_mut::<Events<PersistenceEvent>>()
            .drain()
            .collect()
    }

    #[test]
    fn save_then_load_latest_restores_registry() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());

        {
            let world = app.world_mut();
            let template = world
                .resource::<CatalogHandle>()
                .catalog()
                .first()
                .unwrap()
                .clone();
            world
                .resource_mut::<SpawnRegistry>()
                .add(SpawnedInstance::from_template(&template, Transform::from_xyz(2.0, 0.0, 1.0)));
        }
        assert!(app.world().resource::<SpawnRegistry>().has_unsaved_changes());

        app.world_mut().send_event(SaveRequest);
        app.update();

        let events = drain(&mut app);
        assert!(matches!(events.as_slice(), [PersistenceEvent::Saved(_)]));
        assert!(!app.world().resource::<SpawnRegistry>().has_unsaved_changes());

        app.world_mut().resource_mut::<SpawnRegistry>().clear();
        app.world_mut().send_event(LoadRequest::Latest);
        app.update();

        assert_eq!(
            drain(&mut app),
            vec![PersistenceEvent::Restored { restored: 1, skipped: 0 }]
        );
        let registry = app.world().resource::<SpawnRegistry>();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.iter().next().unwrap().transform.translation,
            Vec3::new(2.0, 0.0, 1.0)
        );
    }

    #[test]
    fn load_without_saves_reports_failure() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.world_mut().send_event(LoadRequest::Latest);
        app.update();
        assert_eq!(
            drain(&mut app),
            vec![PersistenceEvent::LoadFailed("no matching save".to_string())]
        );
    }

    #[test]
    fn startup_indexes_existing_saves() {
        let dir = tempdir().unwrap();
        let mut writer = SaveStore::new(SaveStoreConfig::with_root(dir.path()));
        writer
            .save(
                &sd_registry::RegistrySnapshot::from_records(Vec::new()),
                &LevelIdentity::new("a1b2c3", "Downtown Plaza"),
            )
            .unwrap();

        let mut app = app(dir.path());
        app.update();

        let store = app.world().resource::<SaveStore>();
        assert_eq!(store.by_level_hash("a1b2c3").len(), 1);
    }

    #[test]
    fn load_specific_file_restores_it() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        let template = SpawnableTemplate::new("rail_01", SpawnableKind::Rail);
        app.world_mut()
            .resource_mut::<SpawnRegistry>()
            .add(SpawnedInstance::from_template(&template, Transform::from_xyz(0.0, 0.0, 4.0)));
        app.world_mut().send_event(SaveRequest);
        app.update();

        let path = match drain(&mut app).as_slice() {
            [PersistenceEvent::Saved(path)] => path.clone(),
            other => panic!("unexpected events {:?}", other),
        };

        app.world_mut().resource_mut::<SpawnRegistry>().clear();
        app.world_mut().send_event(LoadRequest::File(path));
        app.update();
        assert_eq!(
            drain(&mut app),
            vec![PersistenceEvent::Restored { restored: 1, skipped: 0 }]
        );

        app.world_mut()
            .send_event(LoadRequest::File(dir.path().join("missing.ron")));
        app.update();
        assert_eq!(
            drain(&mut app),
            vec![PersistenceEvent::LoadFailed("no matching save".to_string())]
        );
    }

    #[test]
    fn refresh_rescans_without_restoring() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.update();

        let level_dir = dir.path().join("Other");
        std::fs::create_dir_all(&level_dir).unwrap();
        std::fs::write(level_dir.join("broken.ron"), "(levelHash: ").unwrap();
        SaveStore::new(SaveStoreConfig::with_root(dir.path()))
            .save(
                &sd_registry::RegistrySnapshot::from_records(Vec::new()),
                &LevelIdentity::new("ffee", "Other"),
            )
            .unwrap();

        app.world_mut().send_event(LoadRequest::Refresh);
        app.update();

        assert_eq!(
            drain(&mut app),
            vec![PersistenceEvent::Refreshed { loaded: 1, failed: 1 }]
        );
        assert!(app.world().resource::<SpawnRegistry>().is_empty());
        assert_eq!(app.world().resource::<SaveStore>().by_level_name("Other").len(), 1);
    }

    #[test]
    fn save_without_level_fails() {
        let dir = tempdir().unwrap();
        let mut app = app(dir.path());
        app.world_mut().remove_resource::<LevelIdentity>();
        app.world_mut().send_event(SaveRequest);
        app.update();
        assert!(matches!(drain(&mut app).as_slice(), [PersistenceEvent::SaveFailed(_)]));
    }
}
