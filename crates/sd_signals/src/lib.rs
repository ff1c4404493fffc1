use bevy::prelude::*;
use sd_core::LevelIdentity;
use sd_persistence::{handle_load_requests, handle_save_requests, SaveStore};
use sd_registry::SpawnRegistry;

pub mod hub;

pub use hub::{AffordanceHub, Affordances, AffordancesChanged, SignalHub, Subscription};

/// Signals plugin for scenedrop.
/// Publishes undo/redo/save/load interactability for presentation code.
pub struct SdSignalsPlugin;

impl Plugin for SdSignalsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AffordanceHub>()
            .add_event::<AffordancesChanged>()
            .add_systems(
                Update,
                publish_affordances
                    .after(handle_save_requests)
                    .after(handle_load_requests),
            );
    }
}

/// Derive affordances from the registry and the saves of the active level.
pub fn compute_affordances(
    registry: &SpawnRegistry,
    store: Option<&SaveStore>,
    level: Option<&LevelIdentity>,
) -> Affordances {
    let load = match (store, level) {
        (Some(store), Some(level)) => store.latest_for(level).is_some(),
        _ => false,
    };

    Affordances {
        undo: registry.can_undo(),
        redo: registry.can_redo(),
        save: level.is_some() && registry.has_unsaved_changes(),
        load,
    }
}

pub fn publish_affordances(
    hub: Res<AffordanceHub>,
    registry: Res<SpawnRegistry>,
    store: Option<Res<SaveStore>>,
    level: Option<Res<LevelIdentity>>,
    mut changed: EventWriter<AffordancesChanged>,
) {
    let next = compute_affordances(&registry, store.as_deref(), level.as_deref());
    if hub.0.publish(next) {
        changed.send(AffordancesChanged(next));
    }
}
