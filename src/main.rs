use std::time::Duration;

use bevy::prelude::*;
use sd_catalog::{CatalogHandle, CatalogSource};
use sd_core::{LevelIdentity, TemplateId};
use sd_persistence::{LoadRequest, PersistenceEvent, SaveRequest, SaveStore};
use sd_placement::{
    Action, AxisId, FlatGround, GroundProbe, InputFrame, PlacementCommand, PlacementController,
    PlacementEvent,
};
use sd_registry::SpawnRegistry;
use sd_signals::AffordancesChanged;

/// Frames to wait for the background catalog load before giving up.
const CATALOG_WAIT_FRAMES: usize = 500;

fn main() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(CatalogSource::default())
        .insert_resource(GroundProbe::new(FlatGround(0.0)))
        .insert_resource(LevelIdentity::new("7f3a9c", "Downtown Plaza"))
        // Plugins
        .add_plugins((
            sd_core::SdCorePlugin,
            sd_catalog::SdCatalogPlugin,
            sd_registry::SdRegistryPlugin,
            sd_placement::SdPlacementPlugin,
            sd_persistence::SdPersistencePlugin,
            sd_signals::SdSignalsPlugin,
        ))
        .add_systems(Update, (log_placement_events, log_persistence_events, log_affordances));

    if !wait_for_catalog(&mut app) {
        eprintln!("Catalog did not load from {:?}", app.world().resource::<CatalogSource>().manifest);
        return;
    }

    let first = {
        let catalog = app.world().resource::<CatalogHandle>();
        println!("Catalog ready: {} templates", catalog.catalog().len());
        match catalog.catalog().first() {
            Some(template) => template.id.clone(),
            None => {
                eprintln!("Catalog is empty, nothing to place");
                return;
            }
        }
    };

    place_scripted(&mut app, first);

    app.world_mut().send_event(SaveRequest);
    app.update();

    let placed = app.world().resource::<SpawnRegistry>().len();
    app.world_mut().resource_mut::<SpawnRegistry>().clear();
    app.world_mut().send_event(LoadRequest::Latest);
    app.update();

    let restored = app.world().resource::<SpawnRegistry>().len();
    println!("Placed {} instances, restored {}", placed, restored);
    let level = app.world().resource::<LevelIdentity>();
    println!(
        "Saves on disk for this level: {}",
        app.world().resource::<SaveStore>().by_level_hash(&level.hash).len()
    );
}

/// Step the app until the catalog resource appears.
fn wait_for_catalog(app: &mut App) -> bool {
    for _ in 0..CATALOG_WAIT_FRAMES {
        app.update();
        if app.world().contains_resource::<CatalogHandle>() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    false
}

/// Drive the placement controller with a few frames of canned input.
fn place_scripted(app: &mut App, template: TemplateId) {
    app.world_mut()
        .send_event(PlacementCommand::SetAnchor(Transform::from_xyz(0.0, 3.0, 0.0)));
    app.world_mut().send_event(PlacementCommand::Select(template));
    app.world_mut().send_event(PlacementCommand::Enable);
    app.update();

    let frames = [
        InputFrame::new().with_axis(AxisId::Nudge, Vec2::new(0.0, 5.0)),
        InputFrame::new()
            .hold(Action::Modify)
            .with_axis(AxisId::Rotate, Vec2::new(90.0, 0.0)),
        InputFrame::new().press(Action::PlaceKeep),
        InputFrame::new()
            .hold(Action::Modify)
            .with_axis(AxisId::Scale, Vec2::new(0.0, 5.0)),
        InputFrame::new().press(Action::Place),
    ];
    for frame in frames {
        app.insert_resource(frame);
        app.update();
    }

    let controller = app.world().resource::<PlacementController>();
    println!("Placement state after script: {:?}", controller.state());
}

fn log_placement_events(mut events: EventReader<PlacementEvent>) {
    for PlacementEvent(outcome) in events.read() {
        println!("Placement: {:?}", outcome);
    }
}

fn log_persistence_events(mut events: EventReader<PersistenceEvent>) {
    for event in events.read() {
        match event {
            PersistenceEvent::Saved(path) => println!("Saved to {}", path.display()),
            PersistenceEvent::Restored { restored, skipped } => {
                println!("Restored {} instances ({} skipped)", restored, skipped)
            }
            other => println!("Persistence: {:?}", other),
        }
    }
}

fn log_affordances(mut events: EventReader<AffordancesChanged>) {
    for AffordancesChanged(a) in events.read() {
        println!(
            "Affordances: undo={} redo={} save={} load={}",
            a.undo, a.redo, a.save, a.load
        );
    }
}
