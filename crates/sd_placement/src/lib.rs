use bevy::prelude::*;
use sd_catalog::{CatalogHandle, CatalogProvider};
use sd_core::TemplateId;
use sd_registry::SpawnRegistry;

pub mod config;
pub mod controller;
pub mod ground;
pub mod input;

pub use config::PlacementConfig;
pub use controller::{PlacementContext, PlacementController, PlacementState, PreviewObject, TickOutcome};
pub use ground::{FlatGround, GroundCache, GroundProbe, GroundQuery, NoGround};
pub use input::{Action, AxisId, InputFrame, PlacementInput};

/// Requests from the UI to the placement controller.
#[derive(Event, Clone, Debug)]
pub enum PlacementCommand {
    Select(TemplateId),
    Enable,
    Disable,
    SetAnchor(Transform),
}

/// Non-idle tick outcomes, for presentation and sound collaborators.
#[derive(Event, Clone, Debug, PartialEq)]
pub struct PlacementEvent(pub TickOutcome);

/// Placement plugin for scenedrop.
/// Drives the preview object from the per-tick input frame.
pub struct SdPlacementPlugin;

impl Plugin for SdPlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlacementConfig>()
            .init_resource::<InputFrame>()
            .init_resource::<GroundProbe>();

        if !app.world().contains_resource::<PlacementController>() {
            let config = app.world().resource::<PlacementConfig>().clone();
            app.insert_resource(PlacementController::new(config));
        }

        app.add_event::<PlacementCommand>()
            .add_event::<PlacementEvent>()
            .add_systems(Update, (apply_placement_commands, drive_placement).chain());
    }
}

/// Apply queued UI commands before the tick runs.
pub fn apply_placement_commands(
    mut commands: EventReader<PlacementCommand>,
    mut controller: ResMut<PlacementController>,
    catalog: Option<Res<CatalogHandle>>,
) {
    for command in commands.read() {
        match command {
            PlacementCommand::Select(id) => match catalog.as_deref() {
                Some(catalog) => {
                    controller.select_template(id, catalog.catalog());
                }
                None => warn!("Catalog not loaded yet, cannot select '{}'", id),
            },
            PlacementCommand::Enable => {
                if !controller.enable() {
                    warn!("Placement stays inactive: no template selected");
                }
            }
            PlacementCommand::Disable => controller.disable(),
            PlacementCommand::SetAnchor(anchor) => controller.set_anchor(*anchor),
        }
    }
}

/// Tick the controller once per frame.
pub fn drive_placement(
    mut controller: ResMut<PlacementController>,
    mut registry: Option<ResMut<SpawnRegistry>>,
    catalog: Option<Res<CatalogHandle>>,
    ground: Res<GroundProbe>,
    mut input: ResMut<InputFrame>,
    mut events: EventWriter<PlacementEvent>,
) {
    let ctx = PlacementContext {
        registry: registry.as_deref_mut(),
        catalog: catalog.as_deref().map(|c| c.catalog() as &dyn CatalogProvider),
        ground: ground.0.as_ref(),
    };

    let outcome = controller.tick(ctx, &*input);
    input.clear_pressed();

    if outcome != TickOutcome::Idle {
        events.send(PlacementEvent(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_catalog::{Catalog, SpawnableKind, SpawnableTemplate};
    use sd_registry::SdRegistryPlugin;

    fn app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(CatalogHandle::new(Catalog::from_templates(vec![
                SpawnableTemplate::new("rail_01", SpawnableKind::Rail),
            ])))
            .insert_resource(GroundProbe::new(FlatGround(0.0)))
            .add_plugins((SdRegistryPlugin, SdPlacementPlugin));
        app
    }

    #[test]
    fn commands_and_input_place_an_instance() {
        let mut app = app();
        app.world_mut()
            .send_event(PlacementCommand::SetAnchor(Transform::from_xyz(1.0, 4.0, 1.0)));
        app.world_mut()
            .send_event(PlacementCommand::Select(TemplateId::new("rail_01")));
        app.world_mut().send_event(PlacementCommand::Enable);
        app.update();
        assert!(app.world().resource::<PlacementController>().is_active());

        app.world_mut().resource_mut::<InputFrame>().set_pressed(Action::Place, true);
        app.update();

        let registry = app.world().resource::<SpawnRegistry>();
        assert_eq!(registry.len(), 1);
        let placed = registry.iter().next().unwrap();
        assert_eq!(placed.transform.translation, Vec3::new(1.0, 0.0, 1.0));
        assert!(!app.world().resource::<InputFrame>().action_pressed(Action::Place));
    }

    #[test]
    fn enable_without_selection_stays_inactive() {
        let mut app = app();
        app.world_mut().send_event(PlacementCommand::Enable);
        app.update();
        assert_eq!(
            app.world().resource::<PlacementController>().state(),
            PlacementState::Inactive
        );
    }
}
