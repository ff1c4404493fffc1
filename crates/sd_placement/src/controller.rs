use bevy::prelude::*;
use sd_catalog::CatalogProvider;
use sd_core::{set_collision_recursive, CollisionFlags, InstanceId, SceneNode, TemplateId};
use sd_registry::{InstanceOverrides, SpawnRegistry, SpawnedInstance};

use crate::config::PlacementConfig;
use crate::ground::{GroundCache, GroundQuery};
use crate::input::{Action, AxisId, PlacementInput};

/// Resting states of the placement controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlacementState {
    #[default]
    Inactive,
    PreviewFree,
    PreviewHeldEdit,
}

/// What a single tick did.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    Idle,
    Edited,
    Committed {
        instance_id: InstanceId,
        preview_kept: bool,
    },
    SelectionRequested,
}

/// The transient object the user manipulates before committing.
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewObject {
    pub template_id: TemplateId,
    pub transform: Transform,
    pub overrides: InstanceOverrides,
    pub node: SceneNode,
    pub visible: bool,
    /// Manual vertical offset above the cached ground level.
    pub vertical_offset: f32,
}

/// Collaborators handed to the controller for one tick.
pub struct PlacementContext<'a> {
    pub registry: Option<&'a mut SpawnRegistry>,
    pub catalog: Option<&'a dyn CatalogProvider>,
    pub ground: &'a dyn GroundQuery,
}

/// Interactive state machine driving one preview object.
#[derive(Resource, Debug, Default)]
pub struct PlacementController {
    config: PlacementConfig,
    state: PlacementState,
    preview: Option<PreviewObject>,
    anchor: Transform,
    ground: GroundCache,
}

impl PlacementController {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != PlacementState::Inactive
    }

    pub fn preview(&self) -> Option<&PreviewObject> {
        self.preview.as_ref()
    }

    pub fn ground_level(&self) -> Option<f32> {
        self.ground.level()
    }

    pub fn anchor(&self) -> Transform {
        self.anchor
    }

    /// Move the world anchor the preview follows.
    pub fn set_anchor(&mut self, anchor: Transform) {
        self.anchor = anchor;
    }

    /// Build a fresh preview from a catalog template.
    ///
    /// The preview starts at the anchor's rotation with unit scale and no
    /// vertical offset. Returns false when the template cannot be resolved.
    pub fn select_template(&mut self, id: &TemplateId, catalog: &dyn CatalogProvider) -> bool {
        let Some(template) = catalog.resolve_template(id) else {
            warn!("Cannot preview unknown template '{}'", id);
            return false;
        };

        let mut node = template.prefab.clone();
        set_collision_recursive(&mut node, CollisionFlags::ignore());

        let mut preview = PreviewObject {
            template_id: template.id.clone(),
            transform: Transform::from_rotation(self.anchor.rotation),
            overrides: InstanceOverrides {
                hide_in_replays: false,
                light: template.default_light.clone(),
            },
            node,
            visible: self.is_active(),
            vertical_offset: 0.0,
        };
        preview.transform.translation = self.resting_position(0.0);
        self.preview = Some(preview);
        true
    }

    /// Start a placement session. Stays inactive without a preview template.
    pub fn enable(&mut self) -> bool {
        let Some(preview) = self.preview.as_mut() else {
            return false;
        };
        preview.visible = true;
        if self.state == PlacementState::Inactive {
            self.state = PlacementState::PreviewFree;
        }
        true
    }

    /// End the session. A held edit ends without committing; committed
    /// instances are untouched.
    pub fn disable(&mut self) {
        self.state = PlacementState::Inactive;
        if let Some(preview) = self.preview.as_mut() {
            preview.visible = false;
        }
    }

    /// Advance one simulation tick.
    pub fn tick(&mut self, ctx: PlacementContext<'_>, input: &dyn PlacementInput) -> TickOutcome {
        self.ground.update(ctx.ground, self.anchor.translation);

        if self.state == PlacementState::Inactive {
            return TickOutcome::Idle;
        }
        let (Some(registry), Some(catalog)) = (ctx.registry, ctx.catalog) else {
            return TickOutcome::Idle;
        };
        if self.preview.is_none() {
            return TickOutcome::Idle;
        }

        self.state = if input.action_held(Action::Modify) {
            PlacementState::PreviewHeldEdit
        } else {
            PlacementState::PreviewFree
        };

        let outcome = match self.state {
            PlacementState::PreviewHeldEdit => self.held_edit(registry, catalog, input),
            _ => self.free_edit(registry, catalog, input),
        };

        let resting = self.resting_position(self.preview_offset());
        if let Some(preview) = self.preview.as_mut() {
            preview.transform.translation = resting;
        }

        outcome
    }

    fn held_edit(
        &mut self,
        registry: &mut SpawnRegistry,
        catalog: &dyn CatalogProvider,
        input: &dyn PlacementInput,
    ) -> TickOutcome {
        let rotate = input.axis(AxisId::Rotate);
        let scale = input.axis(AxisId::Scale);
        let degrees = self.config.rotate_degrees_per_unit;
        let scale_step = scale.y / self.config.scale_divisor;
        let anchor_rotation = self.anchor.rotation;

        let Some(preview) = self.preview.as_mut() else {
            return TickOutcome::Idle;
        };

        let mut edited = false;
        if rotate != Vec2::ZERO {
            let yaw = (rotate.x * degrees).to_radians();
            let pitch = (rotate.y * degrees).to_radians();
            preview.transform.rotation =
                (preview.transform.rotation * Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)).normalize();
            edited = true;
        }
        if scale_step != 0.0 {
            preview.transform.scale += Vec3::splat(scale_step);
            edited = true;
        }

        if input.action_pressed(Action::Place) || input.action_pressed(Action::PlaceKeep) {
            return self.commit(registry, catalog, true);
        }
        if input.action_pressed(Action::ResetRotation) {
            preview.transform.rotation = anchor_rotation;
            edited = true;
        } else if input.action_pressed(Action::ResetScale) {
            preview.transform.scale = Vec3::ONE;
            edited = true;
        }

        if edited {
            TickOutcome::Edited
        } else {
            TickOutcome::Idle
        }
    }

    fn free_edit(
        &mut self,
        registry: &mut SpawnRegistry,
        catalog: &dyn CatalogProvider,
        input: &dyn PlacementInput,
    ) -> TickOutcome {
        let nudge = input.axis(AxisId::Nudge).y / self.config.nudge_divisor;
        let anchor_rotation = self.anchor.rotation;

        let Some(preview) = self.preview.as_mut() else {
            return TickOutcome::Idle;
        };

        let mut edited = false;
        if nudge != 0.0 {
            preview.vertical_offset += nudge;
            edited = true;
        }

        if input.action_pressed(Action::PlaceKeep) {
            return self.commit(registry, catalog, true);
        }
        if input.action_pressed(Action::Place) {
            return self.commit(registry, catalog, false);
        }
        if input.action_pressed(Action::OpenSelection) {
            return TickOutcome::SelectionRequested;
        }
        if input.action_pressed(Action::ResetTransform) {
            preview.transform.rotation = anchor_rotation;
            preview.transform.scale = Vec3::ONE;
            edited = true;
        }

        if edited {
            TickOutcome::Edited
        } else {
            TickOutcome::Idle
        }
    }

    /// Duplicate the preview into the registry.
    ///
    /// No-op while the preview is hidden, before any ground reading exists,
    /// or when its template has left the catalog.
    fn commit(
        &mut self,
        registry: &mut SpawnRegistry,
        catalog: &dyn CatalogProvider,
        keep_preview: bool,
    ) -> TickOutcome {
        let resting = self.resting_position(self.preview_offset());
        if self.ground.level().is_none() {
            return TickOutcome::Idle;
        }
        let Some(preview) = self.preview.as_mut() else {
            return TickOutcome::Idle;
        };
        if !preview.visible || catalog.resolve_template(&preview.template_id).is_none() {
            return TickOutcome::Idle;
        }

        preview.transform.translation = resting;

        let mut node = preview.node.clone();
        set_collision_recursive(&mut node, CollisionFlags::normal());
        let instance = SpawnedInstance {
            instance_id: InstanceId::UNASSIGNED,
            template_id: preview.template_id.clone(),
            transform: preview.transform,
            overrides: preview.overrides.clone(),
            node,
        };
        let instance_id = registry.add(instance).instance_id;

        if !keep_preview {
            preview.visible = false;
        }

        info!("Placed {} as {}", preview.template_id, instance_id);
        TickOutcome::Committed {
            instance_id,
            preview_kept: keep_preview,
        }
    }

    fn preview_offset(&self) -> f32 {
        self.preview.as_ref().map_or(0.0, |p| p.vertical_offset)
    }

    /// Anchor position with the height snapped to the cached ground level.
    fn resting_position(&self, offset: f32) -> Vec3 {
        let base = self.ground.level().unwrap_or(self.anchor.translation.y);
        Vec3::new(self.anchor.translation.x, base + offset, self.anchor.translation.z)
    }
}
