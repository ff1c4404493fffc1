use bevy::prelude::*;
use sd_catalog::SpawnableTemplate;
use sd_core::{set_collision_recursive, CollisionFlags, InstanceId, LightOverride, SceneNode, TemplateId};

/// Sparse per-instance facets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceOverrides {
    pub hide_in_replays: bool,
    /// Present iff the live object carries a light facet.
    pub light: Option<LightOverride>,
}

/// One placed object in the active level.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnedInstance {
    pub instance_id: InstanceId,
    pub template_id: TemplateId,
    pub transform: Transform,
    pub overrides: InstanceOverrides,
    /// Owned visual subtree.
    pub node: SceneNode,
}

impl SpawnedInstance {
    /// Instantiate `template` at `transform` with the template's light facet.
    ///
    /// The id is left unassigned until the instance is added to a registry.
    pub fn from_template(template: &SpawnableTemplate, transform: Transform) -> Self {
        let mut node = template.prefab.clone();
        set_collision_recursive(&mut node, CollisionFlags::normal());

        Self {
            instance_id: InstanceId::UNASSIGNED,
            template_id: template.id.clone(),
            transform,
            overrides: InstanceOverrides {
                hide_in_replays: false,
                light: template.default_light.clone(),
            },
            node,
        }
    }

    /// Value copy of the persistent fields.
    pub fn record(&self) -> InstanceRecord {
        InstanceRecord {
            template_id: self.template_id.clone(),
            transform: self.transform,
            overrides: self.overrides.clone(),
        }
    }
}

/// The persistent part of an instance: what a save file stores per object.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceRecord {
    pub template_id: TemplateId,
    pub transform: Transform,
    pub overrides: InstanceOverrides,
}

impl InstanceRecord {
    pub fn new(template_id: impl Into<TemplateId>, transform: Transform) -> Self {
        Self {
            template_id: template_id.into(),
            transform,
            overrides: InstanceOverrides::default(),
        }
    }

    pub fn with_light(mut self, light: LightOverride) -> Self {
        self.overrides.light = Some(light);
        self
    }

    pub fn hidden_in_replays(mut self, hide: bool) -> Self {
        self.overrides.hide_in_replays = hide;
        self
    }
}
