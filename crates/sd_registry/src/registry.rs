use std::sync::Arc;

use bevy::prelude::*;
use sd_catalog::{Catalog, CatalogProvider};
use sd_core::{set_collision_recursive, CollisionFlags, InstanceId, InstanceIdGenerator, TemplateId};

use crate::history::{Edit, EditHistory};
use crate::instance::{InstanceRecord, SpawnedInstance};

/// Immutable, order-preserving copy of the registry contents.
#[derive(Clone, Debug, PartialEq)]
pub struct RegistrySnapshot {
    records: Arc<[InstanceRecord]>,
}

impl RegistrySnapshot {
    pub fn from_records(records: Vec<InstanceRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstanceRecord> {
        self.records.iter()
    }
}

/// Outcome of [`SpawnRegistry::restore`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RestoreReport {
    pub restored: usize,
    /// Template ids that could not be resolved, in record order.
    pub skipped: Vec<TemplateId>,
}

impl RestoreReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Authoritative set of placed instances for the active level.
#[derive(Resource, Debug, Default)]
pub struct SpawnRegistry {
    instances: Vec<SpawnedInstance>,
    ids: InstanceIdGenerator,
    history: EditHistory,
    unsaved: bool,
}

impl SpawnRegistry {
    /// Store `instance` and return the stored record.
    ///
    /// An unassigned id, or one this registry has already issued, is replaced
    /// by a fresh id.
    pub fn add(&mut self, instance: SpawnedInstance) -> &SpawnedInstance {
        let index = self.insert(instance);
        self.history.record(Edit::Placed(self.instances[index].clone()));
        self.unsaved = true;
        &self.instances[index]
    }

    /// Remove an instance. Absent ids are ignored.
    pub fn remove(&mut self, id: InstanceId) -> Option<SpawnedInstance> {
        let index = self.position(id)?;
        let instance = self.instances.remove(index);
        self.history.record(Edit::Removed {
            instance: instance.clone(),
            index,
        });
        self.unsaved = true;
        Some(instance)
    }

    pub fn get(&self, id: InstanceId) -> Option<&SpawnedInstance> {
        self.instances.iter().find(|i| i.instance_id == id)
    }

    /// Mutable access for in-edit changes. Marks the registry as unsaved.
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut SpawnedInstance> {
        let instance = self.instances.iter_mut().find(|i| i.instance_id == id)?;
        self.unsaved = true;
        Some(instance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpawnedInstance> {
        self.instances.iter()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Drop every instance and the edit history. Nothing is saved.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.history.clear();
        self.unsaved = false;
    }

    /// Copy the current contents out for persistence.
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            records: self.instances.iter().map(SpawnedInstance::record).collect(),
        }
    }

    /// Replace the contents with `records`, resolving each template.
    ///
    /// Records whose template is missing from the catalog are skipped and
    /// reported. A record without lighting falls back to the template's light.
    pub fn restore(&mut self, records: &[InstanceRecord], catalog: &dyn CatalogProvider) -> RestoreReport {
        self.instances.clear();
        self.history.clear();

        let mut report = RestoreReport::default();
        for record in records {
            let Some(template) = catalog.resolve_template(&record.template_id) else {
                warn!("Skipping saved object with unknown template '{}'", record.template_id);
                report.skipped.push(record.template_id.clone());
                continue;
            };

            let mut instance = SpawnedInstance::from_template(template, record.transform);
            instance.overrides.hide_in_replays = record.overrides.hide_in_replays;
            if let Some(light) = &record.overrides.light {
                instance.overrides.light = Some(light.clone());
            }

            self.insert(instance);
            report.restored += 1;
        }

        self.unsaved = false;
        report
    }

    /// Switch an instance to another style of the same template family.
    ///
    /// Transform and overrides are kept. Returns false when the instance is
    /// missing or `variant` is not one of its style options.
    pub fn swap_variant(&mut self, id: InstanceId, variant: &TemplateId, catalog: &Catalog) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        let allowed = catalog
            .style_options(&self.instances[index].template_id)
            .iter()
            .any(|t| &t.id == variant);
        let Some(template) = catalog.resolve_template(variant).filter(|_| allowed) else {
            return false;
        };

        let instance = &mut self.instances[index];
        let mut node = template.prefab.clone();
        set_collision_recursive(&mut node, CollisionFlags::normal());
        instance.node = node;
        instance.template_id = template.id.clone();
        instance.overrides.light = match (&template.default_light, instance.overrides.light.take()) {
            (Some(_), Some(current)) => Some(current),
            (Some(default), None) => Some(default.clone()),
            (None, _) => None,
        };

        self.unsaved = true;
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(edit) = self.history.pop_undo() else {
            return false;
        };

        match edit {
            Edit::Placed(instance) => {
                let Some(index) = self.position(instance.instance_id) else {
                    return false;
                };
                let current = self.instances.remove(index);
                self.history.push_redo(Edit::Placed(current));
            }
            Edit::Removed { instance, index } => {
                let old = instance.instance_id;
                let at = self.insert_fresh_at(instance, index);
                let restored = self.instances[at].clone();
                self.history.remap(old, restored.instance_id);
                self.history.push_redo(Edit::Removed {
                    instance: restored,
                    index: at,
                });
            }
        }

        self.unsaved = true;
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(edit) = self.history.pop_redo() else {
            return false;
        };

        match edit {
            Edit::Placed(instance) => {
                let old = instance.instance_id;
                let at = self.insert_fresh_at(instance, self.instances.len());
                let placed = self.instances[at].clone();
                self.history.remap(old, placed.instance_id);
                self.history.push_undo(Edit::Placed(placed));
            }
            Edit::Removed { instance, .. } => {
                let Some(index) = self.position(instance.instance_id) else {
                    return false;
                };
                let current = self.instances.remove(index);
                self.history.push_undo(Edit::Removed {
                    instance: current,
                    index,
                });
            }
        }

        self.unsaved = true;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    pub fn mark_saved(&mut self) {
        self.unsaved = false;
    }

    fn position(&self, id: InstanceId) -> Option<usize> {
        self.instances.iter().position(|i| i.instance_id == id)
    }

    fn insert(&mut self, mut instance: SpawnedInstance) -> usize {
        let requested = instance.instance_id;
        instance.instance_id = if requested.is_assigned() && self.ids.is_unissued(requested) {
            self.ids.claim(requested)
        } else {
            self.ids.next_id()
        };
        self.instances.push(instance);
        self.instances.len() - 1
    }

    fn insert_fresh_at(&mut self, mut instance: SpawnedInstance, index: usize) -> usize {
        instance.instance_id = self.ids.next_id();
        let at = index.min(self.instances.len());
        self.instances.insert(at, instance);
        at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sd_catalog::{SpawnableKind, SpawnableTemplate};
    use sd_core::{pose_approx_eq, LightOverride};
    use std::collections::HashSet;
    use std::f32::consts::FRAC_PI_2;

    fn catalog() -> Catalog {
        Catalog::from_templates(vec![
            SpawnableTemplate::new("rail_01", SpawnableKind::Rail).with_variants(["rail_01_red"]),
            SpawnableTemplate::new("rail_01_red", SpawnableKind::Rail).with_style("Red", None),
            SpawnableTemplate::new("spline_02", SpawnableKind::Spline),
            SpawnableTemplate::new("lamp", SpawnableKind::Pack).with_light(LightOverride::default()),
        ])
    }

    fn spawn(registry: &mut SpawnRegistry, catalog: &Catalog, id: &str, transform: Transform) -> InstanceId {
        let template = catalog.resolve_template(&TemplateId::new(id)).unwrap();
        registry
            .add(SpawnedInstance::from_template(template, transform))
            .instance_id
    }

    #[test]
    fn add_assigns_unique_ids() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        let a = spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);
        let b = spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);
        assert!(a.is_assigned());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn ids_stay_unique_across_add_remove_cycles() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        let mut issued = HashSet::new();

        for round in 0..50 {
            let id = spawn(&mut registry, &catalog, "spline_02", Transform::IDENTITY);
            assert!(issued.insert(id), "id {} reused", id);
            if round % 3 != 0 {
                registry.remove(id);
            }
        }

        let live: HashSet<_> = registry.iter().map(|i| i.instance_id).collect();
        assert_eq!(live.len(), registry.len());
    }

    #[test]
    fn add_replaces_already_issued_id() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        let a = spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);

        let template = catalog.resolve_template(&TemplateId::new("rail_01")).unwrap();
        let mut duplicate = SpawnedInstance::from_template(template, Transform::IDENTITY);
        duplicate.instance_id = a;
        let b = registry.add(duplicate).instance_id;
        assert_ne!(a, b);

        let mut chosen = SpawnedInstance::from_template(template, Transform::IDENTITY);
        chosen.instance_id = InstanceId(100);
        assert_eq!(registry.add(chosen).instance_id, InstanceId(100));
    }

    #[test]
    fn add_with_max_id_gets_fresh_ids() {
        let catalog = catalog();
        let template = catalog.resolve_template(&TemplateId::new("rail_01")).unwrap();
        let mut registry = SpawnRegistry::default();

        let mut max = SpawnedInstance::from_template(template, Transform::IDENTITY);
        max.instance_id = InstanceId(u64::MAX);
        let first = registry.add(max).instance_id;
        let second = spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);

        assert!(first.is_assigned() && second.is_assigned());
        assert_ne!(first, InstanceId(u64::MAX));
        assert_ne!(first, second);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut registry = SpawnRegistry::default();
        assert!(registry.remove(InstanceId(42)).is_none());
        assert!(!registry.can_undo());
    }

    #[test]
    fn snapshot_is_isolated_from_later_mutation() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        let id = spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);
        let snapshot = registry.snapshot();

        registry.get_mut(id).unwrap().transform.translation.y = 3.0;
        spawn(&mut registry, &catalog, "spline_02", Transform::IDENTITY);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.records()[0].transform, Transform::IDENTITY);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);
        spawn(
            &mut registry,
            &catalog,
            "spline_02",
            Transform::from_xyz(1.0, 0.0, 0.0).with_rotation(Quat::from_rotation_y(FRAC_PI_2)),
        );
        let lamp = spawn(&mut registry, &catalog, "lamp", Transform::from_scale(Vec3::splat(2.0)));
        registry.get_mut(lamp).unwrap().overrides.hide_in_replays = true;

        let snapshot = registry.snapshot();
        let mut restored = SpawnRegistry::default();
        let report = restored.restore(snapshot.records(), &catalog);

        assert_eq!(report.restored, 3);
        assert_eq!(report.skipped_count(), 0);
        assert_eq!(restored.snapshot(), snapshot);
        assert!(!restored.has_unsaved_changes());
    }

    #[test]
    fn restore_skips_unresolvable_templates() {
        let catalog = catalog();
        let records = vec![
            InstanceRecord::new("rail_01", Transform::IDENTITY),
            InstanceRecord::new("deleted_pack_item", Transform::IDENTITY),
            InstanceRecord::new("spline_02", Transform::from_xyz(1.0, 0.0, 0.0)),
        ];

        let mut registry = SpawnRegistry::default();
        let report = registry.restore(&records, &catalog);

        assert_eq!(report.restored, 2);
        assert_eq!(report.skipped, vec![TemplateId::new("deleted_pack_item")]);
        let ids: Vec<_> = registry.iter().map(|i| i.template_id.as_str().to_string()).collect();
        assert_eq!(ids, vec!["rail_01", "spline_02"]);
    }

    #[test]
    fn restore_uses_template_light_when_record_has_none() {
        let catalog = catalog();
        let custom = LightOverride {
            intensity: 1200.0,
            ..LightOverride::default()
        };
        let records = vec![
            InstanceRecord::new("lamp", Transform::IDENTITY),
            InstanceRecord::new("lamp", Transform::IDENTITY).with_light(custom.clone()),
            InstanceRecord::new("rail_01", Transform::IDENTITY),
        ];

        let mut registry = SpawnRegistry::default();
        registry.restore(&records, &catalog);
        let lights: Vec<_> = registry.iter().map(|i| i.overrides.light.clone()).collect();
        assert_eq!(lights, vec![Some(LightOverride::default()), Some(custom), None]);
    }

    #[test]
    fn restore_replaces_previous_contents() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        let old = spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);

        registry.restore(&[InstanceRecord::new("spline_02", Transform::IDENTITY)], &catalog);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(old).is_none());
        assert!(!registry.can_undo());
    }

    #[test]
    fn undo_redo_placement() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        let first = spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);
        spawn(&mut registry, &catalog, "spline_02", Transform::from_xyz(0.0, 1.0, 0.0));

        assert!(registry.undo());
        assert_eq!(registry.len(), 1);
        assert!(registry.get(first).is_some());
        assert!(registry.can_redo());

        assert!(registry.redo());
        assert_eq!(registry.len(), 2);
        let last = registry.iter().last().unwrap();
        assert_eq!(last.template_id, TemplateId::new("spline_02"));
        assert!(pose_approx_eq(&last.transform, &Transform::from_xyz(0.0, 1.0, 0.0), 1e-6));
        assert!(!registry.can_redo());
    }

    #[test]
    fn undo_delete_restores_position_with_new_id() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);
        let middle = spawn(&mut registry, &catalog, "lamp", Transform::IDENTITY);
        spawn(&mut registry, &catalog, "spline_02", Transform::IDENTITY);

        registry.remove(middle);
        assert!(registry.undo());

        let order: Vec<_> = registry.iter().map(|i| i.template_id.as_str().to_string()).collect();
        assert_eq!(order, vec!["rail_01", "lamp", "spline_02"]);
        assert!(registry.get(middle).is_none());

        // Undoing the lamp's placement still works after its id changed.
        assert!(registry.undo());
        assert!(registry.undo());
        let order: Vec<_> = registry.iter().map(|i| i.template_id.as_str().to_string()).collect();
        assert_eq!(order, vec!["rail_01"]);
    }

    #[test]
    fn new_edit_clears_redo() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);
        registry.undo();
        assert!(registry.can_redo());
        spawn(&mut registry, &catalog, "spline_02", Transform::IDENTITY);
        assert!(!registry.can_redo());
    }

    #[test]
    fn swap_variant_keeps_transform() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        let pose = Transform::from_xyz(4.0, 0.5, -2.0);
        let id = spawn(&mut registry, &catalog, "rail_01", pose);

        assert!(registry.swap_variant(id, &TemplateId::new("rail_01_red"), &catalog));
        let instance = registry.get(id).unwrap();
        assert_eq!(instance.template_id, TemplateId::new("rail_01_red"));
        assert_eq!(instance.transform, pose);

        assert!(!registry.swap_variant(id, &TemplateId::new("spline_02"), &catalog));
    }

    #[test]
    fn unsaved_flag_tracks_edits() {
        let catalog = catalog();
        let mut registry = SpawnRegistry::default();
        assert!(!registry.has_unsaved_changes());
        spawn(&mut registry, &catalog, "rail_01", Transform::IDENTITY);
        assert!(registry.has_unsaved_changes());
        registry.mark_saved();
        assert!(!registry.has_unsaved_changes());
    }
}
