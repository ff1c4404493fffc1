use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use sd_core::{
    quat_from_array, quat_to_array, vec3_from_array, vec3_to_array, LevelIdentity, LightOverride,
    TemplateId,
};
use sd_registry::{InstanceOverrides, InstanceRecord, RegistrySnapshot};

use bevy::prelude::*;

use crate::format::{GameObjectSave, GeneralSave, LevelSaveFile, LightingSave};

/// Immutable, level-scoped copy of registry contents.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSaveSnapshot {
    pub level_hash: String,
    pub level_name: String,
    pub saved_at: DateTime<Local>,
    /// Set once the snapshot has been written to or read from disk.
    pub file_path: Option<PathBuf>,
    pub entries: Vec<InstanceRecord>,
}

impl LevelSaveSnapshot {
    /// Copy the registry snapshot by value for `level`.
    pub fn capture(snapshot: &RegistrySnapshot, level: &LevelIdentity, saved_at: DateTime<Local>) -> Self {
        Self {
            level_hash: level.hash.clone(),
            level_name: level.name.clone(),
            saved_at,
            file_path: None,
            entries: snapshot.records().to_vec(),
        }
    }

    pub fn level(&self) -> LevelIdentity {
        LevelIdentity::new(self.level_hash.clone(), self.level_name.clone())
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Equality on scene content, ignoring `saved_at` and `file_path`.
    pub fn same_content(&self, other: &Self) -> bool {
        self.level_hash == other.level_hash
            && self.level_name == other.level_name
            && self.entries == other.entries
    }

    pub fn to_file(&self) -> LevelSaveFile {
        LevelSaveFile {
            level_hash: self.level_hash.clone(),
            level_name: self.level_name.clone(),
            date_modified: self.saved_at,
            game_objects: self.entries.iter().map(record_to_save).collect(),
        }
    }

    pub fn from_file(file: LevelSaveFile, path: Option<PathBuf>) -> Self {
        Self {
            level_hash: file.level_hash,
            level_name: file.level_name,
            saved_at: file.date_modified,
            file_path: path,
            entries: file.game_objects.into_iter().map(save_to_record).collect(),
        }
    }
}

fn record_to_save(record: &InstanceRecord) -> GameObjectSave {
    GameObjectSave {
        id: record.template_id.as_str().to_string(),
        position: vec3_to_array(record.transform.translation),
        rotation: quat_to_array(record.transform.rotation),
        local_scale: vec3_to_array(record.transform.scale),
        general: GeneralSave {
            hide_in_replays: record.overrides.hide_in_replays,
        },
        lighting: record.overrides.light.as_ref().map(|light| LightingSave {
            intensity: light.intensity,
            unit: light.unit,
            angle: light.cone_angle,
            range: light.range,
            enabled: light.enabled,
            color: light.color,
        }),
    }
}

fn save_to_record(save: GameObjectSave) -> InstanceRecord {
    InstanceRecord {
        template_id: TemplateId(save.id),
        transform: Transform {
            translation: vec3_from_array(save.position),
            rotation: quat_from_array(save.rotation),
            scale: vec3_from_array(save.local_scale),
        },
        overrides: InstanceOverrides {
            hide_in_replays: save.general.hide_in_replays,
            light: save.lighting.map(|l| LightOverride {
                intensity: l.intensity,
                unit: l.unit,
                cone_angle: l.angle,
                range: l.range,
                enabled: l.enabled,
                color: l.color,
            }),
        },
    }
}
