//! On-disk record layout of a level save.
//!
//! Field names are part of the file format and must not change.

use chrono::{DateTime, Local};
use sd_core::LightUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSaveFile {
    pub level_hash: String,
    pub level_name: String,
    pub date_modified: DateTime<Local>,
    #[serde(default)]
    pub game_objects: Vec<GameObjectSave>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameObjectSave {
    pub id: String,
    pub position: [f32; 3],
    /// `[x, y, z, w]`
    pub rotation: [f32; 4],
    pub local_scale: [f32; 3],
    #[serde(default)]
    pub general: GeneralSave,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting: Option<LightingSave>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralSave {
    pub hide_in_replays: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingSave {
    pub intensity: f32,
    pub unit: LightUnit,
    pub angle: f32,
    pub range: f32,
    pub enabled: bool,
    pub color: [f32; 3],
}
