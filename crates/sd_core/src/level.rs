use bevy::prelude::*;

/// The (hash, name) pair scoping a save to one game level.
#[derive(Resource, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LevelIdentity {
    pub hash: String,
    pub name: String,
}

impl LevelIdentity {
    pub fn new(hash: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            name: name.into(),
        }
    }
}
