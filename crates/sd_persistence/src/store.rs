use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use chrono::{DateTime, Local, TimeZone, Utc};
use sd_core::LevelIdentity;
use sd_registry::RegistrySnapshot;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::format::LevelSaveFile;
use crate::snapshot::LevelSaveSnapshot;

/// Default directory for level saves.
pub const SAVES_DIR: &str = "saves";

/// Extension of save files.
pub const SAVE_EXTENSION: &str = "ron";

/// Sortable UTC timestamp used in save file names.
const FILENAME_TIMESTAMP: &str = "%Y-%m-%dT%H.%M.%SZ";

/// Error type for save file operations.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Ron(ron::Error),
    RonSpanned(ron::error::SpannedError),
    /// A save with the same file name already exists.
    Collision(PathBuf),
}

impl From<std::io::Error> for SaveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ron::Error> for SaveError {
    fn from(err: ron::Error) -> Self {
        Self::Ron(err)
    }
}

impl From<ron::error::SpannedError> for SaveError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonSpanned(err)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Ron(e) => write!(f, "RON serialization error: {}", e),
            Self::RonSpanned(e) => write!(f, "RON parse error: {}", e),
            Self::Collision(path) => write!(f, "save file already exists: {}", path.display()),
        }
    }
}

impl std::error::Error for SaveError {}

/// Where saves live on disk.
#[derive(Resource, Clone, Debug)]
pub struct SaveStoreConfig {
    pub root: PathBuf,
    pub extension: String,
}

impl Default for SaveStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(SAVES_DIR),
            extension: SAVE_EXTENSION.to_string(),
        }
    }
}

impl SaveStoreConfig {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }
}

/// Aggregate result of [`SaveStore::load_all`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    /// Files that could not be read or parsed, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

/// Level saves on disk plus an in-memory index of everything loaded.
#[derive(Resource, Debug)]
pub struct SaveStore {
    config: SaveStoreConfig,
    loaded: Vec<LevelSaveSnapshot>,
}

impl Default for SaveStore {
    fn default() -> Self {
        Self::new(SaveStoreConfig::default())
    }
}

impl SaveStore {
    pub fn new(config: SaveStoreConfig) -> Self {
        Self {
            config,
            loaded: Vec::new(),
        }
    }

    pub fn config(&self) -> &SaveStoreConfig {
        &self.config
    }

    /// Directory holding the saves of one level.
    pub fn level_dir(&self, level_name: &str) -> PathBuf {
        self.config.root.join(sanitize(level_name))
    }

    /// Save `snapshot` for `level`, stamped with the current local time.
    pub fn save(&mut self, snapshot: &RegistrySnapshot, level: &LevelIdentity) -> Result<PathBuf, SaveError> {
        self.save_at(snapshot, level, Local::now())
    }

    /// Save `snapshot` for `level` with an explicit timestamp.
    ///
    /// The file is written to a temporary file in the level directory and
    /// then linked into place without replacing an existing file. An existing
    /// file of the same name is reported as [`SaveError::Collision`].
    pub fn save_at(
        &mut self,
        snapshot: &RegistrySnapshot,
        level: &LevelIdentity,
        saved_at: DateTime<Local>,
    ) -> Result<PathBuf, SaveError> {
        let mut save = LevelSaveSnapshot::capture(snapshot, level, saved_at);

        let pretty_config = ron::ser::PrettyConfig::new().depth_limit(4);
        let ron_string = ron::ser::to_string_pretty(&save.to_file(), pretty_config)?;

        let dir = self.level_dir(&level.name);
        fs::create_dir_all(&dir)?;

        let path = dir.join(save_filename(&level.name, &saved_at, &self.config.extension));
        if path.exists() {
            return Err(SaveError::Collision(path));
        }

        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(ron_string.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist_noclobber(&path).map_err(|e| {
            if e.error.kind() == ErrorKind::AlreadyExists {
                SaveError::Collision(path.clone())
            } else {
                SaveError::Io(e.error)
            }
        })?;

        info!("Saved {} objects to {}", save.entries.len(), path.display());
        save.file_path = Some(path.clone());
        self.loaded.push(save);
        Ok(path)
    }

    /// Read and parse a single save file.
    pub fn load_file(&self, path: &Path) -> Result<LevelSaveSnapshot, SaveError> {
        let contents = fs::read_to_string(path)?;
        let file: LevelSaveFile = ron::from_str(&contents)?;
        Ok(LevelSaveSnapshot::from_file(file, Some(path.to_path_buf())))
    }

    /// Rescan the save root and replace the in-memory index.
    ///
    /// Files that fail to parse are logged and skipped; empty files are
    /// ignored. A missing root is created and yields nothing.
    pub fn load_all(&mut self) -> LoadReport {
        self.loaded.clear();
        let mut report = LoadReport::default();

        if !self.config.root.exists() {
            if let Err(e) = fs::create_dir_all(&self.config.root) {
                warn!("Unable to create save root {}: {}", self.config.root.display(), e);
            }
            return report;
        }

        for entry in WalkDir::new(&self.config.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under save root: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.has_save_extension(entry.path()) {
                continue;
            }

            let path = entry.path();
            match fs::read_to_string(path) {
                Ok(contents) if contents.trim().is_empty() => {
                    debug!("Skipping empty save file {}", path.display());
                }
                Ok(contents) => match ron::from_str::<LevelSaveFile>(&contents) {
                    Ok(file) => self
                        .loaded
                        .push(LevelSaveSnapshot::from_file(file, Some(path.to_path_buf()))),
                    Err(e) => {
                        warn!("Unable to deserialize {}: {}", path.display(), e);
                        report.failed.push((path.to_path_buf(), e.to_string()));
                    }
                },
                Err(e) => {
                    warn!("Unable to read {}: {}", path.display(), e);
                    report.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
        }

        report.loaded = self.loaded.len();
        report
    }

    pub fn loaded(&self) -> &[LevelSaveSnapshot] {
        &self.loaded
    }

    pub fn by_level_hash(&self, hash: &str) -> Vec<&LevelSaveSnapshot> {
        self.loaded.iter().filter(|s| s.level_hash == hash).collect()
    }

    pub fn by_level_name(&self, name: &str) -> Vec<&LevelSaveSnapshot> {
        self.loaded.iter().filter(|s| s.level_name == name).collect()
    }

    /// Most recent loaded save for `level`, matched by hash.
    pub fn latest_for(&self, level: &LevelIdentity) -> Option<&LevelSaveSnapshot> {
        self.loaded
            .iter()
            .filter(|s| s.level_hash == level.hash)
            .max_by_key(|s| s.saved_at)
    }

    pub fn find_by_path(&self, path: &Path) -> Option<&LevelSaveSnapshot> {
        self.loaded.iter().find(|s| s.file_path() == Some(path))
    }

    /// Delete a save file and drop it from the index.
    pub fn delete(&mut self, path: &Path) -> Result<(), SaveError> {
        fs::remove_file(path)?;
        self.loaded.retain(|s| s.file_path() != Some(path));
        Ok(())
    }

    fn has_save_extension(&self, path: &Path) -> bool {
        path.extension().and_then(|s| s.to_str()) == Some(self.config.extension.as_str())
    }
}

/// File name for a save: level name plus a sortable timestamp.
///
/// The timestamp is in UTC so repeated wall-clock hours do not collide.
pub fn save_filename<Tz: TimeZone>(level_name: &str, saved_at: &DateTime<Tz>, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize(level_name),
        saved_at.with_timezone(&Utc).format(FILENAME_TIMESTAMP),
        extension
    )
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
