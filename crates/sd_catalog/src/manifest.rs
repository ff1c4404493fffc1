use std::fs;
use std::path::Path;

use sd_core::{LightOverride, SceneNode, TemplateId};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::template::{PreviewHandle, SpawnableKind, SpawnableTemplate};

/// Default location of the catalog manifest.
pub const CATALOG_MANIFEST: &str = "assets/catalog.ron";

/// Error type for catalog manifest I/O.
#[derive(Debug)]
pub enum CatalogIoError {
    Io(std::io::Error),
    RonSpanned(ron::error::SpannedError),
}

impl From<std::io::Error> for CatalogIoError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ron::error::SpannedError> for CatalogIoError {
    fn from(err: ron::error::SpannedError) -> Self {
        Self::RonSpanned(err)
    }
}

impl std::fmt::Display for CatalogIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::RonSpanned(e) => write!(f, "RON parse error: {}", e),
        }
    }
}

impl std::error::Error for CatalogIoError {}

/// On-disk description of the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogManifest {
    pub templates: Vec<ManifestEntry>,
}

/// One template as written in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    /// Explicit kind; classified from the id when absent.
    #[serde(default)]
    pub kind: Option<SpawnableKind>,
    /// Whether the asset came from a user-installed pack.
    #[serde(default)]
    pub user_pack: bool,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub sub_style: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub prefab: Option<SceneNode>,
    #[serde(default)]
    pub light: Option<LightOverride>,
}

impl ManifestEntry {
    fn into_template(self) -> SpawnableTemplate {
        let kind = self
            .kind
            .unwrap_or_else(|| SpawnableKind::classify(&self.id, self.user_pack));
        let prefab = self.prefab.unwrap_or_else(|| SceneNode::new(self.id.as_str()));

        SpawnableTemplate {
            id: TemplateId(self.id),
            kind,
            variants: self.variants.into_iter().map(TemplateId).collect(),
            preview_image: self.preview.map(PreviewHandle),
            style: self.style,
            sub_style: self.sub_style,
            prefab,
            default_light: self.light,
        }
    }
}

/// Parse a manifest from RON text into a normalized catalog.
pub fn parse_catalog(contents: &str) -> Result<Catalog, CatalogIoError> {
    let manifest: CatalogManifest = ron::from_str(contents)?;
    Ok(Catalog::from_templates(
        manifest
            .templates
            .into_iter()
            .map(ManifestEntry::into_template)
            .collect(),
    ))
}

/// Load a catalog manifest from a RON file.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogIoError> {
    let contents = fs::read_to_string(path)?;
    parse_catalog(&contents)
}
