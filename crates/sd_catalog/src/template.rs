use sd_core::{LightOverride, SceneNode, TemplateId};
use serde::{Deserialize, Serialize};

/// Classification of a spawnable template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpawnableKind {
    #[default]
    Rail,
    Spline,
    Pack,
}

impl SpawnableKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rail => "Rails",
            Self::Spline => "Splines",
            Self::Pack => "Packs",
        }
    }

    pub fn all() -> &'static [SpawnableKind] {
        &[Self::Rail, Self::Spline, Self::Pack]
    }

    /// Classify an imported asset by name.
    ///
    /// Anything from a user pack is a `Pack`. Built-in grind and coping
    /// pieces are splines, every other built-in asset is a rail.
    pub fn classify(asset_name: &str, from_user_pack: bool) -> Self {
        if from_user_pack {
            return Self::Pack;
        }

        let lower = asset_name.to_lowercase();
        if lower.starts_with("grind") || lower.starts_with("coping") {
            Self::Spline
        } else {
            Self::Rail
        }
    }
}

/// Opaque reference to a thumbnail, only meaningful to the UI.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewHandle(pub String);

/// Immutable descriptor of a placeable object.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnableTemplate {
    pub id: TemplateId,
    pub kind: SpawnableKind,
    /// Alternate visual styles sharing this template's placement semantics.
    pub variants: Vec<TemplateId>,
    pub preview_image: Option<PreviewHandle>,
    pub style: Option<String>,
    pub sub_style: Option<String>,
    /// Visual subtree cloned into every instance.
    pub prefab: SceneNode,
    /// Light facet carried by the template, if any.
    pub default_light: Option<LightOverride>,
}

impl SpawnableTemplate {
    pub fn new(id: impl Into<TemplateId>, kind: SpawnableKind) -> Self {
        let id = id.into();
        let prefab = SceneNode::new(id.as_str());
        Self {
            id,
            kind,
            variants: Vec::new(),
            preview_image: None,
            style: None,
            sub_style: None,
            prefab,
            default_light: None,
        }
    }

    pub fn with_variants<I, T>(mut self, variants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TemplateId>,
    {
        self.variants = variants.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>, sub_style: Option<&str>) -> Self {
        self.style = Some(style.into());
        self.sub_style = sub_style.map(str::to_string);
        self
    }

    pub fn with_prefab(mut self, prefab: SceneNode) -> Self {
        self.prefab = prefab;
        self
    }

    pub fn with_light(mut self, light: LightOverride) -> Self {
        self.default_light = Some(light);
        self
    }

    pub fn with_preview(mut self, preview: PreviewHandle) -> Self {
        self.preview_image = Some(preview);
        self
    }

    /// Label for the style picker: `"Style / SubStyle"`, or the id with
    /// underscores replaced when no style is set.
    pub fn display_name(&self) -> String {
        let style = self.style.as_deref().filter(|s| !s.is_empty());
        match (style, self.sub_style.as_deref()) {
            (Some(style), Some(sub)) if !sub.is_empty() => format!("{} / {}", style, sub),
            (Some(style), _) => style.to_string(),
            (None, _) => self.id.as_str().replace('_', " "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_splines_by_prefix() {
        assert_eq!(SpawnableKind::classify("Grind_Ledge", false), SpawnableKind::Spline);
        assert_eq!(SpawnableKind::classify("coping_metal", false), SpawnableKind::Spline);
        assert_eq!(SpawnableKind::classify("flat_rail", false), SpawnableKind::Rail);
    }

    #[test]
    fn user_packs_are_always_packs() {
        assert_eq!(SpawnableKind::classify("grind_box", true), SpawnableKind::Pack);
    }

    #[test]
    fn display_name_variants() {
        let plain = SpawnableTemplate::new("kink_rail", SpawnableKind::Rail);
        assert_eq!(plain.display_name(), "kink rail");

        let styled = plain.clone().with_style("Steel", Some("Painted"));
        assert_eq!(styled.display_name(), "Steel / Painted");

        let style_only = plain.with_style("Steel", Some(""));
        assert_eq!(style_only.display_name(), "Steel");
    }

    #[test]
    fn empty_style_falls_back_to_id() {
        let blank = SpawnableTemplate::new("kink_rail", SpawnableKind::Rail).with_style("", Some("Painted"));
        assert_eq!(blank.display_name(), "kink rail");
    }
}
