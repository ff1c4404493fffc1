use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bevy::prelude::*;
use sd_core::TemplateId;

use crate::template::{SpawnableKind, SpawnableTemplate};

/// Read-only source of spawnable templates.
///
/// The registry and the placement controller consume templates through this
/// trait and never load assets themselves.
pub trait CatalogProvider: Send + Sync {
    /// All templates in catalog order.
    fn list_templates(&self) -> &[SpawnableTemplate];

    /// Look up a template by id.
    fn resolve_template(&self, id: &TemplateId) -> Option<&SpawnableTemplate>;
}

/// Owned, immutable set of spawnable templates.
#[derive(Debug, Default)]
pub struct Catalog {
    templates: Vec<SpawnableTemplate>,
    index: HashMap<TemplateId, usize>,
}

impl Catalog {
    /// Build a catalog, normalizing variant lists.
    ///
    /// Duplicate ids keep the first template. Variant lists drop self
    /// references and unknown ids, and a variant's own variants are
    /// flattened into the primary's list so the style picker is one level deep.
    pub fn from_templates(templates: Vec<SpawnableTemplate>) -> Self {
        let mut unique = Vec::with_capacity(templates.len());
        let mut seen = HashSet::new();
        for template in templates {
            if seen.insert(template.id.clone()) {
                unique.push(template);
            } else {
                warn!("Duplicate spawnable template '{}' ignored", template.id);
            }
        }

        let declared: HashMap<TemplateId, Vec<TemplateId>> = unique
            .iter()
            .map(|t| (t.id.clone(), t.variants.clone()))
            .collect();

        for template in &mut unique {
            let own = std::mem::take(&mut template.variants);
            let mut flattened: Vec<TemplateId> = Vec::new();

            for variant in own {
                let Some(nested) = declared.get(&variant) else {
                    warn!("Template '{}' lists unknown variant '{}'", template.id, variant);
                    continue;
                };
                let candidates = std::iter::once(variant.clone()).chain(nested.iter().cloned());
                for candidate in candidates {
                    if candidate != template.id
                        && declared.contains_key(&candidate)
                        && !flattened.contains(&candidate)
                    {
                        flattened.push(candidate);
                    }
                }
            }

            template.variants = flattened;
        }

        let index = unique
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();

        Self {
            templates: unique,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn first(&self) -> Option<&SpawnableTemplate> {
        self.templates.first()
    }

    pub fn by_kind(&self, kind: SpawnableKind) -> impl Iterator<Item = &SpawnableTemplate> {
        self.templates.iter().filter(move |t| t.kind == kind)
    }

    /// The template followed by its variants, in picker order.
    /// Empty when `id` is unknown.
    pub fn style_options(&self, id: &TemplateId) -> Vec<&SpawnableTemplate> {
        let Some(primary) = self.resolve_template(id) else {
            return Vec::new();
        };

        std::iter::once(primary)
            .chain(primary.variants.iter().filter_map(|v| self.resolve_template(v)))
            .collect()
    }
}

impl CatalogProvider for Catalog {
    fn list_templates(&self) -> &[SpawnableTemplate] {
        &self.templates
    }

    fn resolve_template(&self, id: &TemplateId) -> Option<&SpawnableTemplate> {
        self.index.get(id).map(|&i| &self.templates[i])
    }
}

/// Shared handle to the loaded catalog.
#[derive(Resource, Clone, Debug)]
pub struct CatalogHandle(pub Arc<Catalog>);

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self(Arc::new(catalog))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.0
    }
}
