//! The definition table and its derived resolution indices.

use crate::{CatalogError, TrinketDef};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;
use trinketforge_core::{IdentityResolver, ItemSnapshot};

/// Immutable table of definitions plus the indices derived from them.
///
/// Built once per (re)load; readers always see a complete table because
/// reload installs a whole new registry rather than mutating this one.
#[derive(Debug, Default)]
pub struct TrinketRegistry {
    definitions: Vec<TrinketDef>,
    index_by_id: HashMap<String, usize>,
    id_by_fingerprint: HashMap<String, String>,
    first_by_tag: BTreeMap<String, String>,
    tag_children: BTreeMap<String, BTreeSet<String>>,
}

impl TrinketRegistry {
    /// Build a registry from definitions in load order.
    ///
    /// Duplicate ids are a fatal load error. Fingerprint collisions are
    /// first-registered-wins and logged, since a shadowed definition can
    /// never be recognized through the fallback path.
    pub fn build(definitions: Vec<TrinketDef>) -> Result<Self, CatalogError> {
        let mut registry = Self {
            definitions: Vec::with_capacity(definitions.len()),
            ..Self::default()
        };

        for def in definitions {
            if registry.index_by_id.contains_key(&def.id) {
                return Err(CatalogError::DuplicateId {
                    id: def.id,
                    source_name: "definition list".to_string(),
                });
            }

            match registry.id_by_fingerprint.entry(def.texture_fingerprint.clone()) {
                std::collections::hash_map::Entry::Occupied(entry) => {
                    warn!(
                        "fingerprint {} of '{}' already registered to '{}'; \
                         fallback resolution keeps the first",
                        def.texture_fingerprint,
                        def.id,
                        entry.get()
                    );
                }
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(def.id.clone());
                }
            }

            for tag in &def.tags {
                registry
                    .first_by_tag
                    .entry(tag.clone())
                    .or_insert_with(|| def.id.clone());
                if let Some((parent, child)) = tag.split_once('/') {
                    if !parent.is_empty() && !child.is_empty() {
                        registry
                            .tag_children
                            .entry(parent.to_string())
                            .or_default()
                            .insert(child.to_string());
                    }
                }
            }

            registry.index_by_id.insert(def.id.clone(), registry.definitions.len());
            registry.definitions.push(def);
        }

        Ok(registry)
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&TrinketDef> {
        self.index_by_id.get(id).map(|&idx| &self.definitions[idx])
    }

    /// Iterate definitions in load order.
    pub fn iter(&self) -> impl Iterator<Item = &TrinketDef> {
        self.definitions.iter()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolve a fingerprint to the first-registered definition id.
    pub fn id_by_fingerprint(&self, fingerprint: &str) -> Option<&str> {
        self.id_by_fingerprint.get(fingerprint).map(String::as_str)
    }

    /// The first-registered definition id for a tag, for browsing
    /// collaborators that need a representative entry per tag.
    pub fn first_by_tag(&self, tag: &str) -> Option<&str> {
        self.first_by_tag.get(tag).map(String::as_str)
    }

    /// All tags that have at least one definition, in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.first_by_tag.keys().map(String::as_str)
    }

    /// Child segments recorded under a parent tag (from one `/` split).
    pub fn tag_children(&self, parent: &str) -> Option<&BTreeSet<String>> {
        self.tag_children.get(parent)
    }
}

impl IdentityResolver for TrinketRegistry {
    /// Two-tier resolution: the embedded definition tag is authoritative
    /// when present (it survives fingerprint-index rebuilds); otherwise the
    /// texture fingerprint is looked up in the index. Non-head items never
    /// resolve.
    fn resolve<'a>(&'a self, item: &'a ItemSnapshot) -> Option<&'a str> {
        if !item.material.is_player_head() {
            return None;
        }
        if let Some(tag) = item.definition_tag.as_deref() {
            // A blank tag is no evidence at all, not a resolution to "".
            if !tag.trim().is_empty() {
                return Some(tag);
            }
        }
        let fingerprint = item.texture_fingerprint()?;
        self.id_by_fingerprint(fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trinketforge_core::{CapabilitySet, Material};

    fn def(id: &str, fingerprint: &str, tags: &[&str]) -> TrinketDef {
        TrinketDef {
            id: id.to_string(),
            name: id.to_string(),
            lore: Vec::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            capabilities: CapabilitySet::default(),
            texture_url: format!("http://textures.example.net/texture/{fingerprint}"),
            texture_fingerprint: fingerprint.to_string(),
            shaped: Vec::new(),
            shapeless: Vec::new(),
            cutting: Vec::new(),
            drop_rules: Vec::new(),
        }
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let err = TrinketRegistry::build(vec![def("a", "f1", &[]), def("a", "f2", &[])])
            .expect_err("duplicate id must be rejected");
        assert!(matches!(err, CatalogError::DuplicateId { ref id, .. } if id == "a"));
    }

    #[test]
    fn test_fingerprint_collision_keeps_first() {
        let registry =
            TrinketRegistry::build(vec![def("first", "same", &[]), def("second", "same", &[])])
                .expect("collisions are not fatal");
        assert_eq!(registry.id_by_fingerprint("same"), Some("first"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_tag_indices() {
        let registry = TrinketRegistry::build(vec![
            def("oak_a", "f1", &["alphabet/oak"]),
            def("oak_b", "f2", &["alphabet/oak", "letters"]),
            def("birch_a", "f3", &["alphabet/birch"]),
        ])
        .expect("valid definitions");

        assert_eq!(registry.first_by_tag("alphabet/oak"), Some("oak_a"));
        assert_eq!(registry.first_by_tag("letters"), Some("oak_b"));
        let children = registry.tag_children("alphabet").expect("parent recorded");
        assert!(children.contains("oak"));
        assert!(children.contains("birch"));
    }

    #[test]
    fn test_resolve_prefers_embedded_tag() {
        let registry = TrinketRegistry::build(vec![def("real", "fp", &[])]).unwrap();

        let mut item = ItemSnapshot::of_material(Material::player_head(), 1);
        item.definition_tag = Some("tagged_id".to_string());
        item.texture_url = Some("http://textures.example.net/texture/fp".to_string());

        // The tag wins even though the fingerprint maps elsewhere.
        assert_eq!(registry.resolve(&item), Some("tagged_id"));
    }

    #[test]
    fn test_resolve_ignores_blank_tag() {
        let registry = TrinketRegistry::build(vec![def("real", "fp", &[])]).unwrap();

        let mut item = ItemSnapshot::of_material(Material::player_head(), 1);
        item.definition_tag = Some("   ".to_string());
        item.texture_url = Some("http://textures.example.net/texture/fp".to_string());

        // Whitespace-only tags carry no identity; the fingerprint path
        // still applies.
        assert_eq!(registry.resolve(&item), Some("real"));

        item.texture_url = None;
        assert_eq!(registry.resolve(&item), None);
    }

    #[test]
    fn test_resolve_falls_back_to_fingerprint() {
        let registry = TrinketRegistry::build(vec![def("real", "fp", &[])]).unwrap();

        let mut item = ItemSnapshot::of_material(Material::player_head(), 1);
        item.texture_url = Some("http://textures.example.net/texture/fp".to_string());
        assert_eq!(registry.resolve(&item), Some("real"));

        item.texture_url = Some("http://textures.example.net/texture/unknown".to_string());
        assert_eq!(registry.resolve(&item), None);
    }

    #[test]
    fn test_resolve_ignores_non_head_items() {
        let registry = TrinketRegistry::build(vec![def("real", "fp", &[])]).unwrap();
        let mut item = ItemSnapshot::of_material(Material::parse("stone").unwrap(), 1);
        item.definition_tag = Some("real".to_string());
        assert_eq!(registry.resolve(&item), None);
    }
}
