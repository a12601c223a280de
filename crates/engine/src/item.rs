//! Output item construction.

use tracing::warn;
use trinketforge_catalog::{ItemSpec, TrinketDef, TrinketRegistry};
use trinketforge_core::{ItemSnapshot, Material};

/// Construct the concrete item for a definition.
///
/// The produced snapshot carries the definition id as its embedded tag, so
/// identity resolution survives later fingerprint index rebuilds.
pub fn make_item(def: &TrinketDef, amount: u32) -> ItemSnapshot {
    ItemSnapshot {
        material: Material::player_head(),
        count: amount.max(1),
        definition_tag: Some(def.id.clone()),
        texture_url: Some(def.texture_url.clone()),
        name: Some(def.name.clone()),
        lore: def.lore.clone(),
    }
}

/// Realize a declared item spec into a concrete snapshot.
///
/// Definition-id specs look up the registry and produce a full engine item;
/// material specs produce a plain stack. A spec naming an unknown definition
/// yields `None` with a warning, so one stale reference never aborts a drop
/// resolution.
pub fn realize_spec(spec: &ItemSpec, registry: &TrinketRegistry) -> Option<ItemSnapshot> {
    if let Some(id) = &spec.trinket {
        return match registry.get(id) {
            Some(def) => Some(make_item(def, spec.amount)),
            None => {
                warn!("Dropping item spec for unknown definition '{id}'");
                None
            }
        };
    }
    spec.material
        .as_ref()
        .map(|material| ItemSnapshot::of_material(material.clone(), spec.amount))
}
