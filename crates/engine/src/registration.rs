//! Host crafting-system registration records.
//!
//! The registry is the source of truth; this module flattens it into the
//! keyed recipe records the host registers and unregisters. Keys are
//! deterministic so a later sync can unregister exactly what an earlier
//! sync registered.

use std::collections::BTreeMap;
use tracing::warn;
use trinketforge_catalog::{IngredientSpec, TrinketDef, TrinketRegistry};
use trinketforge_core::{ItemSnapshot, Material};

use crate::item::make_item;

/// One ingredient choice as the host understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostChoice {
    /// Any stack of the given material.
    Material(Material),
    /// An exact item, used for definition-id ingredients.
    Exact(ItemSnapshot),
}

/// A keyed recipe record for host registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostRecipe {
    /// A shaped crafting recipe.
    Shaped {
        /// Stable registration key.
        key: String,
        /// Pattern rows as declared (space = empty).
        pattern: Vec<String>,
        /// Pattern character to ingredient choice.
        ingredients: BTreeMap<char, HostChoice>,
        /// Crafted result.
        result: ItemSnapshot,
    },
    /// A shapeless crafting recipe.
    Shapeless {
        /// Stable registration key.
        key: String,
        /// Required ingredient choices.
        ingredients: Vec<HostChoice>,
        /// Crafted result.
        result: ItemSnapshot,
    },
    /// A material-keyed cutter recipe. Definition-keyed cutter recipes stay
    /// engine-side (see [`crate::cutter_candidates`]) and are never
    /// registered with the host.
    Cutter {
        /// Stable registration key.
        key: String,
        /// The single input choice.
        input: HostChoice,
        /// Cut result.
        result: ItemSnapshot,
    },
}

impl HostRecipe {
    /// The registration key.
    pub fn key(&self) -> &str {
        match self {
            HostRecipe::Shaped { key, .. }
            | HostRecipe::Shapeless { key, .. }
            | HostRecipe::Cutter { key, .. } => key,
        }
    }
}

fn host_choice(
    spec: &IngredientSpec,
    registry: &TrinketRegistry,
    recipe_id: &str,
) -> Option<HostChoice> {
    if let Some(id) = &spec.trinket {
        return match registry.get(id) {
            Some(def) => Some(HostChoice::Exact(make_item(def, 1))),
            None => {
                warn!("Recipe '{recipe_id}' references unknown definition '{id}'");
                None
            }
        };
    }
    spec.material.clone().map(HostChoice::Material)
}

fn craft_key(def: &TrinketDef, index: usize, total: usize) -> String {
    if total == 1 {
        format!("craft_{}", def.id)
    } else {
        format!("craft_{}_{}", def.id, index + 1)
    }
}

/// Flatten every registerable recipe in the registry into keyed host
/// records, in definition load order. Recipes with an unsatisfiable
/// ingredient (unknown definition reference) are skipped with a warning.
pub fn collect_host_recipes(registry: &TrinketRegistry) -> Vec<HostRecipe> {
    let mut recipes = Vec::new();

    for def in registry.iter() {
        let total = def.shaped.len() + def.shapeless.len();
        let mut index = 0;

        for shaped in &def.shaped {
            let key = craft_key(def, index, total);
            index += 1;
            let mut ingredients = BTreeMap::new();
            let mut complete = true;
            for (&ch, spec) in &shaped.key {
                match host_choice(spec, registry, &shaped.id) {
                    Some(choice) => {
                        ingredients.insert(ch, choice);
                    }
                    None => complete = false,
                }
            }
            if !complete {
                continue;
            }
            recipes.push(HostRecipe::Shaped {
                key,
                pattern: shaped.pattern.clone(),
                ingredients,
                result: make_item(def, shaped.amount),
            });
        }

        for shapeless in &def.shapeless {
            let key = craft_key(def, index, total);
            index += 1;
            let choices: Vec<HostChoice> = shapeless
                .ingredients
                .iter()
                .filter_map(|spec| host_choice(spec, registry, &shapeless.id))
                .collect();
            if choices.len() != shapeless.ingredients.len() {
                continue;
            }
            recipes.push(HostRecipe::Shapeless {
                key,
                ingredients: choices,
                result: make_item(def, shapeless.amount),
            });
        }

        for cutter in &def.cutting {
            // Definition-keyed inputs cannot be expressed as host recipes;
            // the engine serves those through candidate enumeration.
            let Some(material) = cutter.input.material.clone() else {
                continue;
            };
            recipes.push(HostRecipe::Cutter {
                key: format!("cut_{}_{}", def.id, cutter.id),
                input: HostChoice::Material(material),
                result: make_item(def, cutter.amount),
            });
        }
    }

    recipes
}
