//! The immutable definition data model.

use crate::recipe::{CutterRecipe, ShapedRecipe, ShapelessRecipe};
use trinketforge_core::{CapabilitySet, IdentityResolver, ItemSnapshot, Material, ToolCategory};

/// A registered craftable/breakable content entry.
///
/// Definitions are immutable after construction; the whole table is rebuilt
/// on reload rather than mutated in place.
#[derive(Debug, Clone)]
pub struct TrinketDef {
    /// Globally unique, case-sensitive id.
    pub id: String,
    /// Display name, possibly with inline `&`-color markup (opaque here).
    pub name: String,
    /// Ordered lore lines.
    pub lore: Vec<String>,
    /// Hierarchical tag paths (`/`-separated segments).
    pub tags: Vec<String>,
    /// Behavioral capability flags, consumed by interaction collaborators.
    pub capabilities: CapabilitySet,
    /// External skin URL backing the item's appearance.
    pub texture_url: String,
    /// Stable fingerprint derived from the texture URL; the fallback
    /// resolution key.
    pub texture_fingerprint: String,
    /// Shaped recipes producing this definition.
    pub shaped: Vec<ShapedRecipe>,
    /// Shapeless recipes producing this definition.
    pub shapeless: Vec<ShapelessRecipe>,
    /// Single-input (cutter) recipes producing this definition.
    pub cutting: Vec<CutterRecipe>,
    /// Conditional drop rules, evaluated top to bottom.
    pub drop_rules: Vec<DropRule>,
}

/// A predicate over a single grid cell: exact material kind, or an item
/// that resolves to a specific definition id.
///
/// A spec with neither discriminant is a legal unsatisfiable barrier and
/// never matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngredientSpec {
    /// Match by exact material kind.
    pub material: Option<Material>,
    /// Match by resolved definition id.
    pub trinket: Option<String>,
}

impl IngredientSpec {
    /// A spec matching the given material kind.
    pub fn of_material(material: Material) -> Self {
        Self {
            material: Some(material),
            trinket: None,
        }
    }

    /// A spec matching items that resolve to `id`.
    pub fn of_trinket(id: impl Into<String>) -> Self {
        Self {
            material: None,
            trinket: Some(id.into()),
        }
    }

    /// Test whether `item` satisfies this spec. Empty cells never match.
    pub fn matches_item(
        &self,
        item: Option<&ItemSnapshot>,
        resolver: &dyn IdentityResolver,
    ) -> bool {
        let Some(item) = item else {
            return false;
        };
        if let Some(material) = &self.material {
            return item.material == *material;
        }
        if let Some(id) = &self.trinket {
            return resolver.resolve(item) == Some(id.as_str());
        }
        false
    }
}

/// One conditionally matched drop outcome.
#[derive(Debug, Clone)]
pub struct DropRule {
    /// Required silk-touch state, or wildcard when absent.
    pub silk_touch: Option<bool>,
    /// Required tool category, or wildcard when absent.
    pub tool: Option<ToolCategory>,
    /// Items yielded when the rule matches.
    pub drops: Vec<ItemSpec>,
}

impl DropRule {
    /// A rule matches when every present condition agrees with the context.
    pub fn matches(&self, silk_touch: bool, tool: Option<ToolCategory>) -> bool {
        if let Some(required) = self.silk_touch {
            if required != silk_touch {
                return false;
            }
        }
        if let Some(required) = self.tool {
            if tool != Some(required) {
                return false;
            }
        }
        true
    }
}

/// A drop output: a definition id or a raw material, with an amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    /// Yield an engine-constructed item for this definition id.
    pub trinket: Option<String>,
    /// Yield a raw material stack.
    pub material: Option<Material>,
    /// Stack amount (at least 1).
    pub amount: u32,
}

impl ItemSpec {
    /// A spec yielding `amount` of the given definition.
    pub fn of_trinket(id: impl Into<String>, amount: u32) -> Self {
        Self {
            trinket: Some(id.into()),
            material: None,
            amount: amount.max(1),
        }
    }

    /// A spec yielding `amount` of the given material.
    pub fn of_material(material: Material, amount: u32) -> Self {
        Self {
            trinket: None,
            material: Some(material),
            amount: amount.max(1),
        }
    }
}
