//! Destruction drop resolution.

use crate::item::{make_item, realize_spec};
use trinketforge_catalog::{TrinketDef, TrinketRegistry};
use trinketforge_core::{ItemSnapshot, Material, ToolCategory};

/// Resolve what a broken instance of `def` yields.
///
/// Rules are evaluated in declaration order and the first match wins; a
/// rule's absent conditions are wildcards. When no rule matches (including
/// when the definition declares no rules at all), the default policy applies:
/// a single unit of the definition itself, unconditionally.
pub fn compute_drops(
    def: &TrinketDef,
    registry: &TrinketRegistry,
    silk_touch: bool,
    tool_material: Option<&Material>,
) -> Vec<ItemSnapshot> {
    let tool = tool_material.and_then(ToolCategory::from_material);

    for rule in &def.drop_rules {
        if rule.matches(silk_touch, tool) {
            return rule
                .drops
                .iter()
                .filter_map(|spec| realize_spec(spec, registry))
                .collect();
        }
    }

    vec![make_item(def, 1)]
}
