//! Single-input (cutter) recipe enumeration.
//!
//! Material-keyed cutter recipes are registered with the host crafting
//! system directly; definition-keyed inputs cannot be (the host has no way
//! to key a recipe on an embedded tag), so they are flattened into a link
//! table and served by resolved-id lookup.

use trinketforge_catalog::TrinketRegistry;
use trinketforge_core::{IdentityResolver, ItemSnapshot};

/// One definition-keyed cutter recipe, flattened for id lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutterLink {
    /// Originating recipe id.
    pub recipe_id: String,
    /// Definition id the presented input must resolve to.
    pub input_id: String,
    /// Definition produced by the cut.
    pub output_id: String,
    /// Items produced per cut.
    pub amount: u32,
}

/// Flatten every definition-keyed cutter recipe into links, in definition
/// load order.
pub fn collect_cutter_links(registry: &TrinketRegistry) -> Vec<CutterLink> {
    registry
        .iter()
        .flat_map(|def| def.cutting.iter().map(move |recipe| (def, recipe)))
        .filter_map(|(def, recipe)| {
            let input_id = recipe.input.trinket.clone()?;
            Some(CutterLink {
                recipe_id: recipe.id.clone(),
                input_id,
                output_id: def.id.clone(),
                amount: recipe.amount,
            })
        })
        .collect()
}

/// Enumerate every link whose input id matches the presented item's
/// resolved identity.
///
/// Zero, one, or many results are all valid; choosing among many is the
/// caller's concern (a selection UI, typically).
pub fn cutter_candidates<'a>(
    links: &'a [CutterLink],
    input: &ItemSnapshot,
    resolver: &dyn IdentityResolver,
) -> Vec<&'a CutterLink> {
    let Some(input_id) = resolver.resolve(input) else {
        return Vec::new();
    };
    links
        .iter()
        .filter(|link| link.input_id == input_id)
        .collect()
}
