//! Behavioral capability flags and their handler dispatch.
//!
//! Definitions declare capabilities as tagged flags; host-facing
//! collaborators register one handler per capability and dispatch through
//! [`CapabilityHandlers`] instead of chaining `if` branches, so new
//! capabilities stay additive.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Enumerated behavioral flags a definition may carry.
///
/// The flags themselves are outside the matching core; they are consumed by
/// interaction collaborators (opening host UIs, light emission, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Can be lit and extinguished in place (candles).
    Lightable,
    /// Always emits light when placed (pumpkins).
    Glowing,
    /// Opens the crafting UI on interaction.
    Workbench,
    /// Opens the anvil UI on interaction.
    Anvil,
    /// Opens the enchanting UI on interaction.
    Enchanting,
    /// Opens the smithing UI on interaction.
    Smithing,
    /// Opens the loom UI on interaction.
    Loom,
    /// Opens the stonecutter UI on interaction.
    Stonecutter,
    /// Opens the grindstone UI on interaction.
    Grindstone,
    /// Opens the cartography UI on interaction.
    Cartography,
    /// Opens the player's ender chest on interaction.
    EnderChest,
}

/// Fixed dispatch priority: the functional-block capabilities first, then
/// lightable. Mirrors the interaction precedence the drop-in collaborators
/// expect when a definition carries several flags.
pub const DISPATCH_ORDER: [Capability; 11] = [
    Capability::Workbench,
    Capability::Anvil,
    Capability::Enchanting,
    Capability::Smithing,
    Capability::Loom,
    Capability::Stonecutter,
    Capability::Grindstone,
    Capability::Cartography,
    Capability::EnderChest,
    Capability::Lightable,
    Capability::Glowing,
];

impl Capability {
    /// Parse a capability token (case-insensitive). Unknown tokens are `None`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "lightable" => Some(Capability::Lightable),
            "glowing" => Some(Capability::Glowing),
            "workbench" => Some(Capability::Workbench),
            "anvil" => Some(Capability::Anvil),
            "enchanting" => Some(Capability::Enchanting),
            "smithing" => Some(Capability::Smithing),
            "loom" => Some(Capability::Loom),
            "stonecutter" => Some(Capability::Stonecutter),
            "grindstone" => Some(Capability::Grindstone),
            "cartography" => Some(Capability::Cartography),
            "ender_chest" | "enderchest" => Some(Capability::EnderChest),
            _ => None,
        }
    }
}

/// An immutable set of capabilities carried by one definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// Parse a list of capability tokens, silently skipping unknown ones.
    pub fn parse_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        Self(tokens.into_iter().filter_map(Capability::parse).collect())
    }

    /// Whether the set contains `capability`.
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the capabilities in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A registry mapping capabilities to handler functions.
///
/// Dispatch walks [`DISPATCH_ORDER`] and fires the first registered handler
/// whose capability is present on the set; exactly one handler runs per
/// interaction, like the host UI precedence requires.
pub struct CapabilityHandlers<Ctx> {
    handlers: BTreeMap<Capability, Box<dyn Fn(&mut Ctx) + Send + Sync>>,
}

impl<Ctx> Default for CapabilityHandlers<Ctx> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<Ctx> CapabilityHandlers<Ctx> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for `capability`, replacing any previous one.
    pub fn register(
        &mut self,
        capability: Capability,
        handler: impl Fn(&mut Ctx) + Send + Sync + 'static,
    ) -> &mut Self {
        self.handlers.insert(capability, Box::new(handler));
        self
    }

    /// Fire the first registered handler present on `capabilities`.
    ///
    /// Returns the capability that handled the interaction, or `None` when
    /// nothing matched (callers fall through to default host behavior).
    pub fn dispatch(&self, capabilities: &CapabilitySet, ctx: &mut Ctx) -> Option<Capability> {
        for capability in DISPATCH_ORDER {
            if !capabilities.contains(capability) {
                continue;
            }
            if let Some(handler) = self.handlers.get(&capability) {
                handler(ctx);
                return Some(capability);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_parse() {
        assert_eq!(Capability::parse("WORKBENCH"), Some(Capability::Workbench));
        assert_eq!(Capability::parse("ender_chest"), Some(Capability::EnderChest));
        assert_eq!(Capability::parse("enderchest"), Some(Capability::EnderChest));
        assert_eq!(Capability::parse("nope"), None);
    }

    #[test]
    fn test_dispatch_order_is_part_of_the_crate_api() {
        // Collaborators outside this crate rely on the published priority.
        assert_eq!(crate::DISPATCH_ORDER[0], Capability::Workbench);
        assert_eq!(
            *crate::DISPATCH_ORDER.last().unwrap(),
            Capability::Glowing
        );
    }

    #[test]
    fn test_parse_tokens_skips_unknown() {
        let set = CapabilitySet::parse_tokens(["glowing", "bogus", "anvil"]);
        assert!(set.contains(Capability::Glowing));
        assert!(set.contains(Capability::Anvil));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_dispatch_fires_first_in_priority_order() {
        let mut handlers = CapabilityHandlers::<Vec<&'static str>>::new();
        handlers.register(Capability::Lightable, |log| log.push("lightable"));
        handlers.register(Capability::Anvil, |log| log.push("anvil"));

        // Anvil outranks lightable in dispatch order even though the set
        // stores them in enum order.
        let set: CapabilitySet = [Capability::Lightable, Capability::Anvil]
            .into_iter()
            .collect();
        let mut log = Vec::new();
        let handled = handlers.dispatch(&set, &mut log);
        assert_eq!(handled, Some(Capability::Anvil));
        assert_eq!(log, vec!["anvil"]);
    }

    #[test]
    fn test_dispatch_without_handler_falls_through() {
        let handlers = CapabilityHandlers::<()>::new();
        let set: CapabilitySet = [Capability::Workbench].into_iter().collect();
        assert_eq!(handlers.dispatch(&set, &mut ()), None);
    }
}
