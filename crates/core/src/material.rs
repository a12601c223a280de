//! Material kinds and tool classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized material-kind token (e.g. `STONE`, `COAL`, `PLAYER_HEAD`).
///
/// Tokens are trimmed and uppercased on construction so that equality is
/// exact on the normalized form regardless of how pack files spell them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Material(String);

/// The material kind used for all engine-constructed items.
pub const PLAYER_HEAD: &str = "PLAYER_HEAD";

impl Material {
    /// Parse a material token. Empty or whitespace-only tokens are rejected.
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token.trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return None;
        }
        Some(Self(normalized))
    }

    /// The material kind carried by engine-constructed items.
    pub fn player_head() -> Self {
        Self(PLAYER_HEAD.to_string())
    }

    /// Whether this is the engine's own item kind.
    pub fn is_player_head(&self) -> bool {
        self.0 == PLAYER_HEAD
    }

    /// The normalized token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tool classification used by drop-rule conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolCategory {
    /// Pickaxes of any tier.
    Pickaxe,
    /// Axes of any tier.
    Axe,
    /// Shovels of any tier.
    Shovel,
    /// Hoes of any tier.
    Hoe,
    /// Shears (no tiers).
    Shears,
}

impl ToolCategory {
    /// Classify a material by its name. Materials that are not recognized
    /// tools (bare hand, swords, blocks) classify as `None`.
    pub fn from_material(material: &Material) -> Option<Self> {
        let name = material.as_str();
        if name.ends_with("_PICKAXE") {
            return Some(ToolCategory::Pickaxe);
        }
        if name.ends_with("_AXE") {
            return Some(ToolCategory::Axe);
        }
        if name.ends_with("_SHOVEL") {
            return Some(ToolCategory::Shovel);
        }
        if name.ends_with("_HOE") {
            return Some(ToolCategory::Hoe);
        }
        if name == "SHEARS" {
            return Some(ToolCategory::Shears);
        }
        None
    }

    /// Parse a category from a config token (e.g. `pickaxe`).
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "pickaxe" => Some(ToolCategory::Pickaxe),
            "axe" => Some(ToolCategory::Axe),
            "shovel" => Some(ToolCategory::Shovel),
            "hoe" => Some(ToolCategory::Hoe),
            "shears" => Some(ToolCategory::Shears),
            _ => None,
        }
    }
}
