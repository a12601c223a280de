//! Opaque item instances crossing the host boundary.

use crate::Material;
use serde::{Deserialize, Serialize};

/// A snapshot of an item instance as presented by the host environment.
///
/// This is the engine's only view of an item: a material kind, a count, and
/// whatever identity evidence survived the host's serialization round-trip.
/// `definition_tag` is written by the engine whenever it constructs an item
/// and is authoritative when present; `texture_url` supports the fallback
/// fingerprint lookup for items produced before a reload or by other code
/// paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    /// Material kind of the item.
    pub material: Material,
    /// Stack count.
    pub count: u32,
    /// Embedded definition id, set when this engine produced the item.
    pub definition_tag: Option<String>,
    /// External visual-identity reference (skin URL).
    pub texture_url: Option<String>,
    /// Display name, possibly with inline color markup (opaque here).
    pub name: Option<String>,
    /// Lore lines.
    pub lore: Vec<String>,
}

impl ItemSnapshot {
    /// A plain item of the given material with no identity evidence.
    pub fn of_material(material: Material, count: u32) -> Self {
        Self {
            material,
            count: count.max(1),
            definition_tag: None,
            texture_url: None,
            name: None,
            lore: Vec::new(),
        }
    }

    /// The visual-identity fingerprint, if a texture reference is present.
    pub fn texture_fingerprint(&self) -> Option<&str> {
        self.texture_url.as_deref().and_then(fingerprint_from_url)
    }
}

/// Derive the stable fingerprint from a skin URL: its last path segment.
pub fn fingerprint_from_url(url: &str) -> Option<&str> {
    let idx = url.rfind('/')?;
    let rest = &url[idx + 1..];
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}
