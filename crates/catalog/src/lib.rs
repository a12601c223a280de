#![warn(missing_docs)]
//! Definition catalog: data model, pack schema, registry, and recipe matchers.

mod definition;
mod recipe;
mod registry;
mod schema;

pub use definition::{DropRule, IngredientSpec, ItemSpec, TrinketDef};
pub use recipe::{grid_side, CutterRecipe, ShapedRecipe, ShapelessRecipe};
pub use registry::TrinketRegistry;
pub use schema::{
    decode_texture, discover_packs_lenient, discover_packs_strict, load_packs_lenient,
    load_packs_strict, DiscoveredPack, LoadFilters, PackManifest, TextureInfo,
    PACK_MANIFEST_FILE, TRINKET_FILE,
};

use thiserror::Error;

/// Errors emitted while loading packs or building the registry.
///
/// Only load-time problems are errors; matchers and resolvers are total
/// functions that report misses as `false`/`None`.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Wrap IO errors when reading pack files.
    #[error("failed to read pack file {path}: {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Wrap serde parsing issues.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Offending path.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// Two definitions declared the same id; the whole load is rejected.
    #[error("duplicate definition id '{id}' (second occurrence in {source_name})")]
    DuplicateId {
        /// The colliding id.
        id: String,
        /// Pack or file that declared the duplicate.
        source_name: String,
    },
    /// A definition's texture blob could not be decoded to a skin URL.
    #[error("definition '{id}' has an undecodable texture in {source_name}")]
    InvalidTexture {
        /// Offending definition id.
        id: String,
        /// Pack or file that declared it.
        source_name: String,
    },
}
