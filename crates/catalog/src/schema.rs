//! Declarative pack schema and loading.
//!
//! A packs root contains one directory per pack, each with an optional
//! `pack.json` manifest (enablement + deterministic ordering) and a
//! `trinkets.json` definition file. Strict loading errors on any malformed
//! source so a failed reload can keep the previous snapshot live; lenient
//! loading warns and skips, for startup paths that must come up regardless.

use crate::CatalogError;
use crate::definition::{DropRule, IngredientSpec, ItemSpec, TrinketDef};
use crate::recipe::{CutterRecipe, ShapedRecipe, ShapelessRecipe};
use base64::Engine;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use trinketforge_core::{fingerprint_from_url, CapabilitySet, Material, ToolCategory};

/// Pack manifest file name.
pub const PACK_MANIFEST_FILE: &str = "pack.json";

/// Definition file name inside a pack directory.
pub const TRINKET_FILE: &str = "trinkets.json";

/// Pack manifest controlling enablement and load order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PackManifest {
    /// Human-friendly pack name (defaults to the directory name).
    pub name: Option<String>,
    /// Optional description, purely informational.
    pub description: Option<String>,
    /// If false, the pack is ignored.
    pub enabled: bool,
    /// Deterministic pack load ordering (lower loads earlier).
    pub priority: i32,
}

impl Default for PackManifest {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            enabled: true,
            priority: 0,
        }
    }
}

/// A pack directory found under the packs root.
#[derive(Debug, Clone)]
pub struct DiscoveredPack {
    /// Pack id (directory name), also the implicit leading tag.
    pub id: String,
    /// Pack directory.
    pub dir: PathBuf,
    /// Parsed (or defaulted) manifest.
    pub manifest: PackManifest,
}

/// Exclusion filters applied while loading.
#[derive(Debug, Clone, Default)]
pub struct LoadFilters {
    /// Tags to exclude; a parent tag excludes all of its children.
    pub excluded_tags: BTreeSet<String>,
    /// Individual definition ids to exclude.
    pub excluded_ids: BTreeSet<String>,
}

impl LoadFilters {
    /// Whether a tag is excluded, directly or through its parent segment.
    pub fn is_tag_excluded(&self, tag: &str) -> bool {
        if self.excluded_tags.contains(tag) {
            return true;
        }
        match tag.split_once('/') {
            Some((parent, _)) => self.excluded_tags.contains(parent),
            None => false,
        }
    }
}

/// Decoded visual-identity reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureInfo {
    /// Skin URL extracted from the profile blob.
    pub url: String,
    /// Stable fingerprint (last URL path segment).
    pub fingerprint: String,
}

/// Decode a base64 profile blob into its skin URL and fingerprint.
///
/// The blob is base64 over `{"textures":{"SKIN":{"url":...}}}` JSON, as the
/// host world format stores it.
pub fn decode_texture(blob: &str) -> Option<TextureInfo> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(blob.trim())
        .ok()?;
    let value: serde_json::Value = serde_json::from_slice(&decoded).ok()?;
    let url = value.get("textures")?.get("SKIN")?.get("url")?.as_str()?;
    let fingerprint = fingerprint_from_url(url)?;
    Some(TextureInfo {
        url: url.to_string(),
        fingerprint: fingerprint.to_string(),
    })
}

fn read_manifest(pack_dir: &Path, pack_id: &str) -> Result<PackManifest, CatalogError> {
    let manifest_path = pack_dir.join(PACK_MANIFEST_FILE);
    let mut manifest = if !manifest_path.exists() {
        PackManifest::default()
    } else {
        let contents = fs::read_to_string(&manifest_path).map_err(|source| CatalogError::Io {
            path: manifest_path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
            path: manifest_path.display().to_string(),
            source,
        })?
    };

    if manifest.name.as_deref().unwrap_or("").is_empty() {
        manifest.name = Some(pack_id.to_string());
    }
    Ok(manifest)
}

fn discover_pack_dirs(root: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(CatalogError::Io {
                path: root.display().to_string(),
                source,
            })
        }
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CatalogError::Io {
            path: root.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn sort_packs(packs: &mut [DiscoveredPack]) {
    packs.sort_by(|a, b| {
        a.manifest
            .priority
            .cmp(&b.manifest.priority)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Discover packs under the root; errors on any unreadable manifest.
pub fn discover_packs_strict(root: &Path) -> Result<Vec<DiscoveredPack>, CatalogError> {
    let mut packs = Vec::new();
    for dir in discover_pack_dirs(root)? {
        let id = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.display().to_string());
        let manifest = read_manifest(&dir, &id)?;
        if !manifest.enabled {
            continue;
        }
        packs.push(DiscoveredPack { id, dir, manifest });
    }
    sort_packs(&mut packs);
    Ok(packs)
}

/// Discover packs under the root; packs with invalid manifests are skipped
/// with a warning.
pub fn discover_packs_lenient(root: &Path) -> Vec<DiscoveredPack> {
    let dirs = match discover_pack_dirs(root) {
        Ok(dirs) => dirs,
        Err(err) => {
            warn!("Failed to scan packs dir {}: {err}", root.display());
            return Vec::new();
        }
    };

    let mut packs = Vec::new();
    for dir in dirs {
        let id = dir
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| dir.display().to_string());
        let manifest = match read_manifest(&dir, &id) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!("Skipping pack {} due to invalid manifest: {err}", dir.display());
                continue;
            }
        };
        if !manifest.enabled {
            continue;
        }
        packs.push(DiscoveredPack { id, dir, manifest });
    }
    sort_packs(&mut packs);
    packs
}

// Serde schema for trinkets.json.

fn default_amount() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TrinketFile {
    #[serde(default)]
    trinkets: Vec<TrinketEntry>,
}

#[derive(Debug, Deserialize)]
struct TrinketEntry {
    id: String,
    texture: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    lore: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    recipes: RecipeSection,
    #[serde(default)]
    drops: Vec<DropRuleEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct RecipeSection {
    #[serde(default)]
    shaped: Vec<ShapedEntry>,
    #[serde(default)]
    shapeless: Vec<ShapelessEntry>,
    #[serde(default)]
    cutting: Vec<CutterEntry>,
}

#[derive(Debug, Deserialize)]
struct ShapedEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default = "default_amount")]
    amount: u32,
    pattern: Vec<String>,
    #[serde(default)]
    key: BTreeMap<String, IngredientEntry>,
}

#[derive(Debug, Deserialize)]
struct ShapelessEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default = "default_amount")]
    amount: u32,
    ingredients: Vec<IngredientEntry>,
}

#[derive(Debug, Deserialize)]
struct CutterEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default = "default_amount")]
    amount: u32,
    input: IngredientEntry,
}

#[derive(Debug, Default, Deserialize)]
struct IngredientEntry {
    #[serde(default)]
    material: Option<String>,
    #[serde(default)]
    trinket: Option<String>,
}

impl IngredientEntry {
    /// Convert to a spec. An unparseable material token degrades to the
    /// unsatisfiable barrier spec (match-time false, not a load error).
    fn to_spec(&self, context_id: &str) -> IngredientSpec {
        let material = self.material.as_deref().and_then(|token| {
            let parsed = Material::parse(token);
            if parsed.is_none() {
                warn!("'{context_id}': ignoring unparseable material token '{token}'");
            }
            parsed
        });
        IngredientSpec {
            material,
            trinket: self.trinket.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DropRuleEntry {
    #[serde(default)]
    when: Option<WhenEntry>,
    #[serde(default)]
    drops: Vec<DropEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct WhenEntry {
    #[serde(default)]
    silk_touch: Option<bool>,
    #[serde(default)]
    tool: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DropEntry {
    #[serde(default)]
    trinket: Option<String>,
    #[serde(default)]
    material: Option<String>,
    #[serde(default = "default_amount")]
    amount: u32,
}

fn convert_entry(
    entry: TrinketEntry,
    implicit_tag: &str,
    source_name: &str,
) -> Result<TrinketDef, CatalogError> {
    let texture = decode_texture(&entry.texture).ok_or_else(|| CatalogError::InvalidTexture {
        id: entry.id.clone(),
        source_name: source_name.to_string(),
    })?;

    // Implicit pack tag first, then declared tags, deduplicated in order.
    let mut tags = vec![implicit_tag.to_string()];
    for tag in entry.tags {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let capabilities =
        CapabilitySet::parse_tokens(entry.capabilities.iter().map(String::as_str));

    let id = entry.id;
    let shaped = entry
        .recipes
        .shaped
        .into_iter()
        .map(|r| {
            let recipe_id = r.id.unwrap_or_else(|| format!("{id}_shaped"));
            let key = r
                .key
                .into_iter()
                .filter_map(|(token, ingredient)| {
                    let mut chars = token.chars();
                    let ch = chars.next()?;
                    if chars.next().is_some() {
                        warn!("'{id}': ignoring multi-character pattern key '{token}'");
                        return None;
                    }
                    Some((ch, ingredient.to_spec(&id)))
                })
                .collect();
            ShapedRecipe::new(recipe_id, id.clone(), r.amount, r.pattern, key)
        })
        .collect();

    let shapeless = entry
        .recipes
        .shapeless
        .into_iter()
        .map(|r| {
            let recipe_id = r.id.unwrap_or_else(|| format!("{id}_shapeless"));
            let ingredients = r.ingredients.iter().map(|i| i.to_spec(&id)).collect();
            ShapelessRecipe::new(recipe_id, id.clone(), r.amount, ingredients)
        })
        .collect();

    let cutting = entry
        .recipes
        .cutting
        .into_iter()
        .map(|r| {
            let recipe_id = r.id.unwrap_or_else(|| format!("{id}_cut"));
            CutterRecipe::new(recipe_id, id.clone(), r.amount, r.input.to_spec(&id))
        })
        .collect();

    let drop_rules = entry
        .drops
        .into_iter()
        .map(|rule| {
            let when = rule.when.unwrap_or_default();
            let tool = when.tool.as_deref().and_then(ToolCategory::parse);
            let drops = rule
                .drops
                .into_iter()
                .map(|d| ItemSpec {
                    trinket: d.trinket,
                    material: d.material.as_deref().and_then(Material::parse),
                    amount: d.amount.max(1),
                })
                .collect();
            DropRule {
                silk_touch: when.silk_touch,
                tool,
                drops,
            }
        })
        .collect();

    Ok(TrinketDef {
        name: entry.name.unwrap_or_else(|| id.clone()),
        id,
        lore: entry.lore,
        tags,
        capabilities,
        texture_url: texture.url,
        texture_fingerprint: texture.fingerprint,
        shaped,
        shapeless,
        cutting,
        drop_rules,
    })
}

fn load_pack_file(
    pack: &DiscoveredPack,
    filters: &LoadFilters,
    strict: bool,
) -> Result<Vec<TrinketDef>, CatalogError> {
    let path = pack.dir.join(TRINKET_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }

    let contents = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: TrinketFile = serde_json::from_str(&contents).map_err(|source| CatalogError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    let source_name = path.display().to_string();
    let mut defs = Vec::new();
    for entry in file.trinkets {
        if filters.excluded_ids.contains(&entry.id) {
            continue;
        }
        match convert_entry(entry, &pack.id, &source_name) {
            Ok(def) => defs.push(def),
            Err(err) if strict => return Err(err),
            Err(err) => warn!("Skipping definition: {err}"),
        }
    }
    Ok(defs)
}

/// Load every enabled pack under the root; any malformed source is an
/// error and nothing is returned (the caller keeps its previous snapshot).
pub fn load_packs_strict(root: &Path, filters: &LoadFilters) -> Result<Vec<TrinketDef>, CatalogError> {
    let mut defs = Vec::new();
    for pack in discover_packs_strict(root)? {
        if filters.is_tag_excluded(&pack.id) {
            continue;
        }
        defs.extend(load_pack_file(&pack, filters, true)?);
    }
    Ok(defs)
}

/// Load every enabled pack under the root, skipping malformed packs and
/// definitions with warnings.
pub fn load_packs_lenient(root: &Path, filters: &LoadFilters) -> Vec<TrinketDef> {
    let mut defs = Vec::new();
    for pack in discover_packs_lenient(root) {
        if filters.is_tag_excluded(&pack.id) {
            continue;
        }
        match load_pack_file(&pack, filters, false) {
            Ok(pack_defs) => defs.extend(pack_defs),
            Err(err) => warn!("Skipping pack {}: {err}", pack.dir.display()),
        }
    }
    defs
}
