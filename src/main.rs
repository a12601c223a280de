//! Pack inspector for trinketforge catalogs.
//!
//! Loads a packs directory the same way an embedding host would and reports
//! on it: strict validation for CI, definition listings, and the host recipe
//! keys a reload would register.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use trinketforge_catalog::{discover_packs_strict, load_packs_strict, LoadFilters, TrinketRegistry};
use trinketforge_engine::CatalogSnapshot;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and validate trinket pack directories", long_about = None)]
struct Args {
    /// Directory containing pack subdirectories
    #[arg(short, long, default_value = "packs")]
    packs: PathBuf,

    /// Definition ids to exclude from loading
    #[arg(long)]
    exclude_id: Vec<String>,

    /// Tags to exclude from loading (a parent tag excludes its children)
    #[arg(long)]
    exclude_tag: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Strictly load every pack and fail on the first malformed source
    Validate,
    /// List loaded definitions with their tags and recipe counts
    List,
    /// Print the host recipe keys a reload would register
    Recipes,
}

fn main() -> Result<()> {
    // WARN by default; override via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let filters = LoadFilters {
        excluded_ids: args.exclude_id.iter().cloned().collect(),
        excluded_tags: args.exclude_tag.iter().cloned().collect(),
    };

    if !args.packs.is_dir() {
        bail!("packs directory {} does not exist", args.packs.display());
    }

    match args.command {
        Command::Validate => validate(&args.packs, &filters),
        Command::List => list(&args.packs, &filters),
        Command::Recipes => recipes(&args.packs, &filters),
    }
}

fn load_registry(packs: &PathBuf, filters: &LoadFilters) -> Result<TrinketRegistry> {
    let definitions = load_packs_strict(packs, filters)
        .with_context(|| format!("failed to load packs from {}", packs.display()))?;
    tracing::info!(count = definitions.len(), "loaded definitions");
    TrinketRegistry::build(definitions).context("failed to build definition table")
}

fn validate(packs: &PathBuf, filters: &LoadFilters) -> Result<()> {
    let discovered = discover_packs_strict(packs)?;
    let registry = load_registry(packs, filters)?;
    println!(
        "ok: {} pack(s), {} definition(s), {} tag(s)",
        discovered.len(),
        registry.len(),
        registry.tags().count()
    );
    Ok(())
}

fn list(packs: &PathBuf, filters: &LoadFilters) -> Result<()> {
    let registry = load_registry(packs, filters)?;
    for def in registry.iter() {
        let recipe_count = def.shaped.len() + def.shapeless.len() + def.cutting.len();
        println!(
            "{:<32} tags=[{}] recipes={} drop_rules={}",
            def.id,
            def.tags.join(","),
            recipe_count,
            def.drop_rules.len()
        );
    }
    Ok(())
}

fn recipes(packs: &PathBuf, filters: &LoadFilters) -> Result<()> {
    let definitions = load_packs_strict(packs, filters)
        .with_context(|| format!("failed to load packs from {}", packs.display()))?;
    let snapshot = CatalogSnapshot::build(definitions).context("failed to build snapshot")?;
    for recipe in &snapshot.host_recipes {
        println!("{}", recipe.key());
    }
    println!("{} host recipe(s)", snapshot.host_recipes.len());
    Ok(())
}
