//! Crafting, drop, and host-registration engine over a trinket catalog.
//!
//! The catalog crate owns the data model and the matchers; this crate turns a
//! loaded registry into concrete behavior: constructing output items,
//! resolving destruction drops, enumerating cutter choices, and keeping the
//! host crafting system's registrations in sync across atomic catalog
//! reloads.

#![warn(missing_docs)]

mod cutter;
mod drops;
mod item;
mod registration;
mod service;

pub use cutter::{collect_cutter_links, cutter_candidates, CutterLink};
pub use drops::compute_drops;
pub use item::{make_item, realize_spec};
pub use registration::{collect_host_recipes, HostChoice, HostRecipe};
pub use service::{
    CatalogService, CatalogSnapshot, RegistrationSync, ReloadGuard, SyncBatch, SYNC_BATCH_SIZE,
};

use thiserror::Error;

/// Errors surfaced by the reload coordinator.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A reload was requested while another reload's host sync is still
    /// draining; the caller should retry after the current sync finishes.
    #[error("a catalog reload is already in progress")]
    ReloadInProgress,
}
