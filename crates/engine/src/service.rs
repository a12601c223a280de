//! Atomic catalog snapshots and reload coordination.
//!
//! Matchers and resolvers run against an immutable [`CatalogSnapshot`]
//! behind an [`ArcSwap`]: readers grab a reference and keep it for the whole
//! event, so a mid-event reload can never expose a half-built table. The
//! expensive part of a reload (parsing, registry build, host record
//! flattening) is pure and can run off the event thread; only the swap and
//! the host (de)registration drain belong on it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use trinketforge_catalog::{CatalogError, TrinketDef, TrinketRegistry};

use crate::cutter::{collect_cutter_links, CutterLink};
use crate::registration::{collect_host_recipes, HostRecipe};
use crate::EngineError;

/// Host (de)registration operations applied per scheduling tick; keeps a
/// multi-thousand-recipe reload from stalling the event loop.
pub const SYNC_BATCH_SIZE: usize = 50;

/// One immutable view of the loaded catalog.
#[derive(Debug)]
pub struct CatalogSnapshot {
    /// The definition table and its indices.
    pub registry: TrinketRegistry,
    /// Host recipe records derived from the registry, in registration order.
    pub host_recipes: Vec<HostRecipe>,
    /// Definition-keyed cutter links served engine-side.
    pub cutter_links: Vec<CutterLink>,
}

impl CatalogSnapshot {
    /// Build a snapshot from loaded definitions. Pure; safe to run off the
    /// event thread.
    pub fn build(definitions: Vec<TrinketDef>) -> Result<Self, CatalogError> {
        let registry = TrinketRegistry::build(definitions)?;
        let host_recipes = collect_host_recipes(&registry);
        let cutter_links = collect_cutter_links(&registry);
        Ok(Self {
            registry,
            host_recipes,
            cutter_links,
        })
    }

    /// A snapshot with no definitions, the service's initial state.
    pub fn empty() -> Self {
        Self {
            registry: TrinketRegistry::default(),
            host_recipes: Vec::new(),
            cutter_links: Vec::new(),
        }
    }
}

/// Owns the live snapshot and serializes reloads.
#[derive(Debug)]
pub struct CatalogService {
    current: ArcSwap<CatalogSnapshot>,
    reloading: AtomicBool,
}

impl CatalogService {
    /// Start the service on an initial snapshot.
    pub fn new(initial: CatalogSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            reloading: AtomicBool::new(false),
        }
    }

    /// Start the service empty; the first reload populates it.
    pub fn empty() -> Self {
        Self::new(CatalogSnapshot::empty())
    }

    /// The current snapshot. Callers hold the returned `Arc` for the whole
    /// event so every query within it sees one consistent catalog.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    /// Claim the reload slot. Fails while another reload's registration
    /// sync has not finished draining; reloads are serialized, never
    /// interleaved, because (de)registration batches share the host's
    /// recipe-key namespace.
    pub fn begin_reload(&self) -> Result<ReloadGuard<'_>, EngineError> {
        if self
            .reloading
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(EngineError::ReloadInProgress);
        }
        Ok(ReloadGuard { service: self })
    }
}

/// Exclusive permission to commit one reload. Dropping the guard without
/// committing abandons the reload and frees the slot.
#[derive(Debug)]
pub struct ReloadGuard<'a> {
    service: &'a CatalogService,
}

impl<'a> ReloadGuard<'a> {
    /// Swap in the new snapshot and produce the host registration sync.
    ///
    /// The swap is atomic: readers loading after this call see the new
    /// catalog in full, readers holding the old `Arc` finish their event on
    /// the old one. Must run on the serial event thread, together with the
    /// batch drain of the returned sync.
    pub fn commit(self, next: CatalogSnapshot) -> RegistrationSync<'a> {
        let previous = self.service.current.swap(Arc::new(next));
        let current = self.service.current.load();

        let unregister = previous
            .host_recipes
            .iter()
            .map(|recipe| recipe.key().to_string())
            .collect();
        let register = current.host_recipes.iter().cloned().collect();

        RegistrationSync {
            _guard: self,
            unregister,
            register,
        }
    }
}

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.service.reloading.store(false, Ordering::Release);
    }
}

/// Pending host (de)registration work for one committed reload.
///
/// Drain it with [`next_batch`](Self::next_batch), one batch per scheduling
/// tick. The reload slot stays claimed until this value is dropped, so a
/// second reload cannot start while batches are outstanding.
#[derive(Debug)]
pub struct RegistrationSync<'a> {
    _guard: ReloadGuard<'a>,
    unregister: VecDeque<String>,
    register: VecDeque<HostRecipe>,
}

/// One tick's worth of host operations. Unregistrations always drain before
/// registrations so a re-used key is never registered twice.
#[derive(Debug, Default)]
pub struct SyncBatch {
    /// Keys to unregister this tick.
    pub unregister: Vec<String>,
    /// Recipes to register this tick.
    pub register: Vec<HostRecipe>,
}

impl RegistrationSync<'_> {
    /// Host operations not yet handed out.
    pub fn remaining(&self) -> usize {
        self.unregister.len() + self.register.len()
    }

    /// Whether every operation has been handed out.
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Take up to [`SYNC_BATCH_SIZE`] operations, or `None` when drained.
    pub fn next_batch(&mut self) -> Option<SyncBatch> {
        if self.is_complete() {
            return None;
        }
        let mut batch = SyncBatch::default();
        let mut budget = SYNC_BATCH_SIZE;

        while budget > 0 {
            let Some(key) = self.unregister.pop_front() else {
                break;
            };
            batch.unregister.push(key);
            budget -= 1;
        }
        while budget > 0 {
            let Some(recipe) = self.register.pop_front() else {
                break;
            };
            batch.register.push(recipe);
            budget -= 1;
        }
        Some(batch)
    }
}
