//! HeroStore: the single source of truth for the hero catalog.
//!
//! Holds the collection plus view state (filter, pagination, selection) in a
//! [`Signal`], derives the filtered page on read, and, on the browser
//! platform, mirrors the whole snapshot into local storage after every
//! applied change.

use std::sync::{Arc, Mutex};

use heroes_core::{Platform, StoreConfig};
use heroes_kv::KVStore;
use heroes_signal::{ReadSignal, Signal, SubscriptionId};
use tracing::{debug, info, warn};

use crate::error::HeroError;
use crate::model::{Hero, HeroId, NewHero};
use crate::state::{FilteredHeroes, HeroState, Pagination};

/// Local storage binding: one key, overwritten wholesale.
struct SnapshotStorage {
    kv: Arc<dyn KVStore>,
    key: String,
    /// Serializes writes so the stored snapshot never lags memory.
    write_lock: Mutex<()>,
}

impl SnapshotStorage {
    /// Read a previously persisted snapshot. Missing or undecodable values
    /// yield None.
    fn load(&self) -> Option<HeroState> {
        let raw = match self.kv.get_string(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, "failed to read stored hero state: {e}");
                return None;
            }
        };
        match HeroState::from_json(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(key = %self.key, "ignoring undecodable hero state: {e}");
                None
            }
        }
    }

    fn save(&self, state: &HeroState) {
        let result = state
            .to_json()
            .and_then(|json| self.kv.set(&self.key, json.as_bytes()).map_err(HeroError::from));
        if let Err(e) = result {
            warn!(key = %self.key, "failed to persist hero state: {e}");
        }
    }
}

pub struct HeroStore {
    state: Signal<HeroState>,
    storage: Option<SnapshotStorage>,
    strict: bool,
}

impl HeroStore {
    /// Create a store that never persists, starting from `seed`.
    pub fn new(config: &StoreConfig, seed: Vec<Hero>) -> Self {
        Self {
            state: Signal::new(HeroState::seeded(seed, config.items_per_page)),
            storage: None,
            strict: config.strict,
        }
    }

    /// Create a store bound to local storage.
    ///
    /// On [`Platform::Browser`] a snapshot stored under `config.storage_key`
    /// replaces the seed, and the resulting state is written back
    /// immediately. On [`Platform::Server`] `kv` is ignored.
    pub fn with_storage(
        config: &StoreConfig,
        platform: Platform,
        kv: Arc<dyn KVStore>,
        seed: Vec<Hero>,
    ) -> Self {
        if platform.is_server() {
            debug!("server platform, hero state is not persisted");
            return Self::new(config, seed);
        }

        let storage = SnapshotStorage {
            kv,
            key: config.storage_key.clone(),
            write_lock: Mutex::new(()),
        };
        let initial = match storage.load() {
            Some(mut restored) => {
                if restored.pagination.items_per_page == 0 {
                    restored.pagination.items_per_page = config.items_per_page;
                }
                info!(
                    heroes = restored.heroes.len(),
                    "restored hero state from local storage"
                );
                restored
            }
            None => HeroState::seeded(seed, config.items_per_page),
        };
        storage.save(&initial);

        Self {
            state: Signal::new(initial),
            storage: Some(storage),
            strict: config.strict,
        }
    }

    /// Whether changes are mirrored into local storage.
    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    // ====================================================================
    // Mutations
    // ====================================================================

    /// Validate and append a new hero, assigning the next id.
    pub fn add_hero(&self, candidate: NewHero) -> Result<Hero, HeroError> {
        if candidate.is_missing_required() {
            return Err(HeroError::missing_required_fields());
        }
        if self.strict {
            candidate.validate_strict()?;
        }

        let hero = self.mutate(move |state| {
            let hero = candidate.into_hero(state.next_id());
            state.heroes.push(hero.clone());
            state.sync_total_items();
            hero
        });
        debug!(id = hero.id, name = %hero.name, "hero added");
        Ok(hero)
    }

    /// Replace the hero with the same id. Returns false (and changes
    /// nothing) when no such hero exists.
    pub fn update_hero(&self, hero: Hero) -> bool {
        let id = hero.id;
        let applied = self.mutate_if(move |state| {
            let Some(slot) = state.heroes.iter_mut().find(|h| h.id == hero.id) else {
                return false;
            };
            if state.selected_hero.as_ref().is_some_and(|s| s.id == hero.id) {
                state.selected_hero = Some(hero.clone());
            }
            *slot = hero;
            true
        });
        debug!(id, applied, "hero update");
        applied
    }

    /// Remove the hero with `id`, returning it. Deleting an unknown id is a
    /// no-op.
    pub fn delete_hero(&self, id: HeroId) -> Option<Hero> {
        let mut removed = None;
        self.mutate_if(|state| {
            let Some(pos) = state.heroes.iter().position(|h| h.id == id) else {
                return false;
            };
            removed = Some(state.heroes.remove(pos));
            if state.selected_hero.as_ref().is_some_and(|s| s.id == id) {
                state.selected_hero = None;
            }
            state.sync_total_items();
            true
        });
        debug!(id, removed = removed.is_some(), "hero delete");
        removed
    }

    pub fn set_selected_hero(&self, hero: Option<Hero>) {
        self.mutate(|state| state.selected_hero = hero);
    }

    /// Set the filter text. Always returns to the first page.
    pub fn set_filter(&self, filter: impl Into<String>) {
        let filter = filter.into();
        self.mutate(|state| {
            state.filter = filter;
            state.pagination.current_page = 0;
        });
    }

    pub fn update_pagination(&self, current_page: usize) {
        self.mutate(|state| state.pagination.current_page = current_page);
    }

    /// Clear the filter and return to the first page.
    pub fn reset_filters(&self) {
        self.mutate(|state| {
            state.filter.clear();
            state.pagination.current_page = 0;
        });
    }

    // ====================================================================
    // Reads
    // ====================================================================

    pub fn get_hero(&self, id: HeroId) -> Option<Hero> {
        self.state.with(|state| state.find(id).cloned())
    }

    /// Current page of filter matches, recomputed from the latest state.
    pub fn filtered_heroes(&self) -> FilteredHeroes {
        self.state.with(HeroState::filtered)
    }

    pub fn heroes(&self) -> Vec<Hero> {
        self.state.with(|state| state.heroes.clone())
    }

    pub fn loading(&self) -> bool {
        self.state.with(|state| state.loading)
    }

    pub fn selected_hero(&self) -> Option<Hero> {
        self.state.with(|state| state.selected_hero.clone())
    }

    pub fn filter(&self) -> String {
        self.state.with(|state| state.filter.clone())
    }

    pub fn pagination(&self) -> Pagination {
        self.state.with(|state| state.pagination)
    }

    /// The whole state (Arc clone, no data copy).
    pub fn snapshot(&self) -> Arc<HeroState> {
        self.state.get()
    }

    // ====================================================================
    // Subscriptions
    // ====================================================================

    /// Read-only view of the state signal for presentation code.
    pub fn signal(&self) -> ReadSignal<HeroState> {
        self.state.read_only()
    }

    /// Called synchronously after every applied change.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&HeroState) + Send + Sync + 'static,
    {
        self.state.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn mutate<R>(&self, f: impl FnOnce(&mut HeroState) -> R) -> R {
        let out = self.state.update(f);
        self.persist();
        out
    }

    fn mutate_if(&self, f: impl FnOnce(&mut HeroState) -> bool) -> bool {
        let applied = self.state.update_if(f);
        if applied {
            self.persist();
        }
        applied
    }

    /// Write the latest state. The snapshot is read after taking the write
    /// lock, so whichever save runs last stores the newest state.
    fn persist(&self) {
        if let Some(storage) = &self.storage {
            let _guard = storage.write_lock.lock().unwrap();
            storage.save(&self.state.get());
        }
    }
}
