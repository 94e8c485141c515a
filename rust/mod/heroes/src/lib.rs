//! Hero catalog: the store, its change events and HTTP loading tracking.
//!
//! [`HeroesModule`] wires the parts from an [`AppConfig`]; each part is also
//! usable on its own.

pub mod error;
pub mod events;
pub mod interceptor;
pub mod loading;
pub mod model;
pub mod seed;
pub mod state;
pub mod store;

use std::sync::Arc;

use heroes_core::AppConfig;
use heroes_kv::KVStore;
use tracing::info;

pub use error::HeroError;
pub use events::{EventsService, HeroEvent, HeroEventKind};
pub use interceptor::{LoadingInterceptor, SKIP_LOADER_HEADER, skips_loader};
pub use loading::LoadingService;
pub use model::{Hero, HeroId, NewHero, Publisher};
pub use seed::load_seed;
pub use state::{FilteredHeroes, HeroState, Pagination};
pub use store::HeroStore;

/// The Heroes module: catalog store, change events and loading tracking.
///
/// Construct once per process and share the parts behind `Arc`.
pub struct HeroesModule {
    store: Arc<HeroStore>,
    events: Arc<EventsService>,
    loading: Arc<LoadingService>,
    interceptor: LoadingInterceptor,
}

impl HeroesModule {
    /// Wire the module from configuration.
    ///
    /// With `kv` present the store follows `config.platform`; without it the
    /// store keeps state in memory only.
    pub fn new(config: &AppConfig, kv: Option<Arc<dyn KVStore>>, seed: Vec<Hero>) -> Self {
        let store = match kv {
            Some(kv) => HeroStore::with_storage(&config.store, config.platform, kv, seed),
            None => HeroStore::new(&config.store, seed),
        };
        let loading = Arc::new(LoadingService::new(config.loading.mode));
        let interceptor =
            LoadingInterceptor::new(Arc::clone(&loading), config.min_loading_duration());

        info!(
            platform = %config.platform,
            persistent = store.is_persistent(),
            heroes = store.heroes().len(),
            "heroes module ready"
        );

        Self {
            store: Arc::new(store),
            events: Arc::new(EventsService::new()),
            loading,
            interceptor,
        }
    }

    pub fn store(&self) -> &Arc<HeroStore> {
        &self.store
    }

    pub fn events(&self) -> &Arc<EventsService> {
        &self.events
    }

    pub fn loading(&self) -> &Arc<LoadingService> {
        &self.loading
    }

    pub fn interceptor(&self) -> &LoadingInterceptor {
        &self.interceptor
    }

    /// Add a hero and announce it.
    pub fn create(&self, hero: NewHero) -> Result<Hero, HeroError> {
        let hero = self.store.add_hero(hero)?;
        self.events.emit(HeroEvent::created(hero.clone()));
        Ok(hero)
    }

    /// Replace a hero and announce it. Returns false for an unknown id.
    pub fn update(&self, hero: Hero) -> bool {
        let applied = self.store.update_hero(hero.clone());
        if applied {
            self.events.emit(HeroEvent::updated(hero));
        }
        applied
    }

    /// Remove a hero and announce it.
    pub fn delete(&self, id: HeroId) -> Option<Hero> {
        let removed = self.store.delete_hero(id)?;
        self.events.emit(HeroEvent::deleted(removed.clone()));
        Some(removed)
    }
}
