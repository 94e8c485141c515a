//! Store state and the derived filtered/paginated view.

use heroes_core::config::DEFAULT_ITEMS_PER_PAGE;
use serde::{Deserialize, Serialize};

use crate::error::HeroError;
use crate::model::{Hero, HeroId};

/// Everything the hero store owns. This is also the persisted snapshot
/// format: one JSON object under the storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroState {
    pub heroes: Vec<Hero>,
    /// Transient. Always false after a restore.
    pub loading: bool,
    pub selected_hero: Option<Hero>,
    pub filter: String,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    /// Zero-based.
    pub current_page: usize,
    pub items_per_page: usize,
    pub total_items: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 0,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            total_items: 0,
        }
    }
}

/// One page of filter matches plus the match count before slicing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredHeroes {
    pub heroes: Vec<Hero>,
    pub total_filtered: usize,
}

impl FilteredHeroes {
    pub fn page_count(&self, items_per_page: usize) -> usize {
        if items_per_page == 0 {
            return 0;
        }
        self.total_filtered.div_ceil(items_per_page)
    }
}

impl Default for HeroState {
    fn default() -> Self {
        Self::seeded(Vec::new(), DEFAULT_ITEMS_PER_PAGE)
    }
}

impl HeroState {
    pub fn seeded(heroes: Vec<Hero>, items_per_page: usize) -> Self {
        let total_items = heroes.len();
        Self {
            heroes,
            loading: false,
            selected_hero: None,
            filter: String::new(),
            pagination: Pagination {
                current_page: 0,
                items_per_page,
                total_items,
            },
        }
    }

    /// `max(existing ids ∪ {0}) + 1`.
    pub fn next_id(&self) -> HeroId {
        self.heroes.iter().map(|h| h.id).max().unwrap_or(0) + 1
    }

    pub fn find(&self, id: HeroId) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.id == id)
    }

    /// Keep `total_items` equal to the collection size.
    pub fn sync_total_items(&mut self) {
        self.pagination.total_items = self.heroes.len();
    }

    /// Apply the filter, then slice the current page out of the matches.
    pub fn filtered(&self) -> FilteredHeroes {
        let needle = self.filter.to_lowercase();
        let matches: Vec<&Hero> = if needle.is_empty() {
            self.heroes.iter().collect()
        } else {
            self.heroes.iter().filter(|h| h.matches(&needle)).collect()
        };

        let per_page = self.pagination.items_per_page;
        let start = self.pagination.current_page.saturating_mul(per_page);
        FilteredHeroes {
            total_filtered: matches.len(),
            heroes: matches
                .into_iter()
                .skip(start)
                .take(per_page)
                .cloned()
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, HeroError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a persisted snapshot. `loading` is forced to false and
    /// `total_items` is recomputed from the restored collection.
    pub fn from_json(raw: &str) -> Result<Self, HeroError> {
        let mut state: HeroState = serde_json::from_str(raw)?;
        state.loading = false;
        state.sync_total_items();
        Ok(state)
    }
}
