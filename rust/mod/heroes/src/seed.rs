//! Initial hero collection loaded from a JSON file.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{HeroError, MISSING_REQUIRED_FIELDS};
use crate::model::{Hero, HeroId, NewHero};

#[derive(Deserialize)]
struct SeedEntry {
    #[serde(default)]
    id: Option<HeroId>,
    #[serde(flatten)]
    hero: NewHero,
}

/// Read a seed file: a JSON array of heroes.
///
/// Entries may omit `id`; those are numbered after the highest explicit id
/// in file order. Explicit ids must be positive and unique, and every entry
/// must carry the fields `HeroStore::add_hero` requires.
pub fn load_seed(path: &Path) -> Result<Vec<Hero>, HeroError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| HeroError::Storage(format!("{}: {e}", path.display())))?;
    let heroes = parse_seed(&raw)?;
    debug!(path = %path.display(), heroes = heroes.len(), "loaded seed");
    Ok(heroes)
}

pub fn parse_seed(raw: &str) -> Result<Vec<Hero>, HeroError> {
    let entries: Vec<SeedEntry> = serde_json::from_str(raw)?;

    let mut seen = HashSet::new();
    for (index, entry) in entries.iter().enumerate() {
        if entry.hero.is_missing_required() {
            return Err(HeroError::Validation(format!(
                "seed entry {index}: {MISSING_REQUIRED_FIELDS}"
            )));
        }
        match entry.id {
            Some(0) => {
                return Err(HeroError::Validation(format!(
                    "seed entry {index}: hero id must be positive"
                )));
            }
            Some(id) if !seen.insert(id) => {
                return Err(HeroError::Validation(format!("duplicate hero id {id} in seed")));
            }
            _ => {}
        }
    }

    let mut next = seen.iter().max().map_or(1, |max| max + 1);
    Ok(entries
        .into_iter()
        .map(|entry| {
            let id = entry.id.unwrap_or_else(|| {
                let id = next;
                next += 1;
                id
            });
            entry.hero.into_hero(id)
        })
        .collect())
}
