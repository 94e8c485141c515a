//! Hero catalog commands.

use anyhow::Result;
use heroes::{Hero, HeroId, HeroesModule, NewHero};
use serde_json::Value;

/// Print the current page, applying `filter` and `page` first.
///
/// `page` is 1-based here; the store counts pages from 0.
pub fn list(
    module: &HeroesModule,
    filter: Option<String>,
    page: Option<usize>,
    output_json: bool,
) -> Result<()> {
    let store = module.store();
    if let Some(filter) = filter {
        store.set_filter(filter);
    }
    if let Some(page) = page {
        if page == 0 {
            anyhow::bail!("Pages start at 1.");
        }
        store.update_pagination(page - 1);
    }

    let filtered = store.filtered_heroes();
    let pagination = store.pagination();

    if output_json {
        let body = serde_json::json!({
            "heroes": filtered.heroes,
            "totalFiltered": filtered.total_filtered,
            "filter": store.filter(),
            "pagination": pagination,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if filtered.heroes.is_empty() {
        println!("No heroes found.");
    } else {
        let selected = store.selected_hero().map(|h| h.id);
        print_table(&filtered.heroes, selected);
    }

    let pages = filtered.page_count(pagination.items_per_page).max(1);
    let filter = store.filter();
    let mut footer = format!(
        "Page {}/{} ({} of {} heroes",
        pagination.current_page + 1,
        pages,
        filtered.total_filtered,
        pagination.total_items,
    );
    if !filter.is_empty() {
        footer.push_str(&format!(", filter \"{filter}\""));
    }
    footer.push(')');
    println!("{footer}");
    Ok(())
}

pub fn get(module: &HeroesModule, id: HeroId, output_json: bool) -> Result<()> {
    let hero = module
        .store()
        .get_hero(id)
        .ok_or_else(|| anyhow::anyhow!("Hero {} not found.", id))?;
    print_hero(&hero, output_json)
}

pub fn add(module: &HeroesModule, json_body: &str, output_json: bool) -> Result<()> {
    let candidate: NewHero =
        serde_json::from_str(json_body).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;
    let hero = module.create(candidate)?;
    if !output_json {
        println!("Hero {} created.", hero.id);
    }
    print_hero(&hero, output_json)
}

/// Merge `json_body` over the stored hero and save the result.
pub fn update(module: &HeroesModule, id: HeroId, json_body: &str, output_json: bool) -> Result<()> {
    let current = module
        .store()
        .get_hero(id)
        .ok_or_else(|| anyhow::anyhow!("Hero {} not found.", id))?;
    let patch: Value =
        serde_json::from_str(json_body).map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;
    let hero = apply_patch(&current, patch)?;

    if !module.update(hero.clone()) {
        anyhow::bail!("Hero {} not found.", id);
    }
    if !output_json {
        println!("Hero {} updated.", id);
    }
    print_hero(&hero, output_json)
}

pub fn delete(module: &HeroesModule, id: HeroId) -> Result<()> {
    match module.delete(id) {
        Some(hero) => println!("Hero {} ({}) deleted.", hero.id, hero.name),
        None => anyhow::bail!("Hero {} not found.", id),
    }
    Ok(())
}

pub fn select(module: &HeroesModule, id: Option<HeroId>) -> Result<()> {
    let store = module.store();
    match id {
        Some(id) => {
            let hero = store
                .get_hero(id)
                .ok_or_else(|| anyhow::anyhow!("Hero {} not found.", id))?;
            println!("Selected {} ({}).", hero.id, hero.name);
            store.set_selected_hero(Some(hero));
        }
        None => {
            store.set_selected_hero(None);
            println!("Selection cleared.");
        }
    }
    Ok(())
}

/// Overlay the fields of a JSON object onto `hero`. The id never changes.
fn apply_patch(hero: &Hero, patch: Value) -> Result<Hero> {
    let Value::Object(fields) = patch else {
        anyhow::bail!("Update body must be a JSON object.");
    };
    let mut merged = serde_json::to_value(hero)?;
    if let Value::Object(target) = &mut merged {
        for (key, value) in fields {
            target.insert(key, value);
        }
    }
    let mut updated: Hero =
        serde_json::from_value(merged).map_err(|e| anyhow::anyhow!("Invalid hero: {}", e))?;
    updated.id = hero.id;
    Ok(updated)
}

fn print_hero(hero: &Hero, output_json: bool) -> Result<()> {
    if output_json {
        println!("{}", serde_json::to_string_pretty(hero)?);
    } else {
        print_table(std::slice::from_ref(hero), None);
    }
    Ok(())
}

fn print_table(heroes: &[Hero], selected: Option<HeroId>) {
    println!(
        "{:2} {:5} {:20} {:20} {:12} {:12} {:6} {}",
        "", "ID", "NAME", "ALTER EGO", "PUBLISHER", "FIRST", "RATING", "POWERS"
    );
    for hero in heroes {
        let marker = if selected == Some(hero.id) { "*" } else { " " };
        println!("{}", table_row(hero, marker));
    }
}

fn table_row(hero: &Hero, marker: &str) -> String {
    format!(
        "{:2} {:<5} {:20} {:20} {:12} {:12} {:6} {}",
        marker,
        hero.id,
        hero.name,
        hero.alter_ego,
        hero.publisher,
        hero.first_appearance.format("%Y-%m-%d").to_string(),
        "*".repeat(hero.rating as usize),
        hero.powers.join(", "),
    )
}
