//! Last-write-wins broadcast of the most recent hero mutation.

use heroes_signal::{ReadSignal, Signal, SubscriptionId};
use serde::{Deserialize, Serialize};

use crate::model::Hero;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeroEventKind {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroEvent {
    #[serde(rename = "type")]
    pub kind: HeroEventKind,
    pub hero: Hero,
}

impl HeroEvent {
    pub fn created(hero: Hero) -> Self {
        Self {
            kind: HeroEventKind::Created,
            hero,
        }
    }

    pub fn updated(hero: Hero) -> Self {
        Self {
            kind: HeroEventKind::Updated,
            hero,
        }
    }

    pub fn deleted(hero: Hero) -> Self {
        Self {
            kind: HeroEventKind::Deleted,
            hero,
        }
    }

    /// Short user-facing notice, e.g. for a toast.
    pub fn message(&self) -> &'static str {
        match self.kind {
            HeroEventKind::Created => "Hero created successfully",
            HeroEventKind::Updated => "Hero updated successfully",
            HeroEventKind::Deleted => "Hero deleted successfully",
        }
    }
}

/// Single slot holding the latest [`HeroEvent`].
///
/// `emit` overwrites the slot and notifies current subscribers. There is no
/// queue: a subscriber registered after an emission only sees later ones,
/// though it can still read the current slot.
#[derive(Default)]
pub struct EventsService {
    slot: Signal<Option<HeroEvent>>,
}

impl EventsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: HeroEvent) {
        self.slot.set(Some(event));
    }

    /// The most recent event, if any was emitted.
    pub fn hero_event(&self) -> Option<HeroEvent> {
        self.slot.with(Clone::clone)
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&HeroEvent) + Send + Sync + 'static,
    {
        self.slot.subscribe(move |slot| {
            if let Some(event) = slot {
                handler(event);
            }
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.slot.unsubscribe(id)
    }

    pub fn signal(&self) -> ReadSignal<Option<HeroEvent>> {
        self.slot.read_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn empty_until_first_emit() {
        assert!(EventsService::new().hero_event().is_none());
    }

    #[test]
    fn emit_created_updated_deleted() {
        let events = EventsService::new();
        let hero = spider_man().into_hero(1);

        events.emit(HeroEvent::created(hero.clone()));
        let e = events.hero_event().unwrap();
        assert_eq!(e.kind, HeroEventKind::Created);
        assert_eq!(e.hero, hero);

        events.emit(HeroEvent::updated(hero.clone()));
        assert_eq!(events.hero_event().unwrap().kind, HeroEventKind::Updated);

        events.emit(HeroEvent::deleted(hero));
        assert_eq!(events.hero_event().unwrap().kind, HeroEventKind::Deleted);
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let events = EventsService::new();
        events.emit(HeroEvent::created(spider_man().into_hero(1)));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        events.subscribe(move |e| s.lock().unwrap().push(e.kind));

        events.emit(HeroEvent::deleted(batman().into_hero(2)));

        assert_eq!(*seen.lock().unwrap(), vec![HeroEventKind::Deleted]);
        assert_eq!(events.hero_event().unwrap().hero.id, 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let events = EventsService::new();
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();
        let id = events.subscribe(move |_| *c.lock().unwrap() += 1);

        events.emit(HeroEvent::created(batman().into_hero(1)));
        assert!(events.unsubscribe(id));
        events.emit(HeroEvent::created(batman().into_hero(2)));

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn json_shape() {
        let event = HeroEvent::updated(batman().into_hero(3));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "updated");
        assert_eq!(json["hero"]["id"], 3);
        assert_eq!(event.message(), "Hero updated successfully");
    }
}
