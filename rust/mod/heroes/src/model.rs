//! Hero entity and creation candidate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HeroError;

/// Store-assigned hero identifier. Always positive.
pub type HeroId = u64;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: HeroId,
    pub name: String,
    pub alter_ego: String,
    pub powers: Vec<String>,
    pub publisher: String,
    #[serde(with = "iso_date")]
    pub first_appearance: DateTime<Utc>,
    pub rating: u8,
}

/// A hero before the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHero {
    pub name: String,
    pub alter_ego: String,
    pub powers: Vec<String>,
    pub publisher: String,
    #[serde(with = "iso_date")]
    pub first_appearance: DateTime<Utc>,
    pub rating: u8,
}

impl NewHero {
    /// True when any field the store requires is blank.
    pub fn is_missing_required(&self) -> bool {
        self.name.trim().is_empty()
            || self.alter_ego.trim().is_empty()
            || self.publisher.trim().is_empty()
            || self.powers.is_empty()
    }

    /// Extra checks applied when the store runs in strict mode.
    pub fn validate_strict(&self) -> Result<(), HeroError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(HeroError::Validation(format!(
                "Invalid hero: rating must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
        if self.publisher.parse::<Publisher>().is_err() {
            return Err(HeroError::Validation(format!(
                "Invalid hero: unknown publisher '{}'",
                self.publisher
            )));
        }
        Ok(())
    }

    pub fn into_hero(self, id: HeroId) -> Hero {
        Hero {
            id,
            name: self.name,
            alter_ego: self.alter_ego,
            powers: self.powers,
            publisher: self.publisher,
            first_appearance: self.first_appearance,
            rating: self.rating,
        }
    }
}

impl Hero {
    /// Case-insensitive substring match on name or alter ego.
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.alter_ego.to_lowercase().contains(needle)
    }
}

impl From<Hero> for NewHero {
    fn from(hero: Hero) -> Self {
        NewHero {
            name: hero.name,
            alter_ego: hero.alter_ego,
            powers: hero.powers,
            publisher: hero.publisher,
            first_appearance: hero.first_appearance,
            rating: hero.rating,
        }
    }
}

/// Publishers accepted in strict mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Publisher {
    Marvel,
    Dc,
    Image,
    DarkHorse,
    Idw,
    Valiant,
}

impl Publisher {
    pub const ALL: [Publisher; 6] = [
        Publisher::Marvel,
        Publisher::Dc,
        Publisher::Image,
        Publisher::DarkHorse,
        Publisher::Idw,
        Publisher::Valiant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Publisher::Marvel => "Marvel",
            Publisher::Dc => "DC",
            Publisher::Image => "Image",
            Publisher::DarkHorse => "Dark Horse",
            Publisher::Idw => "IDW",
            Publisher::Valiant => "Valiant",
        }
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Publisher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Publisher::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown publisher: {wanted}"))
    }
}

/// Serde adapter for dates stored as ISO-8601 strings.
///
/// Writes `YYYY-MM-DDTHH:MM:SS.sssZ`. Reads any RFC 3339 timestamp, or a bare
/// `YYYY-MM-DD` taken as midnight UTC.
pub mod iso_date {
    use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{raw}': {e}"))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("invalid date '{raw}'"))?;
        Ok(Utc.from_utc_datetime(&midnight))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn spider_man() -> NewHero {
        NewHero {
            name: "SPIDER-MAN".into(),
            alter_ego: "Peter Parker".into(),
            powers: vec!["Web-slinging".into(), "Spider-sense".into()],
            publisher: "Marvel".into(),
            first_appearance: iso_date::parse("1962-08-01").unwrap(),
            rating: 5,
        }
    }

    pub fn batman() -> NewHero {
        NewHero {
            name: "BATMAN".into(),
            alter_ego: "Bruce Wayne".into(),
            powers: vec!["Intelligence".into(), "Martial Arts".into()],
            publisher: "DC".into(),
            first_appearance: iso_date::parse("1939-05-01").unwrap(),
            rating: 5,
        }
    }

    pub fn named(name: &str) -> NewHero {
        NewHero {
            name: name.into(),
            ..spider_man()
        }
    }
}
