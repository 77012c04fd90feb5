//! Record kinds and the record envelope exchanged with the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::character::Character;
use crate::persona::Persona;

/// The two kinds of records the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Character,
    Persona,
}

impl RecordKind {
    /// Entity name used in errors and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Character => "character",
            RecordKind::Persona => "persona",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored record of either kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Character(Character),
    Persona(Persona),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Character(_) => RecordKind::Character,
            Record::Persona(_) => RecordKind::Persona,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Record::Character(c) => &c.id,
            Record::Persona(p) => &p.id,
        }
    }

    pub fn into_character(self) -> Option<Character> {
        match self {
            Record::Character(c) => Some(c),
            Record::Persona(_) => None,
        }
    }

    pub fn into_persona(self) -> Option<Persona> {
        match self {
            Record::Persona(p) => Some(p),
            Record::Character(_) => None,
        }
    }
}

impl From<Character> for Record {
    fn from(character: Character) -> Self {
        Record::Character(character)
    }
}

impl From<Persona> for Record {
    fn from(persona: Persona) -> Self {
        Record::Persona(persona)
    }
}

/// Generates a record id of the form `slug-of-name_<epoch millis>`.
///
/// Whitespace runs collapse to a single `-`; the name is lowercased.
pub fn generate_record_id(name: &str, now: DateTime<Utc>) -> String {
    let slug = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{}_{}", slug, now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_record_id() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(
            generate_record_id("  Lady   Of the Lake ", now),
            "lady-of-the-lake_1700000000123"
        );
    }

    #[test]
    fn test_record_kind_and_id() {
        let record = Record::from(Persona {
            id: "p1".to_string(),
            display_name: "Alex".to_string(),
            background: String::new(),
            img: String::new(),
        });
        assert_eq!(record.kind(), RecordKind::Persona);
        assert_eq!(record.id(), "p1");
        assert!(record.clone().into_character().is_none());
        assert!(record.into_persona().is_some());
    }
}
