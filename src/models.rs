//! Core data models used throughout PixelTrace.
//!
//! The [`Catalog`] is the whole event → person → photos dataset. It keeps
//! the order of the source document: events, the people inside each event,
//! and each person's photo list are all ordered sequences, so every query
//! over it is deterministic.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "Under25": {
//!     "anchal_apurva": ["https://drive.google.com/file/d/<id>/view?usp=drivesdk"],
//!     "ishan_ganguly": ["..."]
//!   }
//! }
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque reference to one photo in the hosting service (a Drive view link).
pub type PhotoRef = String;

/// Separator used between words of a normalized key.
pub const KEY_SEPARATOR: char = '_';

/// Normalize a person (or event) name for matching.
///
/// Lower-cases, trims, and collapses every run of whitespace into a single
/// [`KEY_SEPARATOR`]. `"  Anchal   Apurva "` becomes `"anchal_apurva"`.
pub fn normalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(&KEY_SEPARATOR.to_string())
}

/// Human-readable form of a key: separators become spaces and the first
/// letter of every word is upper-cased.
///
/// This is lossy; `"o'neil_x"` renders as `"O'Neil X"`.
pub fn display_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_is_word = false;
    for ch in key.chars() {
        let ch = if ch == KEY_SEPARATOR { ' ' } else { ch };
        let is_word = ch.is_alphanumeric();
        if is_word && !prev_is_word {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_is_word = is_word;
    }
    out
}

/// Event titles use the same word-capitalizing transform as people.
pub fn display_event_name(name: &str) -> String {
    display_name(name)
}

/// One event: its name plus the ordered person → photos mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub name: String,
    people: Vec<PersonEntry>,
}

/// A stored person key, its normalized form, and its photos.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PersonEntry {
    key: String,
    normalized: String,
    photos: Vec<PhotoRef>,
}

impl EventRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            people: Vec::new(),
        }
    }

    /// Append a person with their photos, or replace the photos of a person
    /// already stored under the exact same key.
    pub fn with_person(mut self, key: impl Into<String>, photos: Vec<PhotoRef>) -> Self {
        self.insert(key.into(), photos);
        self
    }

    fn insert(&mut self, key: String, photos: Vec<PhotoRef>) {
        match self.people.iter_mut().find(|p| p.key == key) {
            Some(existing) => existing.photos = photos,
            None => self.people.push(PersonEntry {
                normalized: normalize_key(&key),
                key,
                photos,
            }),
        }
    }

    /// People in insertion order.
    pub fn people(&self) -> impl Iterator<Item = (&str, &[PhotoRef])> {
        self.people
            .iter()
            .map(|p| (p.key.as_str(), p.photos.as_slice()))
    }

    /// Like [`people`](Self::people), with each key's normalized form first.
    pub fn people_normalized(&self) -> impl Iterator<Item = (&str, &str, &[PhotoRef])> {
        self.people
            .iter()
            .map(|p| (p.normalized.as_str(), p.key.as_str(), p.photos.as_slice()))
    }

    /// Find a person by an already-normalized key, returning the first
    /// stored key that normalizes to it and its photo sequence.
    pub fn find_person(&self, normalized: &str) -> Option<(&str, &[PhotoRef])> {
        self.people
            .iter()
            .find(|p| p.normalized == normalized)
            .map(|p| (p.key.as_str(), p.photos.as_slice()))
    }

    /// `true` if `normalized` matches this event's name.
    pub fn matches_name(&self, normalized: &str) -> bool {
        normalize_key(&self.name) == normalized
    }
}

/// The full dataset, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    events: Vec<EventRecord>,
}

impl Catalog {
    pub fn new(events: Vec<EventRecord>) -> Self {
        let mut catalog = Self::default();
        for event in events {
            catalog.insert(event);
        }
        catalog
    }

    fn insert(&mut self, event: EventRecord) {
        match self.events.iter_mut().find(|e| e.name == event.name) {
            Some(existing) => *existing = event,
            None => self.events.push(event),
        }
    }

    /// Parse the JSON wire format, preserving document order.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.events.len()))?;
        for event in &self.events {
            map.serialize_entry(&event.name, &PeopleMap(&event.people))?;
        }
        map.end()
    }
}

struct PeopleMap<'a>(&'a [PersonEntry]);

impl Serialize for PeopleMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for person in self.0 {
            map.serialize_entry(&person.key, &person.photos)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of event name to a map of person key to photo links")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Catalog, A::Error> {
                let mut catalog = Catalog::default();
                while let Some((name, people)) = access.next_entry::<String, OrderedPeople>()? {
                    let mut event = EventRecord::new(name);
                    for (key, photos) in people.0 {
                        event.insert(key, photos);
                    }
                    catalog.insert(event);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

struct OrderedPeople(Vec<(String, Vec<PhotoRef>)>);

impl<'de> Deserialize<'de> for OrderedPeople {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PeopleVisitor;

        impl<'de> Visitor<'de> for PeopleVisitor {
            type Value = OrderedPeople;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of person key to a list of photo links")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<OrderedPeople, A::Error> {
                let mut people = Vec::new();
                while let Some(entry) = access.next_entry::<String, Vec<PhotoRef>>()? {
                    people.push(entry);
                }
                Ok(OrderedPeople(people))
            }
        }

        deserializer.deserialize_map(PeopleVisitor)
    }
}

/// One event a person appears in, as returned by the events lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonEvent {
    pub event_name: String,
    pub photo_count: usize,
    pub photos: Vec<PhotoRef>,
}

/// Gallery payload: a person's photos in one event, with canonical names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPhotos {
    pub event_name: String,
    pub person_name: String,
    pub photo_count: usize,
    pub photos: Vec<PhotoRef>,
}

/// Size summary of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub event_count: usize,
    pub person_count: usize,
    /// Every stored reference, counting a group photo once per person.
    pub photo_count: usize,
    pub unique_photo_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(normalize_key("Anchal Apurva"), "anchal_apurva");
        assert_eq!(normalize_key("  ANCHAL \t  apurva  "), "anchal_apurva");
        assert_eq!(normalize_key("anchal_apurva"), "anchal_apurva");
        assert_eq!(normalize_key("   "), "");
    }

    #[test]
    fn display_name_capitalizes_words() {
        assert_eq!(display_name("ishan_ganguly"), "Ishan Ganguly");
        assert_eq!(display_name("ashmit_kumar_nayak"), "Ashmit Kumar Nayak");
        assert_eq!(display_name("o'neil_x"), "O'Neil X");
        assert_eq!(display_event_name("Garba night 25"), "Garba Night 25");
    }

    #[test]
    fn json_preserves_document_order() {
        let json = r#"{
            "Zeta": { "b_person": ["z1", "z1"], "a_person": ["z2"] },
            "Alpha": { "c_person": [] }
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let names: Vec<&str> = catalog.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);

        let people: Vec<&str> = catalog.events()[0].people().map(|(k, _)| k).collect();
        assert_eq!(people, vec!["b_person", "a_person"]);

        let (_, photos) = catalog.events()[0].find_person("b_person").unwrap();
        assert_eq!(photos, ["z1", "z1"]);
    }

    #[test]
    fn find_person_matches_normalized_stored_key() {
        let event = EventRecord::new("E").with_person("Ishan  Ganguly", vec!["p".into()]);
        let (stored, photos) = event.find_person("ishan_ganguly").unwrap();
        assert_eq!(stored, "Ishan  Ganguly");
        assert_eq!(photos, ["p"]);
        assert!(event.find_person("ishan").is_none());
    }

    #[test]
    fn serialize_keeps_order() {
        let catalog = Catalog::new(vec![
            EventRecord::new("B").with_person("x", vec!["1".into()]),
            EventRecord::new("A").with_person("y", vec!["2".into()]),
        ]);
        let text = serde_json::to_string(&catalog).unwrap();
        assert_eq!(text, r#"{"B":{"x":["1"]},"A":{"y":["2"]}}"#);
    }

    #[test]
    fn rejects_non_map_document() {
        assert!(Catalog::from_json("[1, 2, 3]").is_err());
        assert!(Catalog::from_json(r#"{"E": {"p": "not a list"}}"#).is_err());
    }

    #[test]
    fn find_person_is_case_insensitive() {
        let event = EventRecord::new("E").with_person("Anchal_Apurva", vec!["p".into()]);
        let (stored, photos) = event.find_person("anchal_apurva").unwrap();
        assert_eq!(stored, "Anchal_Apurva");
        assert_eq!(photos.len(), 1);
        assert!(event.find_person("anchal").is_none());
    }
}
