//! Read-only lookups over a loaded [`Catalog`].
//!
//! [`LookupStore`] answers the three questions the UI asks:
//!
//! | Method | Question |
//! |--------|----------|
//! | [`search_people`](LookupStore::search_people) | Who matches this text? |
//! | [`events_for_person`](LookupStore::events_for_person) | Which events is this person in? |
//! | [`photos_for_person_in_event`](LookupStore::photos_for_person_in_event) | Which photos of them are in that event? |
//!
//! The catalog is injected at construction and shared behind an `Arc`. No
//! method mutates it, so every call is idempotent and safe from any thread.
//! "No match" is always an empty result, never an error.

use std::collections::HashSet;
use std::sync::Arc;

use crate::models::{
    normalize_key, Catalog, CatalogStats, EventPhotos, PersonEvent, PhotoRef, KEY_SEPARATOR,
};

#[derive(Debug, Clone)]
pub struct LookupStore {
    catalog: Arc<Catalog>,
}

impl LookupStore {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Case-insensitive substring search over stored person keys.
    ///
    /// A key matches when the trimmed query occurs in the key itself or in
    /// its spaced form (`ishan_ganguly` → `ishan ganguly`), so both
    /// `"ISHAN"` and `"ishan gan"` find it. Keys that normalize alike are one
    /// person, reported once under the first stored spelling, in the order
    /// first seen walking events and then people.
    pub fn search_people(&self, query: &str) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let mut matches = Vec::new();
        for event in self.catalog.events() {
            for (normalized, key, _) in event.people_normalized() {
                let lowered = key.to_lowercase();
                let spaced = lowered.replace(KEY_SEPARATOR, " ");
                if !(lowered.contains(&needle) || spaced.contains(&needle)) {
                    continue;
                }
                if seen.insert(normalized) {
                    matches.push(key.to_string());
                }
            }
        }
        matches
    }

    /// Every event the person has photos in, in catalog order.
    pub fn events_for_person(&self, person: &str) -> Vec<PersonEvent> {
        let wanted = normalize_key(person);
        if wanted.is_empty() {
            return Vec::new();
        }

        self.catalog
            .events()
            .iter()
            .filter_map(|event| {
                let (_, photos) = event.find_person(&wanted)?;
                if photos.is_empty() {
                    return None;
                }
                Some(PersonEvent {
                    event_name: event.name.clone(),
                    photo_count: photos.len(),
                    photos: photos.to_vec(),
                })
            })
            .collect()
    }

    /// The stored photo list for `(event, person)`, untouched.
    ///
    /// An unknown event and an unknown person both give an empty list.
    pub fn photos_for_person_in_event(&self, event: &str, person: &str) -> Vec<PhotoRef> {
        self.event_photos(event, person)
            .map(|found| found.photos)
            .unwrap_or_default()
    }

    /// Like [`photos_for_person_in_event`](Self::photos_for_person_in_event)
    /// but keeps the stored event and person names alongside the photos.
    pub fn event_photos(&self, event: &str, person: &str) -> Option<EventPhotos> {
        let wanted_event = normalize_key(event);
        let wanted_person = normalize_key(person);
        if wanted_event.is_empty() || wanted_person.is_empty() {
            return None;
        }

        let record = self
            .catalog
            .events()
            .iter()
            .find(|e| e.matches_name(&wanted_event))?;
        let (stored_person, photos) = record.find_person(&wanted_person)?;

        Some(EventPhotos {
            event_name: record.name.clone(),
            person_name: stored_person.to_string(),
            photo_count: photos.len(),
            photos: photos.to_vec(),
        })
    }

    pub fn stats(&self) -> CatalogStats {
        let mut people = HashSet::new();
        let mut unique = HashSet::new();
        let mut photo_count = 0;

        for event in self.catalog.events() {
            for (normalized, _, photos) in event.people_normalized() {
                people.insert(normalized);
                photo_count += photos.len();
                unique.extend(photos.iter().map(String::as_str));
            }
        }

        CatalogStats {
            event_count: self.catalog.len(),
            person_count: people.len(),
            photo_count,
            unique_photo_count: unique.len(),
        }
    }
}

/// Two events, overlapping people, one shared group photo, one duplicate.
#[cfg(test)]
pub(crate) fn sample_catalog() -> Catalog {
    use crate::models::EventRecord;

    let link = |id: &str| format!("https://drive.google.com/file/d/{}/view?usp=drivesdk", id);
    Catalog::new(vec![
        EventRecord::new("Under25")
            .with_person("anchal_apurva", vec![link("u1"), link("u2"), link("u3")])
            .with_person("ishan_ganguly", vec![link("u1"), link("u4")])
            .with_person("ashmit_kumar_nayak", vec![link("u5")]),
        EventRecord::new("Garba night 25")
            .with_person("anchal_apurva", vec![link("g1"), link("g2")])
            .with_person("nistha_sarawagi", vec![link("g3"), link("g3"), link("g4")])
            .with_person("mohammad_tauqueer", vec![]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> LookupStore {
        LookupStore::new(Arc::new(sample_catalog()))
    }

    #[test]
    fn search_is_case_insensitive_on_both_forms() {
        let s = store();
        assert_eq!(s.search_people("ISHAN"), vec!["ishan_ganguly"]);
        assert_eq!(s.search_people("ishan gan"), vec!["ishan_ganguly"]);
        assert_eq!(s.search_people("  ishan_g  "), vec!["ishan_ganguly"]);
    }

    #[test]
    fn search_dedups_across_events() {
        let results = store().search_people("anchal");
        assert_eq!(results, vec!["anchal_apurva"]);
    }

    #[test]
    fn search_dedups_spellings_of_one_key() {
        use crate::models::EventRecord;

        let s = LookupStore::new(Arc::new(Catalog::new(vec![
            EventRecord::new("A").with_person("ishan_ganguly", vec!["a1".into()]),
            EventRecord::new("B").with_person("ishan  ganguly", vec!["b1".into()]),
        ])));
        assert_eq!(s.search_people("ishan"), vec!["ishan_ganguly"]);
        assert_eq!(s.events_for_person("Ishan Ganguly").len(), 2);
        assert_eq!(s.stats().person_count, 1);
    }

    #[test]
    fn search_uses_first_seen_order() {
        // "a" hits everyone; order follows events then people.
        let results = store().search_people("a");
        assert_eq!(
            results,
            vec![
                "anchal_apurva",
                "ishan_ganguly",
                "ashmit_kumar_nayak",
                "nistha_sarawagi",
                "mohammad_tauqueer",
            ]
        );
    }

    #[test]
    fn search_empty_or_missing() {
        let s = store();
        assert!(s.search_people("").is_empty());
        assert!(s.search_people("   ").is_empty());
        assert!(s.search_people("zzz").is_empty());
    }

    #[test]
    fn events_for_person_normalizes_input() {
        let events = store().events_for_person("Anchal   Apurva");
        let names: Vec<&str> = events.iter().map(|e| e.event_name.as_str()).collect();
        assert_eq!(names, vec!["Under25", "Garba night 25"]);
        for e in &events {
            assert_eq!(e.photo_count, e.photos.len());
        }
        assert_eq!(events[0].photo_count, 3);
    }

    #[test]
    fn events_for_person_is_exact_not_substring() {
        assert!(store().events_for_person("anchal").is_empty());
        assert!(store().events_for_person("").is_empty());
    }

    #[test]
    fn events_skip_people_without_photos() {
        assert!(store().events_for_person("mohammad tauqueer").is_empty());
    }

    #[test]
    fn photos_keep_order_and_duplicates() {
        let photos = store().photos_for_person_in_event("garba NIGHT 25", "Nistha Sarawagi");
        assert_eq!(photos.len(), 3);
        assert_eq!(photos[0], photos[1]);
        assert!(photos[0].contains("g3"));
        assert!(photos[2].contains("g4"));
    }

    #[test]
    fn photos_empty_without_overlap() {
        let s = store();
        assert!(s
            .photos_for_person_in_event("Under25", "nistha_sarawagi")
            .is_empty());
        assert!(s.photos_for_person_in_event("No Such Event", "anchal_apurva").is_empty());
        assert!(s.photos_for_person_in_event("Under25", "nobody").is_empty());
    }

    #[test]
    fn event_photos_reports_stored_names() {
        let found = store().event_photos("under25", "ISHAN GANGULY").unwrap();
        assert_eq!(found.event_name, "Under25");
        assert_eq!(found.person_name, "ishan_ganguly");
        assert_eq!(found.photo_count, 2);
    }

    #[test]
    fn shared_photo_is_not_deduplicated_across_people() {
        let s = store();
        let a = s.photos_for_person_in_event("Under25", "anchal_apurva");
        let i = s.photos_for_person_in_event("Under25", "ishan_ganguly");
        assert_eq!(a[0], i[0]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let s = store();
        assert_eq!(s.search_people("an"), s.search_people("an"));
        assert_eq!(
            s.events_for_person("anchal apurva"),
            s.events_for_person("anchal apurva")
        );
        assert_eq!(
            s.photos_for_person_in_event("Under25", "ishan ganguly"),
            s.photos_for_person_in_event("Under25", "ishan ganguly")
        );
    }

    #[test]
    fn stats_counts() {
        let stats = store().stats();
        assert_eq!(stats.event_count, 2);
        assert_eq!(stats.person_count, 5);
        assert_eq!(stats.photo_count, 11);
        // u1 is shared and g3 is duplicated.
        assert_eq!(stats.unique_photo_count, 9);
    }
}
