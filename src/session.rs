//! Browsing session: the navigation state a front end drives.
//!
//! ```text
//!   Home ──select_person──▶ PersonEvents ──select_event──▶ Gallery
//!     ▲                         │  ▲                          │
//!     └─────────back────────────┘  └───────────back───────────┘
//! ```
//!
//! Each view owns a [`QuerySlot`]. Leaving a view invalidates its slot, so a
//! lookup that resolves after the user navigated away can never overwrite
//! the state of the view they are on now.

use std::time::Duration;

use crate::config::Config;
use crate::debounce::QuerySlot;
use crate::facade::{QueryFacade, QueryState, SearchOutcome};
use crate::models::{PersonEvent, PhotoRef};
use crate::resolver::FallbackChain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    PersonEvents { person: String },
    Gallery { person: String, event: String },
}

/// Search box state. `NotSearching` is distinct from an empty result.
pub type SearchState = QueryState<SearchOutcome>;

pub struct Session {
    facade: QueryFacade,
    debounce: Duration,
    view: View,
    query: String,
    search: QuerySlot<SearchOutcome>,
    events: QuerySlot<Vec<PersonEvent>>,
    photos: QuerySlot<Vec<PhotoRef>>,
    lightbox: Option<Lightbox>,
}

impl Session {
    pub fn new(facade: QueryFacade, debounce: Duration) -> Self {
        Self {
            facade,
            debounce,
            view: View::Home,
            query: String::new(),
            search: QuerySlot::new(),
            events: QuerySlot::new(),
            photos: QuerySlot::new(),
            lightbox: None,
        }
    }

    /// Session over the configured source, using `[search].debounce_ms`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let facade = QueryFacade::from_config(config)?;
        Ok(Self::new(facade, Duration::from_millis(config.search.debounce_ms)))
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Search box input changed.
    ///
    /// Short input cancels any pending search and shows "not searching"
    /// immediately. Otherwise a search is scheduled after the quiet period,
    /// replacing the previous one.
    pub fn type_query(&mut self, input: &str) {
        self.query = input.to_string();
        if !self.facade.is_searchable(input) {
            self.search.invalidate();
            return;
        }
        let facade = self.facade.clone();
        let input = input.to_string();
        self.search
            .schedule(self.debounce, async move { facade.search(&input).await });
    }

    pub fn select_person(&mut self, person: &str) {
        self.search.invalidate();
        self.photos.invalidate();
        self.lightbox = None;
        self.view = View::PersonEvents {
            person: person.to_string(),
        };
        self.load_events(person.to_string());
    }

    pub fn select_event(&mut self, event: &str, person: &str) {
        self.lightbox = None;
        self.view = View::Gallery {
            person: person.to_string(),
            event: event.to_string(),
        };
        self.load_photos(event.to_string(), person.to_string());
    }

    /// Go up one level, abandoning the current view's lookups.
    pub fn back(&mut self) {
        self.view = match std::mem::replace(&mut self.view, View::Home) {
            View::Gallery { person, .. } => {
                self.photos.invalidate();
                self.lightbox = None;
                View::PersonEvents { person }
            }
            View::PersonEvents { .. } => {
                self.events.invalidate();
                self.photos.invalidate();
                self.query.clear();
                View::Home
            }
            View::Home => View::Home,
        };
    }

    /// Re-issue the lookup behind the current view.
    pub fn retry(&mut self) {
        match self.view.clone() {
            View::Home => {
                let query = self.query.clone();
                self.type_query(&query);
            }
            View::PersonEvents { person } => self.load_events(person),
            View::Gallery { person, event } => self.load_photos(event, person),
        }
    }

    fn load_events(&self, person: String) {
        let facade = self.facade.clone();
        self.events.schedule(Duration::ZERO, async move {
            facade.events_for_person(&person).await
        });
    }

    fn load_photos(&self, event: String, person: String) {
        let facade = self.facade.clone();
        self.photos.schedule(Duration::ZERO, async move {
            facade.photos_for_person_in_event(&event, &person).await
        });
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub fn events_state(&self) -> QueryState<Vec<PersonEvent>> {
        self.events.state()
    }

    pub fn photos_state(&self) -> QueryState<Vec<PhotoRef>> {
        self.photos.state()
    }

    /// Open the lightbox on a loaded gallery photo.
    pub fn open_photo(&mut self, index: usize) -> Option<&mut Lightbox> {
        let photos = match self.photos.state() {
            QueryState::Ready(photos) => photos,
            _ => return None,
        };
        self.lightbox = Lightbox::new(photos, index);
        self.lightbox.as_mut()
    }

    pub fn lightbox(&mut self) -> Option<&mut Lightbox> {
        self.lightbox.as_mut()
    }

    pub fn close_photo(&mut self) {
        self.lightbox = None;
    }
}

/// Full-size viewer over a gallery, wrapping at both ends.
#[derive(Debug, Clone)]
pub struct Lightbox {
    photos: Vec<PhotoRef>,
    index: usize,
    image: FallbackChain,
}

impl Lightbox {
    pub fn new(photos: Vec<PhotoRef>, index: usize) -> Option<Self> {
        let image = FallbackChain::new(photos.get(index)?);
        Some(Self {
            photos,
            index,
            image,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn photo(&self) -> &str {
        &self.photos[self.index]
    }

    /// Fallback state of the photo on screen.
    pub fn image(&mut self) -> &mut FallbackChain {
        &mut self.image
    }

    pub fn next(&mut self) -> &str {
        self.index = (self.index + 1) % self.photos.len();
        self.image = FallbackChain::new(&self.photos[self.index]);
        self.photo()
    }

    pub fn prev(&mut self) -> &str {
        self.index = (self.index + self.photos.len() - 1) % self.photos.len();
        self.image = FallbackChain::new(&self.photos[self.index]);
        self.photo()
    }
}
