//! The query contract consumed by the presentation layer.
//!
//! [`QueryFacade`] applies input policy, loads the catalog from its source,
//! and delegates to a [`LookupStore`]. It keeps three outcomes apart:
//!
//! - search input too short: [`SearchOutcome::NotSearching`], no lookup issued;
//! - lookup ran: `Ok(..)`, possibly empty;
//! - source failed: `Err(QueryError::Transport)`, never an empty result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::error::QueryError;
use crate::models::{Catalog, CatalogStats, EventPhotos, PersonEvent, PhotoRef};
use crate::source::{self, CatalogSource};
use crate::store::LookupStore;

/// Minimum trimmed length before a search is issued.
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Result of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Input was below the minimum length; nothing was looked up.
    NotSearching,
    /// The lookup ran. An empty list means nobody matched.
    Found(Vec<String>),
}

impl SearchOutcome {
    pub fn is_searching(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn people(&self) -> &[String] {
        match self {
            SearchOutcome::Found(people) => people,
            SearchOutcome::NotSearching => &[],
        }
    }
}

/// What the presentation layer renders for one query.
///
/// `Pending`, `Ready`, and `Failed` are mutually exclusive; `Idle` means
/// nothing has been requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum QueryState<T> {
    Idle,
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            QueryState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Result<T, QueryError>> for QueryState<T> {
    fn from(result: Result<T, QueryError>) -> Self {
        match result {
            Ok(value) => QueryState::Ready(value),
            Err(err) => QueryState::Failed(err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct QueryFacade {
    source: Arc<dyn CatalogSource>,
    min_query_len: usize,
}

impl QueryFacade {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
        }
    }

    pub fn with_min_query_len(mut self, min_query_len: usize) -> Self {
        self.min_query_len = min_query_len.max(1);
        self
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let source = source::from_config(&config.source)?;
        Ok(Self::new(source).with_min_query_len(config.search.min_query_len))
    }

    pub fn min_query_len(&self) -> usize {
        self.min_query_len
    }

    /// `true` if `raw` is long enough to be searched.
    pub fn is_searchable(&self, raw: &str) -> bool {
        raw.trim().chars().count() >= self.min_query_len
    }

    async fn store(&self) -> Result<LookupStore, QueryError> {
        match self.source.load().await {
            Ok(catalog) => Ok(LookupStore::new(catalog)),
            Err(err) => {
                tracing::warn!(source = %self.source.describe(), error = %err, "catalog load failed");
                Err(err.into())
            }
        }
    }

    pub async fn search(&self, raw: &str) -> Result<SearchOutcome, QueryError> {
        if !self.is_searchable(raw) {
            return Ok(SearchOutcome::NotSearching);
        }
        let store = self.store().await?;
        Ok(SearchOutcome::Found(store.search_people(raw)))
    }

    pub async fn events_for_person(&self, person: &str) -> Result<Vec<PersonEvent>, QueryError> {
        Ok(self.store().await?.events_for_person(person))
    }

    pub async fn photos_for_person_in_event(
        &self,
        event: &str,
        person: &str,
    ) -> Result<Vec<PhotoRef>, QueryError> {
        Ok(self.store().await?.photos_for_person_in_event(event, person))
    }

    pub async fn event_photos(
        &self,
        event: &str,
        person: &str,
    ) -> Result<Option<EventPhotos>, QueryError> {
        Ok(self.store().await?.event_photos(event, person))
    }

    pub async fn stats(&self) -> Result<CatalogStats, QueryError> {
        Ok(self.store().await?.stats())
    }

    pub async fn catalog(&self) -> Result<Arc<Catalog>, QueryError> {
        Ok(self.store().await?.catalog().clone())
    }

    pub async fn last_loaded(&self) -> Option<DateTime<Utc>> {
        self.source.last_loaded().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::FlakySource;
    use crate::store::sample_catalog;

    fn facade() -> (QueryFacade, Arc<FlakySource>) {
        let source = Arc::new(FlakySource::new(sample_catalog()));
        (QueryFacade::new(source.clone()), source)
    }

    #[tokio::test]
    async fn short_input_is_not_searching_and_issues_nothing() {
        let (facade, source) = facade();
        for raw in ["", "a", " a ", "   "] {
            assert_eq!(facade.search(raw).await.unwrap(), SearchOutcome::NotSearching);
        }
        assert_eq!(source.loads(), 0);
    }

    #[tokio::test]
    async fn searched_nothing_found_is_distinct() {
        let (facade, source) = facade();
        let outcome = facade.search("zz").await.unwrap();
        assert_eq!(outcome, SearchOutcome::Found(vec![]));
        assert!(outcome.is_searching());
        assert_eq!(source.loads(), 1);
    }

    #[tokio::test]
    async fn search_delegates() {
        let (facade, _) = facade();
        let outcome = facade.search("ISHAN").await.unwrap();
        assert_eq!(outcome.people(), ["ishan_ganguly"]);
    }

    #[tokio::test]
    async fn transport_failure_is_not_empty() {
        let (facade, source) = facade();
        source.set_failing(true);

        let err = facade.search("anchal").await.unwrap_err();
        assert_eq!(
            err,
            QueryError::Transport {
                message: "Server error - please try again later".into()
            }
        );
        assert!(facade.events_for_person("anchal apurva").await.is_err());
        assert!(facade
            .photos_for_person_in_event("Under25", "anchal apurva")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn events_and_photos_delegate() {
        let (facade, _) = facade();
        let events = facade.events_for_person("anchal apurva").await.unwrap();
        assert_eq!(events.len(), 2);

        let photos = facade
            .photos_for_person_in_event("Garba night 25", "anchal_apurva")
            .await
            .unwrap();
        assert_eq!(photos.len(), 2);

        assert!(facade
            .event_photos("Garba night 25", "ishan ganguly")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn min_length_is_configurable() {
        let (facade, _) = facade();
        let facade = facade.with_min_query_len(4);
        assert!(!facade.is_searchable("abc"));
        assert!(facade.is_searchable("abcd"));
        assert_eq!(facade.with_min_query_len(0).min_query_len(), 1);
    }

    #[test]
    fn query_state_from_result() {
        let ok = QueryState::from(Ok::<u8, QueryError>(3));
        assert_eq!(ok.ready(), Some(&3));
        let failed = QueryState::from(Err::<u8, _>(QueryError::Transport {
            message: "down".into(),
        }));
        assert_eq!(failed, QueryState::Failed("down".into()));
    }
}
