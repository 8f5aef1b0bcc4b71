//! Paginated Lists
//!
//! Offset-based paging for the sessions and people lists. Page `n` asks
//! for `limit = page_size, offset = n * page_size`; page 0 replaces the
//! list and later pages append.

use async_trait::async_trait;
use serde::Serialize;
use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;

use super::{settle, PageOutcome};
use crate::api::{ApiClient, ApiResult, Pagination, Person, Session};

/// Default number of items per page
pub const PAGE_SIZE: usize = 20;

/// A backend list endpoint
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    /// Name used in logs
    const NAME: &'static str;

    type Item: Clone + Send + Sync + Serialize;

    async fn fetch_page(
        api: &ApiClient,
        limit: usize,
        offset: usize,
    ) -> ApiResult<(Vec<Self::Item>, Option<Pagination>)>;

    /// Text the client-side filter matches against
    fn filter_key(item: &Self::Item) -> &str;
}

/// `GET /sessions`
#[derive(Debug)]
pub struct SessionsSource;

#[async_trait]
impl ListSource for SessionsSource {
    const NAME: &'static str = "sessions";
    type Item = Session;

    async fn fetch_page(
        api: &ApiClient,
        limit: usize,
        offset: usize,
    ) -> ApiResult<(Vec<Session>, Option<Pagination>)> {
        let response = api.get_sessions(limit, offset).await?;
        Ok((response.sessions, response.pagination))
    }

    fn filter_key(item: &Session) -> &str {
        &item.session_name
    }
}

/// `GET /persons`
#[derive(Debug)]
pub struct PeopleSource;

#[async_trait]
impl ListSource for PeopleSource {
    const NAME: &'static str = "people";
    type Item = Person;

    async fn fetch_page(
        api: &ApiClient,
        limit: usize,
        offset: usize,
    ) -> ApiResult<(Vec<Person>, Option<Pagination>)> {
        let response = api.get_people(limit, offset).await?;
        Ok((response.persons, response.pagination))
    }

    fn filter_key(item: &Person) -> &str {
        &item.person_id
    }
}

pub type SessionList = PagedList<SessionsSource>;
pub type PeopleList = PagedList<PeopleSource>;

/// Accumulated pages of a list view
#[derive(Debug, Serialize)]
#[serde(bound = "")]
pub struct PagedList<S: ListSource> {
    items: Vec<S::Item>,
    /// Page the next `load_more` will request
    next_page: usize,
    has_more: bool,
    page_size: usize,
    filter: String,
    #[serde(skip)]
    _source: PhantomData<S>,
}

impl<S: ListSource> Default for PagedList<S> {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl<S: ListSource> PagedList<S> {
    pub fn new(page_size: usize) -> Self {
        Self {
            items: Vec::new(),
            next_page: 0,
            has_more: true,
            page_size: page_size.max(1),
            filter: String::new(),
            _source: PhantomData,
        }
    }

    /// Every loaded item, unfiltered
    pub fn items(&self) -> &[S::Item] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Pages loaded so far
    pub fn pages_loaded(&self) -> usize {
        self.next_page
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Loaded items whose key contains the filter, case-insensitively
    pub fn visible(&self) -> Vec<&S::Item> {
        let needle = self.filter.to_lowercase();
        self.items
            .iter()
            .filter(|item| S::filter_key(item).to_lowercase().contains(&needle))
            .collect()
    }

    /// Record a fetched page.
    ///
    /// `has_more` follows the backend's pagination flag when present,
    /// otherwise whether the page came back full.
    pub fn apply_page(&mut self, page: usize, items: Vec<S::Item>, pagination: Option<Pagination>) {
        self.has_more = match pagination {
            Some(pagination) => pagination.has_more,
            None => items.len() == self.page_size,
        };

        if page == 0 {
            self.items = items;
        } else {
            self.items.extend(items);
        }
        self.next_page = page + 1;
    }

    /// Reload from the first page
    pub async fn refresh(&mut self, api: &ApiClient, token: &CancellationToken) -> PageOutcome<usize> {
        self.load_page(api, 0, token).await
    }

    /// Load the next page; `None` when the list is exhausted
    pub async fn load_more(
        &mut self,
        api: &ApiClient,
        token: &CancellationToken,
    ) -> Option<PageOutcome<usize>> {
        if !self.has_more {
            return None;
        }
        Some(self.load_page(api, self.next_page, token).await)
    }

    /// Fetch page `page` and apply it.
    ///
    /// Yields the number of items received. On failure the list keeps what
    /// it had and stops offering more pages.
    pub async fn load_page(
        &mut self,
        api: &ApiClient,
        page: usize,
        token: &CancellationToken,
    ) -> PageOutcome<usize> {
        let offset = page * self.page_size;
        tracing::debug!(list = S::NAME, page, offset, "Loading page");

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = S::fetch_page(api, self.page_size, offset) => Some(result),
        };

        let outcome = settle(S::NAME, api, token, result, || (Vec::new(), None));
        match outcome {
            PageOutcome::Loaded((items, pagination)) => {
                let received = items.len();
                self.apply_page(page, items, pagination);
                PageOutcome::Loaded(received)
            }
            PageOutcome::Fallback { error, .. } => {
                if page == 0 {
                    self.items.clear();
                }
                self.has_more = false;
                PageOutcome::Fallback { model: 0, error }
            }
            PageOutcome::Cancelled => PageOutcome::Cancelled,
        }
    }

    /// Load pages `0..=last` in order, stopping early when exhausted
    pub async fn load_through(
        &mut self,
        api: &ApiClient,
        last: usize,
        token: &CancellationToken,
    ) -> PageOutcome<usize> {
        let mut outcome = self.refresh(api, token).await;
        while self.next_page <= last && outcome.is_loaded() {
            match self.load_more(api, token).await {
                Some(next) => outcome = next,
                None => break,
            }
        }
        outcome.map(|_| self.items.len())
    }
}
