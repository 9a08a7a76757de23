//! Cursor pagination over search results.
//!
//! The API pages each category with its own opaque cursor (`s` /
//! `nextStart`). [`SearchPager`] follows one category; [`MultiCategoryPager`]
//! keeps one cursor per category and advances them independently.

use std::collections::BTreeMap;

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use tracing::debug;

use crate::client::TroveClient;
use crate::config::limits;
use crate::error::{ClientError, ClientResult};
use crate::models::{AnyRecord, Category, CategoryResult};
use crate::query::{SearchParams, START_CURSOR};

/// Position of one category's cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    /// Nothing fetched yet.
    Start,
    /// Cursor for the next page.
    Next(String),
    /// No further pages.
    Exhausted,
}

impl CursorState {
    fn from_cursor(cursor: Option<String>) -> Self {
        match cursor {
            Some(c) if c != START_CURSOR => Self::Next(c),
            _ => Self::Start,
        }
    }

    /// Value to send as `s`, unless exhausted.
    #[must_use]
    pub fn as_param(&self) -> Option<&str> {
        match self {
            Self::Start => Some(START_CURSOR),
            Self::Next(cursor) => Some(cursor.as_str()),
            Self::Exhausted => None,
        }
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }

    /// Cursor to resume from, once at least one page has been fetched.
    #[must_use]
    pub fn resume_cursor(&self) -> Option<&str> {
        match self {
            Self::Next(cursor) => Some(cursor.as_str()),
            _ => None,
        }
    }

    /// State after receiving `page` for the request sent with `sent`.
    ///
    /// Stops on a missing cursor, a cursor equal to the one just sent, or an
    /// empty page.
    fn after(sent: &str, page: Option<&CategoryResult>) -> Self {
        let Some(page) = page else {
            return Self::Exhausted;
        };
        match page.next_cursor() {
            Some(next) if next != sent && page.record_count() > 0 => Self::Next(next.to_string()),
            _ => Self::Exhausted,
        }
    }
}

fn concrete_category(params: &SearchParams) -> ClientResult<()> {
    if params.categories.contains(&Category::All) {
        return Err(ClientError::validation(
            "category",
            "pagination follows concrete categories; 'all' has no cursor of its own",
        ));
    }
    Ok(())
}

/// Pages through one category of a search.
#[derive(Debug)]
pub struct SearchPager {
    client: TroveClient,
    params: SearchParams,
    category: Category,
    state: CursorState,
    pages: usize,
    records: usize,
    max_pages: Option<usize>,
    max_records: Option<usize>,
}

impl SearchPager {
    /// Start paging. A cursor already set in `params` is resumed from.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid parameters or anything other
    /// than exactly one concrete category.
    pub fn new(client: TroveClient, mut params: SearchParams) -> ClientResult<Self> {
        params.validate()?;
        concrete_category(&params)?;
        let category = params.single_category().ok_or_else(|| {
            ClientError::validation(
                "category",
                "a pager follows one category; use MultiCategoryPager for several",
            )
        })?;
        let state = CursorState::from_cursor(params.cursor.take());

        Ok(Self {
            client,
            params,
            category,
            state,
            pages: 0,
            records: 0,
            max_pages: None,
            max_records: None,
        })
    }

    /// Stop after `n` pages.
    #[must_use]
    pub fn max_pages(mut self, n: usize) -> Self {
        self.max_pages = Some(n);
        self
    }

    /// Stop after `n` records. Page sizes shrink to avoid over-fetching.
    #[must_use]
    pub fn max_records(mut self, n: usize) -> Self {
        self.max_records = Some(n);
        self
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub const fn state(&self) -> &CursorState {
        &self.state
    }

    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages
    }

    #[must_use]
    pub const fn records_fetched(&self) -> usize {
        self.records
    }

    fn remaining_records(&self) -> Option<usize> {
        self.max_records.map(|max| max.saturating_sub(self.records))
    }

    /// Whether a page or record bound has been reached. The cursor is kept,
    /// so [`CursorState::resume_cursor`] still points at the next page.
    #[must_use]
    pub fn is_capped(&self) -> bool {
        self.max_pages.is_some_and(|max| self.pages >= max) || self.remaining_records() == Some(0)
    }

    /// Fetch the next page, or `None` once the results are exhausted or a
    /// bound is reached.
    ///
    /// # Errors
    ///
    /// Returns error on API failure. The pager state is left unchanged, so the
    /// call can be retried.
    pub async fn next_page(&mut self) -> ClientResult<Option<CategoryResult>> {
        if self.is_capped() {
            return Ok(None);
        }
        let Some(cursor) = self.state.as_param().map(str::to_string) else {
            return Ok(None);
        };

        let mut request = self.params.clone();
        request.cursor = Some(cursor.clone());
        if let Some(remaining) = self.remaining_records() {
            let page_size = request.page_size.unwrap_or(limits::DEFAULT_PAGE_SIZE) as usize;
            request.page_size = Some(page_size.min(remaining) as u32);
        }

        let page = self.client.search(&request).await?.into_category(self.category);
        self.state = CursorState::after(&cursor, page.as_ref());
        debug!(category = %self.category, page = self.pages + 1, state = ?self.state, "fetched page");

        match page {
            Some(page) if page.record_count() > 0 => {
                self.pages += 1;
                self.records += page.record_count();
                Ok(Some(page))
            }
            _ => Ok(None),
        }
    }

    /// Stream records one at a time across pages.
    pub fn into_stream(self) -> impl Stream<Item = ClientResult<AnyRecord>> {
        let limit = self.max_records;
        try_stream! {
            let mut pager = self;
            let mut yielded = 0usize;
            let mut done = false;
            while !done {
                let Some(page) = pager.next_page().await? else {
                    break;
                };
                for record in page.into_records() {
                    if limit.is_some_and(|max| yielded >= max) {
                        done = true;
                        break;
                    }
                    yielded += 1;
                    yield record;
                }
            }
        }
    }

    /// Collect up to `limit` records.
    ///
    /// # Errors
    ///
    /// Returns the first API error.
    pub async fn collect_records(self, limit: usize) -> ClientResult<Vec<AnyRecord>> {
        let stream = self.max_records(limit).into_stream();
        let stream = std::pin::pin!(stream);
        stream.try_collect().await
    }
}

/// Pages through several categories of one logical query.
///
/// The first round sends the multi-category query once. Later rounds send
/// one single-category request per still-active category, concurrently, each
/// with that category's own cursor.
#[derive(Debug)]
pub struct MultiCategoryPager {
    client: TroveClient,
    params: SearchParams,
    cursors: BTreeMap<Category, CursorState>,
    pages: BTreeMap<Category, usize>,
    max_pages: Option<usize>,
}

impl MultiCategoryPager {
    /// Start paging every requested category.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid parameters or `all`.
    pub fn new(client: TroveClient, mut params: SearchParams) -> ClientResult<Self> {
        params.validate()?;
        concrete_category(&params)?;

        let initial = params.cursor.take();
        let cursors = params
            .categories
            .iter()
            .map(|c| (*c, CursorState::from_cursor(initial.clone())))
            .collect();
        let pages = params.categories.iter().map(|c| (*c, 0)).collect();

        Ok(Self { client, params, cursors, pages, max_pages: None })
    }

    /// Stop each category after `n` pages.
    #[must_use]
    pub fn max_pages(mut self, n: usize) -> Self {
        self.max_pages = Some(n);
        self
    }

    /// Cursor state of one category.
    #[must_use]
    pub fn cursor(&self, category: Category) -> Option<&CursorState> {
        self.cursors.get(&category)
    }

    /// Pages fetched so far for one category.
    #[must_use]
    pub fn pages_fetched(&self, category: Category) -> usize {
        self.pages.get(&category).copied().unwrap_or(0)
    }

    fn is_capped(&self, category: Category) -> bool {
        self.max_pages.is_some_and(|max| self.pages_fetched(category) >= max)
    }

    /// Categories with pages left under the page bound, in category order.
    #[must_use]
    pub fn active_categories(&self) -> Vec<Category> {
        self.cursors
            .iter()
            .filter(|(category, state)| !state.is_exhausted() && !self.is_capped(**category))
            .map(|(category, _)| *category)
            .collect()
    }

    /// Whether no category has anything left to fetch.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.active_categories().is_empty()
    }

    fn record_page(&mut self, category: Category, sent: &str, page: Option<&CategoryResult>) {
        let fetched = self.pages.entry(category).or_insert(0);
        if page.is_some_and(|p| p.record_count() > 0) {
            *fetched += 1;
        }
        let state = CursorState::after(sent, page);
        debug!(%category, pages = *fetched, state = ?state, "category advanced");
        self.cursors.insert(category, state);
    }

    fn request_for(&self, category: Category) -> Option<(String, SearchParams)> {
        if self.is_capped(category) {
            return None;
        }
        let cursor = self.cursors.get(&category)?.as_param()?.to_string();
        let params = self.params.for_category(category, Some(&cursor));
        Some((cursor, params))
    }

    /// Fetch the next page of every active category.
    ///
    /// Returns one result per category that produced records. An empty
    /// vector means every category is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the first API error; cursors are left unchanged.
    pub async fn next_round(&mut self) -> ClientResult<Vec<CategoryResult>> {
        let active = self.active_categories();
        if active.is_empty() {
            return Ok(Vec::new());
        }

        let fresh = self.cursors.values().all(|s| *s == CursorState::Start);
        if fresh && active.len() > 1 {
            let response = self.client.search(&self.params).await?;
            let mut pages = Vec::new();
            for category in active {
                let page = response.category(category).cloned();
                self.record_page(category, START_CURSOR, page.as_ref());
                pages.extend(page.filter(|p| p.record_count() > 0));
            }
            return Ok(pages);
        }

        let requests: Vec<(Category, String, SearchParams)> = active
            .into_iter()
            .filter_map(|c| self.request_for(c).map(|(cursor, params)| (c, cursor, params)))
            .collect();

        let client = &self.client;
        let responses = futures::future::try_join_all(
            requests.iter().map(|(_, _, params)| client.search(params)),
        )
        .await?;

        let mut pages = Vec::new();
        for ((category, cursor, _), response) in requests.into_iter().zip(responses) {
            let page = response.into_category(category);
            self.record_page(category, &cursor, page.as_ref());
            pages.extend(page.filter(|p| p.record_count() > 0));
        }
        Ok(pages)
    }

    /// Fetch the next page of one category, leaving the others untouched.
    ///
    /// # Errors
    ///
    /// Returns error if `category` was not requested, or on API failure.
    pub async fn advance(&mut self, category: Category) -> ClientResult<Option<CategoryResult>> {
        if !self.cursors.contains_key(&category) {
            return Err(ClientError::validation(
                "category",
                format!("'{category}' is not part of this query"),
            ));
        }
        let Some((cursor, params)) = self.request_for(category) else {
            return Ok(None);
        };

        let page = self.client.search(&params).await?.into_category(category);
        self.record_page(category, &cursor, page.as_ref());
        Ok(page.filter(|p| p.record_count() > 0))
    }
}
