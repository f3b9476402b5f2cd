//! Single-flight page loader.
//!
//! The loader state is guarded by a short synchronous lock. The `Loading`
//! check and the transition into it happen under that lock before the first
//! await, so two callers on the same task or on different tasks can never
//! both issue a request. The lock is never held across an await.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::api::ApiError;
use crate::models::{Cursor, Page};

use super::cursor::FeedCursor;

/// Fetches one page of a list.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Item: Send;

    async fn fetch_page(&self, cursor: Option<Cursor>, size: u32) -> Result<Page<Self::Item>, ApiError>;
}

/// Receives the results of page loads.
pub trait FeedRenderer<T> {
    /// Drop everything shown so far; called before a first-page request
    fn clear(&mut self);

    fn append(&mut self, items: &[T]);

    /// The first page came back with no items
    fn show_empty(&mut self);

    fn show_error(&mut self, error: &ApiError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
}

/// What a call to [`FeedLoader::load_next`] did.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Another load was already in flight; nothing was sent
    Busy,
    /// The list has no more pages; nothing was sent
    Exhausted,
    /// The first page was empty
    Empty,
    Appended { count: usize, exhausted: bool },
    /// The request failed; the position is unchanged
    Failed(ApiError),
}

impl LoadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }
}

#[derive(Debug)]
struct Inner {
    state: LoaderState,
    cursor: FeedCursor,
}

/// Puts the loader back to `Idle` however the load ends, including when
/// the future is dropped mid-request.
struct LoadingGuard<'a> {
    inner: &'a Mutex<Inner>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.inner.lock().state = LoaderState::Idle;
    }
}

pub struct FeedLoader<S> {
    source: S,
    inner: Mutex<Inner>,
    deadline: Option<Duration>,
}

impl<S: PageSource> FeedLoader<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            inner: Mutex::new(Inner {
                state: LoaderState::Idle,
                cursor: FeedCursor::new(page_size),
            }),
            deadline: None,
        }
    }

    /// Fail any page fetch that takes longer than `deadline`
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self) -> LoaderState {
        self.inner.lock().state
    }

    pub fn is_loading(&self) -> bool {
        self.state() == LoaderState::Loading
    }

    pub fn is_exhausted(&self) -> bool {
        self.inner.lock().cursor.is_exhausted()
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.inner.lock().cursor.cursor().cloned()
    }

    /// Load the next page into `view`, or the first page when `is_initial`.
    pub async fn load_next<V>(&self, is_initial: bool, view: &mut V) -> LoadOutcome
    where
        V: FeedRenderer<S::Item> + Send + ?Sized,
    {
        let (cursor, size) = {
            let mut inner = self.inner.lock();
            if inner.state == LoaderState::Loading {
                debug!(is_initial, "Page load already in flight, skipping");
                return LoadOutcome::Busy;
            }
            if !is_initial && inner.cursor.is_exhausted() {
                debug!("Feed exhausted, skipping");
                return LoadOutcome::Exhausted;
            }
            if is_initial {
                inner.cursor.reset();
            }
            inner.state = LoaderState::Loading;
            (inner.cursor.cursor().cloned(), inner.cursor.page_size())
        };
        let _guard = LoadingGuard { inner: &self.inner };

        if is_initial {
            view.clear();
        }

        debug!(cursor = ?cursor.as_ref().map(Cursor::as_str), size, "Loading page");
        let page = match self.fetch(cursor, size).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, is_initial, "Page load failed");
                view.show_error(&e);
                return LoadOutcome::Failed(e);
            }
        };

        let exhausted = {
            let mut inner = self.inner.lock();
            inner.cursor.advance(page.has_next, page.next_cursor);
            inner.cursor.is_exhausted()
        };

        if is_initial && page.items.is_empty() {
            view.show_empty();
            return LoadOutcome::Empty;
        }

        view.append(&page.items);
        debug!(count = page.items.len(), exhausted, "Page appended");
        LoadOutcome::Appended {
            count: page.items.len(),
            exhausted,
        }
    }

    async fn fetch(&self, cursor: Option<Cursor>, size: u32) -> Result<Page<S::Item>, ApiError> {
        let request = self.source.fetch_page(cursor, size);
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, request)
                .await
                .map_err(|_| {
                    warn!(deadline_ms = deadline.as_millis() as u64, "Page load exceeded deadline");
                    ApiError::Timeout
                })?,
            None => request.await,
        }
    }
}
