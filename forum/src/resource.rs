//! Remote resource: fetched data plus its loading and error flags.
//!
//! Every fetch is stamped with a [`FetchTicket`]. Starting a new fetch or
//! cancelling invalidates older tickets, so a response that arrives after it
//! was superseded is dropped instead of overwriting newer data.

use std::fmt::Display;
use std::future::Future;

use tracing::debug;

/// Generation stamp handed out by [`Resource::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// What a view should show for a resource.
#[derive(Debug, PartialEq, Eq)]
pub enum View<'a, T> {
    /// Nothing requested yet.
    Idle,
    /// First fetch in flight.
    Loading,
    /// No data and the last fetch failed.
    Failed(&'a str),
    /// Data available. It may be stale while a refresh is in flight.
    Ready(&'a T),
}

#[derive(Debug)]
pub struct Resource<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Resource<T> {
    pub const fn new() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[cfg(test)]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Start a fetch. Any ticket handed out earlier becomes stale.
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    /// Whether `ticket` belongs to the most recent fetch.
    pub const fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Apply the result of the fetch identified by `ticket`.
    ///
    /// Returns `false` and changes nothing when the ticket is stale. On
    /// failure previous data is kept and the error recorded.
    pub fn finish<E: Display>(&mut self, ticket: FetchTicket, result: Result<T, E>) -> bool {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "dropping superseded fetch result"
            );
            return false;
        }

        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }

    /// Invalidate any in-flight fetch.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.loading = false;
    }

    /// Cancel and drop all data and errors.
    pub fn reset(&mut self) {
        self.cancel();
        self.data = None;
        self.error = None;
    }

    /// Run `fetch` to completion and apply its result.
    pub async fn refresh<F, Fut, E>(&mut self, fetch: F) -> bool
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let ticket = self.begin();
        let result = fetch().await;
        self.finish(ticket, result)
    }

    pub fn view(&self) -> View<'_, T> {
        if let Some(data) = &self.data {
            View::Ready(data)
        } else if self.loading {
            View::Loading
        } else if let Some(error) = &self.error {
            View::Failed(error)
        } else {
            View::Idle
        }
    }
}
