//! Stateful, paginated view over the interactions list.
//!
//! Loads are split into [`InteractionsView::begin`] and
//! [`InteractionsView::settle`] so a caller can render the loading state in
//! between. When loads overlap, whichever settles last determines the state.

use crate::error::{error_message, ApiError};
use crate::interactions::InteractionsClient;
use crate::transport::Transport;
use tracing::{debug, warn};
use workbench_core::{Interaction, InteractionQuery, Page, QueryPatch};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub data: Page<Interaction>,
    pub loading: bool,
    pub error: Option<String>,
    pub query: InteractionQuery,
}

/// A load that has been started but not yet settled.
#[derive(Debug)]
#[must_use = "a pending load must be settled"]
pub struct PendingLoad {
    seq: u64,
    query: InteractionQuery,
}

impl PendingLoad {
    pub fn query(&self) -> &InteractionQuery {
        &self.query
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

pub struct InteractionsView<T> {
    client: InteractionsClient<T>,
    state: QueryState,
    default_size: u32,
    issued: u64,
}

impl<T: Transport> InteractionsView<T> {
    /// Builds the view without loading anything.
    ///
    /// The starting query is the first page at `default_size`, overlaid
    /// with `initial`.
    pub fn new(client: InteractionsClient<T>, initial: &InteractionQuery, default_size: u32) -> Self {
        let query = InteractionQuery::first_page(default_size).overlay(initial);
        Self {
            client,
            state: QueryState {
                data: Page::empty(default_size),
                loading: false,
                error: None,
                query,
            },
            default_size,
            issued: 0,
        }
    }

    /// Builds the view and loads its first page.
    pub fn mount(client: InteractionsClient<T>, initial: &InteractionQuery, default_size: u32) -> Self {
        let mut view = Self::new(client, initial, default_size);
        view.refresh();
        view
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn data(&self) -> &Page<Interaction> {
        &self.state.data
    }

    pub fn query(&self) -> &InteractionQuery {
        &self.state.query
    }

    pub fn loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn client(&self) -> &InteractionsClient<T> {
        &self.client
    }

    pub fn default_size(&self) -> u32 {
        self.default_size
    }

    /// Applies a filter change; the page resets to 0 unless the patch
    /// names one.
    pub fn search(&mut self, patch: &QueryPatch) {
        let pending = self.begin_search(patch);
        self.finish(pending);
    }

    pub fn set_page(&mut self, page: u32) {
        let pending = self.begin_page(page);
        self.finish(pending);
    }

    pub fn refresh(&mut self) {
        let pending = self.begin_refresh();
        self.finish(pending);
    }

    /// Starts the load `search` would run, leaving fetch and settle to the caller.
    pub fn begin_search(&mut self, patch: &QueryPatch) -> PendingLoad {
        let next = self.state.query.apply(patch, self.default_size);
        self.begin(next)
    }

    pub fn begin_page(&mut self, page: u32) -> PendingLoad {
        self.begin_search(&QueryPatch::page(page))
    }

    pub fn begin_refresh(&mut self) -> PendingLoad {
        self.begin(self.state.query.clone())
    }

    pub fn load(&mut self, query: InteractionQuery) {
        let pending = self.begin(query);
        self.finish(pending);
    }

    fn finish(&mut self, pending: PendingLoad) {
        let result = self.fetch(&pending);
        self.settle(pending, result);
    }

    pub fn begin(&mut self, query: InteractionQuery) -> PendingLoad {
        self.issued += 1;
        self.state.loading = true;
        self.state.error = None;
        debug!(seq = self.issued, "loading interactions");
        PendingLoad {
            seq: self.issued,
            query,
        }
    }

    pub fn fetch(&self, pending: &PendingLoad) -> Result<Page<Interaction>, ApiError> {
        self.client.fetch_interactions(&pending.query)
    }

    /// Records the outcome of a load. A failure keeps the previous page.
    pub fn settle(&mut self, pending: PendingLoad, result: Result<Page<Interaction>, ApiError>) {
        if pending.seq != self.issued {
            debug!(
                seq = pending.seq,
                latest = self.issued,
                "settling a superseded load"
            );
        }
        match result {
            Ok(page) => {
                self.state.query = pending.query.reconcile(page.number, page.size);
                self.state.data = page;
            }
            Err(err) => {
                let message = error_message(&err);
                warn!(error = %message, "failed to load interactions");
                self.state.error = Some(message);
            }
        }
        self.state.loading = false;
    }
}
