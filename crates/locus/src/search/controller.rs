//! The debounced search state machine.
//!
//! ```text
//!   Idle/Settled/Errored --set_query--> Debouncing --timer, query empty--> Idle
//!                                           |
//!                                           +--timer, query non-empty--> Searching
//!   Searching --current response--> Settled(results)
//!   Searching --cancellation-----> Idle
//!   Searching --failure----------> Errored(message)
//!   any --dismiss/cancel/select--> Idle
//! ```
//!
//! Every dispatch gets a sequence number. A completion is applied only while
//! its sequence is the latest dispatch and its query still equals the current
//! query; anything else is a stale response and is dropped. The previous
//! request is also cancelled at dispatch time, but correctness does not rely
//! on the transport honouring that.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::{
    CancelHandle, CancelToken, LocationLookup, LocationRecord, Result, SearchError, humanize,
};
use crate::{config::SearchControllerConfig, geo::Coordinate};

/// Observable state of a [`SearchController`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    /// Waiting for the query to settle before dispatching
    Debouncing { query: String },
    /// A lookup is in flight
    Searching { query: String },
    Settled {
        query: String,
        results: Vec<LocationRecord>,
    },
    /// The last lookup failed; `message` is ready to show to a user
    Errored { message: String },
}

impl SearchState {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Debouncing { .. } | Self::Searching { .. })
    }

    /// Results of a settled search, empty in every other state.
    pub fn results(&self) -> &[LocationRecord] {
        match self {
            Self::Settled { results, .. } => results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Errored { message } => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Request {
    Search(String),
    Reverse(Coordinate),
}

impl Request {
    fn label(&self) -> String {
        match self {
            Self::Search(query) => query.clone(),
            Self::Reverse(c) => format!("{},{}", c.lat, c.lng),
        }
    }
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    request: Request,
    /// Edit counter at dispatch time, used to age out reverse lookups
    edits: u64,
    cancel: CancelHandle,
}

#[derive(Debug, Default)]
struct Core {
    query: String,
    edits: u64,
    dispatched: u64,
    debounce: Option<JoinHandle<()>>,
    in_flight: Option<InFlight>,
    last_failed: Option<Request>,
    selected: Option<LocationRecord>,
}

impl Core {
    fn abort_debounce(&mut self) {
        if let Some(handle) = self.debounce.take() {
            handle.abort();
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(prev) = self.in_flight.take() {
            debug!(seq = prev.seq, "Cancelling outstanding request");
            prev.cancel.cancel();
        }
    }

    /// Apply the outcome of request `seq`, returning the state to publish if it is still current.
    fn reconcile(
        &mut self,
        seq: u64,
        outcome: Result<Vec<LocationRecord>>,
        config: &SearchControllerConfig,
    ) -> Option<SearchState> {
        let Some(in_flight) = self.in_flight.as_ref() else {
            debug!(seq, "Dropping response, nothing in flight");
            return None;
        };
        if in_flight.seq != seq {
            debug!(seq, latest = in_flight.seq, "Dropping stale response");
            return None;
        }
        let current = match &in_flight.request {
            Request::Search(query) => query.as_str() == self.query.trim(),
            Request::Reverse(_) => in_flight.edits == self.edits,
        };
        let in_flight = self.in_flight.take()?;
        if !current {
            debug!(seq, "Dropping response, query changed since dispatch");
            return None;
        }

        match outcome {
            Ok(mut results) => {
                results.truncate(config.max_results);
                info!(seq, results = results.len(), "Location search settled");
                Some(SearchState::Settled {
                    query: in_flight.request.label(),
                    results,
                })
            }
            Err(SearchError::Cancelled) => {
                debug!(seq, "Request cancelled by transport");
                Some(SearchState::Idle)
            }
            Err(err) => {
                warn!(seq, error = %err, "Location search failed");
                let message = humanize(&err, &config.connectivity_message).unwrap_or_default();
                self.last_failed = Some(in_flight.request);
                Some(SearchState::Errored { message })
            }
        }
    }
}

struct Shared {
    lookup: Arc<dyn LocationLookup>,
    config: SearchControllerConfig,
    core: Mutex<Core>,
    state: watch::Sender<SearchState>,
}

impl Shared {
    fn publish(&self, state: SearchState) {
        debug!(?state, "Search state changed");
        self.state.send_replace(state);
    }

    fn debounce_elapsed(self: &Arc<Self>, edit: u64) {
        let mut core = self.core.lock();
        if core.edits != edit {
            // a newer edit rescheduled the dispatch
            return;
        }
        core.debounce = None;

        let query = core.query.trim().to_string();
        if query.is_empty() {
            core.cancel_in_flight();
            self.publish(SearchState::Idle);
            return;
        }
        self.dispatch(&mut core, Request::Search(query));
    }

    #[instrument(name = "Dispatch location lookup", level = "debug", skip_all, fields(request = ?request))]
    fn dispatch(self: &Arc<Self>, core: &mut Core, request: Request) {
        core.cancel_in_flight();
        core.last_failed = None;
        core.dispatched += 1;
        let seq = core.dispatched;

        let cancel = CancelHandle::new();
        let token = cancel.token();
        core.in_flight = Some(InFlight {
            seq,
            request: request.clone(),
            edits: core.edits,
            cancel,
        });
        debug!(seq, "Dispatching lookup");
        self.publish(SearchState::Searching {
            query: request.label(),
        });

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = shared.run(&request, token).await;
            shared.complete(seq, outcome);
        });
    }

    async fn run(&self, request: &Request, token: CancelToken) -> Result<Vec<LocationRecord>> {
        let lookup = match request {
            Request::Search(query) => self.lookup.search(query.clone(), token.clone()),
            Request::Reverse(coordinate) => self.lookup.reverse_geocode(*coordinate, token.clone()),
        };
        let timeout = self.config.request_timeout;
        tokio::select! {
            biased;
            () = token.cancelled() => Err(SearchError::Cancelled),
            res = tokio::time::timeout(timeout, lookup) => {
                res.unwrap_or(Err(SearchError::Timeout(timeout)))
            }
        }
    }

    fn complete(&self, seq: u64, outcome: Result<Vec<LocationRecord>>) {
        let mut core = self.core.lock();
        if let Some(state) = core.reconcile(seq, outcome, &self.config) {
            self.publish(state);
        }
    }

    /// Drop all outstanding work. Invalidates a debounce task that already woke up.
    fn halt(&self, core: &mut Core) {
        core.abort_debounce();
        core.edits += 1;
        core.cancel_in_flight();
        core.last_failed = None;
    }
}

/// Debounced, single-flight location search.
///
/// All methods that schedule work spawn onto the ambient tokio runtime and
/// panic outside of one.
///
/// # Examples
///
/// ```rust
/// use locus::{Coordinate, LocationRecord, SearchController, SearchState, StaticLookup};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let lookup = StaticLookup::new(vec![LocationRecord::new(
///     "Palms Mall",
///     "1 Bisway St, Lekki, Lagos",
///     Coordinate::new(6.4352, 3.4498),
/// )]);
/// let controller = SearchController::new(lookup);
/// let mut states = controller.subscribe();
///
/// controller.set_query("palms");
/// let state = states
///     .wait_for(|s| matches!(s, SearchState::Settled { .. }))
///     .await
///     .unwrap();
/// assert_eq!(state.results()[0].name, "Palms Mall");
/// # }
/// ```
pub struct SearchController {
    shared: Arc<Shared>,
}

impl SearchController {
    /// A controller with the default configuration.
    pub fn new(lookup: impl LocationLookup) -> Self {
        Self::from_parts(Arc::new(lookup), SearchControllerConfig::default())
    }

    pub fn with_config(
        lookup: impl LocationLookup,
        config: SearchControllerConfig,
    ) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(Arc::new(lookup), config))
    }

    fn from_parts(lookup: Arc<dyn LocationLookup>, config: SearchControllerConfig) -> Self {
        let (state, _rx) = watch::channel(SearchState::Idle);
        Self {
            shared: Arc::new(Shared {
                lookup,
                config,
                core: Mutex::new(Core::default()),
                state,
            }),
        }
    }

    pub fn config(&self) -> &SearchControllerConfig {
        &self.shared.config
    }

    /// Record a query edit and (re)start the debounce timer.
    ///
    /// Setting the query it already holds is not an edit and changes nothing.
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let mut core = self.shared.core.lock();
        if core.query == query {
            return;
        }
        core.abort_debounce();
        core.query.clone_from(&query);
        core.edits += 1;
        core.last_failed = None;

        let edit = core.edits;
        let delay = self.shared.config.debounce;
        let shared = Arc::clone(&self.shared);
        core.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.debounce_elapsed(edit);
        }));
        self.shared.publish(SearchState::Debouncing { query });
    }

    /// Reverse geocode a device fix right away, superseding any typed query.
    pub fn locate(&self, coordinate: Coordinate) {
        let mut core = self.shared.core.lock();
        core.abort_debounce();
        core.query.clear();
        core.edits += 1;
        self.shared.dispatch(&mut core, Request::Reverse(coordinate));
    }

    /// Re-dispatch the request that last failed. Returns `false` when there is nothing to retry.
    pub fn retry(&self) -> bool {
        let mut core = self.shared.core.lock();
        let Some(request) = core.last_failed.take() else {
            return false;
        };
        info!(request = ?request, "Retrying location search");
        self.shared.dispatch(&mut core, request);
        true
    }

    /// Cancel outstanding work and go back to `Idle`, keeping the typed query.
    pub fn cancel(&self) {
        let mut core = self.shared.core.lock();
        self.shared.halt(&mut core);
        self.shared.publish(SearchState::Idle);
    }

    /// Close the search: cancel outstanding work and clear the query, results and error.
    pub fn dismiss(&self) {
        let mut core = self.shared.core.lock();
        self.shared.halt(&mut core);
        core.query.clear();
        self.shared.publish(SearchState::Idle);
    }

    /// Pick a record out of the settled result set and close the search.
    pub fn select(&self, index: usize) -> Option<LocationRecord> {
        let mut core = self.shared.core.lock();
        let record = self.shared.state.borrow().results().get(index).cloned()?;
        self.shared.halt(&mut core);
        core.query.clear();
        core.selected = Some(record.clone());
        self.shared.publish(SearchState::Idle);
        Some(record)
    }

    /// The record most recently picked with [`select`](Self::select).
    pub fn selected(&self) -> Option<LocationRecord> {
        self.shared.core.lock().selected.clone()
    }

    pub fn query(&self) -> String {
        self.shared.core.lock().query.clone()
    }

    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }
}

impl Drop for SearchController {
    fn drop(&mut self) {
        let mut core = self.shared.core.lock();
        self.shared.halt(&mut core);
    }
}
