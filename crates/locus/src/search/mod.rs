//! Debounced, cancellable location search.
//!
//! [`SearchController`] turns a stream of keystroke-level query edits into at
//! most one outstanding [`LocationLookup`] request, and only ever applies the
//! response of the latest dispatch. See the controller docs for the state
//! machine.

pub use error::{SearchError, humanize};
mod cancel;
mod controller;
mod lookup;

pub use cancel::{CancelHandle, CancelToken};
pub use controller::{SearchController, SearchState};
use error::Result;
pub use lookup::{LocationLookup, LocationRecord, StaticLookup};

mod error {
    use std::time::Duration;

    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum SearchError {
        #[error("Request cancelled")]
        Cancelled,
        #[error("Network error: {0}")]
        Network(String),
        #[error("Request timed out after {0:?}")]
        Timeout(Duration),
        #[error("{0}")]
        Remote(String),
        #[error("Failed to decode response: {0}")]
        Decode(String),
    }

    impl SearchError {
        pub const fn is_cancelled(&self) -> bool {
            matches!(self, Self::Cancelled)
        }
    }

    pub type Result<T> = std::result::Result<T, SearchError>;

    /// The message a user should see for `err`, or `None` for a cancellation.
    ///
    /// Anything mentioning "network" is replaced by `connectivity_message`;
    /// every other failure is passed through as-is.
    pub fn humanize(err: &SearchError, connectivity_message: &str) -> Option<String> {
        if err.is_cancelled() {
            return None;
        }
        let message = err.to_string();
        if message.to_lowercase().contains("network") {
            Some(connectivity_message.to_string())
        } else {
            Some(message)
        }
    }

}
