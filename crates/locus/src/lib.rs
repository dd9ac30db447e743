//! Locus - nearest-location resolution and debounced geocoding search
//!
//! Locus is the location core of a storefront app: it ranks venues (cinemas,
//! restaurant branches, hotels) by great-circle distance and drives the
//! "search for a place" box, turning keystrokes into at most one in-flight
//! geocoding request whose result is only ever applied if it is still the
//! freshest one.
//!
//! # Quick Start
//!
//! ```rust
//! use locus::{Coordinate, Venue, geo};
//!
//! let cinemas = vec![
//!     Venue::new("ikeja", "Ikeja City Mall", Coordinate::new(6.6142, 3.3580)),
//!     Venue::new("lekki", "Palms Mall", Coordinate::new(6.4352, 3.4498)),
//! ];
//! let me = Coordinate::new(6.44, 3.45);
//!
//! let (_, nearest) = geo::nearest(me, &cinemas).expect("at least one cinema");
//! assert_eq!(nearest.id, "lekki");
//! ```
//!
//! Searching goes through a [`SearchController`] backed by any
//! [`LocationLookup`] provider, such as the in-memory [`StaticLookup`] or the
//! Google Geocoding client in the `locus-google` crate.
//!
//! # Features
//!
//! - **Haversine distance** in metres and first-wins nearest selection
//! - **Debounced search** with configurable quiet period
//! - **Single flight**: a new dispatch cancels the previous request
//! - **Stale-safe**: responses are applied "last dispatch wins", never "last arrival wins"
//! - **Reverse geocoding** of a device fix through the same pipeline
//! - **Observable state** via a `tokio::sync::watch` channel
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
pub mod error;
pub mod geo;
mod search;

pub use config::{
    DEFAULT_CONNECTIVITY_MESSAGE, DEFAULT_DEBOUNCE, DEFAULT_MAX_RESULTS, DEFAULT_REQUEST_TIMEOUT,
    SearchControllerConfig, SearchControllerConfigBuilder,
};
pub use geo::{Coordinate, Located, Venue};
pub use search::{
    CancelHandle, CancelToken, LocationLookup, LocationRecord, SearchController, SearchError,
    SearchState, StaticLookup, humanize,
};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Locus library.
///
/// This sets up structured logging with configurable levels and filtering.
/// `RUST_LOG` takes precedence over `level` when set. Calling it again is a
/// no-op.
///
/// # Examples
///
/// ```rust
/// use locus::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), locus::error::LocusError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> error::Result<&'static ()> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|e| error::LocusError::Other(anyhow::anyhow!(e)))?;
        Ok(())
    })
}
