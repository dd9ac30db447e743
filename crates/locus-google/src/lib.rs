//! Google Geocoding provider for Locus
//!
//! [`GoogleGeocoder`] implements [`locus::LocationLookup`] on top of the
//! [Geocoding API](https://developers.google.com/maps/documentation/geocoding),
//! so it can back a [`locus::SearchController`] directly:
//!
//! ```rust,no_run
//! use locus::SearchController;
//! use locus_google::GoogleGeocoder;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let geocoder = GoogleGeocoder::builder(std::env::var("GOOGLE_MAPS_API_KEY")?)
//!     .region("ng")
//!     .build()?;
//! let controller = SearchController::new(geocoder);
//! controller.set_query("Palms Mall Lekki");
//! # Ok(())
//! # }
//! ```
//!
//! Connection failures are reported as [`locus::SearchError::Network`] so the
//! controller can show its connectivity message, API error statuses as
//! [`locus::SearchError::Remote`] with Google's own message.

mod client;
pub mod error;
mod response;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, GoogleGeocoder, GoogleGeocoderBuilder};
pub use error::GoogleError;
pub use response::decode_response;
