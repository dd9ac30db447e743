//! The remote lookup seam and an in-memory provider.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::debug;

use super::{CancelToken, Result, SearchError};
use crate::geo::{self, Coordinate, Located};

/// A single location returned by a lookup.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationRecord {
    /// Short display name, e.g. "Ikeja City Mall"
    pub name: String,
    /// Full human readable address
    pub formatted_address: String,
    pub coordinate: Coordinate,
    /// Provider specific identifier, when the provider has one
    pub place_id: Option<String>,
}

impl LocationRecord {
    pub fn new(
        name: impl Into<String>,
        formatted_address: impl Into<String>,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            name: name.into(),
            formatted_address: formatted_address.into(),
            coordinate,
            place_id: None,
        }
    }

    pub fn with_place_id(mut self, place_id: impl Into<String>) -> Self {
        self.place_id = Some(place_id.into());
        self
    }
}

impl Located for LocationRecord {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// A cancellable forward and reverse geocoding provider.
///
/// Implementations should stop work and return [`SearchError::Cancelled`] once
/// `cancel` fires. Cancellation may arrive after the request already
/// finished; that must be harmless.
pub trait LocationLookup: Send + Sync + 'static {
    /// Forward geocode a free-text query.
    fn search(&self, query: String, cancel: CancelToken) -> BoxFuture<'_, Result<Vec<LocationRecord>>>;

    /// Resolve a raw coordinate (e.g. a GPS fix) into readable locations, best match first.
    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
        cancel: CancelToken,
    ) -> BoxFuture<'_, Result<Vec<LocationRecord>>>;
}

impl<L: LocationLookup + ?Sized> LocationLookup for Arc<L> {
    fn search(&self, query: String, cancel: CancelToken) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
        (**self).search(query, cancel)
    }

    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
        cancel: CancelToken,
    ) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
        (**self).reverse_geocode(coordinate, cancel)
    }
}

/// Lookup over a fixed, in-memory list of records.
///
/// Forward search matches the query case-insensitively against name and
/// address. Reverse lookup returns every record ordered nearest first. An
/// optional latency simulates a network round trip and observes cancellation.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    records: Vec<LocationRecord>,
    latency: Duration,
}

impl StaticLookup {
    pub fn new(records: Vec<LocationRecord>) -> Self {
        Self {
            records,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    async fn wait(&self, cancel: &CancelToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        if self.latency.is_zero() {
            return Ok(());
        }
        tokio::select! {
            () = cancel.cancelled() => Err(SearchError::Cancelled),
            () = tokio::time::sleep(self.latency) => Ok(()),
        }
    }

    fn matching(&self, query: &str) -> Vec<LocationRecord> {
        let needle = query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.formatted_address.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }
}

impl LocationLookup for StaticLookup {
    fn search(&self, query: String, cancel: CancelToken) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
        Box::pin(async move {
            self.wait(&cancel).await?;
            let found = self.matching(&query);
            debug!(query = %query, found = found.len(), "Static lookup search");
            Ok(found)
        })
    }

    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
        cancel: CancelToken,
    ) -> BoxFuture<'_, Result<Vec<LocationRecord>>> {
        Box::pin(async move {
            self.wait(&cancel).await?;
            Ok(geo::by_distance(coordinate, &self.records)
                .into_iter()
                .map(|(idx, _)| self.records[idx].clone())
                .collect())
        })
    }
}
