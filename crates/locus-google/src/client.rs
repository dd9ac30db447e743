use std::fmt;
use std::time::Duration;

use futures::future::BoxFuture;
use locus::{CancelToken, Coordinate, LocationLookup, LocationRecord, SearchError};
use reqwest::{Client, Url};
use tracing::{debug, instrument};

use crate::error::{GoogleError, Result};
use crate::response::decode_response;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

const REDACTED: &str = "<redacted>";

/// Google Geocoding API client usable as a [`LocationLookup`].
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: Client,
    base_url: Url,
    api_key: String,
    region: Option<String>,
    language: Option<String>,
    timeout: Duration,
}

impl GoogleGeocoder {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> GoogleGeocoderBuilder {
        GoogleGeocoderBuilder::new(api_key)
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("key", self.api_key.clone())];
        if let Some(region) = &self.region {
            params.push(("region", region.clone()));
        }
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        params
    }

    #[instrument(name = "Google geocode", level = "debug", skip_all)]
    async fn fetch(
        &self,
        mut params: Vec<(&'static str, String)>,
        cancel: CancelToken,
    ) -> std::result::Result<Vec<LocationRecord>, SearchError> {
        params.extend(self.params());
        let request = self.client.get(self.base_url.clone()).query(&params);

        let call = async {
            let response = request
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| self.transport_error(e))?;
            let body = response.text().await.map_err(|e| self.transport_error(e))?;
            decode_response(&body)
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("Geocoding request cancelled");
                Err(SearchError::Cancelled)
            }
            res = call => res,
        }
    }

    /// Classify a transport failure. The request URL carries the API key, so it
    /// is stripped before the error is rendered.
    fn transport_error(&self, err: reqwest::Error) -> SearchError {
        let err = err.without_url();
        if err.is_timeout() {
            SearchError::Timeout(self.timeout)
        } else if err.is_connect() || err.is_request() {
            SearchError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            SearchError::Remote(format!("Geocoding service returned status {status}"))
        } else if err.is_decode() || err.is_body() {
            SearchError::Decode(err.to_string())
        } else {
            SearchError::Remote(err.to_string())
        }
    }
}

impl fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &REDACTED)
            .field("region", &self.region)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LocationLookup for GoogleGeocoder {
    fn search(
        &self,
        query: String,
        cancel: CancelToken,
    ) -> BoxFuture<'_, std::result::Result<Vec<LocationRecord>, SearchError>> {
        Box::pin(self.fetch(vec![("address", query)], cancel))
    }

    fn reverse_geocode(
        &self,
        coordinate: Coordinate,
        cancel: CancelToken,
    ) -> BoxFuture<'_, std::result::Result<Vec<LocationRecord>, SearchError>> {
        let latlng = format!("{},{}", coordinate.lat, coordinate.lng);
        Box::pin(self.fetch(vec![("latlng", latlng)], cancel))
    }
}

/// Builder for [`GoogleGeocoder`]
#[derive(Clone)]
pub struct GoogleGeocoderBuilder {
    api_key: String,
    base_url: String,
    region: Option<String>,
    language: Option<String>,
    timeout: Duration,
    client: Option<Client>,
}

impl fmt::Debug for GoogleGeocoderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleGeocoderBuilder")
            .field("base_url", &self.base_url)
            .field("api_key", &REDACTED)
            .field("region", &self.region)
            .field("language", &self.language)
            .field("timeout", &self.timeout)
            .field("client", &self.client.is_some())
            .finish()
    }
}

impl GoogleGeocoderBuilder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            region: None,
            language: None,
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }

    /// Use a preconfigured HTTP client (shared connection pool, proxy settings).
    ///
    /// The client's own timeout applies; [`timeout`](Self::timeout) is then only
    /// used to label timeout errors.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Point the client at a different endpoint (a proxy, or a local test server)
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bias results towards a ccTLD region code, e.g. "ng"
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Transport level timeout for each request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GoogleGeocoder> {
        if self.api_key.trim().is_empty() {
            return Err(GoogleError::MissingApiKey);
        }
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| GoogleError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .user_agent(concat!("locus/", env!("CARGO_PKG_VERSION")))
                .build()?,
        };

        Ok(GoogleGeocoder {
            client,
            base_url,
            api_key: self.api_key,
            region: self.region,
            language: self.language,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let geocoder = GoogleGeocoder::new("test-key").unwrap();
        assert_eq!(geocoder.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(geocoder.timeout, DEFAULT_TIMEOUT);
        assert_eq!(geocoder.params(), vec![("key", "test-key".to_string())]);
    }

    #[test]
    fn test_builder_options_become_params() {
        let geocoder = GoogleGeocoder::builder("k")
            .region("ng")
            .language("en")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(
            geocoder.params(),
            vec![
                ("key", "k".to_string()),
                ("region", "ng".to_string()),
                ("language", "en".to_string()),
            ]
        );
        assert_eq!(geocoder.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let builder = GoogleGeocoder::builder("SECRET-API-KEY").region("ng");
        let rendered = format!("{builder:?}");
        assert!(!rendered.contains("SECRET-API-KEY"), "{rendered}");
        assert!(rendered.contains("<redacted>"));

        let geocoder = builder.build().unwrap();
        let rendered = format!("{geocoder:?}");
        assert!(!rendered.contains("SECRET-API-KEY"), "{rendered}");
        assert!(rendered.contains("region: Some(\"ng\")"), "{rendered}");
    }

    #[test]
    fn test_builder_rejects_bad_input() {
        assert!(matches!(
            GoogleGeocoder::new("  "),
            Err(GoogleError::MissingApiKey)
        ));
        assert!(matches!(
            GoogleGeocoder::builder("k").base_url("not a url").build(),
            Err(GoogleError::InvalidBaseUrl(_))
        ));
    }
}
