use locus::{Coordinate, LocationRecord, SearchError};
use serde::Deserialize;
use tracing::debug;

/// Component types that name the place itself rather than where it is.
const NAMED_PLACE_TYPES: &[&str] = &["establishment", "point_of_interest", "premise"];

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    long_name: String,
    #[serde(default)]
    types: Vec<String>,
}

impl GeocodeResult {
    fn display_name(&self) -> String {
        self.address_components
            .iter()
            .find(|c| c.types.iter().any(|t| NAMED_PLACE_TYPES.contains(&t.as_str())))
            .map(|c| c.long_name.clone())
            .unwrap_or_else(|| {
                self.formatted_address
                    .split(',')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string()
            })
    }

    fn into_record(self) -> LocationRecord {
        let record = LocationRecord::new(
            self.display_name(),
            self.formatted_address,
            Coordinate::new(self.geometry.location.lat, self.geometry.location.lng),
        );
        match self.place_id {
            Some(place_id) => record.with_place_id(place_id),
            None => record,
        }
    }
}

/// Decode a Geocoding API JSON body into location records.
///
/// `ZERO_RESULTS` is an empty result set, not an error. Any other non-`OK`
/// status becomes [`SearchError::Remote`] carrying the API's `error_message`
/// when present, the bare status otherwise.
pub fn decode_response(body: &str) -> Result<Vec<LocationRecord>, SearchError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;

    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .map(GeocodeResult::into_record)
            .collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        status => {
            debug!(status, "Geocoding API returned an error status");
            Err(SearchError::Remote(
                response.error_message.unwrap_or_else(|| status.to_string()),
            ))
        }
    }
}
