use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodioLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodioResult {
    pub location: GeocodioLocation,
    #[serde(default)]
    pub accuracy: f64,
}

/// Body of a single-address lookup; results are ordered best-first.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodioResponse {
    #[serde(default)]
    pub results: Vec<GeocodioResult>,
}

/// One entry of a batch lookup: the query echoed back plus its own response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodioBatchItem {
    pub query: String,
    pub response: GeocodioResponse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodioBatchResponse {
    #[serde(default)]
    pub results: Vec<GeocodioBatchItem>,
}
