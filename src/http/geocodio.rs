use crate::http::api_client::ApiClient;
use crate::schemas::geocodio::{GeocodioBatchResponse, GeocodioResponse};
use crate::warn;
use anyhow::Result;
use std::collections::HashMap;
use std::time::Duration;

const BASE_URL: &str = "https://api.geocod.io/v1.7/";

pub struct GeocodioClient {
    api: ApiClient,
    api_key: String,
}

impl GeocodioClient {
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(BASE_URL, Duration::from_secs(timeout_secs))?,
            api_key: api_key.to_string(),
        })
    }

    pub async fn geocode_one(&self, address: &str) -> Result<Option<(f64, f64)>> {
        let response: GeocodioResponse = self
            .api
            .get("geocode", &[("q", address), ("api_key", &self.api_key)])
            .await?;
        Ok(response
            .results
            .first()
            .map(|best| (best.location.lat, best.location.lng)))
    }

    /// Batch lookup: POST a JSON array of addresses; the reply carries one
    /// entry per query with the query string echoed back. Addresses that
    /// resolve to nothing are logged and left out of the returned map.
    pub async fn geocode_batch(&self, addresses: &[String]) -> Result<HashMap<String, (f64, f64)>> {
        let mut resolved = HashMap::new();
        if addresses.is_empty() {
            return Ok(resolved);
        }

        let response: GeocodioBatchResponse = self
            .api
            .post("geocode", &[("api_key", &self.api_key)], addresses)
            .await?;

        for item in response.results {
            match item.response.results.first() {
                Some(best) => {
                    resolved.insert(item.query, (best.location.lat, best.location.lng));
                }
                None => warn!("no geocode result for {}", item.query),
            }
        }
        Ok(resolved)
    }
}
