use crate::schemas::ApiError;
use anyhow::{Context, Result};
use reqwest::{
    Client, Method, Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const USER_AGENT: &str = concat!("inspections-agent/", env!("CARGO_PKG_VERSION"));

/// Thin JSON client shared by the Geocodio and labeling calls: base-URL
/// joining, optional bearer auth, typed errors on non-success statuses.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    bearer_token: Option<String>,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(base_url).context("invalid base URL")?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            base_url: url,
            bearer_token: None,
            client,
        })
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    fn parse_endpoint(&self, path: &str) -> Result<Url> {
        let mut base_clone = self.base_url.clone();
        let path = path.strip_prefix('/').unwrap_or(path);
        base_clone
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("base URL cannot be a base for paths"))?
            .pop_if_empty()
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(base_clone)
    }

    fn build_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(token) = &self.bearer_token {
            if let Ok(auth_value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, auth_value);
            }
        }

        headers
    }

    async fn request<Request, Response>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, &str)],
        body: Option<&Request>,
    ) -> Result<Response>
    where
        Request: Serialize + ?Sized,
        Response: DeserializeOwned,
    {
        let url = self.parse_endpoint(endpoint)?;
        let mut request = self.client.request(method, url).headers(self.build_headers());

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await.context("request failed")?;

        if response.status().is_success() {
            response
                .json::<Response>()
                .await
                .context("failed to parse JSON response")
        } else {
            let status_code = response.status().as_u16();
            let error_text = response
                .text()
                .await
                .context("failed to read error response")?;

            Err(anyhow::Error::new(ApiError {
                status_code,
                detail: extract_detail(&error_text),
            }))
        }
    }

    pub async fn get<T>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.request(Method::GET, endpoint, query, Option::<&()>::None)
            .await
    }

    pub async fn post<Request, Response>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
        body: &Request,
    ) -> Result<Response>
    where
        Request: Serialize + ?Sized,
        Response: DeserializeOwned,
    {
        self.request(Method::POST, endpoint, query, Some(body)).await
    }
}

/// Providers wrap their error text differently; prefer the structured field
/// when one is present, fall back to the raw body.
fn extract_detail(error_text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(error_text) {
        for field in ["error", "detail", "message"] {
            if let Some(detail) = value.get(field) {
                if let Some(s) = detail.as_str() {
                    return s.to_string();
                }
                if let Some(s) = detail.get("message").and_then(|m| m.as_str()) {
                    return s.to_string();
                }
            }
        }
    }
    error_text.to_string()
}
