use crate::config::Settings;
use crate::http::api_client::USER_AGENT;
use crate::schemas::ApiError;
use crate::{debug, info};
use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;

/// Download the published report export (an XLSX workbook) into memory.
///
/// The reporting host sets session cookies on the first response and the
/// workbook can run to tens of megabytes, so the body is streamed rather
/// than buffered by reqwest in one piece.
pub async fn download(settings: &Settings) -> Result<Vec<u8>> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .cookie_store(true)
        .timeout(Duration::from_secs(settings.request_timeout_secs))
        .build()
        .context("failed to build download client")?;

    info!("downloading export from {}", settings.export_url);
    let response = client
        .get(&settings.export_url)
        .send()
        .await
        .context("export request failed")?;

    if !response.status().is_success() {
        let status_code = response.status().as_u16();
        let detail = response.text().await.unwrap_or_else(|_| "<no body>".into());
        return Err(anyhow::Error::new(ApiError {
            status_code,
            detail,
        }));
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.context("export download interrupted")?;
        body.extend_from_slice(&chunk);
    }

    debug!("export download complete ({} bytes)", body.len());
    Ok(body)
}
