//! Live adapter for the `HttpClient` port using `reqwest`.

use std::time::Duration;

use reqwest::Client;

use crate::ports::http::{BasicAuth, HttpClient, HttpFuture, HttpResponse};
use crate::ports::PortError;

/// Live HTTP client backed by a shared `reqwest::Client`.
pub struct LiveHttpClient {
    client: Client,
}

impl LiveHttpClient {
    /// Creates a new live HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self { client: Client::new() }
    }
}

impl Default for LiveHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

async fn into_response(response: reqwest::Response) -> Result<HttpResponse, PortError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| -> PortError { format!("Failed to read response body: {e}").into() })?;
    Ok(HttpResponse { status, body })
}

impl HttpClient for LiveHttpClient {
    fn get(&self, url: &str, timeout: Duration) -> HttpFuture<'_> {
        let url = url.to_string();
        Box::pin(async move {
            let response = self
                .client
                .get(&url)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| -> PortError { format!("GET {url} failed: {e}").into() })?;
            into_response(response).await
        })
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        auth: Option<&BasicAuth>,
        timeout: Duration,
    ) -> HttpFuture<'_> {
        let url = url.to_string();
        let body = body.clone();
        let auth = auth.cloned();
        Box::pin(async move {
            let mut request = self.client.post(&url).timeout(timeout).json(&body);
            if let Some(auth) = &auth {
                request = request.basic_auth(&auth.user, Some(&auth.password));
            }
            let response = request
                .send()
                .await
                .map_err(|e| -> PortError { format!("POST {url} failed: {e}").into() })?;
            into_response(response).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let client = LiveHttpClient::new();
        // Port 9 (discard) is essentially never listening on loopback.
        let result = client.get("http://127.0.0.1:9/health", Duration::from_millis(500)).await;
        assert!(result.is_err());
    }
}
