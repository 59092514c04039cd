//! HTTP client port for health probes and dashboard import.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::PortError;

/// Boxed future type alias used by [`HttpClient`] to keep the trait dyn-compatible.
pub type HttpFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HttpResponse, PortError>> + Send + 'a>>;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Basic-auth credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
}

/// Performs HTTP requests against the observability backends.
///
/// A non-2xx response is still `Ok`; only transport failures (refused
/// connection, timeout, DNS) are errors.
pub trait HttpClient: Send + Sync {
    /// Issues a GET request bounded by `timeout`.
    fn get(&self, url: &str, timeout: Duration) -> HttpFuture<'_>;

    /// POSTs a JSON body, optionally with basic auth, bounded by `timeout`.
    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        auth: Option<&BasicAuth>,
        timeout: Duration,
    ) -> HttpFuture<'_>;
}
