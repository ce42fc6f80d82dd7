//! Option structures for transport and retry configuration.

use std::collections::HashMap;
use std::time::Duration;

/// A secret string type for sensitive data like access tokens.
/// Prevents accidental logging or display of secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// HTTP transport configuration shared by every backend.
///
/// # Example
/// ```rust
/// use genstream::options::TransportOptions;
/// use std::time::Duration;
///
/// let options = TransportOptions::default()
///     .with_timeout(Duration::from_secs(30))
///     .with_header("x-request-source".to_string(), "chat".to_string());
/// assert_eq!(options.timeout, Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Overall request timeout. Unset means the connection may stay open
    /// for as long as the server keeps streaming.
    pub timeout: Option<Duration>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl TransportOptions {
    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

/// Per-call retry controls.
///
/// A `503 Service Unavailable` answer is retried once, immediately, unless
/// `retry_on_error` is off or `wait_for_model` is already set. The retry
/// itself runs with `wait_for_model` set, so it is never retried again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    pub retry_on_error: bool,
    pub wait_for_model: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            retry_on_error: true,
            wait_for_model: false,
        }
    }
}

impl RequestOptions {
    /// Enable or disable the one-time 503 retry.
    pub fn with_retry_on_error(mut self, retry: bool) -> Self {
        self.retry_on_error = retry;
        self
    }

    /// Mark the call as already waiting for the model.
    pub fn with_wait_for_model(mut self, wait: bool) -> Self {
        self.wait_for_model = wait;
        self
    }

    /// Whether a 503 on this attempt should trigger a retry.
    pub fn retries_unavailable(&self) -> bool {
        self.retry_on_error && !self.wait_for_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let secret = SecretString::from("tok-123");
        assert_eq!(format!("{:?}", secret), "SecretString([REDACTED])");
        assert_eq!(secret.expose_secret(), "tok-123");
    }

    #[test]
    fn test_retry_flags() {
        assert!(RequestOptions::default().retries_unavailable());
        assert!(!RequestOptions::default()
            .with_retry_on_error(false)
            .retries_unavailable());
        assert!(!RequestOptions::default()
            .with_wait_for_model(true)
            .retries_unavailable());
    }

    #[test]
    fn test_with_header_accumulates() {
        let options = TransportOptions::default()
            .with_header("a".to_string(), "1".to_string())
            .with_header("b".to_string(), "2".to_string());
        let headers = options.extra_headers.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["b"], "2");
    }
}
