//! HTTP client utilities.
//!
//! Builds the shared `reqwest::Client` from transport options and sends
//! fully built request descriptors.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::collections::HashMap;

use crate::client::ClientError;
use crate::options::TransportOptions;
use crate::request::RequestDescriptor;

/// Build a configured HTTP client from transport options.
///
/// This applies common configuration like timeouts and proxies.
pub fn build_http_client(transport_options: &TransportOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// Copy extra headers from transport options into a header map.
///
/// Existing entries with the same name are replaced.
pub fn add_extra_headers(
    headers: &mut HeaderMap,
    extra_headers: &Option<HashMap<String, String>>,
) -> Result<(), ClientError> {
    if let Some(extra) = extra_headers {
        for (key, value) in extra {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ClientError::Build(format!("invalid header name: {}", key)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClientError::Build(format!("invalid value for header {}", key)))?;
            headers.insert(name, value);
        }
    }
    Ok(())
}

/// Issue exactly one HTTP request for the descriptor.
pub async fn send(client: &Client, descriptor: RequestDescriptor) -> Result<Response, ClientError> {
    let RequestDescriptor {
        url,
        method,
        headers,
        body,
    } = descriptor;

    Ok(client
        .request(method, url)
        .headers(headers)
        .body(body)
        .send()
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_http_client() {
        let transport_options = TransportOptions::default().with_timeout(Duration::from_secs(30));
        assert!(build_http_client(&transport_options).is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let transport_options =
            TransportOptions::default().with_proxy("http://proxy.example.com:8080".to_string());
        assert!(build_http_client(&transport_options).is_ok());
    }

    #[test]
    fn test_add_extra_headers() {
        let mut headers = HeaderMap::new();
        let extra = Some(HashMap::from([("X-Trace".to_string(), "abc".to_string())]));
        add_extra_headers(&mut headers, &extra).unwrap();
        assert_eq!(headers.get("x-trace").unwrap(), "abc");
    }

    #[test]
    fn test_add_extra_headers_rejects_bad_name() {
        let mut headers = HeaderMap::new();
        let extra = Some(HashMap::from([("bad header".to_string(), "v".to_string())]));
        assert!(matches!(
            add_extra_headers(&mut headers, &extra),
            Err(ClientError::Build(_))
        ));
    }
}
