//! HTTP transport backed by reqwest.

use super::{Transport, TransportError};
use crate::config::TransportSettings;
use crate::link::Method;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Transport that performs real HTTP requests.
pub struct HttpTransport {
    client: Client,
    /// Base URL relative hrefs are resolved against
    base_url: Option<Url>,
}

impl HttpTransport {
    /// Create a new HTTP transport from settings.
    pub fn new(settings: &TransportSettings) -> Result<Self, TransportError> {
        let base_url = settings
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()?;

        let mut client = Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .default_headers(build_headers(settings)?);
        if let Some(ref agent) = settings.user_agent {
            client = client.user_agent(agent.clone());
        }

        Ok(Self {
            client: client.build()?,
            base_url,
        })
    }

    /// Resolve an href against the base URL.
    fn resolve(&self, href: &str) -> Result<Url, TransportError> {
        match self.base_url {
            Some(ref base) => Ok(base.join(href)?),
            None => Ok(Url::parse(href)?),
        }
    }
}

fn build_headers(settings: &TransportSettings) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();

    let accept = HeaderValue::from_str(&settings.accept)
        .map_err(|_| TransportError::InvalidHeader(ACCEPT.to_string()))?;
    headers.insert(ACCEPT, accept);

    for header in &settings.headers {
        let name = HeaderName::from_bytes(header.name.as_bytes())
            .map_err(|_| TransportError::InvalidHeader(header.name.clone()))?;
        let value = HeaderValue::from_str(&header.value)
            .map_err(|_| TransportError::InvalidHeader(header.name.clone()))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, method: &Method, href: &str) -> Result<JsonValue, TransportError> {
        let url = self.resolve(href)?;
        let http_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
            .map_err(|_| TransportError::InvalidMethod(method.to_string()))?;

        debug!(method = %method, url = %url, "Sending request");

        let response = self.client.request(http_method, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                method: method.to_string(),
                href: href.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        trace!(status = status.as_u16(), body_size = body.len(), "Received response");

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonValue::Null);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    fn name(&self) -> &'static str {
        "http_transport"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HeaderValue as HeaderSetting;

    fn settings(base_url: Option<&str>) -> TransportSettings {
        TransportSettings {
            base_url: base_url.map(String::from),
            ..TransportSettings::default()
        }
    }

    #[test]
    fn test_resolve_relative_href() {
        let transport = HttpTransport::new(&settings(Some("https://example.com/"))).unwrap();
        let url = transport.resolve("/api/v3/projects/1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/v3/projects/1");
    }

    #[test]
    fn test_resolve_absolute_href_ignores_base() {
        let transport = HttpTransport::new(&settings(Some("https://example.com/"))).unwrap();
        let url = transport.resolve("https://other.org/x").unwrap();
        assert_eq!(url.host_str(), Some("other.org"));
    }

    #[test]
    fn test_relative_href_without_base_fails() {
        let transport = HttpTransport::new(&settings(None)).unwrap();
        assert!(matches!(
            transport.resolve("/api/v3"),
            Err(TransportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpTransport::new(&settings(Some("not a url"))).is_err());
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut settings = settings(None);
        settings.headers.push(HeaderSetting {
            name: "Bad Header".to_string(),
            value: "x".to_string(),
        });
        assert!(matches!(
            HttpTransport::new(&settings),
            Err(TransportError::InvalidHeader(name)) if name == "Bad Header"
        ));
    }

    #[test]
    fn test_default_headers() {
        let mut settings = settings(None);
        settings.headers.push(HeaderSetting {
            name: "Authorization".to_string(),
            value: "Bearer token".to_string(),
        });
        let headers = build_headers(&settings).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/hal+json");
        assert_eq!(headers.get("authorization").unwrap(), "Bearer token");
    }
}
