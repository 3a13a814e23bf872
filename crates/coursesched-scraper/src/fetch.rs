//! Text-returning HTTP fetcher shared by every extractor.
//!
//! [`Fetcher::fetch_raw`] surfaces transport failures as [`ScraperError`].
//! [`Fetcher::fetch`] folds them into an `"Error: ..."` body so the parsers
//! downstream only ever deal with text.

use std::time::Duration;

use coursesched_core::{AppConfig, UpstreamScheme};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};

use crate::error::ScraperError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP client for the registration and catalog origins.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    scheme: UpstreamScheme,
    /// When set, every host is routed to this origin (mock servers in tests).
    base_url: Option<Url>,
    timeout: Duration,
}

impl Fetcher {
    /// Creates a fetcher that reaches each host over `scheme`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        scheme: UpstreamScheme,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            scheme,
            base_url: None,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Creates a fetcher from the loaded application config.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.upstream_scheme,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Creates a fetcher that sends every request to `base_url`, ignoring the
    /// host argument (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed, or
    /// [`ScraperError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let parsed = Url::parse(base_url).map_err(|e| ScraperError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let scheme = if parsed.scheme() == "https" {
            UpstreamScheme::Https
        } else {
            UpstreamScheme::Http
        };
        Ok(Self {
            client: build_client(timeout_secs, user_agent)?,
            scheme,
            base_url: Some(parsed),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Sends one request and returns the response body as text.
    ///
    /// Non-2xx statuses are logged and their body is still returned. The send
    /// and body read together are bounded by the configured timeout. No
    /// retries are attempted.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] if `host` and `path` do not form a URL.
    /// - [`ScraperError::Timeout`] if the exchange exceeds the timeout.
    /// - [`ScraperError::Http`] on any other transport failure.
    pub async fn fetch_raw(
        &self,
        host: &str,
        path: &str,
        method: Method,
        body: Option<&str>,
    ) -> Result<String, ScraperError> {
        let url = self.build_url(host, path)?;
        let url_text = url.to_string();

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(body.to_owned());
        }

        let exchange = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                tracing::warn!(url = %url_text, %status, "upstream returned non-success status");
            }
            response.text().await
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) if e.is_timeout() => Err(self.timeout_error(url_text)),
            Ok(Err(e)) => Err(ScraperError::Http(e)),
            Err(_elapsed) => Err(self.timeout_error(url_text)),
        }
    }

    /// Like [`Fetcher::fetch_raw`], but a transport failure is logged and
    /// returned as an `"Error: <message>"` body.
    pub async fn fetch(&self, host: &str, path: &str, method: Method, body: Option<&str>) -> String {
        match self.fetch_raw(host, path, method, body).await {
            Ok(text) => {
                tracing::debug!(host, path, bytes = text.len(), "fetched upstream page");
                text
            }
            Err(err) => {
                tracing::error!(host, path, error = %err, "upstream fetch failed");
                format!("Error: {err}")
            }
        }
    }

    pub async fn get(&self, host: &str, path: &str) -> String {
        self.fetch(host, path, Method::GET, None).await
    }

    /// POSTs an already-encoded `application/x-www-form-urlencoded` body.
    pub async fn post_form(&self, host: &str, path: &str, body: &str) -> String {
        self.fetch(host, path, Method::POST, Some(body)).await
    }

    fn build_url(&self, host: &str, path: &str) -> Result<Url, ScraperError> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        let raw = match &self.base_url {
            Some(base) => format!("{}{path}", base.as_str().trim_end_matches('/')),
            None => {
                if host.is_empty() {
                    return Err(ScraperError::InvalidUrl {
                        url: path,
                        reason: "empty host".to_string(),
                    });
                }
                format!("{}://{host}{path}", self.scheme)
            }
        };

        Url::parse(&raw).map_err(|e| ScraperError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })
    }

    fn timeout_error(&self, url: String) -> ScraperError {
        ScraperError::Timeout {
            url,
            timeout_secs: self.timeout.as_secs(),
        }
    }
}

fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ScraperError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}
