use std::time::Duration;

/// A successful (2xx) probe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: String,
}

/// Abstraction over the HTTP request used to check the container.
///
/// Production code uses [`ReqwestProbe`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait HttpProbe: Send + Sync {
    /// Issue one GET to `url` with the given `Host` header.
    ///
    /// Non-2xx responses are returned as [`ProbeError::Status`].
    async fn get(&self, url: &str, host: &str) -> Result<ProbeResponse, ProbeError>;
}

/// [`HttpProbe`] backed by a reqwest client with a per-request timeout.
pub struct ReqwestProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        // The probe targets a port published on this host; never route it
        // through HTTP_PROXY.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| ProbeError::Client {
                detail: e.to_string(),
            })?;
        Ok(Self { client, timeout })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout {
                url: url.to_owned(),
                after: self.timeout,
            }
        } else if err.is_builder() {
            ProbeError::InvalidUrl {
                url: url.to_owned(),
                detail: error_chain(&err),
            }
        } else if err.is_connect() {
            ProbeError::Connect {
                url: url.to_owned(),
                detail: error_chain(&err),
            }
        } else {
            ProbeError::Request {
                url: url.to_owned(),
                detail: error_chain(&err),
            }
        }
    }
}

impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str, host: &str) -> Result<ProbeResponse, ProbeError> {
        tracing::debug!(url, host, "probing");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::HOST, host)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(url, e))?;

        if !status.is_success() {
            return Err(ProbeError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(ProbeResponse {
            status: status.as_u16(),
            body,
        })
    }
}

/// Flatten an error and its sources into one line; reqwest hides the
/// interesting part ("connection refused") in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    #[error("could not connect to {url}: {detail}")]
    Connect { url: String, detail: String },

    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("{url} answered with HTTP {status}\n{body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("cannot request {url}: {detail}")]
    InvalidUrl { url: String, detail: String },

    #[error("request to {url} failed: {detail}")]
    Request { url: String, detail: String },

    #[error("failed to build HTTP client: {detail}")]
    Client { detail: String },
}

impl ProbeError {
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Connect { .. })
    }

    /// No HTTP response arrived and the request did not time out: nothing is
    /// listening yet, or the engine's port proxy dropped the connection
    /// because the server inside the container is still starting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Request { .. })
    }
}
