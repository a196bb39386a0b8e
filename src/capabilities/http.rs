use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Upper bound on response bodies the core will accept from the shell.
pub const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// A URL that has been parsed and scheme-checked before it can become an
/// operation. Shells never see a malformed request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl(String);

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();
        let parsed = url::Url::parse(&url).map_err(|e| HttpError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(HttpError::InvalidUrl {
                url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if parsed.host_str().is_none() {
            return Err(HttpError::InvalidUrl {
                url,
                reason: "missing host".to_string(),
            });
        }

        Ok(Self(url))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<url::Url> for ValidatedUrl {
    fn from(url: url::Url) -> Self {
        Self(url.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
        }
    }
}

/// A fully-formed request the shell is asked to perform. The `request_id`
/// correlates shell-side transfer logs with core-side handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: ValidatedUrl,
    pub request_id: String,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: ValidatedUrl) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            request_id: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpOperation {
    Request(HttpRequest),
}

impl Operation for HttpOperation {
    type Output = HttpResult;
}

/// Raw response as the shell saw it. Status interpretation and body
/// decoding are the core's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn ok(body: Vec<u8>) -> Self {
        Self { status: 200, body }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failures. Non-2xx statuses are not errors at this
/// layer; they arrive as an `HttpResponse`.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpError {
    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

pub type HttpResult = Result<HttpResponse, HttpError>;

#[derive(Clone)]
pub struct Http<Ev> {
    context: CapabilityContext<HttpOperation, Ev>,
}

impl<Ev> Capability<Ev> for Http<Ev> {
    type Operation = HttpOperation;
    type MappedSelf<MappedEv> = Http<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Http::new(self.context.map_event(f))
    }
}

impl<Ev> Http<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<HttpOperation, Ev>) -> Self {
        Self { context }
    }

    /// Issue a GET and feed the outcome back into the update loop.
    pub fn get<F>(&self, url: ValidatedUrl, make_event: F)
    where
        F: FnOnce(HttpResult) -> Ev + Send + 'static,
    {
        let request = HttpRequest::get(url);
        tracing::debug!(
            request_id = %request.request_id,
            url = request.url.as_str(),
            "dispatching http request"
        );

        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(HttpOperation::Request(request))
                .await;
            context.update_app(make_event(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validated_url_accepts_https() {
        assert!(ValidatedUrl::new("https://api.weatherapi.com/v1/search.json").is_ok());
        assert!(ValidatedUrl::new("http://localhost:8080/stub").is_ok());
    }

    #[test]
    fn validated_url_rejects_other_schemes() {
        assert!(matches!(
            ValidatedUrl::new("ftp://files.example.com"),
            Err(HttpError::InvalidUrl { .. })
        ));
        assert!(ValidatedUrl::new("javascript:alert(1)").is_err());
        assert!(ValidatedUrl::new("not a url at all").is_err());
    }

    #[test]
    fn requests_get_unique_ids() {
        let url = ValidatedUrl::new("https://example.com").unwrap();
        let a = HttpRequest::get(url.clone());
        let b = HttpRequest::get(url);
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn success_statuses() {
        assert!(HttpResponse { status: 200, body: vec![] }.is_success());
        assert!(HttpResponse { status: 204, body: vec![] }.is_success());
        assert!(!HttpResponse { status: 404, body: vec![] }.is_success());
        assert!(!HttpResponse { status: 500, body: vec![] }.is_success());
    }
}
