// Backend HTTP client
//
// Wraps `reqwest::Client` with base-URL path construction and status
// classification. Endpoint groups (auth, users, locations, clients,
// URL profiles) are implemented as inherent methods in separate files to
// keep this module focused on transport mechanics.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW: usize = 200;

/// Raw HTTP client for the monitoring backend.
///
/// Every path is resolved relative to `base_url` (for example
/// `https://vpn.example.net/api`). Authentication is an HTTP-only session
/// cookie kept in the client's jar.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    /// Cookie jar reference for exporting and restoring the session cookie.
    cookie_jar: Option<Arc<Jar>>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (session auth requires cookies).
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cookie_jar: None,
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session cookie header value for the backend, if one is held.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    /// Re-seed the jar from a header value previously returned by
    /// [`cookie_header`](Self::cookie_header).
    pub fn restore_cookies(&self, header: &str) {
        let Some(jar) = self.cookie_jar.as_ref() else {
            return;
        };
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            jar.add_cookie_str(pair, &self.base_url);
        }
        trace!("session cookie restored");
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{segment}/{segment}...`, percent-encoding each segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;
        let resp = check_status(resp).await?;
        decode(resp).await
    }

    /// Send a GET request and return the raw body (QR images, config files).
    pub(crate) async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, Error> {
        debug!("GET {} (binary)", url);
        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    /// Send a POST request with a JSON body, discarding the response body.
    pub(crate) async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        check_status(resp).await.map(drop)
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    pub(crate) async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, Error>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        let resp = check_status(resp).await?;
        decode(resp).await
    }

    /// Send a multipart POST request, discarding the response body.
    pub(crate) async fn post_multipart(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<(), Error> {
        debug!("POST {} (multipart)", url);
        let resp = self.http.post(url).multipart(form).send().await?;
        check_status(resp).await.map(drop)
    }

    /// Send a PUT request with a JSON body, discarding the response body.
    pub(crate) async fn put<B: Serialize + Sync + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<(), Error> {
        debug!("PUT {}", url);
        let resp = self.http.put(url).json(body).send().await?;
        check_status(resp).await.map(drop)
    }

    /// Send a DELETE request, discarding the response body.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await?;
        check_status(resp).await.map(drop)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }
}

/// Map non-success statuses onto [`Error`] variants, passing successful
/// responses through untouched.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let path = resp.url().path().to_owned();
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| format!("HTTP {status}"));

    Err(match status {
        StatusCode::UNAUTHORIZED => Error::Unauthorized { message },
        StatusCode::FORBIDDEN => Error::Forbidden { message },
        StatusCode::NOT_FOUND => Error::NotFound { path },
        StatusCode::CONFLICT => Error::Conflict { message },
        StatusCode::BAD_REQUEST => Error::BadRequest { message },
        other => Error::Api {
            status: other.as_u16(),
            message,
        },
    })
}

/// Extract a human-readable message from an error body: a JSON
/// `{"message": ...}` / `{"error": ...}` object, or a short plain-text body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(serde_json::Value::as_str) {
                return Some(msg.to_owned());
            }
        }
    }
    Some(trimmed.chars().take(BODY_PREVIEW).collect())
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(BODY_PREVIEW).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
