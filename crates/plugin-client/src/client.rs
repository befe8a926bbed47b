//! Base client, per-request scoping and response handling.

use apis::{Auth, ErrorStatus, Meta, PluginError, PluginErrorKind, AUTH_HEADER, META_HEADER};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::Instrument;

use crate::error::{ClientError, ClientResult};

const ROUTE_PREFIX: [&str; 2] = ["plugins", "v1alpha1"];

/// Client for one plugin served by a plugin server.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PluginClient {
    http: reqwest::Client,
    base_url: Url,
    plugin_path: String,
}

impl PluginClient {
    /// Creates a client for the plugin mounted at `plugin_path` on the server
    /// at `base_url`.
    pub fn new(base_url: &str, plugin_path: impl Into<String>) -> ClientResult<Self> {
        Self::with_http_client(reqwest::Client::new(), base_url, plugin_path)
    }

    /// Like [`PluginClient::new`] with a preconfigured `reqwest` client.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        plugin_path: impl Into<String>,
    ) -> ClientResult<Self> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        if parsed.cannot_be_a_base() {
            return Err(invalid("url cannot be a base".to_string()));
        }

        let plugin_path = plugin_path.into().trim_matches('/').to_string();
        if plugin_path.is_empty() {
            return Err(invalid("plugin path is empty".to_string()));
        }

        Ok(Self {
            http,
            base_url: parsed,
            plugin_path,
        })
    }

    /// Server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Path the plugin is mounted under.
    pub fn plugin_path(&self) -> &str {
        &self.plugin_path
    }

    /// Scopes the client to one caller: every request carries `meta` and, if
    /// given, `auth`.
    pub fn request(&self, meta: &Meta, auth: Option<&Auth>) -> ScopedClient {
        let mut headers = HeaderMap::new();
        if let Some(value) = header_value(META_HEADER, meta.to_header_value()) {
            headers.insert(META_HEADER, value);
        }
        let auth_value = auth.and_then(|auth| header_value(AUTH_HEADER, auth.to_header_value()));
        if let Some(mut value) = auth_value {
            value.set_sensitive(true);
            headers.insert(AUTH_HEADER, value);
        }
        ScopedClient {
            client: self.clone(),
            headers,
        }
    }

    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "url cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(ROUTE_PREFIX)
            .push(&self.plugin_path)
            .extend(segments);
        Ok(url)
    }
}

/// A [`PluginClient`] bound to the meta and auth headers of one caller.
///
/// Resource sub-clients are created from it; see [`ScopedClient::branches`]
/// and friends.
#[derive(Debug, Clone)]
pub struct ScopedClient {
    client: PluginClient,
    headers: HeaderMap,
}

impl ScopedClient {
    /// Underlying plugin client.
    pub fn plugin_client(&self) -> &PluginClient {
        &self.client
    }

    fn builder(&self, method: Method, url: &Url) -> RequestBuilder {
        self.client
            .http
            .request(method, url.clone())
            .headers(self.headers.clone())
    }

    pub(crate) async fn get<Q, T>(&self, segments: &[&str], query: Option<&Q>) -> ClientResult<T>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.client.url(segments)?;
        let mut builder = self.builder(Method::GET, &url);
        if let Some(query) = query {
            builder = builder.query(query);
        }
        let body = send(builder, Method::GET, &url).await?;
        decode(&url, &body)
    }

    pub(crate) async fn post<B, T>(&self, segments: &[&str], payload: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.client.url(segments)?;
        let builder = self.builder(Method::POST, &url).json(payload);
        let body = send(builder, Method::POST, &url).await?;
        decode(&url, &body)
    }

    pub(crate) async fn delete(&self, segments: &[&str]) -> ClientResult<()> {
        let url = self.client.url(segments)?;
        let builder = self.builder(Method::DELETE, &url);
        send(builder, Method::DELETE, &url).await?;
        Ok(())
    }
}

async fn send(builder: RequestBuilder, method: Method, url: &Url) -> ClientResult<Vec<u8>> {
    let span = tracing::debug_span!("plugin_request", %method, url = %url);
    async {
        let http_error = |source| ClientError::Http {
            url: url.to_string(),
            source,
        };

        let response = builder.send().await.map_err(http_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(http_error)?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "plugin responded");

        if status.is_success() {
            Ok(body.to_vec())
        } else {
            Err(ClientError::Plugin(error_from_response(status, &body)))
        }
    }
    .instrument(span)
    .await
}

fn decode<T: DeserializeOwned>(url: &Url, body: &[u8]) -> ClientResult<T> {
    serde_json::from_slice(body).map_err(|source| ClientError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Decodes an error body; bodies that are not a status document fall back to
/// the HTTP status.
pub(crate) fn error_from_response(status: StatusCode, body: &[u8]) -> PluginError {
    match serde_json::from_slice::<ErrorStatus>(body) {
        Ok(error_status) if error_status.kind == "Status" => PluginError::from(error_status),
        _ => {
            let kind = PluginErrorKind::from_status_code(status.as_u16());
            let text = String::from_utf8_lossy(body);
            let message = if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                text.trim().to_string()
            };
            PluginError::new(kind, message)
        }
    }
}

fn header_value(name: &'static str, encoded: String) -> Option<HeaderValue> {
    match HeaderValue::try_from(encoded) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(header = name, error = %e, "header value is not encodable, not sent");
            None
        }
    }
}
