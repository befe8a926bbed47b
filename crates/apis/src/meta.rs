//! Plugin request metadata and credentials.
//!
//! Every call to a plugin carries two headers:
//!
//! | Header | Payload |
//! |--------|---------|
//! | [`META_HEADER`] | [`Meta`]: base URL and API version of the integrated tool |
//! | [`AUTH_HEADER`] | [`Auth`]: credential type plus secret data |
//!
//! Both payloads are JSON documents encoded with standard (padded) base64 so
//! they survive as plain ASCII header values. The secret values inside an
//! [`Auth`] are themselves base64 encoded, following the `data` convention of
//! Kubernetes `Secret` objects.

use std::collections::BTreeMap;
use std::fmt;

use base64::{prelude::BASE64_STANDARD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Header carrying the base64 JSON encoded [`Meta`].
pub const META_HEADER: &str = "X-Plugin-Meta";

/// Header carrying the base64 JSON encoded [`Auth`].
pub const AUTH_HEADER: &str = "X-Plugin-Auth";

/// Secret key holding the user name of a basic-auth credential.
pub const SECRET_USERNAME_KEY: &str = "username";
/// Secret key holding the password of a basic-auth credential.
pub const SECRET_PASSWORD_KEY: &str = "password";
/// Secret key holding an OAuth2 access token.
pub const SECRET_ACCESS_TOKEN_KEY: &str = "accessToken";
/// Secret key holding a personal access token.
pub const SECRET_TOKEN_KEY: &str = "token";
/// Secret key holding an SSH private key.
pub const SECRET_SSH_PRIVATE_KEY: &str = "ssh-privatekey";

// ---------------------------------------------------------------------------
// Header encoding
// ---------------------------------------------------------------------------

/// Failure to decode a plugin header value.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// The header value is not valid base64.
    #[error("header {header} is not base64 encoded: {source}")]
    Base64 {
        /// Header name.
        header: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// The decoded bytes are not the expected JSON document.
    #[error("header {header} does not contain valid json: {source}")]
    Json {
        /// Header name.
        header: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn encode_header<T: Serialize>(value: &T) -> String {
    // Serialising plain structs of strings and maps cannot fail.
    let json = serde_json::to_vec(value).unwrap_or_default();
    BASE64_STANDARD.encode(json)
}

fn decode_header<T: DeserializeOwned>(header: &'static str, value: &str) -> Result<T, HeaderError> {
    let bytes = BASE64_STANDARD
        .decode(value.trim())
        .map_err(|source| HeaderError::Base64 { header, source })?;
    serde_json::from_slice(&bytes).map_err(|source| HeaderError::Json { header, source })
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

/// Describes which instance of the integrated tool a request targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// API version of the integrated tool, when the plugin supports several.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Base URL of the integrated tool, e.g. `https://gitlab.example.com`.
    #[serde(rename = "baseURL", default)]
    pub base_url: String,
}

impl Meta {
    /// Creates a [`Meta`] targeting `base_url` without an explicit version.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            version: None,
            base_url: base_url.into(),
        }
    }

    /// Sets the API version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Encodes this value for the [`META_HEADER`] header.
    pub fn to_header_value(&self) -> String {
        encode_header(self)
    }

    /// Decodes a [`META_HEADER`] header value.
    pub fn from_header_value(value: &str) -> Result<Self, HeaderError> {
        decode_header(META_HEADER, value)
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Kind of credential carried by an [`Auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthType {
    /// User name and password.
    #[serde(rename = "kubernetes.io/basic-auth")]
    Basic,
    /// SSH private key.
    #[serde(rename = "kubernetes.io/ssh-auth")]
    Ssh,
    /// OAuth2 access token.
    #[serde(rename = "katanomi.dev/oauth2")]
    OAuth2,
    /// Personal access token.
    #[serde(rename = "katanomi.dev/personal-access-token")]
    PersonalToken,
}

impl AuthType {
    /// Returns the wire name of the credential type.
    pub fn as_str(self) -> &'static str {
        match self {
            AuthType::Basic => "kubernetes.io/basic-auth",
            AuthType::Ssh => "kubernetes.io/ssh-auth",
            AuthType::OAuth2 => "katanomi.dev/oauth2",
            AuthType::PersonalToken => "katanomi.dev/personal-access-token",
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to read credentials out of an [`Auth`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The credential is of another type than the one requested.
    #[error("expected auth type {expected}, got {actual}")]
    WrongType {
        /// Requested credential type.
        expected: AuthType,
        /// Credential type carried by the request.
        actual: AuthType,
    },

    /// A required secret field is absent.
    #[error("auth secret is missing field {0}")]
    MissingField(&'static str),

    /// A secret field is not valid base64 or not valid UTF-8.
    #[error("auth secret field {0} is not valid base64 encoded text")]
    InvalidEncoding(&'static str),
}

/// Credentials used by a plugin to call the integrated tool.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    /// Credential kind; determines which secret keys are meaningful.
    #[serde(rename = "type")]
    pub auth_type: AuthType,

    /// Secret data. Values are base64 encoded bytes.
    #[serde(default)]
    pub secret: BTreeMap<String, String>,
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("auth_type", &self.auth_type)
            .field("secret_keys", &self.secret.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Auth {
    /// Creates an [`Auth`] with raw (not yet encoded) secret values.
    pub fn new<K, V>(auth_type: AuthType, secret: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        Self {
            auth_type,
            secret: secret
                .into_iter()
                .map(|(k, v)| (k.into(), BASE64_STANDARD.encode(v)))
                .collect(),
        }
    }

    /// Basic-auth credential.
    pub fn basic(username: &str, password: &str) -> Self {
        Self::new(
            AuthType::Basic,
            [
                (SECRET_USERNAME_KEY, username),
                (SECRET_PASSWORD_KEY, password),
            ],
        )
    }

    /// OAuth2 access-token credential.
    pub fn oauth2(access_token: &str) -> Self {
        Self::new(AuthType::OAuth2, [(SECRET_ACCESS_TOKEN_KEY, access_token)])
    }

    /// Personal access-token credential.
    pub fn personal_token(token: &str) -> Self {
        Self::new(AuthType::PersonalToken, [(SECRET_TOKEN_KEY, token)])
    }

    /// Returns the decoded secret value stored under `key`.
    pub fn secret_value(&self, key: &'static str) -> Result<String, AuthError> {
        let encoded = self.secret.get(key).ok_or(AuthError::MissingField(key))?;
        let bytes = BASE64_STANDARD
            .decode(encoded)
            .map_err(|_| AuthError::InvalidEncoding(key))?;
        String::from_utf8(bytes).map_err(|_| AuthError::InvalidEncoding(key))
    }

    /// Returns `(username, password)` of a basic-auth credential.
    pub fn basic_credentials(&self) -> Result<(String, String), AuthError> {
        self.expect_type(AuthType::Basic)?;
        Ok((
            self.secret_value(SECRET_USERNAME_KEY)?,
            self.secret_value(SECRET_PASSWORD_KEY)?,
        ))
    }

    /// Returns the token of an OAuth2 or personal access-token credential.
    pub fn access_token(&self) -> Result<String, AuthError> {
        match self.auth_type {
            AuthType::OAuth2 => self.secret_value(SECRET_ACCESS_TOKEN_KEY),
            AuthType::PersonalToken => self.secret_value(SECRET_TOKEN_KEY),
            actual => Err(AuthError::WrongType {
                expected: AuthType::OAuth2,
                actual,
            }),
        }
    }

    /// Builds an HTTP `Authorization` header value for the integrated tool.
    ///
    /// Returns `Ok(None)` for credential types that do not travel over HTTP
    /// (SSH keys).
    pub fn authorization_header(&self) -> Result<Option<String>, AuthError> {
        match self.auth_type {
            AuthType::Basic => {
                let (username, password) = self.basic_credentials()?;
                let token = BASE64_STANDARD.encode(format!("{username}:{password}"));
                Ok(Some(format!("Basic {token}")))
            }
            AuthType::OAuth2 | AuthType::PersonalToken => {
                Ok(Some(format!("Bearer {}", self.access_token()?)))
            }
            AuthType::Ssh => Ok(None),
        }
    }

    /// Encodes this value for the [`AUTH_HEADER`] header.
    pub fn to_header_value(&self) -> String {
        encode_header(self)
    }

    /// Decodes an [`AUTH_HEADER`] header value.
    pub fn from_header_value(value: &str) -> Result<Self, HeaderError> {
        decode_header(AUTH_HEADER, value)
    }

    fn expect_type(&self, expected: AuthType) -> Result<(), AuthError> {
        if self.auth_type == expected {
            Ok(())
        } else {
            Err(AuthError::WrongType {
                expected,
                actual: self.auth_type,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Request context
// ---------------------------------------------------------------------------

/// Per-request values handed to every capability call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Target tool instance.
    pub meta: Meta,
    /// Credentials, when the caller supplied any.
    pub auth: Option<Auth>,
}

impl RequestContext {
    /// Creates a context from its parts.
    pub fn new(meta: Meta, auth: Option<Auth>) -> Self {
        Self { meta, auth }
    }
}
