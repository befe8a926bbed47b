//! User impersonation for requests made on behalf of a caller.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};

/// User name to act as.
pub const IMPERSONATE_USER_HEADER: &str = "Impersonate-User";
/// Uid of the impersonated user.
pub const IMPERSONATE_UID_HEADER: &str = "Impersonate-Uid";
/// One group of the impersonated user; repeated per group.
pub const IMPERSONATE_GROUP_HEADER: &str = "Impersonate-Group";
/// Prefix of the per-key extra headers, e.g. `Impersonate-Extra-scopes`.
pub const IMPERSONATE_EXTRA_PREFIX: &str = "Impersonate-Extra-";

/// Identity to impersonate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    /// User name, e.g. `system:serviceaccount:ci:runner`.
    pub username: String,
    /// Stable user id, when known.
    pub uid: Option<String>,
    /// Group memberships.
    pub groups: Vec<String>,
    /// Extra attributes keyed by lowercased, decoded key.
    pub extra: BTreeMap<String, Vec<String>>,
}

impl UserInfo {
    /// A user with no uid, groups or extra attributes.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Reads the impersonation headers from `(name, value)` pairs.
    ///
    /// Header names are matched case-insensitively and extra keys are
    /// percent-decoded. Returns `None` when no non-empty user is present.
    pub fn from_header_pairs<'a, I>(headers: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut user = UserInfo::default();
        for (name, value) in headers {
            if name.eq_ignore_ascii_case(IMPERSONATE_USER_HEADER) {
                user.username = value.trim().to_string();
            } else if name.eq_ignore_ascii_case(IMPERSONATE_UID_HEADER) {
                user.uid = Some(value.trim().to_string());
            } else if name.eq_ignore_ascii_case(IMPERSONATE_GROUP_HEADER) {
                user.groups.push(value.trim().to_string());
            } else if let Some(key) = extra_key(name) {
                user.extra
                    .entry(key)
                    .or_default()
                    .push(value.trim().to_string());
            }
        }
        (!user.username.is_empty()).then_some(user)
    }

    /// Header pairs carrying this identity.
    pub fn header_pairs(&self) -> Vec<(String, String)> {
        let mut headers = vec![(IMPERSONATE_USER_HEADER.to_string(), self.username.clone())];
        if let Some(uid) = &self.uid {
            headers.push((IMPERSONATE_UID_HEADER.to_string(), uid.clone()));
        }
        for group in &self.groups {
            headers.push((IMPERSONATE_GROUP_HEADER.to_string(), group.clone()));
        }
        for (key, values) in &self.extra {
            let name = format!(
                "{IMPERSONATE_EXTRA_PREFIX}{}",
                utf8_percent_encode(key, NON_ALPHANUMERIC)
            );
            for value in values {
                headers.push((name.clone(), value.clone()));
            }
        }
        headers
    }
}

fn extra_key(header: &str) -> Option<String> {
    let prefix_len = IMPERSONATE_EXTRA_PREFIX.len();
    if header.len() <= prefix_len || !header.is_char_boundary(prefix_len) {
        return None;
    }
    let (prefix, key) = header.split_at(prefix_len);
    if !prefix.eq_ignore_ascii_case(IMPERSONATE_EXTRA_PREFIX) {
        return None;
    }
    Some(percent_decode_str(key).decode_utf8_lossy().to_lowercase())
}

/// Token of an `Authorization: Bearer <token>` value.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Copy of `config` that impersonates `user`.
///
/// The client config only carries the user and groups; uid and extra are
/// logged and dropped.
pub fn impersonated_config(config: &kube::Config, user: &UserInfo) -> kube::Config {
    let mut config = config.clone();
    config.auth_info.impersonate = Some(user.username.clone());
    config.auth_info.impersonate_groups = (!user.groups.is_empty()).then(|| user.groups.clone());
    if user.uid.is_some() || !user.extra.is_empty() {
        tracing::debug!(
            user = %user.username,
            "impersonation uid and extra are not supported by the client config"
        );
    }
    config
}
