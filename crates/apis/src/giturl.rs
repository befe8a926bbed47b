//! Parsing of git remote URLs.
//!
//! Accepts URL forms (`https://`, `http://`, `ssh://`, `git://`) and the
//! scp-like `user@host:owner/repo.git` form.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

/// Failure to parse a git remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GitUrlError {
    #[error("git url is empty")]
    Empty,

    #[error("unsupported git url scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("git url '{0}' has no host")]
    MissingHost(String),

    #[error("git url '{0}' does not name an owner and a repository")]
    MissingPath(String),

    #[error("invalid git url '{url}': {reason}")]
    Invalid { url: String, reason: String },
}

/// Transport scheme of a git remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitScheme {
    Https,
    Http,
    Ssh,
    Git,
}

impl GitScheme {
    /// Scheme as written in a URL.
    pub fn as_str(self) -> &'static str {
        match self {
            GitScheme::Https => "https",
            GitScheme::Http => "http",
            GitScheme::Ssh => "ssh",
            GitScheme::Git => "git",
        }
    }

    fn parse(scheme: &str) -> Result<Self, GitUrlError> {
        match scheme.to_ascii_lowercase().as_str() {
            "https" => Ok(GitScheme::Https),
            "http" => Ok(GitScheme::Http),
            "ssh" => Ok(GitScheme::Ssh),
            "git" => Ok(GitScheme::Git),
            other => Err(GitUrlError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// A parsed git remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    /// Transport.
    pub scheme: GitScheme,
    /// User part, e.g. `git` in `git@github.com:o/r`.
    pub user: Option<String>,
    /// Host name.
    pub host: String,
    /// Explicit port, if any.
    pub port: Option<u16>,
    /// Owner path; nested groups are joined with `/`.
    pub owner: String,
    /// Repository name without `.git`.
    pub repository: String,
}

impl GitUrl {
    /// Parses a remote URL.
    ///
    /// ```
    /// use apis::giturl::GitUrl;
    ///
    /// let url = GitUrl::parse("git@gitlab.com:group/sub/app.git").unwrap();
    /// assert_eq!(url.full_name(), "group/sub/app");
    /// assert_eq!(url.base_url(), "https://gitlab.com");
    /// ```
    pub fn parse(input: &str) -> Result<Self, GitUrlError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(GitUrlError::Empty);
        }

        if input.contains("://") {
            Self::parse_url(input)
        } else {
            Self::parse_scp_like(input)
        }
    }

    fn parse_url(input: &str) -> Result<Self, GitUrlError> {
        let parsed = Url::parse(input).map_err(|e| match e {
            url::ParseError::EmptyHost => GitUrlError::MissingHost(input.to_string()),
            other => GitUrlError::Invalid {
                url: input.to_string(),
                reason: other.to_string(),
            },
        })?;

        let scheme = GitScheme::parse(parsed.scheme())?;
        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(GitUrlError::MissingHost(input.to_string())),
        };
        let user = Some(parsed.username())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        let (owner, repository) = split_path(parsed.path())
            .ok_or_else(|| GitUrlError::MissingPath(input.to_string()))?;

        Ok(Self {
            scheme,
            user,
            host,
            port: parsed.port(),
            owner,
            repository,
        })
    }

    fn parse_scp_like(input: &str) -> Result<Self, GitUrlError> {
        let Some((authority, path)) = input.split_once(':') else {
            return Err(GitUrlError::UnsupportedScheme(String::new()));
        };
        // a slash before the colon means this is a local path, not a remote
        if authority.contains('/') {
            return Err(GitUrlError::UnsupportedScheme(String::new()));
        }

        let (user, host) = match authority.rsplit_once('@') {
            Some((user, host)) => (Some(user.to_string()), host),
            None => (None, authority),
        };
        if host.is_empty() {
            return Err(GitUrlError::MissingHost(input.to_string()));
        }
        let (owner, repository) =
            split_path(path).ok_or_else(|| GitUrlError::MissingPath(input.to_string()))?;

        Ok(Self {
            scheme: GitScheme::Ssh,
            user,
            host: host.to_string(),
            port: None,
            owner,
            repository,
        })
    }

    /// `owner/repository`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }

    /// Web base URL of the host. `ssh` and `git` remotes map to `https`; their
    /// ports are dropped since they belong to the git transport.
    pub fn base_url(&self) -> String {
        match self.scheme {
            GitScheme::Https | GitScheme::Http => match self.port {
                Some(port) => format!("{}://{}:{}", self.scheme.as_str(), self.host, port),
                None => format!("{}://{}", self.scheme.as_str(), self.host),
            },
            GitScheme::Ssh | GitScheme::Git => format!("https://{}", self.host),
        }
    }

    /// HTTPS clone URL of the repository.
    pub fn https_clone_url(&self) -> String {
        format!("{}/{}.git", self.base_url(), self.full_name())
    }
}

impl FromStr for GitUrl {
    type Err = GitUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for GitUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.scheme, &self.user, self.port) {
            (GitScheme::Ssh, Some(user), None) => {
                write!(f, "{user}@{}:{}.git", self.host, self.full_name())
            }
            _ => {
                write!(f, "{}://", self.scheme.as_str())?;
                if let Some(user) = &self.user {
                    write!(f, "{user}@")?;
                }
                write!(f, "{}", self.host)?;
                if let Some(port) = self.port {
                    write!(f, ":{port}")?;
                }
                write!(f, "/{}.git", self.full_name())
            }
        }
    }
}

/// Splits `/group/sub/repo.git/` into (`group/sub`, `repo`).
fn split_path(path: &str) -> Option<(String, String)> {
    let trimmed = path.trim_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let trimmed = trimmed.trim_end_matches('/');
    let (owner, repository) = trimmed.rsplit_once('/')?;
    let owner = owner.trim_matches('/');
    if owner.is_empty() || repository.is_empty() {
        return None;
    }
    Some((owner.to_string(), repository.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_https_urls() {
        let url = GitUrl::parse("https://github.com/katanomi/pkg.git").unwrap();
        assert_eq!(url.scheme, GitScheme::Https);
        assert_eq!(url.host, "github.com");
        assert_eq!(url.port, None);
        assert_eq!(url.owner, "katanomi");
        assert_eq!(url.repository, "pkg");
        assert_eq!(url.base_url(), "https://github.com");
        assert_eq!(url.https_clone_url(), "https://github.com/katanomi/pkg.git");
    }

    #[test]
    fn keeps_explicit_http_ports_and_nested_groups() {
        let url = GitUrl::parse("http://gitlab.local:8080/group/sub/app/").unwrap();
        assert_eq!(url.port, Some(8080));
        assert_eq!(url.full_name(), "group/sub/app");
        assert_eq!(url.base_url(), "http://gitlab.local:8080");
    }

    #[test]
    fn parses_ssh_forms() {
        let scp = GitUrl::parse("git@github.com:katanomi/pkg.git").unwrap();
        assert_eq!(scp.scheme, GitScheme::Ssh);
        assert_eq!(scp.user.as_deref(), Some("git"));
        assert_eq!(scp.full_name(), "katanomi/pkg");
        assert_eq!(scp.base_url(), "https://github.com");
        assert_eq!(scp.to_string(), "git@github.com:katanomi/pkg.git");

        let ssh = GitUrl::parse("ssh://git@gitea.local:2222/team/tool.git").unwrap();
        assert_eq!(ssh.port, Some(2222));
        assert_eq!(ssh.full_name(), "team/tool");
        assert_eq!(ssh.base_url(), "https://gitea.local");
        assert_eq!(ssh.https_clone_url(), "https://gitea.local/team/tool.git");
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(GitUrl::parse("  "), Err(GitUrlError::Empty));
        assert!(matches!(
            GitUrl::parse("ftp://host/o/r"),
            Err(GitUrlError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            GitUrl::parse("https://github.com/onlyowner"),
            Err(GitUrlError::MissingPath(_))
        ));
        assert!(matches!(
            GitUrl::parse("git@github.com:"),
            Err(GitUrlError::MissingPath(_))
        ));
        assert!(matches!(
            GitUrl::parse("@:o/r"),
            Err(GitUrlError::MissingHost(_))
        ));
        assert!(GitUrl::parse("/local/path").is_err());
    }
}
