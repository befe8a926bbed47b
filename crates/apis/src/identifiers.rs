//! Newtype identifiers for plugin resources.
//!
//! Every resource name that travels through a plugin route is represented as a
//! distinct newtype wrapping a primitive. A [`BranchName`] cannot be passed where a
//! [`TagName`] is expected even though both are strings on the wire.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (provider-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display, FromStr.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Integer-backed identifiers
// ---------------------------------------------------------------------------

u64_id! {
    /// Number of a pull (merge) request inside one repository.
    PullRequestNumber
}

u64_id! {
    /// Identifies a comment on a pull request.
    CommentId
}

// ---------------------------------------------------------------------------
// String-backed identifiers
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a project (group, namespace or organisation) in the
    /// integrated tool.
    ///
    /// Nested groups are written with `/` separators, e.g. `"devops/platform"`.
    ProjectName
}

string_id! {
    /// Identifies a code or artifact repository inside a project.
    ///
    /// Git providers commonly use `"owner/repo"`; the route layer percent
    /// encodes the whole value into a single path segment.
    RepositoryName
}

string_id! {
    /// A Git branch name (e.g. `"main"`, `"feature/login"`).
    BranchName
}

string_id! {
    /// A Git commit SHA (usually a 40-character lowercase hex string).
    CommitSha
}

string_id! {
    /// A Git tag name (e.g. `"v1.2.0"`).
    TagName
}

string_id! {
    /// Identifies an artifact inside an artifact repository, either by tag or
    /// by digest (`"sha256:…"`).
    ArtifactName
}

string_id! {
    /// Identifies a test plan in a test-management tool.
    TestPlanId
}

string_id! {
    /// URL path segment under which a plugin is mounted (e.g. `"gitlab"`).
    PluginPath
}

// ---------------------------------------------------------------------------
// Composite references
// ---------------------------------------------------------------------------

/// A repository qualified by the project that owns it.
///
/// Almost every git capability is scoped to one repository, so the pair is
/// passed around as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Owning project.
    pub project: ProjectName,
    /// Repository inside the project.
    pub repository: RepositoryName,
}

impl RepositoryRef {
    /// Creates a new reference.
    pub fn new(project: ProjectName, repository: RepositoryName) -> Self {
        Self {
            project,
            repository,
        }
    }
}

impl std::fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.project, self.repository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_ids_reject_empty_values() {
        assert!(BranchName::new("").is_none());
        assert_eq!(BranchName::new("main").unwrap().as_str(), "main");
    }

    #[test]
    fn ids_serialize_as_bare_values() {
        let sha = CommitSha::new("abc123").unwrap();
        assert_eq!(serde_json::to_string(&sha).unwrap(), "\"abc123\"");

        let number: PullRequestNumber = serde_json::from_str("42").unwrap();
        assert_eq!(number.as_u64(), 42);
    }

    #[test]
    fn numeric_ids_parse_from_path_segments() {
        assert_eq!("7".parse::<PullRequestNumber>().unwrap(), PullRequestNumber::new(7));
        assert!("seven".parse::<PullRequestNumber>().is_err());
    }

    #[test]
    fn repository_ref_displays_as_path() {
        let repo = RepositoryRef::new(
            ProjectName::new("devops").unwrap(),
            RepositoryName::new("katanomi/pkg").unwrap(),
        );
        assert_eq!(repo.to_string(), "devops/katanomi/pkg");
    }
}
