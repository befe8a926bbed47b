//! Shared plugin API for Katanomi integrations.
//!
//! This crate contains the resource types, identifiers, request metadata,
//! capability traits and error taxonomy that plugins, the route layer and the
//! HTTP client all agree on. Transport crates build on these definitions; they
//! never add domain rules of their own.
//!
//! ## Architectural Layer
//!
//! **Domain types + port definitions.** This crate has no I/O dependencies.
//! A plugin implements the capability traits in [`capabilities`]; the
//! `plugin-route` crate serves them over HTTP and `plugin-client` calls them.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`ProjectName`, `BranchName`, `RepositoryRef`, etc.) |
//! | [`meta`] | `X-Plugin-Meta` / `X-Plugin-Auth` header payloads |
//! | [`types`] | Resource documents (`GitBranch`, `Artifact`, `ResourceList`, etc.) |
//! | [`options`] | List, file and code-quality query options, pagination |
//! | [`errors`] | `PluginError` and its wire form |
//! | [`capabilities`] | Capability traits, the `Plugin` trait and `Capability` |
//! | [`filters`] | Filter combinators, ref patterns and tag prefix matching |
//! | [`giturl`] | Git remote URL parsing |

pub mod capabilities;
pub mod errors;
pub mod filters;
pub mod giturl;
pub mod identifiers;
pub mod meta;
pub mod options;
pub mod types;

pub use capabilities::*;
pub use errors::{ErrorStatus, PluginError, PluginErrorKind};
pub use giturl::{GitUrl, GitUrlError};
pub use identifiers::{
    ArtifactName, BranchName, CommentId, CommitSha, PluginPath, ProjectName, PullRequestNumber,
    RepositoryName, RepositoryRef, TagName, TestPlanId,
};
pub use meta::{
    Auth, AuthError, AuthType, HeaderError, Meta, RequestContext, AUTH_HEADER, META_HEADER,
};
pub use options::{
    paginate, CodeQualityOptions, FileOptions, ListOptions, SortOrder, DEFAULT_ITEMS_PER_PAGE,
    DEFAULT_PAGE, MAX_ITEMS_PER_PAGE,
};
pub use types::*;
