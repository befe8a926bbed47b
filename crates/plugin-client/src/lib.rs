//! HTTP client for Katanomi plugins.
//!
//! [`PluginClient`] addresses one plugin on a plugin server. Scoping it to a
//! caller with [`PluginClient::request`] yields a [`ScopedClient`] that sends
//! the `X-Plugin-Meta` and `X-Plugin-Auth` headers on every call and hands out
//! typed sub-clients per resource:
//!
//! ```no_run
//! # async fn example() -> Result<(), plugin_client::ClientError> {
//! use apis::{Auth, ListOptions, Meta, ProjectName, RepositoryName, RepositoryRef};
//! use plugin_client::PluginClient;
//!
//! let client = PluginClient::new("http://plugins.katanomi.svc", "gitlab")?;
//! let scoped = client.request(
//!     &Meta::new("https://gitlab.com"),
//!     Some(&Auth::personal_token("glpat-...")),
//! );
//! let repo = RepositoryRef::new(
//!     ProjectName::new("katanomi").unwrap(),
//!     RepositoryName::new("pkg").unwrap(),
//! );
//! let branches = scoped.branches(&repo).list(&ListOptions::default()).await?;
//! println!("{} branches", branches.metadata.total_items);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport and encoding only; every request and response
//! type comes from [`apis`].

mod client;
pub mod error;
mod resources;

pub use client::{PluginClient, ScopedClient};
pub use error::{ClientError, ClientResult};
pub use resources::{
    ArtifactsClient, AuthClient, BranchesClient, CodeQualityClient, CommitsClient, FilesClient,
    ProjectsClient, PullRequestsClient, RepositoriesClient, TagsClient, TestPlansClient,
};
