//! Capability route table and actix-web registration.
//!
//! Every capability has exactly one route. A plugin mounted under
//! `/plugins/v1alpha1/{path}` only gets the routes of the capabilities it
//! implements; requests to the others fall through to 404.

use std::fmt;
use std::sync::Arc;

use actix_web::http::Method;
use actix_web::{web, Route};
use apis::{Capability, Plugin, PluginError};

use crate::error::RouteError;
use crate::handlers;

/// Path every plugin scope is nested under.
pub const PLUGIN_ROUTE_PREFIX: &str = "/plugins/v1alpha1";

/// HTTP method of a capability route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// Reads and lists.
    Get,
    /// Creations and the auth check.
    Post,
    /// Deletions.
    Delete,
}

impl RouteMethod {
    /// The actix-web method.
    pub fn as_method(self) -> Method {
        match self {
            RouteMethod::Get => Method::GET,
            RouteMethod::Post => Method::POST,
            RouteMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
            RouteMethod::Delete => "DELETE",
        })
    }
}

/// One row of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    /// Capability served by the route.
    pub capability: Capability,
    /// HTTP method.
    pub method: RouteMethod,
    /// Path template below the plugin prefix.
    pub path: &'static str,
}

const fn entry(capability: Capability, method: RouteMethod, path: &'static str) -> RouteEntry {
    RouteEntry {
        capability,
        method,
        path,
    }
}

/// The route table, in [`Capability::ALL`] order.
pub const ROUTES: [RouteEntry; 27] = {
    use Capability as C;
    use RouteMethod::{Delete, Get, Post};
    [
        entry(C::AuthChecker, Post, "/authCheck"),
        entry(C::ProjectLister, Get, "/projects"),
        entry(C::ProjectCreator, Post, "/projects"),
        entry(C::ProjectGetter, Get, "/projects/{project}"),
        entry(C::RepositoryLister, Get, "/projects/{project}/coderepositories"),
        entry(C::RepositoryGetter, Get, "/projects/{project}/coderepositories/{repository}"),
        entry(C::BranchLister, Get, "/projects/{project}/coderepositories/{repository}/branches"),
        entry(C::BranchGetter, Get, "/projects/{project}/coderepositories/{repository}/branches/{branch}"),
        entry(C::BranchCreator, Post, "/projects/{project}/coderepositories/{repository}/branches"),
        entry(C::CommitLister, Get, "/projects/{project}/coderepositories/{repository}/commits"),
        entry(C::CommitGetter, Get, "/projects/{project}/coderepositories/{repository}/commits/{sha}"),
        entry(C::CommitStatusCreator, Post, "/projects/{project}/coderepositories/{repository}/commits/{sha}/statuses"),
        entry(C::PullRequestLister, Get, "/projects/{project}/coderepositories/{repository}/pulls"),
        entry(C::PullRequestGetter, Get, "/projects/{project}/coderepositories/{repository}/pulls/{number}"),
        entry(C::PullRequestCreator, Post, "/projects/{project}/coderepositories/{repository}/pulls"),
        entry(C::PullRequestCommentLister, Get, "/projects/{project}/coderepositories/{repository}/pulls/{number}/comments"),
        entry(C::PullRequestCommentCreator, Post, "/projects/{project}/coderepositories/{repository}/pulls/{number}/comments"),
        entry(C::TagLister, Get, "/projects/{project}/coderepositories/{repository}/tags"),
        entry(C::TagGetter, Get, "/projects/{project}/coderepositories/{repository}/tags/{tag}"),
        entry(C::FileContentGetter, Get, "/projects/{project}/coderepositories/{repository}/content"),
        entry(C::FileCreator, Post, "/projects/{project}/coderepositories/{repository}/content"),
        entry(C::ArtifactLister, Get, "/projects/{project}/repositories/{repository}/artifacts"),
        entry(C::ArtifactGetter, Get, "/projects/{project}/repositories/{repository}/artifacts/{artifact}"),
        entry(C::ArtifactDeleter, Delete, "/projects/{project}/repositories/{repository}/artifacts/{artifact}"),
        entry(C::TestPlanLister, Get, "/projects/{project}/testplans"),
        entry(C::TestCaseLister, Get, "/projects/{project}/testplans/{plan}/testcases"),
        entry(C::CodeQualityGetter, Get, "/projects/{project}/coderepositories/{repository}/codequality"),
    ]
};

/// Route table row of `capability`.
pub fn route_for(capability: Capability) -> &'static RouteEntry {
    // ROUTES is indexed in Capability::ALL order
    &ROUTES[capability as usize]
}

/// Routes served for `plugin`, in table order.
pub fn match_routes(plugin: &dyn Plugin) -> Vec<&'static RouteEntry> {
    ROUTES
        .iter()
        .filter(|route| route.capability.is_supported_by(plugin))
        .collect()
}

/// Scope path of a plugin, e.g. `/plugins/v1alpha1/gitlab`.
pub fn plugin_scope_path(plugin_path: &str) -> String {
    format!("{PLUGIN_ROUTE_PREFIX}/{}", plugin_path.trim_matches('/'))
}

/// Registers the routes of `plugin` in its own scope.
///
/// The scope carries the plugin as [`web::Data<dyn Plugin>`] and installs
/// extractor error handlers that answer malformed queries, bodies and paths
/// with a 400 [`apis::ErrorStatus`].
pub fn configure_plugin(cfg: &mut web::ServiceConfig, plugin: Arc<dyn Plugin>) {
    let path = plugin_scope_path(plugin.path());
    let routes = match_routes(plugin.as_ref());
    tracing::info!(
        plugin = plugin.path(),
        scope = %path,
        routes = routes.len(),
        "registering plugin routes"
    );

    let mut scope = web::scope(&path)
        .app_data(web::Data::from(plugin))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            RouteError::bad_request(format!("invalid query: {err}")).into()
        }))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            RouteError::bad_request(format!("invalid body: {err}")).into()
        }))
        .app_data(web::PathConfig::default().error_handler(|err, _req| {
            RouteError::bad_request(format!("invalid path: {err}")).into()
        }));

    for route in routes {
        tracing::debug!(
            capability = %route.capability,
            method = %route.method,
            path = route.path,
            "route registered"
        );
        scope = scope.route(route.path, handler_route(route));
    }
    cfg.service(scope);
}

/// Registers every plugin in `plugins`.
pub fn configure_plugins(cfg: &mut web::ServiceConfig, plugins: &[Arc<dyn Plugin>]) {
    for plugin in plugins {
        configure_plugin(cfg, Arc::clone(plugin));
    }
}

fn handler_route(route: &RouteEntry) -> Route {
    use Capability as C;

    let r = web::method(route.method.as_method());
    match route.capability {
        C::AuthChecker => r.to(handlers::check_auth),
        C::ProjectLister => r.to(handlers::list_projects),
        C::ProjectCreator => r.to(handlers::create_project),
        C::ProjectGetter => r.to(handlers::get_project),
        C::RepositoryLister => r.to(handlers::list_repositories),
        C::RepositoryGetter => r.to(handlers::get_repository),
        C::BranchLister => r.to(handlers::list_branches),
        C::BranchGetter => r.to(handlers::get_branch),
        C::BranchCreator => r.to(handlers::create_branch),
        C::CommitLister => r.to(handlers::list_commits),
        C::CommitGetter => r.to(handlers::get_commit),
        C::CommitStatusCreator => r.to(handlers::create_commit_status),
        C::PullRequestLister => r.to(handlers::list_pull_requests),
        C::PullRequestGetter => r.to(handlers::get_pull_request),
        C::PullRequestCreator => r.to(handlers::create_pull_request),
        C::PullRequestCommentLister => r.to(handlers::list_pull_request_comments),
        C::PullRequestCommentCreator => r.to(handlers::create_pull_request_comment),
        C::TagLister => r.to(handlers::list_tags),
        C::TagGetter => r.to(handlers::get_tag),
        C::FileContentGetter => r.to(handlers::get_file_content),
        C::FileCreator => r.to(handlers::create_file),
        C::ArtifactLister => r.to(handlers::list_artifacts),
        C::ArtifactGetter => r.to(handlers::get_artifact),
        C::ArtifactDeleter => r.to(handlers::delete_artifact),
        C::TestPlanLister => r.to(handlers::list_test_plans),
        C::TestCaseLister => r.to(handlers::list_test_cases),
        C::CodeQualityGetter => r.to(handlers::get_code_quality),
    }
}

/// Error for a capability the plugin does not provide.
pub(crate) fn not_implemented(capability: Capability) -> RouteError {
    RouteError::from(PluginError::not_implemented(capability.name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_follows_capability_order() {
        for (route, capability) in ROUTES.iter().zip(Capability::ALL) {
            assert_eq!(route.capability, capability);
            assert_eq!(route_for(capability), route);
        }
    }

    #[test]
    fn method_and_path_pairs_are_unique() {
        for (i, a) in ROUTES.iter().enumerate() {
            for b in &ROUTES[i + 1..] {
                assert!(
                    !(a.method == b.method && a.path == b.path),
                    "{} and {} share {} {}",
                    a.capability,
                    b.capability,
                    a.method,
                    a.path
                );
            }
        }
    }

    #[test]
    fn scope_path_trims_slashes() {
        assert_eq!(plugin_scope_path("gitlab"), "/plugins/v1alpha1/gitlab");
        assert_eq!(plugin_scope_path("/harbor/"), "/plugins/v1alpha1/harbor");
    }
}
