//! HTTP surface of Katanomi plugins.
//!
//! Serves any [`apis::Plugin`] over actix-web. Each capability the plugin
//! implements becomes one route below `/plugins/v1alpha1/{plugin path}`; the
//! `X-Plugin-Meta` and `X-Plugin-Auth` headers are decoded into a
//! [`apis::RequestContext`] and handed to the capability call.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP routing, header decoding and error rendering live
//! here. The [`apis`] crate sees none of it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`routes`] | Route table, capability matching, scope registration |
//! | [`context`] | `PluginContext` extractor |
//! | [`error`] | `RouteError` and its `ErrorStatus` rendering |

pub mod context;
pub mod error;
mod handlers;
pub mod routes;

pub use context::PluginContext;
pub use error::{RouteError, RouteResult};
pub use routes::{
    configure_plugin, configure_plugins, match_routes, plugin_scope_path, route_for, RouteEntry,
    RouteMethod, PLUGIN_ROUTE_PREFIX, ROUTES,
};
