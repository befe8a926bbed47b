//! Client against a real plugin server.

use std::sync::Arc;

use actix_web::{App, HttpServer};
use apis::{
    paginate, Auth, GitTag, GitTagList, GitTagSpec, ListOptions, Meta, ObjectMeta, Plugin,
    PluginError, PluginErrorKind, PluginResult, ProjectName, RepositoryName, RepositoryRef,
    RequestContext, TagGetter, TagLister, TagName,
};
use async_trait::async_trait;
use plugin_client::{ClientError, PluginClient};
use plugin_route::configure_plugin;

struct Tags;

fn tag(name: &str) -> GitTag {
    GitTag {
        metadata: ObjectMeta::named(name),
        spec: GitTagSpec {
            name: name.to_string(),
            ..GitTagSpec::default()
        },
    }
}

#[async_trait]
impl TagLister for Tags {
    async fn list_tags(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        options: ListOptions,
    ) -> PluginResult<GitTagList> {
        ctx.auth
            .as_ref()
            .ok_or_else(|| PluginError::unauthorized("token required"))?
            .access_token()?;
        let tags = ["v1.0.0", "v1.1.0", "v2.0.0"]
            .into_iter()
            .map(|v| tag(&format!("{}-{v}", repo.repository)))
            .collect();
        Ok(paginate(tags, &options))
    }
}

#[async_trait]
impl TagGetter for Tags {
    async fn get_tag(
        &self,
        _ctx: &RequestContext,
        _repo: &RepositoryRef,
        name: &TagName,
    ) -> PluginResult<GitTag> {
        Err(PluginError::not_found("tag", name))
    }
}

impl Plugin for Tags {
    fn path(&self) -> &str {
        "tags"
    }
    fn as_tag_lister(&self) -> Option<&dyn TagLister> {
        Some(self)
    }
    fn as_tag_getter(&self) -> Option<&dyn TagGetter> {
        Some(self)
    }
}

#[actix_web::test]
async fn client_and_routes_agree_on_paths_headers_and_errors() {
    let plugin: Arc<dyn Plugin> = Arc::new(Tags);
    let server = HttpServer::new(move || {
        let plugin = Arc::clone(&plugin);
        App::new().configure(move |cfg| configure_plugin(cfg, plugin))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .unwrap();
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let client = PluginClient::new(&format!("http://{addr}"), "tags").unwrap();
    let repo = RepositoryRef::new(
        ProjectName::new("katanomi").unwrap(),
        RepositoryName::new("group/app").unwrap(),
    );
    let meta = Meta::new("https://git.example.com");

    let auth = Auth::oauth2("token");
    let scoped = client.request(&meta, Some(&auth));
    let page = scoped
        .tags(&repo)
        .list(&ListOptions::page(2, 2))
        .await
        .unwrap();
    assert_eq!(page.metadata.total_items, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].spec.name, "group/app-v2.0.0");

    let err = client
        .request(&meta, None)
        .tags(&repo)
        .list(&ListOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.plugin_error().map(|e| e.kind),
        Some(PluginErrorKind::Unauthorized)
    );

    let err = scoped
        .tags(&repo)
        .get(&TagName::new("v9").unwrap())
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // no route for unimplemented capabilities
    let err = scoped
        .branches(&repo)
        .list(&ListOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Plugin(ref e) if e.kind == PluginErrorKind::NotFound));

    handle.stop(true).await;
}
