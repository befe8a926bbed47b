use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, App};
use apis::{
    paginate, ArtifactDeleter, ArtifactName, Auth, AuthCheck, AuthCheckOptions, AuthChecker,
    BranchGetter, BranchLister, BranchName,
    Capability, ErrorStatus, FileContent, FileContentGetter, FileOptions, GitBranch,
    GitBranchList, GitBranchSpec, GitPullRequest, GitPullRequestSpec, ListOptions, Meta,
    ObjectMeta, Plugin, PluginError, PluginResult, ProjectName, PullRequestGetter,
    PullRequestNumber, RepositoryName, RepositoryRef, RequestContext, AUTH_HEADER, META_HEADER,
};
use async_trait::async_trait;
use plugin_route::{configure_plugin, match_routes};

struct FakeGit;

fn branch(name: &str) -> GitBranch {
    GitBranch {
        metadata: ObjectMeta::named(name),
        spec: GitBranchSpec {
            name: name.to_string(),
            ..GitBranchSpec::default()
        },
    }
}

#[async_trait]
impl AuthChecker for FakeGit {
    async fn check_auth(
        &self,
        _ctx: &RequestContext,
        options: AuthCheckOptions,
    ) -> PluginResult<AuthCheck> {
        Ok(AuthCheck {
            allowed: true,
            message: options.redirect_url,
            authorize_url: None,
        })
    }
}

#[async_trait]
impl BranchLister for FakeGit {
    async fn list_branches(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        options: ListOptions,
    ) -> PluginResult<GitBranchList> {
        // echo the decoded repository and base url so tests can see them
        let names = [
            format!("{repo}"),
            ctx.meta.base_url.clone(),
            "main".to_string(),
        ];
        Ok(paginate(names.iter().map(|n| branch(n)).collect(), &options))
    }
}

#[async_trait]
impl BranchGetter for FakeGit {
    async fn get_branch(
        &self,
        _ctx: &RequestContext,
        _repo: &RepositoryRef,
        name: &BranchName,
    ) -> PluginResult<GitBranch> {
        if name.as_str() == "main" {
            Ok(branch("main"))
        } else {
            Err(PluginError::not_found("branch", name))
        }
    }
}

#[async_trait]
impl PullRequestGetter for FakeGit {
    async fn get_pull_request(
        &self,
        ctx: &RequestContext,
        _repo: &RepositoryRef,
        number: PullRequestNumber,
    ) -> PluginResult<GitPullRequest> {
        let token = ctx
            .auth
            .as_ref()
            .ok_or_else(|| PluginError::unauthorized("credentials required"))?
            .access_token()?;
        Ok(GitPullRequest {
            metadata: ObjectMeta::named(number.to_string()),
            spec: GitPullRequestSpec {
                number: number.as_u64(),
                title: format!("opened with {token}"),
                ..GitPullRequestSpec::default()
            },
        })
    }
}

#[async_trait]
impl FileContentGetter for FakeGit {
    async fn get_file_content(
        &self,
        _ctx: &RequestContext,
        _repo: &RepositoryRef,
        options: FileOptions,
    ) -> PluginResult<FileContent> {
        Ok(FileContent {
            path: options.path,
            revision: options.revision.unwrap_or_else(|| "main".to_string()),
            content: "aGVsbG8=".to_string(),
            size: 5,
        })
    }
}

#[async_trait]
impl ArtifactDeleter for FakeGit {
    async fn delete_artifact(
        &self,
        _ctx: &RequestContext,
        _project: &ProjectName,
        _repository: &RepositoryName,
        _artifact: &ArtifactName,
    ) -> PluginResult<()> {
        Ok(())
    }
}

impl Plugin for FakeGit {
    fn path(&self) -> &str {
        "fake"
    }
    fn as_branch_lister(&self) -> Option<&dyn BranchLister> {
        Some(self)
    }
    fn as_auth_checker(&self) -> Option<&dyn AuthChecker> {
        Some(self)
    }
    fn as_branch_getter(&self) -> Option<&dyn BranchGetter> {
        Some(self)
    }
    fn as_pull_request_getter(&self) -> Option<&dyn PullRequestGetter> {
        Some(self)
    }
    fn as_file_content_getter(&self) -> Option<&dyn FileContentGetter> {
        Some(self)
    }
    fn as_artifact_deleter(&self) -> Option<&dyn ArtifactDeleter> {
        Some(self)
    }
}

const REPO: &str = "/plugins/v1alpha1/fake/projects/katanomi/coderepositories/group%2Fapp";

fn meta_header() -> (&'static str, String) {
    (
        META_HEADER,
        Meta::new("https://git.example.com").to_header_value(),
    )
}

macro_rules! app {
    () => {
        test::init_service(App::new().configure(|cfg| {
            configure_plugin(cfg, Arc::new(FakeGit));
        }))
        .await
    };
}

#[actix_web::test]
async fn only_implemented_capabilities_are_routed() {
    let capabilities: Vec<Capability> = match_routes(&FakeGit)
        .into_iter()
        .map(|route| route.capability)
        .collect();
    assert_eq!(
        capabilities,
        vec![
            Capability::AuthChecker,
            Capability::BranchLister,
            Capability::BranchGetter,
            Capability::PullRequestGetter,
            Capability::FileContentGetter,
            Capability::ArtifactDeleter,
        ]
    );
}

#[actix_web::test]
async fn lists_branches_with_decoded_path_and_paging() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/branches?page=1&itemsPerPage=2"))
        .insert_header(meta_header())
        .to_request();

    let list: GitBranchList = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list.metadata.total_items, 3);
    let names: Vec<&str> = list.items.iter().map(|b| b.spec.name.as_str()).collect();
    assert_eq!(names, vec!["katanomi/group/app", "https://git.example.com"]);
}

#[actix_web::test]
async fn missing_meta_header_is_a_bad_request() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/branches"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let status: ErrorStatus = test::read_body_json(resp).await;
    assert_eq!(status.reason, "BadRequest");
    assert!(status.message.contains(META_HEADER));
}

#[actix_web::test]
async fn plugin_errors_keep_their_status() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/branches/develop"))
        .insert_header(meta_header())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let status: ErrorStatus = test::read_body_json(resp).await;
    assert_eq!(status.reason, "NotFound");
    assert_eq!(status.code, 404);
}

#[actix_web::test]
async fn unimplemented_capabilities_are_not_found() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/tags"))
        .insert_header(meta_header())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn pull_requests_see_the_auth_header() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/pulls/42"))
        .insert_header(meta_header())
        .insert_header((AUTH_HEADER, Auth::oauth2("secret").to_header_value()))
        .to_request();
    let pr: GitPullRequest = test::call_and_read_body_json(&app, req).await;
    assert_eq!(pr.spec.number, 42);
    assert_eq!(pr.spec.title, "opened with secret");

    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/pulls/42"))
        .insert_header(meta_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn invalid_path_and_query_values_are_bad_requests() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/pulls/not-a-number"))
        .insert_header(meta_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/branches?page=first"))
        .insert_header(meta_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let status: ErrorStatus = test::read_body_json(resp).await;
    assert_eq!(status.code, 400);

    // content requires ?path=
    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/content"))
        .insert_header(meta_header())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn reads_file_content_from_query() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri(&format!("{REPO}/content?path=docs%2FREADME.md&ref=v1.0"))
        .insert_header(meta_header())
        .to_request();

    let file: FileContent = test::call_and_read_body_json(&app, req).await;
    assert_eq!(file.path, "docs/README.md");
    assert_eq!(file.revision, "v1.0");
}

#[actix_web::test]
async fn deleting_an_artifact_answers_no_content() {
    let app = app!();
    let req = test::TestRequest::delete()
        .uri("/plugins/v1alpha1/fake/projects/library/repositories/nginx/artifacts/sha256:abc")
        .insert_header(meta_header())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn auth_check_accepts_empty_and_rejects_malformed_bodies() {
    let app = app!();
    let uri = "/plugins/v1alpha1/fake/authCheck";

    let req = test::TestRequest::post()
        .uri(uri)
        .insert_header(meta_header())
        .to_request();
    let check: AuthCheck = test::call_and_read_body_json(&app, req).await;
    assert!(check.allowed);
    assert_eq!(check.message, None);

    let req = test::TestRequest::post()
        .uri(uri)
        .insert_header(meta_header())
        .set_json(serde_json::json!({"redirectUrl": "https://ci.example.com/cb"}))
        .to_request();
    let check: AuthCheck = test::call_and_read_body_json(&app, req).await;
    assert_eq!(check.message.as_deref(), Some("https://ci.example.com/cb"));

    let req = test::TestRequest::post()
        .uri(uri)
        .insert_header(meta_header())
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let status: ErrorStatus = test::read_body_json(resp).await;
    assert_eq!(status.code, 400);
}
