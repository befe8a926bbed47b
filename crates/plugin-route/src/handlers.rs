//! actix-web handlers, one per capability.
//!
//! Path segments are read raw from the match info and percent-decoded once,
//! so a repository name sent as `group%2Fapp` arrives as `group/app`.

use actix_web::web::{Bytes, Data, Json, Query};
use actix_web::{HttpRequest, HttpResponse};
use apis::{
    Artifact, ArtifactList, ArtifactName, AuthCheck, AuthCheckOptions, BranchName, Capability,
    CodeQuality, CodeQualityOptions, CommitSha, CreateBranchPayload, CreateCommentPayload,
    CreateCommitStatusPayload, CreateFilePayload, CreateProjectPayload, CreatePullRequestPayload,
    FileContent, FileOptions, GitBranch, GitBranchList, GitCommit, GitCommitList,
    GitCommitStatus, GitPullRequest, GitPullRequestList, GitRepository, GitRepositoryList, GitTag,
    GitTagList, ListOptions, Plugin, Project, ProjectList, ProjectName, PullRequestComment,
    PullRequestCommentList, PullRequestNumber, RepositoryName, RepositoryRef, TagName,
    TestCaseList, TestPlanId, TestPlanList,
};
use percent_encoding::percent_decode_str;

use crate::context::PluginContext;
use crate::error::{RouteError, RouteResult};
use crate::routes::not_implemented;

type PluginData = Data<dyn Plugin>;

// ---------------------------------------------------------------------------
// Path parameters
// ---------------------------------------------------------------------------

fn segment(req: &HttpRequest, name: &str) -> RouteResult<String> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| RouteError::bad_request(format!("missing path parameter {name}")))?;
    let decoded = percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| RouteError::bad_request(format!("path parameter {name} is not utf-8")))?;
    if decoded.is_empty() {
        return Err(RouteError::bad_request(format!(
            "path parameter {name} is empty"
        )));
    }
    Ok(decoded.into_owned())
}

fn named<T>(req: &HttpRequest, name: &str, make: impl FnOnce(String) -> Option<T>) -> RouteResult<T> {
    let value = segment(req, name)?;
    make(value).ok_or_else(|| RouteError::bad_request(format!("invalid path parameter {name}")))
}

fn project(req: &HttpRequest) -> RouteResult<ProjectName> {
    named(req, "project", ProjectName::new)
}

fn repository_name(req: &HttpRequest) -> RouteResult<RepositoryName> {
    named(req, "repository", RepositoryName::new)
}

fn repository_ref(req: &HttpRequest) -> RouteResult<RepositoryRef> {
    Ok(RepositoryRef::new(project(req)?, repository_name(req)?))
}

fn pull_number(req: &HttpRequest) -> RouteResult<PullRequestNumber> {
    let value = segment(req, "number")?;
    value
        .parse::<PullRequestNumber>()
        .map_err(|_| RouteError::bad_request(format!("invalid pull request number '{value}'")))
}

fn capability<T: ?Sized>(found: Option<&T>, capability: Capability) -> RouteResult<&T> {
    found.ok_or_else(|| not_implemented(capability))
}

// ---------------------------------------------------------------------------
// Auth and projects
// ---------------------------------------------------------------------------

pub(crate) async fn check_auth(
    plugin: PluginData,
    ctx: PluginContext,
    body: Bytes,
) -> RouteResult<Json<AuthCheck>> {
    let checker = capability(plugin.as_auth_checker(), Capability::AuthChecker)?;
    let options = auth_check_options(&body)?;
    Ok(Json(checker.check_auth(&ctx, options).await?))
}

/// An empty body means default options.
fn auth_check_options(body: &[u8]) -> RouteResult<AuthCheckOptions> {
    if body.trim_ascii().is_empty() {
        return Ok(AuthCheckOptions::default());
    }
    serde_json::from_slice(body).map_err(|e| RouteError::bad_request(format!("invalid body: {e}")))
}

pub(crate) async fn list_projects(
    plugin: PluginData,
    ctx: PluginContext,
    options: Query<ListOptions>,
) -> RouteResult<Json<ProjectList>> {
    let lister = capability(plugin.as_project_lister(), Capability::ProjectLister)?;
    Ok(Json(lister.list_projects(&ctx, options.into_inner()).await?))
}

pub(crate) async fn create_project(
    plugin: PluginData,
    ctx: PluginContext,
    payload: Json<CreateProjectPayload>,
) -> RouteResult<Json<Project>> {
    let creator = capability(plugin.as_project_creator(), Capability::ProjectCreator)?;
    Ok(Json(creator.create_project(&ctx, payload.into_inner()).await?))
}

pub(crate) async fn get_project(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
) -> RouteResult<Json<Project>> {
    let getter = capability(plugin.as_project_getter(), Capability::ProjectGetter)?;
    let project = project(&req)?;
    Ok(Json(getter.get_project(&ctx, &project).await?))
}

// ---------------------------------------------------------------------------
// Code repositories
// ---------------------------------------------------------------------------

pub(crate) async fn list_repositories(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<GitRepositoryList>> {
    let lister = capability(plugin.as_repository_lister(), Capability::RepositoryLister)?;
    let project = project(&req)?;
    Ok(Json(
        lister
            .list_repositories(&ctx, &project, options.into_inner())
            .await?,
    ))
}

pub(crate) async fn get_repository(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
) -> RouteResult<Json<GitRepository>> {
    let getter = capability(plugin.as_repository_getter(), Capability::RepositoryGetter)?;
    let repo = repository_ref(&req)?;
    Ok(Json(getter.get_repository(&ctx, &repo).await?))
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

pub(crate) async fn list_branches(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<GitBranchList>> {
    let lister = capability(plugin.as_branch_lister(), Capability::BranchLister)?;
    let repo = repository_ref(&req)?;
    Ok(Json(
        lister.list_branches(&ctx, &repo, options.into_inner()).await?,
    ))
}

pub(crate) async fn get_branch(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
) -> RouteResult<Json<GitBranch>> {
    let getter = capability(plugin.as_branch_getter(), Capability::BranchGetter)?;
    let repo = repository_ref(&req)?;
    let branch = named(&req, "branch", BranchName::new)?;
    Ok(Json(getter.get_branch(&ctx, &repo, &branch).await?))
}

pub(crate) async fn create_branch(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    payload: Json<CreateBranchPayload>,
) -> RouteResult<Json<GitBranch>> {
    let creator = capability(plugin.as_branch_creator(), Capability::BranchCreator)?;
    let repo = repository_ref(&req)?;
    Ok(Json(
        creator
            .create_branch(&ctx, &repo, payload.into_inner())
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

pub(crate) async fn list_commits(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<GitCommitList>> {
    let lister = capability(plugin.as_commit_lister(), Capability::CommitLister)?;
    let repo = repository_ref(&req)?;
    Ok(Json(
        lister.list_commits(&ctx, &repo, options.into_inner()).await?,
    ))
}

pub(crate) async fn get_commit(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
) -> RouteResult<Json<GitCommit>> {
    let getter = capability(plugin.as_commit_getter(), Capability::CommitGetter)?;
    let repo = repository_ref(&req)?;
    let sha = named(&req, "sha", CommitSha::new)?;
    Ok(Json(getter.get_commit(&ctx, &repo, &sha).await?))
}

pub(crate) async fn create_commit_status(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    payload: Json<CreateCommitStatusPayload>,
) -> RouteResult<Json<GitCommitStatus>> {
    let creator = capability(
        plugin.as_commit_status_creator(),
        Capability::CommitStatusCreator,
    )?;
    let repo = repository_ref(&req)?;
    let sha = named(&req, "sha", CommitSha::new)?;
    Ok(Json(
        creator
            .create_commit_status(&ctx, &repo, &sha, payload.into_inner())
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

pub(crate) async fn list_pull_requests(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<GitPullRequestList>> {
    let lister = capability(plugin.as_pull_request_lister(), Capability::PullRequestLister)?;
    let repo = repository_ref(&req)?;
    Ok(Json(
        lister
            .list_pull_requests(&ctx, &repo, options.into_inner())
            .await?,
    ))
}

pub(crate) async fn get_pull_request(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
) -> RouteResult<Json<GitPullRequest>> {
    let getter = capability(plugin.as_pull_request_getter(), Capability::PullRequestGetter)?;
    let repo = repository_ref(&req)?;
    let number = pull_number(&req)?;
    Ok(Json(getter.get_pull_request(&ctx, &repo, number).await?))
}

pub(crate) async fn create_pull_request(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    payload: Json<CreatePullRequestPayload>,
) -> RouteResult<Json<GitPullRequest>> {
    let creator = capability(
        plugin.as_pull_request_creator(),
        Capability::PullRequestCreator,
    )?;
    let repo = repository_ref(&req)?;
    Ok(Json(
        creator
            .create_pull_request(&ctx, &repo, payload.into_inner())
            .await?,
    ))
}

pub(crate) async fn list_pull_request_comments(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<PullRequestCommentList>> {
    let lister = capability(
        plugin.as_pull_request_comment_lister(),
        Capability::PullRequestCommentLister,
    )?;
    let repo = repository_ref(&req)?;
    let number = pull_number(&req)?;
    Ok(Json(
        lister
            .list_pull_request_comments(&ctx, &repo, number, options.into_inner())
            .await?,
    ))
}

pub(crate) async fn create_pull_request_comment(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    payload: Json<CreateCommentPayload>,
) -> RouteResult<Json<PullRequestComment>> {
    let creator = capability(
        plugin.as_pull_request_comment_creator(),
        Capability::PullRequestCommentCreator,
    )?;
    let repo = repository_ref(&req)?;
    let number = pull_number(&req)?;
    Ok(Json(
        creator
            .create_pull_request_comment(&ctx, &repo, number, payload.into_inner())
            .await?,
    ))
}

// ---------------------------------------------------------------------------
// Tags and files
// ---------------------------------------------------------------------------

pub(crate) async fn list_tags(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<GitTagList>> {
    let lister = capability(plugin.as_tag_lister(), Capability::TagLister)?;
    let repo = repository_ref(&req)?;
    Ok(Json(lister.list_tags(&ctx, &repo, options.into_inner()).await?))
}

pub(crate) async fn get_tag(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
) -> RouteResult<Json<GitTag>> {
    let getter = capability(plugin.as_tag_getter(), Capability::TagGetter)?;
    let repo = repository_ref(&req)?;
    let tag = named(&req, "tag", TagName::new)?;
    Ok(Json(getter.get_tag(&ctx, &repo, &tag).await?))
}

pub(crate) async fn get_file_content(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<FileOptions>,
) -> RouteResult<Json<FileContent>> {
    let getter = capability(plugin.as_file_content_getter(), Capability::FileContentGetter)?;
    let repo = repository_ref(&req)?;
    let options = options.into_inner();
    if options.path.is_empty() {
        return Err(RouteError::bad_request("query parameter path is empty"));
    }
    Ok(Json(getter.get_file_content(&ctx, &repo, options).await?))
}

pub(crate) async fn create_file(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    payload: Json<CreateFilePayload>,
) -> RouteResult<Json<FileContent>> {
    let creator = capability(plugin.as_file_creator(), Capability::FileCreator)?;
    let repo = repository_ref(&req)?;
    Ok(Json(
        creator.create_file(&ctx, &repo, payload.into_inner()).await?,
    ))
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

pub(crate) async fn list_artifacts(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<ArtifactList>> {
    let lister = capability(plugin.as_artifact_lister(), Capability::ArtifactLister)?;
    let project = project(&req)?;
    let repository = repository_name(&req)?;
    Ok(Json(
        lister
            .list_artifacts(&ctx, &project, &repository, options.into_inner())
            .await?,
    ))
}

pub(crate) async fn get_artifact(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
) -> RouteResult<Json<Artifact>> {
    let getter = capability(plugin.as_artifact_getter(), Capability::ArtifactGetter)?;
    let project = project(&req)?;
    let repository = repository_name(&req)?;
    let artifact = named(&req, "artifact", ArtifactName::new)?;
    Ok(Json(
        getter
            .get_artifact(&ctx, &project, &repository, &artifact)
            .await?,
    ))
}

pub(crate) async fn delete_artifact(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
) -> RouteResult<HttpResponse> {
    let deleter = capability(plugin.as_artifact_deleter(), Capability::ArtifactDeleter)?;
    let project = project(&req)?;
    let repository = repository_name(&req)?;
    let artifact = named(&req, "artifact", ArtifactName::new)?;
    deleter
        .delete_artifact(&ctx, &project, &repository, &artifact)
        .await?;
    tracing::info!(%project, %repository, %artifact, "artifact deleted");
    Ok(HttpResponse::NoContent().finish())
}

// ---------------------------------------------------------------------------
// Test management and code quality
// ---------------------------------------------------------------------------

pub(crate) async fn list_test_plans(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<TestPlanList>> {
    let lister = capability(plugin.as_test_plan_lister(), Capability::TestPlanLister)?;
    let project = project(&req)?;
    Ok(Json(
        lister
            .list_test_plans(&ctx, &project, options.into_inner())
            .await?,
    ))
}

pub(crate) async fn list_test_cases(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<ListOptions>,
) -> RouteResult<Json<TestCaseList>> {
    let lister = capability(plugin.as_test_case_lister(), Capability::TestCaseLister)?;
    let project = project(&req)?;
    let plan = named(&req, "plan", TestPlanId::new)?;
    Ok(Json(
        lister
            .list_test_cases(&ctx, &project, &plan, options.into_inner())
            .await?,
    ))
}

pub(crate) async fn get_code_quality(
    plugin: PluginData,
    ctx: PluginContext,
    req: HttpRequest,
    options: Query<CodeQualityOptions>,
) -> RouteResult<Json<CodeQuality>> {
    let getter = capability(plugin.as_code_quality_getter(), Capability::CodeQualityGetter)?;
    let repo = repository_ref(&req)?;
    Ok(Json(
        getter
            .get_code_quality(&ctx, &repo, options.into_inner())
            .await?,
    ))
}
