//! Capability traits and the [`Plugin`] trait.
//!
//! A plugin integrates one third-party tool (a git provider, an artifact
//! registry, a test-management system, ...). Each unit of functionality it may
//! offer is a separate *capability* trait; a plugin implements any subset of
//! them and advertises which ones through the `as_*` accessors of [`Plugin`].
//!
//! The route layer walks [`Capability::ALL`] in order and registers one HTTP
//! route for every capability whose accessor returns `Some`.
//!
//! ```ignore
//! struct Gitea;
//!
//! #[async_trait]
//! impl BranchLister for Gitea { /* ... */ }
//!
//! impl Plugin for Gitea {
//!     fn path(&self) -> &str { "gitea" }
//!     fn as_branch_lister(&self) -> Option<&dyn BranchLister> { Some(self) }
//! }
//! ```

use async_trait::async_trait;

use crate::{
    Artifact, ArtifactList, ArtifactName, AuthCheck, AuthCheckOptions, BranchName, CodeQuality,
    CodeQualityOptions, CommitSha, CreateBranchPayload, CreateCommentPayload,
    CreateCommitStatusPayload, CreateFilePayload, CreatePullRequestPayload, CreateProjectPayload,
    FileContent, FileOptions, GitBranch, GitBranchList, GitCommit, GitCommitList, GitCommitStatus,
    GitPullRequest, GitPullRequestList, GitRepository, GitRepositoryList, GitTag, GitTagList,
    ListOptions, PluginError, Project, ProjectList, ProjectName, PullRequestComment,
    PullRequestCommentList, PullRequestNumber, RepositoryName, RepositoryRef, RequestContext,
    TagName, TestCaseList, TestPlanId, TestPlanList,
};

/// Result type returned by every capability.
pub type PluginResult<T> = Result<T, PluginError>;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Verifies credentials against the integrated tool.
#[async_trait]
pub trait AuthChecker: Send + Sync {
    /// Checks whether the request credentials are accepted.
    async fn check_auth(
        &self,
        ctx: &RequestContext,
        options: AuthCheckOptions,
    ) -> PluginResult<AuthCheck>;
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Lists projects.
#[async_trait]
pub trait ProjectLister: Send + Sync {
    /// Returns one page of projects visible to the request credentials.
    async fn list_projects(
        &self,
        ctx: &RequestContext,
        options: ListOptions,
    ) -> PluginResult<ProjectList>;
}

/// Creates projects.
#[async_trait]
pub trait ProjectCreator: Send + Sync {
    /// Creates a project.
    async fn create_project(
        &self,
        ctx: &RequestContext,
        payload: CreateProjectPayload,
    ) -> PluginResult<Project>;
}

/// Reads a single project.
#[async_trait]
pub trait ProjectGetter: Send + Sync {
    /// Returns the named project.
    async fn get_project(&self, ctx: &RequestContext, project: &ProjectName)
        -> PluginResult<Project>;
}

// ---------------------------------------------------------------------------
// Code repositories
// ---------------------------------------------------------------------------

/// Lists code repositories of a project.
#[async_trait]
pub trait RepositoryLister: Send + Sync {
    /// Returns one page of repositories.
    async fn list_repositories(
        &self,
        ctx: &RequestContext,
        project: &ProjectName,
        options: ListOptions,
    ) -> PluginResult<GitRepositoryList>;
}

/// Reads a single code repository.
#[async_trait]
pub trait RepositoryGetter: Send + Sync {
    /// Returns the referenced repository.
    async fn get_repository(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
    ) -> PluginResult<GitRepository>;
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

/// Lists branches.
#[async_trait]
pub trait BranchLister: Send + Sync {
    /// Returns one page of branches.
    async fn list_branches(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        options: ListOptions,
    ) -> PluginResult<GitBranchList>;
}

/// Reads a single branch.
#[async_trait]
pub trait BranchGetter: Send + Sync {
    /// Returns the named branch.
    async fn get_branch(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        branch: &BranchName,
    ) -> PluginResult<GitBranch>;
}

/// Creates branches.
#[async_trait]
pub trait BranchCreator: Send + Sync {
    /// Creates a branch from an existing ref.
    async fn create_branch(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        payload: CreateBranchPayload,
    ) -> PluginResult<GitBranch>;
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// Lists commits.
#[async_trait]
pub trait CommitLister: Send + Sync {
    /// Returns one page of commits, newest first.
    async fn list_commits(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        options: ListOptions,
    ) -> PluginResult<GitCommitList>;
}

/// Reads a single commit.
#[async_trait]
pub trait CommitGetter: Send + Sync {
    /// Returns the commit with the given SHA.
    async fn get_commit(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        sha: &CommitSha,
    ) -> PluginResult<GitCommit>;
}

/// Attaches statuses to commits.
#[async_trait]
pub trait CommitStatusCreator: Send + Sync {
    /// Reports a status on the commit with the given SHA.
    async fn create_commit_status(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        sha: &CommitSha,
        payload: CreateCommitStatusPayload,
    ) -> PluginResult<GitCommitStatus>;
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// Lists pull requests.
#[async_trait]
pub trait PullRequestLister: Send + Sync {
    /// Returns one page of pull requests.
    async fn list_pull_requests(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        options: ListOptions,
    ) -> PluginResult<GitPullRequestList>;
}

/// Reads a single pull request.
#[async_trait]
pub trait PullRequestGetter: Send + Sync {
    /// Returns the pull request with the given number.
    async fn get_pull_request(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        number: PullRequestNumber,
    ) -> PluginResult<GitPullRequest>;
}

/// Opens pull requests.
#[async_trait]
pub trait PullRequestCreator: Send + Sync {
    /// Opens a pull request.
    async fn create_pull_request(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        payload: CreatePullRequestPayload,
    ) -> PluginResult<GitPullRequest>;
}

/// Lists pull request comments.
#[async_trait]
pub trait PullRequestCommentLister: Send + Sync {
    /// Returns one page of comments, oldest first.
    async fn list_pull_request_comments(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        number: PullRequestNumber,
        options: ListOptions,
    ) -> PluginResult<PullRequestCommentList>;
}

/// Comments on pull requests.
#[async_trait]
pub trait PullRequestCommentCreator: Send + Sync {
    /// Adds a comment.
    async fn create_pull_request_comment(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        number: PullRequestNumber,
        payload: CreateCommentPayload,
    ) -> PluginResult<PullRequestComment>;
}

// ---------------------------------------------------------------------------
// Tags and files
// ---------------------------------------------------------------------------

/// Lists tags.
#[async_trait]
pub trait TagLister: Send + Sync {
    /// Returns one page of tags.
    async fn list_tags(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        options: ListOptions,
    ) -> PluginResult<GitTagList>;
}

/// Reads a single tag.
#[async_trait]
pub trait TagGetter: Send + Sync {
    /// Returns the named tag.
    async fn get_tag(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        tag: &TagName,
    ) -> PluginResult<GitTag>;
}

/// Reads file contents.
#[async_trait]
pub trait FileContentGetter: Send + Sync {
    /// Returns the content of a file at a revision.
    async fn get_file_content(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        options: FileOptions,
    ) -> PluginResult<FileContent>;
}

/// Commits new files.
#[async_trait]
pub trait FileCreator: Send + Sync {
    /// Commits a new file and returns its stored content.
    async fn create_file(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        payload: CreateFilePayload,
    ) -> PluginResult<FileContent>;
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Lists artifacts of a registry repository.
#[async_trait]
pub trait ArtifactLister: Send + Sync {
    /// Returns one page of artifacts.
    async fn list_artifacts(
        &self,
        ctx: &RequestContext,
        project: &ProjectName,
        repository: &RepositoryName,
        options: ListOptions,
    ) -> PluginResult<ArtifactList>;
}

/// Reads a single artifact.
#[async_trait]
pub trait ArtifactGetter: Send + Sync {
    /// Returns the artifact referenced by tag or digest.
    async fn get_artifact(
        &self,
        ctx: &RequestContext,
        project: &ProjectName,
        repository: &RepositoryName,
        artifact: &ArtifactName,
    ) -> PluginResult<Artifact>;
}

/// Deletes artifacts.
#[async_trait]
pub trait ArtifactDeleter: Send + Sync {
    /// Deletes the artifact referenced by tag or digest.
    async fn delete_artifact(
        &self,
        ctx: &RequestContext,
        project: &ProjectName,
        repository: &RepositoryName,
        artifact: &ArtifactName,
    ) -> PluginResult<()>;
}

// ---------------------------------------------------------------------------
// Test management
// ---------------------------------------------------------------------------

/// Lists test plans.
#[async_trait]
pub trait TestPlanLister: Send + Sync {
    /// Returns one page of test plans of a project.
    async fn list_test_plans(
        &self,
        ctx: &RequestContext,
        project: &ProjectName,
        options: ListOptions,
    ) -> PluginResult<TestPlanList>;
}

/// Lists test cases.
#[async_trait]
pub trait TestCaseLister: Send + Sync {
    /// Returns one page of test cases of a plan.
    async fn list_test_cases(
        &self,
        ctx: &RequestContext,
        project: &ProjectName,
        plan: &TestPlanId,
        options: ListOptions,
    ) -> PluginResult<TestCaseList>;
}

// ---------------------------------------------------------------------------
// Code quality
// ---------------------------------------------------------------------------

/// Reads code-quality summaries.
#[async_trait]
pub trait CodeQualityGetter: Send + Sync {
    /// Returns the latest analysis of a repository.
    async fn get_code_quality(
        &self,
        ctx: &RequestContext,
        repo: &RepositoryRef,
        options: CodeQualityOptions,
    ) -> PluginResult<CodeQuality>;
}

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// A third-party tool integration.
///
/// Every `as_*` accessor defaults to `None`; a plugin overrides the ones for
/// the capabilities it implements, returning `Some(self)`.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// URL path segment the plugin is mounted under, e.g. `"gitlab"`.
    fn path(&self) -> &str;

    /// One-off initialisation before the plugin starts serving.
    async fn setup(&self) -> PluginResult<()> {
        Ok(())
    }

    /// The [`AuthChecker`] capability, if implemented.
    fn as_auth_checker(&self) -> Option<&dyn AuthChecker> {
        None
    }

    /// The [`ProjectLister`] capability, if implemented.
    fn as_project_lister(&self) -> Option<&dyn ProjectLister> {
        None
    }

    /// The [`ProjectCreator`] capability, if implemented.
    fn as_project_creator(&self) -> Option<&dyn ProjectCreator> {
        None
    }

    /// The [`ProjectGetter`] capability, if implemented.
    fn as_project_getter(&self) -> Option<&dyn ProjectGetter> {
        None
    }

    /// The [`RepositoryLister`] capability, if implemented.
    fn as_repository_lister(&self) -> Option<&dyn RepositoryLister> {
        None
    }

    /// The [`RepositoryGetter`] capability, if implemented.
    fn as_repository_getter(&self) -> Option<&dyn RepositoryGetter> {
        None
    }

    /// The [`BranchLister`] capability, if implemented.
    fn as_branch_lister(&self) -> Option<&dyn BranchLister> {
        None
    }

    /// The [`BranchGetter`] capability, if implemented.
    fn as_branch_getter(&self) -> Option<&dyn BranchGetter> {
        None
    }

    /// The [`BranchCreator`] capability, if implemented.
    fn as_branch_creator(&self) -> Option<&dyn BranchCreator> {
        None
    }

    /// The [`CommitLister`] capability, if implemented.
    fn as_commit_lister(&self) -> Option<&dyn CommitLister> {
        None
    }

    /// The [`CommitGetter`] capability, if implemented.
    fn as_commit_getter(&self) -> Option<&dyn CommitGetter> {
        None
    }

    /// The [`CommitStatusCreator`] capability, if implemented.
    fn as_commit_status_creator(&self) -> Option<&dyn CommitStatusCreator> {
        None
    }

    /// The [`PullRequestLister`] capability, if implemented.
    fn as_pull_request_lister(&self) -> Option<&dyn PullRequestLister> {
        None
    }

    /// The [`PullRequestGetter`] capability, if implemented.
    fn as_pull_request_getter(&self) -> Option<&dyn PullRequestGetter> {
        None
    }

    /// The [`PullRequestCreator`] capability, if implemented.
    fn as_pull_request_creator(&self) -> Option<&dyn PullRequestCreator> {
        None
    }

    /// The [`PullRequestCommentLister`] capability, if implemented.
    fn as_pull_request_comment_lister(&self) -> Option<&dyn PullRequestCommentLister> {
        None
    }

    /// The [`PullRequestCommentCreator`] capability, if implemented.
    fn as_pull_request_comment_creator(&self) -> Option<&dyn PullRequestCommentCreator> {
        None
    }

    /// The [`TagLister`] capability, if implemented.
    fn as_tag_lister(&self) -> Option<&dyn TagLister> {
        None
    }

    /// The [`TagGetter`] capability, if implemented.
    fn as_tag_getter(&self) -> Option<&dyn TagGetter> {
        None
    }

    /// The [`FileContentGetter`] capability, if implemented.
    fn as_file_content_getter(&self) -> Option<&dyn FileContentGetter> {
        None
    }

    /// The [`FileCreator`] capability, if implemented.
    fn as_file_creator(&self) -> Option<&dyn FileCreator> {
        None
    }

    /// The [`ArtifactLister`] capability, if implemented.
    fn as_artifact_lister(&self) -> Option<&dyn ArtifactLister> {
        None
    }

    /// The [`ArtifactGetter`] capability, if implemented.
    fn as_artifact_getter(&self) -> Option<&dyn ArtifactGetter> {
        None
    }

    /// The [`ArtifactDeleter`] capability, if implemented.
    fn as_artifact_deleter(&self) -> Option<&dyn ArtifactDeleter> {
        None
    }

    /// The [`TestPlanLister`] capability, if implemented.
    fn as_test_plan_lister(&self) -> Option<&dyn TestPlanLister> {
        None
    }

    /// The [`TestCaseLister`] capability, if implemented.
    fn as_test_case_lister(&self) -> Option<&dyn TestCaseLister> {
        None
    }

    /// The [`CodeQualityGetter`] capability, if implemented.
    fn as_code_quality_getter(&self) -> Option<&dyn CodeQualityGetter> {
        None
    }
}

// ---------------------------------------------------------------------------
// Capability table
// ---------------------------------------------------------------------------

/// Names every capability trait. [`Capability::ALL`] fixes the matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Plugins implementing [`AuthChecker`].
    AuthChecker,
    /// Plugins implementing [`ProjectLister`].
    ProjectLister,
    /// Plugins implementing [`ProjectCreator`].
    ProjectCreator,
    /// Plugins implementing [`ProjectGetter`].
    ProjectGetter,
    /// Plugins implementing [`RepositoryLister`].
    RepositoryLister,
    /// Plugins implementing [`RepositoryGetter`].
    RepositoryGetter,
    /// Plugins implementing [`BranchLister`].
    BranchLister,
    /// Plugins implementing [`BranchGetter`].
    BranchGetter,
    /// Plugins implementing [`BranchCreator`].
    BranchCreator,
    /// Plugins implementing [`CommitLister`].
    CommitLister,
    /// Plugins implementing [`CommitGetter`].
    CommitGetter,
    /// Plugins implementing [`CommitStatusCreator`].
    CommitStatusCreator,
    /// Plugins implementing [`PullRequestLister`].
    PullRequestLister,
    /// Plugins implementing [`PullRequestGetter`].
    PullRequestGetter,
    /// Plugins implementing [`PullRequestCreator`].
    PullRequestCreator,
    /// Plugins implementing [`PullRequestCommentLister`].
    PullRequestCommentLister,
    /// Plugins implementing [`PullRequestCommentCreator`].
    PullRequestCommentCreator,
    /// Plugins implementing [`TagLister`].
    TagLister,
    /// Plugins implementing [`TagGetter`].
    TagGetter,
    /// Plugins implementing [`FileContentGetter`].
    FileContentGetter,
    /// Plugins implementing [`FileCreator`].
    FileCreator,
    /// Plugins implementing [`ArtifactLister`].
    ArtifactLister,
    /// Plugins implementing [`ArtifactGetter`].
    ArtifactGetter,
    /// Plugins implementing [`ArtifactDeleter`].
    ArtifactDeleter,
    /// Plugins implementing [`TestPlanLister`].
    TestPlanLister,
    /// Plugins implementing [`TestCaseLister`].
    TestCaseLister,
    /// Plugins implementing [`CodeQualityGetter`].
    CodeQualityGetter,
}

impl Capability {
    /// Every capability, in matching order.
    pub const ALL: [Capability; 27] = [
        Capability::AuthChecker,
        Capability::ProjectLister,
        Capability::ProjectCreator,
        Capability::ProjectGetter,
        Capability::RepositoryLister,
        Capability::RepositoryGetter,
        Capability::BranchLister,
        Capability::BranchGetter,
        Capability::BranchCreator,
        Capability::CommitLister,
        Capability::CommitGetter,
        Capability::CommitStatusCreator,
        Capability::PullRequestLister,
        Capability::PullRequestGetter,
        Capability::PullRequestCreator,
        Capability::PullRequestCommentLister,
        Capability::PullRequestCommentCreator,
        Capability::TagLister,
        Capability::TagGetter,
        Capability::FileContentGetter,
        Capability::FileCreator,
        Capability::ArtifactLister,
        Capability::ArtifactGetter,
        Capability::ArtifactDeleter,
        Capability::TestPlanLister,
        Capability::TestCaseLister,
        Capability::CodeQualityGetter,
    ];

    /// Name of the capability trait.
    pub fn name(self) -> &'static str {
        match self {
            Capability::AuthChecker => "AuthChecker",
            Capability::ProjectLister => "ProjectLister",
            Capability::ProjectCreator => "ProjectCreator",
            Capability::ProjectGetter => "ProjectGetter",
            Capability::RepositoryLister => "RepositoryLister",
            Capability::RepositoryGetter => "RepositoryGetter",
            Capability::BranchLister => "BranchLister",
            Capability::BranchGetter => "BranchGetter",
            Capability::BranchCreator => "BranchCreator",
            Capability::CommitLister => "CommitLister",
            Capability::CommitGetter => "CommitGetter",
            Capability::CommitStatusCreator => "CommitStatusCreator",
            Capability::PullRequestLister => "PullRequestLister",
            Capability::PullRequestGetter => "PullRequestGetter",
            Capability::PullRequestCreator => "PullRequestCreator",
            Capability::PullRequestCommentLister => "PullRequestCommentLister",
            Capability::PullRequestCommentCreator => "PullRequestCommentCreator",
            Capability::TagLister => "TagLister",
            Capability::TagGetter => "TagGetter",
            Capability::FileContentGetter => "FileContentGetter",
            Capability::FileCreator => "FileCreator",
            Capability::ArtifactLister => "ArtifactLister",
            Capability::ArtifactGetter => "ArtifactGetter",
            Capability::ArtifactDeleter => "ArtifactDeleter",
            Capability::TestPlanLister => "TestPlanLister",
            Capability::TestCaseLister => "TestCaseLister",
            Capability::CodeQualityGetter => "CodeQualityGetter",
        }
    }

    /// Returns `true` if `plugin` implements this capability.
    pub fn is_supported_by(self, plugin: &dyn Plugin) -> bool {
        match self {
            Capability::AuthChecker => plugin.as_auth_checker().is_some(),
            Capability::ProjectLister => plugin.as_project_lister().is_some(),
            Capability::ProjectCreator => plugin.as_project_creator().is_some(),
            Capability::ProjectGetter => plugin.as_project_getter().is_some(),
            Capability::RepositoryLister => plugin.as_repository_lister().is_some(),
            Capability::RepositoryGetter => plugin.as_repository_getter().is_some(),
            Capability::BranchLister => plugin.as_branch_lister().is_some(),
            Capability::BranchGetter => plugin.as_branch_getter().is_some(),
            Capability::BranchCreator => plugin.as_branch_creator().is_some(),
            Capability::CommitLister => plugin.as_commit_lister().is_some(),
            Capability::CommitGetter => plugin.as_commit_getter().is_some(),
            Capability::CommitStatusCreator => plugin.as_commit_status_creator().is_some(),
            Capability::PullRequestLister => plugin.as_pull_request_lister().is_some(),
            Capability::PullRequestGetter => plugin.as_pull_request_getter().is_some(),
            Capability::PullRequestCreator => plugin.as_pull_request_creator().is_some(),
            Capability::PullRequestCommentLister => {
                plugin.as_pull_request_comment_lister().is_some()
            }
            Capability::PullRequestCommentCreator => {
                plugin.as_pull_request_comment_creator().is_some()
            }
            Capability::TagLister => plugin.as_tag_lister().is_some(),
            Capability::TagGetter => plugin.as_tag_getter().is_some(),
            Capability::FileContentGetter => plugin.as_file_content_getter().is_some(),
            Capability::FileCreator => plugin.as_file_creator().is_some(),
            Capability::ArtifactLister => plugin.as_artifact_lister().is_some(),
            Capability::ArtifactGetter => plugin.as_artifact_getter().is_some(),
            Capability::ArtifactDeleter => plugin.as_artifact_deleter().is_some(),
            Capability::TestPlanLister => plugin.as_test_plan_lister().is_some(),
            Capability::TestCaseLister => plugin.as_test_case_lister().is_some(),
            Capability::CodeQualityGetter => plugin.as_code_quality_getter().is_some(),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Capabilities implemented by `plugin`, in [`Capability::ALL`] order.
pub fn capabilities_of(plugin: &dyn Plugin) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|capability| capability.is_supported_by(plugin))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{paginate, GitBranchSpec, ObjectMeta};

    struct SmallPlugin;

    #[async_trait]
    impl BranchLister for SmallPlugin {
        async fn list_branches(
            &self,
            _ctx: &RequestContext,
            _repo: &RepositoryRef,
            options: ListOptions,
        ) -> PluginResult<GitBranchList> {
            let branch = GitBranch {
                metadata: ObjectMeta::named("main"),
                spec: GitBranchSpec {
                    name: "main".into(),
                    ..GitBranchSpec::default()
                },
            };
            Ok(paginate(vec![branch], &options))
        }
    }

    #[async_trait]
    impl TagGetter for SmallPlugin {
        async fn get_tag(
            &self,
            _ctx: &RequestContext,
            _repo: &RepositoryRef,
            tag: &TagName,
        ) -> PluginResult<GitTag> {
            Err(PluginError::not_found("tag", tag))
        }
    }

    impl Plugin for SmallPlugin {
        fn path(&self) -> &str {
            "small"
        }
        fn as_branch_lister(&self) -> Option<&dyn BranchLister> {
            Some(self)
        }
        fn as_tag_getter(&self) -> Option<&dyn TagGetter> {
            Some(self)
        }
    }

    struct Nothing;

    impl Plugin for Nothing {
        fn path(&self) -> &str {
            "nothing"
        }
    }

    #[test]
    fn capabilities_follow_the_fixed_order() {
        assert_eq!(
            capabilities_of(&SmallPlugin),
            vec![Capability::BranchLister, Capability::TagGetter]
        );
        assert!(capabilities_of(&Nothing).is_empty());
    }

    #[test]
    fn all_lists_every_capability_once() {
        let mut sorted = Capability::ALL.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), Capability::ALL.len());
        assert_eq!(Capability::ALL.to_vec(), sorted);
    }

    #[tokio::test]
    async fn accessors_dispatch_to_the_implementation() {
        let plugin: &dyn Plugin = &SmallPlugin;
        let repo = RepositoryRef::new(
            ProjectName::new("p").unwrap(),
            RepositoryName::new("r").unwrap(),
        );
        let ctx = RequestContext::default();

        let branches = plugin
            .as_branch_lister()
            .unwrap()
            .list_branches(&ctx, &repo, ListOptions::default())
            .await
            .unwrap();
        assert_eq!(branches.items[0].spec.name, "main");

        let err = plugin
            .as_tag_getter()
            .unwrap()
            .get_tag(&ctx, &repo, &TagName::new("v1").unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        assert!(plugin.setup().await.is_ok());
    }
}
