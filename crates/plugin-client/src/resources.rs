//! Resource sub-clients.
//!
//! Paths mirror the plugin route table: `projects/{project}/coderepositories/
//! {repository}/...` for git resources, `projects/{project}/repositories/
//! {repository}/artifacts` for registries and `projects/{project}/testplans`
//! for test management.

use apis::{
    Artifact, ArtifactList, ArtifactName, AuthCheck, AuthCheckOptions, BranchName, CodeQuality,
    CodeQualityOptions, CommitSha, CreateBranchPayload, CreateCommentPayload,
    CreateCommitStatusPayload, CreateFilePayload, CreateProjectPayload, CreatePullRequestPayload,
    FileContent, FileOptions, GitBranch, GitBranchList, GitCommit, GitCommitList,
    GitCommitStatus, GitPullRequest, GitPullRequestList, GitRepository, GitRepositoryList, GitTag,
    GitTagList, ListOptions, Project, ProjectList, ProjectName, PullRequestComment,
    PullRequestCommentList, PullRequestNumber, RepositoryName, RepositoryRef, TagName,
    TestCaseList, TestPlanId, TestPlanList,
};

use crate::client::ScopedClient;
use crate::error::ClientResult;

const NO_QUERY: Option<&()> = None;

impl ScopedClient {
    /// Credential checks.
    pub fn auth(&self) -> AuthClient<'_> {
        AuthClient { scoped: self }
    }

    /// Projects of the integrated tool.
    pub fn projects(&self) -> ProjectsClient<'_> {
        ProjectsClient { scoped: self }
    }

    /// Code repositories of `project`.
    pub fn repositories(&self, project: &ProjectName) -> RepositoriesClient<'_> {
        RepositoriesClient {
            scoped: self,
            project: project.clone(),
        }
    }

    /// Branches of `repo`.
    pub fn branches(&self, repo: &RepositoryRef) -> BranchesClient<'_> {
        BranchesClient {
            scoped: self,
            repo: repo.clone(),
        }
    }

    /// Commits of `repo`.
    pub fn commits(&self, repo: &RepositoryRef) -> CommitsClient<'_> {
        CommitsClient {
            scoped: self,
            repo: repo.clone(),
        }
    }

    /// Pull requests of `repo`.
    pub fn pull_requests(&self, repo: &RepositoryRef) -> PullRequestsClient<'_> {
        PullRequestsClient {
            scoped: self,
            repo: repo.clone(),
        }
    }

    /// Tags of `repo`.
    pub fn tags(&self, repo: &RepositoryRef) -> TagsClient<'_> {
        TagsClient {
            scoped: self,
            repo: repo.clone(),
        }
    }

    /// File contents of `repo`.
    pub fn files(&self, repo: &RepositoryRef) -> FilesClient<'_> {
        FilesClient {
            scoped: self,
            repo: repo.clone(),
        }
    }

    /// Artifacts of a registry repository.
    pub fn artifacts(
        &self,
        project: &ProjectName,
        repository: &RepositoryName,
    ) -> ArtifactsClient<'_> {
        ArtifactsClient {
            scoped: self,
            project: project.clone(),
            repository: repository.clone(),
        }
    }

    /// Test plans of `project`.
    pub fn test_plans(&self, project: &ProjectName) -> TestPlansClient<'_> {
        TestPlansClient {
            scoped: self,
            project: project.clone(),
        }
    }

    /// Code quality reports of `repo`.
    pub fn code_quality(&self, repo: &RepositoryRef) -> CodeQualityClient<'_> {
        CodeQualityClient {
            scoped: self,
            repo: repo.clone(),
        }
    }
}

/// `projects/{project}/coderepositories/{repository}` followed by `rest`.
fn repo_path<'a>(repo: &'a RepositoryRef, rest: &[&'a str]) -> Vec<&'a str> {
    let mut segments = vec![
        "projects",
        repo.project.as_str(),
        "coderepositories",
        repo.repository.as_str(),
    ];
    segments.extend_from_slice(rest);
    segments
}

// ---------------------------------------------------------------------------
// Auth and projects
// ---------------------------------------------------------------------------

/// Calls `POST authCheck`.
#[derive(Debug, Clone, Copy)]
pub struct AuthClient<'a> {
    scoped: &'a ScopedClient,
}

impl AuthClient<'_> {
    /// Checks the scoped credentials against the integrated tool.
    pub async fn check(&self, options: &AuthCheckOptions) -> ClientResult<AuthCheck> {
        self.scoped.post(&["authCheck"], options).await
    }
}

/// Calls the `projects` routes.
#[derive(Debug, Clone, Copy)]
pub struct ProjectsClient<'a> {
    scoped: &'a ScopedClient,
}

impl ProjectsClient<'_> {
    /// One page of projects.
    pub async fn list(&self, options: &ListOptions) -> ClientResult<ProjectList> {
        self.scoped.get(&["projects"], Some(options)).await
    }

    /// Creates a project.
    pub async fn create(&self, payload: &CreateProjectPayload) -> ClientResult<Project> {
        self.scoped.post(&["projects"], payload).await
    }

    /// One project.
    pub async fn get(&self, project: &ProjectName) -> ClientResult<Project> {
        self.scoped
            .get(&["projects", project.as_str()], NO_QUERY)
            .await
    }
}

/// Calls the `coderepositories` routes of one project.
#[derive(Debug, Clone)]
pub struct RepositoriesClient<'a> {
    scoped: &'a ScopedClient,
    project: ProjectName,
}

impl RepositoriesClient<'_> {
    /// One page of repositories.
    pub async fn list(&self, options: &ListOptions) -> ClientResult<GitRepositoryList> {
        self.scoped
            .get(
                &["projects", self.project.as_str(), "coderepositories"],
                Some(options),
            )
            .await
    }

    /// One repository.
    pub async fn get(&self, repository: &RepositoryName) -> ClientResult<GitRepository> {
        self.scoped
            .get(
                &[
                    "projects",
                    self.project.as_str(),
                    "coderepositories",
                    repository.as_str(),
                ],
                NO_QUERY,
            )
            .await
    }
}

// ---------------------------------------------------------------------------
// Git resources
// ---------------------------------------------------------------------------

/// Calls the `branches` routes of one repository.
#[derive(Debug, Clone)]
pub struct BranchesClient<'a> {
    scoped: &'a ScopedClient,
    repo: RepositoryRef,
}

impl BranchesClient<'_> {
    /// One page of branches.
    pub async fn list(&self, options: &ListOptions) -> ClientResult<GitBranchList> {
        self.scoped
            .get(&repo_path(&self.repo, &["branches"]), Some(options))
            .await
    }

    /// One branch.
    pub async fn get(&self, branch: &BranchName) -> ClientResult<GitBranch> {
        self.scoped
            .get(
                &repo_path(&self.repo, &["branches", branch.as_str()]),
                NO_QUERY,
            )
            .await
    }

    /// Creates a branch.
    pub async fn create(&self, payload: &CreateBranchPayload) -> ClientResult<GitBranch> {
        self.scoped
            .post(&repo_path(&self.repo, &["branches"]), payload)
            .await
    }
}

/// Calls the `commits` routes of one repository.
#[derive(Debug, Clone)]
pub struct CommitsClient<'a> {
    scoped: &'a ScopedClient,
    repo: RepositoryRef,
}

impl CommitsClient<'_> {
    /// One page of commits.
    pub async fn list(&self, options: &ListOptions) -> ClientResult<GitCommitList> {
        self.scoped
            .get(&repo_path(&self.repo, &["commits"]), Some(options))
            .await
    }

    /// One commit.
    pub async fn get(&self, sha: &CommitSha) -> ClientResult<GitCommit> {
        self.scoped
            .get(&repo_path(&self.repo, &["commits", sha.as_str()]), NO_QUERY)
            .await
    }

    /// Reports a CI status on commit `sha`.
    pub async fn create_status(
        &self,
        sha: &CommitSha,
        payload: &CreateCommitStatusPayload,
    ) -> ClientResult<GitCommitStatus> {
        self.scoped
            .post(
                &repo_path(&self.repo, &["commits", sha.as_str(), "statuses"]),
                payload,
            )
            .await
    }
}

/// Calls the `pulls` routes of one repository.
#[derive(Debug, Clone)]
pub struct PullRequestsClient<'a> {
    scoped: &'a ScopedClient,
    repo: RepositoryRef,
}

impl PullRequestsClient<'_> {
    /// One page of pull requests.
    pub async fn list(&self, options: &ListOptions) -> ClientResult<GitPullRequestList> {
        self.scoped
            .get(&repo_path(&self.repo, &["pulls"]), Some(options))
            .await
    }

    /// One pull request.
    pub async fn get(&self, number: PullRequestNumber) -> ClientResult<GitPullRequest> {
        let number = number.to_string();
        self.scoped
            .get(&repo_path(&self.repo, &["pulls", number.as_str()]), NO_QUERY)
            .await
    }

    /// Creates a pull request.
    pub async fn create(&self, payload: &CreatePullRequestPayload) -> ClientResult<GitPullRequest> {
        self.scoped
            .post(&repo_path(&self.repo, &["pulls"]), payload)
            .await
    }

    /// One page of comments on a pull request.
    pub async fn list_comments(
        &self,
        number: PullRequestNumber,
        options: &ListOptions,
    ) -> ClientResult<PullRequestCommentList> {
        let number = number.to_string();
        self.scoped
            .get(
                &repo_path(&self.repo, &["pulls", number.as_str(), "comments"]),
                Some(options),
            )
            .await
    }

    /// Comments on a pull request.
    pub async fn create_comment(
        &self,
        number: PullRequestNumber,
        payload: &CreateCommentPayload,
    ) -> ClientResult<PullRequestComment> {
        let number = number.to_string();
        self.scoped
            .post(
                &repo_path(&self.repo, &["pulls", number.as_str(), "comments"]),
                payload,
            )
            .await
    }
}

/// Calls the `tags` routes of one repository.
#[derive(Debug, Clone)]
pub struct TagsClient<'a> {
    scoped: &'a ScopedClient,
    repo: RepositoryRef,
}

impl TagsClient<'_> {
    /// One page of tags.
    pub async fn list(&self, options: &ListOptions) -> ClientResult<GitTagList> {
        self.scoped
            .get(&repo_path(&self.repo, &["tags"]), Some(options))
            .await
    }

    /// One tag.
    pub async fn get(&self, tag: &TagName) -> ClientResult<GitTag> {
        self.scoped
            .get(&repo_path(&self.repo, &["tags", tag.as_str()]), NO_QUERY)
            .await
    }
}

/// Calls the `content` routes of one repository.
#[derive(Debug, Clone)]
pub struct FilesClient<'a> {
    scoped: &'a ScopedClient,
    repo: RepositoryRef,
}

impl FilesClient<'_> {
    /// Reads one file; `options.path` is sent as a query parameter.
    pub async fn get(&self, options: &FileOptions) -> ClientResult<FileContent> {
        self.scoped
            .get(&repo_path(&self.repo, &["content"]), Some(options))
            .await
    }

    /// Commits a new file.
    pub async fn create(&self, payload: &CreateFilePayload) -> ClientResult<FileContent> {
        self.scoped
            .post(&repo_path(&self.repo, &["content"]), payload)
            .await
    }
}

// ---------------------------------------------------------------------------
// Registries, test management, code quality
// ---------------------------------------------------------------------------

/// Calls the `artifacts` routes of one registry repository.
#[derive(Debug, Clone)]
pub struct ArtifactsClient<'a> {
    scoped: &'a ScopedClient,
    project: ProjectName,
    repository: RepositoryName,
}

impl ArtifactsClient<'_> {
    fn path<'a>(&'a self, artifact: Option<&'a ArtifactName>) -> Vec<&'a str> {
        let mut segments = vec![
            "projects",
            self.project.as_str(),
            "repositories",
            self.repository.as_str(),
            "artifacts",
        ];
        segments.extend(artifact.map(ArtifactName::as_str));
        segments
    }

    /// One page of artifacts.
    pub async fn list(&self, options: &ListOptions) -> ClientResult<ArtifactList> {
        self.scoped.get(&self.path(None), Some(options)).await
    }

    /// One artifact.
    pub async fn get(&self, artifact: &ArtifactName) -> ClientResult<Artifact> {
        self.scoped.get(&self.path(Some(artifact)), NO_QUERY).await
    }

    /// Deletes an artifact.
    pub async fn delete(&self, artifact: &ArtifactName) -> ClientResult<()> {
        self.scoped.delete(&self.path(Some(artifact))).await
    }
}

/// Calls the `testplans` routes of one project.
#[derive(Debug, Clone)]
pub struct TestPlansClient<'a> {
    scoped: &'a ScopedClient,
    project: ProjectName,
}

impl TestPlansClient<'_> {
    /// One page of test plans.
    pub async fn list(&self, options: &ListOptions) -> ClientResult<TestPlanList> {
        self.scoped
            .get(
                &["projects", self.project.as_str(), "testplans"],
                Some(options),
            )
            .await
    }

    /// Test cases of one plan.
    pub async fn list_cases(
        &self,
        plan: &TestPlanId,
        options: &ListOptions,
    ) -> ClientResult<TestCaseList> {
        self.scoped
            .get(
                &[
                    "projects",
                    self.project.as_str(),
                    "testplans",
                    plan.as_str(),
                    "testcases",
                ],
                Some(options),
            )
            .await
    }
}

/// Calls the `codequality` route of one repository.
#[derive(Debug, Clone)]
pub struct CodeQualityClient<'a> {
    scoped: &'a ScopedClient,
    repo: RepositoryRef,
}

impl CodeQualityClient<'_> {
    /// The code quality report.
    pub async fn get(&self, options: &CodeQualityOptions) -> ClientResult<CodeQuality> {
        self.scoped
            .get(&repo_path(&self.repo, &["codequality"]), Some(options))
            .await
    }
}
