//! Resource data containers exchanged between plugins and their callers.
//!
//! The shapes follow Kubernetes API conventions: every resource has a
//! `metadata` block and a `spec`, lists carry a `metadata` block with the
//! total item count, and JSON keys are camelCase. These are plain data; no
//! resource carries lifecycle logic of its own.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BranchName, CommentId, CommitSha, ProjectName};

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; serialised as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Object and list metadata
// ---------------------------------------------------------------------------

/// Identity and bookkeeping fields common to every resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name, unique within its scope.
    pub name: String,

    /// Scope of the resource (project, repository), when meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Free-form labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    /// Free-form annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,

    /// Creation time reported by the integrated tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<Timestamp>,
}

impl ObjectMeta {
    /// Metadata carrying only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Metadata of a list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    /// Number of items across all pages.
    pub total_items: u64,
}

/// A page of resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceList<T> {
    /// Pagination metadata.
    #[serde(default)]
    pub metadata: ListMeta,
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> ResourceList<T> {
    /// A list whose total equals the number of items given.
    pub fn from_items(items: Vec<T>) -> Self {
        Self {
            metadata: ListMeta {
                total_items: items.len() as u64,
            },
            items,
        }
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for ResourceList<T> {
    fn default() -> Self {
        Self {
            metadata: ListMeta::default(),
            items: Vec::new(),
        }
    }
}

/// Account of a user in the integrated tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Login name.
    pub name: String,
    /// E-mail address, when visible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// Auth check
// ---------------------------------------------------------------------------

/// Options for an auth check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheckOptions {
    /// Where an OAuth2 flow should return to, if one is started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

/// Result of verifying credentials against the integrated tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheck {
    /// Whether the credentials are accepted.
    pub allowed: bool,
    /// Human-readable explanation, typically set when not allowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// OAuth2 authorisation URL to visit when a flow must be started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorize_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// Kind of project container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectType {
    /// A group or organisation.
    #[default]
    Group,
    /// A personal namespace.
    User,
    /// A project of a non-git tool (registry, test tool, ...).
    Project,
}

/// Project visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    /// Visible to everyone.
    Public,
    /// Visible to members only.
    #[default]
    Private,
    /// Visible to authenticated users.
    Internal,
}

/// Project specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSpec {
    /// Project container kind.
    #[serde(rename = "type", default)]
    pub project_type: ProjectType,
    /// Visibility.
    #[serde(default)]
    pub visibility: Visibility,
    /// Web URL of the project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

/// A project (group, namespace or organisation) in the integrated tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: ProjectSpec,
}

/// Payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectPayload {
    /// Name of the new project.
    pub name: ProjectName,
    /// Visibility of the new project.
    #[serde(default)]
    pub visibility: Visibility,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Code repositories
// ---------------------------------------------------------------------------

/// Code repository specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitRepositorySpec {
    /// Owning project.
    pub project: String,
    /// Repository name within the project.
    pub repository: String,
    /// HTTP(S) clone URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_url: Option<String>,
    /// SSH clone URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_url: Option<String>,
    /// Default branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    /// Visibility.
    #[serde(default)]
    pub visibility: Visibility,
}

/// A code repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepository {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: GitRepositorySpec,
}

// ---------------------------------------------------------------------------
// Branches
// ---------------------------------------------------------------------------

/// Short reference to a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRef {
    /// Commit SHA.
    pub sha: String,
    /// Commit message, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Branch specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitBranchSpec {
    /// Branch name.
    pub name: String,
    /// Whether the branch is protected.
    #[serde(default)]
    pub protected: bool,
    /// Whether this is the default branch.
    #[serde(default)]
    pub default: bool,
    /// Head commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitRef>,
}

/// A git branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitBranch {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: GitBranchSpec,
}

/// Payload for creating a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchPayload {
    /// Name of the new branch.
    pub branch: BranchName,
    /// Branch, tag or SHA the new branch starts from.
    #[serde(rename = "ref")]
    pub from_ref: String,
}

// ---------------------------------------------------------------------------
// Commits
// ---------------------------------------------------------------------------

/// Commit specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitSpec {
    /// Commit SHA.
    pub sha: String,
    /// Full commit message.
    #[serde(default)]
    pub message: String,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserInfo>,
    /// Commit time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<Timestamp>,
    /// Web URL of the commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

/// A git commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitCommit {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: GitCommitSpec,
}

/// State of a commit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommitStatusState {
    /// Check has not started yet.
    Pending,
    /// Check is running.
    Running,
    /// Check passed.
    Success,
    /// Check failed.
    Failed,
    /// Check was cancelled.
    Canceled,
}

/// Payload for attaching a status to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommitStatusPayload {
    /// State to report.
    pub state: CommitStatusState,
    /// Name distinguishing this status from others on the same commit.
    pub context: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link to details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

/// A status attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitCommitStatus {
    /// Commit the status belongs to.
    pub sha: CommitSha,
    /// Reported state.
    pub state: CommitStatusState,
    /// Status context name.
    pub context: String,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link to details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Pull requests
// ---------------------------------------------------------------------------

/// Pull request state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PullRequestState {
    /// Open for review.
    #[default]
    Open,
    /// Closed without merging.
    Closed,
    /// Merged.
    Merged,
}

/// Source or target of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestBranch {
    /// Repository holding the branch (may differ from the target for forks).
    pub repository: String,
    /// Branch name.
    pub branch: String,
}

/// Pull request specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitPullRequestSpec {
    /// Number within the target repository.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// State.
    #[serde(default)]
    pub state: PullRequestState,
    /// Source branch.
    pub source: PullRequestBranch,
    /// Target branch.
    pub target: PullRequestBranch,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserInfo>,
    /// Web URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,
}

/// A pull (merge) request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitPullRequest {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: GitPullRequestSpec,
}

/// Payload for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePullRequestPayload {
    /// Title.
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Branch with the changes.
    pub source_branch: BranchName,
    /// Branch to merge into.
    pub target_branch: BranchName,
}

/// A comment on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestComment {
    /// Comment identifier.
    pub id: CommentId,
    /// Markdown body.
    pub body: String,
    /// Author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<UserInfo>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

/// Payload for commenting on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommentPayload {
    /// Markdown body.
    pub body: String,
}

// ---------------------------------------------------------------------------
// Tags and files
// ---------------------------------------------------------------------------

/// Tag specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitTagSpec {
    /// Tag name.
    pub name: String,
    /// Tagged commit.
    pub sha: String,
    /// Annotation message, for annotated tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A git tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitTag {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: GitTagSpec,
}

/// Content of a file at a given revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContent {
    /// Path relative to the repository root.
    pub path: String,
    /// Revision the content was read at.
    #[serde(rename = "ref")]
    pub revision: String,
    /// Base64 encoded content.
    pub content: String,
    /// Size in bytes of the decoded content.
    #[serde(default)]
    pub size: u64,
}

/// Payload for committing a new file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFilePayload {
    /// Path relative to the repository root.
    pub path: String,
    /// Branch to commit to.
    pub branch: BranchName,
    /// Commit message.
    pub message: String,
    /// Base64 encoded content.
    pub content: String,
}

// ---------------------------------------------------------------------------
// Artifacts
// ---------------------------------------------------------------------------

/// Kind of artifact stored in a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArtifactType {
    /// OCI container image.
    #[default]
    ContainerImage,
    /// Helm chart.
    HelmChart,
    /// Generic package or file.
    Package,
}

/// Artifact specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSpec {
    /// Artifact kind.
    #[serde(rename = "type", default)]
    pub artifact_type: ArtifactType,
    /// Content digest, e.g. `sha256:…`.
    pub digest: String,
    /// Tags pointing at this artifact.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Push time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<Timestamp>,
}

/// An artifact in a registry repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: ArtifactSpec,
}

// ---------------------------------------------------------------------------
// Test management
// ---------------------------------------------------------------------------

/// Test plan specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPlanSpec {
    /// Display name.
    pub name: String,
    /// Free-form status reported by the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Build or version under test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

/// A test plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlan {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: TestPlanSpec,
}

/// Test case specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseSpec {
    /// Plan this case belongs to.
    pub plan: String,
    /// Display name.
    pub name: String,
    /// Priority label reported by the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

/// A test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: TestCaseSpec,
}

// ---------------------------------------------------------------------------
// Code quality
// ---------------------------------------------------------------------------

/// Outcome of a quality gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityGateStatus {
    /// Gate passed.
    Passed,
    /// Gate failed.
    Failed,
    /// No analysis available.
    #[default]
    None,
}

/// Code quality specification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeQualitySpec {
    /// Branch the analysis ran on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    /// Quality gate outcome.
    #[serde(default)]
    pub status: QualityGateStatus,
    /// Metric values keyed by metric name (coverage, bugs, ...).
    #[serde(default)]
    pub metrics: BTreeMap<String, String>,
}

/// Code quality summary of a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeQuality {
    /// Metadata.
    pub metadata: ObjectMeta,
    /// Specification.
    pub spec: CodeQualitySpec,
}

// ---------------------------------------------------------------------------
// List aliases
// ---------------------------------------------------------------------------

/// A page of projects.
pub type ProjectList = ResourceList<Project>;
/// A page of code repositories.
pub type GitRepositoryList = ResourceList<GitRepository>;
/// A page of branches.
pub type GitBranchList = ResourceList<GitBranch>;
/// A page of commits.
pub type GitCommitList = ResourceList<GitCommit>;
/// A page of pull requests.
pub type GitPullRequestList = ResourceList<GitPullRequest>;
/// A page of pull request comments.
pub type PullRequestCommentList = ResourceList<PullRequestComment>;
/// A page of tags.
pub type GitTagList = ResourceList<GitTag>;
/// A page of artifacts.
pub type ArtifactList = ResourceList<Artifact>;
/// A page of test plans.
pub type TestPlanList = ResourceList<TestPlan>;
/// A page of test cases.
pub type TestCaseList = ResourceList<TestCase>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resources_use_camel_case_keys() {
        let branch = GitBranch {
            metadata: ObjectMeta::named("main"),
            spec: GitBranchSpec {
                name: "main".into(),
                protected: true,
                default: true,
                commit: Some(CommitRef {
                    sha: "abc".into(),
                    message: None,
                }),
            },
        };
        let json = serde_json::to_value(&branch).unwrap();
        assert_eq!(json["metadata"]["name"], "main");
        assert_eq!(json["spec"]["commit"]["sha"], "abc");
        assert!(json["metadata"].get("creationTimestamp").is_none());
    }

    #[test]
    fn lists_tolerate_missing_fields() {
        let list: GitTagList = serde_json::from_str("{}").unwrap();
        assert!(list.is_empty());
        assert_eq!(list.metadata.total_items, 0);

        let list: ProjectList =
            serde_json::from_str(r#"{"metadata":{"totalItems":3},"items":[]}"#).unwrap();
        assert_eq!(list.metadata.total_items, 3);
    }

    #[test]
    fn payload_field_names_match_the_wire_format() {
        let payload = CreateBranchPayload {
            branch: BranchName::new("feature").unwrap(),
            from_ref: "main".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"branch": "feature", "ref": "main"}));

        let project = Project::default();
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["spec"]["type"], "group");
        assert_eq!(json["spec"]["visibility"], "private");
    }

    #[test]
    fn timestamps_serialize_as_rfc3339() {
        let ts: Timestamp = serde_json::from_str("\"2024-05-01T10:00:00Z\"").unwrap();
        assert_eq!(ts.to_string(), "2024-05-01T10:00:00+00:00");
    }
}
