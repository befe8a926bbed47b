//! PersistentVolumeClaim cleanup.

use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use kube::api::{DeleteParams, ListParams};
use kube::{Api, Client};
use thiserror::Error;

/// Attempts made to delete one claim before giving up.
pub const DELETE_ATTEMPTS: u32 = 3;

/// Pause between delete attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum PvcError {
    #[error("persistentvolumeclaim {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    #[error("kubernetes api error: {0}")]
    Kube(#[from] kube::Error),
}

/// Access to the PersistentVolumeClaims of a cluster.
#[async_trait]
pub trait PvcClient: Send + Sync {
    /// Names of the claims in `namespace` matching the label `selector`.
    async fn list(&self, namespace: &str, selector: &str) -> Result<Vec<String>, PvcError>;

    /// Deletes one claim. A missing claim is reported as [`PvcError::NotFound`].
    async fn delete(&self, namespace: &str, name: &str) -> Result<(), PvcError>;
}

/// [`PvcClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubePvcClient {
    client: Client,
}

impl KubePvcClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<PersistentVolumeClaim> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl PvcClient for KubePvcClient {
    async fn list(&self, namespace: &str, selector: &str) -> Result<Vec<String>, PvcError> {
        let claims = self
            .api(namespace)
            .list(&ListParams::default().labels(selector))
            .await?;
        Ok(claims
            .items
            .into_iter()
            .filter_map(|pvc| pvc.metadata.name)
            .collect())
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<(), PvcError> {
        match self.api(namespace).delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(response)) if response.code == 404 => Err(PvcError::NotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Outcome of [`cleanup_pvcs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Claims deleted, or already gone.
    pub deleted: Vec<String>,
    /// Claims still present after every attempt, with the last error.
    pub failed: Vec<(String, String)>,
}

impl CleanupReport {
    /// Returns `true` when no claim failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes every claim in `namespace` matching `selector`.
///
/// Each delete is tried up to [`DELETE_ATTEMPTS`] times. A claim that is
/// already gone counts as deleted. Only a failure to list the claims is
/// returned as an error; per-claim failures are collected in the report.
#[tracing::instrument(skip(client))]
pub async fn cleanup_pvcs(
    client: &dyn PvcClient,
    namespace: &str,
    selector: &str,
) -> Result<CleanupReport, PvcError> {
    let names = client.list(namespace, selector).await?;
    tracing::debug!(count = names.len(), "found claims to clean up");

    let mut report = CleanupReport::default();
    for name in names {
        match delete_with_retry(client, namespace, &name).await {
            Ok(()) => report.deleted.push(name),
            Err(e) => {
                tracing::warn!(pvc = %name, error = %e, "failed to delete claim");
                report.failed.push((name, e.to_string()));
            }
        }
    }

    tracing::info!(
        deleted = report.deleted.len(),
        failed = report.failed.len(),
        "pvc cleanup finished"
    );
    Ok(report)
}

async fn delete_with_retry(
    client: &dyn PvcClient,
    namespace: &str,
    name: &str,
) -> Result<(), PvcError> {
    let mut attempt = 1;
    loop {
        match client.delete(namespace, name).await {
            Ok(()) | Err(PvcError::NotFound { .. }) => return Ok(()),
            Err(e) if attempt >= DELETE_ATTEMPTS => return Err(e),
            Err(e) => {
                tracing::debug!(pvc = %name, attempt, error = %e, "retrying claim delete");
                attempt += 1;
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Fails each claim's delete a configured number of times.
    struct FakePvcs {
        names: Vec<String>,
        failures: Mutex<HashMap<String, u32>>,
        missing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FakePvcs {
        fn new(names: &[&str]) -> Self {
            Self {
                names: names.iter().map(|n| n.to_string()).collect(),
                failures: Mutex::new(HashMap::new()),
                missing: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(self, name: &str, times: u32) -> Self {
            self.failures.lock().unwrap().insert(name.to_string(), times);
            self
        }

        fn calls_for(&self, name: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
        }
    }

    #[async_trait]
    impl PvcClient for FakePvcs {
        async fn list(&self, _namespace: &str, selector: &str) -> Result<Vec<String>, PvcError> {
            assert_eq!(selector, "katanomi.dev/owner=run-1");
            Ok(self.names.clone())
        }

        async fn delete(&self, namespace: &str, name: &str) -> Result<(), PvcError> {
            self.calls.lock().unwrap().push(name.to_string());
            if self.missing.iter().any(|m| m == name) {
                return Err(PvcError::NotFound {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                });
            }
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(name) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    Err(PvcError::Kube(kube::Error::Api(kube::core::ErrorResponse {
                        status: "Failure".into(),
                        message: "etcd leader changed".into(),
                        reason: "InternalError".into(),
                        code: 500,
                    })))
                }
                _ => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn deletes_every_matching_claim() {
        let pvcs = FakePvcs::new(&["ws-a", "ws-b"]);
        let report = cleanup_pvcs(&pvcs, "ci", "katanomi.dev/owner=run-1")
            .await
            .unwrap();
        assert_eq!(report.deleted, vec!["ws-a", "ws-b"]);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let pvcs = FakePvcs::new(&["ws-a"]).failing("ws-a", 2);
        let report = cleanup_pvcs(&pvcs, "ci", "katanomi.dev/owner=run-1")
            .await
            .unwrap();
        assert_eq!(report.deleted, vec!["ws-a"]);
        assert_eq!(pvcs.calls_for("ws-a"), 3);
    }

    #[tokio::test]
    async fn gives_up_after_three_attempts() {
        let pvcs = FakePvcs::new(&["ws-a", "ws-b"]).failing("ws-a", 10);
        let report = cleanup_pvcs(&pvcs, "ci", "katanomi.dev/owner=run-1")
            .await
            .unwrap();
        assert_eq!(pvcs.calls_for("ws-a"), DELETE_ATTEMPTS as usize);
        assert_eq!(report.deleted, vec!["ws-b"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "ws-a");
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn missing_claims_count_as_deleted() {
        let mut pvcs = FakePvcs::new(&["ws-gone"]);
        pvcs.missing.push("ws-gone".to_string());
        let report = cleanup_pvcs(&pvcs, "ci", "katanomi.dev/owner=run-1")
            .await
            .unwrap();
        assert_eq!(report.deleted, vec!["ws-gone"]);
        assert_eq!(pvcs.calls_for("ws-gone"), 1);
    }
}
