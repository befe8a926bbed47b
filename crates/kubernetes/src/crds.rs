//! Storage and payload custom resources.

use std::collections::BTreeMap;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{CustomResource, CustomResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the storage resources.
pub const STORAGE_GROUP: &str = "storage.katanomi.dev";

/// API group of the trigger resources.
pub const CORE_GROUP: &str = "core.katanomi.dev";

/// Condition type marking a resource as usable.
pub const CONDITION_READY: &str = "Ready";

/// A status condition, following the Kubernetes condition conventions.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    /// `True`, `False` or `Unknown`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

impl Condition {
    pub fn is_true(&self) -> bool {
        self.status == "True"
    }
}

fn is_ready(conditions: &[Condition]) -> bool {
    conditions
        .iter()
        .any(|c| c.type_ == CONDITION_READY && c.is_true())
}

/// Reference to a secret holding storage credentials.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A storage backend instance (object store, file store, ...).
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema, Default)]
#[kube(
    group = "storage.katanomi.dev",
    version = "v1alpha1",
    kind = "Storage",
    plural = "storages",
    status = "StorageStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    /// Name of the [`StoragePlugin`] serving this storage.
    pub storage_plugin_class: String,
    /// Backend specific parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<SecretRef>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Storage {
    /// Returns `true` when the `Ready` condition is `True`.
    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| is_ready(&status.conditions))
    }
}

/// Registration of a storage plugin endpoint.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema, Default)]
#[kube(
    group = "storage.katanomi.dev",
    version = "v1alpha1",
    kind = "StoragePlugin",
    plural = "storageplugins",
    namespaced,
    status = "StoragePluginStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct StoragePluginSpec {
    /// Base URL the plugin serves on.
    pub address: String,
    /// PEM bundle to verify the plugin's certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_bundle: Option<String>,
    /// Storage types the plugin handles, e.g. `s3`.
    #[serde(default)]
    pub storage_types: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoragePluginStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl StoragePlugin {
    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| is_ready(&status.conditions))
    }
}

/// Repository an event originated from.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PayloadRepository {
    pub project: String,
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Git revision an event refers to.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PayloadRevision {
    /// Full ref, e.g. `refs/heads/main` or `refs/tags/v1.0`.
    #[serde(rename = "ref")]
    pub ref_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

/// An event received from an integrated tool, kept for triggering runs.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, PartialEq, JsonSchema, Default)]
#[kube(
    group = "core.katanomi.dev",
    version = "v1alpha1",
    kind = "Payload",
    plural = "payloads",
    namespaced,
    status = "PayloadStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSpec {
    /// Event type as named by the source, e.g. `push` or `pull_request`.
    pub event: String,
    /// Path of the plugin that received the event.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<PayloadRepository>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<PayloadRevision>,
    /// Flattened event fields used by trigger filters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PayloadStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Payload {
    /// `true` once the payload has been processed successfully.
    pub fn is_ready(&self) -> bool {
        self.status
            .as_ref()
            .is_some_and(|status| is_ready(&status.conditions))
    }

    /// Short name of the revision ref, without `refs/heads/` or `refs/tags/`.
    pub fn ref_short_name(&self) -> Option<&str> {
        let ref_name = self.spec.revision.as_ref()?.ref_name.as_str();
        Some(
            ref_name
                .strip_prefix("refs/heads/")
                .or_else(|| ref_name.strip_prefix("refs/tags/"))
                .unwrap_or(ref_name),
        )
    }
}

/// Generated definitions of every CRD in this crate.
pub fn crd_definitions() -> Vec<CustomResourceDefinition> {
    vec![Storage::crd(), StoragePlugin::crd(), Payload::crd()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_carry_group_and_scope() {
        let crds = crd_definitions();
        assert_eq!(crds.len(), 3);

        let storage = &crds[0];
        assert_eq!(storage.spec.group, STORAGE_GROUP);
        assert_eq!(storage.spec.names.kind, "Storage");
        assert_eq!(storage.spec.scope, "Cluster");
        assert_eq!(storage.spec.versions[0].name, "v1alpha1");

        let plugin = &crds[1];
        assert_eq!(plugin.spec.names.plural, "storageplugins");
        assert_eq!(plugin.spec.scope, "Namespaced");

        let payload = &crds[2];
        assert_eq!(payload.spec.group, CORE_GROUP);
        assert_eq!(payload.spec.names.kind, "Payload");
        assert_eq!(payload.spec.scope, "Namespaced");
    }

    #[test]
    fn payload_round_trips_through_json() {
        let json = serde_json::json!({
            "apiVersion": "core.katanomi.dev/v1alpha1",
            "kind": "Payload",
            "metadata": {"name": "push-abc", "namespace": "ci"},
            "spec": {
                "event": "push",
                "source": "gitlab",
                "repository": {"project": "katanomi", "repository": "pkg"},
                "revision": {"ref": "refs/tags/v1.0", "commit": "abc"},
                "properties": {"author": "alice"}
            }
        });
        let payload: Payload = serde_json::from_value(json).unwrap();
        assert_eq!(payload.spec.event, "push");
        assert_eq!(payload.ref_short_name(), Some("v1.0"));
        assert_eq!(payload.spec.properties["author"], "alice");
        assert!(!payload.is_ready());

        let back = serde_json::to_value(&payload).unwrap();
        assert_eq!(back["spec"]["revision"]["ref"], "refs/tags/v1.0");
        assert_eq!(back["spec"]["repository"]["project"], "katanomi");
    }

    #[test]
    fn readiness_follows_the_ready_condition() {
        let mut storage = Storage::new(
            "minio",
            StorageSpec {
                storage_plugin_class: "s3".into(),
                ..StorageSpec::default()
            },
        );
        assert!(!storage.is_ready());

        storage.status = Some(StorageStatus {
            conditions: vec![Condition {
                type_: CONDITION_READY.into(),
                status: "False".into(),
                ..Condition::default()
            }],
        });
        assert!(!storage.is_ready());

        if let Some(status) = storage.status.as_mut() {
            status.conditions[0].status = "True".into();
        }
        assert!(storage.is_ready());
    }

    #[test]
    fn storage_serializes_with_api_version() {
        let storage = Storage::new(
            "minio",
            StorageSpec {
                storage_plugin_class: "s3".into(),
                params: BTreeMap::from([("bucket".to_string(), "ci".to_string())]),
                secret_ref: None,
            },
        );
        let json = serde_json::to_value(&storage).unwrap();
        assert_eq!(json["apiVersion"], "storage.katanomi.dev/v1alpha1");
        assert_eq!(json["kind"], "Storage");
        assert_eq!(json["spec"]["storagePluginClass"], "s3");
        assert_eq!(json["spec"]["params"]["bucket"], "ci");
    }
}
