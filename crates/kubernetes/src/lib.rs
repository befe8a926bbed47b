//! Kubernetes helpers shared by Katanomi components.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`crds`] | `Storage`, `StoragePlugin` and `Payload` custom resources |
//! | [`pvc`] | PersistentVolumeClaim cleanup with retries |
//! | [`impersonation`] | Impersonation headers and impersonated client configs |

pub mod crds;
pub mod impersonation;
pub mod pvc;

pub use crds::{
    crd_definitions, Condition, Payload, PayloadRepository, PayloadRevision, PayloadSpec,
    PayloadStatus, SecretRef, Storage, StoragePlugin, StoragePluginSpec, StoragePluginStatus,
    StorageSpec, StorageStatus, CONDITION_READY, CORE_GROUP, STORAGE_GROUP,
};
pub use impersonation::{bearer_token, impersonated_config, UserInfo};
pub use pvc::{cleanup_pvcs, CleanupReport, KubePvcClient, PvcClient, PvcError, DELETE_ATTEMPTS};
