use std::time::Duration;

use envconfig::Envconfig;
use tracing::warn;

use crate::controller::ReconcilePolicy;

#[derive(Envconfig, Clone, Debug)]
pub struct OperatorConfig {
    /// Recipient of dispatched cluster requests.
    /// Env: CAPT_RECIPIENT
    #[envconfig(from = "CAPT_RECIPIENT", default = "platform-team@example.com")]
    pub recipient: String,

    /// Number of trigger workers. Each identity maps to one worker.
    /// Env: CAPT_WORKERS
    #[envconfig(from = "CAPT_WORKERS", default = "2")]
    pub workers: usize,

    /// Delay before a failed reconciliation is requeued.
    /// Env: CAPT_REQUEUE_BACKOFF_SECS
    #[envconfig(from = "CAPT_REQUEUE_BACKOFF_SECS", default = "60")]
    pub requeue_backoff_secs: u64,

    #[envconfig(from = "CAPT_STORAGE_TYPE", default = "memory")]
    pub storage_type: String,

    /// Carry expected-version preconditions on commits.
    /// Env: CAPT_OPTIMISTIC_LOCK
    #[envconfig(from = "CAPT_OPTIMISTIC_LOCK", default = "false")]
    pub optimistic_lock: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageType {
    Memory,
}

impl OperatorConfig {
    pub fn storage(&self) -> StorageType {
        match self.storage_type.to_lowercase().as_str() {
            "memory" => StorageType::Memory,
            other => {
                warn!(
                    "Unrecognized storage type '{}', falling back to 'memory'.",
                    other
                );
                StorageType::Memory
            }
        }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        ReconcilePolicy {
            optimistic_lock: self.optimistic_lock,
        }
    }

    pub fn requeue_backoff(&self) -> Duration {
        Duration::from_secs(self.requeue_backoff_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_without_env() {
        let cfg =
            OperatorConfig::init_from_hashmap(&HashMap::new()).unwrap();
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.requeue_backoff(), Duration::from_secs(60));
        assert_eq!(cfg.storage(), StorageType::Memory);
        assert!(!cfg.policy().optimistic_lock);
    }

    #[test]
    fn unknown_storage_falls_back_to_memory() {
        let mut env = HashMap::new();
        env.insert("CAPT_STORAGE_TYPE".to_string(), "etcd".to_string());
        env.insert("CAPT_OPTIMISTIC_LOCK".to_string(), "true".to_string());
        let cfg = OperatorConfig::init_from_hashmap(&env).unwrap();
        assert_eq!(cfg.storage(), StorageType::Memory);
        assert!(cfg.policy().optimistic_lock);
    }
}
