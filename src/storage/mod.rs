/// Durable local storage
///
/// A flat namespaced key-value store: one key per collection holding the full
/// serialized set, one key holding the bearer token. Supports multiple
/// backend implementations (memory, file).

pub mod codec;
pub mod file;
pub mod memory;

pub use codec::{decode_rows, encode_rows, load_collection, save_collection, Decoded};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::ClinicResult;
use crate::models::Entity;

/// Key-value backend trait
///
/// Each `set` replaces the whole value for a key atomically. There is no
/// batching or coalescing: callers write through on every mutation.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> ClinicResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> ClinicResult<()>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> ClinicResult<()>;
}

/// Namespaced key layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    namespace: String,
}

impl StorageKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Key holding the bearer token
    pub fn token(&self) -> String {
        format!("{}token", self.namespace)
    }

    /// Key holding the serialized set of one entity kind
    pub fn collection<T: Entity>(&self) -> String {
        format!("{}{}", self.namespace, T::COLLECTION)
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new("medtech-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, MedicalRecord, Patient, User};

    #[test]
    fn test_key_layout() {
        let keys = StorageKeys::default();
        assert_eq!(keys.token(), "medtech-token");
        assert_eq!(keys.collection::<Patient>(), "medtech-patients");
        assert_eq!(keys.collection::<Appointment>(), "medtech-appointments");
        assert_eq!(keys.collection::<MedicalRecord>(), "medtech-records");
        assert_eq!(keys.collection::<User>(), "medtech-users");

        let keys = StorageKeys::new("test.");
        assert_eq!(keys.token(), "test.token");
    }
}
