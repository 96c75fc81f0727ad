/// Entity collections
///
/// Each collection owns one homogeneous set of rows and persists it through a
/// pluggable backing: the local durable key-value store, or the remote REST
/// API for users.
///
/// Write policy is last-write-wins. Every write is persisted first and only
/// then published to readers, so a failed persistence call leaves the
/// in-memory set exactly as it was.

pub mod collection;
pub mod local;
pub mod remote;

pub use collection::EntityCollection;
pub use local::LocalBacking;
pub use remote::{BearerSource, RemoteUserBacking};

use crate::{
    error::ClinicResult,
    models::{Appointment, Entity, MedicalRecord, Patient, User},
};
use async_trait::async_trait;

pub type UserCollection = EntityCollection<User>;
pub type PatientCollection = EntityCollection<Patient>;
pub type AppointmentCollection = EntityCollection<Appointment>;
pub type RecordCollection = EntityCollection<MedicalRecord>;

/// Result of a persisted create or update
#[derive(Debug, Clone)]
pub struct Change<T> {
    /// The row as persisted
    pub row: T,
    /// The full set after the change
    pub rows: Vec<T>,
}

/// Persistence medium behind a collection
///
/// Implementations receive the current set and return the set that should
/// replace it once persistence has succeeded. They never touch the
/// collection's in-memory state themselves.
#[async_trait]
pub trait Backing<T: Entity>: Send + Sync {
    /// Fetch the full set from the medium
    async fn load(&self) -> ClinicResult<Vec<T>>;

    /// Persist a new row built from `draft`
    async fn insert(&self, current: &[T], draft: T::Draft) -> ClinicResult<Change<T>>;

    /// Persist a patch; `None` when no row has this id
    async fn update(&self, current: &[T], id: &str, patch: &T::Patch)
        -> ClinicResult<Option<Change<T>>>;

    /// Persist a removal; `None` when no row has this id
    async fn remove(&self, current: &[T], id: &str) -> ClinicResult<Option<Vec<T>>>;

    /// Whether the medium is a remote API
    fn is_remote(&self) -> bool;
}

/// Copy of `current` with the row `id` replaced by `row`
pub(crate) fn replace_row<T: Entity>(current: &[T], id: &str, row: &T) -> Vec<T> {
    current
        .iter()
        .map(|existing| {
            if existing.id() == id {
                row.clone()
            } else {
                existing.clone()
            }
        })
        .collect()
}

/// Copy of `current` without the row `id`
pub(crate) fn without_row<T: Entity>(current: &[T], id: &str) -> Vec<T> {
    current
        .iter()
        .filter(|existing| existing.id() != id)
        .cloned()
        .collect()
}
