/// Generic entity collection
use crate::{
    error::ClinicResult,
    models::{Appointment, Entity, MedicalRecord, Patient, Role, User},
    store::Backing,
};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Owner of one homogeneous set of rows
///
/// Reads are lock-free snapshots. Writes (create, update, delete, refresh)
/// are serialized by a per-collection mutex, persisted through the backing,
/// and only then published.
pub struct EntityCollection<T: Entity> {
    backing: Arc<dyn Backing<T>>,
    rows: watch::Sender<Arc<Vec<T>>>,
    write_lock: Mutex<()>,
}

impl<T: Entity> EntityCollection<T> {
    /// Create an empty collection over `backing`
    pub fn new(backing: Arc<dyn Backing<T>>) -> Self {
        let (rows, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            backing,
            rows,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a collection and load local rows immediately
    ///
    /// Remote collections start empty and are filled by `refresh`.
    pub async fn open(backing: Arc<dyn Backing<T>>) -> ClinicResult<Self> {
        let collection = Self::new(backing);
        if !collection.backing.is_remote() {
            collection.refresh().await?;
        }
        Ok(collection)
    }

    pub fn is_remote(&self) -> bool {
        self.backing.is_remote()
    }

    /// Current rows as a read-only snapshot
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        self.rows.borrow().clone()
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<T>>> {
        self.rows.subscribe()
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.rows.borrow().iter().find(|row| row.id() == id).cloned()
    }

    /// Rows matching `predicate`, in insertion order
    pub fn query<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .borrow()
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    /// Create a row with a fresh id and timestamp
    pub async fn create(&self, draft: T::Draft) -> ClinicResult<T> {
        let _guard = self.write_lock.lock().await;
        let current = self.snapshot();

        let change = self.backing.insert(&current, draft).await.map_err(|e| {
            warn!("Failed to create {} row: {}", T::COLLECTION, e);
            e
        })?;

        debug!("Created {} row {}", T::COLLECTION, change.row.id());
        self.rows.send_replace(Arc::new(change.rows));

        Ok(change.row)
    }

    /// Merge `patch` into the row `id`
    ///
    /// Returns `Ok(None)` without persisting when no row has this id.
    pub async fn update(&self, id: &str, patch: &T::Patch) -> ClinicResult<Option<T>> {
        let _guard = self.write_lock.lock().await;
        let current = self.snapshot();

        let change = self.backing.update(&current, id, patch).await.map_err(|e| {
            warn!("Failed to update {} row {}: {}", T::COLLECTION, id, e);
            e
        })?;

        let Some(change) = change else {
            debug!("Update of missing {} row {} ignored", T::COLLECTION, id);
            return Ok(None);
        };

        debug!("Updated {} row {}", T::COLLECTION, id);
        self.rows.send_replace(Arc::new(change.rows));

        Ok(Some(change.row))
    }

    /// Remove the row `id`; returns whether a row was removed
    pub async fn delete(&self, id: &str) -> ClinicResult<bool> {
        let _guard = self.write_lock.lock().await;
        let current = self.snapshot();

        let remaining = self.backing.remove(&current, id).await.map_err(|e| {
            warn!("Failed to delete {} row {}: {}", T::COLLECTION, id, e);
            e
        })?;

        let Some(remaining) = remaining else {
            debug!("Delete of missing {} row {} ignored", T::COLLECTION, id);
            return Ok(false);
        };

        debug!("Deleted {} row {}", T::COLLECTION, id);
        self.rows.send_replace(Arc::new(remaining));

        Ok(true)
    }

    /// Replace the in-memory set with a fresh copy from the backing
    ///
    /// Returns the number of rows loaded. On failure the current set is kept.
    pub async fn refresh(&self) -> ClinicResult<usize> {
        let _guard = self.write_lock.lock().await;

        let rows = self.backing.load().await.map_err(|e| {
            warn!("Failed to refresh {}: {}", T::COLLECTION, e);
            e
        })?;

        let count = rows.len();
        info!("Loaded {} {} rows", count, T::COLLECTION);
        self.rows.send_replace(Arc::new(rows));

        Ok(count)
    }
}

impl EntityCollection<User> {
    pub fn by_role(&self, role: Role) -> Vec<User> {
        self.query(|u| u.role == role)
    }

    pub fn doctors(&self) -> Vec<User> {
        self.by_role(Role::Doctor)
    }

    /// Case-insensitive email lookup
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let email = email.trim();
        self.rows
            .borrow()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }
}

impl EntityCollection<Patient> {
    pub fn by_doctor(&self, doctor_id: &str) -> Vec<Patient> {
        self.query(|p| p.doctor_id.as_deref() == Some(doctor_id))
    }
}

impl EntityCollection<Appointment> {
    pub fn by_doctor(&self, doctor_id: &str) -> Vec<Appointment> {
        self.query(|a| a.doctor_id == doctor_id)
    }

    pub fn by_patient(&self, patient_id: &str) -> Vec<Appointment> {
        self.query(|a| a.patient_id == patient_id)
    }
}

impl EntityCollection<MedicalRecord> {
    pub fn by_doctor(&self, doctor_id: &str) -> Vec<MedicalRecord> {
        self.query(|r| r.doctor_id == doctor_id)
    }

    pub fn by_patient(&self, patient_id: &str) -> Vec<MedicalRecord> {
        self.query(|r| r.patient_id == patient_id)
    }
}
