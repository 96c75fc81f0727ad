/// Application context and dependency injection
use crate::{
    api::{AuthApi, HttpApi, UsersApi},
    config::{ClientConfig, UsersBacking},
    error::{ClinicError, ClinicResult},
    models::{Entity, User},
    relations::RelationalIndex,
    session::{SessionManager, SessionStatus},
    storage::{FileStore, KeyValueStore, StorageKeys},
    store::{
        AppointmentCollection, Backing, EntityCollection, LocalBacking, PatientCollection,
        RecordCollection, RemoteUserBacking, UserCollection,
    },
};
use std::sync::Arc;
use tracing::{info, warn};

/// Application root holding one instance of every collection and the session
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ClientConfig>,
    pub storage: Arc<dyn KeyValueStore>,
    pub session: Arc<SessionManager>,
    pub users: Arc<UserCollection>,
    pub patients: Arc<PatientCollection>,
    pub appointments: Arc<AppointmentCollection>,
    pub records: Arc<RecordCollection>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ClientConfig) -> ClinicResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create data directory if it doesn't exist
        Self::ensure_directories(&config).await?;

        let storage = Arc::new(FileStore::new(&config.storage.data_directory)?);
        let api = Arc::new(HttpApi::new(&config.api)?);

        Self::with_backends(config, storage, api.clone(), api).await
    }

    /// Create a context over explicit storage and API implementations
    pub async fn with_backends(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        auth_api: Arc<dyn AuthApi>,
        users_api: Arc<dyn UsersApi>,
    ) -> ClinicResult<Self> {
        let keys = StorageKeys::new(config.storage.namespace.clone());

        let session = Arc::new(SessionManager::new(auth_api, storage.clone(), &keys));

        let users_backing: Arc<dyn Backing<User>> = match config.storage.users_backing {
            UsersBacking::Remote => {
                Arc::new(RemoteUserBacking::new(users_api, session.clone()))
            }
            UsersBacking::Local => {
                info!("Users are kept in the local store");
                Arc::new(LocalBacking::<User>::new(storage.clone(), &keys))
            }
        };

        let users = Arc::new(EntityCollection::open(users_backing).await?);
        let patients: Arc<PatientCollection> = open_local(&storage, &keys).await?;
        let appointments: Arc<AppointmentCollection> = open_local(&storage, &keys).await?;
        let records: Arc<RecordCollection> = open_local(&storage, &keys).await?;

        Ok(Self {
            config: Arc::new(config),
            storage,
            session,
            users,
            patients,
            appointments,
            records,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ClientConfig) -> ClinicResult<()> {
        let dir = &config.storage.data_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                ClinicError::Internal(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }
        Ok(())
    }

    /// Bootstrap the session, then load the remote user list if signed in
    ///
    /// A failed user refresh is logged and does not affect the session.
    pub async fn start(&self) -> SessionStatus {
        let status = self.session.bootstrap().await;

        if status == SessionStatus::Authenticated && self.users.is_remote() {
            if let Err(e) = self.users.refresh().await {
                warn!("Initial user refresh failed: {}", e);
            }
        }

        status
    }

    /// Snapshot of every collection for cross-collection lookups
    pub fn index(&self) -> RelationalIndex {
        RelationalIndex::from_collections(
            &self.users,
            &self.patients,
            &self.appointments,
            &self.records,
        )
    }
}

/// Open a collection mirrored in the local store
async fn open_local<T: Entity>(
    storage: &Arc<dyn KeyValueStore>,
    keys: &StorageKeys,
) -> ClinicResult<Arc<EntityCollection<T>>> {
    let backing: Arc<dyn Backing<T>> = Arc::new(LocalBacking::<T>::new(storage.clone(), keys));
    Ok(Arc::new(EntityCollection::open(backing).await?))
}
