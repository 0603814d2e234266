use crate::auth::{IdentityProvider, SgidClient};
use crate::config::AppConfig;
use crate::db::{init_db, Database};
use crate::errors::ServerError;
use crate::storage::{BlobStore, FsBlobStore};

/// Everything a request handler needs. Shared read-only by all workers.
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub idp: Box<dyn IdentityProvider>,
    pub blobs: Box<dyn BlobStore>,
}

impl AppState {
    /// Production wiring: SQLite at `DB_PATH`, files under `BLOB_DIR`, sgID.
    pub fn from_config(config: AppConfig) -> Result<Self, ServerError> {
        let db = Database::new(config.db_path.clone());
        init_db(&db)?;

        let blobs = FsBlobStore::new(config.blob_dir.clone())?;
        let idp = SgidClient::new(config.sgid.clone())?;

        Ok(Self {
            db,
            config,
            idp: Box::new(idp),
            blobs: Box::new(blobs),
        })
    }
}
