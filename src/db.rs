use crate::config::Config;
use crate::store::{MySqlStore, RecordStore, StoreError};

/// Opens the store selected by the config: MySQL when `DATABASE_URL` is set,
/// otherwise a process-local memory store.
pub async fn open_store(config: &Config) -> Result<RecordStore, StoreError> {
    match &config.database_url {
        Some(url) => {
            let store = MySqlStore::connect(url).await?;
            tracing::info!("Connected to MySQL record store");
            Ok(RecordStore::MySql(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Ok(RecordStore::memory())
        }
    }
}
