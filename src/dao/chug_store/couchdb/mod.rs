mod config;
mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use error::CouchDaoError;
pub use store::CouchChugStore;

use crate::{config::StorageBackend, dao::storage::StorageError};

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        StorageError::unavailable(StorageBackend::Couch.label(), err)
    }
}
