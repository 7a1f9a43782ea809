use std::env;

use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DATABASE: &str = "chug_board";

/// Parsed driver options plus the database holding `attempts` and `parties`.
#[derive(Clone)]
pub struct MongoConfig {
    /// Driver options parsed from `MONGO_URI`.
    pub options: ClientOptions,
    /// Database holding both collections.
    pub database_name: String,
}

impl MongoConfig {
    /// `MONGO_URI` is required; `MONGO_DB` defaults to `chug_board`.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = env::var("MONGO_URI").map_err(|_| MongoDaoError::MissingEnvVar("MONGO_URI"))?;
        let options = ClientOptions::parse(&uri)
            .await
            .map_err(MongoDaoError::InvalidUri)?;
        let database_name = env::var("MONGO_DB")
            .ok()
            .filter(|db| !db.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_owned());

        Ok(Self {
            options,
            database_name,
        })
    }
}
