use std::env;

use super::error::{CouchDaoError, CouchResult};

const DEFAULT_DATABASE: &str = "chug_board";

/// Basic-auth pair sent with every request.
#[derive(Debug, Clone)]
pub struct CouchCredentials {
    /// Basic-auth user.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
}

/// Where the CouchDB database lives and how to authenticate against it.
#[derive(Debug, Clone)]
pub struct CouchConfig {
    /// Server URL without a trailing slash.
    pub base_url: String,
    /// Database name.
    pub database: String,
    /// Credentials, when the server requires them.
    pub credentials: Option<CouchCredentials>,
}

impl CouchConfig {
    /// `COUCH_BASE_URL` is required; `COUCH_DB` defaults to `chug_board`.
    /// Credentials are only used when both `COUCH_USERNAME` and `COUCH_PASSWORD` are set.
    pub fn from_env() -> CouchResult<Self> {
        let base_url =
            env::var("COUCH_BASE_URL").map_err(|_| CouchDaoError::MissingEnvVar("COUCH_BASE_URL"))?;
        let database = env::var("COUCH_DB")
            .ok()
            .filter(|db| !db.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let credentials = match (env::var("COUCH_USERNAME"), env::var("COUCH_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(CouchCredentials { username, password }),
            _ => None,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            database,
            credentials,
        })
    }

    /// URL of the database itself.
    pub fn database_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database)
    }
}
