//! Application-level configuration loading: storage backend, photo backend and limits.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CHUG_BOARD_CONFIG_PATH";
/// Largest photo accepted with an attempt (5 MiB).
pub const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;
/// Port used when neither the config file nor the environment provides one.
const DEFAULT_PORT: u16 = 8080;

/// Which persistence backend serves attempts and parties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process-local store, lost on restart.
    Memory,
    /// MongoDB, configured through `MONGO_URI` / `MONGO_DB`.
    #[default]
    Mongo,
    /// CouchDB, configured through `COUCH_BASE_URL` / `COUCH_DB` and credentials.
    Couch,
}

impl StorageBackend {
    /// Short label used in logs and health output.
    pub fn label(self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Mongo => "mongo",
            StorageBackend::Couch => "couch",
        }
    }
}

/// Storage section of the configuration.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Selected backend.
    pub backend: StorageBackend,
}

/// Which blob backend stores attempt photos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoBackend {
    /// Base64 data URI stored inside the attempt record.
    #[default]
    Inline,
    /// File written to the local upload directory and served by this process.
    Local,
    /// Object uploaded to an external bucket over HTTP.
    Object,
}

/// Photo section of the configuration.
#[derive(Debug, Clone)]
pub struct PhotoConfig {
    /// Selected backend.
    pub backend: PhotoBackend,
    /// Maximum accepted payload size in bytes.
    pub max_bytes: usize,
    /// Base URL prepended to locally stored relative paths.
    pub public_base_url: String,
    /// Directory receiving uploaded files for the local backend.
    pub upload_dir: PathBuf,
    /// Bucket endpoint receiving `PUT` uploads for the object backend.
    pub bucket_url: Option<String>,
    /// Public URL prefix under which uploaded objects are reachable.
    pub bucket_public_url: Option<String>,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            backend: PhotoBackend::default(),
            max_bytes: DEFAULT_MAX_PHOTO_BYTES,
            public_base_url: format!("http://localhost:{DEFAULT_PORT}"),
            upload_dir: PathBuf::from("uploads"),
            bucket_url: None,
            bucket_public_url: None,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// Persistence settings.
    pub storage: StorageConfig,
    /// Photo storage settings.
    pub photos: PhotoConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            storage: StorageConfig::default(),
            photos: PhotoConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults, then
    /// apply the `PORT` / `SERVER_PORT` environment override.
    pub fn load() -> Self {
        let mut config = Self::load_file();
        if let Some(port) = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
        {
            config.port = port;
        }
        config
    }

    fn load_file() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        storage = ?app_config.storage.backend,
                        photos = ?app_config.photos.backend,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    port: Option<u16>,
    storage: RawStorage,
    photos: RawPhotos,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStorage {
    backend: StorageBackend,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPhotos {
    backend: PhotoBackend,
    max_bytes: Option<usize>,
    public_base_url: Option<String>,
    upload_dir: Option<PathBuf>,
    bucket_url: Option<String>,
    bucket_public_url: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = PhotoConfig::default();
        let photos = PhotoConfig {
            backend: value.photos.backend,
            max_bytes: value.photos.max_bytes.unwrap_or(defaults.max_bytes),
            public_base_url: value
                .photos
                .public_base_url
                .unwrap_or(defaults.public_base_url),
            upload_dir: value.photos.upload_dir.unwrap_or(defaults.upload_dir),
            bucket_url: value.photos.bucket_url,
            bucket_public_url: value.photos.bucket_public_url,
        };

        Self {
            port: value.port.unwrap_or(DEFAULT_PORT),
            storage: StorageConfig {
                backend: value.storage.backend,
            },
            photos,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
