//! Failures of the CouchDB attempt/party store.

use reqwest::StatusCode;
use thiserror::Error;

pub type CouchResult<T> = Result<T, CouchDaoError>;

#[derive(Debug, Error)]
pub enum CouchDaoError {
    #[error("missing CouchDB environment variable `{0}`")]
    MissingEnvVar(&'static str),
    #[error("failed to build CouchDB HTTP client")]
    Client(#[source] reqwest::Error),
    /// Transport failure; CouchDB never answered.
    #[error("CouchDB request to `{target}` failed")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with a status the store does not handle.
    #[error("CouchDB answered {status} for `{target}`")]
    Status { target: String, status: StatusCode },
    #[error("unreadable CouchDB payload for `{target}`: {reason}")]
    Decode { target: String, reason: String },
    #[error("malformed document id `{doc_id}` ({reason})")]
    DocumentId { doc_id: String, reason: &'static str },
}
