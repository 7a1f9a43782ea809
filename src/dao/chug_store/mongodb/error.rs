use std::fmt;

use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Store operation that hit a driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MongoOp {
    Ping,
    EnsureIndex(&'static str),
    InsertAttempt(Uuid),
    DeleteAttempt(Uuid),
    ListAttempts,
    InsertParty(Uuid),
    FindParty(Uuid),
    ListParties,
}

impl fmt::Display for MongoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MongoOp::Ping => f.write_str("ping"),
            MongoOp::EnsureIndex(name) => write!(f, "ensure index `{name}`"),
            MongoOp::InsertAttempt(id) => write!(f, "insert attempt `{id}`"),
            MongoOp::DeleteAttempt(id) => write!(f, "delete attempt `{id}`"),
            MongoOp::ListAttempts => f.write_str("list attempts"),
            MongoOp::InsertParty(id) => write!(f, "insert party `{id}`"),
            MongoOp::FindParty(id) => write!(f, "find party `{id}`"),
            MongoOp::ListParties => f.write_str("list parties"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{0}`")]
    MissingEnvVar(&'static str),
    #[error("invalid MongoDB connection URI")]
    InvalidUri(#[source] MongoError),
    #[error("failed to build MongoDB client")]
    Client(#[source] MongoError),
    #[error("MongoDB unreachable after {attempts} ping(s)")]
    Unreachable {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB {op} failed")]
    Operation {
        op: MongoOp,
        #[source]
        source: MongoError,
    },
    #[error("document `{0}` carries an invalid identifier")]
    InvalidDocumentId(String),
}

/// Tag a driver error with the operation that produced it.
pub(super) fn failed(op: MongoOp) -> impl FnOnce(MongoError) -> MongoDaoError {
    move |source| MongoDaoError::Operation { op, source }
}
