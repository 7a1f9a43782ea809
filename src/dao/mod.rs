/// Attempt and party storage backends.
pub mod chug_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
