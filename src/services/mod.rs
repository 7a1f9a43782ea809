/// Attempt submission, listing and deletion.
pub mod attempt_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Cross-party top ten.
pub mod hall_of_fame_service;
/// Health check service.
pub mod health_service;
/// Party management and leaderboards.
pub mod party_service;
/// Background storage health supervision.
pub mod storage_supervisor;
