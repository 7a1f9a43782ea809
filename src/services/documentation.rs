use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Chug Board Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::attempts::list_attempts,
        crate::routes::attempts::create_attempt,
        crate::routes::attempts::delete_attempt,
        crate::routes::parties::list_parties,
        crate::routes::parties::create_party,
        crate::routes::parties::get_party,
        crate::routes::parties::get_leaderboard,
        crate::routes::hall_of_fame::hall_of_fame,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::attempt::AttemptForm,
            crate::dto::attempt::RankedAttempt,
            crate::dto::attempt::CreateAttemptResponse,
            crate::dto::party::CreatePartyRequest,
            crate::dto::party::PartyResponse,
            crate::dto::party::PodiumResponse,
            crate::dto::party::ParticipantResponse,
            crate::dto::party::LeaderboardResponse,
            crate::dto::hall_of_fame::HallOfFameEntry,
            crate::ranking::Medal,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "attempts", description = "Attempt submission and leaderboards"),
        (name = "parties", description = "Party management"),
    )
)]
pub struct ApiDoc;
