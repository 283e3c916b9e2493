use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Trivia Rounds Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::round::status,
        crate::routes::round::join,
        crate::routes::round::answer,
        crate::routes::sse::public_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::phase::VisiblePhase,
            crate::dto::round::JoinRequest,
            crate::dto::round::JoinResponse,
            crate::dto::round::AnswerRequest,
            crate::dto::round::AnswerResponse,
            crate::dto::round::StatusResponse,
            crate::dto::round::PlayerSummary,
            crate::dto::round::PublicQuestion,
            crate::dto::sse::Handshake,
            crate::dto::sse::PhaseChangedEvent,
            crate::dto::sse::PlayerJoinedEvent,
            crate::dto::sse::PlayerAnsweredEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "round", description = "Round lifecycle, joining and answering"),
        (name = "sse", description = "Server-sent events stream"),
    )
)]
pub struct ApiDoc;
