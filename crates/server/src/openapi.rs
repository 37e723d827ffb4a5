use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct SetCaptionRequest {
    /// Photo identifier, e.g. the file name. Trimmed; must not be empty.
    pub key: String,
    /// Trimmed and clamped to 2000 characters. Non-strings are stored as "".
    pub caption: Option<String>,
}

#[derive(ToSchema)]
pub struct OkResponse { pub ok: bool }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::captions::get_captions,
        crate::routes::captions::set_caption,
    ),
    components(schemas(HealthResponse, SetCaptionRequest, OkResponse, ErrorResponse)),
    tags(
        (name = "captions", description = "Photo caption persistence"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
