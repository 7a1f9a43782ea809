use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

const SWAGGER_UI_ROUTE: &str = "/docs";
const OPENAPI_JSON_ROUTE: &str = "/api-doc/openapi.json";

/// Swagger UI at `/docs`, backed by the generated document.
pub fn router() -> Router<SharedState> {
    SwaggerUi::new(SWAGGER_UI_ROUTE)
        .url(OPENAPI_JSON_ROUTE, ApiDoc::openapi())
        .into()
}
