//! Swagger UI and OpenAPI document serving.
//!
//! Document generation is left to `utoipa`; services either pass their own
//! `#[derive(OpenApi)]` document or get an empty one titled with the display name.

use axum::Router;
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};
use utoipa_swagger_ui::SwaggerUi;

pub const SWAGGER_UI_PATH: &str = "/swagger";
pub const OPENAPI_JSON_PATH: &str = "/swagger/v1/swagger.json";

/// Empty document carrying only the service title.
pub fn default_document(name: &str) -> OpenApi {
    OpenApiBuilder::new()
        .info(InfoBuilder::new().title(name).version("v1").build())
        .build()
}

/// Mount Swagger UI on the router. The document title defaults to `name`
/// when the supplied document has none.
pub fn apply(router: Router, name: &str, document: OpenApi) -> Router {
    router.merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, titled(document, name)))
}

fn titled(mut document: OpenApi, name: &str) -> OpenApi {
    if document.info.title.trim().is_empty() {
        document.info.title = name.to_string();
    }
    document
}
