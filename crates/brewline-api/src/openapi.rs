// SPDX-License-Identifier: BUSL-1.1
//! OpenAPI document for the API surface, served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Brewline API",
        description = "Bottle intake and line status for the bottling pipeline.\n\nBottles posted to `/bottles` are filled, fermented and shipped asynchronously; full cases of 24 ship together and bottles close to their consume-before deadline ship alone.",
        license(name = "BUSL-1.1")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::bottles::submit_bottle,
        crate::routes::lines::list_lines,
        crate::routes::lines::get_line,
    ),
    components(schemas(
        crate::routes::bottles::BottleRequest,
        crate::routes::bottles::BottleAccepted,
        crate::routes::lines::LineSummary,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "bottles", description = "Bottle intake"),
        (name = "lines", description = "Bottling line status"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
