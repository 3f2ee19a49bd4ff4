// SPDX-License-Identifier: BUSL-1.1
//! # Line Status
//!
//! - `GET /v1/lines`: every line with its queue depths and loop health.
//! - `GET /v1/lines/:key`: one line. Under the global queue mode the only
//!   key is `*`.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use brewline_bottling::LineStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/lines", get(list_lines))
        .route("/v1/lines/:key", get(get_line))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LineSummary {
    /// Beer type, or `*` for the global line.
    pub key: String,
    /// Bottles still fermenting.
    pub fermenting: usize,
    /// Bottles waiting to ship.
    pub shipping: usize,
    pub intake_running: bool,
    pub maturation_running: bool,
}

impl From<LineStatus> for LineSummary {
    fn from(status: LineStatus) -> Self {
        Self {
            key: status.key,
            fermenting: status.fermenting,
            shipping: status.shipping,
            intake_running: status.intake_running,
            maturation_running: status.maturation_running,
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/lines",
    responses(
        (status = 200, description = "All bottling lines, sorted by key", body = Vec<LineSummary>),
    ),
    tag = "lines"
)]
pub(crate) async fn list_lines(State(state): State<AppState>) -> Json<Vec<LineSummary>> {
    Json(
        state
            .bottling
            .statuses()
            .into_iter()
            .map(LineSummary::from)
            .collect(),
    )
}

#[utoipa::path(
    get,
    path = "/v1/lines/{key}",
    params(
        ("key" = String, Path, description = "Beer type, or `*` in global mode")
    ),
    responses(
        (status = 200, description = "Line status", body = LineSummary),
        (status = 404, description = "No such line", body = crate::error::ErrorBody),
    ),
    tag = "lines"
)]
pub(crate) async fn get_line(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<LineSummary>, AppError> {
    state
        .bottling
        .line(&key)
        .map(|line| Json(LineSummary::from(line.status())))
        .ok_or_else(|| AppError::NotFound(format!("line {key}")))
}
