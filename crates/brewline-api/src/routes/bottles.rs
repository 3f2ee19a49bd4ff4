// SPDX-License-Identifier: BUSL-1.1
//! # Bottle Intake
//!
//! - `POST /bottles`: accept a bottle for filling, fermentation and
//!   shipping. Returns `202 Accepted` once the bottle is queued on its line;
//!   the outcome is not reported back to the caller.
//!
//! The body uses the same PascalCase shape as the Hopster service.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use brewline_core::{BeerType, Bottle, BottleId, BottleState, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/bottles", post(submit_bottle))
}

/// Inbound bottle.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct BottleRequest {
    /// Assigned by the server when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub beer_type: String,
    /// `Filled`, `Broken` or `Unknown`. A broken bottle is recycled.
    #[serde(default)]
    pub state: Option<String>,
    pub max_content: f64,
    #[serde(default)]
    pub content: f64,
    #[serde(default)]
    pub fermentation_seconds: i64,
    #[serde(default)]
    pub consume_before: Option<DateTime<Utc>>,
}

impl TryFrom<BottleRequest> for Bottle {
    type Error = ValidationError;

    fn try_from(req: BottleRequest) -> Result<Self, Self::Error> {
        let state = match req.state.as_deref() {
            Some("Filled") => BottleState::Filled,
            Some("Broken") => BottleState::Broken,
            _ => BottleState::Unknown,
        };
        let mut bottle = Bottle::new(BeerType::new(req.beer_type)?, req.max_content)
            .with_state(state)
            .with_fermentation_seconds(req.fermentation_seconds);
        if let Some(id) = req.id {
            bottle.id = BottleId::from_uuid(id);
        }
        bottle.content = req.content;
        bottle.consume_before = req.consume_before;
        bottle.validate()?;
        Ok(bottle)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct BottleAccepted {
    pub id: Uuid,
    /// Line the bottle was routed to.
    pub line: String,
}

#[utoipa::path(
    post,
    path = "/bottles",
    request_body = BottleRequest,
    responses(
        (status = 202, description = "Bottle queued", body = BottleAccepted),
        (status = 422, description = "Invalid bottle", body = crate::error::ErrorBody),
        (status = 503, description = "Pipeline shutting down", body = crate::error::ErrorBody),
    ),
    tag = "bottles"
)]
pub(crate) async fn submit_bottle(
    State(state): State<AppState>,
    body: Result<Json<BottleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BottleAccepted>), AppError> {
    let bottle = Bottle::try_from(extract_json(body)?)?;
    let id = bottle.id;
    let line = state.bottling.line_key(&bottle).to_string();
    state.bottling.submit(bottle)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(BottleAccepted {
            id: *id.as_uuid(),
            line,
        }),
    ))
}
