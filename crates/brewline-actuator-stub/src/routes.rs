// SPDX-License-Identifier: BUSL-1.1
//! Route definitions for the Hopster stub.
//!
//! Bodies use the same PascalCase JSON as the real service, so responses
//! deserialize straight into the client's types.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use brewline_core::{BeerType, BottleId, Case, EquipmentState, CASE_SIZE};
use serde::{Deserialize, Serialize};

use crate::store::{AppState, FillOutcome};

/// Build the router with every stub route.
pub fn router(state: AppState) -> Router {
    let equipment = Router::new()
        .route("/level/:beer_type", get(level))
        .route("/fillcontainer/:beer_type", post(fill_container))
        .route("/fillbottle/:id", post(fill_bottle))
        .route("/recycle/:id", post(recycle))
        .route("/ship/:id", post(ship))
        .route("/case", post(ship_case))
        .route("/status", get(status).put(set_status))
        .route("/repair", post(repair))
        .route("/ledger", get(ledger))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health))
        .merge(equipment)
        .with_state(state)
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = &state.config().api_key {
        let presented = request
            .headers()
            .get("apikey")
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            return (StatusCode::UNAUTHORIZED, "missing or invalid apikey").into_response();
        }
    }
    next.run(request).await
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatusBody {
    state: EquipmentState,
}

fn beer_type(raw: String) -> Result<BeerType, Response> {
    BeerType::new(raw).map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn level(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    match beer_type(raw) {
        Ok(beer_type) => Json(state.level(&beer_type)).into_response(),
        Err(rejection) => rejection,
    }
}

async fn fill_container(State(state): State<AppState>, Path(raw): Path<String>) -> Response {
    match beer_type(raw) {
        Ok(beer_type) => {
            state.refill(&beer_type);
            tracing::debug!(%beer_type, "container refilled");
            StatusCode::OK.into_response()
        }
        Err(rejection) => rejection,
    }
}

async fn fill_bottle(State(state): State<AppState>, Path(id): Path<BottleId>) -> Response {
    match state.fill(id) {
        FillOutcome::Filled(bottle) => Json(bottle).into_response(),
        FillOutcome::NoActiveTap => (
            StatusCode::CONFLICT,
            "no container selected; query a level or refill first",
        )
            .into_response(),
        FillOutcome::Down(equipment) => (
            StatusCode::SERVICE_UNAVAILABLE,
            format!("equipment {equipment}"),
        )
            .into_response(),
    }
}

async fn recycle(State(state): State<AppState>, Path(id): Path<BottleId>) -> StatusCode {
    state.recycle(id);
    StatusCode::OK
}

async fn ship(State(state): State<AppState>, Path(id): Path<BottleId>) -> StatusCode {
    state.ship(id);
    StatusCode::OK
}

async fn ship_case(State(state): State<AppState>, Json(case): Json<Case>) -> Response {
    let count = case.bottle_ids().len();
    if count != CASE_SIZE {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("a case holds {CASE_SIZE} bottles, got {count}"),
        )
            .into_response();
    }
    let id = state.ship_case(case.into_bottle_ids());
    tracing::debug!(case_id = %id, "case shipped");
    StatusCode::OK.into_response()
}

async fn status(State(state): State<AppState>) -> Json<StatusBody> {
    Json(StatusBody {
        state: state.equipment(),
    })
}

async fn set_status(State(state): State<AppState>, Json(body): Json<StatusBody>) -> StatusCode {
    tracing::info!(state = %body.state, "equipment state set");
    state.set_equipment(body.state);
    StatusCode::OK
}

async fn repair(State(state): State<AppState>) -> StatusCode {
    state.repair();
    StatusCode::OK
}

async fn ledger(State(state): State<AppState>) -> Json<crate::store::Ledger> {
    Json(state.ledger())
}
