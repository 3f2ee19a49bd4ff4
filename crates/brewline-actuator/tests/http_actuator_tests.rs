// SPDX-License-Identifier: BUSL-1.1

//! # Integration Tests for the Hopster HTTP Client
//!
//! Runs [`HttpActuator`] against wiremock servers to verify request
//! construction (paths, `apikey` header, case body) and response mapping
//! without a live equipment service.

use brewline_actuator::{Actuator, ActuatorConfig, ActuatorError, HttpActuator};
use brewline_core::{BeerType, BottleId, BottleState, Case, EquipmentState, CASE_SIZE};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpActuator {
    let config = ActuatorConfig::new(&server.uri(), "test-api-key").expect("config");
    HttpActuator::new(config).expect("client build")
}

fn ipa() -> BeerType {
    BeerType::new("IPA").unwrap()
}

#[tokio::test]
async fn fill_level_sends_api_key_and_parses_number() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/level/IPA"))
        .and(header("apikey", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(412.5)))
        .expect(1)
        .mount(&server)
        .await;

    let level = client(&server).fill_level(&ipa()).await.expect("level");
    assert_eq!(level, 412.5);
}

#[tokio::test]
async fn refill_container_posts_to_beer_type_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fillcontainer/IPA"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).refill_container(&ipa()).await.expect("refill");
}

#[tokio::test]
async fn fill_bottle_returns_resulting_bottle() {
    let server = MockServer::start().await;
    let id = BottleId::new();
    Mock::given(method("POST"))
        .and(path(format!("/fillbottle/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": id.to_string(),
            "BeerType": "IPA",
            "State": "Filled",
            "MaxContent": 330.0,
            "Content": 330.0,
            "FermentationSeconds": 3,
            "SealedAt": "2026-10-17T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bottle = client(&server).fill_bottle(id).await.expect("fill");
    assert_eq!(bottle.id, id);
    assert_eq!(bottle.state, BottleState::Filled);
    assert!(bottle.is_sealed());
    assert!(bottle.fill_complete());
}

#[tokio::test]
async fn ship_case_posts_bottle_ids() {
    let server = MockServer::start().await;
    let ids: Vec<BottleId> = (0..CASE_SIZE).map(|_| BottleId::new()).collect();
    let case = Case::new(ids.clone()).unwrap();
    let expected: Vec<String> = ids.iter().map(|id| id.to_string()).collect();

    Mock::given(method("POST"))
        .and(path("/case"))
        .and(body_json(json!({ "BottleIds": expected })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client(&server).ship_case(&case).await.expect("ship case");
}

#[tokio::test]
async fn ship_one_and_recycle_use_id_paths() {
    let server = MockServer::start().await;
    let shipped = BottleId::new();
    let broken = BottleId::new();
    Mock::given(method("POST"))
        .and(path(format!("/ship/{shipped}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/recycle/{broken}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.ship_one(shipped).await.expect("ship");
    client.recycle(broken).await.expect("recycle");
}

#[tokio::test]
async fn equipment_state_and_repair() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "State": "Crashed" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/repair"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(
        client.equipment_state().await.expect("status"),
        EquipmentState::Crashed
    );
    client.repair().await.expect("repair");
}

#[tokio::test]
async fn server_error_maps_to_api_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repair"))
        .respond_with(ResponseTemplate::new(503).set_body_string("line halted"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server).repair().await.unwrap_err();
    match err {
        ActuatorError::Api { status, body, .. } => {
            assert_eq!(status, 503);
            assert_eq!(body, "line halted");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_maps_to_deserialization_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).equipment_state().await.unwrap_err();
    assert!(matches!(err, ActuatorError::Deserialization { .. }));
}
