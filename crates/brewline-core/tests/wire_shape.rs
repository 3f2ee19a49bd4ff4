// SPDX-License-Identifier: BUSL-1.1

//! Wire-shape and construction properties for the core domain types.

use brewline_core::{Bottle, BottleId, BottleState, Case, EquipmentState, CASE_SIZE};
use proptest::prelude::*;

proptest! {
    #[test]
    fn case_rejects_every_size_but_twenty_four(n in 0usize..64) {
        let ids: Vec<BottleId> = (0..n).map(|_| BottleId::new()).collect();
        prop_assert_eq!(Case::new(ids).is_ok(), n == CASE_SIZE);
    }

    #[test]
    fn validation_matches_content_bound(max in 0.0f64..1000.0, content in 0.0f64..1000.0) {
        let mut bottle = Bottle::new("Lager".parse().unwrap(), max);
        bottle.content = content;
        prop_assert_eq!(bottle.validate().is_ok(), content <= max);
    }
}

#[test]
fn bottle_serializes_to_pascal_case() {
    let bottle = Bottle::new("Porter".parse().unwrap(), 500.0)
        .with_fermentation_seconds(30)
        .with_state(BottleState::Filled);
    let json = serde_json::to_value(&bottle).unwrap();
    assert_eq!(json["BeerType"], "Porter");
    assert_eq!(json["MaxContent"], 500.0);
    assert_eq!(json["FermentationSeconds"], 30);
    assert_eq!(json["State"], "Filled");
    assert!(json.get("ConsumeBefore").is_none());
    assert!(json.get("SealedAt").is_none());
}

#[test]
fn equipment_state_wire_names() {
    let state: EquipmentState = serde_json::from_str("\"Crashed\"").unwrap();
    assert_eq!(state, EquipmentState::Crashed);
    assert_eq!(serde_json::to_string(&EquipmentState::Running).unwrap(), "\"Running\"");
}
