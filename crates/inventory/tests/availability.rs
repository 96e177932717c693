//! Inventory listing and correction against configured and unconfigured backends.

use std::collections::HashSet;
use std::sync::Arc;

use bloodbank_core::{Backend, BloodType, InMemoryRemoteStore, RemoteStore, TableSpec};
use bloodbank_inventory::{
    INVENTORY_TABLE, InventoryError, InventoryQuery, InventoryStatus, InventoryStore,
    InventorySummary,
};

#[tokio::test]
async fn unconfigured_listing_has_each_canonical_code_once() {
    let store = InventoryStore::new(Backend::Unconfigured);
    let records = store.list_inventory().await.unwrap();

    let codes: Vec<_> = records.iter().map(|r| r.blood_type().code()).collect();
    let unique: HashSet<_> = codes.iter().copied().collect();
    assert_eq!(codes.len(), 8);
    assert_eq!(unique.len(), 8);
    for t in BloodType::ALL {
        assert!(unique.contains(t.code()), "missing {t}");
    }
}

#[tokio::test]
async fn every_listed_status_matches_its_units() {
    let store = InventoryStore::new(Backend::Unconfigured);
    for r in store.list_inventory_or_seed().await {
        assert_eq!(r.status(), InventoryStatus::classify(r.units()));
    }
}

#[tokio::test]
async fn negative_update_is_rejected_before_any_write() {
    let remote = Arc::new(
        InMemoryRemoteStore::new().with_table(INVENTORY_TABLE, TableSpec::new().identity("id")),
    );
    remote
        .insert(
            INVENTORY_TABLE,
            vec![
                serde_json::json!({
                    "blood_type": "O-",
                    "units": 15,
                    "status": "low",
                    "updated_at": "2026-10-01T00:00:00Z"
                })
                .as_object()
                .cloned()
                .unwrap(),
            ],
        )
        .await
        .unwrap();
    let store = InventoryStore::new(Backend::Configured(remote.clone()));

    let err = store.update_units(BloodType::ONegative, -1).await.unwrap_err();
    assert!(matches!(err, InventoryError::InvalidInput(_)));

    let rows = remote.select(INVENTORY_TABLE, None, None).await.unwrap();
    assert_eq!(rows[0]["units"], 15);
    assert_eq!(rows[0]["status"], "low");
}

#[tokio::test]
async fn corrections_flow_into_filters_and_summary() {
    let remote = Arc::new(
        InMemoryRemoteStore::new().with_table(INVENTORY_TABLE, TableSpec::new().identity("id")),
    );
    let rows = BloodType::ALL
        .iter()
        .map(|t| {
            serde_json::json!({
                "blood_type": t.code(),
                "units": 30,
                "status": "adequate",
                "updated_at": "2026-10-01T00:00:00Z"
            })
            .as_object()
            .cloned()
            .unwrap()
        })
        .collect();
    remote.insert(INVENTORY_TABLE, rows).await.unwrap();
    let store = InventoryStore::new(Backend::Configured(remote));

    store.update_units(BloodType::AbNegative, 9).await.unwrap();
    store.update_units(BloodType::OPositive, 10).await.unwrap();

    let records = store.list_inventory().await.unwrap();
    let summary = InventorySummary::from_records(&records);
    assert_eq!(summary.total_units, 6 * 30 + 9 + 10);
    assert_eq!(summary.critical, vec![BloodType::AbNegative]);
    assert_eq!(summary.count(InventoryStatus::Low), 1);
    assert_eq!(summary.count(InventoryStatus::Adequate), 6);

    let low = InventoryQuery {
        status: Some(InventoryStatus::Low),
        search: None,
    }
    .apply(&records);
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].blood_type(), BloodType::OPositive);
}
