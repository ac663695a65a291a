mod common;

use std::sync::Arc;

use common::StubTransport;
use fabrica_client::{FilterForm, Method, QueryCache, ResourceClient, Transport};
use fabrica_core::{EntityKind, FacilityLevel, RecordId};
use serde::Deserialize;
use serde_json::json;

#[derive(Clone, Debug, PartialEq, Deserialize)]
struct Choice {
    id: i64,
    name: String,
}

#[tokio::test]
async fn descendant_options_are_suppressed_until_the_ancestor_is_chosen() {
    let transport = StubTransport::new();
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let client = ResourceClient::new(dyn_transport, QueryCache::default());
    let form = FilterForm::new(EntityKind::Machine);

    let options = form
        .options::<Choice>(&client, FacilityLevel::Hall)
        .await
        .expect("suppressed options");
    assert!(options.is_empty());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn options_load_once_the_ancestor_is_set_and_are_cached() {
    let transport = StubTransport::new();
    transport.respond_ok(
        Method::Get,
        "halls?floorId=12",
        json!([{"id": 1, "name": "Hall A"}, {"id": 2, "name": "Hall B"}]),
    );
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let client = ResourceClient::new(dyn_transport, QueryCache::default());
    let form = FilterForm::new(EntityKind::Machine);
    form.set_level(FacilityLevel::Branch, Some(RecordId(1)));
    form.set_level(FacilityLevel::Building, Some(RecordId(5)));
    form.set_level(FacilityLevel::Floor, Some(RecordId(12)));

    let options = form
        .options::<Choice>(&client, FacilityLevel::Hall)
        .await
        .expect("hall options");
    assert_eq!(options.len(), 2);

    // the picker reopening reuses the cached entry
    form.options::<Choice>(&client, FacilityLevel::Hall)
        .await
        .expect("cached options");
    assert_eq!(transport.call_count("GET halls?floorId=12"), 1);
}

#[tokio::test]
async fn changing_an_ancestor_suppresses_descendant_options_again() {
    let transport = StubTransport::new();
    transport.respond_ok(Method::Get, "rows?hallId=3", json!([{"id": 9, "name": "Row 9"}]));
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let client = ResourceClient::new(dyn_transport, QueryCache::default());
    let form = FilterForm::new(EntityKind::Device);
    form.set_level(FacilityLevel::Branch, Some(RecordId(1)));
    form.set_level(FacilityLevel::Building, Some(RecordId(2)));
    form.set_level(FacilityLevel::Floor, Some(RecordId(7)));
    form.set_level(FacilityLevel::Hall, Some(RecordId(3)));

    let rows = form
        .options::<Choice>(&client, FacilityLevel::Row)
        .await
        .expect("row options");
    assert_eq!(rows.len(), 1);

    // picking a different building clears hall, so row options go quiet
    form.set_level(FacilityLevel::Building, Some(RecordId(4)));
    let rows = form
        .options::<Choice>(&client, FacilityLevel::Row)
        .await
        .expect("suppressed again");
    assert!(rows.is_empty());
    assert_eq!(transport.call_count("GET rows?hallId=3"), 1);
}
