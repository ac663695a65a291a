mod common;

use std::sync::Arc;

use common::{page_body, wait_for_calls, StubTransport};
use fabrica_client::{FilterForm, ListState, LiveList, Method, QueryCache, ResourceClient, Transport};
use fabrica_core::{EntityKind, FacilityLevel, QueryKey, RecordId};
use serde::Deserialize;
use serde_json::json;

#[derive(Clone, Debug, PartialEq, Deserialize)]
struct Row {
    id: i64,
    name: String,
}

#[tokio::test]
async fn a_late_response_for_the_old_filter_never_reaches_the_view() {
    let transport = StubTransport::new();
    let form = Arc::new(FilterForm::new(EntityKind::Order));

    let unfiltered_line =
        QueryKey::list(EntityKind::Order, &form.snapshot()).request_line();
    transport.respond_ok(
        Method::Get,
        &unfiltered_line,
        page_body(&[json!({"id": 1, "name": "all-branches"})], 1, 0, 25),
    );

    let cache = QueryCache::default();
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let client = ResourceClient::new(dyn_transport, cache);
    let live = Arc::new(LiveList::<Row>::new(client, form.clone()));

    transport.close_gate();
    let first = {
        let live = live.clone();
        tokio::spawn(async move { live.refresh().await })
    };
    wait_for_calls(&transport, &format!("GET {unfiltered_line}"), 1).await;

    // the user picks a branch while the unfiltered response is in flight
    let narrowed = form.set_level(FacilityLevel::Branch, Some(RecordId(3)));
    let narrowed_line = QueryKey::list(EntityKind::Order, &narrowed).request_line();
    transport.respond_ok(
        Method::Get,
        &narrowed_line,
        page_body(&[json!({"id": 2, "name": "branch-3"})], 1, 0, 25),
    );
    let second = {
        let live = live.clone();
        tokio::spawn(async move { live.refresh().await })
    };
    wait_for_calls(&transport, &format!("GET {narrowed_line}"), 1).await;
    transport.open_gate();

    first.await.expect("join first");
    second.await.expect("join second");

    match live.current() {
        ListState::Ready(page) => {
            assert_eq!(page.content.len(), 1);
            assert_eq!(page.content[0].name, "branch-3");
        }
        other => panic!("expected the narrowed page, got {other:?}"),
    }
}

#[tokio::test]
async fn list_failures_surface_as_inline_state() {
    let transport = StubTransport::new();
    let form = Arc::new(FilterForm::new(EntityKind::Machine));
    let line = QueryKey::list(EntityKind::Machine, &form.snapshot()).request_line();
    transport.fail(
        Method::Get,
        &line,
        fabrica_client::ClientError::network("connect timed out"),
    );

    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let client = ResourceClient::new(dyn_transport, QueryCache::default());
    let live = LiveList::<Row>::new(client, form);

    match live.refresh().await {
        ListState::Failed { message } => {
            assert_eq!(message, "Failed to load Machine list");
        }
        other => panic!("expected inline failure, got {other:?}"),
    }
}
