mod common;

use std::sync::Arc;

use common::{page_body, StubTransport};
use fabrica_client::{FilterForm, Method, QueryCache, ResourceClient, Transport};
use fabrica_core::{clamp_page, EntityKind, ListFilter, QueryKey};
use serde::Deserialize;
use serde_json::json;

#[derive(Clone, Debug, PartialEq, Deserialize)]
struct Row {
    id: i64,
}

#[tokio::test]
async fn an_out_of_range_page_is_a_legal_empty_page() {
    let transport = StubTransport::new();
    let filter = ListFilter {
        page_no: 10,
        page_size: 10,
        ..ListFilter::default()
    };
    let line = QueryKey::list(EntityKind::Bundle, &filter).request_line();
    transport.respond_ok(Method::Get, &line, page_body(&[], 95, 10, 10));

    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let client = ResourceClient::new(dyn_transport, QueryCache::default());
    let page = client
        .list::<Row>(EntityKind::Bundle, &filter)
        .await
        .expect("overrun page");
    assert!(page.content.is_empty());
    assert_eq!(page.total_pages(), 10);
    assert!(page.is_overrun());
}

#[tokio::test]
async fn navigation_cannot_pass_the_last_page() {
    let transport = StubTransport::new();
    let form = FilterForm::new(EntityKind::Bundle);
    form.set_page_size(10);

    let filter = form.goto_page(10, 10);
    assert_eq!(filter.page_no, 9);
    let filter = form.goto_page(4, 10);
    assert_eq!(filter.page_no, 4);

    // the clamp helper agrees with the form
    assert_eq!(clamp_page(10, 10), 9);

    let line = QueryKey::list(EntityKind::Bundle, &filter).request_line();
    transport.respond_ok(
        Method::Get,
        &line,
        page_body(&[json!({"id": 41})], 95, 4, 10),
    );
    let dyn_transport: Arc<dyn Transport> = transport.clone();
    let client = ResourceClient::new(dyn_transport, QueryCache::default());
    let page = client
        .list::<Row>(EntityKind::Bundle, &filter)
        .await
        .expect("page 4");
    assert_eq!(page.page_no, 4);
    assert_eq!(page.content, vec![Row { id: 41 }]);
}
