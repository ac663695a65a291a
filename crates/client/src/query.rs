use std::sync::Arc;

use fabrica_core::{EntityKind, FacilityLevel, ListFilter, Page, QueryKey, RecordId, RequestId};
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::QueryCache;
use crate::transport::{classify, Method, Transport};
use crate::{ClientError, ClientResult};

/// Per-entity read operations routed through the query cache.
///
/// Every argument that affects server-side results is folded into the
/// canonical query key; the request line sent over the wire IS the key's
/// rendering, so key identity and request identity cannot drift apart.
#[derive(Clone)]
pub struct ResourceClient {
    transport: Arc<dyn Transport>,
    cache: QueryCache,
}

impl ResourceClient {
    pub fn new(transport: Arc<dyn Transport>, cache: QueryCache) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// One page of `entity` records under the given filter tuple.
    pub async fn list<T: DeserializeOwned>(
        &self,
        entity: EntityKind,
        filter: &ListFilter,
    ) -> ClientResult<Page<T>> {
        let key = QueryKey::list(entity, filter);
        let body = self.fetch_value(&key).await?;
        let page: Page<Value> = serde_json::from_value(body)
            .map_err(|err| ClientError::decode(format!("page of {entity}: {err}")))?;
        page.try_map(|item| {
            serde_json::from_value(item)
                .map_err(|err| ClientError::decode(format!("{entity} record: {err}")))
        })
    }

    pub async fn by_id<T: DeserializeOwned>(
        &self,
        entity: EntityKind,
        id: RecordId,
    ) -> ClientResult<T> {
        let key = QueryKey::by_id(entity, id);
        let body = self.fetch_value(&key).await?;
        serde_json::from_value(body)
            .map_err(|err| ClientError::decode(format!("{entity} {id}: {err}")))
    }

    /// All `entity` records under one parent level, for option pickers.
    /// The parent id is structurally required, so an ill-formed
    /// "unset ancestor" key cannot exist here.
    pub async fn by_parent<T: DeserializeOwned>(
        &self,
        entity: EntityKind,
        level: FacilityLevel,
        parent: RecordId,
    ) -> ClientResult<Vec<T>> {
        let key = QueryKey::by_parent(entity, level, parent);
        let body = self.fetch_value(&key).await?;
        serde_json::from_value(body)
            .map_err(|err| ClientError::decode(format!("{entity} by {level}: {err}")))
    }

    async fn fetch_value(&self, key: &QueryKey) -> ClientResult<Value> {
        let transport = Arc::clone(&self.transport);
        let line = key.request_line();
        self.cache
            .fetch(key, move || {
                let transport = Arc::clone(&transport);
                let line = line.clone();
                async move {
                    let request_id = RequestId::new();
                    debug!("client: GET {line} request_id={request_id}");
                    let response = transport.send(Method::Get, &line, None).await?;
                    classify(&response)?;
                    Ok(response.body)
                }
            })
            .await
    }
}
