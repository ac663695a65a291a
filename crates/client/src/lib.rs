//! Fabrica client runtime: the composite-key query cache, per-entity query
//! engine, cascading filter resolver, live list binding and mutation
//! dispatch behind every screen of the facility console.

pub mod cache;
pub mod cascade;
pub mod config;
pub mod error;
pub mod mutation;
pub mod notice;
pub mod query;
pub mod transport;
pub mod view;

use std::sync::Arc;

pub use cache::{CachePolicy, EntrySnapshot, EntryStatus, QueryCache};
pub use cascade::FilterForm;
pub use config::{CacheSettings, ClientConfig};
pub use error::{ClientError, ClientResult};
pub use mutation::{
    MutationDispatcher, MutationIntent, MutationPhase, MutationReport, Operation, TrackedMutation,
};
pub use notice::{Notice, Severity, MAX_NOTICE_LEN};
pub use query::ResourceClient;
pub use transport::{classify, extract_message, Method, Response, Transport};
pub use view::{ListState, LiveList};

/// Wire a transport and configuration into the shared cache, query engine
/// and mutation dispatcher one console instance uses.
pub fn open_client(
    transport: Arc<dyn Transport>,
    config: &ClientConfig,
) -> (ResourceClient, MutationDispatcher) {
    let cache = QueryCache::new(config.cache_policy());
    (
        ResourceClient::new(Arc::clone(&transport), cache.clone()),
        MutationDispatcher::new(transport, cache),
    )
}
