use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fabrica_core::{EntityKind, ListFilter, Page};
use log::debug;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use crate::cascade::FilterForm;
use crate::notice;
use crate::query::ResourceClient;

/// What a list screen renders. Failures are an inline state shown in place
/// of the table, never a blocking dialog.
#[derive(Clone, Debug, PartialEq)]
pub enum ListState<T> {
    Idle,
    Loading,
    Ready(Page<T>),
    Failed { message: String },
}

/// Binds a filter form to the query engine and publishes list states.
///
/// Stale-response discard: each refresh records its originating filter and
/// epoch; a response whose origin no longer matches the live filter, or
/// whose refresh was superseded, is dropped by comparison — the transport
/// is not assumed to support abort.
pub struct LiveList<T> {
    entity: EntityKind,
    client: ResourceClient,
    form: Arc<FilterForm>,
    state: watch::Sender<ListState<T>>,
    epoch: AtomicU64,
}

impl<T> LiveList<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    pub fn new(client: ResourceClient, form: Arc<FilterForm>) -> Self {
        let (state, _rx) = watch::channel(ListState::Idle);
        Self {
            entity: form.entity(),
            client,
            form,
            state,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn form(&self) -> &FilterForm {
        &self.form
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> ListState<T> {
        self.state.borrow().clone()
    }

    /// Fetch the page for the form's current filter and publish the result,
    /// unless the filter moved on or a newer refresh started meanwhile.
    pub async fn refresh(&self) -> ListState<T> {
        let origin: ListFilter = self.form.snapshot().normalized();
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(ListState::Loading);
        let outcome = self.client.list::<T>(self.entity, &origin).await;

        let live = self.form.snapshot().normalized();
        let superseded = epoch != self.epoch.load(Ordering::SeqCst) || live != origin;
        if superseded {
            debug!("view: discarding stale {} response", self.entity);
            return self.current();
        }
        let next = match outcome {
            Ok(page) => ListState::Ready(page),
            Err(error) => ListState::Failed {
                message: notice::list_message(&error, self.entity),
            },
        };
        self.state.send_replace(next.clone());
        next
    }
}
