use std::fmt;
use std::sync::Arc;

use fabrica_core::{EntityKind, RecordId, RequestId};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::watch;

use crate::cache::QueryCache;
use crate::notice::{self, Notice};
use crate::transport::{classify, Method, Transport};
use crate::{ClientError, ClientResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    Patch,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Patch => "patch",
        }
    }

    fn method(self) -> Method {
        match self {
            Operation::Create => Method::Post,
            Operation::Update => Method::Put,
            Operation::Delete => Method::Delete,
            Operation::Patch => Method::Patch,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One form submission. Produced by a dialog, consumed exactly once by the
/// dispatcher, never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MutationIntent {
    pub entity: EntityKind,
    pub operation: Operation,
    pub id: Option<RecordId>,
    pub payload: Option<Value>,
}

impl MutationIntent {
    pub fn create(entity: EntityKind, payload: Value) -> Self {
        Self {
            entity,
            operation: Operation::Create,
            id: None,
            payload: Some(payload),
        }
    }

    pub fn update(entity: EntityKind, id: RecordId, payload: Value) -> Self {
        Self {
            entity,
            operation: Operation::Update,
            id: Some(id),
            payload: Some(payload),
        }
    }

    pub fn patch(entity: EntityKind, id: RecordId, payload: Value) -> Self {
        Self {
            entity,
            operation: Operation::Patch,
            id: Some(id),
            payload: Some(payload),
        }
    }

    pub fn delete(entity: EntityKind, id: RecordId) -> Self {
        Self {
            entity,
            operation: Operation::Delete,
            id: Some(id),
            payload: None,
        }
    }

    fn path(&self) -> ClientResult<String> {
        match self.operation {
            Operation::Create => Ok(self.entity.collection().to_string()),
            Operation::Update | Operation::Patch | Operation::Delete => {
                let id = self.id.ok_or_else(|| {
                    ClientError::invariant(format!(
                        "{} {} without a record id",
                        self.operation, self.entity
                    ))
                })?;
                Ok(format!("{}/{id}", self.entity.collection()))
            }
        }
    }
}

/// Outcome handed back to the dialog: success flag, optional echoed record
/// and at most one user-facing notice.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationReport {
    pub succeeded: bool,
    pub data: Option<Value>,
    pub notice: Option<Notice>,
}

/// Executes mutation intents.
///
/// Side effects per call: one network write, namespace invalidation on
/// success, exactly one notice — except an expired session, which the
/// session collaborator handles and which therefore produces none.
/// Failures never surface as `Err` across the UI boundary.
#[derive(Clone)]
pub struct MutationDispatcher {
    transport: Arc<dyn Transport>,
    cache: QueryCache,
}

impl MutationDispatcher {
    pub fn new(transport: Arc<dyn Transport>, cache: QueryCache) -> Self {
        Self { transport, cache }
    }

    pub async fn execute(&self, intent: MutationIntent) -> MutationReport {
        let request_id = RequestId::new();
        info!(
            "client: {} {} request_id={request_id}",
            intent.operation, intent.entity
        );
        match self.perform(&intent).await {
            Ok(data) => {
                let affected = intent.entity.affected_kinds();
                let matched = self.cache.invalidate_entities(&affected).await;
                debug!(
                    "client: {} {} invalidated {matched} cached queries",
                    intent.operation, intent.entity
                );
                MutationReport {
                    succeeded: true,
                    data,
                    notice: Some(Notice::success(notice::success_message(
                        intent.operation,
                        intent.entity,
                    ))),
                }
            }
            Err(ClientError::AuthExpired) => {
                info!(
                    "client: session expired during {} {}",
                    intent.operation, intent.entity
                );
                MutationReport {
                    succeeded: false,
                    data: None,
                    notice: None,
                }
            }
            Err(error) => {
                warn!(
                    "client: {} {} failed: {error}",
                    intent.operation, intent.entity
                );
                MutationReport {
                    succeeded: false,
                    data: None,
                    notice: Some(Notice::error(notice::normalize(
                        &error,
                        intent.operation,
                        intent.entity,
                    ))),
                }
            }
        }
    }

    async fn perform(&self, intent: &MutationIntent) -> ClientResult<Option<Value>> {
        let path = intent.path()?;
        let response = self
            .transport
            .send(intent.operation.method(), &path, intent.payload.clone())
            .await?;
        classify(&response)?;
        if response.body.is_null() {
            Ok(None)
        } else {
            Ok(Some(response.body.clone()))
        }
    }
}

/// Observable lifecycle of one mutation attempt:
/// `idle → pending → {succeeded, failed}`, terminal. A retry is a fresh
/// instance; there is no automatic retry-from-error transition.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MutationPhase {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

pub struct TrackedMutation {
    phase: watch::Sender<MutationPhase>,
}

impl Default for TrackedMutation {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackedMutation {
    pub fn new() -> Self {
        let (phase, _rx) = watch::channel(MutationPhase::Idle);
        Self { phase }
    }

    pub fn phase(&self) -> watch::Receiver<MutationPhase> {
        self.phase.subscribe()
    }

    pub async fn run(
        &self,
        dispatcher: &MutationDispatcher,
        intent: MutationIntent,
    ) -> MutationReport {
        self.phase.send_replace(MutationPhase::Pending);
        let report = dispatcher.execute(intent).await;
        self.phase.send_replace(if report.succeeded {
            MutationPhase::Succeeded
        } else {
            MutationPhase::Failed
        });
        report
    }
}
