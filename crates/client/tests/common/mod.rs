#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fabrica_client::{ClientError, ClientResult, Method, Response, Transport};
use serde_json::{json, Value};
use tokio::sync::watch;

/// Scripted transport double: per-request response queues, a call log and
/// a gate that holds responses back so in-flight orderings can be forced.
pub struct StubTransport {
    responses: Mutex<HashMap<String, VecDeque<ClientResult<Response>>>>,
    calls: Mutex<Vec<String>>,
    gate: watch::Sender<bool>,
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        let (gate, _rx) = watch::channel(true);
        Arc::new(Self {
            responses: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gate,
        })
    }

    pub fn respond(&self, method: Method, path: &str, result: ClientResult<Response>) {
        self.responses
            .lock()
            .expect("responses lock")
            .entry(format!("{method} {path}"))
            .or_default()
            .push_back(result);
    }

    pub fn respond_ok(&self, method: Method, path: &str, body: Value) {
        self.respond(method, path, Ok(Response { status: 200, body }));
    }

    pub fn respond_status(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond(method, path, Ok(Response { status, body }));
    }

    pub fn fail(&self, method: Method, path: &str, error: ClientError) {
        self.respond(method, path, Err(error));
    }

    /// Hold every response until `open_gate` runs.
    pub fn close_gate(&self) {
        self.gate.send_replace(false);
    }

    pub fn open_gate(&self) {
        self.gate.send_replace(true);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self, line: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|seen| seen.as_str() == line)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(
        &self,
        method: Method,
        path: &str,
        _body: Option<Value>,
    ) -> ClientResult<Response> {
        let line = format!("{method} {path}");
        self.calls.lock().expect("calls lock").push(line.clone());
        let mut gate = self.gate.subscribe();
        loop {
            if *gate.borrow_and_update() {
                break;
            }
            gate.changed()
                .await
                .map_err(|_| ClientError::network("stub gate dropped"))?;
        }
        let scripted = self
            .responses
            .lock()
            .expect("responses lock")
            .get_mut(&line)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Err(ClientError::network(format!("no scripted response for {line}"))))
    }
}

pub fn page_body(items: &[Value], total: u64, page_no: u32, page_size: u32) -> Value {
    json!({
        "content": items,
        "totalElements": total,
        "pageNo": page_no,
        "pageSize": page_size,
    })
}

/// Wait until the transport has seen `count` calls to `line`.
pub async fn wait_for_calls(transport: &StubTransport, line: &str, count: usize) {
    for _ in 0..500 {
        if transport.call_count(line) >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("transport never saw {count} call(s) to {line}");
}
