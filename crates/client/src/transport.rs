use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{ClientError, ClientResult};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw backend response as the transport hands it over.
#[derive(Clone, Debug)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> ClientResult<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|err| ClientError::decode(err.to_string()))
    }
}

/// The HTTP seam. Implementations attach the bearer token, enforce the
/// request timeout and own the 401 → login redirect; this layer only maps
/// statuses and never retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: Method, path: &str, body: Option<Value>)
        -> ClientResult<Response>;
}

/// Map a non-2xx response to its failure class.
pub fn classify(response: &Response) -> ClientResult<()> {
    match response.status {
        200..=299 => Ok(()),
        401 => Err(ClientError::AuthExpired),
        status @ 400..=499 => Err(ClientError::rejected(
            status,
            extract_message(&response.body),
        )),
        status => Err(ClientError::server(status)),
    }
}

/// Pull the structured message out of a heterogeneous error payload.
pub fn extract_message(body: &Value) -> Option<String> {
    for field in ["message", "error", "detail"] {
        if let Some(text) = body.get(field).and_then(Value::as_str) {
            if !text.trim().is_empty() {
                return Some(text.to_string());
            }
        }
    }
    None
}
