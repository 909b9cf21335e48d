//! Scripted HTTP double.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use tokio::sync::watch;
use vitalis_core::{HttpEffects, HttpResponse, NetworkError};

/// One request seen by the client.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    /// Request path
    pub path: String,
    /// JSON body as sent
    pub body: Value,
}

#[derive(Debug)]
enum Scripted {
    Respond(HttpResponse),
    Fail(NetworkError),
}

/// Answers requests from a queue, in order.
///
/// Every request is logged before it waits on the gate, so a test can observe
/// a request that is still in flight.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<Call>>,
    gate: Mutex<Option<watch::Receiver<bool>>>,
}

/// Holds requests until released. Dropping the gate without releasing it
/// also lets requests through.
#[derive(Debug)]
pub struct Gate {
    open: watch::Sender<bool>,
}

impl Gate {
    /// Let held requests through.
    pub fn release(&self) {
        self.open.send_replace(true);
    }
}

impl Drop for Gate {
    fn drop(&mut self) {
        self.open.send_replace(true);
    }
}

impl ScriptedHttpClient {
    /// Client with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn respond(&self, response: HttpResponse) {
        self.script.lock().push_back(Scripted::Respond(response));
    }

    /// Queue a transport failure.
    pub fn fail(&self, error: NetworkError) {
        self.script.lock().push_back(Scripted::Fail(error));
    }

    /// Make subsequent requests wait until the returned gate is released.
    pub fn hold(&self) -> Gate {
        let (open, closed) = watch::channel(false);
        *self.gate.lock() = Some(closed);
        Gate { open }
    }

    /// Every request seen so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Scripted entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl HttpEffects for ScriptedHttpClient {
    async fn post_json(&self, path: &str, body: &Value) -> Result<HttpResponse, NetworkError> {
        self.calls.lock().push(Call {
            path: path.to_string(),
            body: body.clone(),
        });

        let gate = self.gate.lock().clone();
        if let Some(mut gate) = gate {
            // A dropped sender counts as released.
            let _released = gate.wait_for(|open| *open).await.is_ok();
        }

        match self.script.lock().pop_front() {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(error)) => Err(error),
            None => Err(NetworkError::Connection {
                message: format!("no scripted response for {path}"),
            }),
        }
    }
}
