//! In-memory transport for pipeline tests

use crate::error::TransportError;
use crate::response::Response;
use crate::transport::{OutgoingRequest, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::sync::Mutex;

enum Scripted {
    Respond(u16, &'static str),
    Fail,
}

/// Plays back scripted responses in order and records every request
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    sent: Mutex<Vec<OutgoingRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: &'static str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Respond(status, body));
        self
    }

    /// Next call fails like an unreachable host
    pub fn fail(self) -> Self {
        self.script.lock().unwrap().push_back(Scripted::Fail);
        self
    }

    pub fn requests(&self) -> Vec<OutgoingRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn send(&self, request: &OutgoingRequest) -> Result<Response, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Respond(status, body)) => Ok(Response::new(
                StatusCode::from_u16(status).unwrap(),
                HeaderMap::new(),
                request.url.clone(),
                Bytes::from_static(body.as_bytes()),
            )),
            Some(Scripted::Fail) => Err(TransportError::Request("connection refused".to_string())),
            None => Err(TransportError::Request("no scripted response".to_string())),
        }
    }
}
