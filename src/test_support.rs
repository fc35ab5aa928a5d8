//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::dom::{CardElement, Document};
use crate::error::FetchError;
use crate::metadata::client::{Transport, TransportRequest, TransportResponse};

/// Transport that answers from a table keyed by item id and records every
/// request it sees.
///
/// Responses can be delayed, or held back entirely until `release()`.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    requests: Mutex<Vec<TransportRequest>>,
    delay: Mutex<Option<Duration>>,
    gate: Mutex<Option<(watch::Sender<bool>, watch::Receiver<bool>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(&self, item_id: &str, body: &str) {
        self.respond_raw(item_id, 200, body.as_bytes());
    }

    pub fn respond_status(&self, item_id: &str, status: u16) {
        self.respond_raw(item_id, status, b"");
    }

    pub fn respond_raw(&self, item_id: &str, status: u16, body: &[u8]) {
        self.responses
            .lock()
            .insert(item_id.to_string(), (status, body.to_vec()));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Hold every response until `release()`.
    pub fn hold(&self) {
        *self.gate.lock() = Some(watch::channel(false));
    }

    pub fn release(&self) {
        if let Some((open, _)) = self.gate.lock().take() {
            let _ = open.send(true);
        }
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

fn item_id_from_url(url: &str) -> String {
    let tail = url.split("/Items/").nth(1).unwrap_or_default();
    let raw = tail.split('?').next().unwrap_or_default();
    urlencoding::decode(raw)
        .map(|id| id.into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FetchError> {
        let item_id = item_id_from_url(&request.url);
        self.requests.lock().push(request);
        // Suspend once so concurrent callers really overlap
        tokio::task::yield_now().await;

        let gate = self.gate.lock().as_ref().map(|(_, rx)| rx.clone());
        if let Some(mut rx) = gate {
            while !*rx.borrow_and_update() {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let (status, body) = self
            .responses
            .lock()
            .get(&item_id)
            .cloned()
            .unwrap_or((404, Vec::new()));
        Ok(TransportResponse { status, body })
    }
}

/// A movie card with a text container, the shape the host renders.
pub fn movie_card(item_id: &str) -> CardElement {
    CardElement::movie(Some(item_id)).with_text_container()
}

/// Body for a typical item.
pub fn item_json(path: &str, size: u64, container: &str, width: u32, height: u32) -> String {
    serde_json::json!({
        "Path": path,
        "MediaSources": [{
            "Size": size,
            "Container": container,
            "MediaStreams": [
                {"Type": "Video", "Width": width, "Height": height},
                {"Type": "Audio", "Language": "eng"}
            ]
        }]
    })
    .to_string()
}

pub fn document_with(cards: Vec<CardElement>) -> Document {
    let document = Document::new();
    for card in cards {
        document.append_card(card);
    }
    document
}
