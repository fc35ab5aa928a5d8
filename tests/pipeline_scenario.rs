//! End-to-end passes through the public API against a recording transport.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use cardlens_core::attributes::LineGroup;
use cardlens_core::dom::{CardElement, Document};
use cardlens_core::metadata::{
    ItemFetcher, StaticToken, Transport, TransportRequest, TransportResponse,
};
use cardlens_core::pipeline::Orchestrator;
use cardlens_core::settings::{DisplayOptions, SettingsStore};
use cardlens_core::{Enhancer, EnhancerConfig, FetchError};

#[derive(Default)]
struct RecordingTransport {
    bodies: Mutex<HashMap<String, String>>,
    urls: Mutex<Vec<String>>,
}

impl RecordingTransport {
    fn serve(&self, item_id: &str, body: serde_json::Value) {
        self.bodies.lock().insert(item_id.to_string(), body.to_string());
    }

    fn calls(&self) -> usize {
        self.urls.lock().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, FetchError> {
        self.urls.lock().push(request.url.clone());
        tokio::task::yield_now().await;
        let item_id = request
            .url
            .split("/Items/")
            .nth(1)
            .and_then(|rest| rest.split('?').next())
            .unwrap_or_default()
            .to_string();
        Ok(match self.bodies.lock().get(&item_id) {
            Some(body) => TransportResponse {
                status: 200,
                body: body.as_bytes().to_vec(),
            },
            None => TransportResponse {
                status: 404,
                body: Vec::new(),
            },
        })
    }
}

fn title_item() -> serde_json::Value {
    serde_json::json!({
        "Path": "/media/title.mkv",
        "MediaSources": [{
            "Size": 1024,
            "Container": "mkv",
            "MediaStreams": [{"Type": "Video", "Width": 1920, "Height": 1080}]
        }]
    })
}

fn scenario_options() -> DisplayOptions {
    DisplayOptions {
        show_file_size: true,
        show_file_name: true,
        show_container: true,
        show_resolution: true,
        ..DisplayOptions::none()
    }
}

fn fetcher(transport: Arc<RecordingTransport>) -> Arc<ItemFetcher> {
    Arc::new(ItemFetcher::new(
        EnhancerConfig::new("http://media.local:8096/"),
        transport,
        Arc::new(StaticToken("secret".to_string())),
    ))
}

fn movie_card(item_id: &str) -> CardElement {
    CardElement::movie(Some(item_id))
        .with_text_container()
        .with_host_line("Title (2020)")
}

#[tokio::test]
async fn test_single_card_scenario() {
    let transport = Arc::new(RecordingTransport::default());
    transport.serve("abc", title_item());
    let document = Document::new();
    let card = document.append_card(movie_card("abc"));
    let orch = Orchestrator::new(
        document.clone(),
        fetcher(transport.clone()),
        SettingsStore::with_options(scenario_options()),
    );

    assert_eq!(orch.run_pass().await.unwrap(), 1);

    let card = document.card(card).unwrap();
    assert!(card.is_marked_enhanced());
    let text = card.text().unwrap();
    let block: Vec<&str> = text.attribute_lines.iter().map(|l| l.text.as_str()).collect();
    let joined = block.join("\n");
    for expected in ["1.0 KB", "title.mkv", "MKV", "1920×1080"] {
        assert!(joined.contains(expected), "missing {} in {:?}", expected, block);
    }
    assert_eq!(text.line(LineGroup::FileName), Some("title.mkv"));
    assert_eq!(text.line(LineGroup::Details), Some("1.0 KB • MKV"));
    assert_eq!(text.line(LineGroup::Resolution), Some("1920×1080"));
    assert_eq!(text.host_lines, vec!["Title (2020)".to_string()]);

    let urls = transport.urls.lock().clone();
    assert_eq!(
        urls,
        vec!["http://media.local:8096/Items/abc?Fields=Path%2CMediaSources&api_key=secret".to_string()]
    );

    // Second pass over an already-enhanced grid
    assert_eq!(orch.run_pass().await.unwrap(), 0);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_mixed_grid_isolates_failures() {
    let transport = Arc::new(RecordingTransport::default());
    transport.serve("one", title_item());
    transport.serve("two", title_item());
    let document = Document::new();
    document.append_cards(vec![
        movie_card("one"),
        movie_card("missing"),
        movie_card("two"),
        CardElement::movie(None).with_text_container(),
    ]);
    let orch = Orchestrator::new(document.clone(), fetcher(transport.clone()), SettingsStore::new());

    assert_eq!(orch.run_pass().await.unwrap(), 2);
    assert_eq!(transport.calls(), 3);

    let missing = document.card(document.cards_for_item("missing")[0]).unwrap();
    assert!(missing.is_marked_errored());
    assert!(!missing.has_attribute_block());
}

#[tokio::test(start_paused = true)]
async fn test_enhancer_follows_document_and_settings() {
    let transport = Arc::new(RecordingTransport::default());
    transport.serve("abc", title_item());
    transport.serve("def", title_item());
    let document = Document::new();
    document.append_card(movie_card("abc"));
    let settings = SettingsStore::with_options(scenario_options());

    let mut enhancer =
        Enhancer::start(document.clone(), fetcher(transport.clone()), settings.clone()).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(transport.calls(), 1);

    // New card picked up by the debounced pass
    document.append_card(movie_card("def"));
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(transport.calls(), 2);
    let def = document.card(document.cards_for_item("def")[0]).unwrap();
    assert!(def.has_attribute_block());

    // Settings change re-renders both cards with a forced refetch
    settings.update(|o| o.show_file_name = false);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(transport.calls(), 4);
    for item in ["abc", "def"] {
        let card = document.card(document.cards_for_item(item)[0]).unwrap();
        assert_eq!(card.text().unwrap().line(LineGroup::FileName), None);
    }

    enhancer.shutdown();
    assert!(!enhancer.is_running());
    document.append_card(movie_card("abc"));
    settings.update(|o| o.show_file_name = true);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(transport.calls(), 4);
}

#[tokio::test]
async fn test_enhancer_requires_base_url() {
    let transport = Arc::new(RecordingTransport::default());
    let fetcher = Arc::new(ItemFetcher::new(
        EnhancerConfig::default(),
        transport,
        Arc::new(StaticToken("secret".to_string())),
    ));
    let result = Enhancer::start(Document::new(), fetcher, SettingsStore::new());
    assert!(matches!(result, Err(FetchError::InvalidArgument(_))));
}
