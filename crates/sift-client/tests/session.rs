//! Client state tests against in-memory catalog and search mocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use sift_client::{
    CatalogLoader, CatalogState, ClientError, ColumnDescriptor, FieldCatalog, Result,
    SearchEndpoint, SearchResponse, SearchSession,
};
use sift_query::{FieldMetadata, FieldType, SearchRequest, SearchRequestAssembler};

// ============================================================================
// Mocks
// ============================================================================

/// Answers with one row echoing the free-text query, after a per-query delay.
#[derive(Default)]
struct MockSearch {
    calls: Mutex<Vec<Option<String>>>,
    fail: AtomicBool,
}

impl MockSearch {
    fn calls(&self) -> Vec<Option<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchEndpoint for MockSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.calls.lock().unwrap().push(request.q.clone());
        let latency = match request.q.as_deref() {
            Some("slow") => Duration::from_millis(1000),
            _ => Duration::from_millis(10),
        };
        tokio::time::sleep(latency).await;

        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(SearchResponse {
            results: vec![json!({"q": request.q})],
            columns: vec![ColumnDescriptor::new("q")],
            total: 1,
            facets: None,
        })
    }
}

struct MockCatalog {
    available: AtomicBool,
}

#[async_trait]
impl FieldCatalog for MockCatalog {
    async fn fetch_fields(&self, category: Option<&str>) -> Result<Vec<FieldMetadata>> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ClientError::Status {
                status: 502,
                body: "bad gateway".into(),
            });
        }
        let mut fields = vec![
            FieldMetadata::new("title", FieldType::String).with_category("papers"),
            FieldMetadata::new("metadata.phase", FieldType::String).with_category("trials"),
        ];
        if let Some(category) = category {
            fields.retain(|f| f.source_categories.iter().any(|c| c == category));
        }
        Ok(fields)
    }
}

fn request(q: &str) -> SearchRequest {
    SearchRequestAssembler::new()
        .query(q)
        .assemble(&Default::default(), &Default::default())
}

fn shown_query(session: &SearchSession) -> Option<serde_json::Value> {
    session.state().results.first().map(|row| row["q"].clone())
}

// ============================================================================
// Debounce
// ============================================================================

#[tokio::test(start_paused = true)]
async fn rapid_edits_send_one_request() {
    let endpoint = Arc::new(MockSearch::default());
    let session = SearchSession::new(endpoint.clone(), Duration::from_millis(300));

    for q in ["c", "ca", "can", "cancer"] {
        session.schedule(request(q));
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(endpoint.calls().is_empty());
    assert!(session.is_pending());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(endpoint.calls(), vec![Some("cancer".to_string())]);
    assert_eq!(shown_query(&session), Some(json!("cancer")));
    assert!(!session.state().is_loading());
}

#[tokio::test(start_paused = true)]
async fn cancelled_request_is_never_sent() {
    let endpoint = Arc::new(MockSearch::default());
    let session = SearchSession::new(endpoint.clone(), Duration::from_millis(300));

    session.schedule(request("cancer"));
    assert!(session.cancel_pending());
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(endpoint.calls().is_empty());
}

// ============================================================================
// Response ordering
// ============================================================================

#[tokio::test(start_paused = true)]
async fn late_response_overwrites_newer_results() {
    let endpoint = Arc::new(MockSearch::default());
    let session = SearchSession::new(endpoint.clone(), Duration::from_millis(300));

    session.schedule(request("slow"));
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(session.state().is_loading());

    // The slow request is already in flight; a new edit does not cancel it.
    session.schedule(request("fast"));
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(shown_query(&session), Some(json!("fast")));
    assert!(session.state().is_loading());

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(endpoint.calls().len(), 2);
    assert_eq!(shown_query(&session), Some(json!("slow")));
    assert!(!session.state().is_loading());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn failed_search_clears_results() {
    let endpoint = Arc::new(MockSearch::default());
    let session = SearchSession::new(endpoint.clone(), Duration::from_millis(300));

    let state = session.execute(request("cancer")).await;
    assert_eq!(state.total, 1);
    assert!(state.error.is_none());

    endpoint.fail.store(true, Ordering::SeqCst);
    let state = session.execute(request("cancer")).await;
    assert!(state.results.is_empty());
    assert!(state.columns.is_empty());
    assert_eq!(state.total, 0);
    assert_eq!(state.error.as_deref(), Some("server returned 503: unavailable"));

    endpoint.fail.store(false, Ordering::SeqCst);
    let state = session.execute(request("cancer")).await;
    assert!(state.error.is_none());
    assert_eq!(state.results.len(), 1);
}

#[tokio::test]
async fn catalog_failure_disables_filtering_until_retry() {
    let catalog = Arc::new(MockCatalog {
        available: AtomicBool::new(false),
    });
    let loader = CatalogLoader::new(catalog.clone());
    assert_eq!(loader.state(), CatalogState::Idle);

    let state = loader.load().await;
    assert!(!state.filtering_enabled());
    assert_eq!(state.fields().count(), 0);
    assert_eq!(state.error(), Some("server returned 502: bad gateway"));

    catalog.available.store(true, Ordering::SeqCst);
    let state = loader.retry().await;
    assert!(state.filtering_enabled());
    assert_eq!(state.fields().count(), 2);
    assert_eq!(loader.state(), state);
}

#[tokio::test]
async fn catalog_category_scope() {
    let catalog = Arc::new(MockCatalog {
        available: AtomicBool::new(true),
    });
    let loader = CatalogLoader::new(catalog).with_category("trials");
    let state = loader.load().await;
    let names: Vec<_> = state.fields().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["metadata.phase"]);
}
