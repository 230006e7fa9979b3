//! Loopback stand-in for the drop service.

use axum::{
    extract::Path,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Handle on a running mock. `hits` counts requests the service saw, so
/// tests can assert that validation short-circuits never reach the wire.
pub struct MockService {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockService {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn spawn(app: Router, hits: Arc<AtomicUsize>) -> MockService {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock service");
    });
    MockService {
        base_url: format!("http://{addr}"),
        hits,
    }
}

/// Upload endpoint answering every POST with a fixed status and body.
pub async fn upload_service(
    status: StatusCode,
    body: &'static str,
    content_type: &'static str,
) -> MockService {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/upload",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, [(header::CONTENT_TYPE, content_type)], body)
            }
        }),
    );
    spawn(app, hits).await
}

/// Download endpoint serving one blob for any id, with optional metadata
/// headers.
pub async fn download_service(
    disposition: Option<&'static str>,
    content_type: Option<&'static str>,
    body: &'static [u8],
) -> MockService {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/download/:id",
        get(move |Path(_id): Path<String>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut headers = HeaderMap::new();
                if let Some(value) = disposition {
                    headers.insert(header::CONTENT_DISPOSITION, value.parse().unwrap());
                }
                if let Some(value) = content_type {
                    headers.insert(header::CONTENT_TYPE, value.parse().unwrap());
                }
                (headers, body)
            }
        }),
    );
    spawn(app, hits).await
}

/// Download endpoint that knows no ids at all.
pub async fn missing_download_service() -> MockService {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/download/:id",
        get(move |Path(_id): Path<String>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::NOT_FOUND, "gone")
            }
        }),
    );
    spawn(app, hits).await
}
