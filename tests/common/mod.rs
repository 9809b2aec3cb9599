#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use curator::{Article, FallbackStore, Gateway, Latency, store::RedbBackend};
use tempfile::TempDir;
use tokio::{net::TcpListener, task::JoinHandle};
use url::Url;

#[derive(Clone, Default)]
struct Shared {
    articles: Arc<Mutex<Vec<Article>>>,
    failing: Arc<AtomicBool>,
}

/// A mock archive API on a random port.
pub struct MockArchive {
    shared: Shared,
    base: Url,
    handle: JoinHandle<()>,
}

impl MockArchive {
    pub async fn start(articles: Vec<Article>) -> Self {
        let shared = Shared {
            articles: Arc::new(Mutex::new(articles)),
            failing: Arc::default(),
        };
        let app = Router::new()
            .route("/blogs", get(list).post(create))
            .route("/blogs/{id}", get(show))
            .with_state(shared.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind mock archive");
        let base = Url::parse(&format!(
            "http://{}",
            listener.local_addr().expect("Mock archive has no address")
        ))
        .expect("Mock archive address is a valid URL");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock archive stopped");
        });

        Self {
            shared,
            base,
            handle,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Articles currently held by the mock.
    pub fn articles(&self) -> Vec<Article> {
        self.shared.articles.lock().unwrap().clone()
    }

    /// Make every endpoint answer 500.
    pub fn set_failing(&self, failing: bool) {
        self.shared.failing.store(failing, Ordering::SeqCst);
    }
}

impl Drop for MockArchive {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn list(State(shared): State<Shared>) -> Result<Json<Vec<Article>>, StatusCode> {
    if shared.failing.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(shared.articles.lock().unwrap().clone()))
}

async fn show(
    State(shared): State<Shared>,
    Path(id): Path<String>,
) -> Result<Json<Article>, StatusCode> {
    if shared.failing.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    shared
        .articles
        .lock()
        .unwrap()
        .iter()
        .find(|article| article.id.as_text() == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create(
    State(shared): State<Shared>,
    Json(article): Json<Article>,
) -> Result<(StatusCode, Json<Article>), StatusCode> {
    if shared.failing.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    shared.articles.lock().unwrap().insert(0, article.clone());
    Ok((StatusCode::CREATED, Json(article)))
}

/// An address nothing listens on.
pub async fn unreachable_base() -> Url {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Probe listener has no address");
    drop(listener);
    Url::parse(&format!("http://{addr}")).expect("Probe address is a valid URL")
}

/// A redb snapshot file inside a temporary directory.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn path(&self) -> std::path::PathBuf {
        self.dir.path().join("archive.redb")
    }

    /// Open the snapshot store. Only one store may be open at a time.
    pub fn store(&self) -> FallbackStore {
        FallbackStore::new(RedbBackend::open(self.path()).expect("Failed to open redb"))
    }
}

/// Gateway without simulated latency.
pub fn gateway(base: Url, store: FallbackStore) -> Gateway {
    Gateway::new(base, store).with_latency(Latency::NONE)
}
