use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use deck_core::api::{ApiResponse, DeckContent, ListFilesData, RemoveRequest, UpdateRequest};
use deck_core::model::QuestionCard;
use serde::Deserialize;
use storage::{DeckStore, HttpDeckStore, InMemoryDeckStore, StoreConfig, StoreError, StoreOp};
use tokio::net::TcpListener;

#[derive(Deserialize)]
struct ContentQuery {
    data_only: bool,
}

async fn list(State(store): State<InMemoryDeckStore>) -> Json<ApiResponse<ListFilesData>> {
    let result = store
        .list_files()
        .await
        .map(|filenames| ListFilesData { filenames });
    Json(StoreError::envelope(result))
}

async fn content(
    State(store): State<InMemoryDeckStore>,
    Path(filename): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Response {
    if query.data_only {
        return match store.fetch_deck_data_only(&filename).await {
            Ok(content) => Json(content).into_response(),
            Err(_) => StatusCode::NOT_FOUND.into_response(),
        };
    }
    Json(StoreError::envelope(store.fetch_deck(&filename).await)).into_response()
}

async fn update(
    State(store): State<InMemoryDeckStore>,
    Json(body): Json<UpdateRequest>,
) -> Json<ApiResponse<()>> {
    Json(StoreError::envelope(
        store.upsert_deck(&body.filename, &body.content).await,
    ))
}

async fn remove(
    State(store): State<InMemoryDeckStore>,
    Json(body): Json<RemoveRequest>,
) -> Json<ApiResponse<()>> {
    Json(StoreError::envelope(store.remove_file(&body.filename).await))
}

/// Serve `store` under `/api`; `/garbled/*` answers non-JSON and anything
/// else answers 503.
async fn serve(store: InMemoryDeckStore) -> String {
    let api = Router::new()
        .route("/list", get(list))
        .route("/getContentByName/{filename}", get(content))
        .route("/update", post(update))
        .route("/remove", post(remove));
    let app = Router::new()
        .nest("/api", api)
        .route("/garbled/list", get(|| async { "<html>oops</html>" }))
        .fallback(|| async { StatusCode::SERVICE_UNAVAILABLE })
        .with_state(store);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn gateway(base: &str, prefix: &str) -> HttpDeckStore {
    HttpDeckStore::new(StoreConfig::new(&format!("{base}/{prefix}")).unwrap())
}

fn deck(cards: &[(&str, &str, i64)]) -> DeckContent {
    DeckContent::from_cards(
        cards
            .iter()
            .map(|(q, a, due)| QuestionCard::new(*q, *a, *due))
            .collect(),
    )
}

#[tokio::test]
async fn lists_fetches_updates_and_removes_over_http() {
    let remote = InMemoryDeckStore::new()
        .with_file("verbs.json", deck(&[("gehen", "to go", 1_700_000_000_000)]))
        .with_file("nouns.json", deck(&[]));
    let base = serve(remote.clone()).await;
    let store = gateway(&base, "api");

    assert_eq!(
        store.list_files().await.unwrap(),
        vec!["verbs.json", "nouns.json"]
    );

    let fetched = store.fetch_deck("verbs.json").await.unwrap();
    assert_eq!(
        fetched.cards(),
        &[QuestionCard::new("gehen", "to go", 1_700_000_000_000)]
    );

    let edited = deck(&[("gehen", "to walk", 1_700_000_000_000), ("sein", "to be", 0)]);
    store.upsert_deck("verbs.json", &edited).await.unwrap();
    assert_eq!(remote.content("verbs.json").unwrap(), edited);

    store.remove_file("nouns.json").await.unwrap();
    assert_eq!(store.list_files().await.unwrap(), vec!["verbs.json"]);
}

#[tokio::test]
async fn filenames_with_spaces_survive_the_path() {
    let remote = InMemoryDeckStore::new().with_file("my deck.json", deck(&[("Q", "A", 3)]));
    let base = serve(remote).await;
    let store = gateway(&base, "api");

    let fetched = store.fetch_deck("my deck.json").await.unwrap();
    assert_eq!(fetched.cards()[0].due_time, 3);
}

#[tokio::test]
async fn nonzero_envelope_becomes_rejection() {
    let remote = InMemoryDeckStore::new().with_file("a.json", deck(&[("Q", "A", 0)]));
    remote.reject(StoreOp::Upsert, 1, "disk full");
    let base = serve(remote.clone()).await;
    let store = gateway(&base, "api");

    let err = store
        .upsert_deck("a.json", &deck(&[("changed", "", 0)]))
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Rejected { code: 1, .. }));
    assert_eq!(err.to_string(), "disk full");
    assert_eq!(remote.content("a.json").unwrap(), deck(&[("Q", "A", 0)]));
}

#[tokio::test]
async fn missing_file_fetch_is_rejected_not_panicking() {
    let base = serve(InMemoryDeckStore::new()).await;
    let store = gateway(&base, "api");

    let err = store.fetch_deck("ghost.json").await.unwrap_err();
    assert_eq!(err.code(), 1);
    assert_eq!(err.to_string(), "file not found: ghost.json");
}

#[tokio::test]
async fn non_success_status_is_folded_into_transport_code() {
    let base = serve(InMemoryDeckStore::new()).await;
    let store = gateway(&base, "down");

    let err = store.list_files().await.unwrap_err();
    assert!(matches!(err, StoreError::HttpStatus(status) if status.as_u16() == 503));
    assert_eq!(err.code(), 1);
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let base = serve(InMemoryDeckStore::new()).await;
    let store = gateway(&base, "garbled");

    let err = store.list_files().await.unwrap_err();
    assert!(matches!(err, StoreError::Decode(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let store = HttpDeckStore::new(StoreConfig::new(&format!("http://{addr}/api")).unwrap());

    let err = store.list_files().await.unwrap_err();
    assert!(matches!(err, StoreError::Http(_)));
    assert_eq!(err.code(), 1);
}

#[tokio::test]
async fn data_only_fetch_returns_bare_body() {
    let cards = deck(&[("Q1", "A1", 10), ("Q2", "A2", 20)]);
    let remote = InMemoryDeckStore::new().with_file("deck", cards.clone());
    let base = serve(remote).await;
    let store = gateway(&base, "api");

    assert_eq!(store.fetch_deck_data_only("deck").await.unwrap(), cards);

    let err = store.fetch_deck_data_only("missing").await.unwrap_err();
    assert!(matches!(err, StoreError::HttpStatus(status) if status.as_u16() == 404));
}
