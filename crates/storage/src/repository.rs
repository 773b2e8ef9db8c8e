use async_trait::async_trait;
use deck_core::api::{ApiResponse, DeckContent, Rejection, TRANSPORT_FAILURE_CODE};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Errors surfaced by deck store adapters.
///
/// Whatever goes wrong on the way (network, status, JSON, envelope) ends up
/// here; nothing escapes the gateway as a panic.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The server answered with a nonzero envelope code.
    #[error("{message}")]
    Rejected { code: i64, message: String },

    /// A success envelope that should have carried a payload did not.
    #[error("response carried no data")]
    MissingData,

    #[error("HTTP error! status: {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl StoreError {
    /// Envelope code for this failure: the server's own code when it sent
    /// one, the transport failure code otherwise.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            StoreError::Rejected { code, .. } => *code,
            _ => TRANSPORT_FAILURE_CODE,
        }
    }

    /// Render any gateway outcome as the uniform `{code, message, data?}` envelope.
    #[must_use]
    pub fn envelope<T>(result: Result<T, StoreError>) -> ApiResponse<T> {
        match result {
            Ok(data) => ApiResponse::ok(data),
            Err(err) => ApiResponse::failure(err.code(), err.to_string()),
        }
    }
}

impl From<Rejection> for StoreError {
    fn from(rejection: Rejection) -> Self {
        StoreError::Rejected {
            code: rejection.code,
            message: rejection.message,
        }
    }
}

/// The four remote operations the editor depends on, plus the raw fetch used
/// for downloads.
///
/// Every call is single-shot: no retries, no timeouts.
#[async_trait]
pub trait DeckStore: Send + Sync {
    /// List deck filenames in server order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport failure or a nonzero envelope.
    async fn list_files(&self) -> Result<Vec<String>, StoreError>;

    /// Fetch a deck through the enveloped endpoint.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingData` when the envelope is successful but
    /// empty, or other store errors.
    async fn fetch_deck(&self, filename: &str) -> Result<DeckContent, StoreError>;

    /// Fetch the bare deck body (`data_only=true`), used for exports.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport or decode failure.
    async fn fetch_deck_data_only(&self, filename: &str) -> Result<DeckContent, StoreError>;

    /// Create or overwrite a deck file with the full card list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport failure or a nonzero envelope.
    async fn upsert_deck(&self, filename: &str, content: &DeckContent) -> Result<(), StoreError>;

    /// Delete a deck file.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport failure or a nonzero envelope.
    async fn remove_file(&self, filename: &str) -> Result<(), StoreError>;
}

/// Operation names used for call recording and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Fetch,
    FetchDataOnly,
    Upsert,
    Remove,
}

#[derive(Default)]
struct MemoryState {
    files: Vec<(String, DeckContent)>,
    rejections: HashMap<StoreOp, Rejection>,
    calls: Vec<StoreOp>,
}

/// Simple in-memory deck store for testing and prototyping.
///
/// Keeps files in creation order, records every call, and can be told to
/// reject a given operation with an envelope code.
#[derive(Clone, Default)]
pub struct InMemoryDeckStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryDeckStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without recording a call.
    #[must_use]
    pub fn with_file(self, filename: impl Into<String>, content: DeckContent) -> Self {
        self.lock().files.push((filename.into(), content));
        self
    }

    /// Make every subsequent `op` fail with `code`/`message` until cleared.
    pub fn reject(&self, op: StoreOp, code: i64, message: impl Into<String>) {
        self.lock().rejections.insert(
            op,
            Rejection {
                code,
                message: message.into(),
            },
        );
    }

    pub fn clear_rejection(&self, op: StoreOp) {
        self.lock().rejections.remove(&op);
    }

    /// Operations issued so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreOp> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn filenames(&self) -> Vec<String> {
        self.lock().files.iter().map(|(name, _)| name.clone()).collect()
    }

    #[must_use]
    pub fn content(&self, filename: &str) -> Option<DeckContent> {
        self.lock()
            .files
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, content)| content.clone())
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, op: StoreOp) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        let mut guard = self.lock();
        guard.calls.push(op);
        if let Some(rejection) = guard.rejections.get(&op).cloned() {
            return Err(rejection.into());
        }
        Ok(guard)
    }
}

fn not_found(filename: &str) -> StoreError {
    StoreError::Rejected {
        code: 1,
        message: format!("file not found: {filename}"),
    }
}

#[async_trait]
impl DeckStore for InMemoryDeckStore {
    async fn list_files(&self) -> Result<Vec<String>, StoreError> {
        let guard = self.begin(StoreOp::List)?;
        Ok(guard.files.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn fetch_deck(&self, filename: &str) -> Result<DeckContent, StoreError> {
        let guard = self.begin(StoreOp::Fetch)?;
        guard
            .files
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| not_found(filename))
    }

    async fn fetch_deck_data_only(&self, filename: &str) -> Result<DeckContent, StoreError> {
        let guard = self.begin(StoreOp::FetchDataOnly)?;
        guard
            .files
            .iter()
            .find(|(name, _)| name == filename)
            .map(|(_, content)| content.clone())
            .ok_or_else(|| not_found(filename))
    }

    async fn upsert_deck(&self, filename: &str, content: &DeckContent) -> Result<(), StoreError> {
        let mut guard = self.begin(StoreOp::Upsert)?;
        match guard.files.iter_mut().find(|(name, _)| name == filename) {
            Some((_, existing)) => *existing = content.clone(),
            None => guard.files.push((filename.to_owned(), content.clone())),
        }
        Ok(())
    }

    async fn remove_file(&self, filename: &str) -> Result<(), StoreError> {
        let mut guard = self.begin(StoreOp::Remove)?;
        let before = guard.files.len();
        guard.files.retain(|(name, _)| name != filename);
        if guard.files.len() == before {
            return Err(not_found(filename));
        }
        Ok(())
    }
}

/// Deck store behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub decks: Arc<dyn DeckStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            decks: Arc::new(InMemoryDeckStore::new()),
        }
    }
}
