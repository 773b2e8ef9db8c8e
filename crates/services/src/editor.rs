use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use deck_core::api::DeckContent;
use deck_core::export::DeckExport;
use deck_core::model::{CardPatch, Session};
use storage::{DeckStore, StoreError};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::error::{EditorError, Operation};
use crate::notice::Notice;

const SAVE_SUCCESS: &str = "Saved successfully";

/// Which modal the editor is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Dialog {
    #[default]
    None,
    /// Waiting for the user to confirm deleting a whole deck file.
    ConfirmDeleteFile { filename: String },
    /// Asking for the name of a new deck file.
    NewFile,
}

/// Requests currently outstanding; their controls are disabled.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pending {
    pub loading_list: bool,
    pub loading_deck: bool,
    pub saving: bool,
    pub removing: bool,
    pub downloading: bool,
}

/// Result of a file selection once its fetch resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response belonged to the current selection and was loaded.
    Applied,
    /// Another file was selected meanwhile; the response was dropped.
    Superseded,
}

/// Read-only copy of everything a view needs to render the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
    pub catalog: Vec<String>,
    pub catalog_stale: bool,
    pub selected: Option<String>,
    pub session: Session,
    pub dialog: Dialog,
    pub pending: Pending,
}

#[derive(Default)]
struct EditorState {
    catalog: Vec<String>,
    catalog_stale: bool,
    selected: Option<String>,
    selection: u64,
    catalog_epoch: u64,
    list_ticket: u64,
    applied_list: u64,
    lists_outstanding: u32,
    session: Session,
    dialog: Dialog,
    pending: Pending,
    fetch_task: Option<AbortHandle>,
    notices: Vec<Notice>,
}

impl EditorState {
    /// Point the editor at `filename` (or nothing) with a fresh session.
    ///
    /// Bumps the selection generation so any in-flight fetch is treated as
    /// stale, and aborts that fetch.
    fn reselect(&mut self, filename: Option<String>, session: Session) -> u64 {
        self.selection = self.selection.wrapping_add(1);
        if let Some(task) = self.fetch_task.take() {
            task.abort();
        }
        self.pending.loading_deck = false;
        self.selected = filename;
        self.session = session;
        self.selection
    }

    /// The set of remote files changed; list snapshots taken earlier are
    /// no longer trusted.
    fn catalog_changed(&mut self) {
        self.catalog_epoch = self.catalog_epoch.wrapping_add(1);
        self.catalog_stale = true;
    }

    fn report(&mut self, err: EditorError) -> EditorError {
        if err.is_reported() {
            warn!(error = %err, code = ?failure_code(&err), "deck editor action failed");
            self.notices.push(Notice::from(&err));
        }
        err
    }
}

/// Question-deck editing session synchronized against a remote deck store.
///
/// Local edits are applied immediately and only persisted on `save`. Methods
/// take `&self`; state sits behind a mutex that is never held across an
/// `.await`, so several requests may be outstanding at once.
pub struct DeckEditor {
    store: Arc<dyn DeckStore>,
    state: Mutex<EditorState>,
}

impl DeckEditor {
    #[must_use]
    pub fn new(store: Arc<dyn DeckStore>) -> Self {
        Self {
            store,
            state: Mutex::new(EditorState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    //
    // ─── READS ─────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn view(&self) -> EditorView {
        let state = self.lock();
        EditorView {
            catalog: state.catalog.clone(),
            catalog_stale: state.catalog_stale,
            selected: state.selected.clone(),
            session: state.session.clone(),
            dialog: state.dialog.clone(),
            pending: state.pending,
        }
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.lock().session.clone()
    }

    #[must_use]
    pub fn catalog(&self) -> Vec<String> {
        self.lock().catalog.clone()
    }

    #[must_use]
    pub fn selected_file(&self) -> Option<String> {
        self.lock().selected.clone()
    }

    #[must_use]
    pub fn dialog(&self) -> Dialog {
        self.lock().dialog.clone()
    }

    #[must_use]
    pub fn pending(&self) -> Pending {
        self.lock().pending
    }

    /// Drain queued notifications, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.lock().notices)
    }

    //
    // ─── LOCAL EDITS ───────────────────────────────────────────────────────────
    //

    pub fn edit_current(&self, patch: CardPatch) {
        self.lock().session.edit_current(patch);
    }

    /// Short press on delete.
    pub fn delete_current_card(&self) {
        self.lock().session.delete_current();
    }

    /// Short press on add.
    pub fn append_card(&self) {
        self.lock().session.insert_after_end();
    }

    pub fn move_prev(&self) {
        self.lock().session.move_prev();
    }

    pub fn move_next(&self) {
        self.lock().session.move_next();
    }

    /// Quick-jump to a card; out-of-range indices clamp.
    pub fn jump_to(&self, index: usize) {
        self.lock().session.move_to(index);
    }

    //
    // ─── DIALOGS ───────────────────────────────────────────────────────────────
    //

    /// Long press on delete: ask to delete the selected file.
    ///
    /// Returns `false` when no file is selected.
    pub fn open_delete_dialog(&self) -> bool {
        let mut state = self.lock();
        match state.selected.clone() {
            Some(filename) => {
                state.dialog = Dialog::ConfirmDeleteFile { filename };
                true
            }
            None => false,
        }
    }

    /// Long press on add: ask for a new file name.
    pub fn open_new_file_dialog(&self) {
        self.lock().dialog = Dialog::NewFile;
    }

    pub fn dismiss_dialog(&self) {
        self.lock().dialog = Dialog::None;
    }

    //
    // ─── REMOTE ACTIONS ────────────────────────────────────────────────────────
    //

    /// Initial load: fetch the catalog and open its first file.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::List` or `EditorError::Fetch` when the
    /// corresponding request fails.
    pub async fn mount(&self) -> Result<(), EditorError> {
        self.refresh_catalog().await.map(drop)
    }

    /// Re-fetch the list of deck files.
    ///
    /// On failure the previous catalog is kept. When the catalog was empty
    /// and no file is selected, the first listed file is opened.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::List` if the request fails,
    /// `EditorError::InFlight` if a refresh is already pending, or
    /// `EditorError::Fetch` if the auto-selected file cannot be loaded.
    pub async fn refresh_catalog(&self) -> Result<Vec<String>, EditorError> {
        let was_empty = {
            let state = self.lock();
            if state.pending.loading_list {
                return Err(EditorError::InFlight(Operation::List));
            }
            state.catalog.is_empty()
        };

        let catalog = self.load_catalog().await?;

        let first = {
            let state = self.lock();
            if was_empty && state.selected.is_none() {
                catalog.first().cloned()
            } else {
                None
            }
        };
        if let Some(first) = first {
            self.select_file(&first).await?;
        }
        Ok(catalog)
    }

    /// Issue list requests until one reflects every file change made so far.
    ///
    /// A snapshot requested before the latest create or delete completed is
    /// dropped and requested again. Among current snapshots the most recently
    /// requested one wins.
    async fn load_catalog(&self) -> Result<Vec<String>, EditorError> {
        loop {
            let (epoch, ticket) = {
                let mut state = self.lock();
                state.list_ticket = state.list_ticket.wrapping_add(1);
                state.lists_outstanding += 1;
                state.pending.loading_list = true;
                (state.catalog_epoch, state.list_ticket)
            };

            let result = self.store.list_files().await;

            let mut state = self.lock();
            state.lists_outstanding -= 1;
            state.pending.loading_list = state.lists_outstanding > 0;
            if state.catalog_epoch != epoch {
                debug!("catalog snapshot predates a file change, listing again");
                continue;
            }
            return match result {
                Ok(filenames) if ticket > state.applied_list => {
                    debug!(files = filenames.len(), "deck catalog refreshed");
                    state.applied_list = ticket;
                    state.catalog.clone_from(&filenames);
                    state.catalog_stale = false;
                    Ok(filenames)
                }
                Ok(_) => {
                    debug!("newer catalog already applied");
                    Ok(state.catalog.clone())
                }
                Err(err) => Err(state.report(EditorError::List(err))),
            };
        }
    }

    /// Switch to `filename`, discarding unsaved edits to the previous deck.
    ///
    /// The fetch runs as its own task. Selecting again before it resolves
    /// aborts it, and a response that still arrives for an abandoned
    /// selection is dropped rather than loaded.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::Fetch` when the deck cannot be fetched; the
    /// session then holds a single blank card.
    pub async fn select_file(&self, filename: &str) -> Result<FetchOutcome, EditorError> {
        let (generation, task) = {
            let mut state = self.lock();
            let generation = state.reselect(Some(filename.to_owned()), Session::open(filename, Vec::new()));
            let store = Arc::clone(&self.store);
            let name = filename.to_owned();
            let task = tokio::spawn(async move { store.fetch_deck(&name).await });
            state.fetch_task = Some(task.abort_handle());
            state.pending.loading_deck = true;
            (generation, task)
        };

        let result = match task.await {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => {
                debug!(filename, "deck fetch aborted by a newer selection");
                return Ok(FetchOutcome::Superseded);
            }
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        };

        let mut state = self.lock();
        if state.selection != generation {
            debug!(filename, "discarding stale deck response");
            return Ok(FetchOutcome::Superseded);
        }
        state.fetch_task = None;
        state.pending.loading_deck = false;
        match result {
            Ok(content) => {
                debug!(filename, cards = content.cards().len(), "deck loaded");
                state.session.load_deck(content.into_cards());
                Ok(FetchOutcome::Applied)
            }
            Err(err) => {
                state.session.load_deck(Vec::new());
                Err(state.report(EditorError::Fetch(err)))
            }
        }
    }

    /// Push the current card list to the store under the selected file.
    ///
    /// The cards sent are those present when `save` is called. Local edits
    /// are kept whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NoFileSelected` without a selected file,
    /// `EditorError::InFlight` while a save or the deck load is pending, or
    /// `EditorError::Save` if the store rejects the update.
    pub async fn save(&self) -> Result<(), EditorError> {
        let (snapshot, generation) = {
            let mut state = self.lock();
            if state.pending.saving {
                return Err(EditorError::InFlight(Operation::Save));
            }
            if state.pending.loading_deck {
                return Err(EditorError::InFlight(Operation::Fetch));
            }
            let Some(snapshot) = state.session.snapshot() else {
                return Err(state.report(EditorError::NoFileSelected));
            };
            state.pending.saving = true;
            (snapshot, state.selection)
        };

        let result = self
            .store
            .upsert_deck(&snapshot.filename, &snapshot.content)
            .await;

        let mut state = self.lock();
        state.pending.saving = false;
        match result {
            Ok(()) => {
                info!(
                    filename = %snapshot.filename,
                    cards = snapshot.content.cards().len(),
                    "deck saved"
                );
                if state.selection == generation {
                    state.session.mark_saved(snapshot.revision);
                }
                state.notices.push(Notice::success(SAVE_SUCCESS));
                Ok(())
            }
            Err(err) => Err(state.report(EditorError::Save(err))),
        }
    }

    /// Delete the file named in the open confirmation dialog.
    ///
    /// On success the catalog is re-fetched and its first file opened. If
    /// that refresh fails the catalog is kept but flagged stale.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NotConfirmed` without an open confirmation,
    /// `EditorError::InFlight` while a delete is pending, or
    /// `EditorError::Delete` if the store rejects it (the dialog stays open).
    pub async fn confirm_delete(&self) -> Result<(), EditorError> {
        let filename = {
            let mut state = self.lock();
            let Dialog::ConfirmDeleteFile { filename } = state.dialog.clone() else {
                return Err(EditorError::NotConfirmed);
            };
            if state.pending.removing {
                return Err(EditorError::InFlight(Operation::Delete));
            }
            state.pending.removing = true;
            filename
        };

        let result = self.store.remove_file(&filename).await;

        {
            let mut state = self.lock();
            state.pending.removing = false;
            if let Err(err) = result {
                return Err(state.report(EditorError::Delete(err)));
            }
            info!(filename = %filename, "deck file deleted");
            state.catalog_changed();
            state.dialog = Dialog::None;
            if state.selected.as_deref() == Some(filename.as_str()) {
                state.reselect(None, Session::new());
            }
        }

        self.after_catalog_change(true).await
    }

    /// Create a deck file holding one blank card and switch to it.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::EmptyFilename` for a blank name,
    /// `EditorError::InFlight` while a save or create is pending, or
    /// `EditorError::Create` if the store rejects it (the dialog stays open).
    pub async fn confirm_create(&self, filename: &str) -> Result<(), EditorError> {
        let filename = filename.trim().to_owned();
        {
            let mut state = self.lock();
            if filename.is_empty() {
                return Err(state.report(EditorError::EmptyFilename));
            }
            if state.pending.saving {
                return Err(EditorError::InFlight(Operation::Create));
            }
            state.pending.saving = true;
        }

        let content = DeckContent::starter();
        let result = self.store.upsert_deck(&filename, &content).await;

        {
            let mut state = self.lock();
            state.pending.saving = false;
            if let Err(err) = result {
                return Err(state.report(EditorError::Create(err)));
            }
            info!(filename = %filename, "deck file created");
            state.catalog_changed();
            state.dialog = Dialog::None;
            let session = Session::open(filename.as_str(), content.into_cards());
            state.reselect(Some(filename), session);
        }

        self.after_catalog_change(false).await
    }

    /// Fetch the bare deck body of the selected file for download.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::NoFileToDownload` without a selected file,
    /// `EditorError::InFlight` while a download is pending, or
    /// `EditorError::Download`/`EditorError::Export` on failure.
    pub async fn download(&self) -> Result<DeckExport, EditorError> {
        let filename = {
            let mut state = self.lock();
            let Some(filename) = state.selected.clone() else {
                return Err(state.report(EditorError::NoFileToDownload));
            };
            if state.pending.downloading {
                return Err(EditorError::InFlight(Operation::Download));
            }
            state.pending.downloading = true;
            filename
        };

        let result = self.store.fetch_deck_data_only(&filename).await;

        let mut state = self.lock();
        state.pending.downloading = false;
        let content = result.map_err(|err| state.report(EditorError::Download(err)))?;
        DeckExport::new(&filename, &content).map_err(|err| state.report(err.into()))
    }

    /// Refresh the catalog after a create or delete.
    ///
    /// Runs even while another refresh is pending, since that one's snapshot
    /// may predate the change. A failed refresh leaves the old catalog
    /// flagged stale; its notice has already been queued, and the
    /// create/delete itself succeeded.
    async fn after_catalog_change(&self, open_first: bool) -> Result<(), EditorError> {
        let catalog = match self.load_catalog().await {
            Ok(catalog) => catalog,
            Err(err) => {
                warn!(error = %err, "catalog left stale after file change");
                return Ok(());
            }
        };

        let first = {
            let state = self.lock();
            if open_first && state.selected.is_none() {
                catalog.first().cloned()
            } else {
                None
            }
        };
        if let Some(first) = first {
            self.select_file(&first).await?;
        }
        Ok(())
    }
}

/// Convenience for callers that only care about the envelope convention.
#[must_use]
pub fn failure_code(err: &EditorError) -> Option<i64> {
    let store_err: &StoreError = match err {
        EditorError::List(e)
        | EditorError::Fetch(e)
        | EditorError::Save(e)
        | EditorError::Delete(e)
        | EditorError::Create(e)
        | EditorError::Download(e) => e,
        _ => return None,
    };
    Some(store_err.code())
}
