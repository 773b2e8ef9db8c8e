use crate::api::DeckContent;
use crate::model::card::{CardPatch, QuestionCard};
use crate::model::deck::Deck;

/// In-memory editing state for exactly one deck file.
///
/// All operations are synchronous and total: out-of-range moves clamp and
/// deletions never empty the deck. Nothing here performs I/O.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    filename: Option<String>,
    deck: Deck,
    cursor: usize,
    revision: u64,
    saved_revision: u64,
}

/// Payload captured for a Save: the deck as it was when Save was pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSnapshot {
    pub filename: String,
    pub content: DeckContent,
    pub revision: u64,
}

impl Session {
    /// An empty session: no file, one blank card.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session for `filename` holding the given cards.
    #[must_use]
    pub fn open(filename: impl Into<String>, cards: Vec<QuestionCard>) -> Self {
        let mut session = Self {
            filename: Some(filename.into()),
            ..Self::default()
        };
        session.load_deck(cards);
        session
    }

    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn cards(&self) -> &[QuestionCard] {
        self.deck.cards()
    }

    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn current(&self) -> &QuestionCard {
        &self.deck.cards()[self.cursor]
    }

    /// `"3/10"` style position indicator.
    #[must_use]
    pub fn progress_label(&self) -> String {
        let total = self.deck.len();
        format!("{}/{}", (self.cursor + 1).min(total), total)
    }

    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Replace the deck with freshly received cards and rewind the cursor.
    pub fn load_deck(&mut self, cards: Vec<QuestionCard>) {
        self.deck = Deck::from_cards(cards);
        self.cursor = 0;
        self.touch();
        self.saved_revision = self.revision;
    }

    /// Merge `patch` into the card under the cursor.
    pub fn edit_current(&mut self, patch: CardPatch) {
        if patch.is_empty() {
            return;
        }
        if self.deck.patch(self.cursor, patch) {
            self.touch();
        }
    }

    /// Remove the card under the cursor, keeping at least one card.
    pub fn delete_current(&mut self) {
        if self.deck.remove(self.cursor) {
            self.cursor = self.cursor.min(self.deck.last_index());
            self.touch();
        }
    }

    /// Append a blank card at the tail and move onto it.
    pub fn insert_after_end(&mut self) {
        self.cursor = self.deck.push_blank();
        self.touch();
    }

    /// Jump to `index`, clamped to the deck bounds.
    pub fn move_to(&mut self, index: usize) {
        self.cursor = index.min(self.deck.last_index());
    }

    pub fn move_prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_next(&mut self) {
        self.move_to(self.cursor.saturating_add(1));
    }

    /// Capture what a Save would send, or `None` without a selected file.
    #[must_use]
    pub fn snapshot(&self) -> Option<SaveSnapshot> {
        let filename = self.filename.clone()?;
        Some(SaveSnapshot {
            filename,
            content: DeckContent::from_cards(self.deck.cards().to_vec()),
            revision: self.revision,
        })
    }

    /// Record that `revision` reached the store.
    ///
    /// Later edits stay unsaved; an older revision never regresses the mark.
    pub fn mark_saved(&mut self, revision: u64) {
        if revision > self.saved_revision && revision <= self.revision {
            self.saved_revision = revision;
        }
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
