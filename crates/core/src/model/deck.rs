use crate::model::card::{CardPatch, QuestionCard};

//
// ─── DECK ──────────────────────────────────────────────────────────────────────
//

/// An ordered, never-empty list of cards.
///
/// Array order is display order and persistence order. Any operation that
/// would leave the deck empty puts a single blank card back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<QuestionCard>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::blank()
    }
}

impl Deck {
    /// A deck holding one blank card.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            cards: vec![QuestionCard::blank()],
        }
    }

    /// Build a deck from received cards, normalizing an empty list.
    #[must_use]
    pub fn from_cards(cards: Vec<QuestionCard>) -> Self {
        if cards.is_empty() {
            return Self::blank();
        }
        Self { cards }
    }

    #[must_use]
    pub fn cards(&self) -> &[QuestionCard] {
        &self.cards
    }

    #[must_use]
    pub fn into_cards(self) -> Vec<QuestionCard> {
        self.cards
    }

    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn last_index(&self) -> usize {
        self.cards.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&QuestionCard> {
        self.cards.get(index)
    }

    /// True when the deck is exactly the normalized placeholder.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.cards.len() == 1 && self.cards[0].is_blank()
    }

    pub(crate) fn patch(&mut self, index: usize, patch: CardPatch) -> bool {
        match self.cards.get_mut(index) {
            Some(card) => {
                card.apply(patch);
                true
            }
            None => false,
        }
    }

    /// Remove the card at `index`, refilling with a blank card if needed.
    ///
    /// Returns `false` when nothing changed.
    pub(crate) fn remove(&mut self, index: usize) -> bool {
        if index >= self.cards.len() || self.is_placeholder() {
            return false;
        }
        self.cards.remove(index);
        if self.cards.is_empty() {
            self.cards.push(QuestionCard::blank());
        }
        true
    }

    /// Append a blank card and return its index.
    pub(crate) fn push_blank(&mut self) -> usize {
        self.cards.push(QuestionCard::blank());
        self.last_index()
    }
}

impl From<Vec<QuestionCard>> for Deck {
    fn from(cards: Vec<QuestionCard>) -> Self {
        Self::from_cards(cards)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
