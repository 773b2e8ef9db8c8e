use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//
// ─── CARD TYPES ────────────────────────────────────────────────────────────────
//

/// One question/answer pair as stored in a deck file.
///
/// `due_time` is a millisecond Unix timestamp owned by whatever schedules
/// reviews; the editor carries it through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionCard {
    pub question: String,
    pub answer: String,
    pub due_time: i64,
}

impl QuestionCard {
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>, due_time: i64) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            due_time,
        }
    }

    /// The placeholder card used whenever a deck would otherwise be empty.
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.question.is_empty() && self.answer.is_empty() && self.due_time == 0
    }

    /// `due_time` as a UTC timestamp, when it is set and representable.
    #[must_use]
    pub fn due_at(&self) -> Option<DateTime<Utc>> {
        if self.due_time == 0 {
            return None;
        }
        DateTime::<Utc>::from_timestamp_millis(self.due_time)
    }

    /// Merge a text patch into this card. `due_time` is never touched.
    pub fn apply(&mut self, patch: CardPatch) {
        if let Some(question) = patch.question {
            self.question = question;
        }
        if let Some(answer) = patch.answer {
            self.answer = answer;
        }
    }
}

/// Partial text update for the card under the cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardPatch {
    pub question: Option<String>,
    pub answer: Option<String>,
}

impl CardPatch {
    #[must_use]
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            question: Some(text.into()),
            answer: None,
        }
    }

    #[must_use]
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            question: None,
            answer: Some(text.into()),
        }
    }

    #[must_use]
    pub fn with_answer(mut self, text: impl Into<String>) -> Self {
        self.answer = Some(text.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.question.is_none() && self.answer.is_none()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
