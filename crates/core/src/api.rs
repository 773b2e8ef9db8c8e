//! Wire shapes exchanged with the deck store.

use serde::{Deserialize, Serialize};

use crate::model::QuestionCard;

/// Code reported when a failure did not come from the server's envelope.
pub const TRANSPORT_FAILURE_CODE: i64 = 1;

/// Uniform `{code, message, data?}` envelope. `code == 0` is success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// A nonzero envelope, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: i64,
    pub message: String,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: "success".to_owned(),
            data: Some(data),
        }
    }

    #[must_use]
    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Split the envelope into its payload or the server's rejection.
    ///
    /// # Errors
    ///
    /// Returns the `Rejection` when `code` is nonzero.
    pub fn into_result(self) -> Result<Option<T>, Rejection> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(Rejection {
                code: self.code,
                message: self.message,
            })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDeck {
    #[serde(default)]
    pub cards: Vec<QuestionCard>,
}

/// Deck file body: `{"question_deck": {"cards": [...]}}`.
///
/// This is the `data` of a fetch, the `content` of an update and, bare, the
/// exported file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckContent {
    pub question_deck: QuestionDeck,
}

impl DeckContent {
    #[must_use]
    pub fn from_cards(cards: Vec<QuestionCard>) -> Self {
        Self {
            question_deck: QuestionDeck { cards },
        }
    }

    /// Content for a newly created file: one blank card.
    #[must_use]
    pub fn starter() -> Self {
        Self::from_cards(vec![QuestionCard::blank()])
    }

    #[must_use]
    pub fn cards(&self) -> &[QuestionCard] {
        &self.question_deck.cards
    }

    #[must_use]
    pub fn into_cards(self) -> Vec<QuestionCard> {
        self.question_deck.cards
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilesData {
    #[serde(default)]
    pub filenames: Vec<String>,
}

/// Body of `POST /update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub filename: String,
    pub content: DeckContent,
}

/// Body of `POST /remove`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub filename: String,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_without_data_parses() {
        let resp: ApiResponse<ListFilesData> =
            serde_json::from_str(r#"{"code":1,"message":"disk full"}"#).unwrap();
        assert!(!resp.is_success());
        assert_eq!(
            resp.into_result().unwrap_err(),
            Rejection {
                code: 1,
                message: "disk full".into()
            }
        );
    }

    #[test]
    fn success_envelope_yields_payload() {
        let resp: ApiResponse<ListFilesData> = serde_json::from_str(
            r#"{"code":0,"message":"ok","data":{"filenames":["a.json","b.json"]}}"#,
        )
        .unwrap();
        assert!(resp.is_success());
        let data = resp.into_result().unwrap().unwrap();
        assert_eq!(data.filenames, vec!["a.json", "b.json"]);
    }

    #[test]
    fn deck_content_uses_nested_shape() {
        let content = DeckContent::from_cards(vec![QuestionCard::new("Q", "A", 7)]);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"question_deck": {"cards": [{"question": "Q", "answer": "A", "due_time": 7}]}})
        );
    }

    #[test]
    fn update_request_wraps_content() {
        let body = UpdateRequest {
            filename: "deck.json".into(),
            content: DeckContent::starter(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["filename"], "deck.json");
        assert_eq!(json["content"]["question_deck"]["cards"][0]["question"], "");
    }
}
