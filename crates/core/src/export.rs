//! Downloadable deck files.

use thiserror::Error;

use crate::api::DeckContent;

const JSON_SUFFIX: &str = ".json";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error("deck file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A deck ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckExport {
    pub file_name: String,
    pub contents: String,
}

impl DeckExport {
    /// Render `content` for the deck stored under `filename`.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Json` if serialization fails.
    pub fn new(filename: &str, content: &DeckContent) -> Result<Self, ExportError> {
        Ok(Self {
            file_name: export_file_name(filename),
            contents: encode(content)?,
        })
    }
}

/// Download name for a deck: the store filename, `.json` appended if absent.
#[must_use]
pub fn export_file_name(filename: &str) -> String {
    if filename.ends_with(JSON_SUFFIX) {
        filename.to_owned()
    } else {
        format!("{filename}{JSON_SUFFIX}")
    }
}

/// Pretty-print a deck body with two-space indentation.
///
/// # Errors
///
/// Returns `ExportError::Json` if serialization fails.
pub fn encode(content: &DeckContent) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(content)?)
}

/// Parse an exported deck file.
///
/// # Errors
///
/// Returns `ExportError::Json` for malformed input.
pub fn decode(raw: &str) -> Result<DeckContent, ExportError> {
    Ok(serde_json::from_str(raw)?)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionCard;
    use proptest::prelude::*;

    #[test]
    fn appends_json_suffix_once() {
        assert_eq!(export_file_name("verbs"), "verbs.json");
        assert_eq!(export_file_name("verbs.json"), "verbs.json");
        assert_eq!(export_file_name("verbs.json.bak"), "verbs.json.bak.json");
    }

    #[test]
    fn encodes_with_two_space_indent() {
        let content = DeckContent::from_cards(vec![QuestionCard::new("Q", "A", 1)]);
        let text = encode(&content).unwrap();
        let expected = "{\n  \"question_deck\": {\n    \"cards\": [\n      {\n        \"question\": \"Q\",\n        \"answer\": \"A\",\n        \"due_time\": 1\n      }\n    ]\n  }\n}";
        assert_eq!(text, expected);
    }

    #[test]
    fn decode_restores_cards_in_order_with_exact_due_times() {
        let cards = vec![
            QuestionCard::new("zwei", "two", 1_735_689_600_001),
            QuestionCard::new("eins", "one", i64::MAX),
            QuestionCard::new("", "", 0),
        ];
        let export = DeckExport::new("german", &DeckContent::from_cards(cards.clone())).unwrap();

        assert_eq!(export.file_name, "german.json");
        assert_eq!(decode(&export.contents).unwrap().into_cards(), cards);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode("{\"cards\":"), Err(ExportError::Json(_))));
    }

    fn card() -> impl Strategy<Value = QuestionCard> {
        (".*", ".*", any::<i64>())
            .prop_map(|(question, answer, due_time)| QuestionCard::new(question, answer, due_time))
    }

    proptest! {
        #[test]
        fn export_round_trips_any_deck(cards in proptest::collection::vec(card(), 0..24)) {
            let content = DeckContent::from_cards(cards);
            let text = encode(&content).unwrap();
            prop_assert_eq!(decode(&text).unwrap(), content);
        }
    }
}
