use std::sync::Arc;
use std::time::Duration;

use deck_core::gesture::LONG_PRESS_DELAY;

use crate::editor::DeckEditor;
use crate::press::LongPressButton;

/// The two dual-purpose editor buttons.
///
/// Delete: tap removes the current card, hold asks to delete the file.
/// Add: tap appends a card, hold asks for a new file name.
pub struct EditorControls {
    pub delete: LongPressButton,
    pub add: LongPressButton,
}

impl EditorControls {
    #[must_use]
    pub fn new(editor: &Arc<DeckEditor>) -> Self {
        Self::with_delay(editor, LONG_PRESS_DELAY)
    }

    #[must_use]
    pub fn with_delay(editor: &Arc<DeckEditor>, delay: Duration) -> Self {
        let delete = {
            let tap = Arc::clone(editor);
            let hold = Arc::clone(editor);
            LongPressButton::with_delay(
                delay,
                move || tap.delete_current_card(),
                move || {
                    hold.open_delete_dialog();
                },
            )
        };
        let add = {
            let tap = Arc::clone(editor);
            let hold = Arc::clone(editor);
            LongPressButton::with_delay(
                delay,
                move || tap.append_card(),
                move || hold.open_new_file_dialog(),
            )
        };
        Self { delete, add }
    }
}
