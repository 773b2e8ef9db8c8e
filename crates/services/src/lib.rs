#![forbid(unsafe_code)]

pub mod controls;
pub mod editor;
pub mod error;
pub mod notice;
pub mod preferences;
pub mod press;

pub use controls::EditorControls;
pub use editor::{DeckEditor, Dialog, EditorView, FetchOutcome, Pending, failure_code};
pub use error::{EditorError, Operation};
pub use notice::{Notice, NoticeLevel};
pub use preferences::Preferences;
pub use press::{LongPressButton, PressHandler};
