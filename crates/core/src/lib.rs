#![forbid(unsafe_code)]

pub mod api;
pub mod export;
pub mod gesture;
pub mod model;
pub mod store;

pub use api::{ApiResponse, DeckContent, Rejection};
pub use export::{DeckExport, ExportError};
pub use gesture::{LONG_PRESS_DELAY, PressAction, PressGesture, PressTicket};
pub use model::{CardPatch, Deck, QuestionCard, SaveSnapshot, Session};
pub use store::{ObservableStore, Subscription};
