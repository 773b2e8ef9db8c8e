mod card;
mod deck;
mod preferences;
mod session;

pub use card::{CardPatch, QuestionCard};
pub use deck::Deck;
pub use preferences::{LOCALE_KEY, Locale, PreferenceError, THEME_KEY, Theme};
pub use session::{SaveSnapshot, Session};
