pub mod card;
pub mod import;
pub mod store;

pub use card::{Card, CardId, Face, LanguagePair};
pub use store::CardStore;
