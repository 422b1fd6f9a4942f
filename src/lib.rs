//! Core of the cardorbit flashcard trainer: the deck, session queue and mode
//! machines, orbit physics and persistence. The terminal front end lives in
//! the binary.

pub mod config;
pub mod deck;
pub mod engine;
pub mod session;
pub mod store;
