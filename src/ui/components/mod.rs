pub mod challenge_prompt;
pub mod deck_table;
pub mod learn_card;
pub mod menu;
pub mod orbit_board;
