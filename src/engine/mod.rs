pub mod filter;
pub mod narration;
pub mod normalize;
pub mod physics;
