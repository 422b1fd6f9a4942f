pub mod blitz;
pub mod challenge;
pub mod context;
pub mod learn;
pub mod queue;
pub mod study;
pub mod timer;

pub use context::{SessionEvent, SessionSettings};
pub use queue::StudyMode;
pub use study::StudySession;
