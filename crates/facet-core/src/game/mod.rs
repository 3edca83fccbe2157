pub mod engine;
pub mod error;
pub mod snapshot;

pub use engine::{ClickOutcome, GameEngine, play_click, validate_click};
pub use error::GameError;
pub use snapshot::GameSnapshot;
