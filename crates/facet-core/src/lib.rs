#![deny(warnings)]
pub mod game;
pub mod model;

pub use game::{ClickOutcome, GameEngine, GameError, GameSnapshot};
pub use model::position::Position;
pub use model::state::GameState;
pub use model::victory::{Achievements, check_goals_achieved};

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "facet"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
