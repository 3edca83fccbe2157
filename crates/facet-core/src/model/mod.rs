pub mod board;
pub mod history;
pub mod position;
pub mod state;
pub mod victory;
