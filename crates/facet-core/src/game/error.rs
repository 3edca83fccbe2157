use crate::model::position::Position;
use thiserror::Error;

/// Recoverable rule violations reported by the engine and its consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("cell {0} has already been revealed")]
    AlreadyClicked(Position),
    #[error("cell {position} is out of order; reveal {expected} first")]
    OutOfOrder {
        position: Position,
        expected: Position,
    },
    #[error("no move left to undo")]
    EmptyHistory,
    #[error("the board has no available positions")]
    NoAvailablePositions,
}
