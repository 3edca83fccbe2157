use crate::policy::Policy;
use facet_core::game::{ClickOutcome, GameEngine, GameError};
use facet_core::model::victory::Achievements;
use std::time::{Duration, Instant};

/// A click chosen by a policy and applied to an engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoPlayMove {
    pub outcome: ClickOutcome,
    /// Time the policy spent choosing the move.
    pub decision_time: Duration,
}

/// Asks `policy` for a move and clicks it on `engine`.
///
/// Fails with [`GameError::NoAvailablePositions`] when the board is full or the policy
/// declines to move.
pub fn auto_play<P>(engine: &mut GameEngine, policy: &mut P) -> Result<AutoPlayMove, GameError>
where
    P: Policy + ?Sized,
{
    if engine.is_game_over() {
        return Err(GameError::NoAvailablePositions);
    }
    let started = Instant::now();
    let choice = policy.suggest(engine.state());
    let decision_time = started.elapsed();
    let position = choice.ok_or(GameError::NoAvailablePositions)?;
    let outcome = engine.click_position(position.row, position.col)?;
    Ok(AutoPlayMove {
        outcome,
        decision_time,
    })
}

/// Drives `engine` to the end of the game and returns the final achievements.
pub fn play_out<P>(engine: &mut GameEngine, policy: &mut P) -> Result<Achievements, GameError>
where
    P: Policy + ?Sized,
{
    while !engine.is_game_over() {
        auto_play(engine, policy)?;
    }
    Ok(engine.check_goals_achieved())
}
