use crate::model::position::{COLS, ROWS};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Inclusive success-count range required for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub min: u8,
    pub max: u8,
}

impl RowRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub const fn contains(self, count: u8) -> bool {
        self.min <= count && count <= self.max
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// One alternative victory condition: a range per row, all of which must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictoryBand {
    pub rows: [RowRange; ROWS],
}

impl VictoryBand {
    pub const fn new(row0: RowRange, row1: RowRange, row2: RowRange) -> Self {
        Self {
            rows: [row0, row1, row2],
        }
    }

    pub fn is_met(&self, success_counts: [u8; ROWS]) -> bool {
        self.rows
            .iter()
            .zip(success_counts)
            .all(|(range, count)| range.contains(count))
    }
}

const FULL: u8 = COLS as u8;

pub const VICTORY_BANDS: [VictoryBand; 4] = [
    VictoryBand::new(
        RowRange::new(10, FULL),
        RowRange::new(6, FULL),
        RowRange::new(0, 4),
    ),
    VictoryBand::new(
        RowRange::new(9, FULL),
        RowRange::new(7, FULL),
        RowRange::new(0, 4),
    ),
    VictoryBand::new(
        RowRange::new(7, FULL),
        RowRange::new(9, FULL),
        RowRange::new(0, 4),
    ),
    VictoryBand::new(
        RowRange::new(6, FULL),
        RowRange::new(10, FULL),
        RowRange::new(0, 4),
    ),
];

pub const CONDITION_COUNT: usize = VICTORY_BANDS.len();

/// Band used for the per-row display view kept for older consumers.
pub const LEGACY_BAND_INDEX: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAchievement {
    pub achieved: bool,
    pub current: u8,
    pub target: RowRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievements {
    pub all_goals: bool,
    pub victory_conditions: [bool; CONDITION_COUNT],
    pub rows: [RowAchievement; ROWS],
}

impl Achievements {
    pub fn satisfied_conditions(&self) -> impl Iterator<Item = usize> + '_ {
        self.victory_conditions
            .iter()
            .enumerate()
            .filter_map(|(idx, met)| met.then_some(idx))
    }
}

/// Evaluates every victory band against the given success counts.
pub fn check_goals_achieved(success_counts: [u8; ROWS]) -> Achievements {
    let victory_conditions = VICTORY_BANDS.map(|band| band.is_met(success_counts));
    let legacy = &VICTORY_BANDS[LEGACY_BAND_INDEX];
    let rows = std::array::from_fn(|row| {
        let target = legacy.rows[row];
        let current = success_counts[row];
        RowAchievement {
            achieved: target.contains(current),
            current,
            target,
        }
    });

    Achievements {
        all_goals: victory_conditions.iter().any(|met| *met),
        victory_conditions,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::{RowRange, check_goals_achieved};

    #[test]
    fn perfect_first_row_meets_first_band() {
        let achievements = check_goals_achieved([10, 6, 4]);
        assert!(achievements.all_goals);
        assert_eq!(achievements.victory_conditions, [true, false, false, false]);
        assert_eq!(achievements.satisfied_conditions().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn overlapping_bands_all_reported() {
        let achievements = check_goals_achieved([10, 10, 0]);
        assert_eq!(achievements.victory_conditions, [true, true, true, true]);
    }

    #[test]
    fn third_row_over_quota_loses_everything() {
        let achievements = check_goals_achieved([10, 10, 5]);
        assert!(!achievements.all_goals);
        assert!(achievements.satisfied_conditions().next().is_none());
    }

    #[test]
    fn legacy_rows_use_second_band() {
        let achievements = check_goals_achieved([8, 7, 2]);
        assert!(!achievements.rows[0].achieved);
        assert!(achievements.rows[1].achieved);
        assert!(achievements.rows[2].achieved);
        assert_eq!(achievements.rows[0].current, 8);
        assert_eq!(achievements.rows[0].target, RowRange::new(9, 10));
        assert_eq!(achievements.rows[0].target.to_string(), "9-10");
        assert_eq!(achievements.rows[2].target.to_string(), "0-4");
    }

    #[test]
    fn evaluation_is_valid_mid_game() {
        let achievements = check_goals_achieved([0, 0, 0]);
        assert!(!achievements.all_goals);
        assert!(achievements.rows[2].achieved);
    }
}
