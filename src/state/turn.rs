//! Turn rotation and per-turn time allowance policy for one question.

use thiserror::Error;

use crate::dao::models::{AnswerTimesEntity, GameSettingsEntity};

/// Seconds granted on the first turn when no settings exist at all.
pub const DEFAULT_FIRST_ANSWER_SECS: u32 = 30;
/// Seconds granted on later turns when no settings exist at all.
pub const DEFAULT_SECOND_ANSWER_SECS: u32 = 15;

/// Answer time allowances for a game, one slot per turn in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerTimes {
    /// Seconds for the first turn on a question.
    pub first: u32,
    /// Seconds for the second turn and any unconfigured later slot.
    pub second: u32,
    /// Optional override for the third turn slot.
    pub third: Option<u32>,
    /// Optional override for the fourth turn slot.
    pub fourth: Option<u32>,
}

impl AnswerTimes {
    /// Hardcoded fallback used when no settings are available at all.
    pub fn fallback() -> Self {
        Self {
            first: DEFAULT_FIRST_ANSWER_SECS,
            second: DEFAULT_SECOND_ANSWER_SECS,
            third: None,
            fourth: None,
        }
    }

    /// Defaults taken from stored game settings.
    pub fn from_settings(settings: &GameSettingsEntity) -> Self {
        Self {
            first: settings.default_first_answer_time,
            second: settings.default_second_answer_time,
            third: settings.default_third_answer_time,
            fourth: settings.default_fourth_answer_time,
        }
    }
}

impl Default for AnswerTimes {
    fn default() -> Self {
        Self::fallback()
    }
}

impl From<AnswerTimesEntity> for AnswerTimes {
    fn from(value: AnswerTimesEntity) -> Self {
        Self {
            first: value.first,
            second: value.second,
            third: value.third,
            fourth: value.fourth,
        }
    }
}

impl From<AnswerTimes> for AnswerTimesEntity {
    fn from(value: AnswerTimes) -> Self {
        Self {
            first: value.first,
            second: value.second,
            third: value.third,
            fourth: value.fourth,
        }
    }
}

/// Time allowance for the turn with the given counter value.
///
/// `turn_counter % 4` selects among the up to four configured durations;
/// unconfigured third/fourth slots fall back to the second-answer time.
pub fn duration_for_turn(turn_counter: u32, times: &AnswerTimes) -> u32 {
    match turn_counter % 4 {
        0 => times.first,
        1 => times.second,
        2 => times.third.unwrap_or(times.second),
        _ => times.fourth.unwrap_or(times.second),
    }
}

/// Error returned when an advance is requested while another is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a turn advance is already in flight")]
pub struct AdvanceInFlight;

/// A validated advance that has not been applied yet.
///
/// The plan is created before the new team index is persisted and committed
/// once persistence settles, so concurrent advance attempts in between are
/// rejected instead of double-incrementing the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvancePlan {
    /// Turn counter value after applying this advance.
    pub turn_counter: u32,
    /// Active team index after applying this advance.
    pub team_index: usize,
}

/// Snapshot of the turn state plus the allowance for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSnapshot {
    /// Zero-based count of turns taken on the current question.
    pub turn_counter: u32,
    /// Index of the active team.
    pub team_index: usize,
    /// Seconds the active team has for this turn.
    pub duration: u32,
}

/// Owns which team is active for the current question and the per-turn
/// duration policy. Scoped to one question view; a fresh scheduler is built
/// every time a question opens.
#[derive(Debug, Clone)]
pub struct TurnScheduler {
    team_count: usize,
    current_team_index: usize,
    turn_counter: u32,
    times: AnswerTimes,
    pending: Option<AdvancePlan>,
}

impl TurnScheduler {
    /// Create a scheduler for `team_count` teams starting at the game's
    /// durable team pointer. An out-of-range pointer wraps into range.
    pub fn new(team_count: usize, starting_team: usize, times: AnswerTimes) -> Self {
        let team_count = team_count.max(1);
        Self {
            team_count,
            current_team_index: starting_team % team_count,
            turn_counter: 0,
            times,
            pending: None,
        }
    }

    /// Index of the team whose turn is active.
    pub fn current_team_index(&self) -> usize {
        self.current_team_index
    }

    /// Number of teams in the rotation.
    pub fn team_count(&self) -> usize {
        self.team_count
    }

    /// Zero-based count of turns taken on the current question.
    pub fn turn_counter(&self) -> u32 {
        self.turn_counter
    }

    /// Time allowance for the current turn.
    pub fn current_duration(&self) -> u32 {
        duration_for_turn(self.turn_counter, &self.times)
    }

    /// Plan an advance to the next team, rejecting the call when another
    /// advance is already in flight.
    pub fn plan_advance(&mut self) -> Result<AdvancePlan, AdvanceInFlight> {
        if self.pending.is_some() {
            return Err(AdvanceInFlight);
        }

        let plan = AdvancePlan {
            turn_counter: self.turn_counter + 1,
            team_index: (self.current_team_index + 1) % self.team_count,
        };
        self.pending = Some(plan);
        Ok(plan)
    }

    /// Apply a planned advance. Plans that are no longer pending (the session
    /// moved on) are ignored.
    pub fn commit_advance(&mut self, plan: AdvancePlan) -> TurnSnapshot {
        if self.pending == Some(plan) {
            self.turn_counter = plan.turn_counter;
            self.current_team_index = plan.team_index;
            self.pending = None;
        }
        self.snapshot()
    }

    /// Discard the pending advance, if any.
    pub fn abort_advance(&mut self) {
        self.pending = None;
    }

    /// Current turn state.
    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            turn_counter: self.turn_counter,
            team_index: self.current_team_index,
            duration: self.current_duration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance(scheduler: &mut TurnScheduler) -> TurnSnapshot {
        let plan = scheduler.plan_advance().unwrap();
        scheduler.commit_advance(plan)
    }

    #[test]
    fn rotation_returns_to_the_start_after_team_count_advances() {
        for team_count in 2..=6 {
            let mut scheduler = TurnScheduler::new(team_count, 0, AnswerTimes::fallback());
            for _ in 0..team_count {
                advance(&mut scheduler);
            }
            assert_eq!(scheduler.current_team_index(), 0);
            assert_eq!(scheduler.turn_counter(), team_count as u32);
        }
    }

    #[test]
    fn starting_team_out_of_range_wraps_into_range() {
        let scheduler = TurnScheduler::new(3, 7, AnswerTimes::fallback());
        assert_eq!(scheduler.current_team_index(), 1);
    }

    #[test]
    fn concurrent_advance_is_rejected_until_commit() {
        let mut scheduler = TurnScheduler::new(2, 0, AnswerTimes::fallback());

        let plan = scheduler.plan_advance().unwrap();
        assert_eq!(scheduler.plan_advance(), Err(AdvanceInFlight));

        let snapshot = scheduler.commit_advance(plan);
        assert_eq!(snapshot.team_index, 1);
        assert_eq!(snapshot.turn_counter, 1);

        // Once committed, the next advance can be planned again.
        assert!(scheduler.plan_advance().is_ok());
    }

    #[test]
    fn aborted_plan_leaves_the_rotation_unchanged() {
        let mut scheduler = TurnScheduler::new(2, 0, AnswerTimes::fallback());
        let plan = scheduler.plan_advance().unwrap();
        scheduler.abort_advance();

        assert_eq!(scheduler.current_team_index(), 0);
        assert_eq!(scheduler.turn_counter(), 0);
        // A stale commit after the abort is ignored.
        let snapshot = scheduler.commit_advance(plan);
        assert_eq!(snapshot.team_index, 0);
        assert_eq!(snapshot.turn_counter, 0);
    }

    #[test]
    fn duration_policy_rotates_over_four_slots() {
        let times = AnswerTimes {
            first: 30,
            second: 15,
            third: Some(30),
            fourth: Some(15),
        };
        let observed = (0..6)
            .map(|turn| duration_for_turn(turn, &times))
            .collect::<Vec<_>>();
        assert_eq!(observed, vec![30, 15, 30, 15, 30, 15]);
    }

    #[test]
    fn unconfigured_slots_fall_back_to_the_second_time() {
        let times = AnswerTimes {
            first: 45,
            second: 20,
            third: None,
            fourth: None,
        };
        assert_eq!(duration_for_turn(2, &times), 20);
        assert_eq!(duration_for_turn(3, &times), 20);
        assert_eq!(duration_for_turn(4, &times), 45);
    }

    #[test]
    fn fallback_times_are_thirty_and_fifteen() {
        let times = AnswerTimes::fallback();
        assert_eq!(duration_for_turn(0, &times), 30);
        assert_eq!(duration_for_turn(1, &times), 15);
    }
}
