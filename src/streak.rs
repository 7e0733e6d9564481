//! Daily completion streaks.
//!
//! Days are compared as calendar dates in local time, never as elapsed
//! durations. State is an owned value passed in and returned; persistence
//! is handled separately by [`StreakRepository`].

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::models::CalendarDate;
use crate::storage::KeyValueStore;

/// Key under which the streak is persisted
pub const STREAK_STATE_KEY: &str = "streak.state";

/// Persisted streak record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive days with a completed session
    pub streak_count: u32,

    /// Day of the most recent completed session, `None` before the first
    pub last_activity_date: Option<CalendarDate>,
}

/// Relation between the last activity and today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayGap {
    /// No activity recorded yet
    NoActivity,
    /// Last activity was today (or a clock-skewed future day)
    SameDay,
    /// Last activity was yesterday
    NextDay,
    /// More than one day has passed
    Broken { days: i64 },
}

impl DayGap {
    pub fn between(last: Option<CalendarDate>, today: CalendarDate) -> Self {
        let Some(last) = last else {
            return DayGap::NoActivity;
        };

        match today.signed_duration_since(last).num_days() {
            days if days <= 0 => DayGap::SameDay,
            1 => DayGap::NextDay,
            days => DayGap::Broken { days },
        }
    }
}

/// What the launch screen should show about the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakStatus {
    /// Nothing recorded yet
    None,
    /// Today's session is done
    DoneToday,
    /// Yesterday counted; a session today continues the streak
    AtRisk,
    /// The next session restarts at 1
    Broken,
}

impl StreakStatus {
    pub fn description(&self) -> &'static str {
        match self {
            StreakStatus::None => "No streak yet - complete an exercise to start one",
            StreakStatus::DoneToday => "Done for today",
            StreakStatus::AtRisk => "Exercise today to keep your streak going",
            StreakStatus::Broken => "Streak ended - your next exercise starts a new one",
        }
    }
}

/// Streak transition rules
pub struct StreakTracker;

impl StreakTracker {
    /// Launch-time recompute. Display only: every branch returns the state
    /// unchanged, a broken streak is zeroed by the next `record_activity`.
    pub fn recompute_on_launch(state: StreakState, today: CalendarDate) -> StreakState {
        let gap = DayGap::between(state.last_activity_date, today);
        tracing::debug!(?gap, streak = state.streak_count, %today, "Streak recomputed on launch");
        state
    }

    /// Apply a completed session on `today`
    pub fn record_activity(state: StreakState, today: CalendarDate) -> StreakState {
        let gap = DayGap::between(state.last_activity_date, today);
        let streak_count = match gap {
            DayGap::NoActivity | DayGap::Broken { .. } => 1,
            DayGap::NextDay => state.streak_count.saturating_add(1),
            DayGap::SameDay => state.streak_count,
        };

        if streak_count != state.streak_count {
            tracing::info!(?gap, from = state.streak_count, to = streak_count, "Streak updated");
        }

        StreakState {
            streak_count,
            last_activity_date: Some(today),
        }
    }

    /// Explicit user-initiated reset; keeps the last activity date
    pub fn reset_streak(state: StreakState) -> StreakState {
        StreakState {
            streak_count: 0,
            ..state
        }
    }

    pub fn status(state: &StreakState, today: CalendarDate) -> StreakStatus {
        match DayGap::between(state.last_activity_date, today) {
            DayGap::NoActivity => StreakStatus::None,
            DayGap::SameDay => StreakStatus::DoneToday,
            DayGap::NextDay => StreakStatus::AtRisk,
            DayGap::Broken { .. } => StreakStatus::Broken,
        }
    }
}

/// Loads and saves `StreakState` through a key-value store
pub struct StreakRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StreakRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the stored streak. Missing or unreadable records count as no
    /// prior activity.
    pub fn load(&self) -> StreakState {
        match self.store.get(STREAK_STATE_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<StreakState>(&bytes) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(error = %e, "Corrupt streak record, starting fresh");
                    StreakState::default()
                }
            },
            Ok(None) => StreakState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read streak record, starting fresh");
                StreakState::default()
            }
        }
    }

    pub fn save(&mut self, state: &StreakState) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(state).map_err(|e| StorageError::Serialization {
            key: STREAK_STATE_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.store.set(STREAK_STATE_KEY, &bytes)
    }

    /// Load, apply `record_activity` for `today`, persist, and return the result
    pub fn record_activity(&mut self, today: CalendarDate) -> Result<StreakState, StorageError> {
        let state = StreakTracker::record_activity(self.load(), today);
        self.save(&state)?;
        Ok(state)
    }

    /// Load, zero the count, persist
    pub fn reset(&mut self) -> Result<StreakState, StorageError> {
        let state = StreakTracker::reset_streak(self.load());
        self.save(&state)?;
        Ok(state)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::{Duration, NaiveDate};

    fn day(d: u32) -> CalendarDate {
        NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
    }

    fn state(streak_count: u32, last: Option<CalendarDate>) -> StreakState {
        StreakState {
            streak_count,
            last_activity_date: last,
        }
    }

    #[test]
    fn test_day_gap_classification() {
        assert_eq!(DayGap::between(None, day(10)), DayGap::NoActivity);
        assert_eq!(DayGap::between(Some(day(10)), day(10)), DayGap::SameDay);
        assert_eq!(DayGap::between(Some(day(9)), day(10)), DayGap::NextDay);
        assert_eq!(DayGap::between(Some(day(7)), day(10)), DayGap::Broken { days: 3 });
        assert_eq!(DayGap::between(Some(day(11)), day(10)), DayGap::SameDay);
    }

    #[test]
    fn test_first_activity_starts_streak() {
        let next = StreakTracker::record_activity(StreakState::default(), day(1));
        assert_eq!(next, state(1, Some(day(1))));
    }

    #[test]
    fn test_same_day_is_idempotent() {
        let first = StreakTracker::record_activity(state(4, Some(day(9))), day(10));
        let second = StreakTracker::record_activity(first, day(10));
        assert_eq!(first, second);
        assert_eq!(second.streak_count, 5);
    }

    #[test]
    fn test_consecutive_day_increments() {
        let s = StreakTracker::record_activity(StreakState::default(), day(1));
        let s = StreakTracker::record_activity(s, day(2));
        assert_eq!(s.streak_count, 2);
    }

    #[test]
    fn test_gap_resets_to_one() {
        let s = StreakTracker::record_activity(state(6, Some(day(1))), day(2));
        assert_eq!(s.streak_count, 7);
        let s = StreakTracker::record_activity(s, day(5));
        assert_eq!(s, state(1, Some(day(5))));
    }

    #[test]
    fn test_month_boundary_is_consecutive() {
        let last = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let s = StreakTracker::record_activity(state(3, Some(last)), today);
        assert_eq!(s.streak_count, 4);
    }

    #[test]
    fn test_launch_never_mutates() {
        let cases = [
            StreakState::default(),
            state(3, Some(day(10))),
            state(3, Some(day(9))),
            state(3, Some(day(2))),
        ];
        for s in cases {
            assert_eq!(StreakTracker::recompute_on_launch(s, day(10)), s);
        }
    }

    #[test]
    fn test_reset_keeps_date() {
        let s = StreakTracker::reset_streak(state(9, Some(day(4))));
        assert_eq!(s, state(0, Some(day(4))));
        let s = StreakTracker::record_activity(s, day(5));
        assert_eq!(s.streak_count, 1);
    }

    #[test]
    fn test_status() {
        assert_eq!(StreakTracker::status(&StreakState::default(), day(10)), StreakStatus::None);
        assert_eq!(StreakTracker::status(&state(2, Some(day(10))), day(10)), StreakStatus::DoneToday);
        assert_eq!(StreakTracker::status(&state(2, Some(day(9))), day(10)), StreakStatus::AtRisk);
        assert_eq!(StreakTracker::status(&state(2, Some(day(1))), day(10)), StreakStatus::Broken);
    }

    #[test]
    fn test_repository_round_trip() {
        let mut repo = StreakRepository::new(MemoryStore::new());
        assert_eq!(repo.load(), StreakState::default());

        repo.record_activity(day(1)).unwrap();
        let s = repo.record_activity(day(2)).unwrap();
        assert_eq!(s, state(2, Some(day(2))));
        assert_eq!(repo.load(), s);

        let stored = repo.store().get(STREAK_STATE_KEY).unwrap().unwrap();
        let json = String::from_utf8(stored).unwrap();
        assert!(json.contains("\"2024-09-02\""));
    }

    #[test]
    fn test_corrupt_record_treated_as_no_activity() {
        let mut store = MemoryStore::new();
        store.set(STREAK_STATE_KEY, b"{not json").unwrap();
        let mut repo = StreakRepository::new(store);
        assert_eq!(repo.load(), StreakState::default());

        let s = repo.record_activity(day(3)).unwrap();
        assert_eq!(s, state(1, Some(day(3))));
    }

    #[test]
    fn test_repository_reset() {
        let mut repo = StreakRepository::new(MemoryStore::new());
        repo.record_activity(day(1)).unwrap();
        repo.record_activity(day(2)).unwrap();
        let s = repo.reset().unwrap();
        assert_eq!(s, state(0, Some(day(2))));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_streak_never_jumps_by_more_than_one(
            offsets in prop::collection::vec(0i64..4, 1..60)
        ) {
            let mut today = day(1);
            let mut s = StreakState::default();
            for offset in offsets {
                today = today + Duration::days(offset);
                let next = StreakTracker::record_activity(s, today);
                prop_assert!(next.streak_count <= s.streak_count + 1);
                prop_assert!(next.streak_count >= 1);
                prop_assert_eq!(next.last_activity_date, Some(today));
                s = next;
            }
        }
    }
}
