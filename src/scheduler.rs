// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The SM-2 review scheduler.
//!
//! Given a card's current scheduling state and a new rating, computes the
//! next state. Pure: no I/O and no clock access.

use crate::types::rating::Rating;
use crate::types::scheduling::MIN_EASE;
use crate::types::scheduling::SchedulingState;
use crate::types::timestamp::Timestamp;

/// The interval after the first successful review, in days.
const FIRST_INTERVAL: u32 = 1;

/// The interval after the second consecutive successful review, in days.
const SECOND_INTERVAL: u32 = 6;

/// The interval after a failed review, in days.
const RELEARN_INTERVAL: u32 = 1;

/// Compute the state that follows reviewing a card in state `current` with
/// the given `rating` at `reviewed_at`.
///
/// The running aggregates (`total_reviews`, `success_rate`) are carried over
/// unchanged: they depend on the review log, which the store owns.
pub fn next_state(
    current: &SchedulingState,
    rating: Rating,
    reviewed_at: Timestamp,
) -> SchedulingState {
    let easiness_factor = new_ease(current.easiness_factor, rating);
    let (interval, repetitions) = if rating.is_success() {
        let interval = match current.repetitions {
            0 => FIRST_INTERVAL,
            1 => SECOND_INTERVAL,
            _ => grow_interval(current.interval, easiness_factor),
        };
        (interval, current.repetitions + 1)
    } else {
        (RELEARN_INTERVAL, 0)
    };
    SchedulingState {
        easiness_factor,
        interval,
        repetitions,
        last_reviewed_at: Some(reviewed_at),
        ..current.clone()
    }
}

/// The updated ease factor.
fn new_ease(ef: f64, rating: Rating) -> f64 {
    let q = f64::from(rating.value());
    let ef = if rating.is_success() {
        let d = 5.0 - q;
        ef + (0.1 - d * (0.08 + d * 0.02))
    } else {
        ef - 0.8 + 0.28 * q - 0.02 * q * q
    };
    ef.max(MIN_EASE)
}

/// Multiply the interval by the (already updated) ease factor, truncating to
/// whole days. Saturates at `u32::MAX`.
fn grow_interval(interval: u32, ef: f64) -> u32 {
    (f64::from(interval) * ef).trunc() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::scheduling::INITIAL_EASE;

    const EPSILON: f64 = 1e-9;

    fn at(day: u32) -> Fallible<Timestamp> {
        Ok(Timestamp::parse("2025-06-13T09:00:00Z")?.plus_days(day))
    }

    fn review_all(ratings: &[u8]) -> Fallible<Vec<SchedulingState>> {
        let mut state = SchedulingState::new();
        let mut states = Vec::new();
        for (day, rating) in ratings.iter().enumerate() {
            state = next_state(&state, Rating::new(*rating)?, at(day as u32)?);
            states.push(state.clone());
        }
        Ok(states)
    }

    #[test]
    fn test_three_perfect_reviews() -> Fallible<()> {
        let states = review_all(&[5, 5, 5])?;
        assert!((states[0].easiness_factor - 2.6).abs() < EPSILON);
        assert!((states[1].easiness_factor - 2.7).abs() < EPSILON);
        assert!((states[2].easiness_factor - 2.8).abs() < EPSILON);
        assert_eq!(states[0].interval, 1);
        assert_eq!(states[1].interval, 6);
        let expected = (6.0 * states[2].easiness_factor).floor() as u32;
        assert_eq!(states[2].interval, expected);
        assert_eq!(states[2].interval, 16);
        assert_eq!(states[2].repetitions, 3);
        Ok(())
    }

    #[test]
    fn test_three_failures() -> Fallible<()> {
        let states = review_all(&[2, 1, 2])?;
        for state in &states {
            assert_eq!(state.interval, 1);
            assert_eq!(state.repetitions, 0);
        }
        assert!((states[0].easiness_factor - 2.18).abs() < EPSILON);
        assert!((states[1].easiness_factor - 1.64).abs() < EPSILON);
        assert!((states[2].easiness_factor - 1.32).abs() < EPSILON);
        Ok(())
    }

    #[test]
    fn test_ease_floor() -> Fallible<()> {
        let states = review_all(&[1, 1, 1, 1, 1, 2, 3, 1])?;
        for state in &states {
            assert!(state.easiness_factor >= MIN_EASE);
        }
        assert_eq!(states[2].easiness_factor, MIN_EASE);
        Ok(())
    }

    #[test]
    fn test_failure_resets_streak() -> Fallible<()> {
        let current = SchedulingState {
            easiness_factor: 2.9,
            interval: 40,
            repetitions: 7,
            ..SchedulingState::new()
        };
        for rating in 1..=2 {
            let next = next_state(&current, Rating::new(rating)?, at(0)?);
            assert_eq!(next.interval, 1);
            assert_eq!(next.repetitions, 0);
        }
        Ok(())
    }

    #[test]
    fn test_rating_three_is_success() -> Fallible<()> {
        let next = next_state(&SchedulingState::new(), Rating::new(3)?, at(0)?);
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.interval, 1);
        // 2.5 + (0.1 - 2 * (0.08 + 2 * 0.02)) = 2.36
        assert!((next.easiness_factor - 2.36).abs() < EPSILON);
        Ok(())
    }

    #[test]
    fn test_interval_truncates() -> Fallible<()> {
        // 10 * 2.36 = 23.6, which rounds to 24 but truncates to 23.
        let current = SchedulingState {
            easiness_factor: INITIAL_EASE,
            interval: 10,
            repetitions: 2,
            ..SchedulingState::new()
        };
        let next = next_state(&current, Rating::new(3)?, at(0)?);
        assert_eq!(next.interval, 23);
        Ok(())
    }

    #[test]
    fn test_uses_updated_ease() -> Fallible<()> {
        // Rating 4 leaves the ease unchanged; rating 5 raises it to 2.6
        // before the interval is computed.
        let current = SchedulingState {
            interval: 10,
            repetitions: 2,
            ..SchedulingState::new()
        };
        assert_eq!(next_state(&current, Rating::new(4)?, at(0)?).interval, 25);
        assert_eq!(next_state(&current, Rating::new(5)?, at(0)?).interval, 26);
        Ok(())
    }

    #[test]
    fn test_long_streak_follows_formula() -> Fallible<()> {
        let states = review_all(&[5; 10])?;
        let intervals: Vec<u32> = states.iter().map(|s| s.interval).collect();
        assert_eq!(
            intervals,
            vec![1, 6, 16, 46, 138, 427, 1366, 4507, 15323, 53630]
        );
        Ok(())
    }

    #[test]
    fn test_due_date_stops_at_year_9999() -> Fallible<()> {
        let states = review_all(&[5; 16])?;
        let last = &states[15];
        assert!(last.interval > 3_000_000);
        assert_eq!(last.next_due_at(), Some(Timestamp::latest()));
        Ok(())
    }

    #[test]
    fn test_sets_review_time_and_keeps_aggregates() -> Fallible<()> {
        let current = SchedulingState {
            total_reviews: 4,
            success_rate: Some(0.5),
            ..SchedulingState::new()
        };
        let next = next_state(&current, Rating::new(4)?, at(3)?);
        assert_eq!(next.last_reviewed_at, Some(at(3)?));
        assert_eq!(next.next_due_at(), Some(at(4)?));
        assert_eq!(next.total_reviews, 4);
        assert_eq!(next.success_rate, Some(0.5));
        Ok(())
    }
}
