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

use serde::Serialize;

use crate::types::timestamp::Timestamp;

/// The ease factor of a card that has never been reviewed.
pub const INITIAL_EASE: f64 = 2.5;

/// The ease factor never drops below this value.
pub const MIN_EASE: f64 = 1.3;

/// A card's scheduling state, plus the running review aggregates the store
/// maintains alongside it.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    /// The SM-2 ease factor. Always at least `MIN_EASE`.
    pub easiness_factor: f64,
    /// Days between the last review and the next one.
    pub interval: u32,
    /// Consecutive successful reviews since the last failure.
    pub repetitions: u32,
    pub last_reviewed_at: Option<Timestamp>,
    /// The number of reviews ever recorded for this card.
    pub total_reviews: u32,
    /// The fraction of reviews marked correct, or `None` if the card has
    /// never been reviewed.
    pub success_rate: Option<f64>,
}

impl SchedulingState {
    /// The state of a card that has never been reviewed.
    pub fn new() -> Self {
        Self {
            easiness_factor: INITIAL_EASE,
            interval: 0,
            repetitions: 0,
            last_reviewed_at: None,
            total_reviews: 0,
            success_rate: None,
        }
    }

    /// When the card is next due. `None` means it has never been reviewed
    /// and is due now.
    pub fn next_due_at(&self) -> Option<Timestamp> {
        self.last_reviewed_at
            .map(|reviewed_at| reviewed_at.plus_days(self.interval))
    }
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self::new()
    }
}

/// The success rate for `correct` correct reviews out of `total`.
pub fn success_rate(correct: u32, total: u32) -> Option<f64> {
    if total == 0 {
        None
    } else {
        Some(f64::from(correct) / f64::from(total))
    }
}
