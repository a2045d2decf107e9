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

use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::rating::Rating;
use crate::types::timestamp::Timestamp;

/// What the learner reports after answering a card.
///
/// `correct` is recorded independently of `rating`: the scheduler only looks
/// at the rating, while the success rate only looks at `correct`.
#[derive(Clone, Copy, Debug)]
pub struct ReviewInput {
    pub rating: Rating,
    pub correct: bool,
    pub response_time_ms: Option<u32>,
}

impl ReviewInput {
    pub fn new(rating: u8, correct: bool, response_time_ms: Option<u32>) -> Fallible<Self> {
        Ok(Self {
            rating: Rating::new(rating)?,
            correct,
            response_time_ms,
        })
    }
}

/// An entry in the append-only review log.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEvent {
    pub card_id: CardId,
    pub reviewed_at: Timestamp,
    pub rating: Rating,
    pub response_time_ms: Option<u32>,
    pub correct: bool,
}
