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

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::content_hash::ContentHash;
use crate::types::difficulty::Difficulty;
use crate::types::timestamp::Timestamp;

/// A study item, as stored in the database.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub question: String,
    pub answer: String,
    /// Free-form tags. The first tag is the card's stage.
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
    pub created_at: Timestamp,
}

impl Card {
    pub fn stage(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }
}

/// A card that has not been inserted yet.
#[derive(Clone, Debug)]
pub struct NewCard {
    question: String,
    answer: String,
    tags: Vec<String>,
    difficulty: Difficulty,
}

impl NewCard {
    /// Builds a new card, trimming whitespace. Fails if the question or
    /// answer is blank, or if any tag is blank.
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        tags: Vec<String>,
        difficulty: Difficulty,
    ) -> Fallible<Self> {
        let question = question.into().trim().to_string();
        let answer = answer.into().trim().to_string();
        if question.is_empty() {
            return Err(ErrorReport::validation("question must not be empty"));
        }
        if answer.is_empty() {
            return Err(ErrorReport::validation("answer must not be empty"));
        }
        let tags: Vec<String> = tags.into_iter().map(|t| t.trim().to_string()).collect();
        if tags.iter().any(|t| t.is_empty()) {
            return Err(ErrorReport::validation("tags must not be empty"));
        }
        Ok(Self {
            question,
            answer,
            tags,
            difficulty,
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn stage(&self) -> Option<&str> {
        self.tags.first().map(String::as_str)
    }

    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of(&self.question, &self.answer)
    }
}
