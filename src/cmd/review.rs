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

use crate::cmd::show::format_rate;
use crate::collection::Collection;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card_id::CardId;
use crate::types::review::ReviewInput;

pub fn review_card(
    directory: Option<String>,
    card_id: String,
    rating: u8,
    correct: String,
    response_time_ms: Option<u32>,
) -> Fallible<()> {
    let card_id: CardId = card_id.parse()?;
    let input = ReviewInput::new(rating, parse_correct(&correct)?, response_time_ms)?;
    let coll = Collection::new(directory)?;
    let state = coll.db.record_review(card_id, input)?;
    println!("Review recorded for card {card_id}.");
    println!("  Rating:       {}", input.rating);
    println!("  Correct:      {}", input.correct);
    println!("  Interval:     {} days", state.interval);
    println!("  Ease factor:  {:.2}", state.easiness_factor);
    if let Some(due) = state.next_due_at() {
        println!("  Next review:  {due}");
    }
    println!("  Success rate: {}", format_rate(state.success_rate));
    Ok(())
}

fn parse_correct(s: &str) -> Fallible<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        _ => Err(ErrorReport::validation(format!(
            "expected 1/0 or true/false for correctness, got '{s}'"
        ))),
    }
}
