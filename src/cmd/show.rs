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

use std::fmt::Display;
use std::fmt::Formatter;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::card_id::CardId;
use crate::types::review::ReviewEvent;
use crate::types::scheduling::SchedulingState;

pub fn show_card(directory: Option<String>, card_id: String) -> Fallible<()> {
    let card_id: CardId = card_id.parse()?;
    let coll = Collection::new(directory)?;
    let card = coll.db.get_card(card_id)?;
    let state = coll.db.get_scheduling_state(card_id)?;
    let history = coll.db.review_history(card_id)?;
    if coll.db.success_rate_from_log(card_id)? != state.success_rate {
        log::warn!("Stored success rate for card {card_id} does not match its review log.");
    }
    let report = CardReport {
        card: &card,
        state: &state,
        history: &history,
    };
    print!("{report}");
    Ok(())
}

/// The full view of one card: content, scheduling state, and review log.
pub struct CardReport<'a> {
    pub card: &'a Card,
    pub state: &'a SchedulingState,
    pub history: &'a [ReviewEvent],
}

impl Display for CardReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Self {
            card,
            state,
            history,
        } = self;
        writeln!(f, "Card #{}", card.id)?;
        writeln!(f, "Stage:        {}", card.stage().unwrap_or("-"))?;
        writeln!(f, "Difficulty:   {}", card.difficulty)?;
        writeln!(f, "Tags:         {}", card.tags.join(", "))?;
        writeln!(f, "Created:      {}", card.created_at)?;
        writeln!(f, "Reviews:      {}", state.total_reviews)?;
        writeln!(f, "Success rate: {}", format_rate(state.success_rate))?;
        writeln!(f, "Ease factor:  {:.2}", state.easiness_factor)?;
        writeln!(f, "Interval:     {} days", state.interval)?;
        writeln!(f, "Streak:       {}", state.repetitions)?;
        match state.next_due_at() {
            Some(due) => writeln!(f, "Due:          {due}")?,
            None => writeln!(f, "Due:          now")?,
        }
        writeln!(f)?;
        writeln!(f, "Question:")?;
        writeln!(f, "{}", card.question)?;
        writeln!(f)?;
        writeln!(f, "Answer:")?;
        writeln!(f, "{}", card.answer)?;
        if !history.is_empty() {
            writeln!(f)?;
            writeln!(f, "Review history:")?;
            for event in history.iter() {
                let status = if event.correct { "correct" } else { "incorrect" };
                let time = match event.response_time_ms {
                    Some(ms) => format!("{:.1}s", f64::from(ms) / 1000.0),
                    None => "N/A".to_string(),
                };
                writeln!(
                    f,
                    "  {}: {status}, rating {}, time {time}",
                    event.reviewed_at, event.rating
                )?;
            }
        }
        Ok(())
    }
}

pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%", rate * 100.0),
        None => "No data".to_string(),
    }
}
