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

use clap::ValueEnum;

use crate::cmd::show::format_rate;
use crate::collection::Collection;
use crate::db::Statistics;
use crate::error::Fallible;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// Human-readable output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let stats = coll.db.statistics()?;
    match format {
        StatsFormat::Text => {
            print!("{}", StatsReport(&stats));
        }
        StatsFormat::Json => {
            let stats_json = serde_json::to_string_pretty(&stats)?;
            println!("{}", stats_json);
        }
    }
    Ok(())
}

/// The text rendering of collection statistics.
pub struct StatsReport<'a>(pub &'a Statistics);

impl Display for StatsReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let stats = self.0;
        writeln!(f, "Total cards: {}", stats.total_cards)?;
        writeln!(f)?;
        writeln!(f, "Cards by stage:")?;
        for stage in &stats.cards_by_stage {
            let name = stage.stage.as_deref().unwrap_or("(untagged)");
            writeln!(f, "  {name}: {}", stage.count)?;
        }
        writeln!(f)?;
        writeln!(f, "Cards by difficulty:")?;
        for level in &stats.cards_by_difficulty {
            writeln!(f, "  Level {}: {}", level.difficulty.value(), level.count)?;
        }
        writeln!(f)?;
        writeln!(f, "Total reviews: {}", stats.total_reviews)?;
        if stats.total_reviews > 0 {
            if let Some(rating) = stats.average_rating {
                writeln!(f, "  Average rating: {rating:.1}/5")?;
            }
            match stats.average_response_time_ms {
                Some(ms) => writeln!(f, "  Average response time: {:.1}s", ms / 1000.0)?,
                None => writeln!(f, "  Average response time: N/A")?,
            }
            writeln!(f, "  Overall accuracy: {}", format_rate(stats.accuracy))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::types::card::NewCard;
    use crate::types::difficulty::Difficulty;
    use crate::types::review::ReviewInput;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_stats_report() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        let t0 = Timestamp::parse("2025-06-13T09:00:00Z")?;
        let card = NewCard::new("Q", "A", vec!["mlops".to_string()], Difficulty::new(4)?)?;
        let id = coll.db.add_card(&card, t0)?;
        let card = NewCard::new("Q2", "A2", vec![], Difficulty::new(1)?)?;
        coll.db.add_card(&card, t0)?;
        coll.db
            .record_review_at(id, ReviewInput::new(4, true, Some(15000))?, t0)?;

        let text = StatsReport(&coll.db.statistics()?).to_string();
        assert!(text.contains("Total cards: 2"));
        assert!(text.contains("  mlops: 1"));
        assert!(text.contains("  (untagged): 1"));
        assert!(text.contains("  Level 4: 1"));
        assert!(text.contains("  Average rating: 4.0/5"));
        assert!(text.contains("  Average response time: 15.0s"));
        assert!(text.contains("  Overall accuracy: 100.0%"));
        Ok(())
    }

    #[test]
    fn test_print_stats_json() -> Fallible<()> {
        let dir = tempdir()?;
        print_stats(Some(dir.path().display().to_string()), StatsFormat::Json)?;
        Ok(())
    }
}
