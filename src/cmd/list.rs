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
use crate::db::CardFilter;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::difficulty::Difficulty;

/// Questions longer than this are truncated in listings.
const PREVIEW_CHARS: usize = 80;

pub fn list_cards(
    directory: Option<String>,
    stage: Option<String>,
    difficulty: Option<u8>,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let filter = CardFilter {
        stage,
        difficulty: difficulty.map(Difficulty::new).transpose()?,
    };
    let cards = coll.db.list_cards(&filter)?;
    print!("{}", CardListing(&cards));
    Ok(())
}

/// A short listing of cards, one block per card.
pub struct CardListing<'a>(pub &'a [Card]);

impl Display for CardListing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Found {} cards.", self.0.len())?;
        for card in self.0 {
            writeln!(f)?;
            writeln!(f, "ID:         {}", card.id)?;
            writeln!(f, "Stage:      {}", card.stage().unwrap_or("-"))?;
            writeln!(f, "Difficulty: {}", card.difficulty)?;
            writeln!(f, "Question:   {}", preview(&card.question))?;
            writeln!(f, "Tags:       {}", card.tags.join(", "))?;
        }
        Ok(())
    }
}

pub fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp::Timestamp;

    #[test]
    fn test_preview() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(100);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(CardListing(&[]).to_string(), "Found 0 cards.\n");
    }

    #[test]
    fn test_listing() -> Fallible<()> {
        let card = Card {
            id: "3".parse()?,
            question: "What is MLOps?".to_string(),
            answer: "Operating ML systems.".to_string(),
            tags: vec!["mlops".to_string(), "pipelines".to_string()],
            difficulty: Difficulty::new(4)?,
            created_at: Timestamp::parse("2025-06-13T09:00:00Z")?,
        };
        let text = CardListing(&[card]).to_string();
        assert!(text.starts_with("Found 1 cards.\n\nID:         3\n"));
        assert!(text.contains("Stage:      mlops\n"));
        assert!(text.contains("Difficulty: 4/5\n"));
        assert!(text.contains("Tags:       mlops, pipelines\n"));
        Ok(())
    }
}
