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

use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::card::NewCard;
use crate::types::card_id::CardId;
use crate::types::difficulty::Difficulty;
use crate::types::timestamp::Timestamp;

pub fn add_card(
    directory: Option<String>,
    question: String,
    answer: String,
    tags: Vec<String>,
    difficulty: u8,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let card = NewCard::new(question, answer, tags, Difficulty::new(difficulty)?)?;
    let card_id = insert_card(&coll, &card)?;
    println!("Added card {card_id} to {}.", coll.directory.display());
    Ok(())
}

/// Check a card against the collection's config and insert it.
pub fn insert_card(coll: &Collection, card: &NewCard) -> Fallible<CardId> {
    coll.config.check_card(card)?;
    coll.db.add_card(card, Timestamp::now())
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_add_card() -> Fallible<()> {
        let dir = tempdir()?;
        let directory = Some(dir.path().display().to_string());
        add_card(
            directory.clone(),
            "What is MLOps?".to_string(),
            "Operating ML systems.".to_string(),
            vec!["mlops".to_string()],
            3,
        )?;
        let coll = Collection::new(directory)?;
        assert_eq!(coll.db.statistics()?.total_cards, 1);
        Ok(())
    }

    #[test]
    fn test_invalid_difficulty() -> Fallible<()> {
        let dir = tempdir()?;
        let result = add_card(
            Some(dir.path().display().to_string()),
            "Q".to_string(),
            "A".to_string(),
            vec![],
            6,
        );
        assert_eq!(result.err().map(|e| e.kind()), Some(ErrorKind::Validation));
        Ok(())
    }

    #[test]
    fn test_stage_must_be_configured() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("config.toml"), "[deck]\nstages = [\"mlops\"]\n")?;
        let result = add_card(
            Some(dir.path().display().to_string()),
            "Q".to_string(),
            "A".to_string(),
            vec!["culture_fit".to_string()],
            2,
        );
        assert!(result.is_err());
        Ok(())
    }
}
