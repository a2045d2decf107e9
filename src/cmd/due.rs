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

use crate::cmd::list::CardListing;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

pub fn list_due(directory: Option<String>, as_of: Option<String>) -> Fallible<()> {
    let as_of = match as_of {
        Some(s) => Timestamp::parse(&s)?,
        None => Timestamp::now(),
    };
    let coll = Collection::new(directory)?;
    let cards = due_session(&coll, as_of)?;
    if cards.is_empty() {
        println!("No cards due.");
        return Ok(());
    }
    print!("{}", CardListing(&cards));
    Ok(())
}

/// The cards for a study session at `as_of`, capped at the session limit.
pub fn due_session(coll: &Collection, as_of: Timestamp) -> Fallible<Vec<Card>> {
    let mut cards = coll.db.list_due(as_of)?;
    if let Some(limit) = coll.config.session_limit() {
        cards.truncate(limit);
    }
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::types::card::NewCard;
    use crate::types::difficulty::Difficulty;

    #[test]
    fn test_session_limit() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join("config.toml"), "[session]\nlimit = 2\n")?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        let t0 = Timestamp::parse("2025-06-13T09:00:00Z")?;
        for (i, difficulty) in [1, 5, 3].into_iter().enumerate() {
            let card = NewCard::new(format!("Q{i}"), "A", vec![], Difficulty::new(difficulty)?)?;
            coll.db.add_card(&card, t0)?;
        }
        let session = due_session(&coll, t0)?;
        let difficulties: Vec<u8> = session.iter().map(|c| c.difficulty.value()).collect();
        assert_eq!(difficulties, vec![5, 3]);
        Ok(())
    }

    #[test]
    fn test_bad_as_of() -> Fallible<()> {
        let dir = tempdir()?;
        let result = list_due(
            Some(dir.path().display().to_string()),
            Some("tomorrow".to_string()),
        );
        assert!(result.is_err());
        Ok(())
    }
}
