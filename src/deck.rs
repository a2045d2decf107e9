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

//! Deck files: TOML documents containing cards to import.
//!
//! ```toml
//! [[cards]]
//! question = "What are the key components of an MLOps pipeline?"
//! answer = "Ingestion, training, registry, deployment, monitoring."
//! tags = ["mlops", "pipelines"]
//! difficulty = 4
//! ```

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card::NewCard;
use crate::types::difficulty::Difficulty;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeckFile {
    #[serde(default)]
    cards: Vec<DeckEntry>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DeckEntry {
    question: String,
    answer: String,
    #[serde(default)]
    tags: Vec<String>,
    difficulty: Difficulty,
}

/// Find the deck files at the given path. A file is returned as is; a
/// directory is walked recursively for `.toml` files, in sorted order.
pub fn find_deck_files(path: &Path) -> Fallible<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(ErrorReport::validation(format!(
            "no such file or directory: {}",
            path.display()
        )));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path.to_path_buf());
        }
    }
    Ok(files)
}

/// Parse the cards in a deck file.
pub fn parse_deck_file(path: &Path) -> Fallible<Vec<NewCard>> {
    let content = read_to_string(path)?;
    parse_deck(&content).map_err(|e| {
        ErrorReport::with_kind(e.kind(), format!("{}: {}", path.display(), e.message()))
    })
}

pub fn parse_deck(content: &str) -> Fallible<Vec<NewCard>> {
    let deck: DeckFile = toml::from_str(content)?;
    deck.cards
        .into_iter()
        .map(|entry| NewCard::new(entry.question, entry.answer, entry.tags, entry.difficulty))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    const DECK: &str = r#"
        [[cards]]
        question = "What is pandas DataFrame.merge()?"
        answer = "A method that combines DataFrames on columns or indices."
        tags = ["data_manipulation", "pandas"]
        difficulty = 3

        [[cards]]
        question = "Describe a time you learned a technology quickly."
        answer = "STAR method."
        difficulty = 2
    "#;

    #[test]
    fn test_parse_deck() -> Fallible<()> {
        let cards = parse_deck(DECK)?;
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].stage(), Some("data_manipulation"));
        assert_eq!(cards[0].difficulty().value(), 3);
        assert!(cards[1].tags().is_empty());
        Ok(())
    }

    #[test]
    fn test_empty_deck() -> Fallible<()> {
        assert!(parse_deck("")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_difficulty() {
        let deck = "[[cards]]\nquestion = \"Q\"\nanswer = \"A\"\ndifficulty = 7\n";
        assert!(parse_deck(deck).is_err());
    }

    #[test]
    fn test_blank_answer() {
        let deck = "[[cards]]\nquestion = \"Q\"\nanswer = \"  \"\ndifficulty = 1\n";
        assert!(parse_deck(deck).is_err());
    }

    #[test]
    fn test_find_deck_files() -> Fallible<()> {
        let dir = tempdir()?;
        create_dir_all(dir.path().join("nested"))?;
        write(dir.path().join("b.toml"), DECK)?;
        write(dir.path().join("nested").join("a.toml"), DECK)?;
        write(dir.path().join("notes.md"), "ignored")?;
        let files = find_deck_files(dir.path())?;
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e == "toml")));
        let single = find_deck_files(&dir.path().join("b.toml"))?;
        assert_eq!(single.len(), 1);
        assert!(find_deck_files(&dir.path().join("missing")).is_err());
        Ok(())
    }
}
