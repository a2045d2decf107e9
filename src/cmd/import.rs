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

use std::path::PathBuf;

use crate::cmd::add::insert_card;
use crate::collection::Collection;
use crate::deck::find_deck_files;
use crate::deck::parse_deck_file;
use crate::error::ErrorKind;
use crate::error::Fallible;

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub files: usize,
    pub added: usize,
    pub duplicates: usize,
}

pub fn import_decks(directory: Option<String>, path: String) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let summary = import_into(&coll, &PathBuf::from(path))?;
    println!(
        "Imported {} cards from {} files ({} duplicates skipped).",
        summary.added, summary.files, summary.duplicates
    );
    Ok(())
}

/// Import every card in the deck files at `path`. All files are parsed
/// before anything is inserted, so a malformed file imports nothing.
pub fn import_into(coll: &Collection, path: &PathBuf) -> Fallible<ImportSummary> {
    let files = find_deck_files(path)?;
    let mut cards = Vec::new();
    for file in &files {
        log::debug!("Reading deck file {}", file.display());
        cards.extend(parse_deck_file(file)?);
    }
    for card in &cards {
        coll.config.check_card(card)?;
    }
    let mut summary = ImportSummary {
        files: files.len(),
        ..ImportSummary::default()
    };
    for card in &cards {
        match insert_card(coll, card) {
            Ok(_) => summary.added += 1,
            Err(e) if e.kind() == ErrorKind::Validation => {
                log::warn!("Skipping card: {e}");
                summary.duplicates += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(summary)
}
