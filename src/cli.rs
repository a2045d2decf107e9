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

use clap::Parser;
use clap::Subcommand;

use crate::cmd::add::add_card;
use crate::cmd::due::list_due;
use crate::cmd::export::export_collection;
use crate::cmd::import::import_decks;
use crate::cmd::list::list_cards;
use crate::cmd::review::review_card;
use crate::cmd::show::show_card;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the collection directory. Defaults to the current directory.
    #[arg(long, global = true)]
    directory: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a card.
    Add {
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
        /// Difficulty, from 1 (very easy) to 5 (very hard).
        #[arg(long)]
        difficulty: u8,
        /// A tag. The first tag is the card's stage. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Import cards from a TOML deck file, or a directory of them.
    Import { path: String },
    /// List cards.
    List {
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        difficulty: Option<u8>,
    },
    /// Show a card's details and review history.
    Show { id: String },
    /// Record a review.
    Review {
        id: String,
        /// Recall quality, from 1 (again) to 5 (perfect).
        rating: u8,
        /// Whether the answer was correct: 1 or 0.
        correct: String,
        /// Response time in milliseconds.
        time_ms: Option<u32>,
    },
    /// List the cards due for review.
    Due {
        /// RFC 3339 timestamp to check against, instead of now.
        #[arg(long = "as-of")]
        as_of: Option<String>,
    },
    /// Print collection statistics.
    Stats {
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Export the collection as JSON.
    Export,
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let directory = cli.directory;
    match cli.command {
        Command::Add {
            question,
            answer,
            difficulty,
            tags,
        } => add_card(directory, question, answer, tags, difficulty),
        Command::Import { path } => import_decks(directory, path),
        Command::List { stage, difficulty } => list_cards(directory, stage, difficulty),
        Command::Show { id } => show_card(directory, id),
        Command::Review {
            id,
            rating,
            correct,
            time_ms,
        } => review_card(directory, id, rating, correct, time_ms),
        Command::Due { as_of } => list_due(directory, as_of),
        Command::Stats { format } => print_stats(directory, format),
        Command::Export => export_collection(directory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_takes_time_positionally() {
        let cli = Cli::try_parse_from(["mnemocards", "review", "1", "4", "1", "12000"]);
        match cli.map(|c| c.command) {
            Ok(Command::Review {
                id,
                rating,
                correct,
                time_ms,
            }) => {
                assert_eq!(id, "1");
                assert_eq!(rating, 4);
                assert_eq!(correct, "1");
                assert_eq!(time_ms, Some(12000));
            }
            _ => panic!("Expected review command"),
        }
    }

    #[test]
    fn test_review_time_is_optional() {
        let cli = Cli::try_parse_from(["mnemocards", "review", "1", "4", "0"]);
        match cli.map(|c| c.command) {
            Ok(Command::Review { time_ms, .. }) => assert_eq!(time_ms, None),
            _ => panic!("Expected review command"),
        }
    }
}
