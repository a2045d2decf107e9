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

use crate::collection::Collection;
use crate::db::CardFilter;
use crate::error::Fallible;
use crate::types::card::Card;
use crate::types::review::ReviewEvent;
use crate::types::scheduling::SchedulingState;
use crate::types::timestamp::Timestamp;

pub fn export_collection(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    let export: Export = get_export(&coll)?;
    let json: String = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    exported_at: Timestamp,
    cards: Vec<CardExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CardExport {
    card: Card,
    scheduling: SchedulingState,
    next_due_at: Option<Timestamp>,
    reviews: Vec<ReviewEvent>,
}

fn get_export(coll: &Collection) -> Fallible<Export> {
    let mut cards: Vec<CardExport> = Vec::new();
    for card in coll.db.list_cards(&CardFilter::default())? {
        let scheduling = coll.db.get_scheduling_state(card.id)?;
        let reviews = coll.db.review_history(card.id)?;
        cards.push(CardExport {
            next_due_at: scheduling.next_due_at(),
            card,
            scheduling,
            reviews,
        });
    }
    Ok(Export {
        exported_at: Timestamp::now(),
        cards,
    })
}
