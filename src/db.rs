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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::config::DbConfig;
use serde::Serialize;

use crate::error::ErrorKind;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::scheduler::next_state;
use crate::types::card::Card;
use crate::types::card::NewCard;
use crate::types::card_id::CardId;
use crate::types::difficulty::Difficulty;
use crate::types::review::ReviewEvent;
use crate::types::review::ReviewInput;
use crate::types::scheduling::SchedulingState;
use crate::types::scheduling::success_rate;
use crate::types::timestamp::Timestamp;

/// How long to wait for another process holding the database lock before
/// giving up with a concurrency conflict.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CARD_COLUMNS: &str = "card_id, question, answer, tags, difficulty, created_at";

/// The card store. Cloning the handle shares the underlying connection, and
/// every operation holds the connection for its whole duration, so two
/// reviews never interleave.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

/// Optional filters for listing cards.
#[derive(Default)]
pub struct CardFilter {
    pub stage: Option<String>,
    pub difficulty: Option<Difficulty>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_cards: u32,
    pub cards_by_stage: Vec<StageCount>,
    pub cards_by_difficulty: Vec<DifficultyCount>,
    pub total_reviews: u32,
    pub average_rating: Option<f64>,
    /// Over the reviews that recorded a response time.
    pub average_response_time_ms: Option<f64>,
    /// The fraction of all reviews that were marked correct.
    pub accuracy: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    /// `None` for cards without tags.
    pub stage: Option<String>,
    pub count: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyCount {
    pub difficulty: Difficulty,
    pub count: u32,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        log::debug!("Opening database at {database_path}");
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        {
            let tx = conn.transaction()?;
            if !schema_exists(&tx)? {
                log::debug!("Creating schema");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Insert a new card, returning its ID.
    ///
    /// If a card with the same question and answer exists, returns a
    /// validation error.
    pub fn add_card(&self, card: &NewCard, created_at: Timestamp) -> Fallible<CardId> {
        let hash = card.content_hash();
        let tags = serde_json::to_string(card.tags())?;
        let state = SchedulingState::new();
        let mut conn = self.acquire()?;
        let tx = conn.transaction()?;
        let exists: bool = tx.query_row(
            "select exists(select 1 from cards where content_hash = ?);",
            [hash],
            |row| row.get(0),
        )?;
        if exists {
            return Err(ErrorReport::validation(format!(
                "duplicate card: {}",
                card.question()
            )));
        }
        let sql = "insert into cards (content_hash, question, answer, tags, stage, difficulty, created_at, easiness_factor, interval_days, repetitions, last_reviewed_at, next_due_at, total_reviews, success_rate) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, null, ?, 0, null) returning card_id;";
        let card_id: CardId = tx.query_row(
            sql,
            (
                hash,
                card.question(),
                card.answer(),
                tags,
                card.stage(),
                card.difficulty(),
                created_at,
                state.easiness_factor,
                state.interval,
                state.repetitions,
                created_at,
            ),
            |row| row.get(0),
        )?;
        tx.commit()?;
        log::debug!("Added card {card_id} ({hash})");
        Ok(card_id)
    }

    /// Get a card's content. If no card with the given ID exists, returns a
    /// not-found error.
    pub fn get_card(&self, card_id: CardId) -> Fallible<Card> {
        let conn = self.acquire()?;
        let sql = format!("select {CARD_COLUMNS} from cards where card_id = ?;");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([card_id])?;
        match rows.next()? {
            Some(row) => read_card(row),
            None => Err(card_not_found(card_id)),
        }
    }

    /// List cards, ordered by stage, then difficulty, then ID.
    pub fn list_cards(&self, filter: &CardFilter) -> Fallible<Vec<Card>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {CARD_COLUMNS} from cards where (?1 is null or stage = ?1) and (?2 is null or difficulty = ?2) order by stage, difficulty, card_id;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query((filter.stage.as_deref(), filter.difficulty))?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(read_card(row)?);
        }
        Ok(cards)
    }

    /// Get a card's scheduling state. If no card with the given ID exists,
    /// returns a not-found error.
    pub fn get_scheduling_state(&self, card_id: CardId) -> Fallible<SchedulingState> {
        let conn = self.acquire()?;
        select_scheduling_state(&conn, card_id)?.ok_or_else(|| card_not_found(card_id))
    }

    /// Record a review happening now. See `record_review_at`.
    pub fn record_review(&self, card_id: CardId, input: ReviewInput) -> Fallible<SchedulingState> {
        self.record_review_at(card_id, input, Timestamp::now())
    }

    /// Record a review in a single transaction: append the event to the
    /// review log, reschedule the card, and update its review aggregates.
    /// Returns the card's new scheduling state.
    pub fn record_review_at(
        &self,
        card_id: CardId,
        input: ReviewInput,
        reviewed_at: Timestamp,
    ) -> Fallible<SchedulingState> {
        let mut conn = self.acquire()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current =
            select_scheduling_state(&tx, card_id)?.ok_or_else(|| card_not_found(card_id))?;
        insert_review(
            &tx,
            &ReviewEvent {
                card_id,
                reviewed_at,
                rating: input.rating,
                response_time_ms: input.response_time_ms,
                correct: input.correct,
            },
        )?;
        let (total, correct) = count_reviews(&tx, card_id)?;
        let total_reviews = current.total_reviews + 1;
        if total != total_reviews {
            return Err(ErrorReport::with_kind(
                ErrorKind::ConcurrencyConflict,
                format!(
                    "review count for card {card_id} changed concurrently: expected {total_reviews}, found {total}"
                ),
            ));
        }
        let next = SchedulingState {
            total_reviews,
            success_rate: success_rate(correct, total),
            ..next_state(&current, input.rating, reviewed_at)
        };
        update_scheduling_state(&tx, card_id, &next)?;
        tx.commit()?;
        log::debug!(
            "Reviewed card {card_id}: rating={}, interval={}, ef={:.2}, reps={}",
            input.rating.value(),
            next.interval,
            next.easiness_factor,
            next.repetitions
        );
        Ok(next)
    }

    /// Find the cards due at `as_of`, ordered by due time, with harder cards
    /// first among cards due at the same time.
    pub fn list_due(&self, as_of: Timestamp) -> Fallible<Vec<Card>> {
        let conn = self.acquire()?;
        let sql = format!(
            "select {CARD_COLUMNS} from cards where next_due_at <= ? order by next_due_at asc, difficulty desc, card_id asc;"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([as_of])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(read_card(row)?);
        }
        log::debug!("{} cards due as of {as_of}", cards.len());
        Ok(cards)
    }

    /// A card's review history, newest first.
    pub fn review_history(&self, card_id: CardId) -> Fallible<Vec<ReviewEvent>> {
        let conn = self.acquire()?;
        if !card_exists(&conn, card_id)? {
            return Err(card_not_found(card_id));
        }
        let sql = "select reviewed_at, rating, response_time_ms, correct from reviews where card_id = ? order by reviewed_at desc, review_id desc;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([card_id])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(ReviewEvent {
                card_id,
                reviewed_at: row.get(0)?,
                rating: row.get(1)?,
                response_time_ms: row.get(2)?,
                correct: row.get(3)?,
            });
        }
        Ok(events)
    }

    /// Recompute a card's success rate from the full review log.
    pub fn success_rate_from_log(&self, card_id: CardId) -> Fallible<Option<f64>> {
        let conn = self.acquire()?;
        if !card_exists(&conn, card_id)? {
            return Err(card_not_found(card_id));
        }
        let (total, correct) = count_reviews(&conn, card_id)?;
        Ok(success_rate(correct, total))
    }

    pub fn statistics(&self) -> Fallible<Statistics> {
        let conn = self.acquire()?;
        let total_cards: u32 = conn.query_row("select count(*) from cards;", [], |row| row.get(0))?;

        let mut cards_by_stage = Vec::new();
        {
            let mut stmt =
                conn.prepare("select stage, count(*) from cards group by stage order by stage;")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                cards_by_stage.push(StageCount {
                    stage: row.get(0)?,
                    count: row.get(1)?,
                });
            }
        }

        let mut cards_by_difficulty = Vec::new();
        {
            let mut stmt = conn.prepare(
                "select difficulty, count(*) from cards group by difficulty order by difficulty;",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                cards_by_difficulty.push(DifficultyCount {
                    difficulty: row.get(0)?,
                    count: row.get(1)?,
                });
            }
        }

        let sql = "select count(*), avg(rating), avg(response_time_ms), sum(correct) from reviews;";
        let (total_reviews, average_rating, average_response_time_ms, correct): (
            u32,
            Option<f64>,
            Option<f64>,
            Option<u32>,
        ) = conn.query_row(sql, [], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        let accuracy = success_rate(correct.unwrap_or(0), total_reviews);

        Ok(Statistics {
            total_cards,
            cards_by_stage,
            cards_by_difficulty,
            total_reviews,
            average_rating,
            average_response_time_ms,
            accuracy,
        })
    }

    fn acquire(&self) -> Fallible<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            ErrorReport::with_kind(
                ErrorKind::StorageUnavailable,
                "database connection is poisoned",
            )
        })
    }
}

fn card_not_found(card_id: CardId) -> ErrorReport {
    ErrorReport::not_found(format!("no card with ID {card_id}"))
}

fn read_card(row: &Row) -> Fallible<Card> {
    let tags: String = row.get(3)?;
    let tags: Vec<String> = serde_json::from_str(&tags)?;
    Ok(Card {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        tags,
        difficulty: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn card_exists(conn: &Connection, card_id: CardId) -> Fallible<bool> {
    let sql = "select exists(select 1 from cards where card_id = ?);";
    let exists: bool = conn.query_row(sql, [card_id], |row| row.get(0))?;
    Ok(exists)
}

fn select_scheduling_state(conn: &Connection, card_id: CardId) -> Fallible<Option<SchedulingState>> {
    let sql = "select easiness_factor, interval_days, repetitions, last_reviewed_at, total_reviews, success_rate from cards where card_id = ?;";
    let state = conn
        .query_row(sql, [card_id], |row| {
            Ok(SchedulingState {
                easiness_factor: row.get(0)?,
                interval: row.get(1)?,
                repetitions: row.get(2)?,
                last_reviewed_at: row.get(3)?,
                total_reviews: row.get(4)?,
                success_rate: row.get(5)?,
            })
        })
        .optional()?;
    Ok(state)
}

fn update_scheduling_state(
    tx: &Transaction,
    card_id: CardId,
    state: &SchedulingState,
) -> Fallible<()> {
    let Some(next_due_at) = state.next_due_at() else {
        return fail(format!(
            "card {card_id} has no review time after being reviewed"
        ));
    };
    let sql = "update cards set easiness_factor = ?, interval_days = ?, repetitions = ?, last_reviewed_at = ?, next_due_at = ?, total_reviews = ?, success_rate = ? where card_id = ?;";
    tx.execute(
        sql,
        (
            state.easiness_factor,
            state.interval,
            state.repetitions,
            state.last_reviewed_at,
            next_due_at,
            state.total_reviews,
            state.success_rate,
            card_id,
        ),
    )?;
    Ok(())
}

type ReviewId = i64;

fn insert_review(tx: &Transaction, review: &ReviewEvent) -> Fallible<ReviewId> {
    let sql = "insert into reviews (card_id, reviewed_at, rating, response_time_ms, correct) values (?, ?, ?, ?, ?) returning review_id;";
    let review_id: ReviewId = tx.query_row(
        sql,
        (
            review.card_id,
            review.reviewed_at,
            review.rating,
            review.response_time_ms,
            review.correct,
        ),
        |row| row.get(0),
    )?;
    Ok(review_id)
}

/// Count a card's reviews, returning `(total, correct)`.
fn count_reviews(conn: &Connection, card_id: CardId) -> Fallible<(u32, u32)> {
    let sql = "select count(*), coalesce(sum(correct), 0) from reviews where card_id = ?;";
    let counts = conn.query_row(sql, [card_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
    Ok(counts)
}

fn schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}
