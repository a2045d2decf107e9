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

use chrono::DateTime;
use chrono::Duration;
use chrono::SecondsFormat;
use chrono::SubsecRound;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::Fallible;

/// A point in time, always in UTC.
///
/// Stored as a fixed-width RFC 3339 string (microsecond precision, `Z`
/// suffix), so that comparing the stored strings gives the same order as
/// comparing the timestamps. The due-card query relies on this. Values are
/// kept at microsecond precision so they survive a round trip through the
/// database unchanged.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Timestamp(DateTime<Utc>);

/// Seconds since the epoch of 9999-12-31T23:59:59Z, the last second with a
/// four-digit year.
const LATEST_SECONDS: i64 = 253_402_300_799;

impl Timestamp {
    #[cfg(test)]
    pub fn new(ts: DateTime<Utc>) -> Self {
        Self(ts.trunc_subsecs(6))
    }

    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(6))
    }

    pub fn parse(s: &str) -> Fallible<Self> {
        let ts = DateTime::parse_from_rfc3339(s)?;
        Ok(Self(ts.with_timezone(&Utc).trunc_subsecs(6)))
    }

    /// The latest storable timestamp, the final microsecond of year 9999.
    pub fn latest() -> Self {
        let ts = DateTime::<Utc>::from_timestamp(LATEST_SECONDS, 999_999_000)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self(ts)
    }

    /// The timestamp `days` whole days after this one, or `latest()` if that
    /// would fall after year 9999.
    pub fn plus_days(self, days: u32) -> Self {
        let latest = Self::latest();
        Duration::try_days(i64::from(days))
            .and_then(|d| self.0.checked_add_signed(d))
            .map(Self)
            .filter(|ts| *ts <= latest)
            .unwrap_or(latest)
    }

    fn to_storage(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S UTC"))
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_storage()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        let ts =
            DateTime::parse_from_rfc3339(&string).map_err(|e| FromSqlError::Other(Box::new(e)))?;
        let ts = ts.with_timezone(&Utc);
        Ok(Timestamp(ts))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_storage())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_storage_format_is_fixed_width() {
        let a = Timestamp::new(Utc.with_ymd_and_hms(2025, 6, 13, 9, 0, 0).unwrap());
        let b = Timestamp::new(
            Utc.with_ymd_and_hms(2025, 6, 13, 9, 0, 0).unwrap() + Duration::milliseconds(500),
        );
        assert_eq!(a.to_storage(), "2025-06-13T09:00:00.000000Z");
        assert_eq!(b.to_storage(), "2025-06-13T09:00:00.500000Z");
        assert!(a.to_storage() < b.to_storage());
    }

    #[test]
    fn test_parse_normalizes_to_utc() -> Fallible<()> {
        let ts = Timestamp::parse("2025-06-13T11:00:00+02:00")?;
        assert_eq!(ts.to_storage(), "2025-06-13T09:00:00.000000Z");
        Ok(())
    }

    #[test]
    fn test_plus_days() -> Fallible<()> {
        let ts = Timestamp::parse("2025-12-30T00:00:00Z")?;
        assert_eq!(ts.plus_days(6), Timestamp::parse("2026-01-05T00:00:00Z")?);
        assert_eq!(ts.plus_days(0), ts);
        Ok(())
    }

    #[test]
    fn test_plus_days_stops_at_year_9999() -> Fallible<()> {
        let ts = Timestamp::parse("2025-06-13T09:00:00Z")?;
        assert_eq!(ts.plus_days(u32::MAX), Timestamp::latest());
        assert_eq!(
            Timestamp::latest().to_storage(),
            "9999-12-31T23:59:59.999999Z"
        );
        Ok(())
    }

    #[test]
    fn test_precision_is_microseconds() -> Fallible<()> {
        let ts = Timestamp::parse("2025-06-13T09:00:00.123456789Z")?;
        assert_eq!(ts.to_storage(), "2025-06-13T09:00:00.123456Z");
        assert_eq!(Timestamp::parse(&ts.to_storage())?, ts);
        let now = Timestamp::now();
        assert_eq!(Timestamp::parse(&now.to_storage())?, now);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
    }
}
