//! Narrows recent media down to the current calendar week.
//!
//! The week starts at 00:00 on Monday in the clock's time zone and has no
//! upper bound, so "this week" means "this week so far".
//!
//! Items are judged one at a time. An item whose `timestamp` is missing is
//! skipped silently; one whose `timestamp` cannot be parsed is logged at warn
//! level and dropped. Neither aborts the rest of the batch.

use chrono::{
    DateTime, Datelike, Days, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Utc,
};
use serde_json::Value;

use crate::client::MediaSource;
use crate::clock::Clock;
use crate::error::{InstagramError, TimestampError};
use crate::types::{MediaItem, WeeklyResult};

/// How many of the most recent media items are fetched per call.
pub const WEEKLY_FETCH_LIMIT: u32 = 50;

const NOT_CONFIGURED: &str = "Instagram service not configured";
const FETCH_FAILED: &str = "Failed to fetch media";

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Length of `YYYY-MM-DD`; an offset sign can only follow a time part.
const DATE_LEN: usize = 10;

/// Fetches recent media from `source` and keeps what was posted this week.
///
/// Built per call; holds nothing but a borrow of the source and a clock.
pub struct WeeklyPosts<'a, S, C> {
    source: &'a S,
    clock: C,
}

impl<'a, S, C> WeeklyPosts<'a, S, C>
where
    S: MediaSource,
    C: Clock,
{
    pub fn new(source: &'a S, clock: C) -> Self {
        Self { source, clock }
    }

    /// Never fails: every outcome, including upstream errors, is reported
    /// through [`WeeklyResult::success`] / [`WeeklyResult::failure`].
    pub async fn get_weekly_posts(&self) -> WeeklyResult {
        if !self.source.is_configured() {
            return WeeklyResult::failure(NOT_CONFIGURED);
        }

        let media = match self.source.get_media_list(WEEKLY_FETCH_LIMIT).await {
            Ok(media) => media,
            Err(InstagramError::NotConfigured) => return WeeklyResult::failure(NOT_CONFIGURED),
            Err(InstagramError::Api(message)) => {
                tracing::warn!(
                    error = message.as_deref().unwrap_or(FETCH_FAILED),
                    "instagram media listing failed"
                );
                return WeeklyResult::failure(message.unwrap_or_else(|| FETCH_FAILED.to_owned()));
            }
            Err(e) => {
                tracing::error!(error = %e, "error getting weekly posts");
                return WeeklyResult::failure(e.to_string());
            }
        };

        let now = self.clock.now();
        let start = week_start(&now);
        let fetched = media.len();
        let posts = filter_current_week(media, &start);

        tracing::info!(
            week_start = %start.naive_local(),
            fetched,
            kept = posts.len(),
            "filtered instagram media to current week"
        );
        WeeklyResult::success(posts, start.naive_local())
    }
}

/// 00:00 on the most recent Monday (today, if `now` is a Monday) in `now`'s
/// time zone.
pub fn week_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let back = u64::from(now.weekday().num_days_from_monday());
    let monday = now.date_naive() - Days::new(back);
    let midnight = monday.and_time(NaiveTime::MIN);
    let tz = now.timezone();

    tz.from_local_datetime(&midnight)
        .earliest()
        // Some zones skip midnight on DST day; the day then starts an hour later.
        .or_else(|| {
            tz.from_local_datetime(&(midnight + TimeDelta::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Parses an ISO-8601 timestamp as emitted by the Graph API.
///
/// A trailing `Z` means `+00:00`. Offsets may be written with or without a
/// colon (`+0000`), or as hours only (`+00`). Seconds are optional. Values
/// without an offset are read as wall-clock time in `tz`; a bare date means
/// midnight.
///
/// # Errors
///
/// Returns [`TimestampError::Unparsable`] when no accepted form matches.
pub fn parse_timestamp<Tz: TimeZone>(
    raw: &str,
    tz: &Tz,
) -> Result<DateTime<FixedOffset>, TimestampError> {
    let trimmed = raw.trim();
    let normalized = match trimmed.strip_suffix('Z').or_else(|| trimmed.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => expand_hour_offset(trimmed),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(parsed);
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(&normalized, format) {
            return Ok(parsed);
        }
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&normalized, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        });

    naive
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|local| local.fixed_offset())
        .ok_or_else(|| TimestampError::Unparsable(raw.to_owned()))
}

/// `...T10:00:00+05` becomes `...T10:00:00+05:00`; anything else is returned
/// unchanged.
fn expand_hour_offset(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let Some(sign_at) = bytes.len().checked_sub(3) else {
        return raw.to_owned();
    };
    let hour_offset = sign_at > DATE_LEN
        && matches!(bytes[sign_at], b'+' | b'-')
        && bytes[sign_at - 1].is_ascii_digit()
        && bytes[sign_at + 1..].iter().all(u8::is_ascii_digit);

    if hour_offset {
        format!("{raw}:00")
    } else {
        raw.to_owned()
    }
}

/// Keeps items whose timestamp is at or after `week_start`, in input order.
pub fn filter_current_week<Tz: TimeZone>(
    items: Vec<MediaItem>,
    week_start: &DateTime<Tz>,
) -> Vec<MediaItem> {
    let tz = week_start.timezone();
    let boundary = week_start.with_timezone(&Utc);

    items
        .into_iter()
        .filter(|item| match item_timestamp(item, &tz) {
            Ok(Some(posted_at)) => posted_at.with_timezone(&Utc) >= boundary,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(
                    media_id = item.id().unwrap_or("<none>"),
                    error = %e,
                    "skipping media item with unparsable timestamp"
                );
                false
            }
        })
        .collect()
}

/// `Ok(None)` for a missing, null or empty timestamp.
fn item_timestamp<Tz: TimeZone>(
    item: &MediaItem,
    tz: &Tz,
) -> Result<Option<DateTime<FixedOffset>>, TimestampError> {
    match item.timestamp() {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.is_empty() => Ok(None),
        Some(Value::String(raw)) => parse_timestamp(raw, tz).map(Some),
        Some(other) => Err(TimestampError::NotAString(other.to_string())),
    }
}

#[cfg(test)]
#[path = "weekly_test.rs"]
mod tests;
