use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry from the Graph API media edge.
///
/// Only `timestamp` is interpreted; every other field is carried through
/// untouched so callers receive exactly what the API returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaItem(Map<String, Value>);

impl MediaItem {
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw `timestamp` value, if the field is present.
    #[must_use]
    pub fn timestamp(&self) -> Option<&Value> {
        self.0.get("timestamp")
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for MediaItem {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Outcome of [`crate::WeeklyPosts::get_weekly_posts`].
///
/// A failed result serializes to exactly `{"success": false, "error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<MediaItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_posts: Option<usize>,
    /// Local wall-clock time of the Monday boundary, e.g. `2024-01-08T00:00:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_start: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WeeklyResult {
    #[must_use]
    pub fn success(posts: Vec<MediaItem>, week_start: NaiveDateTime) -> Self {
        Self {
            success: true,
            total_posts: Some(posts.len()),
            posts: Some(posts),
            week_start: Some(week_start),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            posts: None,
            total_posts: None,
            week_start: None,
            error: Some(error.into()),
        }
    }
}
