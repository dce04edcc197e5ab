//! Instagram media listing and the "posts this week" filter.
//!
//! [`InstagramClient`] talks to the Instagram Graph API and implements
//! [`MediaSource`]. [`WeeklyPosts`] consumes any `MediaSource` plus a
//! [`Clock`] and narrows the most recent media down to the current week.

pub mod client;
pub mod clock;
pub mod error;
pub mod types;
pub mod weekly;

pub use client::{InstagramClient, MediaSource};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{InstagramError, TimestampError};
pub use types::{MediaItem, WeeklyResult};
pub use weekly::{
    filter_current_week, parse_timestamp, week_start, WeeklyPosts, WEEKLY_FETCH_LIMIT,
};
