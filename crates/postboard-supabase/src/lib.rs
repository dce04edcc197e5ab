//! Supabase collaborators: token-to-user resolution and dashboard statistics.

pub mod client;
pub mod error;
pub mod types;

pub use client::SupabaseClient;
pub use error::SupabaseError;
pub use types::{DashboardStatistics, User};
