use serde::Deserialize;
use serde_json::{Map, Value};

/// The authenticated user behind a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Whatever the statistics function returns, passed through to the caller.
pub type DashboardStatistics = Map<String, Value>;
