use serde::{Deserialize, Serialize};

/// One team's row in the standings.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StandingsRow {
    #[schema(example = "null pointers")]
    pub team_name: String,
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(example = 57.3)]
    pub score: f64,
    /// Best passed counts per question, indexed by question number - 1.
    #[schema(example = json!([3, 0, 5]))]
    pub testcases_passed: Vec<i64>,
}

/// Standings sorted by score, best first. Also the payload pushed over the
/// leaderboard WebSocket on every score change.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StandingsResponse {
    pub standings: Vec<StandingsRow>,
}

/// Query parameters for the leaderboard.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LeaderboardQuery {
    /// Restrict to one contest year.
    #[param(example = 2025)]
    pub year: Option<i32>,
}
