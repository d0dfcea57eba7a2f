//! Team aggregate scoring.
//!
//! Per-question bests live in two JSON arrays on the team row, indexed by
//! `question.number - 1` and zero-padded as higher-numbered questions get
//! solved. Updates go through a pure fold so replaying the same result is a
//! no-op, then are applied under a row lock inside the caller's transaction.

use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order, QueryOrder,
    QuerySelect, Set,
};
use tracing::{info, warn};

use crate::entity::team;
use crate::error::AppError;
use crate::models::leaderboard::{StandingsResponse, StandingsRow};
use crate::state::AppState;

/// Result of folding one graded question result into a team's bests.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldedScore {
    pub testcases_passed: Vec<i64>,
    pub testcases_score: Vec<f64>,
    pub total: f64,
}

/// Fold a per-question result into the best-so-far arrays.
///
/// Both arrays are zero-padded out to `question_number` entries, the entry at
/// `question_number - 1` is raised to the new value if higher, and the total
/// is recomputed as the sum of per-question scores. Monotone and idempotent:
/// entries never decrease, and replaying identical arguments changes nothing.
pub fn fold_best(
    passed: &[i64],
    scores: &[f64],
    question_number: i32,
    passed_count: i64,
    new_score: f64,
) -> FoldedScore {
    let len = usize::max(question_number as usize, usize::max(passed.len(), scores.len()));

    let mut testcases_passed = passed.to_vec();
    testcases_passed.resize(len, 0);
    let mut testcases_score = scores.to_vec();
    testcases_score.resize(len, 0.0);

    let idx = (question_number - 1) as usize;
    testcases_passed[idx] = testcases_passed[idx].max(passed_count);
    testcases_score[idx] = testcases_score[idx].max(new_score);

    let total = testcases_score.iter().sum();

    FoldedScore {
        testcases_passed,
        testcases_score,
        total,
    }
}

/// Raise a team's best for one question and recompute its aggregate score.
///
/// Locks the team row so concurrent solves on different questions cannot
/// clobber each other's slot. All three fields persist together in the
/// caller's transaction.
pub async fn update_team_score<C: ConnectionTrait>(
    db: &C,
    team_id: i32,
    question_number: i32,
    passed_count: i32,
    new_score: f64,
) -> Result<(), AppError> {
    if question_number < 1 {
        return Err(AppError::Internal(format!(
            "Question number {question_number} is out of range"
        )));
    }

    let team = team::Entity::find_by_id(team_id)
        .lock(LockType::Update)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".into()))?;

    let passed: Vec<i64> = serde_json::from_value(team.testcases_passed.clone())
        .inspect_err(|e| warn!(team_id, error = %e, "Resetting unreadable testcases_passed"))
        .unwrap_or_default();
    let scores: Vec<f64> = serde_json::from_value(team.testcases_score.clone())
        .inspect_err(|e| warn!(team_id, error = %e, "Resetting unreadable testcases_score"))
        .unwrap_or_default();

    let folded = fold_best(&passed, &scores, question_number, passed_count as i64, new_score);

    info!(
        team_id,
        question_number,
        question_score = folded.testcases_score[(question_number - 1) as usize],
        total_score = folded.total,
        "Updated team score"
    );

    let mut active: team::ActiveModel = team.into();
    active.score = Set(folded.total);
    active.testcases_passed = Set(serde_json::json!(folded.testcases_passed));
    active.testcases_score = Set(serde_json::json!(folded.testcases_score));
    active.update(db).await?;

    Ok(())
}

/// Current standings, best score first. `year` narrows to one contest year.
pub async fn fetch_standings(
    db: &DatabaseConnection,
    year: Option<i32>,
) -> Result<StandingsResponse, AppError> {
    use sea_orm::{ColumnTrait, QueryFilter};

    let mut select = team::Entity::find().order_by(team::Column::Score, Order::Desc);
    if let Some(year) = year {
        select = select.filter(team::Column::Year.eq(year));
    }

    let teams = select.all(db).await?;

    let standings = teams
        .into_iter()
        .map(|t| StandingsRow {
            team_name: t.team_name,
            year: t.year,
            score: t.score,
            testcases_passed: serde_json::from_value(t.testcases_passed).unwrap_or_default(),
        })
        .collect();

    Ok(StandingsResponse { standings })
}

/// Push current standings to every connected leaderboard socket.
///
/// Runs after the grading transaction commits; a failure here must not fail
/// the submission that triggered it, so errors are logged and swallowed.
pub async fn broadcast_standings(state: &AppState) {
    let standings = match fetch_standings(&state.db, None).await {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to fetch standings for broadcast: {:?}", e);
            return;
        }
    };

    match serde_json::to_string(&standings) {
        Ok(json) => state.scoreboard.publish(json),
        Err(e) => warn!(error = %e, "Failed to serialize standings"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_pads_sparse_arrays() {
        let folded = fold_best(&[], &[], 3, 4, 25.0);
        assert_eq!(folded.testcases_passed, vec![0, 0, 4]);
        assert_eq!(folded.testcases_score, vec![0.0, 0.0, 25.0]);
        assert_eq!(folded.total, 25.0);
    }

    #[test]
    fn test_fold_keeps_existing_entries() {
        let folded = fold_best(&[3, 2], &[30.0, 12.5], 1, 1, 5.0);
        // A worse result never lowers a recorded best.
        assert_eq!(folded.testcases_passed, vec![3, 2]);
        assert_eq!(folded.testcases_score, vec![30.0, 12.5]);
        assert_eq!(folded.total, 42.5);
    }

    #[test]
    fn test_fold_raises_only_the_target_slot() {
        let folded = fold_best(&[1, 0], &[10.0, 0.0], 2, 3, 28.0);
        assert_eq!(folded.testcases_passed, vec![1, 3]);
        assert_eq!(folded.testcases_score, vec![10.0, 28.0]);
        assert_eq!(folded.total, 38.0);
    }

    #[test]
    fn test_fold_is_idempotent() {
        let first = fold_best(&[], &[], 2, 3, 28.0);
        let second = fold_best(
            &first.testcases_passed,
            &first.testcases_score,
            2,
            3,
            28.0,
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_total_is_sum_of_question_scores() {
        let mut passed = vec![];
        let mut scores = vec![];
        for (number, score) in [(1, 30.0), (3, 20.0), (2, 12.5)] {
            let folded = fold_best(&passed, &scores, number, 3, score);
            passed = folded.testcases_passed;
            scores = folded.testcases_score;
            assert_eq!(folded.total, scores.iter().sum::<f64>());
        }
        assert_eq!(scores.iter().sum::<f64>(), 62.5);
    }

    #[test]
    fn test_fold_tolerates_mismatched_array_lengths() {
        // Arrays can drift apart if a historical write was partial; the fold
        // normalizes both to the same length.
        let folded = fold_best(&[3], &[30.0, 15.0], 1, 3, 30.0);
        assert_eq!(folded.testcases_passed.len(), folded.testcases_score.len());
        assert_eq!(folded.total, 45.0);
    }
}
