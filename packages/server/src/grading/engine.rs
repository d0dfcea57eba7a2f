//! Grading orchestration and the per-(team, question) submission state.
//!
//! A pair moves NEW -> ATTEMPTING -> SOLVED and never back. The transition
//! itself is a pure function over a snapshot of the locked row
//! ([`plan_transition`]); the async wrapper supplies the snapshot, applies
//! the plan, and keeps everything after the compiler call inside one
//! transaction so a crash can never split a log row from its state update.

use chrono::{DateTime, Utc};
use common::SubmissionStatus;
use common::compiler::{TestCasePayload, TestResult, classify, passed_count};
use common::scoring::submission_score;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entity::{question, submission, submission_log, team, test_case};
use crate::error::AppError;
use crate::grading::scoreboard;
use crate::state::AppState;

/// Snapshot of the submission row taken under the row lock, before this
/// attempt is applied.
#[derive(Debug, Clone)]
pub struct PriorState {
    pub all_passed: bool,
    pub syntax_error: i32,
    pub wrong_submission: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&submission::Model> for PriorState {
    fn from(row: &submission::Model) -> Self {
        Self {
            all_passed: row.all_passed,
            syntax_error: row.syntax_error,
            wrong_submission: row.wrong_submission,
            created_at: row.created_at,
        }
    }
}

/// One classified grading result.
#[derive(Debug, Clone)]
pub struct GradedAttempt {
    pub status: SubmissionStatus,
    pub passed_count: i32,
    pub total: i32,
}

/// Column updates to apply for this attempt, plus the score when the attempt
/// is the transition into SOLVED.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub testcases_passed: i32,
    pub all_passed: bool,
    pub syntax_error: i32,
    pub wrong_submission: i32,
    /// `Some(score)` exactly when this attempt newly solves the question.
    pub fresh_solve: Option<f64>,
}

/// Decide what a graded attempt does to the pair's state.
///
/// An already-solved pair only records the new code's passed count: counters
/// stay frozen and no score is computed, whatever the new outcome. Otherwise
/// the matching penalty counter advances (a syntax error is not also a wrong
/// submission), and an accepted attempt closes the pair with a score taken
/// from the counters as they stood *before* this attempt.
pub fn plan_transition(
    prior: &PriorState,
    attempt: &GradedAttempt,
    now: DateTime<Utc>,
) -> Transition {
    if prior.all_passed {
        return Transition {
            testcases_passed: attempt.passed_count,
            all_passed: true,
            syntax_error: prior.syntax_error,
            wrong_submission: prior.wrong_submission,
            fresh_solve: None,
        };
    }

    let (syntax_error, wrong_submission) = match attempt.status {
        SubmissionStatus::SyntaxError => (prior.syntax_error + 1, prior.wrong_submission),
        SubmissionStatus::WrongSubmission => (prior.syntax_error, prior.wrong_submission + 1),
        SubmissionStatus::Accepted => (prior.syntax_error, prior.wrong_submission),
    };

    let fresh_solve = attempt.status.is_accepted().then(|| {
        let elapsed_secs = (now - prior.created_at).num_seconds().max(0);
        submission_score(
            attempt.passed_count as i64,
            attempt.total as i64,
            elapsed_secs,
            prior.syntax_error as i64,
            prior.wrong_submission as i64,
        )
    });

    Transition {
        testcases_passed: attempt.passed_count,
        all_passed: attempt.status.is_accepted(),
        syntax_error,
        wrong_submission,
        fresh_solve,
    }
}

/// Everything the submit endpoint reports back for one graded attempt.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub submission_id: i32,
    pub status: SubmissionStatus,
    pub passed_count: i32,
    pub total: i32,
    /// Zero unless this attempt newly solved the question; zero is a normal
    /// outcome, not an error.
    pub new_score: f64,
    pub already_solved: bool,
    pub results: Vec<TestResult>,
}

/// Grade one code submission end to end.
///
/// The compiler call is the only long-latency await and runs before any
/// state is touched, so a collaborator failure leaves no trace. Everything
/// afterwards happens in a single transaction with the submission row (and,
/// on a fresh solve, the team row) locked.
#[instrument(skip(state, team, code), fields(team_id = team.id, question_id))]
pub async fn grade_submission(
    state: &AppState,
    team: &team::Model,
    question_id: i32,
    code: String,
) -> Result<SubmitOutcome, AppError> {
    let question = question::Entity::find_by_id(question_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".into()))?;

    if question.year != team.year {
        // Same response as an unknown id so other years' questions cannot be
        // probed.
        return Err(AppError::NotFound("Question not found".into()));
    }

    let cases = test_case::Entity::find()
        .filter(test_case::Column::QuestionId.eq(question.id))
        .order_by_asc(test_case::Column::Position)
        .all(&state.db)
        .await?;
    if cases.is_empty() {
        return Err(AppError::Validation(
            "No test cases found for this question".into(),
        ));
    }

    let payloads: Vec<TestCasePayload> = cases
        .into_iter()
        .map(|tc| TestCasePayload {
            input: tc.input,
            expected_output: tc.expected_output,
        })
        .collect();
    let total = payloads.len() as i32;

    let correlation_id = submission::Entity::find()
        .filter(submission::Column::TeamId.eq(team.id))
        .filter(submission::Column::QuestionId.eq(question.id))
        .one(&state.db)
        .await?
        .map(|s| s.id.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let results = state
        .compiler
        .run(&code, &payloads, &correlation_id)
        .await?;

    let now = Utc::now();
    let attempt = GradedAttempt {
        status: classify(&results, payloads.len()),
        passed_count: passed_count(&results) as i32,
        total,
    };

    let txn = state.db.begin().await?;

    // Make sure the pair row exists before taking the row lock. ON CONFLICT
    // DO NOTHING keeps a concurrent first attempt from aborting the
    // transaction.
    let insert = submission::Entity::insert(submission::ActiveModel {
        team_id: Set(team.id),
        question_id: Set(question.id),
        code: Set(code.clone()),
        testcases_passed: Set(0),
        all_passed: Set(false),
        syntax_error: Set(0),
        wrong_submission: Set(0),
        created_at: Set(now),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([submission::Column::TeamId, submission::Column::QuestionId])
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await;
    match insert {
        Ok(_) | Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    let row = submission::Entity::find()
        .filter(submission::Column::TeamId.eq(team.id))
        .filter(submission::Column::QuestionId.eq(question.id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::Internal("Submission row missing after insert".into()))?;

    let prior = PriorState::from(&row);

    // Exactly one log row per graded attempt, solved pair or not.
    submission_log::ActiveModel {
        submission_id: Set(row.id),
        status: Set(attempt.status),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let plan = plan_transition(&prior, &attempt, now);

    let submission_id = row.id;
    let mut active: submission::ActiveModel = row.into();
    active.code = Set(code);
    active.testcases_passed = Set(plan.testcases_passed);
    active.all_passed = Set(plan.all_passed);
    active.syntax_error = Set(plan.syntax_error);
    active.wrong_submission = Set(plan.wrong_submission);
    active.update(&txn).await?;

    let new_score = match plan.fresh_solve {
        Some(score) => {
            scoreboard::update_team_score(
                &txn,
                team.id,
                question.number,
                attempt.passed_count,
                score,
            )
            .await?;
            score
        }
        None => 0.0,
    };

    txn.commit().await?;

    info!(
        submission_id,
        status = %attempt.status,
        passed = attempt.passed_count,
        total = attempt.total,
        fresh_solve = plan.fresh_solve.is_some(),
        "Graded submission"
    );

    if plan.fresh_solve.is_some() {
        scoreboard::broadcast_standings(state).await;
    }

    Ok(SubmitOutcome {
        submission_id,
        status: attempt.status,
        passed_count: attempt.passed_count,
        total,
        new_score,
        already_solved: prior.all_passed,
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use common::scoring::{BASE, MAX_SCORE, MAX_SYNTAX, MAX_TIME_SECS, MAX_WRONG};

    fn attempting(syntax: i32, wrong: i32, created_at: DateTime<Utc>) -> PriorState {
        PriorState {
            all_passed: false,
            syntax_error: syntax,
            wrong_submission: wrong,
            created_at,
        }
    }

    fn attempt(status: SubmissionStatus, passed: i32, total: i32) -> GradedAttempt {
        GradedAttempt {
            status,
            passed_count: passed,
            total,
        }
    }

    #[test]
    fn test_first_attempt_syntax_error() {
        let now = Utc::now();
        let plan = plan_transition(
            &attempting(0, 0, now),
            &attempt(SubmissionStatus::SyntaxError, 0, 3),
            now,
        );
        assert_eq!(plan.syntax_error, 1);
        // A syntax error is not also counted as a wrong submission.
        assert_eq!(plan.wrong_submission, 0);
        assert!(!plan.all_passed);
        assert_eq!(plan.fresh_solve, None);
    }

    #[test]
    fn test_wrong_submission_increments_only_wrong() {
        let now = Utc::now();
        let plan = plan_transition(
            &attempting(2, 5, now),
            &attempt(SubmissionStatus::WrongSubmission, 1, 3),
            now,
        );
        assert_eq!(plan.syntax_error, 2);
        assert_eq!(plan.wrong_submission, 6);
        assert_eq!(plan.testcases_passed, 1);
        assert_eq!(plan.fresh_solve, None);
    }

    #[test]
    fn test_instant_clean_solve_scores_max() {
        let now = Utc::now();
        let plan = plan_transition(
            &attempting(0, 0, now),
            &attempt(SubmissionStatus::Accepted, 3, 3),
            now,
        );
        assert!(plan.all_passed);
        assert_eq!(plan.syntax_error, 0);
        assert_eq!(plan.wrong_submission, 0);
        assert_eq!(plan.fresh_solve, Some(MAX_SCORE));
    }

    #[test]
    fn test_solve_scores_with_pre_increment_counters() {
        let created = Utc::now();
        let now = created + Duration::seconds(10);
        let plan = plan_transition(
            &attempting(2, 3, created),
            &attempt(SubmissionStatus::Accepted, 3, 3),
            now,
        );
        let expected = submission_score(3, 3, 10, 2, 3);
        assert_eq!(plan.fresh_solve, Some(expected));
        // The accepted attempt itself advances no counter.
        assert_eq!(plan.syntax_error, 2);
        assert_eq!(plan.wrong_submission, 3);
    }

    #[test]
    fn test_solve_after_exhausted_budgets_still_scores_base() {
        let created = Utc::now();
        let now = created + Duration::seconds(MAX_TIME_SECS * 3);
        let plan = plan_transition(
            &attempting(MAX_SYNTAX as i32 + 1, MAX_WRONG as i32 + 1, created),
            &attempt(SubmissionStatus::Accepted, 4, 4),
            now,
        );
        assert_eq!(plan.fresh_solve, Some(BASE));
    }

    #[test]
    fn test_solved_pair_is_frozen() {
        let now = Utc::now();
        let prior = PriorState {
            all_passed: true,
            syntax_error: 4,
            wrong_submission: 7,
            created_at: now - Duration::seconds(600),
        };

        for status in [
            SubmissionStatus::SyntaxError,
            SubmissionStatus::WrongSubmission,
            SubmissionStatus::Accepted,
        ] {
            let plan = plan_transition(&prior, &attempt(status, 2, 3), now);
            assert!(plan.all_passed);
            assert_eq!(plan.syntax_error, 4);
            assert_eq!(plan.wrong_submission, 7);
            assert_eq!(plan.fresh_solve, None);
            // Record-keeping still tracks the latest attempt.
            assert_eq!(plan.testcases_passed, 2);
        }
    }

    #[test]
    fn test_clock_skew_clamps_to_zero_elapsed() {
        let created = Utc::now();
        let now = created - Duration::seconds(30);
        let plan = plan_transition(
            &attempting(0, 0, created),
            &attempt(SubmissionStatus::Accepted, 3, 3),
            now,
        );
        assert_eq!(plan.fresh_solve, Some(MAX_SCORE));
    }

    #[test]
    fn test_partial_pass_never_solves() {
        let now = Utc::now();
        let plan = plan_transition(
            &attempting(0, 0, now),
            &attempt(SubmissionStatus::WrongSubmission, 2, 3),
            now,
        );
        assert!(!plan.all_passed);
        assert_eq!(plan.fresh_solve, None);
    }
}
