use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Durable state of one team's work on one question. At most one row per
/// (team, question) pair; the append-only attempt history lives in
/// `submission_log`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "team_question")]
    pub team_id: i32,
    #[sea_orm(unique_key = "team_question")]
    pub question_id: i32,

    /// Most recently submitted code, kept current even after a solve.
    #[sea_orm(column_type = "Text")]
    pub code: String,
    /// Passed count of the latest graded attempt.
    pub testcases_passed: i32,
    /// Monotonic: once true, never reset. Freezes the penalty counters and
    /// stops score recomputation for this pair.
    pub all_passed: bool,
    /// Cumulative syntax-erroring attempts; never decremented.
    pub syntax_error: i32,
    /// Cumulative non-passing, non-syntax-error attempts; never decremented.
    pub wrong_submission: i32,

    #[sea_orm(belongs_to, from = "team_id", to = "id")]
    pub team: HasOne<super::team::Entity>,
    #[sea_orm(belongs_to, from = "question_id", to = "id")]
    pub question: HasOne<super::question::Entity>,

    #[sea_orm(has_many)]
    pub logs: HasMany<super::submission_log::Entity>,

    /// First graded attempt; immutable. Clock origin for time decay.
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
