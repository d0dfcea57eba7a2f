use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub team_name: String,
    /// Contest year this team competes in; scopes which questions it sees.
    pub year: i32,

    /// Aggregate score, always the sum of `testcases_score`.
    pub score: f64,
    /// Best passed-count per question, JSON array indexed by `number - 1`.
    #[sea_orm(column_type = "JsonBinary")]
    pub testcases_passed: serde_json::Value,
    /// Best score per question, JSON array indexed by `number - 1`.
    #[sea_orm(column_type = "JsonBinary")]
    pub testcases_score: serde_json::Value,

    /// Pending login OTP; cleared on successful verification.
    pub otp_code: Option<String>,
    pub otp_generated_at: Option<DateTimeUtc>,
    pub otp_expires_at: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub members: HasMany<super::team_member::Entity>,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
