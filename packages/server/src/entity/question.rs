use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "year_number")]
    pub year: i32,
    /// Ordinal within the year, assigned at creation. Doubles as the index
    /// (minus one) into the team score arrays.
    #[sea_orm(unique_key = "year_number")]
    pub number: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String, // in Markdown

    /// Reference solution; never served to teams.
    #[sea_orm(column_type = "Text")]
    pub correct_code: String,
    /// Broken scaffold teams start from.
    #[sea_orm(column_type = "Text")]
    pub incorrect_code: String,

    #[sea_orm(has_many)]
    pub test_cases: HasMany<super::test_case::Entity>,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
