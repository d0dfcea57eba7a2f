use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AdminConfig;
use crate::entity::{admin, submission_log};
use crate::utils::hash;

/// Seed the primary admin account from configuration.
///
/// The account's `current_round` gates submission intake, so the row must
/// exist before the first request. An existing row is left untouched,
/// password included, so round state survives restarts.
pub async fn seed_admin(db: &DatabaseConnection, config: &AdminConfig) -> anyhow::Result<()> {
    let password_hash = hash::hash_password(&config.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    let model = admin::ActiveModel {
        username: Set(config.username.clone()),
        email: Set(config.email.trim().to_lowercase()),
        password: Set(password_hash),
        current_round: Set(1),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = admin::Entity::insert(model)
        .on_conflict(
            OnConflict::column(admin::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!(username = %config.username, "Seeded primary admin account"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for rate limiting and history queries:
    // SELECT ... FROM submission_log WHERE submission_id IN (...) AND created_at > ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_submission_log_submission_created")
        .table(submission_log::Entity)
        .col(submission_log::Column::SubmissionId)
        .col(submission_log::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_submission_log_submission_created exists");
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create index idx_submission_log_submission_created: {}",
                e
            );
        }
    }

    Ok(())
}
