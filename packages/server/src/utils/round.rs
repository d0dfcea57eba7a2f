use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::admin;
use crate::error::AppError;

/// Read the active round from the primary admin row.
pub async fn current_round<C: ConnectionTrait>(
    db: &C,
    primary_admin: &str,
) -> Result<i32, AppError> {
    let row = admin::Entity::find()
        .filter(admin::Column::Username.eq(primary_admin))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("Primary admin record not found".into()))?;
    Ok(row.current_round)
}

/// Reject unless the given round is currently active.
pub async fn require_round<C: ConnectionTrait>(
    db: &C,
    primary_admin: &str,
    round: i32,
) -> Result<(), AppError> {
    let active = current_round(db, primary_admin).await?;
    if active != round {
        return Err(AppError::RoundClosed(format!(
            "Round {round} is not currently active"
        )));
    }
    Ok(())
}
