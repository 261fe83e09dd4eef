//! Asset ledger
//!
//! Ownership and budget mutations shared by the draw allocator, the policy
//! engine, the trade engine and the auction ledger. Every helper here runs
//! on the caller's transaction; none of them commits.

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QuerySelect, Set};
use uuid::Uuid;

use crate::entity::{generals, treasures, users};
use crate::error::AppError;

/// Check that `cost` fits in the user's remaining budget
///
/// This function is PURE.
pub fn ensure_affordable(user: &users::Model, cost: i32) -> Result<(), AppError> {
    let available = user.remaining_space();
    if cost > available {
        return Err(AppError::InsufficientSpace {
            needed: cost,
            available,
        });
    }
    Ok(())
}

/// Used space after applying `delta`, floored at zero. Fails if the result
/// would exceed the user's space.
///
/// This function is PURE.
pub fn shifted_used_space(user: &users::Model, delta: i32) -> Result<i32, AppError> {
    let next = (user.used_space + delta).max(0);
    if next > user.space {
        return Err(AppError::InsufficientSpace {
            needed: delta,
            available: user.remaining_space(),
        });
    }
    Ok(next)
}

/// Used space after a refund, floored at zero
///
/// This function is PURE.
pub fn refunded_used_space(used_space: i32, refund: i32) -> i32 {
    (used_space - refund).max(0)
}

pub(crate) async fn lock_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<users::Model, AppError> {
    users::Entity::find_by_id(user_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::UserNotFound)
}

pub(crate) async fn lock_general<C: ConnectionTrait>(
    conn: &C,
    general_id: i32,
) -> Result<generals::Model, AppError> {
    generals::Entity::find_by_id(general_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::GeneralNotFound)
}

pub(crate) async fn set_used_space<C: ConnectionTrait>(
    conn: &C,
    user: users::Model,
    used_space: i32,
) -> Result<users::Model, AppError> {
    let mut user: users::ActiveModel = user.into();
    user.used_space = Set(used_space);
    user.updated_at = Set(Utc::now().into());
    Ok(user.update(conn).await?)
}

/// Charge `cost` to the user, failing if it does not fit
pub(crate) async fn charge<C: ConnectionTrait>(
    conn: &C,
    user: users::Model,
    cost: i32,
) -> Result<users::Model, AppError> {
    ensure_affordable(&user, cost)?;
    let used_space = user.used_space + cost;
    set_used_space(conn, user, used_space).await
}

/// Give back `amount`, never dropping below zero used space
pub(crate) async fn refund<C: ConnectionTrait>(
    conn: &C,
    user: users::Model,
    amount: i32,
) -> Result<users::Model, AppError> {
    let used_space = refunded_used_space(user.used_space, amount);
    set_used_space(conn, user, used_space).await
}

/// Hand a general to `owner`
pub(crate) async fn assign_general<C: ConnectionTrait>(
    conn: &C,
    general: generals::Model,
    owner: Uuid,
) -> Result<generals::Model, AppError> {
    let mut general: generals::ActiveModel = general.into();
    general.owner_id = Set(Some(owner));
    general.is_available = Set(false);
    general.updated_at = Set(Utc::now().into());
    Ok(general.update(conn).await?)
}

/// Return a general to its pool
pub(crate) async fn release_general<C: ConnectionTrait>(
    conn: &C,
    general: generals::Model,
) -> Result<generals::Model, AppError> {
    let mut general: generals::ActiveModel = general.into();
    general.owner_id = Set(None);
    general.is_available = Set(true);
    general.updated_at = Set(Utc::now().into());
    Ok(general.update(conn).await?)
}

pub(crate) async fn assign_treasure<C: ConnectionTrait>(
    conn: &C,
    treasure: treasures::Model,
    owner: Uuid,
) -> Result<treasures::Model, AppError> {
    let mut treasure: treasures::ActiveModel = treasure.into();
    treasure.owner_id = Set(Some(owner));
    treasure.is_available = Set(false);
    treasure.updated_at = Set(Utc::now().into());
    Ok(treasure.update(conn).await?)
}
