//! Season orchestration module
//!
//! Player signup against the registration cap and the full season reset.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::assets::ledger;
use crate::config::GameRules;
use crate::entity::game_phase::{self, Phase};
use crate::entity::{
    auction_records, clubs, draft_records, draw_records, generals, trade_items, trade_logs,
    trades, treasures, users,
};
use crate::error::AppError;
use crate::policy::orchestration::reset_policy_transaction;
use crate::season::phase::{self, PhaseUpdate};

/// Sign a player up for the current season
pub async fn signup(
    db: &DatabaseConnection,
    rules: &GameRules,
    user_id: Uuid,
) -> Result<users::Model, AppError> {
    let rules = *rules;
    let user = db
        .transaction(|txn| Box::pin(signup_transaction(rules, user_id, txn)))
        .await?;
    info!(%user_id, space = user.space, "player signed up");
    Ok(user)
}

async fn signup_transaction(
    rules: GameRules,
    user_id: Uuid,
    txn: &DatabaseTransaction,
) -> Result<users::Model, AppError> {
    // The phase row lock serializes concurrent signups against the cap
    let state = phase::load_for_update(txn).await?;
    phase::ensure(&state, Phase::Signup)?;

    let user = ledger::lock_user(txn, user_id).await?;
    if user.is_registered {
        return Err(AppError::AlreadyRegistered);
    }

    let registered = users::Entity::find()
        .filter(users::Column::IsRegistered.eq(true))
        .count(txn)
        .await?;
    if registered >= rules.players_per_season {
        return Err(AppError::RegistrationFull);
    }

    let mut user: users::ActiveModel = user.into();
    user.is_registered = Set(true);
    user.space = Set(rules.initial_space);
    user.used_space = Set(0);
    user.updated_at = Set(Utc::now().into());
    Ok(user.update(txn).await?)
}

pub async fn registered_players<C: ConnectionTrait>(
    conn: &C,
) -> Result<Vec<users::Model>, AppError> {
    Ok(users::Entity::find()
        .filter(users::Column::IsRegistered.eq(true))
        .order_by_asc(users::Column::CreatedAt)
        .all(conn)
        .await?)
}

/// Admin write of the phase record. The draft round must lie within the
/// configured number of draft rounds.
pub async fn set_phase(
    db: &DatabaseConnection,
    rules: &GameRules,
    update: PhaseUpdate,
) -> Result<game_phase::Model, AppError> {
    if let Some(draft_round) = update.draft_round {
        if !(0..=rules.draft_rounds).contains(&draft_round) {
            return Err(AppError::InvalidRequest(format!(
                "draft round must be between 0 and {}",
                rules.draft_rounds
            )));
        }
    }
    if update.round_number.is_some_and(|round| round < 1) {
        return Err(AppError::InvalidRequest(
            "round number must be at least 1".to_string(),
        ));
    }

    Ok(db
        .transaction(|txn| Box::pin(async move { phase::write(txn, update).await }))
        .await?)
}

/// Return the league to an empty signup phase. Catalog data and accounts
/// survive; every allocation, trade and policy result is discarded.
pub async fn reset_season(
    db: &DatabaseConnection,
    rules: &GameRules,
) -> Result<game_phase::Model, AppError> {
    let rules = *rules;
    let state = db
        .transaction(|txn| Box::pin(reset_season_transaction(rules, txn)))
        .await?;
    info!(version = state.version, "season reset");
    Ok(state)
}

async fn reset_season_transaction(
    rules: GameRules,
    txn: &DatabaseTransaction,
) -> Result<game_phase::Model, AppError> {
    trade_logs::Entity::delete_many().exec(txn).await?;
    trade_items::Entity::delete_many().exec(txn).await?;
    trades::Entity::delete_many().exec(txn).await?;

    draw_records::Entity::delete_many().exec(txn).await?;
    draft_records::Entity::delete_many().exec(txn).await?;
    auction_records::Entity::delete_many().exec(txn).await?;

    reset_policy_transaction(txn).await?;

    let now = Utc::now();
    generals::Entity::update_many()
        .set(generals::ActiveModel {
            owner_id: Set(None),
            is_available: Set(true),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .exec(txn)
        .await?;
    treasures::Entity::update_many()
        .set(treasures::ActiveModel {
            owner_id: Set(None),
            is_available: Set(true),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .exec(txn)
        .await?;
    clubs::Entity::update_many()
        .set(clubs::ActiveModel {
            owner_id: Set(None),
            ..Default::default()
        })
        .exec(txn)
        .await?;

    users::Entity::update_many()
        .set(users::ActiveModel {
            space: Set(rules.initial_space),
            used_space: Set(0),
            club_id: Set(None),
            updated_at: Set(now.into()),
            ..Default::default()
        })
        .exec(txn)
        .await?;
    users::Entity::update_many()
        .set(users::ActiveModel {
            is_registered: Set(false),
            ..Default::default()
        })
        .filter(users::Column::IsAdmin.eq(false))
        .exec(txn)
        .await?;

    phase::write(txn, PhaseUpdate::initial()).await
}
