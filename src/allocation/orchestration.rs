//! Allocation orchestration module
//!
//! Database-coupled draw and draft operations. Each public operation runs in
//! its own transaction; the helpers taking a `DatabaseTransaction` never
//! commit.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use rand::Rng;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::allocation::quota::{self, DrawMode, DrawStatus};
use crate::assets::ledger;
use crate::config::GameRules;
use crate::entity::draw_records::DrawType;
use crate::entity::game_phase::Phase;
use crate::entity::generals::PoolType;
use crate::entity::{draft_records, draw_records, generals, users};
use crate::error::{AppError, ErrorKind};
use crate::season::phase;

#[derive(Debug, Clone, Serialize)]
pub struct DrawOutcome {
    pub general: generals::Model,
    pub draw_type: DrawType,
    pub status: DrawStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftOutcome {
    pub general: generals::Model,
    pub record: draft_records::Model,
}

/// Result of drawing on a player's behalf until their quota is used
#[derive(Debug, Clone, Serialize)]
pub struct AdminDrawReport {
    pub user_id: Uuid,
    pub username: String,
    pub generals: Vec<generals::Model>,
    /// Error code that stopped the run before the quota was used, if any
    pub halted_by: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DrawResetReport {
    pub user_id: Uuid,
    pub released_generals: Vec<i32>,
    pub refunded: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerDraws {
    pub user_id: Uuid,
    pub username: String,
    pub nickname: String,
    pub generals: Vec<generals::Model>,
    pub total_salary: i32,
}

pub async fn draw_status<C: ConnectionTrait>(
    conn: &C,
    rules: &GameRules,
    user_id: Uuid,
) -> Result<DrawStatus, AppError> {
    let guarantee_done = count_draws(conn, user_id, DrawType::Guarantee).await?;
    let normal_done = count_draws(conn, user_id, DrawType::Normal).await?;
    Ok(DrawStatus::from_counts(rules, guarantee_done, normal_done))
}

async fn count_draws<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    draw_type: DrawType,
) -> Result<u32, AppError> {
    let count = draw_records::Entity::find()
        .filter(draw_records::Column::UserId.eq(user_id))
        .filter(draw_records::Column::DrawType.eq(draw_type))
        .count(conn)
        .await?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// One random draw for a player
pub async fn draw<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    rules: &GameRules,
    user_id: Uuid,
    mode: DrawMode,
    rng: &mut R,
) -> Result<DrawOutcome, AppError> {
    let txn = db.begin().await?;
    let outcome = draw_in(&txn, rules, user_id, mode, rng, true).await?;
    txn.commit().await?;

    info!(
        %user_id,
        general_id = outcome.general.id,
        draw_type = ?outcome.draw_type,
        salary = outcome.general.salary,
        "general drawn"
    );
    Ok(outcome)
}

async fn draw_in<R: Rng + ?Sized>(
    txn: &DatabaseTransaction,
    rules: &GameRules,
    user_id: Uuid,
    mode: DrawMode,
    rng: &mut R,
    enforce_phase: bool,
) -> Result<DrawOutcome, AppError> {
    if enforce_phase {
        let state = phase::load(txn).await?;
        phase::ensure(&state, Phase::Draw)?;
    }

    let user = ledger::lock_user(txn, user_id).await?;
    if !user.is_registered {
        return Err(AppError::NotRegistered);
    }

    let status = draw_status(txn, rules, user_id).await?;
    let draw_type = quota::next_draw_type(&status, mode)?;

    let pool_type = draw_type.pool();
    let pool = generals::Entity::find()
        .filter(generals::Column::PoolType.eq(pool_type))
        .filter(generals::Column::IsAvailable.eq(true))
        .filter(generals::Column::OwnerId.is_null())
        .order_by_asc(generals::Column::Id)
        .lock(LockType::Update)
        .all(txn)
        .await?;

    let general = quota::pick_uniform(&pool, rng)
        .cloned()
        .ok_or(AppError::NoAvailableAssets(pool_name(pool_type)))?;
    ledger::ensure_affordable(&user, general.salary)?;

    let general = ledger::assign_general(txn, general, user_id).await?;
    ledger::charge(txn, user, general.salary).await?;

    draw_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        general_id: Set(general.id),
        draw_type: Set(draw_type),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;

    let status = match draw_type {
        DrawType::Guarantee => {
            DrawStatus::from_counts(rules, status.guarantee_done + 1, status.normal_done)
        }
        DrawType::Normal => {
            DrawStatus::from_counts(rules, status.guarantee_done, status.normal_done + 1)
        }
    };

    Ok(DrawOutcome {
        general,
        draw_type,
        status,
    })
}

fn pool_name(pool_type: PoolType) -> &'static str {
    match pool_type {
        PoolType::Guarantee => "guarantee",
        PoolType::Normal => "normal",
        PoolType::Draft => "draft",
        PoolType::Auction => "auction",
    }
}

/// Draw for a player until the quota is used, ignoring the current phase.
/// Each draw commits on its own.
pub async fn draw_for_user<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    rules: &GameRules,
    user_id: Uuid,
    rng: &mut R,
) -> Result<AdminDrawReport, AppError> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let mut drawn = Vec::new();
    let mut halted_by = None;
    loop {
        let txn = db.begin().await?;
        match draw_in(&txn, rules, user_id, DrawMode::Auto, rng, false).await {
            Ok(outcome) => {
                txn.commit().await?;
                drawn.push(outcome.general);
            }
            Err(AppError::DrawLimitReached) => break,
            Err(err) if err.kind() != ErrorKind::Internal => {
                warn!(%user_id, code = err.code(), "admin draw stopped early");
                halted_by = Some(err.code());
                break;
            }
            Err(err) => return Err(err),
        }
    }

    info!(%user_id, count = drawn.len(), "admin draw completed");
    Ok(AdminDrawReport {
        user_id,
        username: user.username,
        generals: drawn,
        halted_by,
    })
}

pub async fn draw_for_all_users<R: Rng + ?Sized>(
    db: &DatabaseConnection,
    rules: &GameRules,
    rng: &mut R,
) -> Result<Vec<AdminDrawReport>, AppError> {
    let players = users::Entity::find()
        .filter(users::Column::IsRegistered.eq(true))
        .order_by_asc(users::Column::CreatedAt)
        .all(db)
        .await?;

    let mut reports = Vec::with_capacity(players.len());
    for player in players {
        reports.push(draw_for_user(db, rules, player.id, rng).await?);
    }
    Ok(reports)
}

/// Undo every draw and draft of one player
pub async fn reset_user_draws(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<DrawResetReport, AppError> {
    let report = db
        .transaction(|txn| Box::pin(reset_user_in(user_id, txn)))
        .await?;
    info!(
        %user_id,
        released = report.released_generals.len(),
        refunded = report.refunded,
        "draws reset"
    );
    Ok(report)
}

pub async fn reset_all_draws(db: &DatabaseConnection) -> Result<Vec<DrawResetReport>, AppError> {
    let reports = db
        .transaction(|txn| {
            Box::pin(async move {
                let mut user_ids = BTreeSet::new();
                for record in draw_records::Entity::find().all(txn).await? {
                    user_ids.insert(record.user_id);
                }
                for record in draft_records::Entity::find().all(txn).await? {
                    user_ids.insert(record.user_id);
                }

                let mut reports = Vec::with_capacity(user_ids.len());
                for user_id in user_ids {
                    reports.push(reset_user_in(user_id, txn).await?);
                }
                Ok::<_, AppError>(reports)
            })
        })
        .await?;
    info!(players = reports.len(), "all draws reset");
    Ok(reports)
}

async fn reset_user_in(
    user_id: Uuid,
    txn: &DatabaseTransaction,
) -> Result<DrawResetReport, AppError> {
    let user = ledger::lock_user(txn, user_id).await?;

    let mut general_ids = BTreeSet::new();
    for record in draw_records::Entity::find()
        .filter(draw_records::Column::UserId.eq(user_id))
        .all(txn)
        .await?
    {
        general_ids.insert(record.general_id);
    }
    for record in draft_records::Entity::find()
        .filter(draft_records::Column::UserId.eq(user_id))
        .all(txn)
        .await?
    {
        general_ids.insert(record.general_id);
    }

    // Generals traded away since the draw stay with their new owner
    let held = generals::Entity::find()
        .filter(generals::Column::Id.is_in(general_ids))
        .filter(generals::Column::OwnerId.eq(user_id))
        .lock(LockType::Update)
        .all(txn)
        .await?;

    let mut refunded = 0;
    let mut released_generals = Vec::with_capacity(held.len());
    for general in held {
        refunded += general.salary;
        released_generals.push(general.id);
        ledger::release_general(txn, general).await?;
    }

    draw_records::Entity::delete_many()
        .filter(draw_records::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;
    draft_records::Entity::delete_many()
        .filter(draft_records::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    ledger::refund(txn, user, refunded).await?;

    Ok(DrawResetReport {
        user_id,
        released_generals,
        refunded,
    })
}

/// Take a specific general from the draft pool
pub async fn draft_pick(
    db: &DatabaseConnection,
    user_id: Uuid,
    general_id: i32,
) -> Result<DraftOutcome, AppError> {
    let outcome = db
        .transaction(|txn| Box::pin(draft_pick_transaction(user_id, general_id, txn)))
        .await?;
    info!(
        %user_id,
        general_id,
        round = outcome.record.round,
        pick = outcome.record.pick,
        "general drafted"
    );
    Ok(outcome)
}

async fn draft_pick_transaction(
    user_id: Uuid,
    general_id: i32,
    txn: &DatabaseTransaction,
) -> Result<DraftOutcome, AppError> {
    let state = phase::load(txn).await?;
    phase::ensure(&state, Phase::Draft)?;

    let user = ledger::lock_user(txn, user_id).await?;
    if !user.is_registered {
        return Err(AppError::NotRegistered);
    }

    let general = ledger::lock_general(txn, general_id).await?;
    if general.pool_type != PoolType::Draft || !general.is_available || general.owner_id.is_some()
    {
        return Err(AppError::GeneralNotAvailable);
    }
    ledger::ensure_affordable(&user, general.salary)?;

    let general = ledger::assign_general(txn, general, user_id).await?;
    ledger::charge(txn, user, general.salary).await?;

    let picks_this_round = draft_records::Entity::find()
        .filter(draft_records::Column::Round.eq(state.draft_round))
        .count(txn)
        .await?;

    let record = draft_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        general_id: Set(general.id),
        round: Set(state.draft_round),
        pick: Set(i32::try_from(picks_this_round).unwrap_or(i32::MAX - 1) + 1),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;

    Ok(DraftOutcome { general, record })
}

/// Unowned generals of one pool, by catalog order
pub async fn available_pool<C: ConnectionTrait>(
    conn: &C,
    pool_type: PoolType,
) -> Result<Vec<generals::Model>, AppError> {
    Ok(generals::Entity::find()
        .filter(generals::Column::PoolType.eq(pool_type))
        .filter(generals::Column::IsAvailable.eq(true))
        .order_by_asc(generals::Column::ExternalId)
        .all(conn)
        .await?)
}

pub async fn user_draws<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<(draw_records::Model, Option<generals::Model>)>, AppError> {
    Ok(draw_records::Entity::find()
        .filter(draw_records::Column::UserId.eq(user_id))
        .order_by_asc(draw_records::Column::CreatedAt)
        .find_also_related(generals::Entity)
        .all(conn)
        .await?)
}

pub async fn user_drafts<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<(draft_records::Model, Option<generals::Model>)>, AppError> {
    Ok(draft_records::Entity::find()
        .filter(draft_records::Column::UserId.eq(user_id))
        .order_by_asc(draft_records::Column::Round)
        .order_by_asc(draft_records::Column::Pick)
        .find_also_related(generals::Entity)
        .all(conn)
        .await?)
}

/// Everything each player drew, for the public results board
pub async fn draw_results<C: ConnectionTrait>(conn: &C) -> Result<Vec<PlayerDraws>, AppError> {
    let records = draw_records::Entity::find()
        .order_by_asc(draw_records::Column::CreatedAt)
        .find_also_related(generals::Entity)
        .all(conn)
        .await?;

    let mut by_user: HashMap<Uuid, Vec<generals::Model>> = HashMap::new();
    for (record, general) in records {
        if let Some(general) = general {
            by_user.entry(record.user_id).or_default().push(general);
        }
    }

    let players = users::Entity::find()
        .filter(users::Column::IsRegistered.eq(true))
        .order_by_asc(users::Column::CreatedAt)
        .all(conn)
        .await?;

    Ok(players
        .into_iter()
        .map(|player| {
            let generals = by_user.remove(&player.id).unwrap_or_default();
            let total_salary = generals.iter().map(|g| g.salary).sum();
            PlayerDraws {
                user_id: player.id,
                username: player.username,
                nickname: player.nickname,
                generals,
                total_salary,
            }
        })
        .collect())
}
