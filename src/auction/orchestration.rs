//! Auction orchestration module
//!
//! The auction itself happens off-line; admins record each outcome here and
//! the ledger applies the ownership and budget effects.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assets::ledger;
use crate::auction::pricing::{self, AuctionStats};
use crate::entity::generals::PoolType;
use crate::entity::{auction_records, generals, users};
use crate::error::AppError;

/// One auction-pool general and, once recorded, its outcome
#[derive(Debug, Clone, Serialize)]
pub struct AuctionResult {
    pub general: generals::Model,
    pub record: Option<auction_records::Model>,
    pub winner_nickname: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AssignAuction {
    pub general_id: i32,
    pub winner: Option<Uuid>,
    pub price: Option<i32>,
    pub remark: String,
}

pub async fn auction_pool<C: ConnectionTrait>(conn: &C) -> Result<Vec<generals::Model>, AppError> {
    Ok(generals::Entity::find()
        .filter(generals::Column::PoolType.eq(PoolType::Auction))
        .order_by_asc(generals::Column::ExternalId)
        .all(conn)
        .await?)
}

pub async fn auction_results<C: ConnectionTrait>(conn: &C) -> Result<Vec<AuctionResult>, AppError> {
    let pool = auction_pool(conn).await?;

    let mut records: HashMap<i32, auction_records::Model> = auction_records::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|record| (record.general_id, record))
        .collect();

    let winner_ids: Vec<Uuid> = records.values().filter_map(|r| r.user_id).collect();
    let nicknames: HashMap<Uuid, String> = if winner_ids.is_empty() {
        HashMap::new()
    } else {
        users::Entity::find()
            .filter(users::Column::Id.is_in(winner_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|user| (user.id, user.nickname))
            .collect()
    };

    Ok(pool
        .into_iter()
        .map(|general| {
            let record = records.remove(&general.id);
            let winner_nickname = record
                .as_ref()
                .and_then(|r| r.user_id)
                .and_then(|id| nicknames.get(&id).cloned());
            AuctionResult {
                general,
                record,
                winner_nickname,
            }
        })
        .collect())
}

pub async fn auction_stats<C: ConnectionTrait>(conn: &C) -> Result<AuctionStats, AppError> {
    let pool_size = generals::Entity::find()
        .filter(generals::Column::PoolType.eq(PoolType::Auction))
        .count(conn)
        .await?;
    let records = auction_records::Entity::find().all(conn).await?;
    Ok(AuctionStats::tally(pool_size, &records))
}

/// Record the outcome of one auction. Not tied to the auction phase.
pub async fn assign_auction(
    db: &DatabaseConnection,
    request: AssignAuction,
) -> Result<auction_records::Model, AppError> {
    let record = db
        .transaction(|txn| Box::pin(assign_auction_transaction(request, txn)))
        .await?;
    info!(
        general_id = record.general_id,
        winner = ?record.user_id,
        price = record.price,
        "auction recorded"
    );
    Ok(record)
}

async fn assign_auction_transaction(
    request: AssignAuction,
    txn: &DatabaseTransaction,
) -> Result<auction_records::Model, AppError> {
    // Users before generals, the same order trade acceptance locks in
    let winner = match request.winner {
        Some(winner_id) => Some(ledger::lock_user(txn, winner_id).await?),
        None => None,
    };
    let general = ledger::lock_general(txn, request.general_id).await?;
    if general.pool_type != PoolType::Auction {
        return Err(AppError::GeneralNotFound);
    }

    let existing = auction_records::Entity::find()
        .filter(auction_records::Column::GeneralId.eq(general.id))
        .one(txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::GeneralAlreadyAuctioned);
    }

    let price = pricing::settle_price(request.winner, request.price, general.salary)?;

    if let Some(winner) = winner {
        if general.owner_id.is_some() {
            return Err(AppError::GeneralNotAvailable);
        }
        let winner_id = winner.id;
        ledger::charge(txn, winner, price).await?;
        ledger::assign_general(txn, general.clone(), winner_id).await?;
    }

    let now = Utc::now();
    let record = auction_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        general_id: Set(general.id),
        user_id: Set(request.winner),
        price: Set(price),
        is_unsold: Set(request.winner.is_none()),
        remark: Set(request.remark),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await?;
    Ok(record)
}

/// Undo a recorded auction, returning the general and refunding the winner
pub async fn reset_auction(db: &DatabaseConnection, record_id: Uuid) -> Result<(), AppError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let record = auction_records::Entity::find_by_id(record_id)
                .lock(LockType::Update)
                .one(txn)
                .await?
                .ok_or(AppError::AuctionRecordNotFound)?;
            reset_record(txn, record).await
        })
    })
    .await?;
    Ok(())
}

pub async fn reset_auction_by_general(
    db: &DatabaseConnection,
    general_id: i32,
) -> Result<(), AppError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let record = auction_records::Entity::find()
                .filter(auction_records::Column::GeneralId.eq(general_id))
                .lock(LockType::Update)
                .one(txn)
                .await?
                .ok_or(AppError::AuctionRecordNotFound)?;
            reset_record(txn, record).await
        })
    })
    .await?;
    Ok(())
}

async fn reset_record(
    txn: &DatabaseTransaction,
    record: auction_records::Model,
) -> Result<(), AppError> {
    if let Some(winner_id) = record.user_id {
        let winner = ledger::lock_user(txn, winner_id).await?;
        let general = ledger::lock_general(txn, record.general_id).await?;
        if general.owner_id == Some(winner_id) {
            ledger::release_general(txn, general).await?;
            ledger::refund(txn, winner, record.price).await?;
        } else {
            // Traded on since the auction; the current holder keeps it
            warn!(
                general_id = record.general_id,
                %winner_id,
                "auctioned general no longer held by winner, not reclaimed"
            );
        }
    }

    info!(general_id = record.general_id, "auction reset");
    record.delete(txn).await?;
    Ok(())
}
