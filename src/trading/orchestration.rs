//! Trade orchestration module
//!
//! Proposal, acceptance, rejection and cancellation of player-to-player
//! trades. Acceptance re-validates ownership under row locks and applies all
//! four legs of the swap in a single transaction.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::assets::ledger;
use crate::dto::trade_view::TradeView;
use crate::entity::trade_items::{AssetKind, TradeSide};
use crate::entity::trade_logs::TradeAction;
use crate::entity::trades::TradeStatus;
use crate::entity::{generals, trade_items, trade_logs, trades, treasures, users};
use crate::error::AppError;
use crate::season::phase;
use crate::trading::settlement::{self, TradeTerms};

/// Propose a trade to another registered player
pub async fn create_trade(
    db: &DatabaseConnection,
    proposer_id: Uuid,
    receiver_id: Uuid,
    terms: TradeTerms,
    message: String,
) -> Result<TradeView, AppError> {
    let view = db
        .transaction(|txn| {
            Box::pin(create_trade_transaction(
                proposer_id,
                receiver_id,
                terms,
                message,
                txn,
            ))
        })
        .await?;

    info!(
        trade_id = %view.trade.id,
        %proposer_id,
        %receiver_id,
        "trade proposed"
    );
    Ok(view)
}

async fn create_trade_transaction(
    proposer_id: Uuid,
    receiver_id: Uuid,
    terms: TradeTerms,
    message: String,
    txn: &DatabaseTransaction,
) -> Result<TradeView, AppError> {
    let state = phase::load(txn).await?;
    if !state.current_phase.allows_trade_proposals() {
        return Err(AppError::wrong_phase("trading", state.current_phase));
    }

    if proposer_id == receiver_id {
        return Err(AppError::CannotTradeWithSelf);
    }
    settlement::validate_terms(&terms)?;

    let proposer = find_user(txn, proposer_id).await?;
    let receiver = find_user(txn, receiver_id).await?;
    if !proposer.is_registered || !receiver.is_registered {
        return Err(AppError::NotRegistered);
    }

    let offered_generals = load_generals(txn, &terms.offer_generals, false).await?;
    let offered_treasures = load_treasures(txn, &terms.offer_treasures, false).await?;
    if !all_generals_owned_by(&offered_generals, proposer_id)
        || !all_treasures_owned_by(&offered_treasures, proposer_id)
    {
        return Err(AppError::ItemNotOwned);
    }

    let requested_generals = load_generals(txn, &terms.request_generals, false).await?;
    let requested_treasures = load_treasures(txn, &terms.request_treasures, false).await?;
    if !all_generals_owned_by(&requested_generals, receiver_id)
        || !all_treasures_owned_by(&requested_treasures, receiver_id)
    {
        return Err(AppError::InvalidTradeItems);
    }

    let now = Utc::now();
    let trade = trades::ActiveModel {
        id: Set(Uuid::new_v4()),
        proposer_id: Set(proposer_id),
        receiver_id: Set(receiver_id),
        offer_space: Set(terms.offer_space),
        request_space: Set(terms.request_space),
        status: Set(TradeStatus::Pending),
        message: Set(message),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await?;

    let legs = [
        (TradeSide::Offer, AssetKind::General, &terms.offer_generals),
        (TradeSide::Offer, AssetKind::Treasure, &terms.offer_treasures),
        (TradeSide::Request, AssetKind::General, &terms.request_generals),
        (TradeSide::Request, AssetKind::Treasure, &terms.request_treasures),
    ];
    let mut items = Vec::new();
    let mut position = 0;
    for (side, asset_kind, ids) in legs {
        for asset_id in ids {
            let item = trade_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                trade_id: Set(trade.id),
                side: Set(side),
                asset_kind: Set(asset_kind),
                asset_id: Set(*asset_id),
                position: Set(position),
            }
            .insert(txn)
            .await?;
            items.push(item);
            position += 1;
        }
    }

    append_log(txn, trade.id, TradeAction::Created, proposer_id, "trade proposed").await?;

    Ok(TradeView::from_parts(trade, items))
}

enum AcceptOutcome {
    Executed(TradeView),
    Invalidated,
}

/// Accept a pending trade as its receiver.
///
/// When any asset changed hands since the proposal the trade is cancelled,
/// the cancellation is committed and `TradeOwnershipChanged` is returned.
pub async fn accept_trade(
    db: &DatabaseConnection,
    trade_id: Uuid,
    user_id: Uuid,
) -> Result<TradeView, AppError> {
    let outcome = db
        .transaction(|txn| Box::pin(accept_trade_transaction(trade_id, user_id, txn)))
        .await?;

    match outcome {
        AcceptOutcome::Executed(view) => {
            info!(%trade_id, %user_id, "trade accepted");
            Ok(view)
        }
        AcceptOutcome::Invalidated => {
            warn!(%trade_id, %user_id, "trade cancelled, assets changed hands");
            Err(AppError::TradeOwnershipChanged)
        }
    }
}

async fn accept_trade_transaction(
    trade_id: Uuid,
    user_id: Uuid,
    txn: &DatabaseTransaction,
) -> Result<AcceptOutcome, AppError> {
    let trade = lock_trade(txn, trade_id).await?;
    if trade.receiver_id != user_id {
        return Err(AppError::NotTradeParticipant);
    }
    if trade.status != TradeStatus::Pending {
        return Err(AppError::TradeAlreadyProcessed);
    }

    let items = load_items(txn, trade_id).await?;
    let view = TradeView::from_parts(trade.clone(), items);

    // Lock both users in id order
    let (first, second) = if trade.proposer_id < trade.receiver_id {
        (trade.proposer_id, trade.receiver_id)
    } else {
        (trade.receiver_id, trade.proposer_id)
    };
    let mut locked = HashMap::new();
    for id in [first, second] {
        locked.insert(id, ledger::lock_user(txn, id).await?);
    }
    let proposer = locked.remove(&trade.proposer_id).ok_or(AppError::UserNotFound)?;
    let receiver = locked.remove(&trade.receiver_id).ok_or(AppError::UserNotFound)?;

    let Some(legs) = lock_legs(txn, &trade, &view).await? else {
        finish(txn, trade, TradeStatus::Cancelled).await?;
        append_log(
            txn,
            trade_id,
            TradeAction::Cancelled,
            user_id,
            "assets changed hands before acceptance",
        )
        .await?;
        return Ok(AcceptOutcome::Invalidated);
    };
    let Legs {
        offered_generals,
        offered_treasures,
        requested_generals,
        requested_treasures,
    } = legs;

    let offered_salaries: i32 = offered_generals.iter().map(|g| g.salary).sum();
    let requested_salaries: i32 = requested_generals.iter().map(|g| g.salary).sum();
    let deltas = settlement::space_deltas(
        offered_salaries,
        requested_salaries,
        trade.offer_space,
        trade.request_space,
    );
    let proposer_used = ledger::shifted_used_space(&proposer, deltas.proposer)?;
    let receiver_used = ledger::shifted_used_space(&receiver, deltas.receiver)?;

    for general in offered_generals {
        ledger::assign_general(txn, general, trade.receiver_id).await?;
    }
    for treasure in offered_treasures {
        ledger::assign_treasure(txn, treasure, trade.receiver_id).await?;
    }
    for general in requested_generals {
        ledger::assign_general(txn, general, trade.proposer_id).await?;
    }
    for treasure in requested_treasures {
        ledger::assign_treasure(txn, treasure, trade.proposer_id).await?;
    }

    ledger::set_used_space(txn, proposer, proposer_used).await?;
    ledger::set_used_space(txn, receiver, receiver_used).await?;

    let trade = finish(txn, trade, TradeStatus::Accepted).await?;
    append_log(
        txn,
        trade_id,
        TradeAction::Accepted,
        user_id,
        &format!(
            "proposer space {:+}, receiver space {:+}",
            deltas.proposer, deltas.receiver
        ),
    )
    .await?;

    Ok(AcceptOutcome::Executed(TradeView { trade, ..view }))
}

struct Legs {
    offered_generals: Vec<generals::Model>,
    offered_treasures: Vec<treasures::Model>,
    requested_generals: Vec<generals::Model>,
    requested_treasures: Vec<treasures::Model>,
}

/// Lock every asset of the trade. `None` when an asset is gone or no longer
/// held by the side that put it up.
async fn lock_legs(
    txn: &DatabaseTransaction,
    trade: &trades::Model,
    view: &TradeView,
) -> Result<Option<Legs>, AppError> {
    let Some(offered_generals) = present(load_generals(txn, &view.offer_generals, true).await)?
    else {
        return Ok(None);
    };
    let Some(offered_treasures) =
        present(load_treasures(txn, &view.offer_treasures, true).await)?
    else {
        return Ok(None);
    };
    let Some(requested_generals) =
        present(load_generals(txn, &view.request_generals, true).await)?
    else {
        return Ok(None);
    };
    let Some(requested_treasures) =
        present(load_treasures(txn, &view.request_treasures, true).await)?
    else {
        return Ok(None);
    };

    let still_held = all_generals_owned_by(&offered_generals, trade.proposer_id)
        && all_treasures_owned_by(&offered_treasures, trade.proposer_id)
        && all_generals_owned_by(&requested_generals, trade.receiver_id)
        && all_treasures_owned_by(&requested_treasures, trade.receiver_id);
    if !still_held {
        return Ok(None);
    }

    Ok(Some(Legs {
        offered_generals,
        offered_treasures,
        requested_generals,
        requested_treasures,
    }))
}

fn present<T>(result: Result<T, AppError>) -> Result<Option<T>, AppError> {
    match result {
        Ok(found) => Ok(Some(found)),
        Err(AppError::GeneralNotFound | AppError::TreasureNotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Decline a pending trade as its receiver
pub async fn reject_trade(
    db: &DatabaseConnection,
    trade_id: Uuid,
    user_id: Uuid,
) -> Result<TradeView, AppError> {
    let view = db
        .transaction(|txn| {
            Box::pin(close_trade_transaction(
                trade_id,
                user_id,
                TradeStatus::Rejected,
                txn,
            ))
        })
        .await?;
    info!(%trade_id, %user_id, "trade rejected");
    Ok(view)
}

/// Withdraw a pending trade as its proposer
pub async fn cancel_trade(
    db: &DatabaseConnection,
    trade_id: Uuid,
    user_id: Uuid,
) -> Result<TradeView, AppError> {
    let view = db
        .transaction(|txn| {
            Box::pin(close_trade_transaction(
                trade_id,
                user_id,
                TradeStatus::Cancelled,
                txn,
            ))
        })
        .await?;
    info!(%trade_id, %user_id, "trade cancelled");
    Ok(view)
}

async fn close_trade_transaction(
    trade_id: Uuid,
    user_id: Uuid,
    status: TradeStatus,
    txn: &DatabaseTransaction,
) -> Result<TradeView, AppError> {
    let trade = lock_trade(txn, trade_id).await?;

    let (allowed, action, details) = match status {
        TradeStatus::Rejected => (trade.receiver_id, TradeAction::Rejected, "rejected by receiver"),
        _ => (trade.proposer_id, TradeAction::Cancelled, "cancelled by proposer"),
    };
    if allowed != user_id {
        return Err(AppError::NotTradeParticipant);
    }
    if trade.status != TradeStatus::Pending {
        return Err(AppError::TradeAlreadyProcessed);
    }

    let trade = finish(txn, trade, status).await?;
    append_log(txn, trade_id, action, user_id, details).await?;

    let items = load_items(txn, trade_id).await?;
    Ok(TradeView::from_parts(trade, items))
}

/// Pending trades the user is part of, incoming and outgoing
pub async fn pending_trades<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<TradeView>, AppError> {
    let trades = trades::Entity::find()
        .filter(participant(user_id))
        .filter(trades::Column::Status.eq(TradeStatus::Pending))
        .order_by_desc(trades::Column::CreatedAt)
        .all(conn)
        .await?;
    with_items(conn, trades).await
}

/// Every trade the user was part of, newest first
pub async fn trade_history<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<TradeView>, AppError> {
    let trades = trades::Entity::find()
        .filter(participant(user_id))
        .order_by_desc(trades::Column::CreatedAt)
        .all(conn)
        .await?;
    with_items(conn, trades).await
}

pub async fn all_trades<C: ConnectionTrait>(conn: &C) -> Result<Vec<TradeView>, AppError> {
    let trades = trades::Entity::find()
        .order_by_desc(trades::Column::CreatedAt)
        .all(conn)
        .await?;
    with_items(conn, trades).await
}

/// A single trade with its audit log, visible to participants and admins
pub async fn trade_detail<C: ConnectionTrait>(
    conn: &C,
    trade_id: Uuid,
    viewer: &users::Model,
) -> Result<(TradeView, Vec<trade_logs::Model>), AppError> {
    let trade = trades::Entity::find_by_id(trade_id)
        .one(conn)
        .await?
        .ok_or(AppError::TradeNotFound)?;
    if !viewer.is_admin && !trade.involves(viewer.id) {
        return Err(AppError::NotTradeParticipant);
    }

    let items = load_items(conn, trade_id).await?;
    let logs = trade_logs::Entity::find()
        .filter(trade_logs::Column::TradeId.eq(trade_id))
        .order_by_asc(trade_logs::Column::CreatedAt)
        .all(conn)
        .await?;
    Ok((TradeView::from_parts(trade, items), logs))
}

fn participant(user_id: Uuid) -> Condition {
    Condition::any()
        .add(trades::Column::ProposerId.eq(user_id))
        .add(trades::Column::ReceiverId.eq(user_id))
}

async fn with_items<C: ConnectionTrait>(
    conn: &C,
    trades: Vec<trades::Model>,
) -> Result<Vec<TradeView>, AppError> {
    let ids: Vec<Uuid> = trades.iter().map(|t| t.id).collect();
    let mut by_trade: HashMap<Uuid, Vec<trade_items::Model>> = HashMap::new();
    if !ids.is_empty() {
        for item in trade_items::Entity::find()
            .filter(trade_items::Column::TradeId.is_in(ids))
            .all(conn)
            .await?
        {
            by_trade.entry(item.trade_id).or_default().push(item);
        }
    }

    Ok(trades
        .into_iter()
        .map(|trade| {
            let items = by_trade.remove(&trade.id).unwrap_or_default();
            TradeView::from_parts(trade, items)
        })
        .collect())
}

async fn find_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<users::Model, AppError> {
    users::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(AppError::UserNotFound)
}

async fn lock_trade(txn: &DatabaseTransaction, trade_id: Uuid) -> Result<trades::Model, AppError> {
    trades::Entity::find_by_id(trade_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::TradeNotFound)
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    trade_id: Uuid,
) -> Result<Vec<trade_items::Model>, AppError> {
    Ok(trade_items::Entity::find()
        .filter(trade_items::Column::TradeId.eq(trade_id))
        .order_by_asc(trade_items::Column::Position)
        .all(conn)
        .await?)
}

/// Load generals by id, failing with `GeneralNotFound` if any is missing
async fn load_generals<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
    for_update: bool,
) -> Result<Vec<generals::Model>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = generals::Entity::find()
        .filter(generals::Column::Id.is_in(ids.to_vec()))
        .order_by_asc(generals::Column::Id);
    if for_update {
        query = query.lock(LockType::Update);
    }
    let found = query.all(conn).await?;
    if found.len() != ids.len() {
        return Err(AppError::GeneralNotFound);
    }
    Ok(found)
}

async fn load_treasures<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
    for_update: bool,
) -> Result<Vec<treasures::Model>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut query = treasures::Entity::find()
        .filter(treasures::Column::Id.is_in(ids.to_vec()))
        .order_by_asc(treasures::Column::Id);
    if for_update {
        query = query.lock(LockType::Update);
    }
    let found = query.all(conn).await?;
    if found.len() != ids.len() {
        return Err(AppError::TreasureNotFound);
    }
    Ok(found)
}

fn all_generals_owned_by(generals: &[generals::Model], owner: Uuid) -> bool {
    generals.iter().all(|g| g.owner_id == Some(owner))
}

fn all_treasures_owned_by(treasures: &[treasures::Model], owner: Uuid) -> bool {
    treasures.iter().all(|t| t.owner_id == Some(owner))
}

async fn finish(
    txn: &DatabaseTransaction,
    trade: trades::Model,
    status: TradeStatus,
) -> Result<trades::Model, AppError> {
    let mut trade: trades::ActiveModel = trade.into();
    trade.status = Set(status);
    trade.updated_at = Set(Utc::now().into());
    Ok(trade.update(txn).await?)
}

async fn append_log(
    txn: &DatabaseTransaction,
    trade_id: Uuid,
    action: TradeAction,
    performed_by: Uuid,
    details: &str,
) -> Result<(), AppError> {
    trade_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        trade_id: Set(trade_id),
        action: Set(action),
        performed_by: Set(performed_by),
        details: Set(details.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(txn)
    .await?;
    Ok(())
}
