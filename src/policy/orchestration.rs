//! Policy orchestration module
//!
//! Database-coupled state machine for the club auction:
//! `bidding -> closed -> selecting -> completed`, with reset back to
//! `bidding`. The config row is only ever written through [`save_config`].

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assets::ledger;
use crate::entity::game_phase::Phase;
use crate::entity::policy_phase_config::{self, PolicyStatus};
use crate::entity::{clubs, policy_bids, policy_preferences, policy_selections, users};
use crate::error::AppError;
use crate::policy::ranking::{self, BidEntry, DEFAULT_TIMEOUT_MINUTES};
use crate::season::phase;

const CONFIG_ROW: i32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerPolicy {
    pub bid: Option<policy_bids::Model>,
    pub preferences: Vec<policy_preferences::Model>,
    pub selection: Option<policy_selections::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedBid {
    pub user_id: Uuid,
    pub username: String,
    pub nickname: String,
    pub rank: Option<i32>,
    /// Hidden while bidding is still open
    pub bid_amount: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionView {
    pub selection: policy_selections::Model,
    pub username: String,
    pub club_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyStatusView {
    pub config: policy_phase_config::Model,
    pub bids: Vec<RankedBid>,
    pub selections: Vec<SelectionView>,
    pub available_clubs: Vec<clubs::Model>,
    pub current_selector: Option<users::Model>,
}

/// Read the config record, creating the default one on first access
pub async fn load_config<C: ConnectionTrait>(
    conn: &C,
) -> Result<policy_phase_config::Model, AppError> {
    if let Some(config) = policy_phase_config::Entity::find_by_id(CONFIG_ROW)
        .one(conn)
        .await?
    {
        return Ok(config);
    }

    let initial = policy_phase_config::ActiveModel {
        id: Set(CONFIG_ROW),
        status: Set(PolicyStatus::Bidding),
        start_time: Set(None),
        timeout_minutes: Set(DEFAULT_TIMEOUT_MINUTES),
        current_selector: Set(None),
        current_deadline: Set(None),
        version: Set(0),
        updated_at: Set(Utc::now().into()),
    };
    policy_phase_config::Entity::insert(initial)
        .on_conflict(
            OnConflict::column(policy_phase_config::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    policy_phase_config::Entity::find_by_id(CONFIG_ROW)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal("policy config missing after init".to_string()))
}

async fn lock_config<C: ConnectionTrait>(conn: &C) -> Result<policy_phase_config::Model, AppError> {
    match policy_phase_config::Entity::find_by_id(CONFIG_ROW)
        .lock(LockType::Update)
        .one(conn)
        .await?
    {
        Some(config) => Ok(config),
        None => load_config(conn).await,
    }
}

async fn save_config<C: ConnectionTrait>(
    conn: &C,
    mut config: policy_phase_config::Model,
) -> Result<policy_phase_config::Model, AppError> {
    config.version += 1;
    config.updated_at = Utc::now().into();
    let active = policy_phase_config::ActiveModel::from(config).reset_all();
    Ok(active.update(conn).await?)
}

/// Put the config back to an open bidding round
pub(crate) async fn reset_config<C: ConnectionTrait>(
    conn: &C,
) -> Result<policy_phase_config::Model, AppError> {
    let mut config = lock_config(conn).await?;
    config.status = PolicyStatus::Bidding;
    config.start_time = None;
    config.timeout_minutes = DEFAULT_TIMEOUT_MINUTES;
    config.current_selector = None;
    config.current_deadline = None;
    save_config(conn, config).await
}

async fn registered_player<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<users::Model, AppError> {
    let user = ledger::lock_user(conn, user_id).await?;
    if !user.is_registered {
        return Err(AppError::NotRegistered);
    }
    Ok(user)
}

/// Locks the config row, so bids serialize against `close_bidding`
async fn ensure_open_bidding<C: ConnectionTrait>(conn: &C) -> Result<(), AppError> {
    let state = phase::load(conn).await?;
    phase::ensure(&state, Phase::Policy)?;
    if lock_config(conn).await?.status != PolicyStatus::Bidding {
        return Err(AppError::BiddingNotOpen);
    }
    Ok(())
}

/// Place or replace the player's sealed bid
pub async fn place_bid(
    db: &DatabaseConnection,
    user_id: Uuid,
    amount: i32,
) -> Result<policy_bids::Model, AppError> {
    let bid = db
        .transaction(|txn| Box::pin(place_bid_transaction(user_id, amount, txn)))
        .await?;
    info!(%user_id, amount, "policy bid placed");
    Ok(bid)
}

async fn place_bid_transaction(
    user_id: Uuid,
    amount: i32,
    txn: &DatabaseTransaction,
) -> Result<policy_bids::Model, AppError> {
    ensure_open_bidding(txn).await?;
    let user = registered_player(txn, user_id).await?;

    if amount < 0 {
        return Err(AppError::InvalidRequest(
            "bid amount must not be negative".to_string(),
        ));
    }
    ledger::ensure_affordable(&user, amount)?;

    let now = Utc::now().into();
    let existing = policy_bids::Entity::find()
        .filter(policy_bids::Column::UserId.eq(user_id))
        .lock(LockType::Update)
        .one(txn)
        .await?;

    // Re-bidding keeps the original creation time, which breaks ties
    let bid = match existing {
        Some(bid) => {
            let mut bid: policy_bids::ActiveModel = bid.into();
            bid.bid_amount = Set(amount);
            bid.updated_at = Set(now);
            bid.update(txn).await?
        }
        None => {
            policy_bids::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                bid_amount: Set(amount),
                rank: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(txn)
            .await?
        }
    };
    Ok(bid)
}

/// Replace the player's ordered club wishlist
pub async fn set_preferences(
    db: &DatabaseConnection,
    user_id: Uuid,
    club_ids: Vec<i32>,
) -> Result<Vec<policy_preferences::Model>, AppError> {
    let preferences = db
        .transaction(|txn| Box::pin(set_preferences_transaction(user_id, club_ids, txn)))
        .await?;
    info!(%user_id, count = preferences.len(), "policy preferences set");
    Ok(preferences)
}

async fn set_preferences_transaction(
    user_id: Uuid,
    club_ids: Vec<i32>,
    txn: &DatabaseTransaction,
) -> Result<Vec<policy_preferences::Model>, AppError> {
    ensure_open_bidding(txn).await?;
    registered_player(txn, user_id).await?;

    let mut seen = HashSet::new();
    let ordered: Vec<i32> = club_ids.into_iter().filter(|id| seen.insert(*id)).collect();

    let known = clubs::Entity::find()
        .filter(clubs::Column::Id.is_in(ordered.clone()))
        .count(txn)
        .await?;
    if known != ordered.len() as u64 {
        return Err(AppError::ClubNotFound);
    }

    policy_preferences::Entity::delete_many()
        .filter(policy_preferences::Column::UserId.eq(user_id))
        .exec(txn)
        .await?;

    let mut saved = Vec::with_capacity(ordered.len());
    for (i, club_id) in ordered.into_iter().enumerate() {
        let preference = policy_preferences::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            club_id: Set(club_id),
            priority: Set(i as i32 + 1),
        }
        .insert(txn)
        .await?;
        saved.push(preference);
    }
    Ok(saved)
}

pub async fn player_policy<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<PlayerPolicy, AppError> {
    let bid = policy_bids::Entity::find()
        .filter(policy_bids::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    let preferences = policy_preferences::Entity::find()
        .filter(policy_preferences::Column::UserId.eq(user_id))
        .order_by_asc(policy_preferences::Column::Priority)
        .all(conn)
        .await?;
    let selection = policy_selections::Entity::find()
        .filter(policy_selections::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    Ok(PlayerPolicy {
        bid,
        preferences,
        selection,
    })
}

/// Every bid with amounts, for admins
pub async fn all_bids<C: ConnectionTrait>(conn: &C) -> Result<Vec<policy_bids::Model>, AppError> {
    Ok(policy_bids::Entity::find()
        .order_by_asc(policy_bids::Column::Rank)
        .order_by_desc(policy_bids::Column::BidAmount)
        .order_by_asc(policy_bids::Column::CreatedAt)
        .all(conn)
        .await?)
}

/// Stop accepting bids and assign ranks
pub async fn close_bidding(db: &DatabaseConnection) -> Result<Vec<policy_bids::Model>, AppError> {
    let ranked = db
        .transaction(|txn| Box::pin(close_bidding_transaction(txn)))
        .await?;
    info!(bids = ranked.len(), "policy bidding closed");
    Ok(ranked)
}

async fn close_bidding_transaction(
    txn: &DatabaseTransaction,
) -> Result<Vec<policy_bids::Model>, AppError> {
    let mut config = lock_config(txn).await?;
    if config.status != PolicyStatus::Bidding {
        return Err(AppError::BiddingNotOpen);
    }

    let bids = policy_bids::Entity::find()
        .lock(LockType::Update)
        .all(txn)
        .await?;
    let entries: Vec<BidEntry> = bids
        .iter()
        .map(|bid| BidEntry {
            user_id: bid.user_id,
            amount: bid.bid_amount,
            created_at: bid.created_at,
        })
        .collect();
    let ranks = ranking::rank_bids(&entries);

    let mut ranked = Vec::with_capacity(bids.len());
    for (user_id, rank) in ranks {
        if let Some(bid) = bids.iter().find(|bid| bid.user_id == user_id) {
            let mut bid: policy_bids::ActiveModel = bid.clone().into();
            bid.rank = Set(Some(rank));
            ranked.push(bid.update(txn).await?);
        }
    }

    config.status = PolicyStatus::Closed;
    save_config(txn, config).await?;
    Ok(ranked)
}

/// Open turn-based selection with the rank-1 bidder
pub async fn start_selection(
    db: &DatabaseConnection,
    start_time: DateTime<FixedOffset>,
    timeout_minutes: i32,
) -> Result<policy_phase_config::Model, AppError> {
    let config = db
        .transaction(|txn| {
            Box::pin(start_selection_transaction(start_time, timeout_minutes, txn))
        })
        .await?;
    info!(
        %start_time,
        timeout_minutes,
        selector = ?config.current_selector,
        "policy selection started"
    );
    Ok(config)
}

async fn start_selection_transaction(
    start_time: DateTime<FixedOffset>,
    timeout_minutes: i32,
    txn: &DatabaseTransaction,
) -> Result<policy_phase_config::Model, AppError> {
    ranking::validate_timeout(timeout_minutes)?;

    let mut config = lock_config(txn).await?;
    if config.status != PolicyStatus::Closed {
        return Err(AppError::BiddingNotClosed);
    }

    let ranked = ranked_bidders(txn).await?;
    let selected = selected_users(txn).await?;
    let first = ranking::next_selector(&ranked, &selected).ok_or(AppError::NoBids)?;

    config.status = PolicyStatus::Selecting;
    config.start_time = Some(start_time);
    config.timeout_minutes = timeout_minutes;
    config.current_selector = Some(first);
    config.current_deadline = Some(ranking::next_deadline(
        start_time,
        Some(start_time),
        timeout_minutes,
    ));
    save_config(txn, config).await
}

async fn ranked_bidders<C: ConnectionTrait>(conn: &C) -> Result<Vec<Uuid>, AppError> {
    Ok(policy_bids::Entity::find()
        .filter(policy_bids::Column::Rank.is_not_null())
        .order_by_asc(policy_bids::Column::Rank)
        .all(conn)
        .await?
        .into_iter()
        .map(|bid| bid.user_id)
        .collect())
}

async fn selected_users<C: ConnectionTrait>(conn: &C) -> Result<HashSet<Uuid>, AppError> {
    Ok(policy_selections::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|selection| selection.user_id)
        .collect())
}

async fn taken_clubs<C: ConnectionTrait>(conn: &C) -> Result<HashSet<i32>, AppError> {
    let mut taken: HashSet<i32> = policy_selections::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|selection| selection.club_id)
        .collect();
    for club in clubs::Entity::find()
        .filter(clubs::Column::OwnerId.is_not_null())
        .all(conn)
        .await?
    {
        taken.insert(club.id);
    }
    Ok(taken)
}

/// The current selector picks a club
pub async fn select_club(
    db: &DatabaseConnection,
    user_id: Uuid,
    club_id: i32,
    now: DateTime<FixedOffset>,
) -> Result<policy_selections::Model, AppError> {
    let selection = db
        .transaction(|txn| Box::pin(select_club_transaction(user_id, club_id, now, txn)))
        .await?;
    info!(%user_id, club_id, order = selection.select_order, "club selected");
    Ok(selection)
}

async fn select_club_transaction(
    user_id: Uuid,
    club_id: i32,
    now: DateTime<FixedOffset>,
    txn: &DatabaseTransaction,
) -> Result<policy_selections::Model, AppError> {
    let config = lock_config(txn).await?;
    if config.status != PolicyStatus::Selecting {
        return Err(AppError::SelectionNotInProgress);
    }
    if config.current_selector != Some(user_id) {
        return Err(AppError::NotYourTurn);
    }

    let (user, club) = lock_selection_parties(txn, user_id, club_id).await?;
    let bid_amount = bid_amount_of(txn, user_id).await?;
    ledger::ensure_affordable(&user, bid_amount)?;

    let selection = apply_selection(txn, user, club, bid_amount, false).await?;
    advance(txn, config, now).await?;
    Ok(selection)
}

async fn lock_selection_parties(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    club_id: i32,
) -> Result<(users::Model, clubs::Model), AppError> {
    let club = clubs::Entity::find_by_id(club_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::ClubNotFound)?;
    if club.owner_id.is_some() || taken_clubs(txn).await?.contains(&club_id) {
        return Err(AppError::ClubAlreadySelected);
    }

    let user = ledger::lock_user(txn, user_id).await?;
    if selected_users(txn).await?.contains(&user_id) {
        return Err(AppError::AlreadySelected);
    }
    Ok((user, club))
}

async fn bid_amount_of<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<i32, AppError> {
    Ok(policy_bids::Entity::find()
        .filter(policy_bids::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .map(|bid| bid.bid_amount)
        .unwrap_or(0))
}

/// Record the selection, link user and club, charge the user
async fn apply_selection(
    txn: &DatabaseTransaction,
    user: users::Model,
    club: clubs::Model,
    charge: i32,
    auto_assigned: bool,
) -> Result<policy_selections::Model, AppError> {
    let order = policy_selections::Entity::find().count(txn).await? as i32 + 1;
    let now = Utc::now().into();

    let selection = policy_selections::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        club_id: Set(club.id),
        bid_cost: Set(charge),
        auto_assigned: Set(auto_assigned),
        select_order: Set(order),
        created_at: Set(now),
    }
    .insert(txn)
    .await?;

    let used_space = user.used_space + charge;
    let user_id = user.id;
    let mut user: users::ActiveModel = user.into();
    user.club_id = Set(Some(club.id));
    user.used_space = Set(used_space);
    user.updated_at = Set(now);
    user.update(txn).await?;

    let mut club: clubs::ActiveModel = club.into();
    club.owner_id = Set(Some(user_id));
    club.updated_at = Set(now);
    club.update(txn).await?;

    Ok(selection)
}

/// Hand the turn to the next unselected bidder, or complete the phase
async fn advance(
    txn: &DatabaseTransaction,
    mut config: policy_phase_config::Model,
    now: DateTime<FixedOffset>,
) -> Result<policy_phase_config::Model, AppError> {
    let ranked = ranked_bidders(txn).await?;
    let selected = selected_users(txn).await?;

    match ranking::next_selector(&ranked, &selected) {
        Some(next) => {
            config.current_selector = Some(next);
            config.current_deadline = Some(ranking::next_deadline(
                now,
                config.start_time,
                config.timeout_minutes,
            ));
        }
        None => {
            info!("policy selection completed");
            config.status = PolicyStatus::Completed;
            config.current_selector = None;
            config.current_deadline = None;
        }
    }
    save_config(txn, config).await
}

async fn auto_assign_current(
    txn: &DatabaseTransaction,
    config: policy_phase_config::Model,
    now: DateTime<FixedOffset>,
) -> Result<policy_selections::Model, AppError> {
    let user_id = config
        .current_selector
        .ok_or(AppError::SelectionNotInProgress)?;
    let user = ledger::lock_user(txn, user_id).await?;

    let preferences: Vec<i32> = policy_preferences::Entity::find()
        .filter(policy_preferences::Column::UserId.eq(user_id))
        .order_by_asc(policy_preferences::Column::Priority)
        .all(txn)
        .await?
        .into_iter()
        .map(|preference| preference.club_id)
        .collect();
    let club_ids: Vec<i32> = clubs::Entity::find()
        .order_by_asc(clubs::Column::Id)
        .all(txn)
        .await?
        .into_iter()
        .map(|club| club.id)
        .collect();
    let taken = taken_clubs(txn).await?;

    let club_id = ranking::choose_auto_club(&preferences, &club_ids, &taken)
        .ok_or(AppError::NoAvailableClubs)?;
    let club = clubs::Entity::find_by_id(club_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(AppError::ClubNotFound)?;

    let bid_amount = bid_amount_of(txn, user_id).await?;
    ledger::ensure_affordable(&user, bid_amount)?;

    let selection = apply_selection(txn, user, club, bid_amount, true).await?;
    warn!(%user_id, club_id, charge = bid_amount, "club auto-assigned");
    advance(txn, config, now).await?;
    Ok(selection)
}

/// Auto-assign the current selector if their deadline has passed.
/// Returns the assigned selection, or `None` when nothing was due.
pub async fn check_and_handle_timeout(
    db: &DatabaseConnection,
    now: DateTime<FixedOffset>,
) -> Result<Option<policy_selections::Model>, AppError> {
    Ok(db
        .transaction(|txn| {
            Box::pin(async move {
                let config = lock_config(txn).await?;
                if config.status != PolicyStatus::Selecting
                    || !ranking::is_timed_out(now, config.start_time, config.current_deadline)
                {
                    return Ok(None);
                }
                auto_assign_current(txn, config, now).await.map(Some)
            })
        })
        .await?)
}

/// Auto-assign the current selector right away
pub async fn force_next(
    db: &DatabaseConnection,
    now: DateTime<FixedOffset>,
) -> Result<policy_selections::Model, AppError> {
    Ok(db
        .transaction(|txn| {
            Box::pin(async move {
                let config = lock_config(txn).await?;
                if config.status != PolicyStatus::Selecting {
                    return Err(AppError::SelectionNotInProgress);
                }
                auto_assign_current(txn, config, now).await
            })
        })
        .await?)
}

/// Admin selection on a player's behalf, outside of turn order
pub async fn select_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    club_id: i32,
    now: DateTime<FixedOffset>,
) -> Result<policy_selections::Model, AppError> {
    let selection = db
        .transaction(|txn| {
            Box::pin(async move {
                let config = lock_config(txn).await?;
                if !matches!(
                    config.status,
                    PolicyStatus::Selecting | PolicyStatus::Completed
                ) {
                    return Err(AppError::SelectionNotInProgress);
                }

                let (user, club) = lock_selection_parties(txn, user_id, club_id).await?;
                let bid_amount = bid_amount_of(txn, user_id).await?;
                ledger::ensure_affordable(&user, bid_amount)?;

                let selection = apply_selection(txn, user, club, bid_amount, false).await?;
                if config.current_selector == Some(user_id) {
                    advance(txn, config, now).await?;
                }
                Ok(selection)
            })
        })
        .await?;
    info!(%user_id, club_id, "club selected by admin");
    Ok(selection)
}

/// Wipe the auction and refund every charged club
pub async fn reset_policy_phase(db: &DatabaseConnection) -> Result<(), AppError> {
    db.transaction(|txn| Box::pin(reset_policy_transaction(txn)))
        .await?;
    info!("policy phase reset");
    Ok(())
}

pub(crate) async fn reset_policy_transaction(txn: &DatabaseTransaction) -> Result<(), AppError> {
    for selection in policy_selections::Entity::find().all(txn).await? {
        let user = ledger::lock_user(txn, selection.user_id).await?;
        ledger::refund(txn, user, selection.bid_cost).await?;
    }

    policy_selections::Entity::delete_many().exec(txn).await?;
    policy_preferences::Entity::delete_many().exec(txn).await?;
    policy_bids::Entity::delete_many().exec(txn).await?;

    users::Entity::update_many()
        .set(users::ActiveModel {
            club_id: Set(None),
            ..Default::default()
        })
        .filter(users::Column::ClubId.is_not_null())
        .exec(txn)
        .await?;
    clubs::Entity::update_many()
        .set(clubs::ActiveModel {
            owner_id: Set(None),
            ..Default::default()
        })
        .filter(clubs::Column::OwnerId.is_not_null())
        .exec(txn)
        .await?;

    reset_config(txn).await?;
    Ok(())
}

/// Undo one player's selection
pub async fn reset_user_selection(db: &DatabaseConnection, user_id: Uuid) -> Result<(), AppError> {
    db.transaction(|txn| {
        Box::pin(async move {
            let selection = policy_selections::Entity::find()
                .filter(policy_selections::Column::UserId.eq(user_id))
                .one(txn)
                .await?
                .ok_or(AppError::SelectionNotFound)?;

            let user = ledger::lock_user(txn, user_id).await?;
            let used_space = ledger::refunded_used_space(user.used_space, selection.bid_cost);
            let mut user: users::ActiveModel = user.into();
            user.club_id = Set(None);
            user.used_space = Set(used_space);
            user.updated_at = Set(Utc::now().into());
            user.update(txn).await?;

            if let Some(club) = clubs::Entity::find_by_id(selection.club_id)
                .lock(LockType::Update)
                .one(txn)
                .await?
            {
                let mut club: clubs::ActiveModel = club.into();
                club.owner_id = Set(None);
                club.update(txn).await?;
            }

            policy_selections::Entity::delete_by_id(selection.id)
                .exec(txn)
                .await?;
            Ok::<_, AppError>(())
        })
    })
    .await?;
    info!(%user_id, "policy selection reset");
    Ok(())
}

pub async fn all_selections<C: ConnectionTrait>(conn: &C) -> Result<Vec<SelectionView>, AppError> {
    let selections = policy_selections::Entity::find()
        .order_by_asc(policy_selections::Column::SelectOrder)
        .all(conn)
        .await?;

    let mut views = Vec::with_capacity(selections.len());
    for selection in selections {
        let username = users::Entity::find_by_id(selection.user_id)
            .one(conn)
            .await?
            .map(|user| user.username)
            .unwrap_or_default();
        let club_name = clubs::Entity::find_by_id(selection.club_id)
            .one(conn)
            .await?
            .map(|club| club.name)
            .unwrap_or_default();
        views.push(SelectionView {
            selection,
            username,
            club_name,
        });
    }
    Ok(views)
}

/// Public view of the auction. Bid amounts stay sealed until bidding closes.
pub async fn status<C: ConnectionTrait>(conn: &C) -> Result<PolicyStatusView, AppError> {
    let config = load_config(conn).await?;
    let reveal = config.status != PolicyStatus::Bidding;

    let bids = policy_bids::Entity::find()
        .order_by_asc(policy_bids::Column::Rank)
        .order_by_asc(policy_bids::Column::CreatedAt)
        .find_also_related(users::Entity)
        .all(conn)
        .await?
        .into_iter()
        .map(|(bid, user)| {
            let (username, nickname) = user
                .map(|user| (user.username, user.nickname))
                .unwrap_or_default();
            RankedBid {
                user_id: bid.user_id,
                username,
                nickname,
                rank: bid.rank,
                bid_amount: reveal.then_some(bid.bid_amount),
            }
        })
        .collect();

    let selections = all_selections(conn).await?;
    let taken = taken_clubs(conn).await?;
    let available_clubs = clubs::Entity::find()
        .order_by_asc(clubs::Column::Id)
        .all(conn)
        .await?
        .into_iter()
        .filter(|club| !taken.contains(&club.id))
        .collect();

    let current_selector = match config.current_selector {
        Some(user_id) => users::Entity::find_by_id(user_id).one(conn).await?,
        None => None,
    };

    Ok(PolicyStatusView {
        config,
        bids,
        selections,
        available_clubs,
        current_selector,
    })
}
