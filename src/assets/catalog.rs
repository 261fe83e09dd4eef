//! Catalog module
//!
//! Read-only views over the asset catalog, player rosters and season-wide
//! counters.

use std::collections::{BTreeSet, HashMap};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::generals::PoolType;
use crate::entity::trades::TradeStatus;
use crate::entity::{cities, club_policies, clubs, game_rules, generals, trades, treasures, users};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct ClubView {
    #[serde(flatten)]
    pub club: clubs::Model,
    pub policies: Vec<club_policies::Model>,
}

#[derive(Debug, Clone, Default)]
pub struct ClubFilter {
    pub league: Option<String>,
    pub tag: Option<String>,
}

impl ClubFilter {
    fn matches(&self, club: &clubs::Model) -> bool {
        let league_ok = self
            .league
            .as_deref()
            .map_or(true, |league| club.league.as_deref() == Some(league));
        let tag_ok = self.tag.as_deref().map_or(true, |tag| club.tags.contains(tag));
        league_ok && tag_ok
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    pub user: users::Model,
    pub generals: Vec<generals::Model>,
    pub treasures: Vec<treasures::Model>,
    pub club: Option<clubs::Model>,
    pub total_salary: i32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    pub total_players: u64,
    pub registered_players: u64,
    pub total_generals: u64,
    pub owned_generals: u64,
    pub total_treasures: u64,
    pub owned_treasures: u64,
    pub total_trades: u64,
    pub accepted_trades: u64,
}

pub async fn list_generals<C: ConnectionTrait>(
    conn: &C,
    pool_type: Option<PoolType>,
) -> Result<Vec<generals::Model>, AppError> {
    let mut query = generals::Entity::find();
    if let Some(pool_type) = pool_type {
        query = query.filter(generals::Column::PoolType.eq(pool_type));
    }
    Ok(query
        .order_by_asc(generals::Column::ExternalId)
        .all(conn)
        .await?)
}

pub async fn get_general<C: ConnectionTrait>(
    conn: &C,
    general_id: i32,
) -> Result<generals::Model, AppError> {
    generals::Entity::find_by_id(general_id)
        .one(conn)
        .await?
        .ok_or(AppError::GeneralNotFound)
}

pub async fn list_treasures<C: ConnectionTrait>(conn: &C) -> Result<Vec<treasures::Model>, AppError> {
    Ok(treasures::Entity::find()
        .order_by_asc(treasures::Column::ExternalId)
        .all(conn)
        .await?)
}

pub async fn get_treasure<C: ConnectionTrait>(
    conn: &C,
    treasure_id: i32,
) -> Result<treasures::Model, AppError> {
    treasures::Entity::find_by_id(treasure_id)
        .one(conn)
        .await?
        .ok_or(AppError::TreasureNotFound)
}

/// Clubs with their ordered policies. Filtering on tags happens in memory
/// since tags are stored as a JSON list.
pub async fn list_clubs<C: ConnectionTrait>(
    conn: &C,
    filter: &ClubFilter,
) -> Result<Vec<ClubView>, AppError> {
    let clubs = clubs::Entity::find()
        .order_by_asc(clubs::Column::Id)
        .all(conn)
        .await?;

    let mut policies: HashMap<i32, Vec<club_policies::Model>> = HashMap::new();
    for policy in club_policies::Entity::find()
        .order_by_asc(club_policies::Column::SortOrder)
        .all(conn)
        .await?
    {
        policies.entry(policy.club_id).or_default().push(policy);
    }

    Ok(clubs
        .into_iter()
        .filter(|club| filter.matches(club))
        .map(|club| ClubView {
            policies: policies.remove(&club.id).unwrap_or_default(),
            club,
        })
        .collect())
}

pub async fn get_club<C: ConnectionTrait>(conn: &C, club_id: i32) -> Result<ClubView, AppError> {
    let club = clubs::Entity::find_by_id(club_id)
        .one(conn)
        .await?
        .ok_or(AppError::ClubNotFound)?;
    let policies = club_policies::Entity::find()
        .filter(club_policies::Column::ClubId.eq(club_id))
        .order_by_asc(club_policies::Column::SortOrder)
        .all(conn)
        .await?;
    Ok(ClubView { club, policies })
}

pub async fn leagues<C: ConnectionTrait>(conn: &C) -> Result<Vec<String>, AppError> {
    let leagues: BTreeSet<String> = clubs::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|club| club.league)
        .filter(|league| !league.is_empty())
        .collect();
    Ok(leagues.into_iter().collect())
}

pub async fn tags<C: ConnectionTrait>(conn: &C) -> Result<Vec<String>, AppError> {
    let tags: BTreeSet<String> = clubs::Entity::find()
        .all(conn)
        .await?
        .into_iter()
        .flat_map(|club| club.tags.0)
        .collect();
    Ok(tags.into_iter().collect())
}

pub async fn list_cities<C: ConnectionTrait>(conn: &C) -> Result<Vec<cities::Model>, AppError> {
    Ok(cities::Entity::find()
        .order_by_asc(cities::Column::ExternalId)
        .all(conn)
        .await?)
}

pub async fn list_rules<C: ConnectionTrait>(conn: &C) -> Result<Vec<game_rules::Model>, AppError> {
    Ok(game_rules::Entity::find()
        .order_by_asc(game_rules::Column::Category)
        .order_by_asc(game_rules::Column::SortOrder)
        .all(conn)
        .await?)
}

/// Everything a player currently holds
pub async fn roster<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Roster, AppError> {
    let user = users::Entity::find_by_id(user_id)
        .one(conn)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let generals = generals::Entity::find()
        .filter(generals::Column::OwnerId.eq(user_id))
        .order_by_asc(generals::Column::ExternalId)
        .all(conn)
        .await?;
    let treasures = treasures::Entity::find()
        .filter(treasures::Column::OwnerId.eq(user_id))
        .order_by_asc(treasures::Column::ExternalId)
        .all(conn)
        .await?;
    let club = match user.club_id {
        Some(club_id) => clubs::Entity::find_by_id(club_id).one(conn).await?,
        None => None,
    };

    let total_salary = generals.iter().map(|g| g.salary).sum();
    Ok(Roster {
        user,
        generals,
        treasures,
        club,
        total_salary,
    })
}

pub async fn statistics<C: ConnectionTrait>(conn: &C) -> Result<Statistics, AppError> {
    Ok(Statistics {
        total_players: users::Entity::find().count(conn).await?,
        registered_players: users::Entity::find()
            .filter(users::Column::IsRegistered.eq(true))
            .count(conn)
            .await?,
        total_generals: generals::Entity::find().count(conn).await?,
        owned_generals: generals::Entity::find()
            .filter(generals::Column::OwnerId.is_not_null())
            .count(conn)
            .await?,
        total_treasures: treasures::Entity::find().count(conn).await?,
        owned_treasures: treasures::Entity::find()
            .filter(treasures::Column::OwnerId.is_not_null())
            .count(conn)
            .await?,
        total_trades: trades::Entity::find().count(conn).await?,
        accepted_trades: trades::Entity::find()
            .filter(trades::Column::Status.eq(TradeStatus::Accepted))
            .count(conn)
            .await?,
    })
}
