//! Import module
//!
//! Upserts catalog rows by external id. Ownership and availability of
//! existing generals and treasures are never touched by a re-import; a
//! salary change on an owned general moves the owner's used space with it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, Set, TransactionTrait, TryIntoModel,
};
use tracing::info;

use crate::assets::ledger;
use crate::dto::import_payload::{
    CityRow, ClubRow, GeneralRow, ImportCount, ImportPayload, ImportReport, RuleRow, TreasureRow,
};
use crate::entity::clubs::ClubTags;
use crate::entity::{cities, club_policies, clubs, game_rules, generals, treasures};
use crate::error::AppError;

/// Import a full or partial catalog in one transaction
pub async fn import_catalog(
    db: &DatabaseConnection,
    payload: ImportPayload,
) -> Result<ImportReport, AppError> {
    let report = db
        .transaction(|txn| Box::pin(import_transaction(payload, txn)))
        .await?;
    info!(?report, "catalog imported");
    Ok(report)
}

async fn import_transaction(
    payload: ImportPayload,
    txn: &DatabaseTransaction,
) -> Result<ImportReport, AppError> {
    let mut report = ImportReport::default();
    for row in payload.generals {
        tally(&mut report.generals, upsert_general(txn, row).await?);
    }
    for row in payload.treasures {
        tally(&mut report.treasures, upsert_treasure(txn, row).await?);
    }
    for row in payload.clubs {
        tally(&mut report.clubs, upsert_club(txn, row).await?);
    }
    for row in payload.cities {
        tally(&mut report.cities, upsert_city(txn, row).await?);
    }
    for row in payload.rules {
        tally(&mut report.rules, upsert_rule(txn, row).await?);
    }
    Ok(report)
}

fn tally(count: &mut ImportCount, inserted: bool) {
    if inserted {
        count.inserted += 1;
    } else {
        count.updated += 1;
    }
}

fn validate_salary(row: &GeneralRow) -> Result<(), AppError> {
    if row.salary < 0 {
        return Err(AppError::InvalidRequest(format!(
            "general {} has a negative salary",
            row.external_id
        )));
    }
    Ok(())
}

/// Returns true when a new row was inserted
async fn upsert_general(txn: &DatabaseTransaction, row: GeneralRow) -> Result<bool, AppError> {
    validate_salary(&row)?;
    let existing = generals::Entity::find()
        .filter(generals::Column::ExternalId.eq(row.external_id))
        .one(txn)
        .await?;

    if let Some(model) = &existing {
        rebalance_owner(txn, model, row.salary).await?;
    }

    let now = Utc::now();
    let inserted = existing.is_none();
    let mut general = match existing {
        Some(model) => model.into_active_model(),
        None => generals::ActiveModel {
            external_id: Set(row.external_id),
            owner_id: Set(None),
            is_available: Set(true),
            created_at: Set(now.into()),
            ..Default::default()
        },
    };
    general.name = Set(row.name);
    general.command = Set(row.command);
    general.force = Set(row.force);
    general.intelligence = Set(row.intelligence);
    general.politics = Set(row.politics);
    general.charm = Set(row.charm);
    general.affinity = Set(row.affinity);
    general.spear = Set(row.spear);
    general.halberd = Set(row.halberd);
    general.crossbow = Set(row.crossbow);
    general.cavalry = Set(row.cavalry);
    general.soldier = Set(row.soldier);
    general.water = Set(row.water);
    general.skills = Set(row.skills);
    general.note = Set(row.note);
    general.pool_type = Set(row.pool_type);
    general.tier = Set(row.tier);
    general.salary = Set(row.salary);
    general.injured_until = Set(row.injured_until);
    general.updated_at = Set(now.into());
    general.save(txn).await?;
    Ok(inserted)
}

/// Move the owner's used space along with a salary change
async fn rebalance_owner(
    txn: &DatabaseTransaction,
    general: &generals::Model,
    salary: i32,
) -> Result<(), AppError> {
    let Some(owner_id) = general.owner_id else {
        return Ok(());
    };
    let delta = salary - general.salary;
    if delta == 0 {
        return Ok(());
    }
    let owner = ledger::lock_user(txn, owner_id).await?;
    let used_space = ledger::shifted_used_space(&owner, delta)?;
    ledger::set_used_space(txn, owner, used_space).await?;
    info!(
        general_id = general.id,
        %owner_id,
        delta,
        "owner rebalanced for salary change"
    );
    Ok(())
}

async fn upsert_treasure(txn: &DatabaseTransaction, row: TreasureRow) -> Result<bool, AppError> {
    let existing = treasures::Entity::find()
        .filter(treasures::Column::ExternalId.eq(row.external_id))
        .one(txn)
        .await?;

    let now = Utc::now();
    let inserted = existing.is_none();
    let mut treasure = match existing {
        Some(model) => model.into_active_model(),
        None => treasures::ActiveModel {
            external_id: Set(row.external_id),
            owner_id: Set(None),
            is_available: Set(true),
            created_at: Set(now.into()),
            ..Default::default()
        },
    };
    treasure.name = Set(row.name);
    treasure.kind = Set(row.kind);
    treasure.value = Set(row.value);
    treasure.effect = Set(row.effect);
    treasure.skill = Set(row.skill);
    treasure.updated_at = Set(now.into());
    treasure.save(txn).await?;
    Ok(inserted)
}

/// Clubs keep their owner; their policy list is replaced wholesale
async fn upsert_club(txn: &DatabaseTransaction, row: ClubRow) -> Result<bool, AppError> {
    let existing = clubs::Entity::find()
        .filter(clubs::Column::ExternalId.eq(row.external_id))
        .one(txn)
        .await?;

    let now = Utc::now();
    let inserted = existing.is_none();
    let mut club = match existing {
        Some(model) => model.into_active_model(),
        None => clubs::ActiveModel {
            external_id: Set(row.external_id),
            owner_id: Set(None),
            created_at: Set(now.into()),
            ..Default::default()
        },
    };
    club.name = Set(row.name);
    club.description = Set(row.description);
    club.base_price = Set(row.base_price);
    club.league = Set(row.league.filter(|league| !league.is_empty()));
    club.tags = Set(ClubTags(row.tags));
    club.updated_at = Set(now.into());
    let club = club.save(txn).await?.try_into_model()?;

    club_policies::Entity::delete_many()
        .filter(club_policies::Column::ClubId.eq(club.id))
        .exec(txn)
        .await?;
    for (sort_order, policy) in row.policies.into_iter().enumerate() {
        club_policies::ActiveModel {
            club_id: Set(club.id),
            sort_order: Set(i32::try_from(sort_order).unwrap_or(i32::MAX)),
            condition: Set(policy.condition),
            effect: Set(policy.effect),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }
    Ok(inserted)
}

async fn upsert_city(txn: &DatabaseTransaction, row: CityRow) -> Result<bool, AppError> {
    let existing = cities::Entity::find()
        .filter(cities::Column::ExternalId.eq(row.external_id))
        .one(txn)
        .await?;

    let inserted = existing.is_none();
    let mut city = match existing {
        Some(model) => model.into_active_model(),
        None => cities::ActiveModel {
            external_id: Set(row.external_id),
            ..Default::default()
        },
    };
    city.name = Set(row.name);
    city.specialty = Set(row.specialty);
    city.max_soldiers = Set(row.max_soldiers);
    city.gold_income = Set(row.gold_income);
    city.food_income = Set(row.food_income);
    city.durability = Set(row.durability);
    city.save(txn).await?;
    Ok(inserted)
}

/// Rules have no external id; category plus title identifies them
async fn upsert_rule(txn: &DatabaseTransaction, row: RuleRow) -> Result<bool, AppError> {
    let existing = game_rules::Entity::find()
        .filter(game_rules::Column::Category.eq(row.category.as_str()))
        .filter(game_rules::Column::Title.eq(row.title.as_str()))
        .one(txn)
        .await?;

    let inserted = existing.is_none();
    let mut rule = match existing {
        Some(model) => model.into_active_model(),
        None => game_rules::ActiveModel {
            category: Set(row.category),
            title: Set(row.title),
            ..Default::default()
        },
    };
    rule.content = Set(row.content);
    rule.sort_order = Set(row.sort_order);
    rule.save(txn).await?;
    Ok(inserted)
}
