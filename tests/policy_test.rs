use chrono::{Duration, TimeZone, Utc};
use league_backend::entity::game_phase::Phase;
use league_backend::entity::policy_phase_config::PolicyStatus;
use league_backend::entity::{clubs, policy_bids, policy_selections, users};
use league_backend::error::AppError;
use league_backend::policy::orchestration::{
    check_and_handle_timeout, close_bidding, force_next, load_config, place_bid,
    reset_policy_phase, select_club, select_for_user, set_preferences, start_selection,
};
use league_backend::test_support::common::{seed_club, seed_user, set_phase, test_bootstrap};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

async fn insert_bid(db: &DatabaseConnection, user_id: Uuid, amount: i32, minute: u32) {
    let at = Utc
        .with_ymd_and_hms(2025, 3, 1, 9, minute, 0)
        .unwrap()
        .fixed_offset();
    policy_bids::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        bid_amount: Set(amount),
        rank: Set(None),
        created_at: Set(at),
        updated_at: Set(at),
    }
    .insert(db)
    .await
    .expect("insert bid failed");
}

async fn set_used_space(db: &DatabaseConnection, user: &users::Model, used_space: i32) {
    let mut user: users::ActiveModel = user.clone().into();
    user.used_space = Set(used_space);
    user.update(db).await.expect("update used space failed");
}

#[actix_web::test]
async fn test_bidding_requires_policy_phase() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let user = seed_user(&db, "machao", true, 350).await;

    let result = place_bid(&db, user.id, 20).await;
    assert!(matches!(result, Err(AppError::WrongPhase { .. })));
    Ok(())
}

#[actix_web::test]
async fn test_bid_cannot_exceed_remaining_space() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let user = seed_user(&db, "huangzhong", true, 40).await;
    set_phase(&db, Phase::Policy).await;

    let result = place_bid(&db, user.id, 41).await;
    assert!(matches!(result, Err(AppError::InsufficientSpace { .. })));

    let rebid = place_bid(&db, user.id, 10).await?;
    let replaced = place_bid(&db, user.id, 40).await?;
    assert_eq!(rebid.id, replaced.id);
    assert_eq!(replaced.bid_amount, 40);
    Ok(())
}

#[actix_web::test]
async fn test_full_selection_round() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let club1 = seed_club(&db, 1, 0, Some("north")).await;
    let club2 = seed_club(&db, 2, 0, Some("south")).await;
    let club3 = seed_club(&db, 3, 0, None).await;
    let a = seed_user(&db, "zhaoyun", true, 350).await;
    let b = seed_user(&db, "guanyu", true, 350).await;
    let c = seed_user(&db, "zhangfei", true, 5).await;
    set_phase(&db, Phase::Policy).await;

    place_bid(&db, a.id, 30).await?;
    place_bid(&db, b.id, 50).await?;
    place_bid(&db, c.id, 5).await?;
    set_preferences(&db, a.id, vec![club1.id, club2.id, club1.id]).await?;

    let ranked = close_bidding(&db).await?;
    let rank_of = |id| ranked.iter().find(|bid| bid.user_id == id).and_then(|bid| bid.rank);
    assert_eq!(rank_of(b.id), Some(1));
    assert_eq!(rank_of(a.id), Some(2));
    assert_eq!(rank_of(c.id), Some(3));

    let late = place_bid(&db, a.id, 60).await;
    assert!(matches!(late, Err(AppError::BiddingNotOpen)));

    let start = Utc::now().fixed_offset() - Duration::minutes(1);
    let config = start_selection(&db, start, 10).await?;
    assert_eq!(config.status, PolicyStatus::Selecting);
    assert_eq!(config.current_selector, Some(b.id));

    let out_of_turn = select_club(&db, a.id, club1.id, Utc::now().fixed_offset()).await;
    assert!(matches!(out_of_turn, Err(AppError::NotYourTurn)));

    let picked = select_club(&db, b.id, club1.id, Utc::now().fixed_offset()).await?;
    assert_eq!(picked.select_order, 1);
    assert_eq!(picked.bid_cost, 50);

    // a's first preference is gone, so the second one is used
    let forced = force_next(&db, Utc::now().fixed_offset()).await?;
    assert_eq!(forced.user_id, a.id);
    assert_eq!(forced.club_id, club2.id);
    assert!(forced.auto_assigned);

    let not_due = check_and_handle_timeout(&db, Utc::now().fixed_offset()).await?;
    assert!(not_due.is_none());

    let later = Utc::now().fixed_offset() + Duration::minutes(30);
    let timed_out = check_and_handle_timeout(&db, later).await?;
    let timed_out = timed_out.expect("selector past deadline is auto-assigned");
    assert_eq!(timed_out.user_id, c.id);
    assert_eq!(timed_out.club_id, club3.id);

    let config = load_config(&db).await?;
    assert_eq!(config.status, PolicyStatus::Completed);
    assert_eq!(config.current_selector, None);

    let b_after = users::Entity::find_by_id(b.id).one(&db).await?.unwrap();
    assert_eq!(b_after.used_space, 50);
    assert_eq!(b_after.club_id, Some(club1.id));

    reset_policy_phase(&db).await?;
    for user in users::Entity::find().all(&db).await? {
        assert_eq!(user.used_space, 0);
        assert_eq!(user.club_id, None);
    }
    for club in clubs::Entity::find().all(&db).await? {
        assert_eq!(club.owner_id, None);
    }
    assert_eq!(load_config(&db).await?.status, PolicyStatus::Bidding);
    Ok(())
}

#[actix_web::test]
async fn test_start_selection_without_bids_fails() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    set_phase(&db, Phase::Policy).await;
    close_bidding(&db).await?;

    let result = start_selection(&db, Utc::now().fixed_offset(), 10).await;
    assert!(matches!(result, Err(AppError::NoBids)));

    let bad_timeout = start_selection(&db, Utc::now().fixed_offset(), 1).await;
    assert!(matches!(bad_timeout, Err(AppError::InvalidTimeout { .. })));
    Ok(())
}

#[actix_web::test]
async fn test_equal_bids_rank_by_earliest_bid() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let a = seed_user(&db, "sunquan", true, 350).await;
    let b = seed_user(&db, "zhouyu", true, 350).await;
    let c = seed_user(&db, "lusu", true, 350).await;
    set_phase(&db, Phase::Policy).await;

    insert_bid(&db, a.id, 100, 1).await;
    insert_bid(&db, b.id, 150, 2).await;
    insert_bid(&db, c.id, 100, 3).await;

    let ranked = close_bidding(&db).await?;
    assert_eq!(ranked.len(), 3);
    let rank_of = |id| ranked.iter().find(|bid| bid.user_id == id).and_then(|bid| bid.rank);
    assert_eq!(rank_of(b.id), Some(1));
    assert_eq!(rank_of(a.id), Some(2));
    assert_eq!(rank_of(c.id), Some(3));

    let unranked = policy_bids::Entity::find()
        .all(&db)
        .await?
        .into_iter()
        .filter(|bid| bid.rank.is_none())
        .count();
    assert_eq!(unranked, 0);
    Ok(())
}

#[actix_web::test]
async fn test_club_and_user_select_only_once() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let club1 = seed_club(&db, 11, 0, None).await;
    let club2 = seed_club(&db, 12, 0, None).await;
    let a = seed_user(&db, "caocao", true, 350).await;
    let b = seed_user(&db, "xuchu", true, 350).await;
    set_phase(&db, Phase::Policy).await;

    place_bid(&db, a.id, 20).await?;
    place_bid(&db, b.id, 10).await?;
    close_bidding(&db).await?;
    let start = Utc::now().fixed_offset() - Duration::minutes(1);
    start_selection(&db, start, 10).await?;

    select_club(&db, a.id, club1.id, Utc::now().fixed_offset()).await?;

    let club_taken = select_club(&db, b.id, club1.id, Utc::now().fixed_offset()).await;
    assert!(matches!(club_taken, Err(AppError::ClubAlreadySelected)));

    let again = select_for_user(&db, a.id, club2.id, Utc::now().fixed_offset()).await;
    assert!(matches!(again, Err(AppError::AlreadySelected)));

    assert_eq!(policy_selections::Entity::find().count(&db).await?, 1);
    let club2_after = clubs::Entity::find_by_id(club2.id).one(&db).await?.unwrap();
    assert_eq!(club2_after.owner_id, None);
    Ok(())
}

#[actix_web::test]
async fn test_timeout_charges_the_full_bid() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let club = seed_club(&db, 21, 0, None).await;
    let user = seed_user(&db, "dianwei", true, 350).await;
    set_phase(&db, Phase::Policy).await;

    place_bid(&db, user.id, 40).await?;
    close_bidding(&db).await?;
    let start = Utc::now().fixed_offset() - Duration::minutes(1);
    start_selection(&db, start, 5).await?;

    set_used_space(&db, &user, 325).await;
    let later = Utc::now().fixed_offset() + Duration::minutes(30);
    let short = check_and_handle_timeout(&db, later).await;
    assert!(matches!(short, Err(AppError::InsufficientSpace { .. })));
    assert_eq!(policy_selections::Entity::find().count(&db).await?, 0);
    assert_eq!(load_config(&db).await?.current_selector, Some(user.id));

    set_used_space(&db, &user, 300).await;
    let assigned = check_and_handle_timeout(&db, later)
        .await?
        .expect("selector past deadline is auto-assigned");
    assert_eq!(assigned.club_id, club.id);
    assert_eq!(assigned.bid_cost, 40);

    let after = users::Entity::find_by_id(user.id).one(&db).await?.unwrap();
    assert_eq!(after.used_space, 340);
    Ok(())
}
