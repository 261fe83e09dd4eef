use league_backend::allocation::orchestration::{
    draft_pick, draw, draw_for_user, draw_status, reset_user_draws,
};
use league_backend::allocation::quota::DrawMode;
use league_backend::config::GameRules;
use league_backend::entity::draw_records::DrawType;
use league_backend::entity::game_phase::Phase;
use league_backend::entity::generals::{self, PoolType};
use league_backend::entity::users;
use league_backend::error::AppError;
use league_backend::test_support::common::{
    seed_general, seed_user, set_phase, test_bootstrap,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sea_orm::EntityTrait;

async fn seed_pools(db: &sea_orm::DatabaseConnection) {
    for i in 0..3 {
        seed_general(db, 100 + i, PoolType::Guarantee, 20).await;
    }
    for i in 0..7 {
        seed_general(db, 200 + i, PoolType::Normal, 10).await;
    }
}

#[actix_web::test]
async fn test_draws_follow_quota_order() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let rules = GameRules::default();
    seed_pools(&db).await;
    let user = seed_user(&db, "caocao", true, 350).await;
    set_phase(&db, Phase::Draw).await;
    let mut rng = StdRng::seed_from_u64(7);

    let early_normal = draw(&db, &rules, user.id, DrawMode::Only(DrawType::Normal), &mut rng).await;
    assert!(matches!(early_normal, Err(AppError::GuaranteeDrawsPending)));

    for _ in 0..3 {
        let outcome = draw(&db, &rules, user.id, DrawMode::Auto, &mut rng).await?;
        assert_eq!(outcome.draw_type, DrawType::Guarantee);
        assert_eq!(outcome.general.owner_id, Some(user.id));
    }
    for _ in 0..7 {
        let outcome = draw(&db, &rules, user.id, DrawMode::Auto, &mut rng).await?;
        assert_eq!(outcome.draw_type, DrawType::Normal);
    }

    let over = draw(&db, &rules, user.id, DrawMode::Auto, &mut rng).await;
    assert!(matches!(over, Err(AppError::DrawLimitReached)));

    let status = draw_status(&db, &rules, user.id).await?;
    assert!(status.is_complete());

    let user = users::Entity::find_by_id(user.id).one(&db).await?.unwrap();
    assert_eq!(user.used_space, 3 * 20 + 7 * 10);
    Ok(())
}

#[actix_web::test]
async fn test_draw_outside_draw_phase_is_rejected() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    seed_pools(&db).await;
    let user = seed_user(&db, "liubei", true, 350).await;
    let mut rng = StdRng::seed_from_u64(1);

    let result = draw(&db, &GameRules::default(), user.id, DrawMode::Auto, &mut rng).await;
    assert!(matches!(result, Err(AppError::WrongPhase { .. })));
    Ok(())
}

#[actix_web::test]
async fn test_draw_requires_space() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    seed_pools(&db).await;
    let user = seed_user(&db, "sunquan", true, 5).await;
    set_phase(&db, Phase::Draw).await;
    let mut rng = StdRng::seed_from_u64(3);

    let result = draw(&db, &GameRules::default(), user.id, DrawMode::Auto, &mut rng).await;
    assert!(matches!(result, Err(AppError::InsufficientSpace { .. })));

    let owned = generals::Entity::find().all(&db).await?;
    assert!(owned.iter().all(|g| g.owner_id.is_none()));
    Ok(())
}

#[actix_web::test]
async fn test_empty_pool_reports_no_assets() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let user = seed_user(&db, "dongzhuo", true, 350).await;
    set_phase(&db, Phase::Draw).await;
    let mut rng = StdRng::seed_from_u64(5);

    let result = draw(&db, &GameRules::default(), user.id, DrawMode::Auto, &mut rng).await;
    assert!(matches!(result, Err(AppError::NoAvailableAssets(_))));
    Ok(())
}

#[actix_web::test]
async fn test_admin_draw_ignores_phase_and_reset_refunds() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let rules = GameRules::default();
    seed_pools(&db).await;
    let user = seed_user(&db, "yuanshao", true, 350).await;
    let mut rng = StdRng::seed_from_u64(11);

    let report = draw_for_user(&db, &rules, user.id, &mut rng).await?;
    assert_eq!(report.generals.len(), 10);
    assert_eq!(report.halted_by, None);

    let reset = reset_user_draws(&db, user.id).await?;
    assert_eq!(reset.released_generals.len(), 10);
    assert_eq!(reset.refunded, 130);

    let user = users::Entity::find_by_id(user.id).one(&db).await?.unwrap();
    assert_eq!(user.used_space, 0);
    let free = generals::Entity::find().all(&db).await?;
    assert!(free.iter().all(|g| g.owner_id.is_none() && g.is_available));
    Ok(())
}

#[actix_web::test]
async fn test_draft_pick_numbers_and_availability() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let first = seed_general(&db, 300, PoolType::Draft, 15).await;
    let second = seed_general(&db, 301, PoolType::Draft, 25).await;
    let normal = seed_general(&db, 302, PoolType::Normal, 5).await;
    let a = seed_user(&db, "zhouyu", true, 350).await;
    let b = seed_user(&db, "lusu", true, 350).await;
    set_phase(&db, Phase::Draft).await;

    let pick_a = draft_pick(&db, a.id, first.id).await?;
    assert_eq!(pick_a.record.pick, 1);
    let pick_b = draft_pick(&db, b.id, second.id).await?;
    assert_eq!(pick_b.record.pick, 2);

    let taken = draft_pick(&db, b.id, first.id).await;
    assert!(matches!(taken, Err(AppError::GeneralNotAvailable)));
    let wrong_pool = draft_pick(&db, b.id, normal.id).await;
    assert!(matches!(wrong_pool, Err(AppError::GeneralNotAvailable)));

    let b = users::Entity::find_by_id(b.id).one(&db).await?.unwrap();
    assert_eq!(b.used_space, 25);
    Ok(())
}
