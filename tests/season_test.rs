use league_backend::allocation::orchestration::draw_for_user;
use league_backend::config::GameRules;
use league_backend::entity::game_phase::Phase;
use league_backend::entity::generals::{self, PoolType};
use league_backend::entity::{clubs, draw_records, trades, users};
use league_backend::error::AppError;
use league_backend::season::orchestration::{registered_players, reset_season, set_phase, signup};
use league_backend::season::phase::{self, PhaseUpdate};
use league_backend::test_support::common::{
    give_general, seed_admin, seed_club, seed_general, seed_user, test_bootstrap,
};
use league_backend::trading::orchestration::create_trade;
use league_backend::trading::settlement::TradeTerms;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

fn phase_only(phase: Phase) -> PhaseUpdate {
    PhaseUpdate {
        phase,
        round_number: None,
        draft_round: None,
        draft_order: None,
    }
}

#[actix_web::test]
async fn test_signup_grants_initial_space_until_full() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let rules = GameRules {
        players_per_season: 2,
        ..GameRules::default()
    };
    let a = seed_user(&db, "caocao", false, 0).await;
    let b = seed_user(&db, "liubei", false, 0).await;
    let c = seed_user(&db, "sunquan", false, 0).await;

    let signed = signup(&db, &rules, a.id).await?;
    assert!(signed.is_registered);
    assert_eq!(signed.space, rules.initial_space);
    assert_eq!(signed.used_space, 0);

    let twice = signup(&db, &rules, a.id).await;
    assert!(matches!(twice, Err(AppError::AlreadyRegistered)));

    signup(&db, &rules, b.id).await?;
    let full = signup(&db, &rules, c.id).await;
    assert!(matches!(full, Err(AppError::RegistrationFull)));

    assert_eq!(registered_players(&db).await?.len(), 2);
    Ok(())
}

#[actix_web::test]
async fn test_signup_closed_outside_signup_phase() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let rules = GameRules::default();
    let user = seed_user(&db, "dongzhuo", false, 0).await;
    set_phase(&db, &rules, phase_only(Phase::Draw)).await?;

    let result = signup(&db, &rules, user.id).await;
    assert!(matches!(result, Err(AppError::WrongPhase { .. })));
    Ok(())
}

#[actix_web::test]
async fn test_set_phase_validates_and_bumps_version() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let rules = GameRules::default();
    let before = phase::load(&db).await?;

    let bad_round = PhaseUpdate {
        draft_round: Some(rules.draft_rounds + 1),
        ..phase_only(Phase::Draft)
    };
    assert!(matches!(
        set_phase(&db, &rules, bad_round).await,
        Err(AppError::InvalidRequest(_))
    ));

    let update = PhaseUpdate {
        draft_round: Some(2),
        round_number: Some(3),
        ..phase_only(Phase::Draft)
    };
    let after = set_phase(&db, &rules, update).await?;
    assert_eq!(after.current_phase, Phase::Draft);
    assert_eq!(after.draft_round, 2);
    assert_eq!(after.round_number, 3);
    assert_eq!(after.version, before.version + 1);
    Ok(())
}

#[actix_web::test]
async fn test_reset_season_clears_allocations() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let rules = GameRules::default();
    for i in 0..3 {
        seed_general(&db, 100 + i, PoolType::Guarantee, 10).await;
    }
    for i in 0..7 {
        seed_general(&db, 200 + i, PoolType::Normal, 10).await;
    }
    seed_admin(&db, "referee").await;
    let a = seed_user(&db, "zhaoyun", true, 350).await;
    let b = seed_user(&db, "machao", true, 350).await;
    let mut rng = StdRng::seed_from_u64(9);
    draw_for_user(&db, &rules, a.id, &mut rng).await?;

    let spare = seed_general(&db, 900, PoolType::Draft, 40).await;
    give_general(&db, &spare, &b).await;
    set_phase(&db, &rules, phase_only(Phase::Trading)).await?;
    create_trade(
        &db,
        b.id,
        a.id,
        TradeTerms {
            offer_generals: vec![spare.id],
            ..Default::default()
        },
        String::new(),
    )
    .await?;

    let state = reset_season(&db, &rules).await?;
    assert_eq!(state.current_phase, Phase::Signup);
    assert_eq!(state.round_number, 1);
    assert_eq!(state.draft_round, 0);

    assert_eq!(draw_records::Entity::find().count(&db).await?, 0);
    assert_eq!(trades::Entity::find().count(&db).await?, 0);
    for general in generals::Entity::find().all(&db).await? {
        assert_eq!(general.owner_id, None);
        assert!(general.is_available);
    }
    for user in users::Entity::find().all(&db).await? {
        assert_eq!(user.used_space, 0);
        assert_eq!(user.space, rules.initial_space);
        if !user.is_admin {
            assert!(!user.is_registered);
        }
    }
    Ok(())
}

#[actix_web::test]
async fn test_signup_after_reset_starts_fresh() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let rules = GameRules::default();
    let club = seed_club(&db, 7, 0, None).await;
    let general = seed_general(&db, 300, PoolType::Guarantee, 60).await;
    let user = seed_user(&db, "jiangwei", true, 350).await;
    let (general, user) = give_general(&db, &general, &user).await;

    let mut holder: users::ActiveModel = user.into();
    holder.club_id = Set(Some(club.id));
    let user = holder.update(&db).await?;
    let mut owned: clubs::ActiveModel = club.clone().into();
    owned.owner_id = Set(Some(user.id));
    owned.update(&db).await?;
    assert_eq!(user.used_space, 60);

    reset_season(&db, &rules).await?;
    let signed = signup(&db, &rules, user.id).await?;
    assert_eq!(signed.space, 350);
    assert_eq!(signed.used_space, 0);
    assert_eq!(signed.club_id, None);
    assert!(signed.is_registered);

    let general = generals::Entity::find_by_id(general.id).one(&db).await?.unwrap();
    assert_eq!(general.owner_id, None);
    assert!(general.is_available);
    assert_eq!(general.pool_type, PoolType::Guarantee);
    let club = clubs::Entity::find_by_id(club.id).one(&db).await?.unwrap();
    assert_eq!(club.owner_id, None);
    Ok(())
}
