use league_backend::entity::game_phase::Phase;
use league_backend::entity::generals::{self, PoolType};
use league_backend::entity::trade_logs::{self, TradeAction};
use league_backend::entity::trades::{self, TradeStatus};
use league_backend::entity::{treasures, users};
use league_backend::error::AppError;
use league_backend::test_support::common::{
    give_general, seed_admin, seed_general, seed_treasure, seed_user, set_phase, test_bootstrap,
};
use league_backend::trading::orchestration::{
    accept_trade, cancel_trade, create_trade, pending_trades, reject_trade, trade_detail,
    trade_history,
};
use league_backend::trading::settlement::TradeTerms;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

struct Swap {
    proposer: users::Model,
    receiver: users::Model,
    offered: generals::Model,
    requested: generals::Model,
}

/// Proposer holds a 30-salary general, receiver a 50-salary one
async fn setup_swap(db: &DatabaseConnection, proposer_space: i32) -> Swap {
    let proposer = seed_user(db, "caocao", true, proposer_space).await;
    let receiver = seed_user(db, "liubei", true, 350).await;
    let g1 = seed_general(db, 1, PoolType::Normal, 30).await;
    let g2 = seed_general(db, 2, PoolType::Normal, 50).await;
    let (offered, proposer) = give_general(db, &g1, &proposer).await;
    let (requested, receiver) = give_general(db, &g2, &receiver).await;
    set_phase(db, Phase::Trading).await;
    Swap {
        proposer,
        receiver,
        offered,
        requested,
    }
}

fn swap_terms(swap: &Swap) -> TradeTerms {
    TradeTerms {
        offer_generals: vec![swap.offered.id],
        request_generals: vec![swap.requested.id],
        ..Default::default()
    }
}

async fn reload_user(db: &DatabaseConnection, id: Uuid) -> users::Model {
    users::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
}

async fn reload_general(db: &DatabaseConnection, id: i32) -> generals::Model {
    generals::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
}

#[actix_web::test]
async fn test_accepted_swap_moves_assets_and_space() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let swap = setup_swap(&db, 350).await;

    let proposed = create_trade(
        &db,
        swap.proposer.id,
        swap.receiver.id,
        swap_terms(&swap),
        "even swap".to_string(),
    )
    .await?;
    assert_eq!(proposed.trade.status, TradeStatus::Pending);
    assert_eq!(proposed.offer_generals, vec![swap.offered.id]);

    let pending = pending_trades(&db, swap.receiver.id).await?;
    assert_eq!(pending.len(), 1);

    let accepted = accept_trade(&db, proposed.trade.id, swap.receiver.id).await?;
    assert_eq!(accepted.trade.status, TradeStatus::Accepted);

    assert_eq!(reload_general(&db, swap.offered.id).await.owner_id, Some(swap.receiver.id));
    assert_eq!(reload_general(&db, swap.requested.id).await.owner_id, Some(swap.proposer.id));
    assert_eq!(reload_user(&db, swap.proposer.id).await.used_space, 50);
    assert_eq!(reload_user(&db, swap.receiver.id).await.used_space, 30);

    let (_, logs) = trade_detail(&db, proposed.trade.id, &swap.proposer).await?;
    assert_eq!(logs.len(), 2);
    assert!(logs.iter().any(|log| log.action == TradeAction::Created));
    assert!(logs.iter().any(|log| log.action == TradeAction::Accepted));

    let again = accept_trade(&db, proposed.trade.id, swap.receiver.id).await;
    assert!(matches!(again, Err(AppError::TradeAlreadyProcessed)));
    Ok(())
}

#[actix_web::test]
async fn test_space_bound_blocks_acceptance() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let swap = setup_swap(&db, 40).await;

    let proposed = create_trade(
        &db,
        swap.proposer.id,
        swap.receiver.id,
        swap_terms(&swap),
        String::new(),
    )
    .await?;

    let result = accept_trade(&db, proposed.trade.id, swap.receiver.id).await;
    assert!(matches!(result, Err(AppError::InsufficientSpace { .. })));

    let trade = trades::Entity::find_by_id(proposed.trade.id).one(&db).await?.unwrap();
    assert_eq!(trade.status, TradeStatus::Pending);
    assert_eq!(reload_general(&db, swap.offered.id).await.owner_id, Some(swap.proposer.id));
    assert_eq!(reload_user(&db, swap.proposer.id).await.used_space, 30);
    Ok(())
}

#[actix_web::test]
async fn test_ownership_change_cancels_trade() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let swap = setup_swap(&db, 350).await;
    let bystander = seed_user(&db, "sunquan", true, 350).await;

    let proposed = create_trade(
        &db,
        swap.proposer.id,
        swap.receiver.id,
        swap_terms(&swap),
        String::new(),
    )
    .await?;

    let mut moved: generals::ActiveModel = swap.offered.clone().into();
    moved.owner_id = Set(Some(bystander.id));
    moved.update(&db).await?;

    let result = accept_trade(&db, proposed.trade.id, swap.receiver.id).await;
    assert!(matches!(result, Err(AppError::TradeOwnershipChanged)));

    let trade = trades::Entity::find_by_id(proposed.trade.id).one(&db).await?.unwrap();
    assert_eq!(trade.status, TradeStatus::Cancelled);
    assert_eq!(reload_general(&db, swap.requested.id).await.owner_id, Some(swap.receiver.id));

    let logs = trade_logs::Entity::find().all(&db).await?;
    assert!(logs.iter().any(|log| log.action == TradeAction::Cancelled));
    Ok(())
}

#[actix_web::test]
async fn test_proposal_validation() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let swap = setup_swap(&db, 350).await;

    let with_self = create_trade(
        &db,
        swap.proposer.id,
        swap.proposer.id,
        swap_terms(&swap),
        String::new(),
    )
    .await;
    assert!(matches!(with_self, Err(AppError::CannotTradeWithSelf)));

    let not_mine = TradeTerms {
        offer_generals: vec![swap.requested.id],
        ..Default::default()
    };
    let result = create_trade(&db, swap.proposer.id, swap.receiver.id, not_mine, String::new()).await;
    assert!(matches!(result, Err(AppError::ItemNotOwned)));

    let not_theirs = TradeTerms {
        offer_space: 5,
        request_generals: vec![swap.offered.id],
        ..Default::default()
    };
    let result =
        create_trade(&db, swap.proposer.id, swap.receiver.id, not_theirs, String::new()).await;
    assert!(matches!(result, Err(AppError::InvalidTradeItems)));

    let missing = TradeTerms {
        request_generals: vec![9999],
        ..Default::default()
    };
    let result = create_trade(&db, swap.proposer.id, swap.receiver.id, missing, String::new()).await;
    assert!(matches!(result, Err(AppError::GeneralNotFound)));

    set_phase(&db, Phase::Auction).await;
    let closed = create_trade(
        &db,
        swap.proposer.id,
        swap.receiver.id,
        swap_terms(&swap),
        String::new(),
    )
    .await;
    assert!(matches!(closed, Err(AppError::WrongPhase { .. })));
    Ok(())
}

#[actix_web::test]
async fn test_space_and_treasure_trade() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let proposer = seed_user(&db, "zhouyu", true, 350).await;
    let receiver = seed_user(&db, "lusu", true, 350).await;
    let sword = seed_treasure(&db, 10, 100).await;
    let mut owned: treasures::ActiveModel = sword.clone().into();
    owned.owner_id = Set(Some(receiver.id));
    owned.is_available = Set(false);
    owned.update(&db).await?;
    set_phase(&db, Phase::Draft).await;

    // Proposer takes on 20 of the receiver's used space for the treasure
    let terms = TradeTerms {
        request_treasures: vec![sword.id],
        request_space: 20,
        ..Default::default()
    };
    let proposed = create_trade(&db, proposer.id, receiver.id, terms, String::new()).await?;
    accept_trade(&db, proposed.trade.id, receiver.id).await?;

    let sword = treasures::Entity::find_by_id(sword.id).one(&db).await?.unwrap();
    assert_eq!(sword.owner_id, Some(proposer.id));
    assert_eq!(reload_user(&db, proposer.id).await.used_space, 20);
    // Floored at zero for the receiver
    assert_eq!(reload_user(&db, receiver.id).await.used_space, 0);
    Ok(())
}

#[actix_web::test]
async fn test_reject_cancel_and_visibility() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let swap = setup_swap(&db, 350).await;
    let outsider = seed_user(&db, "yuanshu", true, 350).await;
    let admin = seed_admin(&db, "referee").await;

    let first = create_trade(
        &db,
        swap.proposer.id,
        swap.receiver.id,
        swap_terms(&swap),
        String::new(),
    )
    .await?;

    let wrong_side = reject_trade(&db, first.trade.id, swap.proposer.id).await;
    assert!(matches!(wrong_side, Err(AppError::NotTradeParticipant)));
    let rejected = reject_trade(&db, first.trade.id, swap.receiver.id).await?;
    assert_eq!(rejected.trade.status, TradeStatus::Rejected);

    let second = create_trade(
        &db,
        swap.proposer.id,
        swap.receiver.id,
        swap_terms(&swap),
        String::new(),
    )
    .await?;
    let wrong_side = cancel_trade(&db, second.trade.id, swap.receiver.id).await;
    assert!(matches!(wrong_side, Err(AppError::NotTradeParticipant)));
    let cancelled = cancel_trade(&db, second.trade.id, swap.proposer.id).await?;
    assert_eq!(cancelled.trade.status, TradeStatus::Cancelled);

    let hidden = trade_detail(&db, second.trade.id, &outsider).await;
    assert!(matches!(hidden, Err(AppError::NotTradeParticipant)));
    assert!(trade_detail(&db, second.trade.id, &admin).await.is_ok());

    assert!(pending_trades(&db, swap.proposer.id).await?.is_empty());
    assert_eq!(trade_history(&db, swap.receiver.id).await?.len(), 2);
    Ok(())
}
