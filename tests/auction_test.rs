use league_backend::auction::orchestration::{
    assign_auction, auction_results, auction_stats, reset_auction, reset_auction_by_general,
    AssignAuction,
};
use league_backend::entity::generals::{self, PoolType};
use league_backend::entity::{auction_records, users};
use league_backend::error::AppError;
use league_backend::test_support::common::{seed_general, seed_user, test_bootstrap};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

fn sale(general_id: i32, winner: Option<uuid::Uuid>, price: Option<i32>) -> AssignAuction {
    AssignAuction {
        general_id,
        winner,
        price,
        remark: String::new(),
    }
}

#[actix_web::test]
async fn test_sale_charges_winner_and_reset_refunds() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let lot = seed_general(&db, 500, PoolType::Auction, 60).await;
    let winner = seed_user(&db, "yuanshao", true, 350).await;

    let record = assign_auction(&db, sale(lot.id, Some(winner.id), Some(75))).await?;
    assert_eq!(record.price, 75);
    assert!(!record.is_unsold);

    let lot_after = generals::Entity::find_by_id(lot.id).one(&db).await?.unwrap();
    assert_eq!(lot_after.owner_id, Some(winner.id));
    let winner_after = users::Entity::find_by_id(winner.id).one(&db).await?.unwrap();
    assert_eq!(winner_after.used_space, 75);

    let twice = assign_auction(&db, sale(lot.id, Some(winner.id), None)).await;
    assert!(matches!(twice, Err(AppError::GeneralAlreadyAuctioned)));

    reset_auction(&db, record.id).await?;
    let lot_after = generals::Entity::find_by_id(lot.id).one(&db).await?.unwrap();
    assert_eq!(lot_after.owner_id, None);
    let winner_after = users::Entity::find_by_id(winner.id).one(&db).await?.unwrap();
    assert_eq!(winner_after.used_space, 0);

    let gone = reset_auction(&db, record.id).await;
    assert!(matches!(gone, Err(AppError::AuctionRecordNotFound)));
    Ok(())
}

#[actix_web::test]
async fn test_price_defaults_to_salary_and_unsold_lots() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let sold = seed_general(&db, 501, PoolType::Auction, 40).await;
    let unsold = seed_general(&db, 502, PoolType::Auction, 30).await;
    let pending = seed_general(&db, 503, PoolType::Auction, 20).await;
    let not_auction = seed_general(&db, 504, PoolType::Normal, 20).await;
    let winner = seed_user(&db, "gongsunzan", true, 350).await;

    let record = assign_auction(&db, sale(sold.id, Some(winner.id), None)).await?;
    assert_eq!(record.price, 40);
    let record = assign_auction(&db, sale(unsold.id, None, Some(99))).await?;
    assert!(record.is_unsold);
    assert_eq!(record.price, 0);

    let wrong_pool = assign_auction(&db, sale(not_auction.id, Some(winner.id), None)).await;
    assert!(matches!(wrong_pool, Err(AppError::GeneralNotFound)));

    let stats = auction_stats(&db).await?;
    assert_eq!(stats.total, 3);
    assert_eq!(stats.sold, 1);
    assert_eq!(stats.unsold, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.total_price, 40);

    let results = auction_results(&db).await?;
    let pending_row = results.iter().find(|r| r.general.id == pending.id).unwrap();
    assert!(pending_row.record.is_none());
    let sold_row = results.iter().find(|r| r.general.id == sold.id).unwrap();
    assert_eq!(sold_row.winner_nickname.as_deref(), Some("gongsunzan"));
    Ok(())
}

#[actix_web::test]
async fn test_sale_requires_space() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let lot = seed_general(&db, 505, PoolType::Auction, 60).await;
    let winner = seed_user(&db, "liubiao", true, 50).await;

    let result = assign_auction(&db, sale(lot.id, Some(winner.id), None)).await;
    assert!(matches!(result, Err(AppError::InsufficientSpace { .. })));
    assert!(auction_results(&db).await?[0].record.is_none());
    Ok(())
}

#[actix_web::test]
async fn test_reset_keeps_general_traded_away() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let lot = seed_general(&db, 506, PoolType::Auction, 30).await;
    let winner = seed_user(&db, "liuzhang", true, 350).await;
    let buyer = seed_user(&db, "zhanglu", true, 350).await;
    assign_auction(&db, sale(lot.id, Some(winner.id), Some(30))).await?;

    let held = generals::Entity::find_by_id(lot.id).one(&db).await?.unwrap();
    let mut moved: generals::ActiveModel = held.into();
    moved.owner_id = Set(Some(buyer.id));
    moved.update(&db).await?;

    reset_auction_by_general(&db, lot.id).await?;
    let lot_after = generals::Entity::find_by_id(lot.id).one(&db).await?.unwrap();
    assert_eq!(lot_after.owner_id, Some(buyer.id));
    let winner_after = users::Entity::find_by_id(winner.id).one(&db).await?.unwrap();
    assert_eq!(winner_after.used_space, 30);
    Ok(())
}

#[actix_web::test]
async fn test_unknown_winner_records_nothing() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let lot = seed_general(&db, 510, PoolType::Auction, 30).await;

    let result = assign_auction(&db, sale(lot.id, Some(uuid::Uuid::new_v4()), None)).await;
    assert!(matches!(result, Err(AppError::UserNotFound)));

    assert_eq!(auction_records::Entity::find().count(&db).await?, 0);
    let lot_after = generals::Entity::find_by_id(lot.id).one(&db).await?.unwrap();
    assert_eq!(lot_after.owner_id, None);
    assert!(lot_after.is_available);
    Ok(())
}
