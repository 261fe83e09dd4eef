use league_backend::assets::catalog::{
    get_club, leagues, list_clubs, list_generals, list_rules, roster, statistics, tags,
    ClubFilter,
};
use league_backend::assets::import::import_catalog;
use league_backend::dto::import_payload::{ImportCount, ImportPayload};
use league_backend::entity::generals::{self, PoolType};
use league_backend::entity::users;
use league_backend::error::AppError;
use league_backend::test_support::common::{give_general, seed_user, test_bootstrap};
use sea_orm::EntityTrait;
use serde_json::json;

fn payload(salary: i32) -> ImportPayload {
    serde_json::from_value(json!({
        "generals": [
            { "external_id": 1, "name": "Guan Yu", "pool_type": "guarantee", "salary": salary, "force": 97 },
            { "external_id": 2, "name": "Zhang Fei", "pool_type": "normal", "salary": 25 },
            { "external_id": 3, "name": "Lu Bu", "pool_type": "auction", "salary": 60 }
        ],
        "treasures": [
            { "external_id": 1, "name": "Green Dragon Blade", "kind": "weapon", "value": 10 }
        ],
        "clubs": [
            {
                "external_id": 1, "name": "Shu", "league": "west", "tags": ["benevolent"],
                "policies": [
                    { "condition": "home city", "effect": "+10 morale" },
                    { "condition": "winter", "effect": "-5 food" }
                ]
            },
            { "external_id": 2, "name": "Wei", "league": "north", "tags": ["strong"] }
        ],
        "cities": [ { "external_id": 1, "name": "Chengdu", "gold_income": 800 } ],
        "rules": [
            { "category": "draw", "title": "Guarantee draws", "content": "Three first", "sort_order": 1 }
        ]
    }))
    .unwrap()
}

#[actix_web::test]
async fn test_import_upserts_and_keeps_ownership() -> anyhow::Result<()> {
    let db = test_bootstrap().await;

    let report = import_catalog(&db, payload(30)).await?;
    assert_eq!(report.generals, ImportCount { inserted: 3, updated: 0 });
    assert_eq!(report.clubs.inserted, 2);
    assert_eq!(report.rules.inserted, 1);

    let user = seed_user(&db, "liubei", true, 350).await;
    let guan_yu = list_generals(&db, Some(PoolType::Guarantee)).await?.remove(0);
    give_general(&db, &guan_yu, &user).await;

    let report = import_catalog(&db, payload(35)).await?;
    assert_eq!(report.generals, ImportCount { inserted: 0, updated: 3 });
    assert_eq!(report.rules, ImportCount { inserted: 0, updated: 1 });

    let reloaded = generals::Entity::find_by_id(guan_yu.id).one(&db).await?.unwrap();
    assert_eq!(reloaded.salary, 35);
    assert_eq!(reloaded.owner_id, Some(user.id));
    assert!(!reloaded.is_available);

    let shu = list_clubs(&db, &ClubFilter { league: Some("west".to_string()), tag: None }).await?;
    assert_eq!(shu.len(), 1);
    assert_eq!(shu[0].policies.len(), 2);
    let shu = get_club(&db, shu[0].club.id).await?;
    assert_eq!(shu.policies.len(), 2);

    assert_eq!(leagues(&db).await?, vec!["north".to_string(), "west".to_string()]);
    assert_eq!(tags(&db).await?, vec!["benevolent".to_string(), "strong".to_string()]);
    assert_eq!(list_rules(&db).await?.len(), 1);

    let held = roster(&db, user.id).await?;
    assert_eq!(held.generals.len(), 1);
    assert_eq!(held.total_salary, 35);
    let owner = users::Entity::find_by_id(user.id).one(&db).await?.unwrap();
    assert_eq!(owner.used_space, 35);

    let stats = statistics(&db).await?;
    assert_eq!(stats.total_generals, 3);
    assert_eq!(stats.owned_generals, 1);
    assert_eq!(stats.registered_players, 1);
    Ok(())
}

#[actix_web::test]
async fn test_import_rejects_negative_salary_atomically() -> anyhow::Result<()> {
    let db = test_bootstrap().await;

    let result = import_catalog(&db, payload(-1)).await;
    assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    assert!(list_generals(&db, None).await?.is_empty());

    let missing = get_club(&db, 42).await;
    assert!(matches!(missing, Err(AppError::ClubNotFound)));
    Ok(())
}

#[actix_web::test]
async fn test_import_salary_raise_must_fit_owner_space() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    import_catalog(&db, payload(30)).await?;

    let user = seed_user(&db, "liuchan", true, 40).await;
    let guan_yu = list_generals(&db, Some(PoolType::Guarantee)).await?.remove(0);
    give_general(&db, &guan_yu, &user).await;

    let result = import_catalog(&db, payload(45)).await;
    assert!(matches!(result, Err(AppError::InsufficientSpace { .. })));

    let reloaded = generals::Entity::find_by_id(guan_yu.id).one(&db).await?.unwrap();
    assert_eq!(reloaded.salary, 30);
    let owner = users::Entity::find_by_id(user.id).one(&db).await?.unwrap();
    assert_eq!(owner.used_space, 30);

    import_catalog(&db, payload(20)).await?;
    let owner = users::Entity::find_by_id(user.id).one(&db).await?.unwrap();
    assert_eq!(owner.used_space, 20);
    Ok(())
}
