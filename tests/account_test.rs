use chrono::Utc;
use league_backend::config::AppConfig;
use league_backend::dto::auth_request::RegisterRequest;
use league_backend::dto::invite_request::GenerateInviteCodesRequest;
use league_backend::entity::invite_codes::InviteKind;
use league_backend::entity::users;
use league_backend::error::AppError;
use league_backend::invite_management::{
    code_stats, code_usages, delete_code, generate_codes, list_codes, CodeBatch,
};
use league_backend::jwt::{AuthProvider, JwtProvider};
use league_backend::test_support::common::{seed_admin, test_bootstrap, test_config};
use league_backend::user_management::{ensure_admin, login, register, update_profile, Registration};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

fn registration(username: &str, invite_code: Option<&str>) -> Registration {
    Registration::from_request(RegisterRequest {
        username: username.to_string(),
        password: "secret-pass".to_string(),
        nickname: None,
        invite_code: invite_code.map(str::to_string),
    })
    .unwrap()
}

fn invite_config() -> AppConfig {
    AppConfig {
        require_invite_code: true,
        ..test_config()
    }
}

async fn one_code(db: &DatabaseConnection, kind: InviteKind, max_uses: Option<i32>) -> String {
    let admin = seed_admin(db, &format!("admin-{}", uuid::Uuid::new_v4().simple())).await;
    let batch = CodeBatch::from_request(
        GenerateInviteCodesRequest {
            count: 1,
            kind,
            max_uses,
            expire_days: None,
            remark: "test".to_string(),
        },
        Utc::now().fixed_offset(),
    )
    .unwrap();
    generate_codes(db, admin.id, batch).await.unwrap().remove(0).code
}

#[actix_web::test]
async fn test_register_then_login() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let config = test_config();

    let (user, token) = register(&db, &config, registration("caocao", None)).await?;
    assert!(!user.is_registered);
    assert_eq!(user.space, config.rules.initial_space);
    let claims = JwtProvider::new(config.jwt.clone()).validate(&token)?;
    assert_eq!(claims.user_id()?, user.id);

    let taken = register(&db, &config, registration("caocao", None)).await;
    assert!(matches!(taken, Err(AppError::UsernameTaken)));

    let (logged_in, _) = login(&db, &config, "caocao", "secret-pass".to_string()).await?;
    assert_eq!(logged_in.id, user.id);

    let wrong = login(&db, &config, "caocao", "not-it".to_string()).await;
    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    let unknown = login(&db, &config, "nobody", "secret-pass".to_string()).await;
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));

    let renamed = update_profile(&db, user.id, "Mengde".to_string()).await?;
    assert_eq!(renamed.nickname, "Mengde");
    Ok(())
}

#[actix_web::test]
async fn test_single_use_invite_is_consumed_once() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let config = invite_config();
    let code = one_code(&db, InviteKind::SingleUse, Some(5)).await;

    let missing = register(&db, &config, registration("liubei", None)).await;
    assert!(matches!(missing, Err(AppError::InviteCodeRequired)));

    let unknown = register(&db, &config, registration("liubei", Some("ffffffffffffffff"))).await;
    assert!(matches!(unknown, Err(AppError::InviteCodeNotFound)));

    register(&db, &config, registration("liubei", Some(&code))).await?;
    let reused = register(&db, &config, registration("guanyu", Some(&code))).await;
    assert!(matches!(reused, Err(AppError::InviteCodeInvalid)));

    // The failed registration left no account behind
    let guanyu = users::Entity::find()
        .all(&db)
        .await?
        .into_iter()
        .find(|u| u.username == "guanyu");
    assert!(guanyu.is_none());

    let page = list_codes(&db, 1, 10).await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].used_count, 1);
    assert_eq!(page.items[0].max_uses, 1);

    let usages = code_usages(&db, page.items[0].id).await?;
    assert_eq!(usages.len(), 1);
    Ok(())
}

#[actix_web::test]
async fn test_multi_use_invite_stats_and_delete() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let config = invite_config();
    let code = one_code(&db, InviteKind::MultiUse, Some(2)).await;

    register(&db, &config, registration("zhangfei", Some(&code))).await?;
    let stats = code_stats(&db, Utc::now().fixed_offset()).await?;
    assert_eq!(stats.total, 1);
    assert_eq!(stats.used, 1);
    assert_eq!(stats.available, 1);

    register(&db, &config, registration("zhaoyun", Some(&code))).await?;
    let stats = code_stats(&db, Utc::now().fixed_offset()).await?;
    assert_eq!(stats.available, 0);

    let page = list_codes(&db, 1, 10).await?;
    delete_code(&db, page.items[0].id).await?;
    assert_eq!(code_stats(&db, Utc::now().fixed_offset()).await?.total, 0);

    let gone = delete_code(&db, page.items[0].id).await;
    assert!(matches!(gone, Err(AppError::InviteCodeNotFound)));
    Ok(())
}

#[actix_web::test]
async fn test_ensure_admin_creates_then_promotes() -> anyhow::Result<()> {
    let db = test_bootstrap().await;
    let config = test_config();

    let admin = ensure_admin(&db, "root", "root-pass", config.bcrypt_cost).await?;
    assert!(admin.is_admin);
    let again = ensure_admin(&db, "root", "other-pass", config.bcrypt_cost).await?;
    assert_eq!(again.id, admin.id);
    assert_eq!(users::Entity::find().count(&db).await?, 1);

    // The existing password is kept
    login(&db, &config, "root", "root-pass".to_string()).await?;

    let (player, _) = register(&db, &config, registration("xunyu", None)).await?;
    let promoted = ensure_admin(&db, "xunyu", "ignored", config.bcrypt_cost).await?;
    assert_eq!(promoted.id, player.id);
    assert!(promoted.is_admin);
    Ok(())
}
