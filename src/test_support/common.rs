use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use std::sync::Once;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::bootstrap::prepare_state;
use crate::config::{AppConfig, GameRules, JwtConfig};
use crate::entity::clubs::{self, ClubTags};
use crate::entity::game_phase::{self, Phase};
use crate::entity::generals::{self, PoolType};
use crate::entity::{treasures, users};
use crate::jwt::{AuthProvider, JwtProvider};
use crate::season::phase::{self, PhaseUpdate};

static INIT: Once = Once::new();

pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,actix_web=info,sea_orm=warn"));
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    });
}

/// Configuration used by every test: cheap hashing, open registration and
/// a fixed signing secret.
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt: JwtConfig {
            secret: "league-test-secret".to_string(),
            expire_hours: 1,
        },
        rules: GameRules::default(),
        require_invite_code: false,
        bcrypt_cost: 4,
        admin_username: None,
        admin_password: None,
        ..AppConfig::default()
    }
}

/// Fresh in-memory database with all migrations applied and the singleton
/// state rows created. Each call returns an isolated database.
pub async fn test_bootstrap() -> DatabaseConnection {
    init_tracing_for_tests();

    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("sqlite connect failed");
    Migrator::up(&db, None).await.expect("Migrator::up failed");
    prepare_state(&db, &test_config())
        .await
        .expect("prepare_state failed");
    db
}

/// Test-only JWT helper that signs with the same provider as production
pub fn test_issue_token(config: &AppConfig, user: &users::Model) -> String {
    JwtProvider::new(config.jwt.clone())
        .issue_token(user)
        .expect("Failed to encode JWT token for test")
}

pub async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    registered: bool,
    space: i32,
) -> users::Model {
    let now = Utc::now();
    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set(String::new()),
        nickname: Set(username.to_string()),
        is_admin: Set(false),
        is_registered: Set(registered),
        space: Set(space),
        used_space: Set(0),
        club_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("seed user failed")
}

pub async fn seed_admin(db: &DatabaseConnection, username: &str) -> users::Model {
    let user = seed_user(db, username, false, 0).await;
    let mut user: users::ActiveModel = user.into();
    user.is_admin = Set(true);
    user.update(db).await.expect("seed admin failed")
}

pub async fn seed_general(
    db: &DatabaseConnection,
    external_id: i32,
    pool_type: PoolType,
    salary: i32,
) -> generals::Model {
    let now = Utc::now();
    generals::ActiveModel {
        external_id: Set(external_id),
        name: Set(format!("General {external_id}")),
        command: Set(70),
        force: Set(70),
        intelligence: Set(70),
        politics: Set(70),
        charm: Set(70),
        affinity: Set(0),
        spear: Set("B".to_string()),
        halberd: Set("B".to_string()),
        crossbow: Set("B".to_string()),
        cavalry: Set("B".to_string()),
        soldier: Set("B".to_string()),
        water: Set("C".to_string()),
        skills: Set(String::new()),
        note: Set(String::new()),
        pool_type: Set(pool_type),
        tier: Set(String::new()),
        salary: Set(salary),
        owner_id: Set(None),
        is_available: Set(true),
        injured_until: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed general failed")
}

pub async fn seed_treasure(
    db: &DatabaseConnection,
    external_id: i32,
    value: i32,
) -> treasures::Model {
    let now = Utc::now();
    treasures::ActiveModel {
        external_id: Set(external_id),
        name: Set(format!("Treasure {external_id}")),
        kind: Set("weapon".to_string()),
        value: Set(value),
        effect: Set(String::new()),
        skill: Set(String::new()),
        owner_id: Set(None),
        is_available: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed treasure failed")
}

pub async fn seed_club(
    db: &DatabaseConnection,
    external_id: i32,
    base_price: i32,
    league: Option<&str>,
) -> clubs::Model {
    let now = Utc::now();
    clubs::ActiveModel {
        external_id: Set(external_id),
        name: Set(format!("Club {external_id}")),
        description: Set(String::new()),
        base_price: Set(base_price),
        league: Set(league.map(str::to_string)),
        tags: Set(ClubTags::default()),
        owner_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed club failed")
}

/// Hand an asset to a user and charge its cost, bypassing allocation
pub async fn give_general(
    db: &DatabaseConnection,
    general: &generals::Model,
    user: &users::Model,
) -> (generals::Model, users::Model) {
    let mut g: generals::ActiveModel = general.clone().into();
    g.owner_id = Set(Some(user.id));
    g.is_available = Set(false);
    let g = g.update(db).await.expect("give general failed");

    let mut u: users::ActiveModel = user.clone().into();
    u.used_space = Set(user.used_space + general.salary);
    let u = u.update(db).await.expect("charge user failed");
    (g, u)
}

pub async fn set_phase(db: &DatabaseConnection, phase: Phase) -> game_phase::Model {
    phase::write(
        db,
        PhaseUpdate {
            phase,
            round_number: None,
            draft_round: None,
            draft_order: None,
        },
    )
    .await
    .expect("set phase failed")
}
