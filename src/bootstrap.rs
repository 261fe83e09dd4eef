use migration::Migrator;
use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::env;
use std::sync::OnceLock;
use tokio::sync::OnceCell;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::{policy, season, user_management};

static DOTENV_INIT: OnceLock<()> = OnceLock::new();
static TRACING_INIT: OnceLock<()> = OnceLock::new();
static DB_CONNECTION: OnceCell<DatabaseConnection> = OnceCell::const_new();

/// Load environment variables from .env file exactly once
pub fn load_dotenv() {
    DOTENV_INIT.get_or_init(|| {
        dotenv::dotenv().ok();
    });
}

/// Initialize tracing exactly once
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,actix_web=info,sea_orm=warn"));

        let is_production =
            env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production";

        if is_production {
            // JSON formatter for production
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    });
}

/// Connect and migrate exactly once per process, return a cheap clone thereafter
pub async fn connect_and_migrate(config: &AppConfig) -> Result<DatabaseConnection, AppError> {
    let db = DB_CONNECTION
        .get_or_try_init(|| async {
            info!("Database URL: {}", redact_db_url(&config.database_url));

            let mut options = ConnectOptions::new(config.database_url.clone());
            options.sqlx_logging(false);
            let db = Database::connect(options).await?;
            info!("Connected to database");

            Migrator::up(&db, None).await?;
            info!("Database migrations completed");

            Ok::<_, AppError>(db)
        })
        .await?;

    Ok(db.clone())
}

/// Create the singleton state records and the configured admin account
pub async fn prepare_state(db: &DatabaseConnection, config: &AppConfig) -> Result<(), AppError> {
    season::phase::load(db).await?;
    policy::orchestration::load_config(db).await?;

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        user_management::ensure_admin(db, username, password, config.bcrypt_cost).await?;
    }

    Ok(())
}

/// Render a DB URL for logs without its credentials
pub fn redact_db_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            if url[..colon_pos].contains("//") {
                let mut s = String::with_capacity(url.len());
                s.push_str(&url[..(colon_pos + 1)]);
                s.push_str("***");
                s.push_str(&url[at_pos..]);
                return s;
            }
        }
    }
    url.to_string()
}
