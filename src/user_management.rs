//! Accounts: registration, login, profile and the seeded admin.

use actix_web::{get, post, put, web, HttpResponse, Result as ActixResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::dto::auth_request::{LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::entity::users;
use crate::error::AppError;
use crate::invite_management;
use crate::jwt::{AuthProvider, AuthUser, JwtProvider};

pub const USERNAME_MIN_CHARS: usize = 3;
pub const USERNAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const NICKNAME_MAX_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub invite_code: Option<String>,
}

impl Registration {
    /// Trim and validate a registration request. The nickname defaults to
    /// the username.
    ///
    /// This function is PURE.
    pub fn from_request(req: RegisterRequest) -> Result<Self, AppError> {
        let username = req.username.trim().to_string();
        let username_len = username.chars().count();
        if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&username_len) {
            return Err(AppError::InvalidRequest(format!(
                "username must be {USERNAME_MIN_CHARS} to {USERNAME_MAX_CHARS} characters"
            )));
        }
        if req.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(AppError::InvalidRequest(format!(
                "password must be at least {PASSWORD_MIN_CHARS} characters"
            )));
        }

        let nickname = match req.nickname.map(|n| n.trim().to_string()) {
            Some(nickname) if !nickname.is_empty() => validate_nickname(nickname)?,
            _ => username.clone(),
        };
        let invite_code = req
            .invite_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());

        Ok(Registration {
            username,
            password: req.password,
            nickname,
            invite_code,
        })
    }
}

fn validate_nickname(nickname: String) -> Result<String, AppError> {
    let nickname = nickname.trim().to_string();
    if nickname.is_empty() || nickname.chars().count() > NICKNAME_MAX_CHARS {
        return Err(AppError::InvalidRequest(format!(
            "nickname must be 1 to {NICKNAME_MAX_CHARS} characters"
        )));
    }
    Ok(nickname)
}

async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))?
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// A malformed stored hash never matches
async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("password check task failed: {e}")))?;
    Ok(verified.unwrap_or(false))
}

/// Create an account and issue its first token
pub async fn register(
    db: &DatabaseConnection,
    config: &AppConfig,
    registration: Registration,
) -> Result<(users::Model, String), AppError> {
    if config.require_invite_code && registration.invite_code.is_none() {
        return Err(AppError::InviteCodeRequired);
    }

    let password_hash = hash_password(registration.password, config.bcrypt_cost).await?;
    let initial_space = config.rules.initial_space;
    let username = registration.username;
    let nickname = registration.nickname;
    let invite_code = registration.invite_code;

    let user = db
        .transaction(|txn| {
            Box::pin(register_transaction(
                username,
                password_hash,
                nickname,
                invite_code,
                initial_space,
                txn,
            ))
        })
        .await?;

    let token = JwtProvider::new(config.jwt.clone()).issue_token(&user)?;
    info!(user_id = %user.id, username = %user.username, "account registered");
    Ok((user, token))
}

async fn register_transaction(
    username: String,
    password_hash: String,
    nickname: String,
    invite_code: Option<String>,
    initial_space: i32,
    txn: &DatabaseTransaction,
) -> Result<users::Model, AppError> {
    let taken = users::Entity::find()
        .filter(users::Column::Username.eq(username.as_str()))
        .one(txn)
        .await?;
    if taken.is_some() {
        return Err(AppError::UsernameTaken);
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        password_hash: Set(password_hash),
        nickname: Set(nickname),
        is_admin: Set(false),
        is_registered: Set(false),
        space: Set(initial_space),
        used_space: Set(0),
        club_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await?;

    if let Some(code) = invite_code {
        invite_management::validate_and_use(txn, &code, user.id).await?;
    }
    Ok(user)
}

/// Exchange credentials for a token
pub async fn login(
    db: &DatabaseConnection,
    config: &AppConfig,
    username: &str,
    password: String,
) -> Result<(users::Model, String), AppError> {
    let user = users::Entity::find()
        .filter(users::Column::Username.eq(username.trim()))
        .one(db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, user.password_hash.clone()).await? {
        return Err(AppError::InvalidCredentials);
    }

    let token = JwtProvider::new(config.jwt.clone()).issue_token(&user)?;
    info!(user_id = %user.id, "user logged in");
    Ok((user, token))
}

pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    nickname: String,
) -> Result<users::Model, AppError> {
    let nickname = validate_nickname(nickname)?;
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(AppError::UserNotFound)?;

    let mut user: users::ActiveModel = user.into();
    user.nickname = Set(nickname);
    user.updated_at = Set(Utc::now().into());
    Ok(user.update(db).await?)
}

/// Make sure the configured admin account exists and carries admin rights.
/// An existing account keeps its password.
pub async fn ensure_admin(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<users::Model, AppError> {
    let existing = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await?;

    if let Some(user) = existing {
        if user.is_admin {
            return Ok(user);
        }
        let mut user: users::ActiveModel = user.into();
        user.is_admin = Set(true);
        user.updated_at = Set(Utc::now().into());
        let user = user.update(db).await?;
        info!(user_id = %user.id, "existing account promoted to admin");
        return Ok(user);
    }

    let password_hash = hash_password(password.to_string(), bcrypt_cost).await?;
    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        password_hash: Set(password_hash),
        nickname: Set(username.to_string()),
        is_admin: Set(true),
        is_registered: Set(false),
        space: Set(0),
        used_space: Set(0),
        club_id: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    info!(user_id = %user.id, "admin account created");
    Ok(user)
}

#[post("/auth/register")]
pub async fn register_handler(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    let registration = Registration::from_request(body.into_inner())?;
    let (user, token) = register(&db, &config, registration).await?;
    Ok(HttpResponse::Created().json(json!({ "token": token, "user": user })))
}

#[post("/auth/login")]
pub async fn login_handler(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    let LoginRequest { username, password } = body.into_inner();
    let (user, token) = login(&db, &config, &username, password).await?;
    Ok(HttpResponse::Ok().json(json!({ "token": token, "user": user })))
}

#[get("/me")]
pub async fn me(user: AuthUser) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(user.0))
}

#[put("/me")]
pub async fn update_me(
    user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let user = update_profile(&db, user.0.id, body.into_inner().nickname).await?;
    Ok(HttpResponse::Ok().json(user))
}
