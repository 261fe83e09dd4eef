//! Season lifecycle
//!
//! The global phase record, player signup and the admin season reset.

pub mod orchestration;
pub mod phase;

use actix_web::{get, post, web, HttpResponse, Result as ActixResult};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::config::AppConfig;
use crate::dto::phase_request::SetPhaseRequest;
use crate::jwt::{AdminUser, AuthUser};

#[get("/phase")]
pub async fn current_phase(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let state = phase::load(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(state))
}

#[post("/admin/phase")]
pub async fn set_phase(
    _admin: AdminUser,
    body: web::Json<SetPhaseRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    let state = orchestration::set_phase(&db, &config.rules, body.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(state))
}

#[post("/admin/reset-season")]
pub async fn reset_season(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    let state = orchestration::reset_season(&db, &config.rules).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Season reset", "phase": state })))
}

#[post("/signup")]
pub async fn signup(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    let user = orchestration::signup(&db, &config.rules, user.0.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Signed up", "user": user })))
}

#[get("/players")]
pub async fn players(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let players = orchestration::registered_players(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(players))
}
