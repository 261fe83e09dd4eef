//! Draw and draft allocation
//!
//! Random draws from the guarantee and normal pools during the draw phase,
//! explicit picks from the draft pool during the draft phase, and the admin
//! tools that draw for players or undo their draws.

pub mod orchestration;
pub mod quota;

use actix_web::{get, post, web, HttpResponse, Result as ActixResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::dto::draw_request::DraftPickRequest;
use crate::entity::draw_records::DrawType;
use crate::entity::generals::PoolType;
use crate::jwt::{AdminUser, AuthUser};
use quota::DrawMode;

async fn run_draw(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    mode: DrawMode,
) -> ActixResult<HttpResponse> {
    let mut rng = StdRng::from_entropy();
    let outcome =
        orchestration::draw(&db, &config.rules, user.0.id, mode, &mut rng).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .json(json!({
            "general": outcome.general,
            "draw_type": outcome.draw_type,
            "status": outcome.status,
        })))
}

#[post("/draw")]
pub async fn draw_next(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    run_draw(user, db, config, DrawMode::Auto).await
}

#[post("/draw/guarantee")]
pub async fn draw_guarantee(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    run_draw(user, db, config, DrawMode::Only(DrawType::Guarantee)).await
}

#[post("/draw/normal")]
pub async fn draw_normal(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    run_draw(user, db, config, DrawMode::Only(DrawType::Normal)).await
}

#[get("/draw/status")]
pub async fn my_draw_status(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    let status = orchestration::draw_status(db.get_ref(), &config.rules, user.0.id).await?;
    Ok(HttpResponse::Ok().json(status))
}

#[get("/draw/history")]
pub async fn my_draw_history(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let history = orchestration::user_draws(db.get_ref(), user.0.id).await?;
    let entries: Vec<_> = history
        .into_iter()
        .map(|(record, general)| json!({ "record": record, "general": general }))
        .collect();
    Ok(HttpResponse::Ok().json(entries))
}

#[get("/draw/pool/{pool_type}")]
pub async fn pool_listing(
    path: web::Path<PoolType>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let generals = orchestration::available_pool(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(generals))
}

#[get("/draw/results")]
pub async fn draw_results(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let results = orchestration::draw_results(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(results))
}

#[get("/draft/pool")]
pub async fn draft_pool(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let generals = orchestration::available_pool(db.get_ref(), PoolType::Draft).await?;
    Ok(HttpResponse::Ok().json(generals))
}

#[post("/draft/pick")]
pub async fn draft_pick(
    user: AuthUser,
    body: web::Json<DraftPickRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let outcome = orchestration::draft_pick(&db, user.0.id, body.general_id).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .json(json!({
            "general": outcome.general,
            "round": outcome.record.round,
            "pick": outcome.record.pick,
        })))
}

#[get("/draft/history")]
pub async fn my_draft_history(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let history = orchestration::user_drafts(db.get_ref(), user.0.id).await?;
    let entries: Vec<_> = history
        .into_iter()
        .map(|(record, general)| json!({ "record": record, "general": general }))
        .collect();
    Ok(HttpResponse::Ok().json(entries))
}

#[post("/admin/draw/users/{user_id}")]
pub async fn admin_draw_for_user(
    _admin: AdminUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    let mut rng = StdRng::from_entropy();
    let report =
        orchestration::draw_for_user(&db, &config.rules, path.into_inner(), &mut rng).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("/admin/draw/all")]
pub async fn admin_draw_for_all(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> ActixResult<HttpResponse> {
    let mut rng = StdRng::from_entropy();
    let reports = orchestration::draw_for_all_users(&db, &config.rules, &mut rng).await?;
    Ok(HttpResponse::Ok().json(reports))
}

#[post("/admin/draw/users/{user_id}/reset")]
pub async fn admin_reset_user_draws(
    _admin: AdminUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let report = orchestration::reset_user_draws(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}

#[post("/admin/draw/reset")]
pub async fn admin_reset_all_draws(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let reports = orchestration::reset_all_draws(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "reset": reports })))
}
