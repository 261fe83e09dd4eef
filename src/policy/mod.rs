//! Policy (club) auction
//!
//! Players place sealed bids of budget space for the right to choose a club.
//! Once bidding closes, players pick clubs one at a time in rank order; a
//! player who misses their deadline gets a club assigned automatically.

pub mod orchestration;
pub mod ranking;

use actix_web::{get, post, put, web, HttpResponse, Result as ActixResult};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

use crate::dto::policy_request::{
    AdminSelectRequest, PlaceBidRequest, PreferencesRequest, SelectClubRequest,
    StartSelectionRequest,
};
use crate::jwt::{AdminUser, AuthUser};

#[get("/policy/status")]
pub async fn policy_status(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let view = orchestration::status(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[get("/policy/selections")]
pub async fn policy_selections(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let selections = orchestration::all_selections(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(selections))
}

#[get("/policy/me")]
pub async fn my_policy(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let policy = orchestration::player_policy(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(policy))
}

#[post("/policy/bid")]
pub async fn place_bid(
    user: AuthUser,
    body: web::Json<PlaceBidRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let bid = orchestration::place_bid(&db, user.0.id, body.amount).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .json(json!({
            "message": "Bid placed",
            "bid": bid
        })))
}

#[put("/policy/preferences")]
pub async fn set_preferences(
    user: AuthUser,
    body: web::Json<PreferencesRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let preferences =
        orchestration::set_preferences(&db, user.0.id, body.into_inner().club_ids).await?;
    Ok(HttpResponse::Ok().json(preferences))
}

#[post("/policy/select")]
pub async fn select_club(
    user: AuthUser,
    body: web::Json<SelectClubRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let selection =
        orchestration::select_club(&db, user.0.id, body.club_id, Utc::now().into()).await?;
    Ok(HttpResponse::Ok().json(selection))
}

#[get("/admin/policy/bids")]
pub async fn admin_policy_bids(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let bids = orchestration::all_bids(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(bids))
}

#[post("/admin/policy/close-bidding")]
pub async fn admin_close_bidding(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let ranked = orchestration::close_bidding(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "ranked": ranked })))
}

#[post("/admin/policy/start-selection")]
pub async fn admin_start_selection(
    _admin: AdminUser,
    body: web::Json<StartSelectionRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let start_time = body.start_time.unwrap_or_else(|| Utc::now().into());
    let timeout = body
        .timeout_minutes
        .unwrap_or(ranking::DEFAULT_TIMEOUT_MINUTES);
    let config = orchestration::start_selection(&db, start_time, timeout).await?;
    Ok(HttpResponse::Ok().json(config))
}

#[post("/admin/policy/check-timeout")]
pub async fn admin_check_timeout(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let assigned = orchestration::check_and_handle_timeout(&db, Utc::now().into()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "timed_out": assigned.is_some(),
        "selection": assigned
    })))
}

#[post("/admin/policy/force-next")]
pub async fn admin_force_next(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let selection = orchestration::force_next(&db, Utc::now().into()).await?;
    Ok(HttpResponse::Ok().json(selection))
}

#[post("/admin/policy/select")]
pub async fn admin_select_for_user(
    _admin: AdminUser,
    body: web::Json<AdminSelectRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let selection =
        orchestration::select_for_user(&db, body.user_id, body.club_id, Utc::now().into())
            .await?;
    Ok(HttpResponse::Ok().json(selection))
}

#[post("/admin/policy/reset")]
pub async fn admin_reset_policy(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    orchestration::reset_policy_phase(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Policy phase reset" })))
}

#[post("/admin/policy/reset/{user_id}")]
pub async fn admin_reset_user_selection(
    _admin: AdminUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    orchestration::reset_user_selection(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Selection reset" })))
}
