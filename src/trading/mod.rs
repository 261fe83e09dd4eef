//! Trade negotiation
//!
//! Registered players propose swaps of generals, treasures and budget space.
//! The receiver accepts or rejects, the proposer may cancel while pending.

pub mod orchestration;
pub mod settlement;

use actix_web::{get, post, web, HttpResponse, Result as ActixResult};
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

use crate::dto::trade_request::CreateTradeRequest;
use crate::jwt::{AdminUser, AuthUser, RegisteredUser};

#[post("/trades")]
pub async fn create_trade(
    user: RegisteredUser,
    body: web::Json<CreateTradeRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let (receiver_id, terms, message) = body.into_inner().into_parts();
    let trade = orchestration::create_trade(&db, user.0.id, receiver_id, terms, message).await?;
    Ok(HttpResponse::Created()
        .content_type("application/json")
        .json(json!({
            "message": "Trade proposed",
            "trade": trade
        })))
}

#[get("/trades/pending")]
pub async fn pending_trades(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let trades = orchestration::pending_trades(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(trades))
}

#[get("/trades/history")]
pub async fn trade_history(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let trades = orchestration::trade_history(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(trades))
}

#[get("/trades/{trade_id}")]
pub async fn trade_detail(
    user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let (trade, logs) =
        orchestration::trade_detail(db.get_ref(), path.into_inner(), &user.0).await?;
    Ok(HttpResponse::Ok().json(json!({ "trade": trade, "logs": logs })))
}

#[post("/trades/{trade_id}/accept")]
pub async fn accept_trade(
    user: RegisteredUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let trade = orchestration::accept_trade(&db, path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Trade accepted", "trade": trade })))
}

#[post("/trades/{trade_id}/reject")]
pub async fn reject_trade(
    user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let trade = orchestration::reject_trade(&db, path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Trade rejected", "trade": trade })))
}

#[post("/trades/{trade_id}/cancel")]
pub async fn cancel_trade(
    user: AuthUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let trade = orchestration::cancel_trade(&db, path.into_inner(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Trade cancelled", "trade": trade })))
}

#[get("/admin/trades")]
pub async fn all_trades(
    _admin: AdminUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let trades = orchestration::all_trades(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(trades))
}
