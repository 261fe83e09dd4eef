//! Admin-recorded auctions for the auction pool

pub mod orchestration;
pub mod pricing;

use actix_web::{delete, get, post, web, HttpResponse, Result as ActixResult};
use sea_orm::DatabaseConnection;
use serde_json::json;
use uuid::Uuid;

use crate::dto::auction_request::AssignAuctionRequest;
use crate::jwt::AdminUser;

#[get("/auction/pool")]
pub async fn auction_pool(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let generals = orchestration::auction_pool(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(generals))
}

#[get("/auction/results")]
pub async fn auction_results(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let results = orchestration::auction_results(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(results))
}

#[get("/auction/stats")]
pub async fn auction_stats(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let stats = orchestration::auction_stats(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[post("/admin/auction/assign")]
pub async fn assign_auction(
    _admin: AdminUser,
    body: web::Json<AssignAuctionRequest>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let record = orchestration::assign_auction(&db, body.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Auction recorded", "record": record })))
}

#[delete("/admin/auction/general/{general_id}")]
pub async fn reset_auction_by_general(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    orchestration::reset_auction_by_general(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Auction reset" })))
}

#[delete("/admin/auction/{record_id}")]
pub async fn reset_auction(
    _admin: AdminUser,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    orchestration::reset_auction(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Auction reset" })))
}
