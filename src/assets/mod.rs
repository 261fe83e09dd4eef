//! Asset catalog
//!
//! Generals, treasures, clubs, cities and rules, the ledger that moves them
//! between players, and the admin import that loads them.

pub mod catalog;
pub mod import;
pub mod ledger;

use actix_web::{get, post, web, HttpResponse, Result as ActixResult};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::dto::catalog_query::{ClubQuery, GeneralQuery};
use crate::dto::import_payload::ImportPayload;
use crate::jwt::{AdminUser, AuthUser};

#[get("/generals")]
pub async fn list_generals(
    query: web::Query<GeneralQuery>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let generals = catalog::list_generals(db.get_ref(), query.pool).await?;
    Ok(HttpResponse::Ok().json(generals))
}

#[get("/generals/{general_id}")]
pub async fn get_general(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let general = catalog::get_general(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(general))
}

#[get("/treasures")]
pub async fn list_treasures(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let treasures = catalog::list_treasures(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(treasures))
}

#[get("/treasures/{treasure_id}")]
pub async fn get_treasure(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let treasure = catalog::get_treasure(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(treasure))
}

#[get("/clubs")]
pub async fn list_clubs(
    query: web::Query<ClubQuery>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let filter = query.into_inner().into();
    let clubs = catalog::list_clubs(db.get_ref(), &filter).await?;
    Ok(HttpResponse::Ok().json(clubs))
}

#[get("/clubs/leagues")]
pub async fn club_leagues(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let leagues = catalog::leagues(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(leagues))
}

#[get("/clubs/tags")]
pub async fn club_tags(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let tags = catalog::tags(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(tags))
}

#[get("/clubs/{club_id}")]
pub async fn get_club(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let club = catalog::get_club(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(club))
}

#[get("/cities")]
pub async fn list_cities(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let cities = catalog::list_cities(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(cities))
}

#[get("/rules")]
pub async fn list_rules(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let rules = catalog::list_rules(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(rules))
}

#[get("/statistics")]
pub async fn statistics(db: web::Data<DatabaseConnection>) -> ActixResult<HttpResponse> {
    let stats = catalog::statistics(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/me/roster")]
pub async fn my_roster(
    user: AuthUser,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let roster = catalog::roster(db.get_ref(), user.0.id).await?;
    Ok(HttpResponse::Ok().json(roster))
}

#[get("/players/{user_id}/roster")]
pub async fn player_roster(
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let roster = catalog::roster(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(roster))
}

#[post("/admin/import")]
pub async fn import_catalog(
    _admin: AdminUser,
    body: web::Json<ImportPayload>,
    db: web::Data<DatabaseConnection>,
) -> ActixResult<HttpResponse> {
    let report = import::import_catalog(&db, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(report))
}
