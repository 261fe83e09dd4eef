pub mod allocation;
pub mod assets;
pub mod auction;
pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod entity;
pub mod error;
pub mod invite_management;
pub mod jwt;
pub mod policy;
pub mod season;
pub mod test_support;
pub mod trading;
pub mod user_management;

pub use bootstrap::{connect_and_migrate, init_tracing, load_dotenv, prepare_state};
pub use config::AppConfig;
pub use error::AppError;

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde_json::json;

use jwt::JwtAuth;

/// Request bodies may carry a full catalog import
const JSON_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(health)
        .service(
            web::scope("/api")
                .wrap(JwtAuth::new())
                // accounts
                .service(user_management::register_handler)
                .service(user_management::login_handler)
                .service(user_management::me)
                .service(user_management::update_me)
                // season
                .service(season::current_phase)
                .service(season::set_phase)
                .service(season::reset_season)
                .service(season::signup)
                .service(season::players)
                // catalog
                .service(assets::list_generals)
                .service(assets::get_general)
                .service(assets::list_treasures)
                .service(assets::get_treasure)
                .service(assets::list_clubs)
                .service(assets::club_leagues)
                .service(assets::club_tags)
                .service(assets::get_club)
                .service(assets::list_cities)
                .service(assets::list_rules)
                .service(assets::statistics)
                .service(assets::my_roster)
                .service(assets::player_roster)
                .service(assets::import_catalog)
                // draw and draft
                .service(allocation::draw_next)
                .service(allocation::draw_guarantee)
                .service(allocation::draw_normal)
                .service(allocation::my_draw_status)
                .service(allocation::my_draw_history)
                .service(allocation::pool_listing)
                .service(allocation::draw_results)
                .service(allocation::draft_pool)
                .service(allocation::draft_pick)
                .service(allocation::my_draft_history)
                .service(allocation::admin_draw_for_user)
                .service(allocation::admin_draw_for_all)
                .service(allocation::admin_reset_user_draws)
                .service(allocation::admin_reset_all_draws)
                // club policy
                .service(policy::policy_status)
                .service(policy::policy_selections)
                .service(policy::my_policy)
                .service(policy::place_bid)
                .service(policy::set_preferences)
                .service(policy::select_club)
                .service(policy::admin_policy_bids)
                .service(policy::admin_close_bidding)
                .service(policy::admin_start_selection)
                .service(policy::admin_check_timeout)
                .service(policy::admin_force_next)
                .service(policy::admin_select_for_user)
                .service(policy::admin_reset_policy)
                .service(policy::admin_reset_user_selection)
                // trades
                .service(trading::create_trade)
                .service(trading::pending_trades)
                .service(trading::trade_history)
                .service(trading::trade_detail)
                .service(trading::accept_trade)
                .service(trading::reject_trade)
                .service(trading::cancel_trade)
                .service(trading::all_trades)
                // auction
                .service(auction::auction_pool)
                .service(auction::auction_results)
                .service(auction::auction_stats)
                .service(auction::assign_auction)
                .service(auction::reset_auction_by_general)
                .service(auction::reset_auction)
                // invite codes
                .service(invite_management::generate_invite_codes)
                .service(invite_management::list_invite_codes)
                .service(invite_management::invite_code_stats)
                .service(invite_management::list_invite_code_usages)
                .service(invite_management::delete_invite_code),
        );
}

#[actix_web::get("/health")]
async fn health() -> impl actix_web::Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            AppError::InvalidRequest(format!("invalid JSON body: {err}")).into()
        })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("invalid path parameter: {err}")).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::InvalidRequest(format!("invalid query string: {err}")).into()
    })
}
