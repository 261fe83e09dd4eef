//! Request and response bodies for the HTTP layer

pub mod auction_request;
pub mod auth_request;
pub mod catalog_query;
pub mod draw_request;
pub mod import_payload;
pub mod invite_request;
pub mod phase_request;
pub mod policy_request;
pub mod trade_request;
pub mod trade_view;
