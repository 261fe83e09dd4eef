pub mod auction_records;
pub mod cities;
pub mod club_policies;
pub mod clubs;
pub mod draft_records;
pub mod draw_records;
pub mod game_phase;
pub mod game_rules;
pub mod generals;
pub mod invite_code_usages;
pub mod invite_codes;
pub mod policy_bids;
pub mod policy_phase_config;
pub mod policy_preferences;
pub mod policy_selections;
pub mod trade_items;
pub mod trade_logs;
pub mod trades;
pub mod treasures;
pub mod users;

pub use auction_records::Entity as AuctionRecords;
pub use clubs::Entity as Clubs;
pub use generals::Entity as Generals;
pub use trades::Entity as Trades;
pub use treasures::Entity as Treasures;
pub use users::Entity as Users;
