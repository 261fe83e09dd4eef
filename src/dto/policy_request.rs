use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PlaceBidRequest {
    pub amount: i32,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesRequest {
    pub club_ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SelectClubRequest {
    pub club_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct StartSelectionRequest {
    /// Defaults to now
    pub start_time: Option<DateTime<FixedOffset>>,
    pub timeout_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AdminSelectRequest {
    pub user_id: Uuid,
    pub club_id: i32,
}
