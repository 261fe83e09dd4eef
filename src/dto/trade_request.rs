use serde::Deserialize;
use uuid::Uuid;

use crate::trading::settlement::TradeTerms;

#[derive(Debug, Deserialize)]
pub struct CreateTradeRequest {
    pub receiver_id: Uuid,
    #[serde(default)]
    pub offer_generals: Vec<i32>,
    #[serde(default)]
    pub offer_treasures: Vec<i32>,
    #[serde(default)]
    pub offer_space: i32,
    #[serde(default)]
    pub request_generals: Vec<i32>,
    #[serde(default)]
    pub request_treasures: Vec<i32>,
    #[serde(default)]
    pub request_space: i32,
    #[serde(default)]
    pub message: String,
}

impl CreateTradeRequest {
    pub fn into_parts(self) -> (Uuid, TradeTerms, String) {
        let terms = TradeTerms {
            offer_generals: self.offer_generals,
            offer_treasures: self.offer_treasures,
            offer_space: self.offer_space,
            request_generals: self.request_generals,
            request_treasures: self.request_treasures,
            request_space: self.request_space,
        };
        (self.receiver_id, terms, self.message)
    }
}
