use serde::Deserialize;
use uuid::Uuid;

use crate::auction::orchestration::AssignAuction;

/// `user_id: null` records the general as unsold. Leaving `price` out charges
/// the general's salary.
#[derive(Debug, Deserialize)]
pub struct AssignAuctionRequest {
    pub general_id: i32,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub price: Option<i32>,
    #[serde(default)]
    pub remark: String,
}

impl From<AssignAuctionRequest> for AssignAuction {
    fn from(req: AssignAuctionRequest) -> Self {
        AssignAuction {
            general_id: req.general_id,
            winner: req.user_id,
            price: req.price,
            remark: req.remark,
        }
    }
}
