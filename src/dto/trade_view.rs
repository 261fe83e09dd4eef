use serde::Serialize;

use crate::entity::trade_items::{self, AssetKind, TradeSide};
use crate::entity::trades;

/// A trade with its item rows folded back into per-side id lists
#[derive(Debug, Clone, Serialize)]
pub struct TradeView {
    #[serde(flatten)]
    pub trade: trades::Model,
    pub offer_generals: Vec<i32>,
    pub offer_treasures: Vec<i32>,
    pub request_generals: Vec<i32>,
    pub request_treasures: Vec<i32>,
}

impl TradeView {
    pub fn from_parts(trade: trades::Model, mut items: Vec<trade_items::Model>) -> Self {
        items.sort_by_key(|item| item.position);

        let mut view = TradeView {
            trade,
            offer_generals: Vec::new(),
            offer_treasures: Vec::new(),
            request_generals: Vec::new(),
            request_treasures: Vec::new(),
        };
        for item in items {
            let list = match (item.side, item.asset_kind) {
                (TradeSide::Offer, AssetKind::General) => &mut view.offer_generals,
                (TradeSide::Offer, AssetKind::Treasure) => &mut view.offer_treasures,
                (TradeSide::Request, AssetKind::General) => &mut view.request_generals,
                (TradeSide::Request, AssetKind::Treasure) => &mut view.request_treasures,
            };
            list.push(item.asset_id);
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::trades::TradeStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(side: TradeSide, asset_kind: AssetKind, asset_id: i32, position: i32) -> trade_items::Model {
        trade_items::Model {
            id: Uuid::new_v4(),
            trade_id: Uuid::nil(),
            side,
            asset_kind,
            asset_id,
            position,
        }
    }

    #[test]
    fn test_items_fold_into_ordered_lists() {
        let now = Utc::now().into();
        let trade = trades::Model {
            id: Uuid::nil(),
            proposer_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            offer_space: 0,
            request_space: 5,
            status: TradeStatus::Pending,
            message: String::new(),
            created_at: now,
            updated_at: now,
        };
        let view = TradeView::from_parts(
            trade,
            vec![
                item(TradeSide::Offer, AssetKind::General, 9, 1),
                item(TradeSide::Request, AssetKind::Treasure, 4, 2),
                item(TradeSide::Offer, AssetKind::General, 7, 0),
            ],
        );
        assert_eq!(view.offer_generals, vec![7, 9]);
        assert_eq!(view.request_treasures, vec![4]);
        assert!(view.offer_treasures.is_empty());
        assert!(view.request_generals.is_empty());
    }
}
