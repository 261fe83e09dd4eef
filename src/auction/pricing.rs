//! Pricing module
//!
//! Pure rules for admin-assigned auction results.

use serde::Serialize;
use uuid::Uuid;

use crate::entity::auction_records;
use crate::error::AppError;

/// Price charged to the winner of an auction.
///
/// This function is PURE. A missing price defaults to the general's salary;
/// an explicit zero means the general was handed over for free. Unsold
/// generals always record a price of zero.
pub fn settle_price(winner: Option<Uuid>, price: Option<i32>, salary: i32) -> Result<i32, AppError> {
    if price.is_some_and(|p| p < 0) {
        return Err(AppError::InvalidRequest(
            "auction price must not be negative".to_string(),
        ));
    }
    Ok(match winner {
        Some(_) => price.unwrap_or(salary),
        None => 0,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuctionStats {
    pub total: u64,
    pub auctioned: u64,
    pub sold: u64,
    pub unsold: u64,
    pub pending: u64,
    pub total_price: i64,
}

impl AuctionStats {
    /// This function is PURE.
    pub fn tally(pool_size: u64, records: &[auction_records::Model]) -> Self {
        let mut stats = AuctionStats {
            total: pool_size,
            ..Default::default()
        };
        for record in records {
            stats.auctioned += 1;
            if record.user_id.is_some() {
                stats.sold += 1;
                stats.total_price += i64::from(record.price);
            }
            if record.is_unsold {
                stats.unsold += 1;
            }
        }
        stats.pending = stats.total.saturating_sub(stats.auctioned);
        stats
    }
}
