//! Ranking module
//!
//! Pure logic for the sealed-bid club auction: bid ranking, turn order,
//! deadlines and the auto-assignment choice made when a selector times out.

use std::collections::HashSet;

use chrono::{DateTime, Duration, FixedOffset};
use uuid::Uuid;

use crate::error::AppError;

pub const MIN_TIMEOUT_MINUTES: i32 = 5;
pub const MAX_TIMEOUT_MINUTES: i32 = 60;
pub const DEFAULT_TIMEOUT_MINUTES: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidEntry {
    pub user_id: Uuid,
    pub amount: i32,
    pub created_at: DateTime<FixedOffset>,
}

/// Rank bids from 1..=N
///
/// This function is PURE. Higher amounts rank first; equal amounts are
/// ordered by who bid first, then by user id so the order is total.
pub fn rank_bids(bids: &[BidEntry]) -> Vec<(Uuid, i32)> {
    let mut ordered: Vec<&BidEntry> = bids.iter().collect();
    ordered.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, bid)| (bid.user_id, i as i32 + 1))
        .collect()
}

/// First user in rank order who has not selected yet
///
/// This function is PURE.
pub fn next_selector(ranked: &[Uuid], selected: &HashSet<Uuid>) -> Option<Uuid> {
    ranked.iter().find(|id| !selected.contains(id)).copied()
}

/// Club given to a selector who ran out of time
///
/// This function is PURE. The selector's preferences are tried in priority
/// order; if none is free the lowest club id still free is used.
pub fn choose_auto_club(
    preferences: &[i32],
    club_ids: &[i32],
    taken: &HashSet<i32>,
) -> Option<i32> {
    preferences
        .iter()
        .find(|id| !taken.contains(id) && club_ids.contains(id))
        .copied()
        .or_else(|| {
            club_ids
                .iter()
                .filter(|id| !taken.contains(id))
                .min()
                .copied()
        })
}

/// This function is PURE.
pub fn validate_timeout(minutes: i32) -> Result<(), AppError> {
    if (MIN_TIMEOUT_MINUTES..=MAX_TIMEOUT_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(AppError::InvalidTimeout {
            min: MIN_TIMEOUT_MINUTES,
            max: MAX_TIMEOUT_MINUTES,
        })
    }
}

/// Deadline for the next selector. The clock never starts before the
/// scheduled start of the selection.
///
/// This function is PURE.
pub fn next_deadline(
    now: DateTime<FixedOffset>,
    start_time: Option<DateTime<FixedOffset>>,
    timeout_minutes: i32,
) -> DateTime<FixedOffset> {
    let base = match start_time {
        Some(start) if start > now => start,
        _ => now,
    };
    base + Duration::minutes(i64::from(timeout_minutes))
}

/// This function is PURE.
pub fn is_timed_out(
    now: DateTime<FixedOffset>,
    start_time: Option<DateTime<FixedOffset>>,
    deadline: Option<DateTime<FixedOffset>>,
) -> bool {
    let started = start_time.map_or(true, |start| now >= start);
    started && deadline.is_some_and(|deadline| now > deadline)
}
