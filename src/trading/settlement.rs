//! Settlement module
//!
//! Pure validation of trade terms and the budget arithmetic applied when a
//! trade executes.

use std::collections::HashSet;

use crate::error::AppError;

/// What each side puts on the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeTerms {
    pub offer_generals: Vec<i32>,
    pub offer_treasures: Vec<i32>,
    pub offer_space: i32,
    pub request_generals: Vec<i32>,
    pub request_treasures: Vec<i32>,
    pub request_space: i32,
}

impl TradeTerms {
    pub fn is_empty(&self) -> bool {
        self.offer_generals.is_empty()
            && self.offer_treasures.is_empty()
            && self.request_generals.is_empty()
            && self.request_treasures.is_empty()
            && self.offer_space == 0
            && self.request_space == 0
    }
}

/// This function is PURE.
pub fn validate_terms(terms: &TradeTerms) -> Result<(), AppError> {
    if terms.offer_space < 0 || terms.request_space < 0 {
        return Err(AppError::InvalidRequest(
            "space amounts must not be negative".to_string(),
        ));
    }
    if terms.is_empty() {
        return Err(AppError::InvalidRequest("trade moves nothing".to_string()));
    }

    for list in [
        &terms.offer_generals,
        &terms.offer_treasures,
        &terms.request_generals,
        &terms.request_treasures,
    ] {
        if has_duplicates(list) {
            return Err(AppError::InvalidRequest(
                "asset listed more than once".to_string(),
            ));
        }
    }
    Ok(())
}

fn has_duplicates(ids: &[i32]) -> bool {
    let mut seen = HashSet::with_capacity(ids.len());
    !ids.iter().all(|id| seen.insert(*id))
}

/// Net change to each party's used space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceDeltas {
    pub proposer: i32,
    pub receiver: i32,
}

/// This function is PURE. Treasures carry no salary and do not appear here.
///
/// The proposer sheds the salaries they give away, takes on the salaries
/// they receive, absorbs `request_space` and is relieved of `offer_space`.
/// The receiver's delta is the exact mirror.
pub fn space_deltas(
    offered_salaries: i32,
    requested_salaries: i32,
    offer_space: i32,
    request_space: i32,
) -> SpaceDeltas {
    let proposer = -offered_salaries + requested_salaries + request_space - offer_space;
    SpaceDeltas {
        proposer,
        receiver: -proposer,
    }
}
