//! Draw quota module
//!
//! Pure quota bookkeeping for the draw phase: how many draws of each type a
//! player has left and which pool the next draw comes from.

use rand::Rng;
use serde::Serialize;

use crate::config::GameRules;
use crate::entity::draw_records::DrawType;
use crate::error::AppError;

/// Per-player draw progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawStatus {
    pub guarantee_done: u32,
    pub guarantee_remaining: u32,
    pub normal_done: u32,
    pub normal_remaining: u32,
}

impl DrawStatus {
    /// This function is PURE - counts above the quota clamp to zero remaining.
    pub fn from_counts(rules: &GameRules, guarantee_done: u32, normal_done: u32) -> Self {
        Self {
            guarantee_done,
            guarantee_remaining: rules.guarantee_draws.saturating_sub(guarantee_done),
            normal_done,
            normal_remaining: rules.normal_draws.saturating_sub(normal_done),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.guarantee_remaining == 0 && self.normal_remaining == 0
    }
}

/// Which kind of draw the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    /// Next draw in quota order
    Auto,
    Only(DrawType),
}

/// Decide the type of the next draw
///
/// This function is PURE. Guarantee draws are always used up before any
/// normal draw is allowed.
pub fn next_draw_type(status: &DrawStatus, mode: DrawMode) -> Result<DrawType, AppError> {
    match mode {
        DrawMode::Auto => {
            if status.guarantee_remaining > 0 {
                Ok(DrawType::Guarantee)
            } else if status.normal_remaining > 0 {
                Ok(DrawType::Normal)
            } else {
                Err(AppError::DrawLimitReached)
            }
        }
        DrawMode::Only(DrawType::Guarantee) => {
            if status.guarantee_remaining > 0 {
                Ok(DrawType::Guarantee)
            } else {
                Err(AppError::DrawLimitReached)
            }
        }
        DrawMode::Only(DrawType::Normal) => {
            if status.guarantee_remaining > 0 {
                Err(AppError::GuaranteeDrawsPending)
            } else if status.normal_remaining > 0 {
                Ok(DrawType::Normal)
            } else {
                Err(AppError::DrawLimitReached)
            }
        }
    }
}

/// Pick one element uniformly at random
///
/// This function is PURE given the rng state.
pub fn pick_uniform<'a, T, R: Rng + ?Sized>(pool: &'a [T], rng: &mut R) -> Option<&'a T> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..pool.len());
    pool.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn status(guarantee_done: u32, normal_done: u32) -> DrawStatus {
        DrawStatus::from_counts(&GameRules::default(), guarantee_done, normal_done)
    }

    #[test]
    fn test_status_counts_remaining() {
        let s = status(2, 0);
        assert_eq!(s.guarantee_remaining, 1);
        assert_eq!(s.normal_remaining, 7);
        assert!(!s.is_complete());
        assert!(status(3, 7).is_complete());
    }

    #[test]
    fn test_status_clamps_overdraw() {
        let s = status(5, 9);
        assert_eq!(s.guarantee_remaining, 0);
        assert_eq!(s.normal_remaining, 0);
    }

    #[test]
    fn test_auto_prefers_guarantee() {
        assert_eq!(
            next_draw_type(&status(0, 0), DrawMode::Auto).unwrap(),
            DrawType::Guarantee
        );
        assert_eq!(
            next_draw_type(&status(3, 0), DrawMode::Auto).unwrap(),
            DrawType::Normal
        );
    }

    #[test]
    fn test_auto_stops_at_limit() {
        assert!(matches!(
            next_draw_type(&status(3, 7), DrawMode::Auto),
            Err(AppError::DrawLimitReached)
        ));
    }

    #[test]
    fn test_explicit_normal_waits_for_guarantee() {
        assert!(matches!(
            next_draw_type(&status(1, 0), DrawMode::Only(DrawType::Normal)),
            Err(AppError::GuaranteeDrawsPending)
        ));
        assert_eq!(
            next_draw_type(&status(3, 2), DrawMode::Only(DrawType::Normal)).unwrap(),
            DrawType::Normal
        );
    }

    #[test]
    fn test_explicit_guarantee_exhausted() {
        assert!(matches!(
            next_draw_type(&status(3, 0), DrawMode::Only(DrawType::Guarantee)),
            Err(AppError::DrawLimitReached)
        ));
    }

    #[test]
    fn test_pick_uniform_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let pool: Vec<i32> = Vec::new();
        assert!(pick_uniform(&pool, &mut rng).is_none());
    }

    #[test]
    fn test_pick_uniform_is_seed_deterministic() {
        let pool = vec![10, 20, 30, 40, 50];
        let first = *pick_uniform(&pool, &mut StdRng::seed_from_u64(42)).unwrap();
        let second = *pick_uniform(&pool, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
        assert!(pool.contains(&first));
    }

    #[test]
    fn test_pick_uniform_reaches_every_element() {
        let pool = vec![1, 2, 3];
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(*pick_uniform(&pool, &mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }
}
