//! Season phase record
//!
//! The phase row is the only global state gating player actions. It is
//! created on first access and every write goes through [`write`], which
//! bumps the record version.

use chrono::Utc;
use sea_orm::sea_query::{LockType, OnConflict};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QuerySelect, Set};
use tracing::info;
use uuid::Uuid;

use crate::entity::game_phase::{self, DraftOrder, Phase};
use crate::error::AppError;

const STATE_ROW: i32 = 1;

/// Absolute update applied by the admin. Fields left as `None` keep their value.
#[derive(Debug, Clone)]
pub struct PhaseUpdate {
    pub phase: Phase,
    pub round_number: Option<i32>,
    pub draft_round: Option<i32>,
    pub draft_order: Option<Vec<Uuid>>,
}

impl PhaseUpdate {
    /// State of a freshly reset season
    pub fn initial() -> Self {
        Self {
            phase: Phase::Signup,
            round_number: Some(1),
            draft_round: Some(0),
            draft_order: Some(Vec::new()),
        }
    }
}

/// Read the phase record, creating the default one if it does not exist yet
pub async fn load<C: ConnectionTrait>(conn: &C) -> Result<game_phase::Model, AppError> {
    if let Some(state) = game_phase::Entity::find_by_id(STATE_ROW).one(conn).await? {
        return Ok(state);
    }

    let initial = game_phase::ActiveModel {
        id: Set(STATE_ROW),
        current_phase: Set(Phase::Signup),
        round_number: Set(1),
        draft_round: Set(0),
        draft_order: Set(DraftOrder::default()),
        version: Set(0),
        updated_at: Set(Utc::now().into()),
    };
    game_phase::Entity::insert(initial)
        .on_conflict(
            OnConflict::column(game_phase::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    game_phase::Entity::find_by_id(STATE_ROW)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::Internal("game phase record missing after init".to_string()))
}

/// Read the phase record with a row lock, for use inside a transaction
pub async fn load_for_update<C: ConnectionTrait>(
    conn: &C,
) -> Result<game_phase::Model, AppError> {
    match game_phase::Entity::find_by_id(STATE_ROW)
        .lock(LockType::Update)
        .one(conn)
        .await?
    {
        Some(state) => Ok(state),
        None => load(conn).await,
    }
}

/// Fail unless the season is currently in `required`
pub fn ensure(state: &game_phase::Model, required: Phase) -> Result<(), AppError> {
    if state.current_phase == required {
        Ok(())
    } else {
        Err(AppError::wrong_phase(required.as_str(), state.current_phase))
    }
}

/// Apply an update to the phase record
pub async fn write<C: ConnectionTrait>(
    conn: &C,
    update: PhaseUpdate,
) -> Result<game_phase::Model, AppError> {
    let current = load_for_update(conn).await?;
    let previous = current.current_phase;
    let version = current.version;

    let mut state: game_phase::ActiveModel = current.into();
    state.current_phase = Set(update.phase);
    if let Some(round_number) = update.round_number {
        state.round_number = Set(round_number);
    }
    if let Some(draft_round) = update.draft_round {
        state.draft_round = Set(draft_round);
    }
    if let Some(order) = update.draft_order {
        state.draft_order = Set(DraftOrder(order));
    }
    state.version = Set(version + 1);
    state.updated_at = Set(Utc::now().into());

    let updated = state.update(conn).await?;
    info!(
        from = %previous,
        to = %updated.current_phase,
        version = updated.version,
        "game phase updated"
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(phase: Phase) -> game_phase::Model {
        game_phase::Model {
            id: STATE_ROW,
            current_phase: phase,
            round_number: 1,
            draft_round: 0,
            draft_order: DraftOrder::default(),
            version: 0,
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_ensure_accepts_matching_phase() {
        assert!(ensure(&state(Phase::Draw), Phase::Draw).is_ok());
    }

    #[test]
    fn test_ensure_rejects_other_phase() {
        let err = ensure(&state(Phase::Signup), Phase::Draft).unwrap_err();
        assert!(matches!(
            err,
            AppError::WrongPhase { required: "draft", ref current } if current == "signup"
        ));
    }

    #[test]
    fn test_trade_proposals_allowed_in_draft_and_trading() {
        assert!(Phase::Trading.allows_trade_proposals());
        assert!(Phase::Draft.allows_trade_proposals());
        assert!(!Phase::Draw.allows_trade_proposals());
        assert!(!Phase::Policy.allows_trade_proposals());
    }
}
