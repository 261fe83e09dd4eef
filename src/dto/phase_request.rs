use serde::Deserialize;
use uuid::Uuid;

use crate::entity::game_phase::Phase;
use crate::season::phase::PhaseUpdate;

#[derive(Debug, Deserialize)]
pub struct SetPhaseRequest {
    pub phase: Phase,
    #[serde(default)]
    pub round_number: Option<i32>,
    #[serde(default)]
    pub draft_round: Option<i32>,
    #[serde(default)]
    pub draft_order: Option<Vec<Uuid>>,
}

impl From<SetPhaseRequest> for PhaseUpdate {
    fn from(req: SetPhaseRequest) -> Self {
        PhaseUpdate {
            phase: req.phase,
            round_number: req.round_number,
            draft_round: req.draft_round,
            draft_order: req.draft_order,
        }
    }
}
