use serde::{Deserialize, Serialize};

pub mod lap_info;
pub mod placement;

// Racers are indexed by their slot in the session roster
pub type RacerID = usize;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RacerKind {
    Human,
    Ai,
}

impl RacerKind {
    pub fn is_human(&self) -> bool {
        matches!(self, RacerKind::Human)
    }
}
