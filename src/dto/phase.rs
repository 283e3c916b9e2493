use serde::Serialize;
use utoipa::ToSchema;

use crate::state::round::RoundPhase;

/// Publicly visible round phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Intermission before the next join window opens.
    Waiting,
    /// Join window is open, players may enter.
    Joinable,
    /// A question is live.
    InProgress,
    /// Round over, leaderboard on display.
    Finished,
}

impl From<&RoundPhase> for VisiblePhase {
    fn from(value: &RoundPhase) -> Self {
        match value {
            RoundPhase::Waiting { .. } => VisiblePhase::Waiting,
            RoundPhase::Joinable { .. } => VisiblePhase::Joinable,
            RoundPhase::InProgress(_) => VisiblePhase::InProgress,
            RoundPhase::Finished { .. } => VisiblePhase::Finished,
        }
    }
}
