use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::{
        format_system_time,
        phase::VisiblePhase,
        round::{PlayerSummary, PublicQuestion},
    },
    state::round::{AnswerRecord, Player, RoundPhase, RoundState},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (always `public`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Round phase at subscription time, so late subscribers can sync.
    pub phase: VisiblePhase,
    /// Identifier of the round underway at subscription time.
    pub round_id: u64,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the round changes phase or serves a new question.
pub struct PhaseChangedEvent {
    pub round_id: u64,
    pub phase: VisiblePhase,
    /// Seconds the new phase (or question) will last.
    pub countdown: u32,
    /// The question now on display, while `in_progress`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<PublicQuestion>,
    /// 1-based ordinal of the question now on display, while `in_progress`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question_number: Option<u32>,
    pub total_questions: u32,
    /// Final standings, present when entering `finished`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<Vec<PlayerSummary>>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player enters the round for the first time.
pub struct PlayerJoinedEvent {
    pub player: PlayerSummary,
    /// Roster size after the join.
    pub players_joined: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when a player's first answer to a question is recorded.
pub struct PlayerAnsweredEvent {
    pub player: PlayerSummary,
    /// 1-based ordinal of the question that was answered.
    pub question_number: u32,
    /// RFC 3339 timestamp of the submission.
    pub submitted_at: String,
}

impl From<(&Player, &AnswerRecord, u32)> for PlayerAnsweredEvent {
    fn from((player, record, question_number): (&Player, &AnswerRecord, u32)) -> Self {
        Self {
            player: player.into(),
            question_number,
            submitted_at: format_system_time(record.submitted_at),
        }
    }
}

impl From<&RoundState> for PhaseChangedEvent {
    fn from(round: &RoundState) -> Self {
        let (countdown, question, current_question_number, leaderboard) = match &round.phase {
            RoundPhase::Waiting { resume_in } => (*resume_in, None, None, None),
            RoundPhase::Joinable { countdown } => (*countdown, None, None, None),
            RoundPhase::InProgress(active) => (
                active.countdown,
                Some(PublicQuestion::from(&active.question)),
                Some(active.ordinal),
                None,
            ),
            RoundPhase::Finished {
                display_remaining,
                leaderboard,
            } => (
                *display_remaining,
                None,
                None,
                Some(leaderboard.iter().map(Into::into).collect()),
            ),
        };

        Self {
            round_id: round.id,
            phase: VisiblePhase::from(&round.phase),
            countdown,
            question,
            current_question_number,
            total_questions: round.total_questions,
            leaderboard,
        }
    }
}
