use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{phase::VisiblePhase, validation::validate_player_name},
    state::round::{Player, Question, RoundPhase, RoundState},
};

/// Payload used to enter the current round during its join window.
///
/// The join body carries the display name under `name`; only the answer
/// body spells it `player_name`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRequest {
    /// Display name of the joining player. Trimmed before storage.
    pub name: String,
}

impl Validate for JoinRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_name(&self.name) {
            errors.add("name", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Payload carrying a player's answer to the live question.
///
/// `answer` stays optional at the wire level so a missing choice can be
/// reported after the phase and roster checks, in the documented order.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnswerRequest {
    /// Name the player joined under.
    pub player_name: String,
    /// Index of the chosen option.
    #[serde(default)]
    pub answer: Option<usize>,
}

/// Acknowledgement returned when a player enters the round.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    /// Stored (trimmed) player name.
    pub player_name: String,
    /// Whether this name was already part of the roster.
    pub already_joined: bool,
    /// Roster size after the join.
    pub players_joined: usize,
}

/// Outcome returned after an answer submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerResponse {
    /// Whether the recorded answer matched the correct option.
    pub correct: bool,
    /// Text of the correct option, revealed once the player has answered.
    pub correct_answer: String,
    /// Player's total score after the submission.
    pub score: u32,
    /// Whether a previous submission already counted for this question.
    pub already_answered: bool,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
/// Public projection of a player exposed to REST/SSE clients.
pub struct PlayerSummary {
    pub name: String,
    pub score: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
}

/// Question fields safe to show while answering is open.
///
/// The correct option index is deliberately absent; it never leaves the
/// server in a read-only payload.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct PublicQuestion {
    pub text: String,
    pub options: Vec<String>,
}

/// Full public snapshot of the current round.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Monotonic identifier of the round, starting at 1.
    pub round_id: u64,
    pub phase: VisiblePhase,
    /// Seconds left in the join window; zero outside `joinable`.
    pub countdown: u32,
    pub players_joined: usize,
    /// Roster in join order.
    pub players: Vec<PlayerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<PublicQuestion>,
    /// 1-based ordinal of the live question; zero outside `in_progress`.
    pub current_question_number: u32,
    pub total_questions: u32,
    /// Seconds left on the live question; zero outside `in_progress`.
    pub question_countdown: u32,
    pub round_finished: bool,
    /// Final standings, present only while the leaderboard is displayed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leaderboard: Option<Vec<PlayerSummary>>,
}

impl From<&Player> for PlayerSummary {
    fn from(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            score: player.score,
            questions_answered: player.questions_answered,
            correct_answers: player.correct_answers,
        }
    }
}

impl From<&Question> for PublicQuestion {
    fn from(question: &Question) -> Self {
        Self {
            text: question.text.clone(),
            options: question.options.clone(),
        }
    }
}

impl From<&RoundState> for StatusResponse {
    fn from(round: &RoundState) -> Self {
        let (countdown, current_question, current_question_number, question_countdown, leaderboard) =
            match &round.phase {
                RoundPhase::Waiting { .. } => (0, None, 0, 0, None),
                RoundPhase::Joinable { countdown } => (*countdown, None, 0, 0, None),
                RoundPhase::InProgress(active) => (
                    0,
                    Some(PublicQuestion::from(&active.question)),
                    active.ordinal,
                    active.countdown,
                    None,
                ),
                RoundPhase::Finished { leaderboard, .. } => (
                    0,
                    None,
                    0,
                    0,
                    Some(leaderboard.iter().map(Into::into).collect()),
                ),
            };

        Self {
            round_id: round.id,
            phase: VisiblePhase::from(&round.phase),
            countdown,
            players_joined: round.players.len(),
            players: round.players.values().map(Into::into).collect(),
            current_question,
            current_question_number,
            total_questions: round.total_questions,
            question_countdown,
            round_finished: matches!(round.phase, RoundPhase::Finished { .. }),
            leaderboard,
        }
    }
}
