//! Service layer for the player-facing round operations.

use std::time::SystemTime;

use tracing::info;

use crate::{
    dto::{
        round::{AnswerRequest, AnswerResponse, JoinRequest, JoinResponse, StatusResponse},
        sse::{PlayerAnsweredEvent, PlayerJoinedEvent},
    },
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        round::{AnswerRecord, Player, RoundPhase},
    },
};

/// Points granted for a correct answer.
const POINTS_PER_CORRECT_ANSWER: u32 = 10;

/// Enter the current round during its join window.
///
/// Joining is idempotent: a name already on the roster is acknowledged again
/// without any other effect, and no event is broadcast for it.
pub async fn join(state: &SharedState, request: JoinRequest) -> Result<JoinResponse, ServiceError> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput(
            "player name must not be blank".into(),
        ));
    }

    let (response, broadcast) = state
        .with_round(|round| {
            if !matches!(round.phase, RoundPhase::Joinable { .. }) {
                return Err(ServiceError::RoundNotJoinable);
            }

            if round.players.contains_key(&name) {
                return Ok((
                    JoinResponse {
                        player_name: name.clone(),
                        already_joined: true,
                        players_joined: round.players.len(),
                    },
                    None,
                ));
            }

            let player = Player::new(name.clone());
            let event = PlayerJoinedEvent {
                player: (&player).into(),
                players_joined: round.players.len() + 1,
            };
            round.players.insert(name.clone(), player);

            Ok((
                JoinResponse {
                    player_name: name.clone(),
                    already_joined: false,
                    players_joined: round.players.len(),
                },
                Some(event),
            ))
        })
        .await?;

    if let Some(event) = &broadcast {
        info!(
            player = %response.player_name,
            players_joined = response.players_joined,
            "player joined the round"
        );
        sse_events::broadcast_player_joined(state, event);
    }

    Ok(response)
}

/// Record a player's answer to the live question.
///
/// Checks run in a fixed order: live question, then roster membership, then
/// presence of a choice. A resubmission returns the stored outcome without
/// mutating anything.
pub async fn submit_answer(
    state: &SharedState,
    request: AnswerRequest,
) -> Result<AnswerResponse, ServiceError> {
    let name = request.player_name.trim().to_string();

    let (response, broadcast) = state
        .with_round(|round| {
            // Borrow phase and roster as separate fields so both sides can
            // be mutated in one pass.
            let RoundPhase::InProgress(active) = &mut round.phase else {
                return Err(ServiceError::NoActiveQuestion);
            };

            let Some(player) = round.players.get_mut(&name) else {
                return Err(ServiceError::UnknownPlayer(name.clone()));
            };

            let Some(selected_index) = request.answer else {
                return Err(ServiceError::MissingAnswer);
            };

            if let Some(record) = active.answers.get(&name) {
                return Ok((
                    AnswerResponse {
                        correct: record.correct,
                        correct_answer: active.question.correct_option().to_string(),
                        score: player.score,
                        already_answered: true,
                    },
                    None,
                ));
            }

            // An out-of-range index is a wrong answer, not an error.
            let correct = selected_index == active.question.correct_index;
            player.questions_answered += 1;
            if correct {
                player.correct_answers += 1;
                player.score += POINTS_PER_CORRECT_ANSWER;
            }

            let record = AnswerRecord {
                selected_index,
                correct,
                submitted_at: SystemTime::now(),
            };
            let event = PlayerAnsweredEvent::from((&*player, &record, active.ordinal));
            active.answers.insert(name.clone(), record);

            Ok((
                AnswerResponse {
                    correct,
                    correct_answer: active.question.correct_option().to_string(),
                    score: player.score,
                    already_answered: false,
                },
                Some(event),
            ))
        })
        .await?;

    if let Some(event) = &broadcast {
        info!(
            player = %event.player.name,
            question = event.question_number,
            correct = response.correct,
            score = response.score,
            "answer recorded"
        );
        sse_events::broadcast_player_answered(state, event);
    }

    Ok(response)
}

/// Read-only snapshot of the current round. Never fails.
pub async fn get_status(state: &SharedState) -> StatusResponse {
    state.read_round(|round| StatusResponse::from(round)).await
}
