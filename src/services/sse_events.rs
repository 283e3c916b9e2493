use serde::Serialize;
use tracing::warn;

use crate::{
    dto::sse::{PhaseChangedEvent, PlayerAnsweredEvent, PlayerJoinedEvent, ServerEvent},
    state::SharedState,
};

const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_PLAYER_JOINED: &str = "player.joined";
const EVENT_PLAYER_ANSWERED: &str = "player.answered";

/// Broadcast a round phase change (or a freshly served question) to public
/// subscribers.
pub fn broadcast_phase_changed(state: &SharedState, payload: &PhaseChangedEvent) {
    send_public_event(state, EVENT_PHASE_CHANGED, payload);
}

/// Broadcast that a player entered the round.
pub fn broadcast_player_joined(state: &SharedState, payload: &PlayerJoinedEvent) {
    send_public_event(state, EVENT_PLAYER_JOINED, payload);
}

/// Broadcast that a player's first answer to a question was recorded.
pub fn broadcast_player_answered(state: &SharedState, payload: &PlayerAnsweredEvent) {
    send_public_event(state, EVENT_PLAYER_ANSWERED, payload);
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    // Skip the serialization work when nobody is listening.
    if state.public_sse().subscriber_count() == 0 {
        return;
    }

    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.public_sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
