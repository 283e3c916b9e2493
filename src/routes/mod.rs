use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod round;
pub mod sse;

/// Compose the route subtrees and wire in the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(round::router())
        .merge(sse::router())
        .merge(docs::router())
        .with_state(state)
}
