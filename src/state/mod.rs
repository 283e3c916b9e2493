pub mod round;
mod sse;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{config::GameConfig, state::round::RoundState};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

/// Capacity of the public SSE broadcast channel.
const PUBLIC_SSE_CAPACITY: usize = 16;

/// Central application state: the immutable game configuration, the single
/// round record, and the SSE fan-out hub.
pub struct AppState {
    config: GameConfig,
    round: Mutex<RoundState>,
    public_sse: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The round starts in the waiting phase; the scheduler opens the first
    /// join window on its initial tick.
    pub fn new(config: GameConfig) -> SharedState {
        let round = RoundState::new(config.questions.clone(), config.questions_per_round);
        Arc::new(Self {
            config,
            round: Mutex::new(round),
            public_sse: SseHub::new(PUBLIC_SSE_CAPACITY),
        })
    }

    /// Immutable game configuration loaded at startup.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Run `f` with exclusive access to the round record.
    ///
    /// The guard lives only for the duration of the synchronous closure, so
    /// the round lock can never be held across an await point.
    pub async fn with_round<T>(&self, f: impl FnOnce(&mut RoundState) -> T) -> T {
        let mut guard = self.round.lock().await;
        f(&mut guard)
    }

    /// Run `f` with read access to the round record.
    ///
    /// Same locking discipline as [`AppState::with_round`]; the name marks
    /// call sites that only observe the round.
    pub async fn read_round<T>(&self, f: impl FnOnce(&RoundState) -> T) -> T {
        let guard = self.round.lock().await;
        f(&guard)
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.public_sse
    }
}
