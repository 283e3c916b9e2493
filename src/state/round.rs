use std::{sync::Arc, time::SystemTime};

use indexmap::IndexMap;
use rand::Rng;

/// A single trivia question as drawn from the configured bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Question text shown to players.
    pub text: String,
    /// Ordered answer options presented to players.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_index: usize,
}

impl Question {
    /// Human-readable text of the correct option.
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_index]
    }
}

/// Roster entry tracked for the lifetime of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Unique display name, also the roster key.
    pub name: String,
    /// Points accumulated this round; never decreases.
    pub score: u32,
    /// Number of questions this player has submitted an answer for.
    pub questions_answered: u32,
    /// Number of those answers that were correct.
    pub correct_answers: u32,
}

impl Player {
    /// Fresh roster entry with zeroed score and counters.
    pub fn new(name: String) -> Self {
        Self {
            name,
            score: 0,
            questions_answered: 0,
            correct_answers: 0,
        }
    }
}

/// Write-once record of a player's submission for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    /// The option the player selected.
    pub selected_index: usize,
    /// Whether the selection matched the question's correct option.
    pub correct: bool,
    /// Wall-clock time the submission was accepted.
    pub submitted_at: SystemTime,
}

/// The question currently being served, plus its per-question bookkeeping.
#[derive(Debug, Clone)]
pub struct ActiveQuestion {
    /// 1-based position of this question within the round.
    pub ordinal: u32,
    /// Snapshot of the drawn question; immutable while active.
    pub question: Question,
    /// Seconds remaining before the question closes.
    pub countdown: u32,
    /// Answers accepted so far, keyed by player name.
    pub answers: IndexMap<String, AnswerRecord>,
}

impl ActiveQuestion {
    /// Open a fresh question slot with an empty answer sheet.
    pub fn new(ordinal: u32, question: Question, countdown: u32) -> Self {
        Self {
            ordinal,
            question,
            countdown,
            answers: IndexMap::new(),
        }
    }
}

/// Phase of the round state machine.
///
/// Countdowns and phase-specific data live inside the variant they are valid
/// for, so an active question outside `InProgress` or a join countdown
/// outside `Joinable` cannot be represented.
#[derive(Debug, Clone)]
pub enum RoundPhase {
    /// Short pause between rounds before the next join window opens.
    Waiting {
        /// Seconds until the next join window opens.
        resume_in: u32,
    },
    /// The join window is open; players may register.
    Joinable {
        /// Seconds until the first question starts.
        countdown: u32,
    },
    /// A question is being served.
    InProgress(ActiveQuestion),
    /// The round is over and the final standings are on display.
    Finished {
        /// Seconds the leaderboard remains on display.
        display_remaining: u32,
        /// Final standings, computed once when the round ended.
        leaderboard: Vec<Player>,
    },
}

/// Random-draw pool over the configured question bank.
///
/// Draws are uniform and without replacement; once every question has been
/// served the pool refills and draws continue, so a bank smaller than the
/// per-round question count repeats instead of running dry. The pool also
/// refills at the start of every round.
#[derive(Debug)]
pub struct QuestionDeck {
    bank: Arc<[Question]>,
    unused: Vec<usize>,
}

impl QuestionDeck {
    /// Build a full pool over `bank`.
    ///
    /// Panics when the bank is empty: configuration loading guarantees at
    /// least one question, so an empty bank here is a programming error.
    pub fn new(bank: Arc<[Question]>) -> Self {
        if bank.is_empty() {
            panic!("question bank must not be empty");
        }
        let unused = (0..bank.len()).collect();
        Self { bank, unused }
    }

    /// Return every question to the pool.
    pub fn reset(&mut self) {
        self.unused = (0..self.bank.len()).collect();
    }

    /// Draw one question uniformly at random without replacement, refilling
    /// the pool first when it has been exhausted.
    pub fn draw(&mut self) -> Question {
        if self.unused.is_empty() {
            self.reset();
        }

        let mut rng = rand::rng();
        let slot = rng.random_range(0..self.unused.len());
        let index = self.unused.swap_remove(slot);
        self.bank[index].clone()
    }
}

/// The single mutable record describing the current round.
///
/// One instance exists per process, owned by [`crate::state::AppState`]
/// behind a mutex. The scheduler loop owns `id`, `phase`, and `deck`;
/// request handlers own `players` and the active question's answer sheet,
/// and only touch them when the phase permits.
#[derive(Debug)]
pub struct RoundState {
    /// Monotonically increasing round identifier; never reused.
    pub id: u64,
    /// Current phase together with its phase-scoped data.
    pub phase: RoundPhase,
    /// Players who joined the current round, in join order.
    pub players: IndexMap<String, Player>,
    /// Configured number of question slots per round.
    pub total_questions: u32,
    /// Draw pool over the configured question bank.
    pub deck: QuestionDeck,
}

impl RoundState {
    /// Pre-start state; the scheduler opens round 1 on its first tick.
    pub fn new(bank: Arc<[Question]>, total_questions: u32) -> Self {
        Self {
            id: 0,
            phase: RoundPhase::Waiting { resume_in: 0 },
            players: IndexMap::new(),
            total_questions,
            deck: QuestionDeck::new(bank),
        }
    }

    /// The question being served, if any. `Some` iff the phase is
    /// `InProgress`.
    pub fn active_question(&self) -> Option<&ActiveQuestion> {
        match &self.phase {
            RoundPhase::InProgress(active) => Some(active),
            _ => None,
        }
    }

    /// Mutable access to the question being served, if any.
    pub fn active_question_mut(&mut self) -> Option<&mut ActiveQuestion> {
        match &mut self.phase {
            RoundPhase::InProgress(active) => Some(active),
            _ => None,
        }
    }

    /// Players ranked by score, highest first. The sort is stable, so
    /// players with equal scores keep their join order.
    pub fn leaderboard(&self) -> Vec<Player> {
        let mut standings: Vec<Player> = self.players.values().cloned().collect();
        standings.sort_by(|a, b| b.score.cmp(&a.score));
        standings
    }
}
