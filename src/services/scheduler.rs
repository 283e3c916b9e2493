//! Background loop that drives the round through its phases.

use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::info;

use crate::{
    config::GameConfig,
    dto::sse::PhaseChangedEvent,
    services::sse_events,
    state::{
        SharedState,
        round::{ActiveQuestion, RoundPhase, RoundState},
    },
};

/// Run the round scheduler until the process shuts down.
///
/// One tick per second; the first tick fires immediately, so the first join
/// window opens right at startup. Each tick takes the round lock for a single
/// synchronous step and broadcasts outside the lock.
pub async fn run(state: SharedState) {
    let mut ticker = time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let broadcast = state
            .with_round(|round| advance(round, state.config()))
            .await;

        if let Some(payload) = broadcast {
            sse_events::broadcast_phase_changed(&state, &payload);
        }
    }
}

/// Apply one one-second step to the round.
///
/// Every phase ticks its own timer down and transitions when it empties, so
/// a phase configured for `T` seconds occupies exactly `T` ticks. Returns a
/// broadcast payload when the phase changed or a new question went on
/// display.
fn advance(round: &mut RoundState, config: &GameConfig) -> Option<PhaseChangedEvent> {
    match &mut round.phase {
        RoundPhase::Waiting { resume_in } => {
            *resume_in = resume_in.saturating_sub(1);
            if *resume_in > 0 {
                return None;
            }
            open_join_window(round, config);
            Some(PhaseChangedEvent::from(&*round))
        }
        RoundPhase::Joinable { countdown } => {
            *countdown = countdown.saturating_sub(1);
            if *countdown > 0 {
                return None;
            }
            start_question(round, 1, config);
            Some(PhaseChangedEvent::from(&*round))
        }
        RoundPhase::InProgress(active) => {
            active.countdown = active.countdown.saturating_sub(1);
            if active.countdown > 0 {
                return None;
            }
            let next_ordinal = active.ordinal + 1;
            if next_ordinal <= round.total_questions {
                start_question(round, next_ordinal, config);
            } else {
                finish_round(round, config);
            }
            Some(PhaseChangedEvent::from(&*round))
        }
        RoundPhase::Finished {
            display_remaining, ..
        } => {
            *display_remaining = display_remaining.saturating_sub(1);
            if *display_remaining > 0 {
                return None;
            }
            round.phase = RoundPhase::Waiting {
                resume_in: config.intermission_secs,
            };
            info!(
                round = round.id,
                pause_secs = config.intermission_secs,
                "waiting before the next round"
            );
            Some(PhaseChangedEvent::from(&*round))
        }
    }
}

/// Start a fresh round: bump the identifier, clear the roster, reset the
/// question pool and open the join window.
fn open_join_window(round: &mut RoundState, config: &GameConfig) {
    round.id += 1;
    round.players.clear();
    round.deck.reset();
    round.phase = RoundPhase::Joinable {
        countdown: config.join_window_secs,
    };
    info!(
        round = round.id,
        window_secs = config.join_window_secs,
        "join window opened"
    );
}

fn start_question(round: &mut RoundState, ordinal: u32, config: &GameConfig) {
    let question = round.deck.draw();
    info!(
        round = round.id,
        question = ordinal,
        total = round.total_questions,
        text = %question.text,
        "question served"
    );
    round.phase = RoundPhase::InProgress(ActiveQuestion::new(
        ordinal,
        question,
        config.question_secs,
    ));
}

fn finish_round(round: &mut RoundState, config: &GameConfig) {
    let leaderboard = round.leaderboard();
    let standings = leaderboard
        .iter()
        .map(|player| format!("{}={}", player.name, player.score))
        .collect::<Vec<_>>()
        .join(", ");
    info!(
        round = round.id,
        players = round.players.len(),
        %standings,
        "round finished"
    );
    round.phase = RoundPhase::Finished {
        display_remaining: config.leaderboard_secs,
        leaderboard,
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dto::{
            phase::VisiblePhase,
            round::{AnswerRequest, JoinRequest},
        },
        error::ServiceError,
        services::round_service,
        state::{AppState, round::Question},
    };

    fn test_bank() -> Arc<[Question]> {
        vec![
            Question {
                text: "2 + 2?".into(),
                options: vec!["3".into(), "4".into()],
                correct_index: 1,
            },
            Question {
                text: "3 * 3?".into(),
                options: vec!["9".into(), "6".into()],
                correct_index: 0,
            },
            Question {
                text: "10 - 7?".into(),
                options: vec!["2".into(), "3".into()],
                correct_index: 1,
            },
        ]
        .into()
    }

    fn test_config() -> GameConfig {
        GameConfig {
            join_window_secs: 3,
            question_secs: 2,
            questions_per_round: 2,
            leaderboard_secs: 2,
            intermission_secs: 1,
            questions: test_bank(),
        }
    }

    fn fresh_round(config: &GameConfig) -> RoundState {
        RoundState::new(config.questions.clone(), config.questions_per_round)
    }

    /// Apply `ticks` steps, returning the broadcast payloads that were emitted.
    fn drive(round: &mut RoundState, config: &GameConfig, ticks: u32) -> Vec<PhaseChangedEvent> {
        (0..ticks)
            .filter_map(|_| advance(round, config))
            .collect()
    }

    #[test]
    fn first_tick_opens_the_first_join_window() {
        let config = test_config();
        let mut round = fresh_round(&config);

        let broadcast = advance(&mut round, &config);

        assert_eq!(round.id, 1);
        assert!(matches!(round.phase, RoundPhase::Joinable { countdown: 3 }));
        let event = broadcast.unwrap();
        assert_eq!(event.phase, VisiblePhase::Joinable);
        assert_eq!(event.countdown, 3);
    }

    #[test]
    fn join_window_lasts_its_configured_duration() {
        let config = test_config();
        let mut round = fresh_round(&config);
        advance(&mut round, &config);

        // two silent ticks, then the window closes on the third
        assert!(advance(&mut round, &config).is_none());
        assert!(advance(&mut round, &config).is_none());
        let event = advance(&mut round, &config).unwrap();

        assert_eq!(event.phase, VisiblePhase::InProgress);
        assert_eq!(event.current_question_number, Some(1));
        let active = round.active_question().unwrap();
        assert_eq!(active.ordinal, 1);
        assert_eq!(active.countdown, config.question_secs);
    }

    #[test]
    fn questions_run_back_to_back_until_the_round_finishes() {
        let config = test_config();
        let mut round = fresh_round(&config);
        advance(&mut round, &config);
        drive(&mut round, &config, config.join_window_secs);
        assert_eq!(round.active_question().unwrap().ordinal, 1);

        // the first question expires and the second one starts
        let events = drive(&mut round, &config, config.question_secs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].current_question_number, Some(2));
        assert_eq!(round.active_question().unwrap().ordinal, 2);

        // the last question expires and the leaderboard goes up
        let events = drive(&mut round, &config, config.question_secs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, VisiblePhase::Finished);
        assert!(events[0].leaderboard.is_some());
        assert!(matches!(round.phase, RoundPhase::Finished { .. }));
    }

    #[test]
    fn fresh_answers_are_tracked_per_question() {
        let config = test_config();
        let mut round = fresh_round(&config);
        advance(&mut round, &config);
        drive(&mut round, &config, config.join_window_secs);

        round.active_question_mut().unwrap().answers.insert(
            "alice".into(),
            crate::state::round::AnswerRecord {
                selected_index: 0,
                correct: false,
                submitted_at: std::time::SystemTime::now(),
            },
        );

        drive(&mut round, &config, config.question_secs);

        // the next question starts with an empty answer set
        assert!(round.active_question().unwrap().answers.is_empty());
    }

    #[test]
    fn finished_round_leads_back_to_a_fresh_one() {
        let config = test_config();
        let mut round = fresh_round(&config);
        advance(&mut round, &config);
        drive(&mut round, &config, config.join_window_secs);
        round
            .players
            .insert("alice".into(), crate::state::round::Player::new("alice".into()));
        drive(
            &mut round,
            &config,
            config.question_secs * config.questions_per_round,
        );
        assert!(matches!(round.phase, RoundPhase::Finished { .. }));

        // leaderboard display, then the intermission
        let events = drive(&mut round, &config, config.leaderboard_secs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, VisiblePhase::Waiting);

        // intermission elapses and a new round opens with a clean roster
        let events = drive(&mut round, &config, config.intermission_secs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase, VisiblePhase::Joinable);
        assert_eq!(round.id, 2);
        assert!(round.players.is_empty());
    }

    #[test]
    fn one_broadcast_per_transition_over_a_full_cycle() {
        let config = test_config();
        let mut round = fresh_round(&config);

        let cycle = 1
            + config.join_window_secs
            + config.question_secs * config.questions_per_round
            + config.leaderboard_secs
            + config.intermission_secs;
        let events = drive(&mut round, &config, cycle);

        // open, question 1, question 2, finished, waiting, reopen
        assert_eq!(events.len(), 6);
        assert_eq!(round.id, 2);
        assert!(matches!(round.phase, RoundPhase::Joinable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_loop_drives_the_round_on_virtual_time() {
        let config = test_config();
        let state = AppState::new(config);
        tokio::spawn(run(state.clone()));

        // let the immediate first tick fire
        tokio::time::sleep(Duration::from_millis(10)).await;
        let (id, phase) = state
            .read_round(|round| (round.id, VisiblePhase::from(&round.phase)))
            .await;
        assert_eq!(id, 1);
        assert_eq!(phase, VisiblePhase::Joinable);

        // ride past the join window
        tokio::time::sleep(Duration::from_secs(3)).await;
        let phase = state
            .read_round(|round| VisiblePhase::from(&round.phase))
            .await;
        assert_eq!(phase, VisiblePhase::InProgress);

        // both questions and the leaderboard display elapse
        tokio::time::sleep(Duration::from_secs(2 * 2 + 2)).await;
        let phase = state
            .read_round(|round| VisiblePhase::from(&round.phase))
            .await;
        assert_eq!(phase, VisiblePhase::Waiting);
    }

    #[tokio::test(start_paused = true)]
    async fn single_question_round_from_join_to_leaderboard() {
        let config = GameConfig {
            join_window_secs: 5,
            question_secs: 5,
            questions_per_round: 1,
            leaderboard_secs: 2,
            intermission_secs: 1,
            questions: test_bank(),
        };
        let state = AppState::new(config);
        tokio::spawn(run(state.clone()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        round_service::join(
            &state,
            JoinRequest {
                name: "alice".into(),
            },
        )
        .await
        .unwrap();

        // the join window elapses and the only question goes live
        tokio::time::sleep(Duration::from_secs(5)).await;
        let correct_index = state
            .read_round(|round| round.active_question().unwrap().question.correct_index)
            .await;

        let first = round_service::submit_answer(
            &state,
            AnswerRequest {
                player_name: "alice".into(),
                answer: Some(correct_index),
            },
        )
        .await
        .unwrap();
        assert!(first.correct);
        assert_eq!(first.score, 10);
        assert!(!first.already_answered);

        let second = round_service::submit_answer(
            &state,
            AnswerRequest {
                player_name: "alice".into(),
                answer: Some(correct_index),
            },
        )
        .await
        .unwrap();
        assert!(second.correct);
        assert_eq!(second.score, 10);
        assert!(second.already_answered);

        // the question elapses and the round settles on the leaderboard
        tokio::time::sleep(Duration::from_secs(5)).await;
        let status = round_service::get_status(&state).await;
        assert!(status.round_finished);
        let standings = status.leaderboard.unwrap();
        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].name, "alice");
        assert_eq!(standings[0].score, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn full_round_flow_with_a_player_on_virtual_time() {
        let state = AppState::new(test_config());
        tokio::spawn(run(state.clone()));

        // the join window opens on the immediate first tick
        tokio::time::sleep(Duration::from_millis(10)).await;
        let joined = round_service::join(
            &state,
            JoinRequest {
                name: "alice".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(joined.players_joined, 1);

        // answering before any question is live is refused
        let early = round_service::submit_answer(
            &state,
            AnswerRequest {
                player_name: "alice".into(),
                answer: Some(0),
            },
        )
        .await;
        assert_eq!(early.unwrap_err(), ServiceError::NoActiveQuestion);

        // ride into the first question and answer it correctly
        tokio::time::sleep(Duration::from_secs(3)).await;
        let (correct_index, ordinal) = state
            .read_round(|round| {
                let active = round.active_question().unwrap();
                (active.question.correct_index, active.ordinal)
            })
            .await;
        assert_eq!(ordinal, 1);
        let outcome = round_service::submit_answer(
            &state,
            AnswerRequest {
                player_name: "alice".into(),
                answer: Some(correct_index),
            },
        )
        .await
        .unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.score, 10);

        // a late joiner is refused while the round runs
        let late = round_service::join(
            &state,
            JoinRequest {
                name: "mallory".into(),
            },
        )
        .await;
        assert_eq!(late.unwrap_err(), ServiceError::RoundNotJoinable);

        // the remaining questions elapse; the leaderboard shows alice on top
        tokio::time::sleep(Duration::from_secs(4)).await;
        let status = round_service::get_status(&state).await;
        assert!(status.round_finished);
        let standings = status.leaderboard.unwrap();
        assert_eq!(standings[0].name, "alice");
        assert_eq!(standings[0].score, 10);

        // display and intermission elapse; round 2 opens with a fresh roster
        tokio::time::sleep(Duration::from_secs(3)).await;
        let status = round_service::get_status(&state).await;
        assert_eq!(status.round_id, 2);
        assert_eq!(status.phase, VisiblePhase::Joinable);
        assert_eq!(status.players_joined, 0);
    }
}
