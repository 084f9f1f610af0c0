//! The per-room quiz state machine.
//!
//! Phases move strictly `Lobby → Question → Reveal → Question → … →
//! Finished`. Every transition is an explicit method on [`QuizState`]
//! returning an explicit outcome, so the async layer driving it never has
//! to guess what happened. Time is an input here (`tick`,
//! `close_question`), never something this module measures itself.

use serde::{Deserialize, Serialize};

use crate::{JoinError, Player, Question, RoomSettings, StartError};
use crate::player::Answer;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a room is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Accepting joins; the quiz has not started.
    Lobby,
    /// A question is open and the countdown is running.
    Question,
    /// The correct answer and standings are on display.
    Reveal,
    /// Terminal: final standings emitted, room about to be torn down.
    Finished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Question => write!(f, "question"),
            Self::Reveal => write!(f, "reveal"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// Operation outcomes
// ---------------------------------------------------------------------------

/// Result of recording an answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The answer was recorded (first submission, `Question` phase).
    Recorded {
        /// Points awarded for this answer (0 for a wrong pick).
        awarded: u32,
        /// Whether every player in the room has now answered.
        all_answered: bool,
    },
    /// Wrong phase, unknown player, or a repeat submission. Double
    /// submits are a no-op, not an error.
    Ignored,
}

/// Result of leaving the reveal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advanced {
    /// Entered `Question` at the new cursor position.
    NextQuestion,
    /// The cursor reached the end; the quiz is finished.
    Finished,
}

// ---------------------------------------------------------------------------
// QuizState
// ---------------------------------------------------------------------------

/// One room's quiz, from lobby to final standings.
#[derive(Debug, Clone)]
pub struct QuizState {
    owner: String,
    players: Vec<Player>,
    questions: Vec<Question>,
    current_index: usize,
    settings: RoomSettings,
    time_left: u32,
    phase: Phase,
}

impl QuizState {
    /// Creates a lobby with the owner as its first player.
    ///
    /// `settings` is normalized, and `num_questions` is clamped to the
    /// number of questions the source actually produced — the requested
    /// count is a ceiling, never a promise.
    pub fn new(owner: impl Into<String>, settings: RoomSettings, questions: Vec<Question>) -> Self {
        let owner = owner.into();
        let mut settings = settings.normalized();
        settings.num_questions = settings.num_questions.min(questions.len());

        Self {
            players: vec![Player::new(owner.clone())],
            owner,
            questions,
            current_index: 0,
            time_left: settings.time_limit,
            settings,
            phase: Phase::Lobby,
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// The question currently pointed at by the cursor, if any.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    fn player_mut(&mut self, username: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.username == username)
    }

    // -- Transitions -------------------------------------------------------

    /// Adds a player to the roster. Lobby-only.
    pub fn join(&mut self, username: impl Into<String>) -> Result<(), JoinError> {
        let username = username.into();
        if self.phase != Phase::Lobby {
            return Err(JoinError::QuizStarted);
        }
        if self.players.iter().any(|p| p.username == username) {
            return Err(JoinError::UsernameTaken(username));
        }
        if self.players.len() >= self.settings.max_players {
            return Err(JoinError::RoomFull(self.settings.max_players));
        }
        self.players.push(Player::new(username));
        Ok(())
    }

    /// Starts the quiz at question 0.
    ///
    /// Only the owner may start, and only from the lobby; a room whose
    /// source returned zero questions refuses to start rather than enter
    /// `Question` with nothing to ask.
    pub fn start(&mut self, requester: &str) -> Result<(), StartError> {
        if requester != self.owner {
            return Err(StartError::NotOwner);
        }
        if self.phase != Phase::Lobby {
            return Err(StartError::NotInLobby);
        }
        if self.questions.is_empty() {
            return Err(StartError::NoQuestions);
        }
        self.current_index = 0;
        self.open_question();
        Ok(())
    }

    /// Records `username`'s answer to the current question.
    ///
    /// First submission per question only; anything else is ignored. A
    /// correct answer earns `100 + ⌊time_left / time_limit × 50⌋`, so
    /// answering at the last tick still earns the base 100.
    pub fn submit_answer(&mut self, username: &str, choice: usize) -> Submission {
        if self.phase != Phase::Question {
            return Submission::Ignored;
        }
        let correct = match self.current_question() {
            Some(q) => q.correct,
            None => return Submission::Ignored,
        };
        let time_left = self.time_left;
        let time_limit = self.settings.time_limit;

        let Some(player) = self.player_mut(username) else {
            return Submission::Ignored;
        };
        if player.answer.is_recorded() {
            return Submission::Ignored;
        }

        player.answer = Answer::Choice(choice);
        player.answer_time_left = time_left;

        let awarded = if choice == correct {
            100 + time_left * 50 / time_limit
        } else {
            0
        };
        player.score += awarded;

        let all_answered = self.players.iter().all(|p| p.answer.is_recorded());
        Submission::Recorded {
            awarded,
            all_answered,
        }
    }

    /// Counts one second off the question clock. Returns the remaining
    /// seconds; outside the `Question` phase this is a no-op.
    pub fn tick(&mut self) -> u32 {
        if self.phase == Phase::Question {
            self.time_left = self.time_left.saturating_sub(1);
        }
        self.time_left
    }

    /// Closes the current question and enters `Reveal`.
    ///
    /// Players who never answered are stamped with the timed-out
    /// sentinel. Returns the correct option index for the reveal
    /// broadcast.
    pub fn close_question(&mut self) -> usize {
        debug_assert_eq!(self.phase, Phase::Question);
        for player in &mut self.players {
            if !player.answer.is_recorded() {
                player.answer = Answer::TimedOut;
            }
        }
        self.phase = Phase::Reveal;
        self.current_question().map(|q| q.correct).unwrap_or(0)
    }

    /// Leaves `Reveal`: either opens the next question or finishes.
    pub fn advance(&mut self) -> Advanced {
        debug_assert_eq!(self.phase, Phase::Reveal);
        self.current_index += 1;
        if self.current_index < self.questions.len() {
            self.open_question();
            Advanced::NextQuestion
        } else {
            self.phase = Phase::Finished;
            Advanced::Finished
        }
    }

    /// Resets per-question state and opens the question at the cursor.
    fn open_question(&mut self) {
        for player in &mut self.players {
            player.reset_answer();
        }
        self.time_left = self.settings.time_limit;
        self.phase = Phase::Question;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize, domain: &str) -> Question {
        Question::new(
            format!("pick option {correct}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            domain,
        )
    }

    fn settings(time_limit: u32, max_players: usize) -> RoomSettings {
        RoomSettings {
            domain: "Quant".into(),
            time_limit,
            num_questions: 10,
            max_players,
        }
    }

    fn two_player_quiz(num_questions: usize) -> QuizState {
        let questions = (0..num_questions).map(|i| question(i % 4, "Quant")).collect();
        let mut quiz = QuizState::new("alice", settings(20, 8), questions);
        quiz.join("bob").unwrap();
        quiz
    }

    // -- Lobby -------------------------------------------------------------

    #[test]
    fn test_new_room_is_lobby_with_owner_joined() {
        let quiz = QuizState::new("alice", settings(20, 8), vec![question(0, "Quant")]);
        assert_eq!(quiz.phase(), Phase::Lobby);
        assert_eq!(quiz.owner(), "alice");
        assert_eq!(quiz.players().len(), 1);
        assert_eq!(quiz.players()[0].username, "alice");
    }

    #[test]
    fn test_num_questions_reflects_fulfilled_count() {
        // 10 requested, source produced 3.
        let questions = vec![question(0, "Quant"), question(1, "Quant"), question(2, "Quant")];
        let quiz = QuizState::new("alice", settings(20, 8), questions);
        assert_eq!(quiz.settings().num_questions, 3);
    }

    #[test]
    fn test_join_duplicate_username_rejected_and_roster_unchanged() {
        let mut quiz = two_player_quiz(1);
        let err = quiz.join("bob").unwrap_err();
        assert_eq!(err, JoinError::UsernameTaken("bob".into()));
        assert_eq!(quiz.players().len(), 2);
    }

    #[test]
    fn test_join_full_room_rejected() {
        let mut quiz = QuizState::new("alice", settings(20, 2), vec![question(0, "Quant")]);
        quiz.join("bob").unwrap();
        assert_eq!(quiz.join("carol").unwrap_err(), JoinError::RoomFull(2));
    }

    #[test]
    fn test_join_after_start_rejected() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        assert_eq!(quiz.join("carol").unwrap_err(), JoinError::QuizStarted);
    }

    #[test]
    fn test_join_order_is_preserved() {
        let mut quiz = QuizState::new("alice", settings(20, 8), vec![question(0, "Quant")]);
        quiz.join("bob").unwrap();
        quiz.join("carol").unwrap();
        let names: Vec<_> = quiz.players().iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, ["alice", "bob", "carol"]);
    }

    // -- Start -------------------------------------------------------------

    #[test]
    fn test_start_by_owner_enters_question_zero() {
        let mut quiz = two_player_quiz(3);
        quiz.start("alice").unwrap();
        assert_eq!(quiz.phase(), Phase::Question);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.time_left(), 20);
    }

    #[test]
    fn test_start_by_non_owner_refused() {
        let mut quiz = two_player_quiz(3);
        assert_eq!(quiz.start("bob").unwrap_err(), StartError::NotOwner);
        assert_eq!(quiz.phase(), Phase::Lobby);
    }

    #[test]
    fn test_start_twice_refused() {
        let mut quiz = two_player_quiz(3);
        quiz.start("alice").unwrap();
        assert_eq!(quiz.start("alice").unwrap_err(), StartError::NotInLobby);
    }

    #[test]
    fn test_start_with_no_questions_refused() {
        let mut quiz = QuizState::new("alice", settings(20, 8), vec![]);
        assert_eq!(quiz.start("alice").unwrap_err(), StartError::NoQuestions);
        assert_eq!(quiz.phase(), Phase::Lobby);
    }

    // -- Scoring -----------------------------------------------------------

    #[test]
    fn test_correct_answer_scores_base_plus_time_bonus() {
        // Spec scenario: timeLimit=20, answered correctly at timeLeft=15
        // → 100 + floor(15/20 × 50) = 137.
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        for _ in 0..5 {
            quiz.tick();
        }
        assert_eq!(quiz.time_left(), 15);

        let outcome = quiz.submit_answer("alice", 0);
        assert_eq!(
            outcome,
            Submission::Recorded {
                awarded: 137,
                all_answered: false
            }
        );
        assert_eq!(quiz.players()[0].score, 137);
        assert_eq!(quiz.players()[0].answer_time_left, 15);
    }

    #[test]
    fn test_wrong_answer_scores_zero_and_triggers_all_answered() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        quiz.submit_answer("alice", 0);

        let outcome = quiz.submit_answer("bob", 3);
        assert_eq!(
            outcome,
            Submission::Recorded {
                awarded: 0,
                all_answered: true
            }
        );
        assert_eq!(quiz.players()[1].score, 0);
    }

    #[test]
    fn test_answer_at_last_tick_earns_no_bonus() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        for _ in 0..20 {
            quiz.tick();
        }
        assert_eq!(quiz.time_left(), 0);
        let outcome = quiz.submit_answer("alice", 0);
        assert_eq!(
            outcome,
            Submission::Recorded {
                awarded: 100,
                all_answered: false
            }
        );
    }

    #[test]
    fn test_answer_immediately_earns_full_bonus() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        let outcome = quiz.submit_answer("alice", 0);
        assert_eq!(
            outcome,
            Submission::Recorded {
                awarded: 150,
                all_answered: false
            }
        );
    }

    #[test]
    fn test_out_of_range_choice_recorded_as_wrong() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        let outcome = quiz.submit_answer("alice", 99);
        assert_eq!(
            outcome,
            Submission::Recorded {
                awarded: 0,
                all_answered: false
            }
        );
        assert_eq!(quiz.players()[0].answer, Answer::Choice(99));
    }

    #[test]
    fn test_second_submission_is_a_no_op() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        quiz.submit_answer("alice", 0);
        let score = quiz.players()[0].score;
        let first_answer = quiz.players()[0].answer;

        // Retry with a different (also correct-looking) choice.
        assert_eq!(quiz.submit_answer("alice", 1), Submission::Ignored);
        assert_eq!(quiz.players()[0].score, score);
        assert_eq!(quiz.players()[0].answer, first_answer);
    }

    #[test]
    fn test_submission_outside_question_phase_ignored() {
        let mut quiz = two_player_quiz(1);
        assert_eq!(quiz.submit_answer("alice", 0), Submission::Ignored);

        quiz.start("alice").unwrap();
        quiz.close_question();
        assert_eq!(quiz.submit_answer("alice", 0), Submission::Ignored);
    }

    #[test]
    fn test_submission_from_unknown_player_ignored() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        assert_eq!(quiz.submit_answer("mallory", 0), Submission::Ignored);
    }

    #[test]
    fn test_scores_are_monotonically_non_decreasing() {
        let mut quiz = two_player_quiz(3);
        quiz.start("alice").unwrap();
        let mut last = 0;
        for round in 0..3 {
            // Alternate right/wrong answers.
            let choice = if round % 2 == 0 { round % 4 } else { 3 };
            quiz.submit_answer("alice", choice);
            quiz.submit_answer("bob", 3);
            let score = quiz.players()[0].score;
            assert!(score >= last);
            last = score;
            quiz.close_question();
            quiz.advance();
        }
    }

    // -- Timer and reveal --------------------------------------------------

    #[test]
    fn test_close_question_stamps_timeout_sentinel() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        quiz.submit_answer("alice", 0);

        let correct = quiz.close_question();
        assert_eq!(correct, 0);
        assert_eq!(quiz.phase(), Phase::Reveal);
        assert_eq!(quiz.players()[0].answer, Answer::Choice(0));
        assert_eq!(quiz.players()[1].answer, Answer::TimedOut);
    }

    #[test]
    fn test_tick_saturates_at_zero() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        for _ in 0..25 {
            quiz.tick();
        }
        assert_eq!(quiz.time_left(), 0);
    }

    #[test]
    fn test_tick_outside_question_phase_does_nothing() {
        let mut quiz = two_player_quiz(1);
        assert_eq!(quiz.tick(), 20);
        assert_eq!(quiz.time_left(), 20);
    }

    // -- Advancing ---------------------------------------------------------

    #[test]
    fn test_advance_opens_next_question_with_fresh_state() {
        let mut quiz = two_player_quiz(2);
        quiz.start("alice").unwrap();
        quiz.tick();
        quiz.submit_answer("alice", 0);
        quiz.submit_answer("bob", 1);
        quiz.close_question();

        assert_eq!(quiz.advance(), Advanced::NextQuestion);
        assert_eq!(quiz.phase(), Phase::Question);
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.time_left(), 20);
        assert!(quiz.players().iter().all(|p| p.answer == Answer::Unanswered));
    }

    #[test]
    fn test_advance_past_last_question_finishes() {
        let mut quiz = two_player_quiz(1);
        quiz.start("alice").unwrap();
        quiz.close_question();
        assert_eq!(quiz.advance(), Advanced::Finished);
        assert_eq!(quiz.phase(), Phase::Finished);
    }

    #[test]
    fn test_cursor_increases_by_one_and_never_exceeds_len() {
        let mut quiz = two_player_quiz(3);
        quiz.start("alice").unwrap();
        for expected in 1..=3 {
            quiz.close_question();
            quiz.advance();
            assert_eq!(quiz.current_index(), expected);
            assert!(quiz.current_index() <= 3);
        }
        assert_eq!(quiz.phase(), Phase::Finished);
    }

    #[test]
    fn test_final_scores_equal_sum_of_per_question_awards() {
        let mut quiz = two_player_quiz(3);
        quiz.start("alice").unwrap();
        let mut expected = 0;
        for _ in 0..3 {
            let correct = quiz.current_question().unwrap().correct;
            for _ in 0..4 {
                quiz.tick();
            }
            if let Submission::Recorded { awarded, .. } = quiz.submit_answer("alice", correct) {
                expected += awarded;
            }
            quiz.submit_answer("bob", usize::MAX);
            quiz.close_question();
            quiz.advance();
        }
        assert_eq!(quiz.phase(), Phase::Finished);
        assert_eq!(quiz.players()[0].score, expected);
        assert_eq!(quiz.players()[1].score, 0);
    }
}
