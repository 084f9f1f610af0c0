//! The two capabilities the room core needs from collaborators.
//!
//! The engine never talks to a database or an HTTP API. It asks a
//! [`QuestionSource`] for questions once per room creation, and hands a
//! [`ScoreSink`] each player's final score once per quiz. Both are
//! traits so production wires in real storage while tests wire in static
//! banks and recording sinks — no framework code changes either way.

use quizwire_engine::Question;

/// Error from a question source.
#[derive(Debug, Clone, thiserror::Error)]
#[error("question source failed: {0}")]
pub struct SourceError(pub String);

/// Error from a score sink.
#[derive(Debug, Clone, thiserror::Error)]
#[error("score sink failed: {0}")]
pub struct SinkError(pub String);

/// Provides questions for a domain.
///
/// May return fewer questions than requested — including zero. The room
/// layer treats the returned length as the quiz's real question count.
pub trait QuestionSource: Send + Sync + 'static {
    /// Fetches up to `count` questions for `domain`.
    fn fetch(
        &self,
        domain: &str,
        count: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Question>, SourceError>> + Send;
}

/// Persists final per-player scores.
///
/// Best-effort by contract: a failure is logged by the caller and never
/// blocks room teardown.
pub trait ScoreSink: Send + Sync + 'static {
    /// Records one player's final score for a finished quiz.
    fn persist(
        &self,
        username: &str,
        score: u32,
        domain: &str,
    ) -> impl std::future::Future<Output = Result<(), SinkError>> + Send;
}
