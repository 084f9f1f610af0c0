//! Question records served by a question source.

use serde::{Deserialize, Serialize};

/// One multiple-choice question.
///
/// Selected once at room creation and never mutated for the room's
/// lifetime. `correct` indexes into `options`; clients only ever see it
/// in a reveal broadcast, never alongside the question itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The question text shown to players.
    pub text: String,
    /// Ordered answer options (at least 2).
    pub options: Vec<String>,
    /// Index of the correct option.
    pub correct: usize,
    /// Domain tag, e.g. "Quant" or "Verbal".
    pub domain: String,
}

impl Question {
    /// Creates a question, mostly useful in tests and demo banks.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct: usize,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            options,
            correct,
            domain: domain.into(),
        }
    }
}
