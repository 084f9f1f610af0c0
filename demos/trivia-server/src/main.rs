//! A runnable trivia server backed by an in-memory question bank.
//!
//! Binds on 127.0.0.1:5000 (override with `QUIZWIRE_ADDR`) and logs
//! final scores instead of persisting them. Point any WebSocket client
//! at it and send `createRoom` / `joinRoom` commands as JSON text
//! frames.

use quizwire::prelude::*;
use quizwire_engine::Question;
use rand::seq::SliceRandom;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// Serves from a fixed in-memory bank. `"Mixed"` draws a random sample
/// across every domain; any other domain filters the bank.
struct BankSource {
    bank: Vec<Question>,
}

impl BankSource {
    fn builtin() -> Self {
        let q = |text: &str, options: [&str; 4], correct: usize, domain: &str| {
            Question::new(
                text,
                options.iter().map(|o| o.to_string()).collect(),
                correct,
                domain,
            )
        };

        let bank = vec![
            q("What is 17 × 6?", ["96", "102", "106", "112"], 1, "Quant"),
            q(
                "A train covers 180 km in 2.5 hours. What is its average speed?",
                ["68 km/h", "70 km/h", "72 km/h", "75 km/h"],
                2,
                "Quant",
            ),
            q(
                "What is 15% of 240?",
                ["30", "32", "36", "40"],
                2,
                "Quant",
            ),
            q(
                "If 3x + 7 = 25, what is x?",
                ["4", "5", "6", "7"],
                2,
                "Quant",
            ),
            q(
                "Which word is a synonym of 'lucid'?",
                ["opaque", "clear", "heavy", "rapid"],
                1,
                "Verbal",
            ),
            q(
                "Which word is an antonym of 'frugal'?",
                ["thrifty", "austere", "lavish", "sparse"],
                2,
                "Verbal",
            ),
            q(
                "Choose the correctly spelled word.",
                ["accomodate", "accommodate", "acommodate", "accommodat"],
                1,
                "Verbal",
            ),
            q(
                "'Ephemeral' most nearly means:",
                ["eternal", "fleeting", "fragile", "luminous"],
                1,
                "Verbal",
            ),
            q(
                "Which number continues the sequence 2, 6, 12, 20, 30, …?",
                ["40", "42", "44", "46"],
                1,
                "Logic",
            ),
            q(
                "All bloops are razzies. All razzies are lazzies. Are all bloops lazzies?",
                ["yes", "no", "cannot say", "only some"],
                0,
                "Logic",
            ),
            q(
                "Which shape does not belong: square, triangle, circle, cube?",
                ["square", "triangle", "circle", "cube"],
                3,
                "Logic",
            ),
            q(
                "If yesterday was two days before Friday, what is tomorrow?",
                ["Friday", "Saturday", "Sunday", "Thursday"],
                1,
                "Logic",
            ),
        ];

        Self { bank }
    }

    fn sample(&self, domain: &str, count: usize) -> Vec<Question> {
        let mut picked: Vec<Question> = if domain == "Mixed" {
            self.bank.clone()
        } else {
            self.bank
                .iter()
                .filter(|q| q.domain == domain)
                .cloned()
                .collect()
        };
        picked.shuffle(&mut rand::rng());
        picked.truncate(count);
        picked
    }
}

impl QuestionSource for BankSource {
    async fn fetch(&self, domain: &str, count: usize) -> Result<Vec<Question>, SourceError> {
        Ok(self.sample(domain, count))
    }
}

// ---------------------------------------------------------------------------
// Score sink
// ---------------------------------------------------------------------------

/// Logs final scores instead of writing them anywhere.
struct LogSink;

impl ScoreSink for LogSink {
    async fn persist(&self, username: &str, score: u32, domain: &str) -> Result<(), SinkError> {
        tracing::info!(%username, score, %domain, "final score");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), QuizwireError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("QUIZWIRE_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());

    let server = QuizServer::<BankSource, LogSink>::builder()
        .bind(&addr)
        .build(BankSource::builtin(), LogSink)
        .await?;

    server.run().await
}
