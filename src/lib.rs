// Library surface for the terminal host, replay, and integration tests.
pub mod analyzer;
pub mod app;
pub mod app_dirs;
pub mod cheat;
pub mod classify;
pub mod clipboard;
pub mod clock;
pub mod config;
pub mod error;
pub mod exercise;
pub mod history;
pub mod metrics;
pub mod payload;
pub mod replay;
pub mod runtime;
pub mod scoring;
pub mod script;
pub mod session;
pub mod share;
pub mod ui;
pub mod util;

pub use analyzer::TypingSession;
pub use error::{ExerciseError, ValidationError};
pub use metrics::TypingMetrics;
pub use payload::ExercisePayload;
pub use scoring::{score_from_metrics, ScoreReport};
