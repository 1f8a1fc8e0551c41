use thiserror::Error;

/// Reasons a finished attempt cannot be accepted. Both are recoverable by
/// retyping; the host discards the session and starts a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("only {typed} of {required} required characters typed")]
    IncompleteInput { typed: usize, required: usize },

    #[error("flagged session finished with {accuracy}% accuracy")]
    InvalidCheatSession { accuracy: u32 },
}

impl ValidationError {
    /// Corrective instruction shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::IncompleteInput { .. } => {
                "Please type at least 50% of the text to continue."
            }
            ValidationError::InvalidCheatSession { .. } => {
                "Invalid test detected! Please restart and type the actual text."
            }
        }
    }

    /// Whether the host must throw away the current attempt.
    pub fn requires_restart(&self) -> bool {
        matches!(self, ValidationError::InvalidCheatSession { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("{0} out of bounds: {1}")]
    OutOfBounds(&'static str, u64),
    #[error("inconsistent metrics: {0}")]
    Inconsistent(&'static str),
}

#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error("unknown language pair '{0}'")]
    UnknownLanguagePair(String),
    #[error("{pair} has no exercise {number}")]
    NoSuchExercise { pair: String, number: usize },
    #[error("exercise bundle {0} is missing")]
    MissingBundle(String),
    #[error("exercise bundle {0} is malformed: {1}")]
    MalformedBundle(String, #[source] serde_json::Error),
}

/// Failures of a headless replay run.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read replay script: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed replay script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Exercise(#[from] ExerciseError),
    #[error("attempt rejected: {0}")]
    Rejected(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let incomplete = ValidationError::IncompleteInput {
            typed: 4,
            required: 10,
        };
        assert_eq!(incomplete.to_string(), "only 4 of 10 required characters typed");
        assert!(incomplete.user_message().contains("50%"));
        assert!(!incomplete.requires_restart());

        let cheat = ValidationError::InvalidCheatSession { accuracy: 20 };
        assert!(cheat.requires_restart());
        assert!(cheat.user_message().contains("restart"));
    }
}
