//! Final score reporting.
//!
//! The remote high-score backend is a collaborator behind the [`ScoreSink`]
//! trait. Submission is best effort: failures are logged and never retried.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Final result of one match, submitted at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub player_name: String,
    pub score: u32,
}

impl ScoreSubmission {
    pub fn new(player_name: impl Into<String>, score: u32) -> Self {
        Self {
            player_name: player_name.into(),
            score,
        }
    }
}

/// Errors a score backend can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("score backend unavailable: {0}")]
    Unavailable(String),
    #[error("score rejected: {0}")]
    Rejected(String),
}

/// Destination for final scores.
pub trait ScoreSink: Send + Sync + 'static {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<(), SubmitError>;
}

/// Sink that only writes the score to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogScoreSink;

impl ScoreSink for LogScoreSink {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<(), SubmitError> {
        info!(
            "final score for {}: {}",
            submission.player_name, submission.score
        );
        Ok(())
    }
}

/// Resource wrapping the active [`ScoreSink`].
///
/// # Example
/// ```
/// use bevy_tank_battle::scoring::{LogScoreSink, ScoreReporter, ScoreSubmission};
///
/// let mut reporter = ScoreReporter::new(LogScoreSink);
/// assert!(reporter.report(ScoreSubmission::new("ada", 120)));
/// assert_eq!(reporter.attempts(), 1);
/// ```
#[derive(Resource)]
pub struct ScoreReporter {
    sink: Box<dyn ScoreSink>,
    attempts: u32,
    failures: u32,
}

impl Default for ScoreReporter {
    fn default() -> Self {
        Self::new(LogScoreSink)
    }
}

impl ScoreReporter {
    pub fn new(sink: impl ScoreSink) -> Self {
        Self {
            sink: Box::new(sink),
            attempts: 0,
            failures: 0,
        }
    }

    /// Submits a score, logging failures. Returns whether the sink accepted it.
    pub fn report(&mut self, submission: ScoreSubmission) -> bool {
        self.attempts += 1;
        match self.sink.submit(&submission) {
            Ok(()) => true,
            Err(err) => {
                self.failures += 1;
                warn!(
                    "score submission for {} failed: {err}",
                    submission.player_name
                );
                false
            }
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}
