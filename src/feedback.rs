//! Per-rep user feedback (haptics, sound, terminal bell).
//!
//! Delivery is best effort: sessions log failures and carry on.

use colored::*;
use std::io::Write;

use crate::error::FeedbackError;

/// Fire-and-forget notification for a confirmed repetition
pub trait RepFeedback {
    fn rep_completed(&self, rep_number: u32) -> Result<(), FeedbackError>;
}

/// Prints a line (and optionally rings the terminal bell) per rep
pub struct TerminalFeedback {
    bell: bool,
}

impl TerminalFeedback {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl RepFeedback for TerminalFeedback {
    fn rep_completed(&self, rep_number: u32) -> Result<(), FeedbackError> {
        let mut stdout = std::io::stdout().lock();
        if self.bell {
            write!(stdout, "\x07").map_err(|e| FeedbackError::Delivery(e.to_string()))?;
        }
        writeln!(stdout, "  {} rep {}", "●".green(), rep_number.to_string().bold())
            .map_err(|e| FeedbackError::Delivery(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| FeedbackError::Delivery(e.to_string()))
    }
}

/// No-op feedback for headless runs
#[derive(Debug, Default)]
pub struct SilentFeedback;

impl RepFeedback for SilentFeedback {
    fn rep_completed(&self, _rep_number: u32) -> Result<(), FeedbackError> {
        Ok(())
    }
}

impl<F: RepFeedback + ?Sized> RepFeedback for Box<F> {
    fn rep_completed(&self, rep_number: u32) -> Result<(), FeedbackError> {
        (**self).rep_completed(rep_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_feedback_never_fails() {
        let feedback = SilentFeedback;
        for rep in 1..=5 {
            assert!(feedback.rep_completed(rep).is_ok());
        }
    }

    #[test]
    fn test_boxed_feedback_delegates() {
        let feedback: Box<dyn RepFeedback> = Box::new(SilentFeedback);
        assert!(feedback.rep_completed(1).is_ok());
    }
}
