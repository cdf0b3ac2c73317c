use thiserror::Error;

/// Errors raised while compiling a lesson or driving a drill session.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DrillError {
    /// Lesson content is structurally invalid; the lesson cannot be played.
    #[error("malformed lesson: {0}")]
    MalformedLesson(String),
    /// `advance()` called before the current drill was checked or completed.
    #[error("current drill is not ready to advance")]
    NotReady,
    #[error("drill queue is empty")]
    EmptyQueue,
    #[error("session already complete")]
    SessionAlreadyComplete,
    #[error("{action} does not apply to a {kind} drill")]
    KindMismatch {
        action: &'static str,
        kind: &'static str,
    },
    #[error("feedback is already shown for this drill")]
    FeedbackLocked,
    #[error("no {what} at position {position}")]
    OutOfRange { what: &'static str, position: usize },
    #[error("token at bag position {0} is already placed")]
    TokenInUse(usize),
    #[error("unknown pairing key: {0}")]
    UnknownPairKey(String),
    #[error("pairing key already matched: {0}")]
    AlreadyMatched(String),
}

impl DrillError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DrillError::MalformedLesson(reason.into())
    }
}
