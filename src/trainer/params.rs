use std::time::Duration;

/// When a session gives up on the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Wrong moves are only ever corrected; `Status::Failed` is never entered.
    #[default]
    Never,
    /// The session fails once this many wrong-but-legal moves were made.
    MistakeLimit(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct TrainerParams {
    pub reply_delay: Duration,
    pub failure_policy: FailurePolicy,
    /// Show the expected move in the corrective message.
    pub reveal_expected: bool,
}

impl Default for TrainerParams {
    fn default() -> Self {
        Self { reply_delay: Duration::from_millis(500), failure_policy: FailurePolicy::Never, reveal_expected: true }
    }
}
