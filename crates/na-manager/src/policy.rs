//! Decisions on destructive follow-up actions

/// Decides whether to go ahead with an action the user may not expect.
pub trait Policy: Send + Sync {
    /// Whether to proceed; `prompt` describes the action
    fn should_proceed(&self, prompt: &str) -> bool;
}

/// Always proceed (`--force`)
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAlwaysPolicy;

impl Policy for AllowAlwaysPolicy {
    fn should_proceed(&self, _prompt: &str) -> bool {
        true
    }
}

/// Never proceed (non-interactive without `--force`)
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAlwaysPolicy;

impl Policy for DenyAlwaysPolicy {
    fn should_proceed(&self, _prompt: &str) -> bool {
        false
    }
}

type Confirm = dyn Fn(&str) -> bool + Send + Sync;

/// Ask the user every time
pub struct AskAlwaysPolicy {
    confirm: Box<Confirm>,
}

impl AskAlwaysPolicy {
    /// Ask through `confirm`, which shows the prompt and returns the answer
    pub fn new(confirm: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            confirm: Box::new(confirm),
        }
    }
}

impl Policy for AskAlwaysPolicy {
    fn should_proceed(&self, prompt: &str) -> bool {
        (self.confirm)(prompt)
    }
}
