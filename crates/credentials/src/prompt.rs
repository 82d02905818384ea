use crate::{Secret, ServiceKey};

/// What to show the user when a secret has to be entered interactively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub title: String,
    pub message: String,
    /// Initial state of the "remember" checkbox.
    pub remember_default: bool,
}

impl PromptRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            remember_default: true,
        }
    }

    pub fn remember_default(mut self, remember: bool) -> Self {
        self.remember_default = remember;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    Entered { secret: Secret, remember: bool },
    Cancelled,
}

/// Host-provided modal input.
pub trait PasswordPrompt {
    fn ask(&self, key: &ServiceKey, request: &PromptRequest) -> PromptOutcome;
}

impl<F> PasswordPrompt for F
where
    F: Fn(&ServiceKey, &PromptRequest) -> PromptOutcome,
{
    fn ask(&self, key: &ServiceKey, request: &PromptRequest) -> PromptOutcome {
        self(key, request)
    }
}
