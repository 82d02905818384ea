use tracing::debug;

use crate::{
    CredentialError, CredentialStore, PasswordPrompt, PromptOutcome, PromptRequest, Secret,
    ServiceKey,
};

/// Looks secrets up in a store and falls back to asking the user.
#[derive(Debug)]
pub struct PasswordSafe<S, P> {
    store: S,
    prompt: P,
}

impl<S, P> PasswordSafe<S, P>
where
    S: CredentialStore,
    P: PasswordPrompt,
{
    pub fn new(store: S, prompt: P) -> Self {
        Self { store, prompt }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the stored secret, or prompts for one. Answers the user asked to
    /// remember are written back. `Ok(None)` means the prompt was cancelled.
    pub fn get_or_prompt(
        &self,
        key: &ServiceKey,
        request: &PromptRequest,
    ) -> Result<Option<Secret>, CredentialError> {
        if let Some(secret) = self.store.get(key)? {
            debug!(%key, "using stored credential");
            return Ok(Some(secret));
        }

        match self.prompt.ask(key, request) {
            PromptOutcome::Cancelled => {
                debug!(%key, "credential prompt cancelled");
                Ok(None)
            }
            PromptOutcome::Entered { secret, remember } => {
                if remember {
                    self.store.set(key, Some(&secret))?;
                    debug!(%key, "stored entered credential");
                }
                Ok(Some(secret))
            }
        }
    }

    pub fn remember(&self, key: &ServiceKey, secret: &Secret) -> Result<(), CredentialError> {
        self.store.set(key, Some(secret))
    }

    pub fn forget(&self, key: &ServiceKey) -> Result<(), CredentialError> {
        self.store.set(key, None)
    }
}
