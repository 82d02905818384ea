#![forbid(unsafe_code)]
//! Seams for host-provided secret storage and password prompts.
//!
//! The host supplies a [`CredentialStore`] and a [`PasswordPrompt`];
//! [`PasswordSafe`] combines them. Enable the `keyring` feature for a store backed
//! by the operating system keychain.

mod error;
#[cfg(feature = "keyring")]
mod keychain;
mod prompt;
mod safe;
mod secret;
mod store;

pub use error::CredentialError;
#[cfg(feature = "keyring")]
pub use keychain::KeyringStore;
pub use prompt::{PasswordPrompt, PromptOutcome, PromptRequest};
pub use safe::PasswordSafe;
pub use secret::Secret;
pub use store::{CredentialStore, MemoryCredentialStore, ServiceKey};
