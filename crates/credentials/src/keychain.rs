//! System keychain backend (macOS Keychain, Secret Service, Windows Credential Manager).

use keyring::Entry;
use tracing::debug;

use crate::{CredentialError, CredentialStore, Secret, ServiceKey};

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringStore;

impl KeyringStore {
    pub fn new() -> Self {
        Self
    }
}

fn keyring_error(key: &ServiceKey, e: keyring::Error) -> CredentialError {
    CredentialError::Backend {
        key: key.to_string(),
        message: format!("keychain error: {e}"),
    }
}

fn entry(key: &ServiceKey) -> Result<Entry, CredentialError> {
    Entry::new(key.service(), key.account()).map_err(|e| keyring_error(key, e))
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: &ServiceKey) -> Result<Option<Secret>, CredentialError> {
        match entry(key)?.get_secret() {
            Ok(bytes) => Ok(Some(Secret::from(bytes))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_error(key, e)),
        }
    }

    fn set(&self, key: &ServiceKey, secret: Option<&Secret>) -> Result<(), CredentialError> {
        let entry = entry(key)?;
        match secret {
            Some(secret) => entry
                .set_secret(secret.expose())
                .map_err(|e| keyring_error(key, e)),
            None => match entry.delete_credential() {
                Ok(()) => Ok(()),
                Err(keyring::Error::NoEntry) => {
                    debug!(%key, "keychain entry already absent");
                    Ok(())
                }
                Err(e) => Err(keyring_error(key, e)),
            },
        }
    }
}
