use std::{
    collections::HashMap,
    fmt,
    sync::{Mutex, PoisonError},
};

use crate::{CredentialError, Secret};

/// Identifies one stored secret: the owning service and an account within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceKey {
    service: String,
    account: String,
}

impl ServiceKey {
    pub fn new(
        service: impl Into<String>,
        account: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let service = service.into();
        if service.trim().is_empty() {
            return Err(CredentialError::InvalidKey(
                "service name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            service,
            account: account.into(),
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.account)
    }
}

/// Host-provided secret storage.
pub trait CredentialStore {
    fn get(&self, key: &ServiceKey) -> Result<Option<Secret>, CredentialError>;

    /// Stores `secret`, or removes the entry when it is `None`.
    fn set(&self, key: &ServiceKey, secret: Option<&Secret>) -> Result<(), CredentialError>;
}

/// Process-local store, mostly for tests and hosts without a keychain.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<ServiceKey, Secret>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("entries", &self.len())
            .finish()
    }
}

fn poisoned(key: &ServiceKey) -> CredentialError {
    CredentialError::Backend {
        key: key.to_string(),
        message: "memory store lock poisoned".to_string(),
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &ServiceKey) -> Result<Option<Secret>, CredentialError> {
        let entries = self.entries.lock().map_err(|_| poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &ServiceKey, secret: Option<&Secret>) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().map_err(|_| poisoned(key))?;
        match secret {
            Some(secret) => {
                entries.insert(key.clone(), secret.clone());
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(())
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for &S {
    fn get(&self, key: &ServiceKey) -> Result<Option<Secret>, CredentialError> {
        (**self).get(key)
    }

    fn set(&self, key: &ServiceKey, secret: Option<&Secret>) -> Result<(), CredentialError> {
        (**self).set(key, secret)
    }
}
