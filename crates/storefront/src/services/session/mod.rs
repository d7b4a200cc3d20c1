//! Session store.
//!
//! Holds the signed-in [`Identity`] and the local credential records, both
//! persisted through [`LocalStorage`]:
//!
//! - `user` - the current identity
//! - `users` - every registered [`StoredCredential`], passwords as Argon2 digests
//!
//! Authentication is checked against the local credential records; the email
//! is the key that ties an identity to its server cart and orders. Every
//! mutation rewrites the whole record (last write wins, no locking).

mod error;

pub use error::AuthError;

use std::collections::BTreeSet;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use tienda_core::{Email, PasswordDigest, UserId};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::session::keys;
use crate::models::{Identity, StoredCredential};
use crate::storage::{LocalStorage, StorageError, read_json, write_json};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Session store over a [`LocalStorage`] backend.
pub struct SessionStore<S> {
    storage: S,
    current: Option<Identity>,
    hasher: Argon2<'static>,
}

impl<S: LocalStorage> SessionStore<S> {
    /// Open the session, restoring a previously stored identity.
    ///
    /// A stored identity that cannot be decoded is removed and the session
    /// starts signed out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the storage backend fails.
    pub fn open(storage: S) -> Result<Self, AuthError> {
        Self::with_argon2(storage, Argon2::default())
    }

    /// Open the session with explicit Argon2 parameters.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the storage backend fails.
    pub fn with_argon2(mut storage: S, hasher: Argon2<'static>) -> Result<Self, AuthError> {
        let current = match read_json::<_, Identity>(&storage, keys::CURRENT_USER) {
            Ok(identity) => identity,
            Err(StorageError::Serialize(e)) => {
                warn!(error = %e, "Discarding corrupt stored identity");
                storage.remove_item(keys::CURRENT_USER)?;
                None
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(identity) = &current {
            set_sentry_user(&identity.id, Some(identity.email.as_str()));
        }

        Ok(Self {
            storage,
            current,
            hasher,
        })
    }

    /// Argon2 tuned for speed, for tests and throwaway sessions.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if the parameters are rejected.
    pub fn fast_hasher() -> Result<Argon2<'static>, AuthError> {
        let params =
            Params::new(Params::MIN_M_COST, 1, 1, None).map_err(|_| AuthError::PasswordHash)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Identity> {
        self.current.as_ref()
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if no record matches.
    #[instrument(skip(self, password))]
    pub fn login(&mut self, email: &str, password: &SecretString) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;

        let credentials = self.credentials()?;
        let record = find_by_email(&credentials, &email).ok_or(AuthError::InvalidCredentials)?;
        self.verify_password(password.expose_secret(), &record.password_hash)?;

        let identity = record.identity();
        self.set_current(identity.clone())?;
        info!(user_id = %identity.id, "Signed in");
        Ok(identity)
    }

    /// Create a credential record and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is empty.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    #[instrument(skip(self, password))]
    pub fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Identity, AuthError> {
        let name = required(name, "name")?;
        let email = required(email, "email")?;
        let password = password.expose_secret();
        if password.is_empty() {
            return Err(AuthError::Validation("password"));
        }

        let email = Email::parse(email)?;
        validate_password(password)?;

        let mut credentials = self.credentials()?;
        if find_by_email(&credentials, &email).is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let record = StoredCredential {
            id: next_user_id(&credentials),
            name: name.to_string(),
            email,
            password_hash: self.hash_password(password)?,
        };
        let identity = record.identity();

        credentials.push(record);
        write_json(&mut self.storage, keys::CREDENTIALS, &credentials)?;
        self.set_current(identity.clone())?;

        info!(user_id = %identity.id, "Registered account");
        Ok(identity)
    }

    /// Sign out. Signing out while signed out is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored identity cannot be removed.
    #[instrument(skip(self))]
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.storage.remove_item(keys::CURRENT_USER)?;
        if self.current.take().is_some() {
            clear_sentry_user();
            info!("Signed out");
        }
        Ok(())
    }

    // =========================================================================
    // Account Management
    // =========================================================================

    /// Rename the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` if nobody is signed in.
    /// Returns `AuthError::Validation` if the name is empty.
    /// Returns `AuthError::UserNotFound` if the credential record is gone.
    #[instrument(skip(self))]
    pub fn update_name(&mut self, name: &str) -> Result<Identity, AuthError> {
        let current = self.current.clone().ok_or(AuthError::NotAuthenticated)?;
        let name = required(name, "name")?;

        let mut credentials = self.credentials()?;
        let record = find_by_email_mut(&mut credentials, &current.email)
            .ok_or(AuthError::UserNotFound)?;
        name.clone_into(&mut record.name);
        let identity = record.identity();

        write_json(&mut self.storage, keys::CREDENTIALS, &credentials)?;
        self.set_current(identity.clone())?;
        Ok(identity)
    }

    /// Change the password of the account with `email`.
    ///
    /// Checks run in order: the account exists, the old password matches,
    /// the new password is long enough.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no record has the email.
    /// Returns `AuthError::InvalidCredentials` if `old` does not match.
    /// Returns `AuthError::WeakPassword` if `new` is too short.
    #[instrument(skip(self, old, new))]
    pub fn change_password(
        &mut self,
        email: &str,
        old: &SecretString,
        new: &SecretString,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let mut credentials = self.credentials()?;
        let digest = find_by_email(&credentials, &email)
            .map(|record| record.password_hash.clone())
            .ok_or(AuthError::UserNotFound)?;
        self.verify_password(old.expose_secret(), &digest)?;
        validate_password(new.expose_secret())?;

        let new_digest = self.hash_password(new.expose_secret())?;
        if let Some(record) = find_by_email_mut(&mut credentials, &email) {
            record.password_hash = new_digest;
        }
        write_json(&mut self.storage, keys::CREDENTIALS, &credentials)?;
        Ok(())
    }

    /// Whether an account with `email` exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the credential records cannot be read.
    pub fn account_exists(&self, email: &str) -> Result<bool, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(false);
        };
        Ok(find_by_email(&self.credentials()?, &email).is_some())
    }

    /// Set a new password without the old one (password recovery).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no record has the email.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    #[instrument(skip(self, new))]
    pub fn reset_password(&mut self, email: &str, new: &SecretString) -> Result<(), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::UserNotFound)?;

        let mut credentials = self.credentials()?;
        if find_by_email(&credentials, &email).is_none() {
            return Err(AuthError::UserNotFound);
        }
        validate_password(new.expose_secret())?;

        let digest = self.hash_password(new.expose_secret())?;
        if let Some(record) = find_by_email_mut(&mut credentials, &email) {
            record.password_hash = digest;
        }
        write_json(&mut self.storage, keys::CREDENTIALS, &credentials)?;
        info!("Password reset");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Read the credential records; an undecodable list reads as empty.
    fn credentials(&self) -> Result<Vec<StoredCredential>, AuthError> {
        match read_json(&self.storage, keys::CREDENTIALS) {
            Ok(records) => Ok(records.unwrap_or_default()),
            Err(StorageError::Serialize(e)) => {
                warn!(error = %e, "Ignoring corrupt credential records");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn set_current(&mut self, identity: Identity) -> Result<(), AuthError> {
        write_json(&mut self.storage, keys::CURRENT_USER, &identity)?;
        set_sentry_user(&identity.id, Some(identity.email.as_str()));
        self.current = Some(identity);
        Ok(())
    }

    fn hash_password(&self, password: &str) -> Result<PasswordDigest, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.hasher
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| PasswordDigest::new(hash.to_string()))
            .map_err(|_| AuthError::PasswordHash)
    }

    fn verify_password(&self, password: &str, digest: &PasswordDigest) -> Result<(), AuthError> {
        let parsed_hash =
            PasswordHash::new(digest.as_str()).map_err(|_| AuthError::InvalidCredentials)?;
        self.hasher
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::Validation(field));
    }
    Ok(value)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

fn find_by_email<'a>(records: &'a [StoredCredential], email: &Email) -> Option<&'a StoredCredential> {
    records.iter().find(|r| r.email == *email)
}

fn find_by_email_mut<'a>(
    records: &'a mut [StoredCredential],
    email: &Email,
) -> Option<&'a mut StoredCredential> {
    records.iter_mut().find(|r| r.email == *email)
}

/// Registration timestamp in milliseconds, bumped past any existing ID.
///
/// When a stored record already holds `i64::MAX`, the first free ID from the
/// timestamp onwards is used instead.
fn next_user_id(records: &[StoredCredential]) -> UserId {
    let now = chrono::Utc::now().timestamp_millis();
    let taken: BTreeSet<i64> = records.iter().map(|r| r.id.as_i64()).collect();
    let id = match taken.last() {
        None => now,
        Some(last) => last.checked_add(1).map_or_else(
            || {
                (now..=i64::MAX)
                    .chain(1..now)
                    .find(|id| !taken.contains(id))
                    .unwrap_or(now)
            },
            |after_last| now.max(after_last),
        ),
    };
    UserId::new(id)
}
