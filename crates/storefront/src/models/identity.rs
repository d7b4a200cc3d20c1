//! Identity domain types.

use serde::{Deserialize, Serialize};

use tienda_core::{Email, PasswordDigest, UserId};

/// The signed-in user.
///
/// Public projection of a [`StoredCredential`]: no secret material. The email
/// is the key that correlates the identity with its server cart and orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Local account ID (millisecond timestamp of registration).
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, also the cart user key.
    pub email: Email,
}

/// A local credential record, persisted in the credential list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    /// Local account ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique within the credential list).
    pub email: Email,
    /// Argon2 digest of the password.
    pub password_hash: PasswordDigest,
}

impl StoredCredential {
    /// The public identity for this record.
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}
