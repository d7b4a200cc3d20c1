//! Local storage keys for session data.

/// Storage keys for authentication data.
pub mod keys {
    /// Key for the current signed-in identity (JSON object).
    pub const CURRENT_USER: &str = "user";

    /// Key for the local credential records (JSON array).
    pub const CREDENTIALS: &str = "users";
}
