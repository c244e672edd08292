//! Core user domain types.

use std::fmt::Display;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated email address, stored in lowercase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Email(String);

impl Email {
    /// Create an email address from a string.
    ///
    /// Leading and trailing whitespace is removed and the address is
    /// lowercased so that "Alice@Example.com" and "alice@example.com" refer to
    /// the same user.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidEmail] if `raw_email` is not a valid email address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        if EmailAddress::is_valid(&email) {
            Ok(Self(email))
        } else {
            Err(Error::InvalidEmail(raw_email.to_owned()))
        }
    }

    /// Create an email address without validation.
    ///
    /// The caller should ensure that the string is a valid, lowercase email address.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A member of the family using the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The email address the user logs in with.
    pub email: Email,
    /// The user's name, if they have given one.
    pub full_name: Option<String>,
    /// Whether the user can see and manage the data of the whole family.
    pub is_admin: bool,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// When the user was created.
    pub created_at: OffsetDateTime,
}

impl User {
    /// The full name of the user, falling back to their email address.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(self.email.as_ref())
    }

    /// The label for the user's role shown in the users table.
    pub fn role_label(&self) -> &'static str {
        if self.is_admin { "Super Admin" } else { "User" }
    }
}

/// The data needed to create a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: Email,
    pub full_name: Option<String>,
    pub is_admin: bool,
    pub password_hash: PasswordHash,
}

/// Trims `full_name` and treats a blank name as no name.
pub fn normalize_full_name(full_name: Option<&str>) -> Option<String> {
    full_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}
