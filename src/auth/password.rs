//! Password strength checks and bcrypt hashing.

use std::fmt::Display;

use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, zxcvbn};

use crate::Error;

/// A plain text password that zxcvbn scored as strong enough. Turn it into a
/// [PasswordHash] before storing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password`.
    ///
    /// `user_inputs` are the other things the user typed in, such as their
    /// email address and name. Passwords that reuse them score lower.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with zxcvbn's suggestions if the password
    /// scores below three out of four.
    pub fn new(raw_password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let entropy = zxcvbn(raw_password, user_inputs);

        if matches!(entropy.score(), Score::Three | Score::Four) {
            return Ok(Self(raw_password.to_owned()));
        }

        let advice = entropy
            .feedback()
            .map(ToString::to_string)
            .filter(|advice| !advice.trim().is_empty())
            .unwrap_or_else(|| "Add more words or characters.".to_owned());

        Err(Error::TooWeak(advice))
    }

    /// Skip the strength check, e.g. for seeding a test database.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("********")
    }
}

/// A salted bcrypt hash of a password, as stored in the user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// bcrypt's recommended cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds. Tests use a low cost such as 4 to
    /// stay fast.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if bcrypt fails, e.g. for an out of range cost.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash read from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check the strength of `raw_password` and hash it.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] or [Error::HashingError].
    pub fn from_raw_password(
        raw_password: &str,
        user_inputs: &[&str],
        cost: u32,
    ) -> Result<Self, Error> {
        Self::new(ValidatedPassword::new(raw_password, user_inputs)?, cost)
    }

    /// Whether `raw_password` is the password this hash was made from.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the stored hash is malformed.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{PasswordHash, ValidatedPassword};

    // bcrypt hash of "okon".
    const KNOWN_HASH: &str = "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm";

    #[test]
    fn rejects_weak_passwords() {
        for password in ["", "imtooshort", "password1234"] {
            let result = ValidatedPassword::new(password, &[]);

            assert!(matches!(result, Err(Error::TooWeak(_))), "{password:?} was accepted");
        }
    }

    #[test]
    fn accepts_long_password() {
        assert!(ValidatedPassword::new("asomewhatlongpassword1", &[]).is_ok());
    }

    #[test]
    fn rejects_password_made_of_user_inputs() {
        let email = "nana.hubbard@cupboard.example.com";

        let result = ValidatedPassword::new(email, &[email, "Nana Hubbard"]);

        assert!(matches!(result, Err(Error::TooWeak(advice)) if !advice.is_empty()));
    }

    #[test]
    fn display_hides_password() {
        let password = ValidatedPassword::new_unchecked("supersecret");

        assert_eq!(password.to_string(), "********");
    }

    #[test]
    fn verify_known_hash() {
        let hash = PasswordHash::new_unchecked(KNOWN_HASH);

        assert!(hash.verify("okon").unwrap());
        assert!(!hash.verify("thewrongpassword").unwrap());
    }

    #[test]
    fn verify_fails_on_malformed_hash() {
        let hash = PasswordHash::new_unchecked("definitely not a bcrypt hash");

        assert!(matches!(hash.verify("okon"), Err(Error::HashingError(_))));
    }

    #[test]
    fn hashes_are_salted() {
        let password = ValidatedPassword::new("turkeysgogobblegobble", &[]).unwrap();

        let first = PasswordHash::new(password.clone(), 4).unwrap();
        let second = PasswordHash::new(password, 4).unwrap();

        assert_ne!(first, second);
        assert!(first.verify("turkeysgogobblegobble").unwrap());
        assert!(second.verify("turkeysgogobblegobble").unwrap());
    }

    #[test]
    fn from_raw_password_checks_strength() {
        assert!(PasswordHash::from_raw_password("password1234", &[], 4).is_err());
        assert!(PasswordHash::from_raw_password("thisisaverysecurepassword!!!!", &[], 4).is_ok());
    }
}
