//! Authorization checks for the logged in user.
//!
//! Every handler that reads or changes family data loads an [Actor] first and
//! asks it which rows the user may see. Admins see everything, everyone else
//! only sees the rows they own.

use rusqlite::Connection;

use crate::{
    Error,
    user::{UserID, get_user_by_id},
};

/// The user making a request, along with what they are allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// The ID of the logged in user.
    pub user_id: UserID,
    /// Whether the user can see and change the data of every user.
    pub is_admin: bool,
}

impl Actor {
    /// Load the role of the user with `user_id` from the database.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] if the user has been deleted since their
    /// auth cookie was issued, or an [Error::SqlError] if the query fails.
    pub fn load(user_id: UserID, connection: &Connection) -> Result<Self, Error> {
        let user = get_user_by_id(user_id, connection)?;

        Ok(Self {
            user_id: user.id,
            is_admin: user.is_admin,
        })
    }

    /// The owner to filter queries by, or `None` to include every user's rows.
    pub fn owner_scope(&self) -> Option<UserID> {
        if self.is_admin {
            None
        } else {
            Some(self.user_id)
        }
    }

    /// Whether the actor may read or change a row owned by `owner`.
    pub fn can_access(&self, owner: UserID) -> bool {
        self.is_admin || self.user_id == owner
    }

    /// Check that the actor may access a row owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [Error::NotFound] rather than [Error::Forbidden] so that users
    /// cannot probe for the IDs of other users' rows.
    pub fn ensure_can_access(&self, owner: UserID) -> Result<(), Error> {
        if self.can_access(owner) {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// Check that the actor is an admin.
    ///
    /// # Errors
    ///
    /// Returns [Error::Forbidden] for regular users.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.is_admin {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}
