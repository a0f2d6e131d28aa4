//! Request-facing user profile.
//!
//! Credentials never pass through here; the auth service owns those. This is
//! the identity the rest of the application reads and the profile endpoint
//! edits.

use crate::orm::users;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use serde::Serialize;

/// A struct to hold the public identity of a user.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<users::Model> for Profile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

impl Profile {
    /// Returns the profile for a user id, if the user exists.
    pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<Self>, DbErr> {
        Ok(users::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Self::from))
    }

    /// Full name when both parts are set, username otherwise.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) if !first.is_empty() && !last.is_empty() => {
                format!("{} {}", first, last)
            }
            _ => self.username.clone(),
        }
    }
}
