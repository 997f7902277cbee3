//! Signed-in user profile.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// Name shown when a user has no first or last name.
pub const DEFAULT_DISPLAY_NAME: &str = "Madstore Member";

/// Avatar shown when a user has no profile picture.
pub const DEFAULT_AVATAR: &str = "/static/default-avatar.svg";

/// A user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<UserId>,
    pub email: Email,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl User {
    /// First and last name joined, or [`DEFAULT_DISPLAY_NAME`].
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            DEFAULT_DISPLAY_NAME.to_owned()
        } else {
            name
        }
    }

    /// Profile picture URL, or [`DEFAULT_AVATAR`].
    #[must_use]
    pub fn avatar_url(&self) -> &str {
        self.profile_picture_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_AVATAR)
    }
}
