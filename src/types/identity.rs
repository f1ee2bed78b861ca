//! User identity, profile, and session types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::{AccessToken, UserId};

/// A stable reference to a user: id plus display attributes.
///
/// Identities are issued by the backend (search results, profiles) or the identity
/// provider (sessions) and are never mutated client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,

    /// Shown in rosters and search results. The backend calls this `username`.
    #[serde(rename = "username")]
    pub display_name: String,

    /// Avatar image URL, if the user uploaded one.
    #[serde(rename = "photo_url", default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Identity {
            id: id.into(),
            display_name: display_name.into(),
            avatar_ref: None,
        }
    }

    pub fn with_avatar(mut self, avatar_ref: impl Into<String>) -> Self {
        self.avatar_ref = Some(avatar_ref.into());
        self
    }
}

/// The backend-owned profile record for a user.
///
/// A freshly signed-up account has no profile until the user completes one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// In-game handles keyed by game name.
    #[serde(default)]
    pub game_ids: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub social_links: BTreeMap<String, serde_json::Value>,
}

impl Profile {
    /// Projects the profile into the identity shown on rosters.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            display_name: self.username.clone(),
            avatar_ref: self.photo_url.clone(),
        }
    }
}

/// An authenticated session issued by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: AccessToken,
    pub identity: Identity,
}

impl Session {
    pub fn new(access_token: AccessToken, identity: Identity) -> Self {
        Session {
            access_token,
            identity,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.identity.id
    }
}
