//! Read authorization: identities, grants, and record visibility.
//!
//! An identity reads a game either through a blanket grant (no group) or
//! through grants restricted to individual groups. Records logged without
//! any selected group are visible to blanket-grant holders only.

use crate::error::ApiError;
use crate::record::Record;
use crate::types::GroupId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Action a grant allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    ReadData,
    ReadWrite,
}

/// A single capability held by an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    #[serde(rename = "role")]
    pub action: Action,
    pub game: String,
    /// `None` grants the action on every group of the game.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupId>,
}

impl Grant {
    pub fn blanket(action: Action, game: impl Into<String>) -> Self {
        Self {
            action,
            game: game.into(),
            group: None,
        }
    }

    pub fn for_group(action: Action, game: impl Into<String>, group: GroupId) -> Self {
        Self {
            action,
            game: game.into(),
            group: Some(group),
        }
    }
}

/// Authenticated caller and its grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    #[serde(default)]
    pub grants: Vec<Grant>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, grants: Vec<Grant>) -> Self {
        Self {
            user_id: user_id.into(),
            grants,
        }
    }

    /// Whether the identity may perform `action` on `game`, restricted to
    /// `group` when one is given. A blanket grant satisfies every group.
    pub fn can(&self, action: Action, game: &str, group: Option<&GroupId>) -> bool {
        self.grants.iter().any(|grant| {
            grant.action == action
                && grant.game == game
                && match (&grant.group, group) {
                    (None, _) => true,
                    (Some(granted), Some(wanted)) => granted == wanted,
                    (Some(_), None) => false,
                }
        })
    }

    /// Whether the identity holds any grant of `action` for `game`.
    pub fn has_any(&self, action: Action, game: &str) -> bool {
        self.grants
            .iter()
            .any(|grant| grant.action == action && grant.game == game)
    }
}

/// Whether `identity` may read `record` within `game`.
pub fn is_visible<R: Record>(record: &R, identity: &Identity, game: &str) -> bool {
    if identity.can(Action::ReadData, game, None) {
        return true;
    }
    let groups = record
        .user_payload()
        .map(|payload| payload.selected_group_ids())
        .unwrap_or_default();
    groups
        .iter()
        .any(|group| identity.can(Action::ReadData, game, Some(group)))
}

/// Drop the records `identity` may not read, keeping input order.
pub fn filter_visible<R: Record>(records: Vec<R>, identity: &Identity, game: &str) -> Vec<R> {
    let before = records.len();
    let visible: Vec<R> = records
        .into_iter()
        .filter(|record| is_visible(record, identity, game))
        .collect();
    if visible.len() < before {
        debug!(
            user = %identity.user_id,
            game,
            hidden = before - visible.len(),
            "Records hidden by group scoping"
        );
    }
    visible
}

/// Fail with `Forbidden` unless the identity can read the game at all.
pub fn require_read(identity: &Identity, game: &str) -> Result<(), ApiError> {
    if identity.has_any(Action::ReadData, game) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "user {} cannot read data of game {}",
            identity.user_id, game
        )))
    }
}

/// Resolves request credentials to an identity.
///
/// Token issuance and signature checks live outside this crate; an
/// implementation only has to map a presented credential to an identity.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: Option<&str>) -> Result<Identity, ApiError>;
}

/// Authenticator backed by a fixed table of opaque access tokens.
#[derive(Debug, Default, Clone)]
pub struct TokenAuthenticator {
    tokens: HashMap<String, Identity>,
}

impl TokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }

    pub fn insert(&mut self, token: impl Into<String>, identity: Identity) {
        self.tokens.insert(token.into(), identity);
    }
}

impl Authenticator for TokenAuthenticator {
    fn authenticate(&self, credentials: Option<&str>) -> Result<Identity, ApiError> {
        let raw = credentials
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("no access token".to_string()))?;
        let token = raw.strip_prefix("Bearer ").map(str::trim).unwrap_or(raw);
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("unknown access token".to_string()))
    }
}
