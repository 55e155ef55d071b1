use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    User,
    Group,
}

/// The owner of a wall.
///
/// VK encodes the owner kind in the sign of `owner_id`: users are positive,
/// communities negative. That convention is confined to [`WallOwner::owner_id`]
/// and [`WallOwner::from_owner_id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WallOwner {
    kind: OwnerKind,
    id: u64,
}

impl WallOwner {
    /// Fails when `id` does not fit the API's signed owner id.
    pub fn new(kind: OwnerKind, id: u64) -> Result<Self> {
        if id == 0 || i64::try_from(id).is_err() {
            return Err(Error::InvalidConfiguration(format!(
                "owner id {} is out of range",
                id
            )));
        }
        Ok(Self { kind, id })
    }

    pub fn user(id: u64) -> Result<Self> {
        Self::new(OwnerKind::User, id)
    }

    pub fn group(id: u64) -> Result<Self> {
        Self::new(OwnerKind::Group, id)
    }

    pub fn kind(&self) -> OwnerKind {
        self.kind
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Signed id as expected by the API
    pub fn owner_id(&self) -> i64 {
        // `new` keeps `id` within 1..=i64::MAX
        let id = self.id as i64;
        match self.kind {
            OwnerKind::User => id,
            OwnerKind::Group => -id,
        }
    }

    pub fn from_owner_id(owner_id: i64) -> Result<Self> {
        match owner_id {
            0 => Err(Error::InvalidConfiguration(
                "owner id 0 is neither a user nor a group".to_string(),
            )),
            id if id > 0 => Self::user(id.unsigned_abs()),
            id => Self::group(id.unsigned_abs()),
        }
    }
}

impl fmt::Display for WallOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            OwnerKind::User => write!(f, "user {}", self.id),
            OwnerKind::Group => write!(f, "group {}", self.id),
        }
    }
}

/// A configured wall: either a signed owner id or a screen name to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Id(i64),
    ScreenName(String),
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidConfiguration("target is empty".to_string()));
        }

        match s.parse::<i64>() {
            Ok(id) => Ok(Target::Id(id)),
            Err(_) => Ok(Target::ScreenName(s.to_string())),
        }
    }
}
