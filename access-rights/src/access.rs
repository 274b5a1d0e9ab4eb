// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RightsError;

/// The three access levels which can be granted to a principal. Greater access levels are assumed
/// to also contain all lower ones.
///
/// Discover < Read < Edit
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Permission to learn that a resource exists.
    Discover,

    /// Permission to view the content of a resource.
    Read,

    /// Permission to modify a resource.
    Edit,
}

impl AccessLevel {
    /// All access levels in ascending order.
    pub const ALL: [AccessLevel; 3] = [AccessLevel::Discover, AccessLevel::Read, AccessLevel::Edit];

    /// Lowercase name of the access level as used in requests and index field names.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Discover => "discover",
            AccessLevel::Read => "read",
            AccessLevel::Edit => "edit",
        }
    }

    /// Access level is Discover.
    pub fn is_discover(&self) -> bool {
        matches!(self, AccessLevel::Discover)
    }

    /// Access level is Read.
    pub fn is_read(&self) -> bool {
        matches!(self, AccessLevel::Read)
    }

    /// Access level is Edit.
    pub fn is_edit(&self) -> bool {
        matches!(self, AccessLevel::Edit)
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = RightsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "discover" => Ok(AccessLevel::Discover),
            "read" => Ok(AccessLevel::Read),
            "edit" => Ok(AccessLevel::Edit),
            other => Err(RightsError::UnknownAccessLevel(other.to_string())),
        }
    }
}

/// Kind of principal a permission is granted to.
///
/// Users and groups live in independent namespaces: the same name may be granted access both as a
/// user and as a group. Groups order before users, which is the order permission lists are
/// produced in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalType {
    Group,
    #[serde(alias = "person")]
    User,
}

impl PrincipalType {
    /// Both principal types in permission list order.
    pub const ALL: [PrincipalType; 2] = [PrincipalType::Group, PrincipalType::User];

    /// Name used in change requests.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalType::Group => "group",
            PrincipalType::User => "user",
        }
    }

    /// Name used in search index field names, where users are called "person".
    pub fn index_label(&self) -> &'static str {
        match self {
            PrincipalType::Group => "group",
            PrincipalType::User => "person",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, PrincipalType::Group)
    }

    pub fn is_user(&self) -> bool {
        !self.is_group()
    }
}

impl Display for PrincipalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PrincipalType {
    type Err = RightsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "group" => Ok(PrincipalType::Group),
            "user" | "person" => Ok(PrincipalType::User),
            other => Err(RightsError::UnknownPrincipalType(other.to_string())),
        }
    }
}
