// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::access::{AccessLevel, PrincipalType};
use crate::error::RightsError;

/// A single grant of one access level to one principal.
///
/// Permissions are immutable values. Two permissions are equal when principal type, access level
/// and principal name are all equal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPermission")]
pub struct Permission {
    #[serde(rename = "type")]
    principal_type: PrincipalType,
    access: AccessLevel,
    name: String,
}

impl Permission {
    /// Create a new permission, rejecting blank principal names.
    pub fn new(
        principal_type: PrincipalType,
        access: AccessLevel,
        name: impl Into<String>,
    ) -> Result<Self, RightsError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RightsError::EmptyPrincipalName);
        }

        Ok(Self {
            principal_type,
            access,
            name,
        })
    }

    /// Group permission.
    pub fn group(access: AccessLevel, name: impl Into<String>) -> Result<Self, RightsError> {
        Self::new(PrincipalType::Group, access, name)
    }

    /// User permission.
    pub fn user(access: AccessLevel, name: impl Into<String>) -> Result<Self, RightsError> {
        Self::new(PrincipalType::User, access, name)
    }

    pub fn principal_type(&self) -> PrincipalType {
        self.principal_type
    }

    pub fn access(&self) -> AccessLevel {
        self.access
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a permission from values already known to be valid, e.g. read from a rights record.
    pub(crate) fn from_parts(
        principal_type: PrincipalType,
        access: AccessLevel,
        name: &str,
    ) -> Self {
        Self {
            principal_type,
            access,
            name: name.to_owned(),
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.principal_type, self.name, self.access)
    }
}

#[derive(Deserialize)]
struct RawPermission {
    #[serde(rename = "type")]
    principal_type: PrincipalType,
    access: AccessLevel,
    name: String,
}

impl TryFrom<RawPermission> for Permission {
    type Error = RightsError;

    fn try_from(value: RawPermission) -> Result<Self, Self::Error> {
        Permission::new(value.principal_type, value.access, value.name)
    }
}

#[cfg(test)]
mod tests {
    use super::Permission;
    use crate::access::{AccessLevel, PrincipalType};
    use crate::error::RightsError;

    #[test]
    fn structural_equality() {
        let a = Permission::group(AccessLevel::Read, "group1").unwrap();
        let b = Permission::new(PrincipalType::Group, AccessLevel::Read, "group1").unwrap();
        assert_eq!(a, b);

        assert_ne!(a, Permission::user(AccessLevel::Read, "group1").unwrap());
        assert_ne!(a, Permission::group(AccessLevel::Edit, "group1").unwrap());
        assert_ne!(a, Permission::group(AccessLevel::Read, "group2").unwrap());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            Permission::user(AccessLevel::Read, ""),
            Err(RightsError::EmptyPrincipalName)
        );
        assert_eq!(
            Permission::user(AccessLevel::Read, "   "),
            Err(RightsError::EmptyPrincipalName)
        );
    }

    #[test]
    fn json_shape() {
        let permission = Permission::user(AccessLevel::Edit, "jcoyne").unwrap();
        let json = serde_json::to_string(&permission).unwrap();
        assert_eq!(json, r#"{"type":"user","access":"edit","name":"jcoyne"}"#);

        let decoded: Permission = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, permission);

        let blank =
            serde_json::from_str::<Permission>(r#"{"type":"user","access":"edit","name":""}"#);
        assert!(blank.is_err());
    }
}
