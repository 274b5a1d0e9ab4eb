// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rights record holding every grant of one protected resource.
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::access::{AccessLevel, PrincipalType};
use crate::error::RightsError;
use crate::permission::Permission;

/// Date format of embargo release dates in rights metadata.
pub const EMBARGO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Access level keyword which removes a principal in [`RightsRecord::update_permissions`].
pub const NO_ACCESS: &str = "none";

/// All current grants of a protected resource.
///
/// Users and groups are kept in separate maps from principal name to access level, so a principal
/// holds at most one access level per type. Both maps are ordered by name, which makes every
/// derived view (permission lists, accessor lists, index documents) deterministic.
///
/// An empty record is the state of a resource nobody has been granted access to yet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRightsRecord")]
pub struct RightsRecord {
    #[serde(default)]
    users: BTreeMap<String, AccessLevel>,

    #[serde(default)]
    groups: BTreeMap<String, AccessLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    embargo_release_date: Option<NaiveDate>,
}

impl RightsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a list of permissions.
    ///
    /// When a principal appears more than once the last permission wins.
    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        let mut record = Self::new();
        record.extend(permissions);
        record
    }

    /// User names mapped to their access level.
    pub fn users(&self) -> &BTreeMap<String, AccessLevel> {
        &self.users
    }

    /// Group names mapped to their access level.
    pub fn groups(&self) -> &BTreeMap<String, AccessLevel> {
        &self.groups
    }

    /// Principals of one type mapped to their access level.
    pub fn principals(&self, principal_type: PrincipalType) -> &BTreeMap<String, AccessLevel> {
        match principal_type {
            PrincipalType::Group => &self.groups,
            PrincipalType::User => &self.users,
        }
    }

    fn principals_mut(
        &mut self,
        principal_type: PrincipalType,
    ) -> &mut BTreeMap<String, AccessLevel> {
        match principal_type {
            PrincipalType::Group => &mut self.groups,
            PrincipalType::User => &mut self.users,
        }
    }

    /// Current access level of a principal, if it holds any.
    pub fn access_for(&self, principal_type: PrincipalType, name: &str) -> Option<AccessLevel> {
        self.principals(principal_type).get(name).copied()
    }

    /// Names of all principals of `principal_type` holding exactly `access`, ascending.
    pub fn names_at(&self, principal_type: PrincipalType, access: AccessLevel) -> Vec<String> {
        self.principals(principal_type)
            .iter()
            .filter(|(_, level)| **level == access)
            .map(|(name, _)| name.to_owned())
            .collect()
    }

    /// Replace the principals of `principal_type` holding exactly `access` with `names`.
    ///
    /// Principals of the same type at other access levels keep their level, the other principal
    /// type is not touched. A given name which currently holds another level is moved to
    /// `access`. Blank names are skipped.
    pub fn set<I, S>(&mut self, principal_type: PrincipalType, access: AccessLevel, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let principals = self.principals_mut(principal_type);
        principals.retain(|_, level| *level != access);

        for name in names {
            let name: String = name.into();
            if name.trim().is_empty() {
                trace!(%principal_type, %access, "skip blank principal name");
                continue;
            }
            principals.insert(name, access);
        }
    }

    /// Grant `access` to a principal, replacing any level it held before.
    ///
    /// Returns the previous access level. Blank names are skipped and return `None`.
    pub fn grant(
        &mut self,
        principal_type: PrincipalType,
        access: AccessLevel,
        name: impl Into<String>,
    ) -> Option<AccessLevel> {
        let name = name.into();
        if name.trim().is_empty() {
            trace!(%principal_type, %access, "skip blank principal name");
            return None;
        }

        self.principals_mut(principal_type).insert(name, access)
    }

    /// Remove a principal regardless of its access level.
    ///
    /// Returns the access level it held, removing an absent principal is a no-op.
    pub fn revoke(&mut self, principal_type: PrincipalType, name: &str) -> Option<AccessLevel> {
        self.principals_mut(principal_type).remove(name)
    }

    /// Merge a mapping of principal names to access levels into one principal type.
    ///
    /// Every value is either an access level ("discover", "read", "edit"), which grants it, or
    /// "none", which removes the principal. Names not mentioned keep their access. All values are
    /// validated before the record changes.
    pub fn update_permissions<I, K, V>(
        &mut self,
        principal_type: PrincipalType,
        updates: I,
    ) -> Result<(), RightsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut changes = Vec::new();
        for (name, access) in updates {
            let name: String = name.into();
            if name.trim().is_empty() {
                return Err(RightsError::EmptyPrincipalName);
            }

            let access = match access.as_ref().trim() {
                NO_ACCESS => None,
                level => Some(level.parse::<AccessLevel>()?),
            };
            changes.push((name, access));
        }

        for (name, access) in changes {
            match access {
                Some(access) => {
                    self.grant(principal_type, access, name);
                }
                None => {
                    self.revoke(principal_type, &name);
                }
            }
        }

        Ok(())
    }

    /// All grants as a permission list.
    ///
    /// Groups come before users, within a type permissions ascend by access level and within a
    /// level by principal name.
    pub fn permissions(&self) -> Vec<Permission> {
        let mut permissions = Vec::with_capacity(self.len());
        for principal_type in PrincipalType::ALL {
            for access in AccessLevel::ALL {
                permissions.extend(
                    self.principals(principal_type)
                        .iter()
                        .filter(|(_, level)| **level == access)
                        .map(|(name, _)| Permission::from_parts(principal_type, access, name)),
                );
            }
        }
        permissions
    }

    /// Number of grants across users and groups.
    pub fn len(&self) -> usize {
        self.users.len() + self.groups.len()
    }

    /// True when nobody holds any access.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }

    /// Remove all user and group grants. The embargo date is kept.
    pub fn clear(&mut self) {
        self.users.clear();
        self.groups.clear();
    }

    pub fn embargo_release_date(&self) -> Option<NaiveDate> {
        self.embargo_release_date
    }

    pub fn set_embargo_release_date(&mut self, date: Option<NaiveDate>) {
        self.embargo_release_date = date;
    }

    /// Set the embargo release date from its "YYYY-MM-DD" form. An empty string clears it.
    pub fn set_embargo_release_date_str(&mut self, value: &str) -> Result<(), RightsError> {
        let value = value.trim();
        if value.is_empty() {
            self.embargo_release_date = None;
            return Ok(());
        }

        let date = NaiveDate::parse_from_str(value, EMBARGO_DATE_FORMAT).map_err(|source| {
            RightsError::InvalidEmbargoDate {
                value: value.to_string(),
                source,
            }
        })?;
        self.embargo_release_date = Some(date);
        Ok(())
    }

    /// True when an embargo release date is set and lies after `today`.
    pub fn is_under_embargo(&self, today: NaiveDate) -> bool {
        self.embargo_release_date
            .is_some_and(|release_date| release_date > today)
    }
}

/// Serialized form of a rights record before principal names are checked.
#[derive(Deserialize)]
struct RawRightsRecord {
    #[serde(default)]
    users: BTreeMap<String, AccessLevel>,

    #[serde(default)]
    groups: BTreeMap<String, AccessLevel>,

    #[serde(default)]
    embargo_release_date: Option<NaiveDate>,
}

impl TryFrom<RawRightsRecord> for RightsRecord {
    type Error = RightsError;

    fn try_from(value: RawRightsRecord) -> Result<Self, Self::Error> {
        let blank_name = value
            .users
            .keys()
            .chain(value.groups.keys())
            .any(|name| name.trim().is_empty());
        if blank_name {
            return Err(RightsError::EmptyPrincipalName);
        }

        Ok(Self {
            users: value.users,
            groups: value.groups,
            embargo_release_date: value.embargo_release_date,
        })
    }
}

impl Extend<Permission> for RightsRecord {
    fn extend<T: IntoIterator<Item = Permission>>(&mut self, permissions: T) {
        for permission in permissions {
            self.grant(
                permission.principal_type(),
                permission.access(),
                permission.name(),
            );
        }
    }
}

impl FromIterator<Permission> for RightsRecord {
    fn from_iter<T: IntoIterator<Item = Permission>>(permissions: T) -> Self {
        Self::from_permissions(permissions)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::RightsRecord;
    use crate::access::{AccessLevel, PrincipalType};
    use crate::error::RightsError;
    use crate::permission::Permission;

    fn levels(pairs: &[(&str, AccessLevel)]) -> BTreeMap<String, AccessLevel> {
        pairs
            .iter()
            .map(|(name, access)| (name.to_string(), *access))
            .collect()
    }

    #[test]
    fn permission_list_order() {
        let mut record = RightsRecord::new();
        record.set(PrincipalType::Group, AccessLevel::Read, ["group1", "group2"]);
        record.set(PrincipalType::User, AccessLevel::Edit, ["user1"]);
        record.set(PrincipalType::User, AccessLevel::Read, ["user2", "user3"]);

        assert_eq!(
            record.permissions(),
            vec![
                Permission::group(AccessLevel::Read, "group1").unwrap(),
                Permission::group(AccessLevel::Read, "group2").unwrap(),
                Permission::user(AccessLevel::Read, "user2").unwrap(),
                Permission::user(AccessLevel::Read, "user3").unwrap(),
                Permission::user(AccessLevel::Edit, "user1").unwrap(),
            ]
        );
    }

    #[test]
    fn narrow_setter_keeps_other_levels() {
        let mut record = RightsRecord::new();
        record.set(PrincipalType::User, AccessLevel::Read, ["p1"]);
        record.set(PrincipalType::User, AccessLevel::Discover, ["p2"]);
        record.set(PrincipalType::Group, AccessLevel::Edit, ["g8"]);

        record.set(PrincipalType::User, AccessLevel::Edit, ["u1"]);

        assert_eq!(
            record.users(),
            &levels(&[
                ("p1", AccessLevel::Read),
                ("p2", AccessLevel::Discover),
                ("u1", AccessLevel::Edit)
            ])
        );
        assert_eq!(record.groups(), &levels(&[("g8", AccessLevel::Edit)]));

        // Replacing a level drops everyone who held exactly that level.
        record.set(PrincipalType::User, AccessLevel::Read, ["p3"]);
        assert_eq!(record.access_for(PrincipalType::User, "p1"), None);
        assert_eq!(
            record.access_for(PrincipalType::User, "p3"),
            Some(AccessLevel::Read)
        );

        // Empty list clears only that level.
        record.set(PrincipalType::User, AccessLevel::Read, Vec::<String>::new());
        assert_eq!(record.names_at(PrincipalType::User, AccessLevel::Read), Vec::<String>::new());
        assert_eq!(record.users().len(), 2);
    }

    #[test]
    fn narrow_setter_moves_principal_between_levels() {
        let mut record = RightsRecord::new();
        record.set(PrincipalType::Group, AccessLevel::Read, ["staff"]);
        record.set(PrincipalType::Group, AccessLevel::Edit, ["staff", ""]);

        assert_eq!(record.groups(), &levels(&[("staff", AccessLevel::Edit)]));
        assert_eq!(record.permissions().len(), 1);
    }

    #[test]
    fn namespaces_are_independent() {
        let mut record = RightsRecord::new();
        record.grant(PrincipalType::User, AccessLevel::Read, "archivist");
        record.grant(PrincipalType::Group, AccessLevel::Edit, "archivist");

        assert_eq!(record.len(), 2);
        assert_eq!(
            record.revoke(PrincipalType::User, "archivist"),
            Some(AccessLevel::Read)
        );
        assert_eq!(record.revoke(PrincipalType::User, "archivist"), None);
        assert_eq!(
            record.access_for(PrincipalType::Group, "archivist"),
            Some(AccessLevel::Edit)
        );
    }

    #[test]
    fn grant_skips_blank_names() {
        let mut record = RightsRecord::new();
        assert_eq!(record.grant(PrincipalType::User, AccessLevel::Read, ""), None);
        assert_eq!(record.grant(PrincipalType::Group, AccessLevel::Edit, "   "), None);
        assert!(record.is_empty());

        record.extend([Permission::group(AccessLevel::Read, "public").unwrap()]);
        assert!(
            record
                .permissions()
                .iter()
                .all(|permission| !permission.name().trim().is_empty())
        );
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn update_permissions_merges_one_type() {
        let mut record = RightsRecord::new();
        record
            .update_permissions(
                PrincipalType::User,
                [("person1", "read"), ("person2", "discover")],
            )
            .unwrap();
        record
            .update_permissions(
                PrincipalType::Group,
                [("group-6", "read"), ("group-7", "read"), ("group-8", "edit")],
            )
            .unwrap();

        record
            .update_permissions(PrincipalType::Group, [("group-7", "none"), ("group-9", "edit")])
            .unwrap();

        assert_eq!(
            record.groups(),
            &levels(&[
                ("group-6", AccessLevel::Read),
                ("group-8", AccessLevel::Edit),
                ("group-9", AccessLevel::Edit)
            ])
        );
        assert_eq!(record.users().len(), 2);
    }

    #[test]
    fn update_permissions_validates_before_mutating() {
        let mut record = RightsRecord::new();
        record.grant(PrincipalType::User, AccessLevel::Read, "person1");

        let result = record.update_permissions(
            PrincipalType::User,
            [("person1", "none"), ("person2", "admin")],
        );

        assert_eq!(
            result,
            Err(RightsError::UnknownAccessLevel("admin".to_string()))
        );
        assert_eq!(
            record.access_for(PrincipalType::User, "person1"),
            Some(AccessLevel::Read)
        );
    }

    #[test]
    fn collect_from_permissions() {
        let record: RightsRecord = vec![
            Permission::user(AccessLevel::Read, "u1").unwrap(),
            Permission::group(AccessLevel::Discover, "public").unwrap(),
            Permission::user(AccessLevel::Edit, "u1").unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(record.access_for(PrincipalType::User, "u1"), Some(AccessLevel::Edit));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn embargo_release_date() {
        let mut record = RightsRecord::new();
        let today = NaiveDate::from_ymd_opt(2010, 6, 1).unwrap();
        assert!(!record.is_under_embargo(today));

        record.set_embargo_release_date_str("2010-12-01").unwrap();
        assert_eq!(
            record.embargo_release_date(),
            NaiveDate::from_ymd_opt(2010, 12, 1)
        );
        assert!(record.is_under_embargo(today));
        assert!(!record.is_under_embargo(NaiveDate::from_ymd_opt(2010, 12, 1).unwrap()));

        assert!(matches!(
            record.set_embargo_release_date_str("12/01/2010"),
            Err(RightsError::InvalidEmbargoDate { .. })
        ));
        assert!(record.embargo_release_date().is_some());

        record.set_embargo_release_date_str("").unwrap();
        assert_eq!(record.embargo_release_date(), None);
    }

    #[test]
    fn json_round_trip() {
        let mut record = RightsRecord::new();
        record.set_read_groups(["public"]);
        record.set_edit_users(["archivist"]);
        record.set_embargo_release_date_str("2010-12-01").unwrap();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"users":{"archivist":"edit"},"groups":{"public":"read"},"embargo_release_date":"2010-12-01"}"#
        );
        assert_eq!(serde_json::from_str::<RightsRecord>(&json).unwrap(), record);

        // Missing maps are read as empty.
        assert_eq!(
            serde_json::from_str::<RightsRecord>("{}").unwrap(),
            RightsRecord::new()
        );
        assert!(serde_json::from_str::<RightsRecord>(r#"{"users":{" ":"read"}}"#).is_err());
    }

    #[test]
    fn clear_keeps_embargo() {
        let mut record = RightsRecord::new();
        record.grant(PrincipalType::User, AccessLevel::Edit, "u1");
        record.set_embargo_release_date(NaiveDate::from_ymd_opt(2030, 1, 1));

        record.clear();
        assert!(record.is_empty());
        assert!(record.embargo_release_date().is_some());
    }
}
