// SPDX-License-Identifier: MIT OR Apache-2.0

//! Views over the principals of one type holding exactly one access level.
//!
//! [`Accessor`] reads such a slice of a [`RightsRecord`], [`AccessorMut`] also replaces it,
//! either wholesale or with selective revocation. The named methods on `RightsRecord`
//! (`read_groups`, `set_edit_users_string`, `revise_discover_groups`, ...) are shorthands for the
//! six combinations.
use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::access::{AccessLevel, PrincipalType};
use crate::rights::RightsRecord;

/// Separator used when rendering a list of principal names as a string.
pub const NAME_SEPARATOR: &str = ", ";

/// Split a comma-separated list of principal names, trimming whitespace and dropping blanks.
pub fn split_names(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Read-only view on the principals of one type at one access level.
#[derive(Clone, Copy, Debug)]
pub struct Accessor<'a> {
    record: &'a RightsRecord,
    principal_type: PrincipalType,
    access: AccessLevel,
}

impl<'a> Accessor<'a> {
    pub fn new(
        record: &'a RightsRecord,
        principal_type: PrincipalType,
        access: AccessLevel,
    ) -> Self {
        Self {
            record,
            principal_type,
            access,
        }
    }

    /// Principal names, ascending.
    pub fn get(&self) -> Vec<String> {
        self.record.names_at(self.principal_type, self.access)
    }

    /// Principal names joined with ", ".
    pub fn get_string(&self) -> String {
        self.get().join(NAME_SEPARATOR)
    }
}

/// Outcome of a selective revocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Revision {
    /// Names granted the access level by this call.
    pub added: Vec<String>,

    /// Names which lost the access level.
    pub removed: Vec<String>,

    /// Names which were absent from the requested set but not eligible for revocation.
    pub retained: Vec<String>,
}

/// Mutable view on the principals of one type at one access level.
#[derive(Debug)]
pub struct AccessorMut<'a> {
    record: &'a mut RightsRecord,
    principal_type: PrincipalType,
    access: AccessLevel,
}

impl<'a> AccessorMut<'a> {
    pub fn new(
        record: &'a mut RightsRecord,
        principal_type: PrincipalType,
        access: AccessLevel,
    ) -> Self {
        Self {
            record,
            principal_type,
            access,
        }
    }

    /// Read-only view on the same slice.
    pub fn as_accessor(&self) -> Accessor<'_> {
        Accessor::new(&*self.record, self.principal_type, self.access)
    }

    pub fn get(&self) -> Vec<String> {
        self.as_accessor().get()
    }

    pub fn get_string(&self) -> String {
        self.as_accessor().get_string()
    }

    /// Replace all principals at this level with `names`.
    pub fn set<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.record.set(self.principal_type, self.access, names);
    }

    /// Replace all principals at this level with the names of a comma-separated list.
    pub fn set_string(&mut self, value: &str) {
        self.set(split_names(value));
    }

    /// Replace the principals at this level with `names`, but only revoke those listed in
    /// `revocable`.
    ///
    /// Current principals which are neither requested nor revocable keep their access. This lets
    /// a caller narrow a level down to the principals it controls without touching grants made
    /// elsewhere.
    pub fn set_with_selective_revocation<I, S, R, T>(&mut self, names: I, revocable: R) -> Revision
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let current: BTreeSet<String> = self.get().into_iter().collect();
        let requested: BTreeSet<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| !name.trim().is_empty())
            .collect();
        let revocable: BTreeSet<String> = revocable.into_iter().map(Into::into).collect();

        let mut revision = Revision::default();
        for name in current.difference(&requested) {
            if revocable.contains(name) {
                revision.removed.push(name.to_owned());
            } else {
                revision.retained.push(name.to_owned());
            }
        }
        revision.added = requested.difference(&current).cloned().collect();

        for name in &revision.removed {
            trace!(principal_type = %self.principal_type, access = %self.access, name, "revoke");
            self.record.revoke(self.principal_type, name);
        }

        for name in &revision.added {
            trace!(principal_type = %self.principal_type, access = %self.access, name, "grant");
            self.record
                .grant(self.principal_type, self.access, name.to_owned());
        }

        debug!(
            principal_type = %self.principal_type,
            access = %self.access,
            added = revision.added.len(),
            removed = revision.removed.len(),
            retained = revision.retained.len(),
            "selective revocation"
        );

        revision
    }
}

impl RightsRecord {
    /// Read-only view on the principals of `principal_type` holding exactly `access`.
    pub fn accessor(&self, principal_type: PrincipalType, access: AccessLevel) -> Accessor<'_> {
        Accessor::new(self, principal_type, access)
    }

    /// Mutable view on the principals of `principal_type` holding exactly `access`.
    pub fn accessor_mut(
        &mut self,
        principal_type: PrincipalType,
        access: AccessLevel,
    ) -> AccessorMut<'_> {
        AccessorMut::new(self, principal_type, access)
    }

    /// Mutable view on the groups holding exactly `access`.
    pub fn group_accessor(&mut self, access: AccessLevel) -> AccessorMut<'_> {
        self.accessor_mut(PrincipalType::Group, access)
    }

    /// Mutable view on the users holding exactly `access`.
    pub fn user_accessor(&mut self, access: AccessLevel) -> AccessorMut<'_> {
        self.accessor_mut(PrincipalType::User, access)
    }
}

/// Generates the named accessors for every principal type and access level.
///
/// Per combination: `read_groups` lists the names, `read_groups_string` joins them,
/// `set_read_groups` and `set_read_groups_string` replace them. Replacing with selective
/// revocation, `set_read_groups(new_names, revocable_names)` in two-argument form, is named
/// `revise_read_groups`.
macro_rules! named_accessors {
    ($(
        $principal_type:ident $access:ident =>
            $get:ident, $get_string:ident, $set:ident, $set_string:ident, $revise:ident;
    )*) => {
        impl RightsRecord {
            $(
                #[doc = concat!("Names returned by `", stringify!($get), "`, ascending.")]
                pub fn $get(&self) -> Vec<String> {
                    self.accessor(PrincipalType::$principal_type, AccessLevel::$access).get()
                }

                #[doc = concat!("`", stringify!($get), "` joined with \", \".")]
                pub fn $get_string(&self) -> String {
                    self.accessor(PrincipalType::$principal_type, AccessLevel::$access)
                        .get_string()
                }

                #[doc = concat!("Replace `", stringify!($get), "`, other levels stay untouched.")]
                pub fn $set<I, S>(&mut self, names: I)
                where
                    I: IntoIterator<Item = S>,
                    S: Into<String>,
                {
                    self.accessor_mut(PrincipalType::$principal_type, AccessLevel::$access)
                        .set(names)
                }

                #[doc = concat!("Replace `", stringify!($get), "` from a comma-separated list.")]
                pub fn $set_string(&mut self, value: &str) {
                    self.accessor_mut(PrincipalType::$principal_type, AccessLevel::$access)
                        .set_string(value)
                }

                #[doc = concat!(
                    "Replace `", stringify!($get), "`, revoking only names in `revocable`."
                )]
                pub fn $revise<I, S, R, T>(&mut self, names: I, revocable: R) -> Revision
                where
                    I: IntoIterator<Item = S>,
                    S: Into<String>,
                    R: IntoIterator<Item = T>,
                    T: Into<String>,
                {
                    self.accessor_mut(PrincipalType::$principal_type, AccessLevel::$access)
                        .set_with_selective_revocation(names, revocable)
                }
            )*
        }
    };
}

named_accessors! {
    Group Discover => discover_groups, discover_groups_string, set_discover_groups,
        set_discover_groups_string, revise_discover_groups;
    Group Read => read_groups, read_groups_string, set_read_groups,
        set_read_groups_string, revise_read_groups;
    Group Edit => edit_groups, edit_groups_string, set_edit_groups,
        set_edit_groups_string, revise_edit_groups;
    User Discover => discover_users, discover_users_string, set_discover_users,
        set_discover_users_string, revise_discover_users;
    User Read => read_users, read_users_string, set_read_users,
        set_read_users_string, revise_read_users;
    User Edit => edit_users, edit_users_string, set_edit_users,
        set_edit_users_string, revise_edit_users;
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;

    use super::{Revision, split_names};
    use crate::access::{AccessLevel, PrincipalType};
    use crate::test_utils::sample_record;

    fn levels(pairs: &[(&str, AccessLevel)]) -> BTreeMap<String, AccessLevel> {
        pairs
            .iter()
            .map(|(name, access)| (name.to_string(), *access))
            .collect()
    }

    #[test]
    fn read_groups() {
        let record = sample_record();
        assert_eq!(record.read_groups(), vec!["group-6", "group-7"]);
        assert_eq!(record.read_groups_string(), "group-6, group-7");
        assert_eq!(record.edit_groups_string(), "group-8");
        assert_eq!(record.discover_groups_string(), "");
        assert_eq!(record.discover_users(), vec!["person2"]);
    }

    #[test]
    fn read_groups_writer() {
        let mut record = sample_record();
        record.set_read_groups(["group-2", "group-3"]);

        assert_eq!(
            record.groups(),
            &levels(&[
                ("group-2", AccessLevel::Read),
                ("group-3", AccessLevel::Read),
                ("group-8", AccessLevel::Edit)
            ])
        );
        assert_eq!(
            record.users(),
            &levels(&[("person1", AccessLevel::Read), ("person2", AccessLevel::Discover)])
        );
    }

    #[test]
    fn read_groups_string_writer() {
        let mut record = sample_record();
        record.set_read_groups_string("umg/up.dlt.staff, group-3");

        assert_eq!(
            record.groups(),
            &levels(&[
                ("group-3", AccessLevel::Read),
                ("group-8", AccessLevel::Edit),
                ("umg/up.dlt.staff", AccessLevel::Read)
            ])
        );
        assert_eq!(record.users().len(), 2);
    }

    #[test]
    fn only_revoke_eligible_groups() {
        let mut record = sample_record();
        let revision = record.revise_read_groups(["group-2", "group-3"], ["group-6"]);

        // "group-7" is not eligible to be revoked.
        assert_eq!(
            record.groups(),
            &levels(&[
                ("group-2", AccessLevel::Read),
                ("group-3", AccessLevel::Read),
                ("group-7", AccessLevel::Read),
                ("group-8", AccessLevel::Edit)
            ])
        );
        assert_eq!(
            revision,
            Revision {
                added: vec!["group-2".to_string(), "group-3".to_string()],
                removed: vec!["group-6".to_string()],
                retained: vec!["group-7".to_string()],
            }
        );
        assert_eq!(record.users().len(), 2);
    }

    #[test]
    fn revocation_ignores_other_levels() {
        let mut record = sample_record();

        // "group-8" holds edit, it is not part of the read slice and must not be revoked.
        record.revise_read_groups(Vec::<String>::new(), ["group-6", "group-7", "group-8"]);

        assert_eq!(record.read_groups(), Vec::<String>::new());
        assert_eq!(record.edit_groups(), vec!["group-8"]);
    }

    #[test]
    fn revocation_is_idempotent() {
        let mut record = sample_record();
        record.revise_edit_users(["u1"], ["person1"]);
        let snapshot = record.clone();

        let revision = record.revise_edit_users(["u1"], ["person1"]);
        assert_eq!(record, snapshot);
        assert!(revision.added.is_empty());
        assert!(revision.removed.is_empty());
    }

    #[test]
    fn user_accessor_writer() {
        let mut record = sample_record();
        record.user_accessor(AccessLevel::Edit).set(["u1"]);

        assert_eq!(
            record.users(),
            &levels(&[
                ("person1", AccessLevel::Read),
                ("person2", AccessLevel::Discover),
                ("u1", AccessLevel::Edit)
            ])
        );
    }

    #[test]
    fn mutable_view_reads_like_read_only_view() {
        let mut record = sample_record();
        let expected = record.accessor(PrincipalType::Group, AccessLevel::Read).get_string();

        let mut accessor = record.group_accessor(AccessLevel::Read);
        assert_eq!(accessor.get_string(), expected);
        assert_eq!(accessor.as_accessor().get(), vec!["group-6", "group-7"]);

        accessor.set_string("group-1");
        assert_eq!(accessor.get(), vec!["group-1"]);
    }

    #[rstest]
    #[case("group-1, group-2", vec!["group-1", "group-2"])]
    #[case(" a ,b,, ,c ", vec!["a", "b", "c"])]
    #[case("", vec![])]
    #[case(" , ", vec![])]
    fn split_comma_separated_names(#[case] value: &str, #[case] expected: Vec<&str>) {
        assert_eq!(split_names(value), expected);
    }
}
