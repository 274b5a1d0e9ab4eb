// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt::Display;

use tracing::debug_span;

use crate::access::{AccessLevel, PrincipalType};
use crate::accessor::{NAME_SEPARATOR, Revision};
use crate::error::RightsError;
use crate::index::IndexDocument;
use crate::permission::Permission;
use crate::reconcile::{PermissionsAttributes, ReconcileReport};
use crate::rights::RightsRecord;

/// A resource which owns exactly one rights record.
///
/// Implementors only hand out their record, all permission entry points are provided. A resource
/// without rights metadata yet behaves like one with an empty record: reads return empty results
/// and the first write creates the record.
pub trait ProtectedResource {
    type Id: Display;

    /// Identifier of the resource, used in log spans.
    fn id(&self) -> Self::Id;

    /// The rights record, `None` if none was created yet.
    fn rights(&self) -> Option<&RightsRecord>;

    /// The rights record, created empty if missing.
    fn rights_mut(&mut self) -> &mut RightsRecord;

    /// All grants as a permission list, see [`RightsRecord::permissions`].
    fn permissions(&self) -> Vec<Permission> {
        self.rights()
            .map(RightsRecord::permissions)
            .unwrap_or_default()
    }

    /// Apply a raw batch of change requests, see [`RightsRecord::set_permissions_attributes`].
    fn set_permissions_attributes(
        &mut self,
        attributes: impl Into<PermissionsAttributes>,
    ) -> Result<ReconcileReport, RightsError> {
        let span = debug_span!("permissions_attributes", resource = %self.id());
        let _guard = span.enter();
        self.rights_mut().set_permissions_attributes(attributes)
    }

    /// Names of the principals of `principal_type` holding exactly `access`.
    fn principals_at(&self, principal_type: PrincipalType, access: AccessLevel) -> Vec<String> {
        self.rights()
            .map(|rights| rights.names_at(principal_type, access))
            .unwrap_or_default()
    }

    /// Names of the principals of `principal_type` holding exactly `access`, joined with ", ".
    fn principals_string_at(&self, principal_type: PrincipalType, access: AccessLevel) -> String {
        self.principals_at(principal_type, access).join(NAME_SEPARATOR)
    }

    /// Replace the principals of `principal_type` holding exactly `access` from a
    /// comma-separated list.
    fn set_principals_string_at(
        &mut self,
        principal_type: PrincipalType,
        access: AccessLevel,
        value: &str,
    ) {
        self.rights_mut()
            .accessor_mut(principal_type, access)
            .set_string(value);
    }

    /// Replace the principals of `principal_type` holding exactly `access`.
    fn set_principals_at<I, S>(
        &mut self,
        principal_type: PrincipalType,
        access: AccessLevel,
        names: I,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rights_mut().set(principal_type, access, names);
    }

    /// Replace the principals of `principal_type` holding exactly `access`, revoking only those
    /// listed in `revocable`.
    fn revise_principals_at<I, S, R, T>(
        &mut self,
        principal_type: PrincipalType,
        access: AccessLevel,
        names: I,
        revocable: R,
    ) -> Revision
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let span = debug_span!("revise_principals", resource = %self.id());
        let _guard = span.enter();
        self.rights_mut()
            .accessor_mut(principal_type, access)
            .set_with_selective_revocation(names, revocable)
    }

    /// Index document with the default field naming, see [`RightsRecord::to_solr`].
    fn to_solr(&self) -> IndexDocument {
        self.rights()
            .map(RightsRecord::to_solr)
            .unwrap_or_default()
    }
}
