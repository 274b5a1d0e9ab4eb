// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental create, update and destroy requests against a rights record.
//!
//! A batch of requests is merged into the existing grants: every request either upserts one
//! principal at one access level or, when flagged for destruction, removes that principal
//! altogether. Grants not mentioned in the batch are always preserved.
//!
//! Requests arrive either typed ([`PermissionRequest`]) or in their raw attribute form
//! ([`PermissionAttributes`]) as submitted by forms and APIs, where a batch may be a list or a
//! mapping of arbitrary index keys to requests ([`PermissionsAttributes`]).
use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use crate::access::{AccessLevel, PrincipalType};
use crate::error::RightsError;
use crate::permission::Permission;
use crate::rights::RightsRecord;

/// What a change request does to its principal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionChange {
    /// Grant this access level, creating or updating the permission.
    Grant(AccessLevel),

    /// Remove the principal, whatever access level it holds.
    Destroy,
}

/// A typed change request for one principal.
///
/// Requests with a blank principal name are skipped when reconciled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PermissionRequest {
    pub principal_type: PrincipalType,
    pub name: String,
    pub change: PermissionChange,
}

impl PermissionRequest {
    /// Request to grant `access` to a principal, creating or updating its permission.
    pub fn grant(
        principal_type: PrincipalType,
        access: AccessLevel,
        name: impl Into<String>,
    ) -> Self {
        Self {
            principal_type,
            name: name.into(),
            change: PermissionChange::Grant(access),
        }
    }

    /// Request to remove a principal, whatever access level it holds.
    pub fn destroy(principal_type: PrincipalType, name: impl Into<String>) -> Self {
        Self {
            principal_type,
            name: name.into(),
            change: PermissionChange::Destroy,
        }
    }

    pub fn is_destroy(&self) -> bool {
        self.change == PermissionChange::Destroy
    }
}

impl From<Permission> for PermissionRequest {
    fn from(permission: Permission) -> Self {
        Self::grant(
            permission.principal_type(),
            permission.access(),
            permission.name(),
        )
    }
}

/// Counts of what a reconciliation changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Principals which did not hold any access before.
    pub created: usize,

    /// Principals moved to another access level.
    pub updated: usize,

    /// Principals removed.
    pub destroyed: usize,

    /// Requests which did not change anything.
    pub unchanged: usize,

    /// Requests ignored for their blank principal name.
    pub skipped: usize,
}

impl ReconcileReport {
    /// True when the reconciliation changed the record.
    pub fn is_changed(&self) -> bool {
        self.created + self.updated + self.destroyed > 0
    }
}

/// Apply typed change requests in order. Later requests for the same principal win.
pub fn reconcile<I>(record: &mut RightsRecord, requests: I) -> ReconcileReport
where
    I: IntoIterator<Item = PermissionRequest>,
{
    let mut report = ReconcileReport::default();

    for request in requests {
        let PermissionRequest {
            principal_type,
            name,
            change,
        } = request;

        if name.trim().is_empty() {
            trace!(%principal_type, "skip request with blank principal name");
            report.skipped += 1;
            continue;
        }

        let access = match change {
            PermissionChange::Grant(access) => access,
            PermissionChange::Destroy => {
                match record.revoke(principal_type, &name) {
                    Some(previous) => {
                        trace!(
                            %principal_type,
                            name = name.as_str(),
                            %previous,
                            "destroy permission"
                        );
                        report.destroyed += 1;
                    }
                    None => report.unchanged += 1,
                }
                continue;
            }
        };

        match record.grant(principal_type, access, name.as_str()) {
            None => {
                trace!(%principal_type, name = name.as_str(), %access, "create permission");
                report.created += 1;
            }
            Some(previous) if previous == access => report.unchanged += 1,
            Some(previous) => {
                trace!(
                    %principal_type,
                    name = name.as_str(),
                    %previous,
                    %access,
                    "update permission"
                );
                report.updated += 1;
            }
        }
    }

    debug!(
        created = report.created,
        updated = report.updated,
        destroyed = report.destroyed,
        unchanged = report.unchanged,
        skipped = report.skipped,
        "reconciled permissions"
    );

    report
}

/// Validate a raw batch and apply it.
///
/// The whole batch is validated first: on the first invalid request an error naming its key and
/// field is returned and the record stays untouched.
pub fn reconcile_attributes(
    record: &mut RightsRecord,
    attributes: PermissionsAttributes,
) -> Result<ReconcileReport, RightsError> {
    let requests = attributes
        .into_ordered()
        .into_iter()
        .map(|(key, attributes)| attributes.validate(&key))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(reconcile(record, requests))
}

impl RightsRecord {
    /// Apply typed change requests, see [`reconcile`].
    pub fn reconcile<I>(&mut self, requests: I) -> ReconcileReport
    where
        I: IntoIterator<Item = PermissionRequest>,
    {
        reconcile(self, requests)
    }

    /// Apply a raw batch of permission attributes, see [`reconcile_attributes`].
    pub fn set_permissions_attributes(
        &mut self,
        attributes: impl Into<PermissionsAttributes>,
    ) -> Result<ReconcileReport, RightsError> {
        reconcile_attributes(self, attributes.into())
    }
}

/// Interpret a destroy flag given as text. Only "1" and "true" request destruction.
pub fn parse_destroy_flag(value: &str) -> bool {
    matches!(value.trim(), "1" | "true")
}

/// Unvalidated change request as submitted by a client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAttributes {
    #[serde(rename = "type", default)]
    pub principal_type: String,

    #[serde(default)]
    pub access: String,

    #[serde(default)]
    pub name: String,

    /// Destroy flag, true only for boolean `true` or the strings "1" and "true". Any other value
    /// is read as false.
    #[serde(
        rename = "_destroy",
        alias = "destroy",
        default,
        deserialize_with = "deserialize_destroy_flag",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub destroy: bool,
}

impl PermissionAttributes {
    pub fn new(
        principal_type: impl Into<String>,
        access: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            principal_type: principal_type.into(),
            access: access.into(),
            name: name.into(),
            destroy: false,
        }
    }

    pub fn with_destroy(mut self, destroy: bool) -> Self {
        self.destroy = destroy;
        self
    }

    /// Check all fields and turn the attributes into a typed request.
    ///
    /// The access level is only checked when the request grants access. `key` identifies the
    /// request within its batch and is carried in the error.
    pub fn validate(&self, key: &str) -> Result<PermissionRequest, RightsError> {
        let invalid = |field: &'static str, source: RightsError| RightsError::InvalidRequest {
            key: key.to_string(),
            field,
            source: Box::new(source),
        };

        let principal_type = self
            .principal_type
            .parse::<PrincipalType>()
            .map_err(|err| invalid("type", err))?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("name", RightsError::EmptyPrincipalName));
        }

        // Destroy requests remove the principal at any level, their access is not looked at.
        if self.destroy {
            return Ok(PermissionRequest::destroy(principal_type, name));
        }

        let access = self
            .access
            .parse::<AccessLevel>()
            .map_err(|err| invalid("access", err))?;

        Ok(PermissionRequest::grant(principal_type, access, name))
    }
}

impl From<&Permission> for PermissionAttributes {
    fn from(permission: &Permission) -> Self {
        Self::new(
            permission.principal_type().as_str(),
            permission.access().as_str(),
            permission.name(),
        )
    }
}

/// A batch of raw change requests: either a list or a mapping of index keys to requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PermissionsAttributes {
    List(Vec<PermissionAttributes>),
    Keyed(BTreeMap<String, PermissionAttributes>),
}

impl PermissionsAttributes {
    /// Requests with their keys in application order.
    ///
    /// Lists keep their order and use the position as key. Mappings are ordered by the numeric
    /// value of their keys, keys which are not numbers follow in lexical order.
    pub fn into_ordered(self) -> Vec<(String, PermissionAttributes)> {
        match self {
            PermissionsAttributes::List(list) => list
                .into_iter()
                .enumerate()
                .map(|(index, attributes)| (index.to_string(), attributes))
                .collect(),
            PermissionsAttributes::Keyed(map) => {
                let mut entries: Vec<_> = map.into_iter().collect();
                entries.sort_by_cached_key(|(key, _)| match key.trim().parse::<u64>() {
                    Ok(number) => (0, number, key.clone()),
                    Err(_) => (1, 0, key.clone()),
                });
                entries
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PermissionsAttributes::List(list) => list.len(),
            PermissionsAttributes::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<PermissionAttributes>> for PermissionsAttributes {
    fn from(list: Vec<PermissionAttributes>) -> Self {
        PermissionsAttributes::List(list)
    }
}

impl<K> FromIterator<(K, PermissionAttributes)> for PermissionsAttributes
where
    K: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, PermissionAttributes)>>(entries: T) -> Self {
        PermissionsAttributes::Keyed(
            entries
                .into_iter()
                .map(|(key, attributes)| (key.into(), attributes))
                .collect(),
        )
    }
}

fn deserialize_destroy_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DestroyFlagVisitor)
}

/// Reads any value as destroy flag without failing on unexpected input.
struct DestroyFlagVisitor;

impl<'de> Visitor<'de> for DestroyFlagVisitor {
    type Value = bool;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a boolean or string destroy flag")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
        Ok(value)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
        Ok(parse_destroy_flag(value))
    }

    fn visit_i64<E: de::Error>(self, _value: i64) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_u64<E: de::Error>(self, _value: u64) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_bytes<E: de::Error>(self, _value: &[u8]) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_none<E: de::Error>(self) -> Result<bool, E> {
        Ok(false)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<bool, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(false)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<bool, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(false)
    }
}
