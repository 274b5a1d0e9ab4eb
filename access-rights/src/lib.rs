// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rights records for protected resources.
//!
//! Every protected resource owns one [`RightsRecord`] mapping user and group names to one of
//! three ordered access levels:
//!
//! Discover < Read < Edit
//!
//! The record can be changed through narrow bulk setters which only replace one (principal type,
//! access level) slice, through incremental create/update/destroy requests merged by the
//! [reconciler](reconcile), or through selective revocation which only removes principals the
//! caller is allowed to revoke. For permission-filtered search a record is flattened into a
//! multi-valued [`IndexDocument`].
//!
//! ```
//! use access_rights::{PermissionAttributes, RightsRecord};
//!
//! let mut record = RightsRecord::new();
//! record.set_read_groups(["group-6", "group-7"]);
//! record
//!     .set_permissions_attributes(vec![PermissionAttributes::new("user", "edit", "jcoyne")])
//!     .unwrap();
//!
//! // Only "group-6" may be revoked, "group-7" stays.
//! record.revise_read_groups(["group-2"], ["group-6"]);
//! assert_eq!(record.read_groups_string(), "group-2, group-7");
//!
//! let document = record.to_solr();
//! assert_eq!(document.len(), 2);
//! ```
mod access;
pub mod accessor;
pub mod cbor;
mod error;
pub mod index;
mod permission;
pub mod reconcile;
mod rights;
#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
pub mod traits;

pub use access::{AccessLevel, PrincipalType};
pub use accessor::{Accessor, AccessorMut, Revision};
pub use error::RightsError;
pub use index::{IndexConfig, IndexDocument, IndexProjector, IndexValue};
pub use permission::Permission;
pub use reconcile::{
    PermissionAttributes, PermissionChange, PermissionRequest, PermissionsAttributes,
    ReconcileReport,
};
pub use rights::{EMBARGO_DATE_FORMAT, NO_ACCESS, RightsRecord};
pub use traits::ProtectedResource;
