// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities.

use crate::access::PrincipalType;
use crate::rights::RightsRecord;

/// Log to stderr when `RUST_LOG` is set.
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

/// Record with users `person1: read`, `person2: discover` and groups `group-6: read`,
/// `group-7: read`, `group-8: edit`.
pub fn sample_record() -> RightsRecord {
    let mut record = RightsRecord::new();
    record
        .update_permissions(
            PrincipalType::User,
            [("person1", "read"), ("person2", "discover")],
        )
        .expect("valid access levels");
    record
        .update_permissions(
            PrincipalType::Group,
            [("group-6", "read"), ("group-7", "read"), ("group-8", "edit")],
        )
        .expect("valid access levels");
    record
}
